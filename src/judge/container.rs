//! Docker isolation backend
//!
//! Every invocation gets a fresh container that is force-removed afterwards,
//! whether the command exited, timed out or the daemon misbehaved.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use bollard::{
    container::LogOutput,
    models::{ContainerCreateBody, HostConfig},
    query_parameters::{
        CreateContainerOptionsBuilder, InspectContainerOptions, KillContainerOptions,
        LogsOptionsBuilder, RemoveContainerOptionsBuilder, StartContainerOptions,
        WaitContainerOptionsBuilder,
    },
    Docker, API_DEFAULT_VERSION,
};
use futures::StreamExt;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    config::Config,
    constants::{CONTAINER_LABEL, CONTAINER_NAME_PREFIX, CONTAINER_WORKDIR},
    error::{JudgeError, JudgeResult},
};

use super::sandbox::{Sandbox, SandboxRequest, SandboxResult};

/// Seconds the client waits on a single daemon API call
const DOCKER_CLIENT_TIMEOUT_SECS: u64 = 120;

/// Docker-backed sandbox
pub struct DockerSandbox {
    docker: Docker,
    image: String,
    tmpfs_size_mb: u64,
    output_limit_bytes: usize,
    permits: Arc<Semaphore>,
}

impl DockerSandbox {
    /// Create a sandbox over an existing client
    pub fn new(docker: Docker, config: &Config) -> Self {
        Self {
            docker,
            image: config.docker.image.clone(),
            tmpfs_size_mb: config.sandbox.tmpfs_size_mb,
            output_limit_bytes: config.sandbox.output_limit_bytes,
            permits: Arc::new(Semaphore::new(config.sandbox.max_concurrent)),
        }
    }

    /// Connect to the configured socket and check the daemon and image
    pub async fn connect(config: &Config) -> JudgeResult<Self> {
        info!(socket = %config.docker.socket_path, "Connecting to Docker...");
        let docker = Docker::connect_with_unix(
            &config.docker.socket_path,
            DOCKER_CLIENT_TIMEOUT_SECS,
            API_DEFAULT_VERSION,
        )?;

        let version = docker.version().await?;
        info!(
            "Connected to Docker version: {}",
            version.version.unwrap_or_default()
        );

        let sandbox = Self::new(docker, config);
        sandbox.ensure_image().await?;

        Ok(sandbox)
    }

    /// Fail early when the judge image is missing. Images are never pulled,
    /// since judging runs without network access.
    pub async fn ensure_image(&self) -> JudgeResult<()> {
        self.docker
            .inspect_image(&self.image)
            .await
            .map_err(|e| JudgeError::Docker(format!("image {} unavailable: {}", self.image, e)))?;

        debug!(image = %self.image, "Judge image present");
        Ok(())
    }

    async fn create_container(&self, name: &str, request: &SandboxRequest) -> anyhow::Result<String> {
        let host_dir = request
            .working_directory
            .canonicalize()
            .with_context(|| format!("Could not canonicalize {}", request.working_directory.display()))?;

        let options = CreateContainerOptionsBuilder::default().name(name).build();

        let host_config = HostConfig {
            binds: Some(vec![format!(
                "{}:{}:{}",
                host_dir.display(),
                CONTAINER_WORKDIR,
                request.mount_mode.as_bind_option()
            )]),
            memory: Some(request.memory_limit_bytes),
            // Equal to memory: no swap
            memory_swap: Some(request.memory_limit_bytes),
            cpu_period: Some(request.cpu_period),
            cpu_quota: Some(request.cpu_quota),
            pids_limit: Some(request.pids_limit),
            network_mode: Some("none".to_string()),
            readonly_rootfs: Some(true),
            tmpfs: Some(HashMap::from([(
                "/tmp".to_string(),
                format!("rw,noexec,nosuid,size={}m", self.tmpfs_size_mb),
            )])),
            cap_drop: Some(vec!["ALL".to_string()]),
            security_opt: Some(vec!["no-new-privileges".to_string()]),
            ..Default::default()
        };

        let body = ContainerCreateBody {
            image: Some(self.image.clone()),
            cmd: Some(vec![
                "/bin/sh".to_string(),
                "-c".to_string(),
                request.command.clone(),
            ]),
            working_dir: Some(CONTAINER_WORKDIR.to_string()),
            user: Some(request.user.clone()),
            network_disabled: Some(true),
            tty: Some(false),
            open_stdin: Some(false),
            env: Some(vec!["LANG=C.UTF-8".to_string()]),
            labels: Some(HashMap::from([(
                CONTAINER_LABEL.to_string(),
                request.kind.label().to_string(),
            )])),
            host_config: Some(host_config),
            ..Default::default()
        };

        let container = self.docker.create_container(Some(options), body).await?;
        Ok(container.id)
    }

    /// Start the container and classify how it ended
    async fn run_container(&self, container_id: &str, request: &SandboxRequest) -> SandboxResult {
        if let Err(e) = self
            .docker
            .start_container(container_id, None::<StartContainerOptions>)
            .await
        {
            error!(container = %container_id, "Failed to start container: {}", e);
            return SandboxResult::infrastructure_failure("failed to start isolation unit");
        }

        let (exit_code, timed_out) =
            match tokio::time::timeout(request.timeout, self.wait_for_exit(container_id)).await {
                Ok(Ok(code)) => (code, false),
                Ok(Err(e)) => {
                    error!(container = %container_id, "Failed to wait for container: {:#}", e);
                    return SandboxResult::infrastructure_failure(
                        "failed to wait for isolation unit",
                    );
                }
                Err(_) => {
                    debug!(container = %container_id, "Deadline reached, killing container");
                    if let Err(e) = self
                        .docker
                        .kill_container(container_id, None::<KillContainerOptions>)
                        .await
                    {
                        // Removal below is forced, so the container still goes away
                        warn!(container = %container_id, "Failed to kill container: {}", e);
                    }
                    (-1, true)
                }
            };

        let out_of_memory = self.was_oom_killed(container_id).await;

        match self.collect_logs(container_id).await {
            Ok((stdout, stderr)) => SandboxResult {
                exit_code,
                stdout,
                stderr,
                timed_out,
                out_of_memory,
            },
            Err(e) => {
                error!(container = %container_id, "Failed to read container logs: {}", e);
                SandboxResult {
                    timed_out,
                    out_of_memory,
                    ..SandboxResult::infrastructure_failure("failed to read program output")
                }
            }
        }
    }

    async fn wait_for_exit(&self, container_id: &str) -> anyhow::Result<i64> {
        let options = WaitContainerOptionsBuilder::default()
            .condition("not-running")
            .build();
        let mut stream = self.docker.wait_container(container_id, Some(options));

        match stream.next().await {
            Some(Ok(response)) => Ok(response.status_code),
            // Non-zero exits arrive as errors
            Some(Err(bollard::errors::Error::DockerContainerWaitError { code, .. })) => Ok(code),
            Some(Err(e)) => Err(e.into()),
            None => Err(anyhow!("wait stream ended without a status")),
        }
    }

    async fn collect_logs(
        &self,
        container_id: &str,
    ) -> Result<(String, String), bollard::errors::Error> {
        let options = LogsOptionsBuilder::default()
            .stdout(true)
            .stderr(true)
            .build();
        let mut stream = self.docker.logs(container_id, Some(options));

        let mut stdout = Vec::new();
        let mut stderr = Vec::new();

        while let Some(msg) = stream.next().await {
            match msg? {
                LogOutput::StdOut { message } => {
                    append_capped(&mut stdout, &message, self.output_limit_bytes)
                }
                LogOutput::StdErr { message } => {
                    append_capped(&mut stderr, &message, self.output_limit_bytes)
                }
                _ => {}
            }
        }

        Ok((
            String::from_utf8_lossy(&stdout).into_owned(),
            String::from_utf8_lossy(&stderr).into_owned(),
        ))
    }

    async fn was_oom_killed(&self, container_id: &str) -> bool {
        match self
            .docker
            .inspect_container(container_id, None::<InspectContainerOptions>)
            .await
        {
            Ok(inspect) => inspect
                .state
                .and_then(|state| state.oom_killed)
                .unwrap_or(false),
            Err(e) => {
                warn!(container = %container_id, "Failed to inspect container: {}", e);
                false
            }
        }
    }
}

#[async_trait]
impl Sandbox for DockerSandbox {
    async fn execute(&self, request: &SandboxRequest) -> SandboxResult {
        let _permit = match tokio::time::timeout(
            request.timeout,
            Arc::clone(&self.permits).acquire_owned(),
        )
        .await
        {
            Ok(Ok(permit)) => permit,
            _ => {
                warn!(kind = request.kind.label(), "No sandbox capacity available");
                return SandboxResult::infrastructure_failure("sandbox capacity exhausted");
            }
        };

        let name = format!("{}-{}", CONTAINER_NAME_PREFIX, Uuid::new_v4());
        debug!(
            container = %name,
            kind = request.kind.label(),
            cmd = %request.command,
            "Creating container"
        );

        let container_id = match self.create_container(&name, request).await {
            Ok(id) => id,
            Err(e) => {
                error!(container = %name, "Failed to create container: {:#}", e);
                return SandboxResult::infrastructure_failure("failed to create isolation unit");
            }
        };

        let guard = ContainerGuard::new(self.docker.clone(), container_id);
        let result = self.run_container(guard.id(), request).await;
        guard.release().await;

        debug!(
            container = %name,
            exit_code = result.exit_code,
            timed_out = result.timed_out,
            out_of_memory = result.out_of_memory,
            "Container finished"
        );

        result
    }
}

/// Removes its container when released, or in the background if dropped early
struct ContainerGuard {
    docker: Docker,
    id: Option<String>,
}

impl ContainerGuard {
    fn new(docker: Docker, id: String) -> Self {
        Self { docker, id: Some(id) }
    }

    fn id(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }

    async fn release(mut self) {
        if let Some(id) = self.id.take() {
            remove_container(&self.docker, &id).await;
        }
    }
}

impl Drop for ContainerGuard {
    fn drop(&mut self) {
        let Some(id) = self.id.take() else {
            return;
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let docker = self.docker.clone();
                handle.spawn(async move { remove_container(&docker, &id).await });
            }
            Err(_) => error!(container = %id, "Container leaked: no runtime to remove it"),
        }
    }
}

async fn remove_container(docker: &Docker, container_id: &str) {
    let options = RemoveContainerOptionsBuilder::default().force(true).build();

    if let Err(e) = docker.remove_container(container_id, Some(options)).await {
        error!(container = %container_id, "Failed to remove container: {}", e);
    }
}

/// Append at most `limit - buf.len()` bytes
fn append_capped(buf: &mut Vec<u8>, chunk: &[u8], limit: usize) {
    let room = limit.saturating_sub(buf.len());
    buf.extend_from_slice(&chunk[..chunk.len().min(room)]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_capped() {
        let mut buf = Vec::new();
        append_capped(&mut buf, b"hello", 8);
        append_capped(&mut buf, b"world", 8);
        assert_eq!(buf, b"hellowor");

        append_capped(&mut buf, b"!", 8);
        assert_eq!(buf.len(), 8);
    }

    #[test]
    fn test_append_capped_zero_limit() {
        let mut buf = Vec::new();
        append_capped(&mut buf, b"data", 0);
        assert!(buf.is_empty());
    }
}
