//! Isolation backend contract
//!
//! A [`Sandbox`] runs exactly one shell command against one working directory
//! and reports what happened. It never fails: launch, wait, kill and log
//! errors all come back as a [`SandboxResult`] with `exit_code = -1`.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::SandboxConfig;

/// How the working directory is exposed inside the isolation unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountMode {
    ReadOnly,
    /// Only the compile step writes, to emit the binary
    Writable,
}

impl MountMode {
    /// Docker bind mount suffix
    pub fn as_bind_option(&self) -> &'static str {
        match self {
            MountMode::ReadOnly => "ro",
            MountMode::Writable => "rw",
        }
    }
}

/// What an invocation is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationKind {
    Compile,
    Run { test_case: usize },
}

impl InvocationKind {
    pub fn label(&self) -> &'static str {
        match self {
            InvocationKind::Compile => "compile",
            InvocationKind::Run { .. } => "run",
        }
    }
}

/// One compile or run invocation
#[derive(Debug, Clone, PartialEq)]
pub struct SandboxRequest {
    pub kind: InvocationKind,
    pub working_directory: PathBuf,
    pub mount_mode: MountMode,
    /// Passed to `/bin/sh -c`
    pub command: String,
    pub timeout: Duration,
    pub memory_limit_bytes: i64,
    pub cpu_quota: i64,
    pub cpu_period: i64,
    pub pids_limit: i64,
    /// Unprivileged `uid:gid`
    pub user: String,
}

impl SandboxRequest {
    /// Compile invocation: writable mount, no stdin
    pub fn compile(
        working_directory: impl Into<PathBuf>,
        command: impl Into<String>,
        limits: &SandboxConfig,
    ) -> Self {
        Self::with_limits(
            InvocationKind::Compile,
            working_directory.into(),
            MountMode::Writable,
            command.into(),
            limits,
        )
    }

    /// Run invocation for one test case: read-only mount
    pub fn run(
        test_case: usize,
        working_directory: impl Into<PathBuf>,
        command: impl Into<String>,
        limits: &SandboxConfig,
    ) -> Self {
        Self::with_limits(
            InvocationKind::Run { test_case },
            working_directory.into(),
            MountMode::ReadOnly,
            command.into(),
            limits,
        )
    }

    fn with_limits(
        kind: InvocationKind,
        working_directory: PathBuf,
        mount_mode: MountMode,
        command: String,
        limits: &SandboxConfig,
    ) -> Self {
        Self {
            kind,
            working_directory,
            mount_mode,
            command,
            timeout: limits.timeout(),
            memory_limit_bytes: limits.memory_limit_bytes(),
            cpu_quota: limits.cpu_quota,
            cpu_period: limits.cpu_period,
            pids_limit: limits.pids_limit,
            user: limits.user.clone(),
        }
    }
}

/// Fully classified outcome of one invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SandboxResult {
    pub exit_code: i64,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
    pub out_of_memory: bool,
}

impl SandboxResult {
    /// Normal termination
    pub fn exited(exit_code: i64, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: stdout.into(),
            stderr: stderr.into(),
            timed_out: false,
            out_of_memory: false,
        }
    }

    /// Killed after the wall-clock deadline
    pub fn timed_out() -> Self {
        Self {
            exit_code: -1,
            timed_out: true,
            ..Default::default()
        }
    }

    /// Host-side failure. `reason` is shown to users, so it must not carry host detail.
    pub fn infrastructure_failure(reason: &str) -> Self {
        Self {
            exit_code: -1,
            stderr: format!("Sandbox error: {}", reason),
            ..Default::default()
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0 && !self.timed_out && !self.out_of_memory
    }
}

/// Runs commands in an isolated, resource-bounded environment
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Sandbox: Send + Sync {
    async fn execute(&self, request: &SandboxRequest) -> SandboxResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_request_is_writable() {
        let limits = SandboxConfig::default();
        let request = SandboxRequest::compile("/tmp/judge_x", "gcc main.c -o main", &limits);

        assert_eq!(request.kind, InvocationKind::Compile);
        assert_eq!(request.mount_mode, MountMode::Writable);
        assert_eq!(request.timeout, limits.timeout());
        assert_eq!(request.pids_limit, limits.pids_limit);
    }

    #[test]
    fn test_run_request_is_read_only() {
        let limits = SandboxConfig::default();
        let request = SandboxRequest::run(3, "/tmp/judge_x", "./main < input_3.txt", &limits);

        assert_eq!(request.kind, InvocationKind::Run { test_case: 3 });
        assert_eq!(request.mount_mode.as_bind_option(), "ro");
        assert_eq!(request.user, "1000:1000");
    }

    #[test]
    fn test_failure_results() {
        let timed_out = SandboxResult::timed_out();
        assert_eq!(timed_out.exit_code, -1);
        assert!(timed_out.timed_out);
        assert!(!timed_out.success());

        let failure = SandboxResult::infrastructure_failure("failed to start isolation unit");
        assert_eq!(failure.exit_code, -1);
        assert!(failure.stderr.starts_with("Sandbox error:"));
        assert!(!failure.timed_out && !failure.out_of_memory);

        assert!(SandboxResult::exited(0, "ok", "").success());
    }
}
