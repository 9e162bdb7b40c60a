//! Engine configuration management
//!
//! This module handles loading and validating configuration from environment variables.
//! All configuration is loaded at startup and validated before any submission is judged.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_CPU_PERIOD, DEFAULT_CPU_QUOTA, DEFAULT_DOCKER_SOCKET, DEFAULT_JUDGE_IMAGE,
    DEFAULT_LOG_LEVEL, DEFAULT_MAX_CONCURRENT_SANDBOXES, DEFAULT_MEMORY_LIMIT_MB,
    DEFAULT_OUTPUT_LIMIT_BYTES, DEFAULT_PIDS_LIMIT, DEFAULT_SANDBOX_USER,
    DEFAULT_STDERR_LIMIT_CHARS, DEFAULT_TIMEOUT_SECS, DEFAULT_TMPFS_SIZE_MB,
};

/// Main engine configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub docker: DockerConfig,
    pub sandbox: SandboxConfig,
    pub judge: JudgeConfig,
    pub log: LogConfig,
}

/// Docker daemon and image configuration
#[derive(Debug, Clone)]
pub struct DockerConfig {
    pub socket_path: String,
    /// Image every compile and run invocation starts from
    pub image: String,
}

/// Resource limits applied to every isolation unit
#[derive(Debug, Clone)]
pub struct SandboxConfig {
    pub memory_limit_mb: u64,
    /// CPU microseconds allowed per period
    pub cpu_quota: i64,
    pub cpu_period: i64,
    pub pids_limit: i64,
    /// Wall-clock deadline per invocation in seconds
    pub timeout_secs: u64,
    /// `uid:gid` the submission runs as
    pub user: String,
    pub max_concurrent: usize,
    /// Cap on captured bytes for each of stdout and stderr
    pub output_limit_bytes: usize,
    pub tmpfs_size_mb: u64,
}

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct JudgeConfig {
    /// Parent directory of request working directories
    pub work_root: PathBuf,
    /// Cap on stderr characters copied into a result
    pub stderr_limit_chars: usize,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub rust_log: String,
    pub format: LogFormat,
}

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = Self {
            docker: DockerConfig::from_env()?,
            sandbox: SandboxConfig::from_env()?,
            judge: JudgeConfig::from_env()?,
            log: LogConfig::from_env()?,
        };
        config.validate()?;

        Ok(config)
    }

    /// Reject limits that would make every invocation fail or escape its bounds
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sandbox = &self.sandbox;

        if sandbox.memory_limit_mb == 0 {
            return Err(ConfigError::InvalidValue("JUDGE_MEMORY_LIMIT_MB".to_string()));
        }
        if sandbox.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue("JUDGE_TIMEOUT_SECS".to_string()));
        }
        if sandbox.pids_limit <= 0 {
            return Err(ConfigError::InvalidValue("JUDGE_PIDS_LIMIT".to_string()));
        }
        if sandbox.cpu_period <= 0 {
            return Err(ConfigError::InvalidValue("JUDGE_CPU_PERIOD".to_string()));
        }
        // A fraction of one core, never more
        if sandbox.cpu_quota <= 0 || sandbox.cpu_quota > sandbox.cpu_period {
            return Err(ConfigError::InvalidValue("JUDGE_CPU_QUOTA".to_string()));
        }
        if sandbox.max_concurrent == 0 {
            return Err(ConfigError::InvalidValue(
                "JUDGE_MAX_CONCURRENT_SANDBOXES".to_string(),
            ));
        }
        if self.docker.image.trim().is_empty() {
            return Err(ConfigError::InvalidValue("JUDGE_IMAGE".to_string()));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            docker: DockerConfig {
                socket_path: DEFAULT_DOCKER_SOCKET.to_string(),
                image: DEFAULT_JUDGE_IMAGE.to_string(),
            },
            sandbox: SandboxConfig::default(),
            judge: JudgeConfig::default(),
            log: LogConfig {
                rust_log: DEFAULT_LOG_LEVEL.to_string(),
                format: LogFormat::Pretty,
            },
        }
    }
}

impl DockerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            socket_path: env::var("DOCKER_SOCKET")
                .unwrap_or_else(|_| DEFAULT_DOCKER_SOCKET.to_string()),
            image: env::var("JUDGE_IMAGE").unwrap_or_else(|_| DEFAULT_JUDGE_IMAGE.to_string()),
        })
    }
}

impl SandboxConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            memory_limit_mb: parse_var("JUDGE_MEMORY_LIMIT_MB", DEFAULT_MEMORY_LIMIT_MB)?,
            cpu_quota: parse_var("JUDGE_CPU_QUOTA", DEFAULT_CPU_QUOTA)?,
            cpu_period: parse_var("JUDGE_CPU_PERIOD", DEFAULT_CPU_PERIOD)?,
            pids_limit: parse_var("JUDGE_PIDS_LIMIT", DEFAULT_PIDS_LIMIT)?,
            timeout_secs: parse_var("JUDGE_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
            user: env::var("JUDGE_SANDBOX_USER")
                .unwrap_or_else(|_| DEFAULT_SANDBOX_USER.to_string()),
            max_concurrent: parse_var(
                "JUDGE_MAX_CONCURRENT_SANDBOXES",
                DEFAULT_MAX_CONCURRENT_SANDBOXES,
            )?,
            output_limit_bytes: parse_var("JUDGE_OUTPUT_LIMIT_BYTES", DEFAULT_OUTPUT_LIMIT_BYTES)?,
            tmpfs_size_mb: parse_var("JUDGE_TMPFS_SIZE_MB", DEFAULT_TMPFS_SIZE_MB)?,
        })
    }

    /// Memory ceiling in bytes, as Docker expects it
    pub fn memory_limit_bytes(&self) -> i64 {
        (self.memory_limit_mb * 1024 * 1024) as i64
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            memory_limit_mb: DEFAULT_MEMORY_LIMIT_MB,
            cpu_quota: DEFAULT_CPU_QUOTA,
            cpu_period: DEFAULT_CPU_PERIOD,
            pids_limit: DEFAULT_PIDS_LIMIT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user: DEFAULT_SANDBOX_USER.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT_SANDBOXES,
            output_limit_bytes: DEFAULT_OUTPUT_LIMIT_BYTES,
            tmpfs_size_mb: DEFAULT_TMPFS_SIZE_MB,
        }
    }
}

impl JudgeConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            work_root: env::var("JUDGE_WORK_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| env::temp_dir()),
            stderr_limit_chars: parse_var("JUDGE_STDERR_LIMIT_CHARS", DEFAULT_STDERR_LIMIT_CHARS)?,
        })
    }
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            work_root: env::temp_dir(),
            stderr_limit_chars: DEFAULT_STDERR_LIMIT_CHARS,
        }
    }
}

impl LogConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string()),
            format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .parse()?,
        })
    }
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(ConfigError::InvalidValue("LOG_FORMAT".to_string())),
        }
    }
}

/// Read `name` from the environment, falling back to `default` when unset
fn parse_var<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name.to_string())),
        Err(_) => Ok(default),
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.docker.image, "code-judge-env:latest");
        assert_eq!(config.sandbox.memory_limit_bytes(), 128 * 1024 * 1024);
        assert_eq!(config.sandbox.timeout(), Duration::from_secs(10));
        assert_eq!(config.sandbox.user, "1000:1000");
        assert_eq!(config.judge.stderr_limit_chars, 4096);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cpu_quota_must_not_exceed_period() {
        let mut config = Config::default();
        config.sandbox.cpu_quota = config.sandbox.cpu_period + 1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue(name)) if name == "JUDGE_CPU_QUOTA"
        ));
    }

    #[test]
    fn test_zero_limits_rejected() {
        let mut config = Config::default();
        config.sandbox.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.sandbox.pids_limit = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.sandbox.memory_limit_mb = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("Pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
