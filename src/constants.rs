//! Engine-wide constants
//!
//! This module contains all constant values used throughout the engine.
//! Constants are grouped by their purpose for better organization.

// =============================================================================
// DOCKER DEFAULTS
// =============================================================================

/// Default Docker socket path
pub const DEFAULT_DOCKER_SOCKET: &str = "/var/run/docker.sock";

/// Default image providing python3, gcc and g++
pub const DEFAULT_JUDGE_IMAGE: &str = "code-judge-env:latest";

/// Mount point of the request working directory inside the container
pub const CONTAINER_WORKDIR: &str = "/usr/src/app";

/// Label attached to every judge container
pub const CONTAINER_LABEL: &str = "code-judge.purpose";

/// Prefix for judge container names
pub const CONTAINER_NAME_PREFIX: &str = "code-judge";

// =============================================================================
// SANDBOX DEFAULTS
// =============================================================================

/// Default memory ceiling in megabytes
pub const DEFAULT_MEMORY_LIMIT_MB: u64 = 128;

/// Default CPU quota in microseconds per period (5% of one core)
pub const DEFAULT_CPU_QUOTA: i64 = 50_000;

/// Default CPU period in microseconds
pub const DEFAULT_CPU_PERIOD: i64 = 1_000_000;

/// Default ceiling on live processes and threads
pub const DEFAULT_PIDS_LIMIT: i64 = 64;

/// Default wall-clock timeout per invocation in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default unprivileged identity inside the container
pub const DEFAULT_SANDBOX_USER: &str = "1000:1000";

/// Default number of containers allowed to run at once
pub const DEFAULT_MAX_CONCURRENT_SANDBOXES: usize = 8;

/// Default cap on captured bytes per stream
pub const DEFAULT_OUTPUT_LIMIT_BYTES: usize = 1024 * 1024;

/// Default size of the scratch tmpfs in megabytes
pub const DEFAULT_TMPFS_SIZE_MB: u64 = 16;

// =============================================================================
// JUDGE DEFAULTS
// =============================================================================

/// Default cap on stderr characters copied into a result
pub const DEFAULT_STDERR_LIMIT_CHARS: usize = 4096;

/// Prefix of request working directories
pub const WORKSPACE_PREFIX: &str = "judge_";

/// Default log filter
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// RESULT MESSAGES
// =============================================================================

/// Fixed messages written into result error fields
pub mod messages {
    pub const TIME_LIMIT_EXCEEDED: &str = "Time Limit Exceeded";
    pub const MEMORY_LIMIT_EXCEEDED: &str = "Memory Limit Exceeded";
    pub const RUNTIME_ERROR: &str = "Runtime Error";
    pub const COMPILATION_ERROR: &str = "Compilation Error";
}

// =============================================================================
// SUPPORTED LANGUAGES
// =============================================================================

/// Language identifiers
pub mod languages {
    pub const PYTHON: &str = "python";
    pub const C: &str = "c";
    pub const CPP: &str = "cpp";

    /// All supported language identifiers
    pub const ALL: &[&str] = &[PYTHON, C, CPP];
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Maximum source code size (1 MB)
pub const MAX_SOURCE_CODE_SIZE: u64 = 1024 * 1024;

/// Maximum test case input size (10 MB)
pub const MAX_TEST_CASE_INPUT_SIZE: u64 = 10 * 1024 * 1024;

/// Maximum test case expected output size, bounded by the default stdout capture
pub const MAX_TEST_CASE_OUTPUT_SIZE: u64 = DEFAULT_OUTPUT_LIMIT_BYTES as u64;
