//! CodeJudge - Sandboxed Submission Judging Engine
//!
//! This library compiles and runs untrusted submissions against ordered test
//! cases inside disposable Docker containers and reports a verdict.
//!
//! # Features
//!
//! - Python, C and C++ submissions
//! - No network, read-only filesystem, memory/CPU/process ceilings,
//!   unprivileged user for every invocation
//! - Per-test classification: accepted, wrong answer, time limit,
//!   memory limit, runtime error, compile error
//! - Swappable isolation backend behind the [`judge::Sandbox`] trait
//!
//! # Architecture
//!
//! - **Judge**: the pipeline collaborators call with a [`models::JudgeRequest`]
//! - **Sandbox**: the isolation backend, Docker by default
//! - **Verdict**: per-test results plus the derived overall status

pub mod config;
pub mod constants;
pub mod error;
pub mod judge;
pub mod models;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{JudgeError, JudgeResult};
pub use judge::{DockerSandbox, Judge, JudgeVerdict, Verdict};
pub use models::JudgeRequest;
