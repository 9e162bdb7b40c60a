//! Verdict types and determination logic

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::messages;

/// Verdict for a single test case or entire submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Output matched after trimming
    Accepted,
    /// Output does not match expected
    WrongAnswer,
    /// Killed at the wall-clock deadline
    TimeLimitExceeded,
    /// Killed by the memory ceiling
    MemoryLimitExceeded,
    /// Non-zero exit, or the sandbox itself failed
    RuntimeError,
    /// Compile step exited non-zero
    CompileError,
}

impl Verdict {
    /// Get short code for verdict
    pub fn code(&self) -> &'static str {
        match self {
            Verdict::Accepted => "AC",
            Verdict::WrongAnswer => "WA",
            Verdict::TimeLimitExceeded => "TLE",
            Verdict::MemoryLimitExceeded => "MLE",
            Verdict::RuntimeError => "RE",
            Verdict::CompileError => "CE",
        }
    }

    pub fn is_failure(&self) -> bool {
        !matches!(self, Verdict::Accepted)
    }

    /// Status string the collaborator stores
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Accepted => "accepted",
            Verdict::WrongAnswer => "wrong_answer",
            Verdict::TimeLimitExceeded => "time_limit_exceeded",
            Verdict::MemoryLimitExceeded => "memory_limit_exceeded",
            Verdict::RuntimeError => "runtime_error",
            Verdict::CompileError => "compile_error",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Result of executing a single test case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCaseResult {
    /// Test case number (1-indexed)
    #[serde(rename = "id")]
    pub ordinal: usize,

    pub status: Verdict,

    pub passed: bool,

    /// Trimmed stdout; empty unless the program exited normally
    #[serde(rename = "output")]
    pub observed_output: String,

    /// Empty when passed and on wrong answer
    #[serde(rename = "error")]
    pub error_message: String,

    /// Wall-clock seconds with millisecond precision
    #[serde(rename = "time_used")]
    pub elapsed_seconds: f64,
}

impl TestCaseResult {
    pub fn accepted(ordinal: usize, output: String, elapsed_seconds: f64) -> Self {
        Self {
            ordinal,
            status: Verdict::Accepted,
            passed: true,
            observed_output: output,
            error_message: String::new(),
            elapsed_seconds,
        }
    }

    /// Keeps the actual output for diagnostics
    pub fn wrong_answer(ordinal: usize, output: String, elapsed_seconds: f64) -> Self {
        Self {
            ordinal,
            status: Verdict::WrongAnswer,
            passed: false,
            observed_output: output,
            error_message: String::new(),
            elapsed_seconds,
        }
    }

    pub fn time_limit_exceeded(ordinal: usize, elapsed_seconds: f64) -> Self {
        Self::failed(
            ordinal,
            Verdict::TimeLimitExceeded,
            messages::TIME_LIMIT_EXCEEDED.to_string(),
            elapsed_seconds,
        )
    }

    pub fn memory_limit_exceeded(ordinal: usize, elapsed_seconds: f64) -> Self {
        Self::failed(
            ordinal,
            Verdict::MemoryLimitExceeded,
            messages::MEMORY_LIMIT_EXCEEDED.to_string(),
            elapsed_seconds,
        )
    }

    pub fn runtime_error(ordinal: usize, message: String, elapsed_seconds: f64) -> Self {
        Self::failed(ordinal, Verdict::RuntimeError, message, elapsed_seconds)
    }

    /// Compilation never reached this test, so no time is charged
    pub fn compile_error(ordinal: usize, detail: String) -> Self {
        Self::failed(ordinal, Verdict::CompileError, detail, 0.0)
    }

    fn failed(ordinal: usize, status: Verdict, error_message: String, elapsed_seconds: f64) -> Self {
        Self {
            ordinal,
            status,
            passed: false,
            observed_output: String::new(),
            error_message,
            elapsed_seconds,
        }
    }
}

/// Status of the first failing test by ordinal, or accepted.
///
/// Order decides, not severity: a wrong answer on test 1 outranks a
/// runtime error on test 2.
pub fn aggregate(results: &[TestCaseResult]) -> Verdict {
    results
        .iter()
        .find(|r| r.status.is_failure())
        .map(|r| r.status)
        .unwrap_or(Verdict::Accepted)
}

/// Aggregated result for an entire judge request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgeVerdict {
    /// Derived from `results`, which stay the source of truth
    #[serde(rename = "status")]
    pub overall_status: Verdict,

    pub results: Vec<TestCaseResult>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub compile_error: Option<String>,

    pub passed_count: usize,

    pub total_count: usize,

    /// Slowest test case in seconds
    pub max_time_used: f64,

    pub judged_at: DateTime<Utc>,
}

impl JudgeVerdict {
    pub fn from_results(results: Vec<TestCaseResult>, compile_error: Option<String>) -> Self {
        // A failed compile stands even when there were no tests to fail
        let overall_status = if compile_error.is_some() {
            Verdict::CompileError
        } else {
            aggregate(&results)
        };

        let passed_count = results.iter().filter(|r| r.passed).count();
        let max_time_used = results
            .iter()
            .map(|r| r.elapsed_seconds)
            .fold(0.0, f64::max);

        Self {
            overall_status,
            total_count: results.len(),
            passed_count,
            max_time_used,
            results,
            compile_error,
            judged_at: Utc::now(),
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.overall_status == Verdict::Accepted
    }
}
