//! Judging pipeline - compiles once, then runs every test case in order
//!
//! One request moves through `Compiling` (skipped for interpreted languages),
//! `RunningTests` and `Done`. Invocations within a request are strictly
//! sequential because they share one working directory; separate requests
//! may be judged concurrently on the same [`Judge`].

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, instrument, warn};
use validator::Validate;

use crate::{
    config::{Config, SandboxConfig},
    constants::messages,
    error::{JudgeError, JudgeResult},
    models::{number_test_cases, JudgeRequest, TestCase},
    utils::{format_milliseconds, round_to_millis, truncate_chars},
};

use super::{
    languages::LanguageProfile,
    sandbox::{Sandbox, SandboxRequest, SandboxResult},
    verdict::{JudgeVerdict, TestCaseResult},
    workspace::Workspace,
};

/// Pipeline state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JudgeStage {
    Compiling,
    RunningTests,
    Done,
}

impl JudgeStage {
    fn initial(profile: &LanguageProfile) -> Self {
        if profile.needs_compilation() {
            JudgeStage::Compiling
        } else {
            JudgeStage::RunningTests
        }
    }
}

/// Judging engine entry point
pub struct Judge {
    sandbox: Arc<dyn Sandbox>,
    limits: SandboxConfig,
    work_root: PathBuf,
    stderr_limit_chars: usize,
}

impl Judge {
    pub fn new(sandbox: Arc<dyn Sandbox>, config: &Config) -> Self {
        Self {
            sandbox,
            limits: config.sandbox.clone(),
            work_root: config.judge.work_root.clone(),
            stderr_limit_chars: config.judge.stderr_limit_chars,
        }
    }

    /// Judge one submission against its test cases.
    ///
    /// Fails only for request-level problems: invalid input, unsupported
    /// language, or a working directory that cannot be created. Everything
    /// else is recorded per test case in the returned verdict.
    #[instrument(skip_all, fields(language = %request.language, test_cases = request.test_cases.len()))]
    pub async fn judge(&self, request: JudgeRequest) -> JudgeResult<JudgeVerdict> {
        request.validate()?;
        let profile = LanguageProfile::resolve(&request.language)?;
        self.check_expected_output_fits(&request)?;
        let test_cases = number_test_cases(request.test_cases);

        let workspace = Workspace::create(&self.work_root, profile, &request.code).await?;
        debug!(workspace = %workspace.path().display(), "Workspace ready");

        let started = Instant::now();
        let mut stage = JudgeStage::initial(profile);
        let mut results = Vec::with_capacity(test_cases.len());
        let mut compile_error = None;

        while stage != JudgeStage::Done {
            debug!(?stage, "Entering stage");

            stage = match stage {
                JudgeStage::Compiling => match self.compile(profile, &workspace).await {
                    Ok(()) => {
                        workspace.seal().await?;
                        JudgeStage::RunningTests
                    }
                    Err(detail) => {
                        results = test_cases
                            .iter()
                            .map(|case| TestCaseResult::compile_error(case.ordinal, detail.clone()))
                            .collect();
                        compile_error = Some(detail);
                        JudgeStage::Done
                    }
                },
                JudgeStage::RunningTests => {
                    for case in &test_cases {
                        results.push(self.run_test_case(profile, &workspace, case).await);
                    }
                    JudgeStage::Done
                }
                JudgeStage::Done => JudgeStage::Done,
            };
        }

        let verdict = JudgeVerdict::from_results(results, compile_error);
        info!(
            status = verdict.overall_status.as_str(),
            passed = verdict.passed_count,
            total = verdict.total_count,
            "Judging finished in {}",
            format_milliseconds(started.elapsed().as_millis())
        );

        Ok(verdict)
    }

    /// Captured stdout is capped, so a longer expected answer could never match
    fn check_expected_output_fits(&self, request: &JudgeRequest) -> JudgeResult<()> {
        let limit = self.limits.output_limit_bytes;
        match request
            .test_cases
            .iter()
            .position(|case| case.expected_output.trim().len() > limit)
        {
            Some(index) => Err(JudgeError::InvalidRequest(format!(
                "test_cases[{}].expected_output exceeds the {} byte output limit",
                index, limit
            ))),
            None => Ok(()),
        }
    }

    /// Err carries the diagnostic shown on every test case
    async fn compile(&self, profile: &LanguageProfile, workspace: &Workspace) -> Result<(), String> {
        let Some(command) = profile.compile_command else {
            return Ok(());
        };

        let request = SandboxRequest::compile(workspace.path(), command, &self.limits);
        let result = self.sandbox.execute(&request).await;

        if result.exit_code == 0 {
            debug!("Compilation succeeded");
            return Ok(());
        }

        warn!(
            exit_code = result.exit_code,
            timed_out = result.timed_out,
            "Compilation failed"
        );
        Err(self.diagnostic(&result.stderr, messages::COMPILATION_ERROR))
    }

    async fn run_test_case(
        &self,
        profile: &LanguageProfile,
        workspace: &Workspace,
        case: &TestCase,
    ) -> TestCaseResult {
        let input_file = match workspace.write_input(case).await {
            Ok(filename) => filename,
            Err(e) => {
                error!(test_case = case.ordinal, "Failed to write test input: {}", e);
                let failure = SandboxResult::infrastructure_failure("failed to prepare test input");
                return TestCaseResult::runtime_error(case.ordinal, failure.stderr, 0.0);
            }
        };

        let request = SandboxRequest::run(
            case.ordinal,
            workspace.path(),
            profile.run_command(&input_file),
            &self.limits,
        );

        let start = Instant::now();
        let result = self.sandbox.execute(&request).await;
        let elapsed = round_to_millis(start.elapsed());

        let outcome = self.classify(case, &result, elapsed);
        debug!(
            test_case = case.ordinal,
            status = outcome.status.as_str(),
            time_used = elapsed,
            "Test case judged"
        );

        outcome
    }

    /// Timeout, then memory, then exit code, then output comparison
    fn classify(&self, case: &TestCase, result: &SandboxResult, elapsed: f64) -> TestCaseResult {
        if result.timed_out {
            return TestCaseResult::time_limit_exceeded(case.ordinal, elapsed);
        }
        if result.out_of_memory {
            return TestCaseResult::memory_limit_exceeded(case.ordinal, elapsed);
        }
        if result.exit_code != 0 {
            let message = self.diagnostic(&result.stderr, messages::RUNTIME_ERROR);
            return TestCaseResult::runtime_error(case.ordinal, message, elapsed);
        }

        let output = result.stdout.trim().to_string();
        if case.matches(&output) {
            TestCaseResult::accepted(case.ordinal, output, elapsed)
        } else {
            TestCaseResult::wrong_answer(case.ordinal, output, elapsed)
        }
    }

    /// Truncated stderr, or `fallback` when there is none
    fn diagnostic(&self, stderr: &str, fallback: &str) -> String {
        if stderr.trim().is_empty() {
            fallback.to_string()
        } else {
            truncate_chars(stderr, self.stderr_limit_chars)
        }
    }
}
