//! Test case model

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::constants::{MAX_TEST_CASE_INPUT_SIZE, MAX_TEST_CASE_OUTPUT_SIZE};

/// Test case as submitted by the collaborator
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TestCaseInput {
    #[validate(length(max = MAX_TEST_CASE_INPUT_SIZE))]
    pub input: String,

    #[validate(length(max = MAX_TEST_CASE_OUTPUT_SIZE))]
    pub expected_output: String,

    /// Visibility only; does not affect judging
    #[serde(default)]
    pub is_hidden: bool,
}

/// Test case owned by a judge request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    /// 1-based position in the request
    pub ordinal: usize,
    pub input: String,
    pub expected_output: String,
    pub is_hidden: bool,
}

impl TestCase {
    /// Name of the file the input is written to inside the working directory
    pub fn input_filename(&self) -> String {
        format!("input_{}.txt", self.ordinal)
    }

    /// Trim-equality against the expected output
    pub fn matches(&self, observed: &str) -> bool {
        observed.trim() == self.expected_output.trim()
    }
}

/// Assign 1-based ordinals by position
pub fn number_test_cases(inputs: Vec<TestCaseInput>) -> Vec<TestCase> {
    inputs
        .into_iter()
        .enumerate()
        .map(|(idx, case)| TestCase {
            ordinal: idx + 1,
            input: case.input,
            expected_output: case.expected_output,
            is_hidden: case.is_hidden,
        })
        .collect()
}
