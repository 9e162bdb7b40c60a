//! Judge request DTO

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::constants::MAX_SOURCE_CODE_SIZE;

use super::test_case::TestCaseInput;

/// One submission to evaluate against its ordered test cases
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct JudgeRequest {
    /// Source code, possibly empty
    #[validate(length(max = MAX_SOURCE_CODE_SIZE))]
    pub code: String,

    /// Programming language identifier, checked against the registry
    pub language: String,

    #[validate(nested)]
    pub test_cases: Vec<TestCaseInput>,
}

impl JudgeRequest {
    pub fn new(
        code: impl Into<String>,
        language: impl Into<String>,
        test_cases: Vec<TestCaseInput>,
    ) -> Self {
        Self {
            code: code.into(),
            language: language.into(),
            test_cases,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_request() {
        let request: JudgeRequest = serde_json::from_str(
            r#"{
                "code": "print(int(input())+1)",
                "language": "python",
                "test_cases": [
                    {"input": "1", "expected_output": "2"},
                    {"input": "5", "expected_output": "6", "is_hidden": true}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(request.language, "python");
        assert_eq!(request.test_cases.len(), 2);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_empty_code_is_valid() {
        let request = JudgeRequest::new("", "python", Vec::new());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_oversized_code_rejected() {
        let code = "a".repeat(MAX_SOURCE_CODE_SIZE as usize + 1);
        let request = JudgeRequest::new(code, "python", Vec::new());
        assert!(request.validate().is_err());
    }
}
