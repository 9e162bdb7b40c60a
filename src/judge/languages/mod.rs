//! Language profiles for compilation and execution
//!
//! The registry is built once per process and never mutated, so lookups from
//! concurrently running judge requests need no locking.

pub mod c;
pub mod cpp;
pub mod python;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::{
    constants,
    error::{JudgeError, JudgeResult},
};

/// Placeholder in run templates replaced by the per-test input file name
pub const INPUT_FILE_PLACEHOLDER: &str = "{input_file}";

static REGISTRY: LazyLock<HashMap<Language, LanguageProfile>> = LazyLock::new(|| {
    [python::profile(), c::profile(), cpp::profile()]
        .into_iter()
        .map(|profile| (profile.language, profile))
        .collect()
});

/// Supported submission languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    C,
    Cpp,
}

impl Language {
    /// Identifier used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => constants::languages::PYTHON,
            Language::C => constants::languages::C,
            Language::Cpp => constants::languages::CPP,
        }
    }
}

impl FromStr for Language {
    type Err = JudgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            constants::languages::PYTHON => Ok(Language::Python),
            constants::languages::C => Ok(Language::C),
            constants::languages::CPP => Ok(Language::Cpp),
            _ => Err(JudgeError::UnsupportedLanguage(s.to_string())),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How one language is written to disk, compiled and run
#[derive(Debug, Clone)]
pub struct LanguageProfile {
    pub language: Language,
    pub source_filename: &'static str,
    /// Runs against `source_filename`; independent of any test case
    pub compile_command: Option<&'static str>,
    /// Contains [`INPUT_FILE_PLACEHOLDER`]
    pub run_command_template: &'static str,
}

impl LanguageProfile {
    /// Look up the profile for a language identifier
    pub fn resolve(language_id: &str) -> JudgeResult<&'static LanguageProfile> {
        let language: Language = language_id.parse()?;

        REGISTRY
            .get(&language)
            .ok_or_else(|| JudgeError::UnsupportedLanguage(language_id.to_string()))
    }

    pub fn needs_compilation(&self) -> bool {
        self.compile_command.is_some()
    }

    /// Build the run command for one test case
    pub fn run_command(&self, input_file: &str) -> String {
        self.run_command_template
            .replace(INPUT_FILE_PLACEHOLDER, input_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_supported_languages() {
        for id in constants::languages::ALL {
            let profile = LanguageProfile::resolve(id).unwrap();
            assert_eq!(profile.language.as_str(), *id);
            assert!(profile.run_command_template.contains(INPUT_FILE_PLACEHOLDER));
        }
    }

    #[test]
    fn test_resolve_unknown_language() {
        let err = LanguageProfile::resolve("java").unwrap_err();
        assert!(matches!(err, JudgeError::UnsupportedLanguage(id) if id == "java"));

        // Identifiers are exact
        assert!(LanguageProfile::resolve("Python").is_err());
        assert!(LanguageProfile::resolve("").is_err());
    }

    #[test]
    fn test_python_is_interpreted() {
        let profile = LanguageProfile::resolve("python").unwrap();
        assert!(!profile.needs_compilation());
        assert_eq!(profile.source_filename, "main.py");
        assert_eq!(
            profile.run_command("input_1.txt"),
            "python3 main.py < input_1.txt"
        );
    }

    #[test]
    fn test_compiled_languages() {
        let c = LanguageProfile::resolve("c").unwrap();
        assert_eq!(c.compile_command, Some("gcc main.c -o main"));

        let cpp = LanguageProfile::resolve("cpp").unwrap();
        assert_eq!(cpp.compile_command, Some("g++ main.cpp -o main"));
        assert_eq!(cpp.run_command("input_7.txt"), "./main < input_7.txt");
    }
}
