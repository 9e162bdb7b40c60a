//! Python language profile

use super::{Language, LanguageProfile};

/// Get profile for Python
pub fn profile() -> LanguageProfile {
    LanguageProfile {
        language: Language::Python,
        source_filename: "main.py",
        compile_command: None,
        run_command_template: "python3 main.py < {input_file}",
    }
}
