//! C language profile

use super::{Language, LanguageProfile};

/// Get profile for C
pub fn profile() -> LanguageProfile {
    LanguageProfile {
        language: Language::C,
        source_filename: "main.c",
        compile_command: Some("gcc main.c -o main"),
        run_command_template: "./main < {input_file}",
    }
}
