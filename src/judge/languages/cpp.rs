//! C++ language profile

use super::{Language, LanguageProfile};

/// Get profile for C++
pub fn profile() -> LanguageProfile {
    LanguageProfile {
        language: Language::Cpp,
        source_filename: "main.cpp",
        compile_command: Some("g++ main.cpp -o main"),
        run_command_template: "./main < {input_file}",
    }
}
