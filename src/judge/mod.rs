//! Judging engine
//!
//! Leaves first:
//!
//! 1. **Languages** (`languages`): static registry of source file names,
//!    compile commands and run templates.
//! 2. **Sandbox** (`sandbox`, `container`): runs one command in a fresh,
//!    resource-bounded container and classifies how it ended.
//! 3. **Pipeline** (`pipeline`, `workspace`): writes the submission to a
//!    request-scoped directory, compiles once, runs each test case in order.
//! 4. **Verdict** (`verdict`): folds per-test results into one status.

pub mod container;
pub mod languages;
pub mod pipeline;
pub mod sandbox;
pub mod verdict;
pub mod workspace;

pub use container::DockerSandbox;
pub use languages::{Language, LanguageProfile};
pub use pipeline::{Judge, JudgeStage};
pub use sandbox::{Sandbox, SandboxRequest, SandboxResult};
pub use verdict::{JudgeVerdict, TestCaseResult, Verdict};
