//! Request-scoped working directory
//!
//! Holds the source file, the compiled binary and one input file per test
//! case. The directory is deleted when the [`Workspace`] is dropped.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tokio::fs;

use crate::constants::WORKSPACE_PREFIX;

use super::languages::LanguageProfile;
use crate::models::TestCase;

/// Compile step: the sandbox user writes the binary; sticky so nobody replaces our files
const WRITABLE_MODE: u32 = 0o1777;
const SEALED_MODE: u32 = 0o755;
const FILE_MODE: u32 = 0o644;

pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create a fresh directory under `root` and write the source into it
    pub async fn create(
        root: &Path,
        profile: &LanguageProfile,
        code: &str,
    ) -> std::io::Result<Self> {
        fs::create_dir_all(root).await?;

        let dir = tempfile::Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .tempdir_in(root)?;
        let mode = if profile.needs_compilation() {
            WRITABLE_MODE
        } else {
            SEALED_MODE
        };
        fs::set_permissions(dir.path(), std::fs::Permissions::from_mode(mode)).await?;

        let workspace = Self { dir };
        workspace.write_file(profile.source_filename, code).await?;

        Ok(workspace)
    }

    /// Drop write access for everyone but the owner once compilation is done
    pub async fn seal(&self) -> std::io::Result<()> {
        fs::set_permissions(self.dir.path(), std::fs::Permissions::from_mode(SEALED_MODE)).await
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a test case's input and return its file name
    pub async fn write_input(&self, test_case: &TestCase) -> std::io::Result<String> {
        let filename = test_case.input_filename();
        self.write_file(&filename, &test_case.input).await?;
        Ok(filename)
    }

    async fn write_file(&self, filename: &str, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join(filename);
        fs::write(&path, contents).await?;
        fs::set_permissions(&path, std::fs::Permissions::from_mode(FILE_MODE)).await?;
        Ok(path)
    }
}
