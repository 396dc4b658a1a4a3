use std::path::{Path, PathBuf};

use log::debug;
use tokio::process::Command;

use crate::error::{PrKitError, Result};

/// Handle to a local git repository, backed by git subprocesses.
pub struct GitRepo {
    path: PathBuf,
}

impl GitRepo {
    /// Open a repository, verifying the path is inside a git work tree.
    pub async fn open(path: &Path) -> Result<Self> {
        let output = Command::new("git")
            .args(["rev-parse", "--git-dir"])
            .current_dir(path)
            .output()
            .await
            .map_err(|e| PrKitError::Git(format!("Failed to execute git: {e}")))?;

        if !output.status.success() {
            return Err(PrKitError::Git(format!(
                "{} is not a valid git repository",
                path.display()
            )));
        }

        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// Name of the currently checked-out branch.
    pub async fn current_branch(&self) -> Result<String> {
        let output = self
            .run(&["rev-parse", "--abbrev-ref", "HEAD"], "resolve HEAD")
            .await?;

        let branch = String::from_utf8_lossy(&output).trim().to_string();
        if branch.is_empty() || branch == "HEAD" {
            return Err(PrKitError::Git(
                "No branch is checked out (detached HEAD?)".to_string(),
            ));
        }

        Ok(branch)
    }

    /// Fetch URL of the named remote.
    pub async fn remote_url(&self, remote: &str) -> Result<String> {
        let output = self
            .run(&["remote", "get-url", remote], "look up remote")
            .await
            .map_err(|_| {
                PrKitError::Git(format!(
                    "Remote '{remote}' not found in {}",
                    self.path.display()
                ))
            })?;

        Ok(String::from_utf8_lossy(&output).trim().to_string())
    }

    /// Push a branch to the named remote.
    pub async fn push(&self, remote: &str, branch: &str) -> Result<()> {
        debug!("Pushing {branch} to {remote}");

        self.run(&["push", remote, branch], "push").await?;

        Ok(())
    }

    async fn run(&self, args: &[&str], action: &str) -> Result<Vec<u8>> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.path)
            .output()
            .await
            .map_err(|e| PrKitError::Git(format!("Failed to {action}: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PrKitError::Git(format!(
                "git {} failed: {}",
                args.first().unwrap_or(&""),
                stderr.trim()
            )));
        }

        Ok(output.stdout)
    }
}
