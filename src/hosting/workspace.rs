use anyhow::Context;
use std::path::PathBuf;
use std::process::Output;
use tokio::process::Command;

/// The version-control collaborator: a git checkout shared with the players.
///
/// Content-level semantics (what a diff means, how a merge applies) are the
/// black box; this wrapper only fetches branches, extracts diffs for voters
/// to review, runs the optional pre-merge check, and lands passed proposals
/// on main. Every failure is logged by the caller and never corrupts game
/// state.
pub struct Workspace {
    repo: PathBuf,
    check: Option<String>,
}

impl Workspace {
    pub fn new(repo: impl Into<PathBuf>, check: Option<String>) -> Self {
        Self {
            repo: repo.into(),
            check,
        }
    }

    /// Initializes the repository with an initial commit if it has never
    /// been initialized. No-op otherwise.
    pub async fn init(&self) -> anyhow::Result<()> {
        if self.repo.join(".git").exists() {
            return Ok(());
        }
        self.git(&["init"]).await?;
        self.git(&["add", "."]).await?;
        self.git(&["commit", "-m", "Initial commit with Nomic rules"])
            .await?;
        log::info!("initialized git repository at {}", self.repo.display());
        Ok(())
    }

    /// Fetches a proposal branch and returns its diff against main, for
    /// voters to review. A fetch failure yields whatever diff git can
    /// produce, which may be empty.
    pub async fn diff(&self, branch: &str) -> anyhow::Result<String> {
        if let Err(e) = self.git(&["fetch", "origin", branch]).await {
            log::warn!("fetch of {} failed: {}", branch, e);
        }
        let output = self
            .git(&["diff", "main", &format!("origin/{}", branch)])
            .await?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Runs the configured check command against the checked-out branch.
    /// Returns None when the check passes (or none is configured), or the
    /// failure output. Always restores main.
    pub async fn verify(&self, branch: &str) -> anyhow::Result<Option<String>> {
        let check = match &self.check {
            Some(check) => check.clone(),
            None => return Ok(None),
        };
        let _ = self.git(&["fetch", "origin", branch]).await;
        let _ = self.git(&["checkout", &format!("origin/{}", branch)]).await;
        let result = Command::new("sh")
            .arg("-c")
            .arg(&check)
            .current_dir(&self.repo)
            .output()
            .await
            .context("run pre-merge check");
        let _ = self.git(&["checkout", "main"]).await;
        let output = result?;
        if output.status.success() {
            Ok(None)
        } else {
            // fall back to stdout for checks that report failures there
            let detail = String::from_utf8_lossy(&output.stderr).into_owned();
            if detail.trim().is_empty() {
                Ok(Some(String::from_utf8_lossy(&output.stdout).into_owned()))
            } else {
                Ok(Some(detail))
            }
        }
    }

    /// Merges a passed proposal branch into main, pushes, and deletes the
    /// remote branch.
    pub async fn merge(&self, branch: &str, proposal_id: u64) -> anyhow::Result<()> {
        self.git(&["fetch", "origin"]).await?;
        self.git(&[
            "merge",
            &format!("origin/{}", branch),
            "-m",
            &format!("Merge proposal {}", proposal_id),
        ])
        .await?;
        let _ = self.git(&["push", "origin", "main"]).await;
        let _ = self.git(&["push", "origin", "--delete", branch]).await;
        log::info!("merged branch {} for proposal {}", branch, proposal_id);
        Ok(())
    }

    async fn git(&self, args: &[&str]) -> anyhow::Result<Output> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo)
            .output()
            .await
            .with_context(|| format!("spawn git {:?}", args))?;
        if output.status.success() {
            Ok(output)
        } else {
            anyhow::bail!(
                "git {:?} failed: {}",
                args,
                String::from_utf8_lossy(&output.stderr)
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(test: &str) -> PathBuf {
        let dir =
            std::env::temp_dir().join(format!("nomic-workspace-{}-{}", test, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn verify_passes_when_no_check_configured() {
        let workspace = Workspace::new(scratch("nocheck"), None);
        assert!(workspace.verify("nomic/301").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn verify_reports_stderr_of_a_failing_check() {
        let check = "echo out; echo err 1>&2; exit 1".to_string();
        let workspace = Workspace::new(scratch("stderr"), Some(check));
        let failure = workspace.verify("nomic/301").await.unwrap().unwrap();
        assert!(failure.contains("err"));
    }

    #[tokio::test]
    async fn verify_falls_back_to_stdout_when_stderr_empty() {
        let check = "echo assertion failed; exit 1".to_string();
        let workspace = Workspace::new(scratch("stdout"), Some(check));
        let failure = workspace.verify("nomic/301").await.unwrap().unwrap();
        assert!(failure.contains("assertion failed"));
    }

    #[tokio::test]
    async fn verify_passes_on_a_clean_check() {
        let workspace = Workspace::new(scratch("clean"), Some("exit 0".to_string()));
        assert!(workspace.verify("nomic/301").await.unwrap().is_none());
    }
}
