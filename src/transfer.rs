//! Copy a repository from one remote to another
use std::{
    fs::remove_dir_all,
    path::{Path, PathBuf},
};

use crate::errors::{GitCopyError, GitCopyErrorKind};
use crate::git::{ExecResult, GitRunner};
use crate::utils::{working_dir_name, TransferRequest};

/// Remote repointed to the destination
const REMOTE_NAME: &str = "origin";

/// Outcome of the two pushes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushOutcome {
    /// Result of pushing all branches
    pub branches: ExecResult,

    /// Result of pushing all tags
    pub tags: ExecResult,
}

impl PushOutcome {
    /// Whether both pushes succeeded
    pub fn success(&self) -> bool {
        self.branches.success() && self.tags.success()
    }
}

/// What happened to the local clone
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupOutcome {
    /// Kept on request
    Preserved(PathBuf),

    /// Removed
    Removed(PathBuf),

    /// Removal failed, with the reason
    Failed(PathBuf, String),
}

/// Result of a successful transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReport {
    /// Local clone used for the transfer
    pub repo_path: PathBuf,

    /// What happened to the local clone
    pub cleanup: CleanupOutcome,
}

/// Run git, folding a start failure into a failed result
async fn run_captured<G: GitRunner + ?Sized>(git: &G, args: &[&str], cwd: &Path) -> ExecResult {
    let args = args.iter().map(|arg| arg.to_string()).collect();
    match git.run(args, Some(cwd.to_path_buf())).await {
        Ok(result) => result,
        Err(e) => ExecResult::not_run(&e),
    }
}

/// Check that git can be run, returning its version
pub(crate) async fn preflight<G: GitRunner + ?Sized>(git: &G) -> Result<String, GitCopyError> {
    let result = git
        .run(vec!["--version".to_string()], None)
        .await
        .map_err(|e| {
            GitCopyError::new(GitCopyErrorKind::GitUnavailable).with_text(e.to_string())
        })?;
    if !result.success() {
        return Err(
            GitCopyError::new(GitCopyErrorKind::GitUnavailable).with_text(result.error_text())
        );
    }
    Ok(result.stdout.trim().to_string())
}

/// Clone `source` inside `root`, returning the path of the clone
pub(crate) async fn clone_repository<G: GitRunner + ?Sized>(
    git: &G,
    source: &str,
    root: &Path,
) -> Result<PathBuf, GitCopyError> {
    let name = working_dir_name(source)?;
    let repo_path = root.join(&name);
    println!("Cloning {source} ...");
    let args = ["clone", "--bare", "--", source, name.as_str()];
    let result = run_captured(git, &args, root).await;
    if !result.success() {
        return Err(GitCopyError::new(GitCopyErrorKind::Clone).with_text(result.error_text()));
    }
    if !repo_path.is_dir() {
        return Err(GitCopyError::new(GitCopyErrorKind::CloneNotFound).with_path(&repo_path));
    }
    Ok(repo_path)
}

/// Point the clone's remote to `destination`
pub(crate) async fn rewrite_remote<G: GitRunner + ?Sized>(
    git: &G,
    repo_path: &Path,
    destination: &str,
) -> Result<(), GitCopyError> {
    println!("Setting remote to destination...");
    let args = ["remote", "set-url", "--", REMOTE_NAME, destination];
    let result = run_captured(git, &args, repo_path).await;
    if !result.success() {
        return Err(GitCopyError::new(GitCopyErrorKind::RemoteRewrite)
            .with_path(repo_path)
            .with_text(result.error_text()));
    }
    Ok(())
}

/// Push all branches, then all tags, even if the first push fails
pub(crate) async fn publish<G: GitRunner + ?Sized>(git: &G, repo_path: &Path) -> PushOutcome {
    let branches = run_captured(git, &["push", "--all", REMOTE_NAME], repo_path).await;
    let tags = run_captured(git, &["push", "--tags", REMOTE_NAME], repo_path).await;
    PushOutcome { branches, tags }
}

/// Remove the clone unless it must be preserved. Never fails.
pub(crate) fn cleanup(repo_path: &Path, preserve: bool) -> CleanupOutcome {
    if preserve {
        println!("Preserved local clone at: {}", repo_path.display());
        return CleanupOutcome::Preserved(repo_path.to_path_buf());
    }
    match remove_dir_all(repo_path) {
        Ok(_) => {
            println!("Cleaned up local directory.");
            CleanupOutcome::Removed(repo_path.to_path_buf())
        }
        Err(e) => {
            log::warn!("Failed to clean up {}: {e}", repo_path.display());
            CleanupOutcome::Failed(repo_path.to_path_buf(), e.to_string())
        }
    }
}

/// Copy every branch and tag of `request.source` to `request.destination`,
/// using a clone created inside `root`.
/// # Errors
/// Error if git is missing, or if cloning, repointing the remote or pushing fails.
/// On push failure the clone is still cleaned up before the error is returned.
pub async fn copy_repository<G: GitRunner + ?Sized>(
    git: &G,
    request: &TransferRequest,
    root: &Path,
) -> Result<TransferReport, GitCopyError> {
    let version = preflight(git).await?;
    log::debug!("Using {version}");

    let repo_path = clone_repository(git, &request.source, root).await?;

    if let Err(e) = rewrite_remote(git, &repo_path, &request.destination).await {
        log::warn!("Local clone left at {}", repo_path.display());
        return Err(e);
    }

    println!("Pushing all branches and tags to {} ...", request.destination);
    let pushed = publish(git, &repo_path).await;
    if pushed.success() {
        println!("Repository copied successfully!");
    } else {
        log::error!("Push failed:");
        log::error!("{}", pushed.branches.error_text());
        log::error!("{}", pushed.tags.error_text());
    }

    let cleaned = cleanup(&repo_path, request.preserve);
    if !pushed.success() {
        return Err(GitCopyError::new(GitCopyErrorKind::Push).with_text(&request.destination));
    }
    Ok(TransferReport {
        repo_path,
        cleanup: cleaned,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::git::{RunFuture, SystemGit};
    use std::{fs, process::Command, sync::Mutex};

    /// Records invocations, fails the commands starting with one of `fail`
    #[derive(Default)]
    struct FakeGit {
        calls: Mutex<Vec<String>>,
        fail: Vec<&'static str>,
        skip_clone_dir: bool,
    }

    impl FakeGit {
        fn failing(fail: &[&'static str]) -> Self {
            Self {
                fail: fail.to_vec(),
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl GitRunner for FakeGit {
        fn run(&self, args: Vec<String>, cwd: Option<PathBuf>) -> RunFuture<'_> {
            Box::pin(async move {
                let line = args.join(" ");
                self.calls.lock().unwrap().push(line.clone());
                if self.fail.iter().any(|f| line.starts_with(f)) {
                    return Ok(ExecResult {
                        code: Some(128),
                        stdout: String::new(),
                        stderr: format!("fatal: {line} refused"),
                    });
                }
                if args[0] == "clone" && !self.skip_clone_dir {
                    let dir = cwd.unwrap().join(&args[4]);
                    fs::create_dir_all(dir.join("refs"))?;
                    fs::write(dir.join("HEAD"), "ref: refs/heads/main\n")?;
                }
                Ok(ExecResult {
                    code: Some(0),
                    stdout: "ok\n".to_string(),
                    stderr: String::new(),
                })
            })
        }
    }

    fn demo_request(preserve: bool) -> TransferRequest {
        TransferRequest::new(
            "https://example.com/org/demo.git",
            "https://example.com/org2/demo.git",
            preserve,
        )
    }

    fn is_empty_dir(path: &Path) -> bool {
        fs::read_dir(path).unwrap().next().is_none()
    }

    #[tokio::test]
    async fn copy_then_remove_clone() {
        let root = tempfile::tempdir().unwrap();
        let git = FakeGit::default();
        let report = copy_repository(&git, &demo_request(false), root.path())
            .await
            .unwrap();
        let repo_path = root.path().join("demo");
        assert_eq!(report.repo_path, repo_path);
        assert_eq!(report.cleanup, CleanupOutcome::Removed(repo_path.clone()));
        assert!(!repo_path.exists());
        assert_eq!(
            git.calls(),
            vec![
                "--version",
                "clone --bare -- https://example.com/org/demo.git demo",
                "remote set-url -- origin https://example.com/org2/demo.git",
                "push --all origin",
                "push --tags origin",
            ]
        );
    }

    #[tokio::test]
    async fn preserved_clone_stays() {
        let root = tempfile::tempdir().unwrap();
        let git = FakeGit::default();
        let report = copy_repository(&git, &demo_request(true), root.path())
            .await
            .unwrap();
        let repo_path = root.path().join("demo");
        assert_eq!(report.cleanup, CleanupOutcome::Preserved(repo_path.clone()));
        assert!(repo_path.join("HEAD").exists());
    }

    #[tokio::test]
    async fn missing_git_touches_nothing() {
        let root = tempfile::tempdir().unwrap();
        let git = FakeGit::failing(&["--version"]);
        let err = copy_repository(&git, &demo_request(false), root.path())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), &GitCopyErrorKind::GitUnavailable);
        assert_eq!(git.calls(), vec!["--version"]);
        assert!(is_empty_dir(root.path()));
    }

    #[tokio::test]
    async fn unreachable_binary_touches_nothing() {
        let root = tempfile::tempdir().unwrap();
        let git = SystemGit::new(root.path().join("no-such-git"));
        let err = copy_repository(&git, &demo_request(false), root.path())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), &GitCopyErrorKind::GitUnavailable);
        assert!(is_empty_dir(root.path()));
    }

    #[tokio::test]
    async fn clone_failure_reports_git_output() {
        let root = tempfile::tempdir().unwrap();
        let git = FakeGit::failing(&["clone"]);
        let err = copy_repository(&git, &demo_request(false), root.path())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), &GitCopyErrorKind::Clone);
        assert!(err.to_string().contains("refused"));
        assert_eq!(git.calls().len(), 2);
    }

    #[tokio::test]
    async fn clone_without_directory_fails() {
        let root = tempfile::tempdir().unwrap();
        let git = FakeGit {
            skip_clone_dir: true,
            ..Default::default()
        };
        let err = copy_repository(&git, &demo_request(false), root.path())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), &GitCopyErrorKind::CloneNotFound);
        assert_eq!(err.path(), Some(root.path().join("demo").as_path()));
        assert_eq!(git.calls().len(), 2);
    }

    #[tokio::test]
    async fn remote_rewrite_failure_stops_before_push() {
        let root = tempfile::tempdir().unwrap();
        let git = FakeGit::failing(&["remote"]);
        let err = copy_repository(&git, &demo_request(false), root.path())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), &GitCopyErrorKind::RemoteRewrite);
        assert!(!git.calls().iter().any(|call| call.starts_with("push")));
    }

    #[tokio::test]
    async fn failed_branch_push_still_pushes_tags_and_cleans_up() {
        let root = tempfile::tempdir().unwrap();
        let git = FakeGit::failing(&["push --all"]);
        let err = copy_repository(&git, &demo_request(false), root.path())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), &GitCopyErrorKind::Push);
        assert_eq!(git.calls().last().map(String::as_str), Some("push --tags origin"));
        assert!(!root.path().join("demo").exists());
    }

    #[tokio::test]
    async fn publish_collects_both_results() {
        let root = tempfile::tempdir().unwrap();
        let git = FakeGit::failing(&["push --tags"]);
        let pushed = publish(&git, root.path()).await;
        assert!(pushed.branches.success());
        assert!(!pushed.tags.success());
        assert!(!pushed.success());
        assert_eq!(pushed.tags.error_text(), "fatal: push --tags origin refused");
    }

    #[test]
    fn cleanup_of_missing_directory_is_a_warning() {
        let root = tempfile::tempdir().unwrap();
        let missing = root.path().join("gone");
        match cleanup(&missing, false) {
            CleanupOutcome::Failed(path, _) => assert_eq!(path, missing),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    /// Run the real git, `false` if it fails or is missing
    fn git(args: &[&str], cwd: &Path) -> bool {
        Command::new("git")
            .args(args)
            .current_dir(cwd)
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    /// Create a bare `source` repository with two branches and a tag, and an
    /// empty bare `copy.git`. `false` when git is missing.
    fn seed_repositories(tmp: &Path, source: &str) -> bool {
        if !git(&["--version"], tmp) {
            eprintln!("git not found, skipping");
            return false;
        }
        let work = tmp.join("work");
        fs::create_dir(&work).unwrap();
        assert!(git(&["init", "-q"], &work));
        fs::write(work.join("README"), "demo\n").unwrap();
        assert!(git(&["add", "README"], &work));
        assert!(git(
            &[
                "-c",
                "user.name=git-copy",
                "-c",
                "user.email=git-copy@example.com",
                "-c",
                "commit.gpgsign=false",
                "commit",
                "-q",
                "-m",
                "init",
            ],
            &work
        ));
        assert!(git(&["branch", "feature"], &work));
        assert!(git(&["tag", "v1.0.0"], &work));
        assert!(git(&["clone", "-q", "--bare", "--", "work", source], tmp));
        assert!(git(&["init", "-q", "--bare", "copy.git"], tmp));
        true
    }

    /// Tags of the repository at `path`
    fn tags_of(path: &Path) -> String {
        let tags = Command::new("git").arg("tag").current_dir(path).output().unwrap();
        String::from_utf8_lossy(&tags.stdout).trim().to_string()
    }

    #[tokio::test]
    async fn copy_between_local_repositories() {
        let tmp = tempfile::tempdir().unwrap();
        if !seed_repositories(tmp.path(), "demo.git") {
            return;
        }
        let root = tmp.path().join("run");
        fs::create_dir(&root).unwrap();
        let request = TransferRequest::new(
            tmp.path().join("demo.git").display().to_string(),
            tmp.path().join("copy.git").display().to_string(),
            false,
        );
        let report = copy_repository(&SystemGit::default(), &request, &root)
            .await
            .unwrap();
        assert_eq!(report.repo_path, root.join("demo"));
        assert!(!root.join("demo").exists());

        let copy = tmp.path().join("copy.git");
        assert_eq!(tags_of(&copy), "v1.0.0");
        let branches = Command::new("git")
            .args(["branch", "--list"])
            .current_dir(&copy)
            .output()
            .unwrap();
        assert!(String::from_utf8_lossy(&branches.stdout).contains("feature"));
    }

    #[tokio::test]
    async fn clone_name_starting_with_dash_is_not_an_option() {
        let tmp = tempfile::tempdir().unwrap();
        if !seed_repositories(tmp.path(), "-repo.git") {
            return;
        }
        let root = tmp.path().join("run");
        fs::create_dir(&root).unwrap();
        let request = TransferRequest::new(
            tmp.path().join("-repo.git").display().to_string(),
            tmp.path().join("copy.git").display().to_string(),
            true,
        );
        let report = copy_repository(&SystemGit::default(), &request, &root)
            .await
            .unwrap();
        assert_eq!(report.repo_path, root.join("-repo"));
        assert!(root.join("-repo").is_dir());
        assert_eq!(tags_of(&tmp.path().join("copy.git")), "v1.0.0");
    }

    #[tokio::test]
    async fn values_starting_with_dash_follow_end_of_options() {
        let root = tempfile::tempdir().unwrap();
        let git = FakeGit::default();
        let request = TransferRequest::new("/srv/git/--upload-pack=touch.git", "-dest", false);
        copy_repository(&git, &request, root.path()).await.unwrap();
        let calls = git.calls();
        assert_eq!(
            calls[1],
            "clone --bare -- /srv/git/--upload-pack=touch.git --upload-pack=touch"
        );
        assert_eq!(calls[2], "remote set-url -- origin -dest");
    }
}
