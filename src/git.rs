//! Invocation of the git command line
use std::{
    future::Future,
    path::{Path, PathBuf},
    pin::Pin,
    process::Stdio,
};

use tokio::process::Command;

use crate::errors::GitCopyError;

/// git binary looked up in `PATH` when none is given
pub const DEFAULT_GIT_BINARY: &str = "git";

/// Captured outcome of one git invocation
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExecResult {
    /// Exit code, `None` when the process was killed by a signal
    pub code: Option<i32>,

    /// Captured standard output
    pub stdout: String,

    /// Captured standard error
    pub stderr: String,
}

impl ExecResult {
    /// Whether the command exited with status 0
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Text explaining the result: stderr if any, stdout otherwise
    pub fn error_text(&self) -> &str {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim()
        } else {
            stderr
        }
    }

    /// Failed result carrying the reason the command couldn't run at all
    pub(crate) fn not_run(err: &GitCopyError) -> Self {
        Self {
            code: None,
            stdout: String::new(),
            stderr: err.to_string(),
        }
    }
}

/// Future returned by [`GitRunner::run`]
pub type RunFuture<'a> =
    Pin<Box<dyn Future<Output = Result<ExecResult, GitCopyError>> + Send + 'a>>;

/// Something able to run git commands
pub trait GitRunner: Sync + Send {
    /// Run git with `args`, inside `cwd` when given, capturing its output.
    ///
    /// A non-zero exit is an `Ok` result; `Err` means the command couldn't be started.
    fn run(&self, args: Vec<String>, cwd: Option<PathBuf>) -> RunFuture<'_>;
}

/// git installed on the system
#[derive(Debug, Clone)]
pub struct SystemGit {
    /// Path or name of the git binary
    binary: PathBuf,
}

impl SystemGit {
    /// Use the given git binary
    pub fn new<P: Into<PathBuf>>(binary: P) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Path or name of the git binary
    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

impl Default for SystemGit {
    fn default() -> Self {
        Self::new(DEFAULT_GIT_BINARY)
    }
}

impl GitRunner for SystemGit {
    fn run(&self, args: Vec<String>, cwd: Option<PathBuf>) -> RunFuture<'_> {
        Box::pin(async move {
            log::debug!("Running {} {}", self.binary.display(), args.join(" "));
            let mut command = Command::new(&self.binary);
            command
                .args(&args)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped());
            if let Some(dir) = cwd {
                command.current_dir(dir);
            }
            let output = command.output().await?;
            let result = ExecResult {
                code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            };
            log::trace!("{} exited with {:?}", args.join(" "), result.code);
            Ok(result)
        })
    }
}
