//! Error handling for the git-copy crate.
use std::{
    error::Error as StdError,
    fmt,
    path::{Path, PathBuf},
};

/// Usage line shown when the repositories are missing
pub(crate) const USAGE: &str = "Usage: git-copy <source> <destination> [--preserve|-p]";

/// Error type for the git-copy crate.
#[derive(Debug)]
pub struct GitCopyError {
    /// Inner error.
    inner: Box<Inner>,
}

impl GitCopyError {
    /// Create a new error.
    pub(crate) fn new(kind: GitCopyErrorKind) -> Self {
        Self {
            inner: Box::new(Inner {
                kind,
                source: None,
                path: None,
            }),
        }
    }

    /// Create a new error with a source, ignored when the text is blank.
    pub(crate) fn with_text<S: AsRef<str>>(mut self, text: S) -> Self {
        let text = text.as_ref().trim();
        if !text.is_empty() {
            self.inner.source = Some(Box::new(std::io::Error::other(text.to_string())));
        }
        self
    }

    /// Create a new error with the path it relates to.
    pub(crate) fn with_path(mut self, path: &Path) -> Self {
        self.inner.path = Some(path.to_path_buf());
        self
    }

    /// Kind of the error
    pub fn kind(&self) -> &GitCopyErrorKind {
        &self.inner.kind
    }

    /// Path the error relates to, if any
    pub fn path(&self) -> Option<&Path> {
        self.inner.path.as_deref()
    }
}

/// Type alias for a boxed error.
pub(crate) type BoxError = Box<dyn StdError + Send + Sync>;

/// Inner error type for the git-copy crate.
#[derive(Debug)]
struct Inner {
    /// Error kind.
    kind: GitCopyErrorKind,

    /// Path related to the error
    path: Option<PathBuf>,

    /// Source error.
    source: Option<BoxError>,
}

/// Kinds of failure of a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitCopyErrorKind {
    /// The git binary can't be run.
    GitUnavailable,

    /// Source or destination is missing.
    MissingArguments,

    /// Source and destination designate the same repository.
    SameLocation,

    /// No directory name can be derived from the source.
    InvalidSource,

    /// git clone failed.
    Clone,

    /// git clone succeeded but the clone directory is missing.
    CloneNotFound,

    /// git remote set-url failed.
    RemoteRewrite,

    /// Pushing branches or tags failed.
    Push,

    /// The interactive prompt failed.
    Prompt,

    /// Unexpected I/O error.
    Io,
}

impl fmt::Display for GitCopyErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GitCopyErrorKind::GitUnavailable => write!(f, "Git is not installed or not in PATH"),
            GitCopyErrorKind::MissingArguments => {
                write!(f, "Source and destination are required.\n{USAGE}")
            }
            GitCopyErrorKind::SameLocation => write!(f, "Source and destination can't be the same"),
            GitCopyErrorKind::InvalidSource => {
                write!(f, "Unable to derive a directory name from the source")
            }
            GitCopyErrorKind::Clone => write!(f, "Clone failed"),
            GitCopyErrorKind::CloneNotFound => write!(f, "Cloned folder not found"),
            GitCopyErrorKind::RemoteRewrite => write!(f, "Setting the destination remote failed"),
            GitCopyErrorKind::Push => write!(f, "Push failed"),
            GitCopyErrorKind::Prompt => write!(f, "Interactive prompt failed"),
            GitCopyErrorKind::Io => write!(f, "I/O error"),
        }
    }
}

impl fmt::Display for GitCopyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner.kind)?;
        if let Some(path) = &self.inner.path {
            write!(f, " at '{}'", path.display())?;
        }
        if let Some(source) = &self.inner.source {
            write!(f, ": {source}")?;
        }
        Ok(())
    }
}

impl StdError for GitCopyError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.source.as_ref().map(|e| &**e as _)
    }
}

impl From<GitCopyErrorKind> for GitCopyError {
    fn from(kind: GitCopyErrorKind) -> Self {
        Self::new(kind)
    }
}

impl From<std::io::Error> for GitCopyError {
    fn from(e: std::io::Error) -> Self {
        Self {
            inner: Box::new(Inner {
                kind: GitCopyErrorKind::Io,
                source: Some(Box::new(e)),
                path: None,
            }),
        }
    }
}

impl From<dialoguer::Error> for GitCopyError {
    fn from(e: dialoguer::Error) -> Self {
        Self {
            inner: Box::new(Inner {
                kind: GitCopyErrorKind::Prompt,
                source: Some(Box::new(e)),
                path: None,
            }),
        }
    }
}

impl From<tokio::task::JoinError> for GitCopyError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self {
            inner: Box::new(Inner {
                kind: GitCopyErrorKind::Prompt,
                source: Some(Box::new(e)),
                path: None,
            }),
        }
    }
}
