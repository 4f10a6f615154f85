//! # git-copy
//!
//! Copy every branch and tag of a git repository to another remote
//!
//! The source is cloned next to you, its `origin` remote is pointed to the
//! destination, then all branches and all tags are pushed. The local clone is
//! removed afterwards unless `--preserve` is given. When the repositories are
//! missing from the command line, they are asked interactively.
//!
//! ## Usage
//!
//! ```txt
//! Usage: git-copy [OPTIONS] [SOURCE] [DESTINATION]
//!
//! Arguments:
//!   [SOURCE]       Source repository URL
//!   [DESTINATION]  Destination repository URL
//!
//! Options:
//!   -p, --preserve         Keep the local clone after copying
//!       --git <PATH>       git binary to invoke [default: git]
//!   -C, --directory <DIR>  Directory in which the local clone is created [default: current directory]
//!   -v, --verbose...       Verbose mode (-v, -vv)
//!   -h, --help             Print help
//!   -V, --version          Print version
//! ```

#![warn(clippy::all, rust_2018_idioms)]
#![deny(
    missing_docs,
    clippy::all,
    clippy::missing_docs_in_private_items,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![warn(clippy::multiple_crate_versions)]

pub(crate) mod cli;
pub(crate) mod errors;
pub(crate) mod git;
pub(crate) mod transfer;
pub(crate) mod utils;

pub use cli::{git_copy_main, resolve_request, GitCopyCli};
pub use errors::{GitCopyError, GitCopyErrorKind};
pub use git::{ExecResult, GitRunner, RunFuture, SystemGit, DEFAULT_GIT_BINARY};
pub use transfer::{copy_repository, CleanupOutcome, PushOutcome, TransferReport};
pub use utils::{working_dir_name, PromptDefaults, TransferRequest};
