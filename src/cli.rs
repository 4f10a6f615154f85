//! Command line options for the git-copy tool
use crate::{
    errors::GitCopyError,
    git::{GitRunner, SystemGit, DEFAULT_GIT_BINARY},
    transfer::{copy_repository, TransferReport},
    utils::{prompt_request, PromptDefaults, TransferRequest},
};
use clap::Parser;
use log::LevelFilter;
use std::{
    env::current_dir,
    path::{Path, PathBuf},
};

/// git-copy - Copy every branch and tag of a git repository to another remote
#[derive(Parser, Default, Clone, Debug)]
#[command(version, about)]
pub struct GitCopyCli {
    /// Source repository URL
    pub source: Option<String>,

    /// Destination repository URL
    pub destination: Option<String>,

    /// Keep the local clone after copying
    #[arg(short, long)]
    pub preserve: bool,

    /// git binary to invoke [default: git]
    #[arg(long, value_name = "PATH")]
    pub git: Option<PathBuf>,

    /// Directory in which the local clone is created [default: current directory]
    #[arg(short = 'C', long, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Verbose mode (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl GitCopyCli {
    /// Log level matching the verbosity
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

/// Build the transfer request from the arguments, asking with `prompt` when
/// source or destination is missing.
///
/// Returns `None` when the user cancels the prompt.
/// # Errors
/// Error if the prompt fails, or if the request is incomplete or targets its own source
pub fn resolve_request<F>(
    args: &GitCopyCli,
    prompt: F,
) -> Result<Option<TransferRequest>, GitCopyError>
where
    F: FnOnce(PromptDefaults) -> Result<Option<TransferRequest>, GitCopyError>,
{
    let request = match (&args.source, &args.destination) {
        (Some(source), Some(destination)) => {
            TransferRequest::new(source, destination, args.preserve)
        }
        (source, _) => {
            let defaults = PromptDefaults {
                source: source.clone(),
                preserve: args.preserve,
            };
            match prompt(defaults)? {
                Some(request) => request,
                None => return Ok(None),
            }
        }
    };
    request.validate()?;
    Ok(Some(request))
}

/// Copy the resolved request; nothing runs when the prompt was cancelled
async fn transfer_resolved<G: GitRunner + ?Sized>(
    git: &G,
    resolved: Option<TransferRequest>,
    root: &Path,
) -> Result<Option<TransferReport>, GitCopyError> {
    let Some(request) = resolved else {
        log::debug!("Interactive mode cancelled");
        return Ok(None);
    };
    copy_repository(git, &request, root).await.map(Some)
}

/// Run the git-copy tool with the provided command line options
/// # Errors
/// Error if the arguments are invalid or the transfer fails
pub async fn git_copy_main(args: GitCopyCli) -> Result<(), GitCopyError> {
    let git = SystemGit::new(args.git.clone().unwrap_or_else(|| DEFAULT_GIT_BINARY.into()));
    let root = match &args.directory {
        Some(dir) => dir.clone(),
        None => current_dir()?,
    };
    let resolved =
        tokio::task::spawn_blocking(move || resolve_request(&args, prompt_request)).await??;
    if let Some(report) = transfer_resolved(&git, resolved, &root).await? {
        log::debug!("Transfer done: {report:?}");
    }
    Ok(())
}
