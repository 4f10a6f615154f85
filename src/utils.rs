//! Utility functions
use dialoguer::{theme::ColorfulTheme, Confirm, Input};
use std::io::ErrorKind;
use url::Url;

use crate::errors::{GitCopyError, GitCopyErrorKind};

/// Suffix of git repository paths
const GIT_SUFFIX: &str = ".git";

/// What to copy, and where
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct TransferRequest {
    /// Source repository URL
    pub source: String,

    /// Destination repository URL
    pub destination: String,

    /// Keep the local clone after copying
    pub preserve: bool,
}

impl TransferRequest {
    /// Create a new request, trimming both locations
    pub fn new<S: AsRef<str>, D: AsRef<str>>(source: S, destination: D, preserve: bool) -> Self {
        Self {
            source: source.as_ref().trim().to_string(),
            destination: destination.as_ref().trim().to_string(),
            preserve,
        }
    }

    /// Check that both locations are given and differ
    /// # Errors
    /// Error if one is empty or both point to the same repository
    pub fn validate(&self) -> Result<(), GitCopyError> {
        if self.source.is_empty() || self.destination.is_empty() {
            return Err(GitCopyErrorKind::MissingArguments.into());
        }
        if self.source.trim_end_matches('/') == self.destination.trim_end_matches('/') {
            return Err(GitCopyError::new(GitCopyErrorKind::SameLocation).with_text(&self.source));
        }
        Ok(())
    }
}

/// Name of the local clone of `source`.
///
/// Takes the last path segment, without trailing slashes and without the `.git`
/// suffix, and turns dots into hyphens: `https://host/group/my.repo.git` gives `my-repo`.
/// # Errors
/// Error if no name is left
pub fn working_dir_name(source: &str) -> Result<String, GitCopyError> {
    let parsed = Url::parse(source).ok().filter(|url| url.has_host());
    let path = match &parsed {
        Some(url) => url.path(),
        None => source,
    };
    let trimmed = path.trim_end_matches(['/', '\\']);
    let segment = match trimmed.rfind(['/', '\\', ':']) {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    };
    let name = segment
        .strip_suffix(GIT_SUFFIX)
        .unwrap_or(segment)
        .replace('.', "-");
    if name.is_empty() {
        return Err(GitCopyError::new(GitCopyErrorKind::InvalidSource).with_text(source));
    }
    Ok(name)
}

/// Values the interactive prompt starts from
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PromptDefaults {
    /// Source given on the command line, if any
    pub source: Option<String>,

    /// Whether `--preserve` was given
    pub preserve: bool,
}

/// Turn a cancelled prompt into `None`
fn cancellable<T>(result: Result<T, dialoguer::Error>) -> Result<Option<T>, GitCopyError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(dialoguer::Error::IO(e)) if e.kind() == ErrorKind::Interrupted => Ok(None),
        Err(dialoguer::Error::IO(e)) if e.kind() == ErrorKind::NotConnected => {
            Err(GitCopyErrorKind::MissingArguments.into())
        }
        Err(e) => Err(e.into()),
    }
}

/// Ask a required repository URL
fn input_url(
    theme: &ColorfulTheme,
    prompt: &str,
    missing: &'static str,
    initial: Option<String>,
) -> Result<Option<String>, GitCopyError> {
    let mut input = Input::<String>::with_theme(theme)
        .with_prompt(prompt)
        .validate_with(move |value: &String| -> Result<(), &'static str> {
            if value.trim().is_empty() {
                Err(missing)
            } else {
                Ok(())
            }
        });
    if let Some(text) = initial {
        input = input.with_initial_text(text);
    }
    cancellable(input.interact_text())
}

/// Ask the user for the transfer request.
///
/// Returns `None` when the user cancels.
pub(crate) fn prompt_request(
    defaults: PromptDefaults,
) -> Result<Option<TransferRequest>, GitCopyError> {
    println!("Running interactive mode, answer a few questions.");
    println!("Copy a git repository to another remote");
    let theme = ColorfulTheme::default();
    let Some(source) = input_url(
        &theme,
        "Source repository URL",
        "Please provide a source repository URL",
        defaults.source,
    )?
    else {
        return Ok(None);
    };
    let Some(destination) = input_url(
        &theme,
        "Destination repository URL",
        "Please provide a destination repository URL",
        None,
    )?
    else {
        return Ok(None);
    };
    let preserve = Confirm::with_theme(&theme)
        .with_prompt("Preserve the local clone after copying?")
        .default(defaults.preserve)
        .interact_opt();
    let Some(preserve) = cancellable(preserve)?.flatten() else {
        return Ok(None);
    };
    Ok(Some(TransferRequest::new(source, destination, preserve)))
}
