use std::fmt;

/// Classified log-retrieval failure: the kind selects the human-readable
/// message delivered to the channel, never an opaque code.
#[derive(Debug)]
pub struct LogFetchError {
    pub kind: LogFetchErrorKind,
    pub status: Option<u16>,
    pub run_id: Option<u64>,
    /// Diagnostic detail for logs; not shown to users.
    pub detail: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFetchErrorKind {
    /// Owner, repo, or token missing from the channel settings.
    MissingCredentials,
    /// Non-success status listing runs, bad owner, repo, or token.
    ProviderAuthOrNotFound,
    /// The repository has no workflow runs.
    NoDeploymentHistory,
    /// Non-success status fetching the log archive for a run.
    LogFetchFailed,
    /// The archive did not contain the expected deploy-log entry.
    ArchiveFormatError,
    /// Connection-level failure talking to the provider.
    Network,
}

impl LogFetchError {
    fn new(kind: LogFetchErrorKind, detail: &str) -> Self {
        Self {
            kind,
            status: None,
            run_id: None,
            detail: detail.to_string(),
        }
    }

    pub fn missing_credentials() -> Self {
        Self::new(
            LogFetchErrorKind::MissingCredentials,
            "owner, repo, or token missing",
        )
    }

    pub fn auth_or_not_found(status: u16, body: &str) -> Self {
        let mut err = Self::new(LogFetchErrorKind::ProviderAuthOrNotFound, body);
        err.status = Some(status);
        err
    }

    pub fn no_history() -> Self {
        Self::new(LogFetchErrorKind::NoDeploymentHistory, "empty run list")
    }

    pub fn log_fetch_failed(run_id: Option<u64>, detail: &str) -> Self {
        let mut err = Self::new(LogFetchErrorKind::LogFetchFailed, detail);
        err.run_id = run_id;
        err
    }

    pub fn archive_format(detail: &str) -> Self {
        Self::new(LogFetchErrorKind::ArchiveFormatError, detail)
    }

    pub fn network(err: &reqwest::Error) -> Self {
        Self::new(LogFetchErrorKind::Network, &err.to_string())
    }

    /// Message suitable for delivery to the channel.
    pub fn user_message(&self) -> String {
        match self.kind {
            LogFetchErrorKind::MissingCredentials => {
                "Can't fetch your log without the repo credentials. Please provide \
                 the repo, repo owner, and access token in the channel settings."
                    .to_string()
            }
            LogFetchErrorKind::ProviderAuthOrNotFound => {
                "Please ensure a valid GitHub owner, repo, and token have been \
                 provided in the settings."
                    .to_string()
            }
            LogFetchErrorKind::NoDeploymentHistory => {
                "You have not made any deployments via GitHub Actions workflows yet."
                    .to_string()
            }
            LogFetchErrorKind::LogFetchFailed => match self.run_id {
                Some(run_id) => {
                    format!("An error occurred fetching the log for run {}.", run_id)
                }
                None => "An error occurred fetching the log for the latest run.".to_string(),
            },
            LogFetchErrorKind::ArchiveFormatError => {
                "The downloaded log archive didn't contain the expected deploy log, \
                 so there's nothing to show. Multi-job workflows aren't supported yet."
                    .to_string()
            }
            LogFetchErrorKind::Network => {
                "Couldn't reach GitHub to fetch your logs. Please try again later."
                    .to_string()
            }
        }
    }
}

impl fmt::Display for LogFetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(
                f,
                "log fetch error ({:?}, status {}): {}",
                self.kind, status, self.detail
            ),
            None => write!(f, "log fetch error ({:?}): {}", self.kind, self.detail),
        }
    }
}

impl std::error::Error for LogFetchError {}
