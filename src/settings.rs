use serde::Deserialize;

use crate::types::RepoCredentials;

/// One entry of the webhook payload's `settings` array.
#[derive(Debug, Clone, Deserialize)]
pub struct SettingField {
    pub label: String,
    #[serde(default)]
    pub default: String,
}

/// Per-invocation channel settings, flattened from the `[{label, default}]`
/// array at ingress. Missing or empty fields are a valid state, not an
/// error; they constrain what the pipelines can do downstream. Read-only
/// for the lifetime of one invocation.
#[derive(Debug, Clone, Default)]
pub struct ChannelSettings {
    pub channel_url: Option<String>,
    pub repo_owner: Option<String>,
    pub github_repo: Option<String>,
    pub github_pat: Option<String>,
}

impl ChannelSettings {
    pub fn from_fields(fields: &[SettingField]) -> Self {
        let lookup = |label: &str| -> Option<String> {
            fields
                .iter()
                .find(|f| f.label == label)
                .map(|f| f.default.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            channel_url: lookup("channelUrl"),
            repo_owner: lookup("repoOwner"),
            github_repo: lookup("githubRepo"),
            github_pat: lookup("githubPAT"),
        }
    }

    /// Credentials for the log pipeline; missing fields become empty strings
    /// and are rejected by the pipeline's precondition check.
    pub fn credentials(&self) -> RepoCredentials {
        RepoCredentials {
            owner: self.repo_owner.clone().unwrap_or_default(),
            repo: self.github_repo.clone().unwrap_or_default(),
            token: self.github_pat.clone().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(label: &str, default: &str) -> SettingField {
        SettingField {
            label: label.to_string(),
            default: default.to_string(),
        }
    }

    #[test]
    fn flattens_known_labels() {
        let settings = ChannelSettings::from_fields(&[
            field("channelUrl", "https://ping.example/v1/webhooks/abc"),
            field("repoOwner", "octocat"),
            field("githubRepo", "hello-world"),
            field("githubPAT", "ghp_token"),
            field("unrelated", "ignored"),
        ]);
        assert_eq!(
            settings.channel_url.as_deref(),
            Some("https://ping.example/v1/webhooks/abc")
        );
        assert_eq!(settings.repo_owner.as_deref(), Some("octocat"));
        assert_eq!(settings.github_repo.as_deref(), Some("hello-world"));
        assert_eq!(settings.github_pat.as_deref(), Some("ghp_token"));
    }

    #[test]
    fn missing_and_blank_fields_are_none() {
        let settings = ChannelSettings::from_fields(&[
            field("channelUrl", "https://ping.example/v1/webhooks/abc"),
            field("githubPAT", "   "),
        ]);
        assert_eq!(settings.repo_owner, None);
        assert_eq!(settings.github_repo, None);
        assert_eq!(settings.github_pat, None);
    }

    #[test]
    fn credentials_default_missing_fields_to_empty() {
        let settings = ChannelSettings::from_fields(&[field("repoOwner", "octocat")]);
        let creds = settings.credentials();
        assert_eq!(creds.owner, "octocat");
        assert_eq!(creds.repo, "");
        assert_eq!(creds.token, "");
    }
}
