//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc, time::Duration};

use serde::{Deserialize, Deserializer};

use super::types::{FetchMode, Res};

/// Default repository API version.
fn default_stash_api_version() -> String {
    "1.0".to_string()
}

/// Default URL prefixes that are never treated as slacking off.
fn default_allowed_links() -> Vec<String> {
    [
        "https://drive.google.com",
        "https://docs.google.com",
        "https://github.com",
        "http://stackoverflow.com",
        "https://stackoverflow.com",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Default summon phrase ("je peux glander ?", "puis-je glander ?").
fn default_summon_pattern() -> String {
    r"\b(je\s+peux|puis[- ]je|peux[- ]je)\s+glander\b".to_string()
}

/// Default per-fetch timeout, in seconds.
fn default_fetch_timeout_secs() -> u64 {
    10
}

/// Accepts either a list or a comma-separated string (as env vars arrive).
fn deserialize_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ListOrCsv {
        List(Vec<String>),
        Csv(String),
    }

    Ok(match ListOrCsv::deserialize(deserializer)? {
        ListOrCsv::List(items) => items,
        ListOrCsv::Csv(csv) => csv.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect(),
    })
}

/// Configuration for the nag-bot application.
///
/// Immutable after load, and trivially cloneable.
#[derive(Debug, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl From<ConfigInner> for Config {
    fn from(inner: ConfigInner) -> Self {
        Self { inner: Arc::new(inner) }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConfigInner {
    /// Slack app token (`SLACK_APP_TOKEN`).
    pub slack_app_token: String,
    /// Slack bot token (`SLACK_BOT_TOKEN`).
    pub slack_bot_token: String,
    /// Repository server base URL, e.g. `http://stash.example.com` (`STASH_URL`).
    pub stash_url: String,
    /// Project key on the repository server (`STASH_PROJECT_ID`).
    pub stash_project_id: String,
    /// REST API version segment (`STASH_API_VERSION`).
    #[serde(default = "default_stash_api_version")]
    pub stash_api_version: String,
    /// Full `Authorization` header value sent to the repository server (`STASH_AUTHORIZATION`).
    pub stash_authorization: String,
    /// Repositories to poll, in display order (`REPOSITORIES`, comma separated).
    #[serde(default, deserialize_with = "deserialize_list")]
    pub repositories: Vec<String>,
    /// URL prefixes that exempt a message from a reminder (`ALLOWED_LINKS`, comma separated).
    #[serde(default = "default_allowed_links", deserialize_with = "deserialize_list")]
    pub allowed_links: Vec<String>,
    /// Case-insensitive regex that summons the bot (`SUMMON_PATTERN`).
    #[serde(default = "default_summon_pattern")]
    pub summon_pattern: String,
    /// Whether repositories are fetched concurrently or one at a time (`FETCH_MODE`).
    #[serde(default)]
    pub fetch_mode: FetchMode,
    /// Per-repository request timeout in seconds (`FETCH_TIMEOUT_SECS`).
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    /// Name unreachable repositories in the reminder (`REPORT_PARTIAL_FAILURES`).
    #[serde(default)]
    pub report_partial_failures: bool,
}

impl ConfigInner {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl Config {
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        Self::load_with_env(explicit_path, None)
    }

    /// Loads the configuration, reading `NAG_BOT_*` from `env` instead of the process when given.
    ///
    /// Env values stay strings; list keys are split on `,` at deserialization.
    pub fn load_with_env(explicit_path: Option<&std::path::Path>, env: Option<config::Map<String, String>>) -> Res<Self> {
        let env = config::Environment::default().prefix("NAG_BOT").source(env);

        let mut cfg = config::Config::builder().add_source(env);

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        result.validate()?;

        Ok(result)
    }

    /// Checks invariants that deserialization alone cannot express.
    pub fn validate(&self) -> Res<()> {
        if self.stash_url.trim().is_empty() {
            return Err(anyhow::anyhow!("Repository server URL must not be empty."));
        }

        if self.repositories.iter().any(|r| r.trim().is_empty()) {
            return Err(anyhow::anyhow!("Repository identifiers must not be blank."));
        }

        if let Err(e) = regex::Regex::new(&self.summon_pattern) {
            return Err(anyhow::anyhow!("Summon pattern is not a valid regex: {e}"));
        }

        if self.fetch_timeout_secs < 1 || self.fetch_timeout_secs > 300 {
            return Err(anyhow::anyhow!("Fetch timeout must be between 1 and 300 seconds."));
        }

        Ok(())
    }

    /// One-line description of what the bot watches, logged at startup.
    pub fn watch_summary(&self) -> String {
        let repositories = if self.repositories.is_empty() { "none".to_string() } else { self.repositories.join(", ") };

        format!(
            "Watching {} repositories on `{}` (project `{}`, {} fetch): {}",
            self.repositories.len(),
            self.stash_url,
            self.stash_project_id,
            match self.fetch_mode {
                FetchMode::Parallel => "parallel",
                FetchMode::Sequential => "sequential",
            },
            repositories
        )
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn valid() -> ConfigInner {
        ConfigInner {
            stash_url: "http://stash.example.com".to_string(),
            repositories: vec!["api".to_string()],
            summon_pattern: default_summon_pattern(),
            fetch_timeout_secs: 10,
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_accepts_valid_config() {
        assert!(Config::from(valid()).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = Config::from(ConfigInner { stash_url: " ".to_string(), ..valid() });
        assert!(config.validate().is_err());

        let config = Config::from(ConfigInner { repositories: vec!["api".to_string(), "".to_string()], ..valid() });
        assert!(config.validate().is_err());

        let config = Config::from(ConfigInner { summon_pattern: "(unclosed".to_string(), ..valid() });
        assert!(config.validate().is_err());

        let config = Config::from(ConfigInner { fetch_timeout_secs: 0, ..valid() });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_watch_summary_names_repositories_and_fetch_mode() {
        let config = Config::from(ConfigInner {
            stash_project_id: "PROJ".to_string(),
            repositories: vec!["api".to_string(), "auth".to_string()],
            fetch_mode: FetchMode::Sequential,
            ..valid()
        });
        assert_eq!(config.watch_summary(), "Watching 2 repositories on `http://stash.example.com` (project `PROJ`, sequential fetch): api, auth");

        let config = Config::from(ConfigInner { repositories: vec![], ..valid() });
        assert!(config.watch_summary().ends_with("parallel fetch): none"));
    }

    #[test]
    fn test_load_from_file_applies_defaults() {
        let path = std::env::temp_dir().join(format!("nag-bot-config-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
slack_app_token = "xapp-test"
slack_bot_token = "xoxb-test"
stash_url = "http://stash.example.com"
stash_project_id = "PROJ"
stash_authorization = "Basic abc"
repositories = ["api", "auth", "frontend"]
fetch_mode = "sequential"
"#
        )
        .unwrap();

        let config = Config::load_with_env(Some(path.as_path()), Some(config::Map::new())).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.repositories, vec!["api", "auth", "frontend"]);
        assert_eq!(config.fetch_mode, FetchMode::Sequential);
        assert_eq!(config.stash_api_version, "1.0");
        assert_eq!(config.fetch_timeout(), Duration::from_secs(10));
        assert!(config.allowed_links.contains(&"https://github.com".to_string()));
        assert!(!config.report_partial_failures);
    }

    #[test]
    fn test_env_overrides_keep_strings_verbatim() {
        let env: config::Map<String, String> = [
            ("NAG_BOT_SLACK_APP_TOKEN", "xapp-test"),
            ("NAG_BOT_SLACK_BOT_TOKEN", "xoxb-test"),
            ("NAG_BOT_STASH_URL", "http://stash.example.com"),
            ("NAG_BOT_STASH_PROJECT_ID", "0042"),
            ("NAG_BOT_STASH_API_VERSION", "1.0"),
            ("NAG_BOT_STASH_AUTHORIZATION", "Basic abc"),
            ("NAG_BOT_REPOSITORIES", "api, auth,frontend"),
            ("NAG_BOT_ALLOWED_LINKS", "https://github.com"),
            ("NAG_BOT_FETCH_TIMEOUT_SECS", "30"),
            ("NAG_BOT_REPORT_PARTIAL_FAILURES", "true"),
            ("NAG_BOT_FETCH_MODE", "sequential"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let config = Config::load_with_env(None, Some(env)).unwrap();

        assert_eq!(config.stash_api_version, "1.0");
        assert_eq!(config.stash_project_id, "0042");
        assert_eq!(config.repositories, vec!["api", "auth", "frontend"]);
        assert_eq!(config.allowed_links, vec!["https://github.com"]);
        assert_eq!(config.fetch_timeout_secs, 30);
        assert!(config.report_partial_failures);
        assert_eq!(config.fetch_mode, FetchMode::Sequential);
    }
}
