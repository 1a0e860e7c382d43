use std::env;
use std::path::Path;

use anyhow::{Context, Result};
use config::Map;
use serde::Deserialize;

/// Local settings file, looked up in the working directory
pub const LOCAL_SETTINGS_FILE: &str = "kaizen.toml";

/// Prefix of the structured environment overrides (`KAIZEN__LOGGING__LEVEL`)
const ENV_PREFIX: &str = "KAIZEN";

/// Conventional variables and the settings key each one overrides
const CONVENTIONAL_VARS: [(&str, &str); 4] = [
    (kaizen_search::API_KEY_ENV, "credentials.tavily_api_key"),
    (kaizen_provider::API_KEY_ENV, "credentials.anthropic_api_key"),
    (kaizen_github::TOKEN_ENV, "credentials.github_token"),
    (kaizen_github::REPOSITORY_ENV, "credentials.github_repository"),
];

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CredentialsConfig {
    pub tavily_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub github_token: Option<String>,
    pub github_repository: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EndpointsConfig {
    pub search: String,
    pub completion: String,
    pub tracker: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(default)]
    pub credentials: CredentialsConfig,
    pub endpoints: EndpointsConfig,
    pub logging: LoggingConfig,
}

/// Values given on the command line; they win over every other layer
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub github_token: Option<String>,
    pub issue_repo: Option<String>,
}

impl Settings {
    /// Load settings with layered approach:
    /// 1. Built-in defaults
    /// 2. Local override: ./kaizen.toml (optional)
    /// 3. Environment variables with KAIZEN__ prefix
    /// 4. Conventional variables (TAVILY_API_KEY, GITHUB_TOKEN, ...)
    /// 5. Command line flags
    pub fn load(cli: &CliOverrides) -> Result<Self> {
        // Load .env file from current directory
        dotenvy::dotenv().ok();

        let vars: Map<String, String> = env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        Self::from_sources(Path::new(LOCAL_SETTINGS_FILE), vars, cli)
    }

    fn from_sources(
        local_file: &Path,
        vars: Map<String, String>,
        cli: &CliOverrides,
    ) -> Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("endpoints.search", kaizen_search::DEFAULT_BASE_URL)?
            .set_default("endpoints.completion", kaizen_provider::DEFAULT_BASE_URL)?
            .set_default("endpoints.tracker", kaizen_github::DEFAULT_BASE_URL)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "text")?
            .add_source(config::File::from(local_file).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .source(Some(vars.clone())),
            );

        for (var, key) in CONVENTIONAL_VARS {
            if let Some(value) = vars.get(var).filter(|v| !v.trim().is_empty()) {
                builder = builder.set_override(key, value.as_str())?;
            }
        }

        if let Some(token) = &cli.github_token {
            builder = builder.set_override("credentials.github_token", token.as_str())?;
        }
        if let Some(repo) = &cli.issue_repo {
            builder = builder.set_override("credentials.github_repository", repo.as_str())?;
        }

        builder
            .build()?
            .try_deserialize()
            .context("Invalid runtime settings")
    }
}
