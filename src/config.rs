use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{OpenAIError, Result};

const API_KEY_VARS: [&str; 4] = [
    "OPENAI_API_KEY",
    "OPENAI_KEY",
    "OPENAI_SECRET_KEY",
    "TEST_OPENAI_SECRETKEY",
];
const ORGANIZATION_VARS: [&str; 2] = ["OPENAI_ORGANIZATION_ID", "OPENAI_ORGANIZATION"];

/// Name of the auth file looked up by [`OpenAIAuthentication::load_from_directory`].
pub const CONFIG_FILE_NAME: &str = ".openai";

pub const DEFAULT_DOMAIN: &str = "api.openai.com";
pub const DEFAULT_API_VERSION: &str = "v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Credentials sent with every request.
#[derive(Clone, PartialEq, Eq)]
pub struct OpenAIAuthentication {
    api_key: String,
    organization: Option<String>,
}

// Keeps the secret out of logs.
impl fmt::Debug for OpenAIAuthentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAIAuthentication")
            .field("api_key", &"sk-***")
            .field("organization", &self.organization)
            .finish()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthFile {
    api_key: String,
    #[serde(default, alias = "organizationId")]
    organization: Option<String>,
}

impl OpenAIAuthentication {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into().trim().to_string();
        if !api_key.starts_with("sk-") {
            return Err(OpenAIError::ConfigError(
                "API key must start with 'sk-'".into(),
            ));
        }

        Ok(Self {
            api_key,
            organization: None,
        })
    }

    pub fn with_organization(mut self, organization: impl Into<String>) -> Result<Self> {
        let organization = organization.into().trim().to_string();
        if !organization.starts_with("org-") {
            return Err(OpenAIError::ConfigError(
                "Organization id must start with 'org-'".into(),
            ));
        }
        self.organization = Some(organization);
        Ok(self)
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn organization(&self) -> Option<&str> {
        self.organization.as_deref()
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = API_KEY_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .find(|value| !value.trim().is_empty())
            .ok_or_else(|| {
                OpenAIError::ConfigError(format!(
                    "No API key found, set one of {}",
                    API_KEY_VARS.join(", ")
                ))
            })?;

        let auth = Self::new(api_key)?;
        match ORGANIZATION_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .find(|value| !value.trim().is_empty())
        {
            Some(organization) => auth.with_organization(organization),
            None => Ok(auth),
        }
    }

    /// Parses an auth file holding either a JSON object
    /// (`{"apiKey": "...", "organization": "..."}`) or `KEY=value` lines.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| OpenAIError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    fn parse(contents: &str) -> Result<Self> {
        let trimmed = contents.trim();
        if trimmed.starts_with('{') {
            let file: AuthFile = serde_json::from_str(trimmed).map_err(|e| {
                OpenAIError::ConfigError(format!("Invalid auth file: {}", e))
            })?;
            let auth = Self::new(file.api_key)?;
            return match file.organization {
                Some(organization) if !organization.trim().is_empty() => {
                    auth.with_organization(organization)
                }
                _ => Ok(auth),
            };
        }

        let pairs: Vec<(String, String)> = trimmed
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| line.split_once('='))
            .map(|(key, value)| {
                (
                    key.trim().to_string(),
                    value.trim().trim_matches('"').to_string(),
                )
            })
            .collect();

        Self::from_lookup(|name| {
            pairs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone())
        })
    }

    /// Walks from `dir` up to the filesystem root looking for a `.openai` file.
    pub fn load_from_directory(dir: impl AsRef<Path>) -> Result<Self> {
        let start = dir.as_ref();
        for candidate in start.ancestors() {
            let path = candidate.join(CONFIG_FILE_NAME);
            if path.is_file() {
                log::debug!("Loading OpenAI credentials from {}", path.display());
                return Self::from_file(path);
            }
        }

        Err(OpenAIError::ConfigError(format!(
            "No {} file found in {} or its parents",
            CONFIG_FILE_NAME,
            start.display()
        )))
    }

    /// Environment (after loading `.env`), then a `.openai` file from the
    /// working directory upwards, then one in the home directory.
    pub fn default_auth() -> Result<Self> {
        if dotenv::dotenv().is_ok() {
            log::debug!(".env file loaded");
        }

        if let Ok(auth) = Self::from_env() {
            return Ok(auth);
        }

        if let Ok(cwd) = env::current_dir() {
            if let Ok(auth) = Self::load_from_directory(cwd) {
                return Ok(auth);
            }
        }

        if let Some(home) = home_dir() {
            let path = home.join(CONFIG_FILE_NAME);
            if path.is_file() {
                return Self::from_file(path);
            }
        }

        Err(OpenAIError::ConfigError(
            "No OpenAI credentials found in the environment or a .openai file".into(),
        ))
    }
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .or_else(|| env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAIClientSettings {
    pub domain: String,
    pub api_version: String,
    pub timeout: Duration,
}

impl Default for OpenAIClientSettings {
    fn default() -> Self {
        OpenAIClientSettings {
            domain: DEFAULT_DOMAIN.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl OpenAIClientSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let mut settings = Self::default();
        if let Some(domain) = env::var("OPENAI_DOMAIN").ok().filter(|d| !d.trim().is_empty()) {
            settings.domain = domain;
        }
        if let Some(version) = env::var("OPENAI_API_VERSION")
            .ok()
            .filter(|v| !v.trim().is_empty())
        {
            settings.api_version = version;
        }
        if let Some(secs) = env::var("OPENAI_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            settings.timeout = Duration::from_secs(secs);
        }
        settings
    }

    /// `domain` may carry its own scheme, e.g. `http://127.0.0.1:8080`.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> String {
        let domain = self.domain.trim_end_matches('/');
        let root = if domain.starts_with("http://") || domain.starts_with("https://") {
            domain.to_string()
        } else {
            format!("https://{}", domain)
        };

        let version = self.api_version.trim_matches('/');
        if version.is_empty() {
            root
        } else {
            format!("{}/{}", root, version)
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.domain.trim().is_empty() {
            return Err(OpenAIError::ConfigError("Domain must not be empty".into()));
        }
        if self.timeout.is_zero() {
            return Err(OpenAIError::ConfigError("Timeout must be non-zero".into()));
        }
        Ok(())
    }
}
