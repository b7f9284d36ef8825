use anyhow::{ensure, Context, Result};
use dotenvy::dotenv;
use std::env;
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_API_BASE_URL: &str = "https://api.maiga.ai";

/// Runtime settings. Built from the environment only; never serialized, so the token has
/// no path out besides the request header.
#[derive(Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub debug: bool,
    pub keytar_stub_root: Option<PathBuf>,
}

impl AppConfig {
    /// Build configuration from well-known environment variables.
    pub fn load_from_env() -> Result<Self> {
        preload_env_files();
        Ok(Self::from_lookup(|key| env::var(key).ok()))
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Self {
            api_base_url: non_empty("MAIGA_API_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(default_api_base_url),
            api_token: non_empty("MAIGA_API_TOKEN"),
            debug: non_empty("MAIGA_DEBUG")
                .map(|flag| parse_flag(&flag))
                .unwrap_or(false),
            keytar_stub_root: non_empty("KEYTAR_STUB_ROOT").map(PathBuf::from),
        }
    }

    /// Helper that forces the presence of the partner token.
    pub fn require_api_token(&self) -> Result<&str> {
        let token = self.api_token.as_deref().context(
            "partner token missing: set MAIGA_API_TOKEN in the environment or in a .env file",
        )?;

        ensure!(!token.trim().is_empty(), "MAIGA_API_TOKEN must not be blank");

        Ok(token)
    }

    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.api_base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            api_token: None,
            debug: false,
            keytar_stub_root: None,
        }
    }
}

// Keeps the partner token out of `{:?}` output.
impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_base_url", &self.api_base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("debug", &self.debug)
            .field("keytar_stub_root", &self.keytar_stub_root)
            .finish()
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn preload_env_files() {
    // Load .env from the working directory or its parents, if any.
    let _ = dotenv();

    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let candidate = manifest_dir.join("../../.env");
    if candidate.exists() {
        let _ = dotenvy::from_path(candidate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert!(config.api_token.is_none());
        assert!(!config.debug);
        assert!(config.require_api_token().is_err());
    }

    #[test]
    fn reads_token_base_url_and_debug_flag() {
        let config = config_from(&[
            ("MAIGA_API_TOKEN", "secret"),
            ("MAIGA_API_BASE_URL", "http://127.0.0.1:9000/"),
            ("MAIGA_DEBUG", "TRUE"),
        ]);
        assert_eq!(config.require_api_token().unwrap(), "secret");
        assert_eq!(config.api_base_url, "http://127.0.0.1:9000");
        assert!(config.debug);
    }

    #[test]
    fn blank_values_count_as_missing() {
        let config = config_from(&[("MAIGA_API_TOKEN", "   "), ("MAIGA_DEBUG", "0")]);
        assert!(config.api_token.is_none());
        assert!(!config.debug);
    }

    #[test]
    fn debug_output_redacts_token() {
        let config = AppConfig::default().with_api_token("super-secret");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    struct SerializeCheck<T>(std::marker::PhantomData<T>);

    trait NotSerialize {
        fn implements_serialize(&self) -> bool {
            false
        }
    }

    impl<T> NotSerialize for SerializeCheck<T> {}

    impl<T: serde::Serialize> SerializeCheck<T> {
        fn implements_serialize(&self) -> bool {
            true
        }
    }

    #[test]
    fn config_cannot_be_serialized() {
        // Inherent method wins only when `T: Serialize`.
        assert!(SerializeCheck::<crate::ToolName>(std::marker::PhantomData).implements_serialize());
        assert!(!SerializeCheck::<AppConfig>(std::marker::PhantomData).implements_serialize());
    }
}
