use std::env;

use eyre::{Result, eyre};

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "imagen-4.0-generate-001";

/// Settings for talking to the Gemini API, read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub api_base: String,
    pub text_model: String,
    pub image_model: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let api_key = non_empty("GEMINI_API_KEY")
            .or_else(|| non_empty("GOOGLE_API_KEY"))
            .ok_or_else(|| eyre!("GEMINI_API_KEY environment variable not set"))?;

        let api_base = non_empty("GEMINI_API_BASE")
            .map(|base| base.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        Ok(Self {
            api_key,
            api_base,
            text_model: non_empty("GEMINI_TEXT_MODEL")
                .unwrap_or_else(|| DEFAULT_TEXT_MODEL.to_string()),
            image_model: non_empty("GEMINI_IMAGE_MODEL")
                .unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()),
        })
    }

    /// Apply command-line overrides on top of the environment.
    pub fn with_overrides(mut self, text_model: Option<String>, image_model: Option<String>) -> Self {
        if let Some(model) = text_model {
            self.text_model = model;
        }
        if let Some(model) = image_model {
            self.image_model = model;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_key_is_set() {
        let config = Config::from_lookup(lookup(&[("GEMINI_API_KEY", "abc")])).unwrap();
        assert_eq!(config.api_key, "abc");
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.text_model, DEFAULT_TEXT_MODEL);
        assert_eq!(config.image_model, DEFAULT_IMAGE_MODEL);
    }

    #[test]
    fn missing_key_is_an_error() {
        let err = Config::from_lookup(lookup(&[("GEMINI_API_KEY", "  ")])).unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn google_key_and_custom_base_are_honoured() {
        let config = Config::from_lookup(lookup(&[
            ("GOOGLE_API_KEY", "g"),
            ("GEMINI_API_BASE", "http://localhost:8080/v1/"),
        ]))
        .unwrap();
        assert_eq!(config.api_key, "g");
        assert_eq!(config.api_base, "http://localhost:8080/v1");
    }

    #[test]
    fn cli_overrides_win() {
        let config = Config::from_lookup(lookup(&[("GEMINI_API_KEY", "k")]))
            .unwrap()
            .with_overrides(Some("gemini-pro".into()), None);
        assert_eq!(config.text_model, "gemini-pro");
        assert_eq!(config.image_model, DEFAULT_IMAGE_MODEL);
    }
}
