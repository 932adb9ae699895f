//! # Configuration Module
//!
//! Reads the process environment once at startup. The three secrets are
//! required; everything else has a default.

use std::net::SocketAddr;

use crate::errors::BotError;

pub const ENV_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_CHANNEL: &str = "TELEGRAM_CHANNEL";

pub const REQUIRED_VARS: [&str; 3] = [ENV_BOT_TOKEN, ENV_OPENAI_API_KEY, ENV_CHANNEL];

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";
pub const DEFAULT_RESULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Which backend produces the solution text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolverBackend {
    #[default]
    Placeholder,
    OpenAi,
}

impl std::str::FromStr for SolverBackend {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "placeholder" | "stub" => Ok(SolverBackend::Placeholder),
            "openai" => Ok(SolverBackend::OpenAi),
            other => Err(BotError::Config(format!(
                "SOLVER_BACKEND must be 'placeholder' or 'openai', got '{other}'"
            ))),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub bot_token: String,
    pub openai_api_key: String,
    /// Channel id (`-100...`) or username (`@name`) for the subscription check
    pub channel: String,
    pub web_bind_addr: SocketAddr,
    /// Public prefix of the result links, without trailing slash
    pub result_base_url: String,
    pub require_subscription: bool,
    pub solver_backend: SolverBackend,
    pub openai_model: String,
}

impl Config {
    /// Load configuration from the process environment (after `.env`)
    pub fn from_env() -> Result<Self, BotError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    ///
    /// # Errors
    ///
    /// Returns [`BotError::Config`] naming every required variable that is
    /// missing or blank, or the first optional value that fails to parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BotError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let missing: Vec<&str> = REQUIRED_VARS
            .iter()
            .copied()
            .filter(|key| value(*key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(BotError::Config(format!(
                "{} not set. Check your environment or .env file",
                missing.join(", ")
            )));
        }

        let web_bind_addr = value("WEB_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| BotError::Config(format!("WEB_BIND_ADDR is not a socket address: {e}")))?;

        let require_subscription = match value("REQUIRE_SUBSCRIPTION") {
            None => false,
            Some(raw) => parse_flag(&raw).ok_or_else(|| {
                BotError::Config(format!("REQUIRE_SUBSCRIPTION must be true or false, got '{raw}'"))
            })?,
        };

        let solver_backend = match value("SOLVER_BACKEND") {
            None => SolverBackend::default(),
            Some(raw) => raw.parse()?,
        };

        let result_base_url = value("RESULT_BASE_URL")
            .unwrap_or_else(|| DEFAULT_RESULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        reqwest::Url::parse(&result_base_url)
            .map_err(|e| BotError::Config(format!("RESULT_BASE_URL is not a valid URL: {e}")))?;

        Ok(Self {
            bot_token: value(ENV_BOT_TOKEN).unwrap_or_default(),
            openai_api_key: value(ENV_OPENAI_API_KEY).unwrap_or_default(),
            channel: value(ENV_CHANNEL).unwrap_or_default(),
            web_bind_addr,
            result_base_url,
            require_subscription,
            solver_backend,
            openai_model: value("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
        })
    }

    /// Link opened by the "expand solution" button
    pub fn result_url(&self, user_id: u64) -> String {
        format!("{}/result/{}", self.result_base_url, user_id)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bot_token", &"<redacted>")
            .field("openai_api_key", &"<redacted>")
            .field("channel", &self.channel)
            .field("web_bind_addr", &self.web_bind_addr)
            .field("result_base_url", &self.result_base_url)
            .field("require_subscription", &self.require_subscription)
            .field("solver_backend", &self.solver_backend)
            .field("openai_model", &self.openai_model)
            .finish()
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn required() -> Vec<(&'static str, &'static str)> {
        vec![
            (ENV_BOT_TOKEN, "123:abc"),
            (ENV_OPENAI_API_KEY, "sk-test"),
            (ENV_CHANNEL, "@tasks"),
        ]
    }

    #[test]
    fn test_every_missing_combination_fails() {
        let all = required();
        // each bit of the mask says whether that variable is present
        for mask in 0u8..7 {
            let present: Vec<(&str, &str)> = all
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, pair)| *pair)
                .collect();

            let err = Config::from_lookup(lookup_from(&present)).unwrap_err();
            assert!(matches!(err, BotError::Config(_)), "mask {mask:#05b}");
            for (i, (key, _)) in all.iter().enumerate() {
                if mask & (1 << i) == 0 {
                    assert!(err.to_string().contains(key), "{err} should name {key}");
                }
            }
        }
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let mut pairs = required();
        pairs[0] = (ENV_BOT_TOKEN, "   ");
        let err = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(err.to_string().contains(ENV_BOT_TOKEN));
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&required())).unwrap();
        assert_eq!(config.web_bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(config.result_base_url, DEFAULT_RESULT_BASE_URL);
        assert!(!config.require_subscription);
        assert_eq!(config.solver_backend, SolverBackend::Placeholder);
        assert_eq!(config.result_url(99), "http://127.0.0.1:5000/result/99");
    }

    #[test]
    fn test_overrides() {
        let mut pairs = required();
        pairs.extend([
            ("WEB_BIND_ADDR", "0.0.0.0:8080"),
            ("RESULT_BASE_URL", "https://tasks.example.com/"),
            ("REQUIRE_SUBSCRIPTION", "yes"),
            ("SOLVER_BACKEND", "OpenAI"),
        ]);
        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.web_bind_addr.port(), 8080);
        assert_eq!(config.result_url(1), "https://tasks.example.com/result/1");
        assert!(config.require_subscription);
        assert_eq!(config.solver_backend, SolverBackend::OpenAi);
    }

    #[test]
    fn test_bad_optional_values_are_config_errors() {
        let mut pairs = required();
        pairs.push(("WEB_BIND_ADDR", "not-an-address"));
        assert!(matches!(
            Config::from_lookup(lookup_from(&pairs)),
            Err(BotError::Config(_))
        ));

        let mut pairs = required();
        pairs.push(("RESULT_BASE_URL", "no scheme here"));
        assert!(matches!(
            Config::from_lookup(lookup_from(&pairs)),
            Err(BotError::Config(_))
        ));

        let mut pairs = required();
        pairs.push(("SOLVER_BACKEND", "magic"));
        assert!(matches!(
            Config::from_lookup(lookup_from(&pairs)),
            Err(BotError::Config(_))
        ));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let config = Config::from_lookup(lookup_from(&required())).unwrap();
        let shown = format!("{config:?}");
        assert!(!shown.contains("123:abc"));
        assert!(!shown.contains("sk-test"));
    }
}
