use std::{env, fmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StripeMode {
    Test,
    Live,
}

impl StripeMode {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Test => "Test Mode",
            Self::Live => "Live Mode",
        }
    }
}

impl fmt::Display for StripeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone)]
pub struct Config {
    pub bind_addr: String,
    pub database_url: Option<String>,
    pub stripe_mode: StripeMode,
    pub stripe_test_secret_key: Option<String>,
    pub stripe_live_secret_key: Option<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bind_addr", &self.bind_addr)
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("stripe_mode", &self.stripe_mode)
            .field(
                "stripe_test_secret_key",
                &self.stripe_test_secret_key.as_deref().map(mask_key),
            )
            .field(
                "stripe_live_secret_key",
                &self.stripe_live_secret_key.as_deref().map(mask_key),
            )
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let stripe_mode = match get("STRIPE_TEST_MODE").as_deref().map(parse_flag) {
            Some(Some(false)) => StripeMode::Live,
            Some(None) => {
                tracing::warn!("STRIPE_TEST_MODE is not a boolean, staying in test mode");
                StripeMode::Test
            }
            _ => StripeMode::Test,
        };

        Self {
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            database_url: get("DATABASE_URL"),
            stripe_mode,
            stripe_test_secret_key: get("STRIPE_TEST_SECRET_KEY"),
            stripe_live_secret_key: get("STRIPE_LIVE_SECRET_KEY"),
        }
    }

    /// Secret key for the active mode.
    pub fn stripe_secret_key(&self) -> Option<&str> {
        match self.stripe_mode {
            StripeMode::Test => self.stripe_test_secret_key.as_deref(),
            StripeMode::Live => self.stripe_live_secret_key.as_deref(),
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// `sk_test_...wxyz` style mask for logs.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 12 {
        return "...".to_string();
    }
    let head: String = chars[..8].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

#[cfg(test)]
mod tests {
    use {super::*, std::collections::HashMap};

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn defaults() {
        let c = config(&[]);
        assert_eq!(c.bind_addr, "0.0.0.0:3000");
        assert!(c.database_url.is_none());
        assert_eq!(c.stripe_mode, StripeMode::Test);
        assert!(c.stripe_secret_key().is_none());
    }

    #[test]
    fn mode_selects_key() {
        let keys = [
            ("STRIPE_TEST_SECRET_KEY", "sk_test_abc"),
            ("STRIPE_LIVE_SECRET_KEY", "sk_live_xyz"),
        ];
        assert_eq!(config(&keys).stripe_secret_key(), Some("sk_test_abc"));

        let mut live = keys.to_vec();
        live.push(("STRIPE_TEST_MODE", "0"));
        let c = config(&live);
        assert_eq!(c.stripe_mode, StripeMode::Live);
        assert_eq!(c.stripe_secret_key(), Some("sk_live_xyz"));

        let mut odd = keys.to_vec();
        odd.push(("STRIPE_TEST_MODE", "maybe"));
        assert_eq!(config(&odd).stripe_mode, StripeMode::Test);
    }

    #[test]
    fn blank_values_are_unset() {
        let c = config(&[("DATABASE_URL", "  "), ("STRIPE_TEST_SECRET_KEY", "")]);
        assert!(c.database_url.is_none());
        assert!(c.stripe_secret_key().is_none());
    }

    #[test]
    fn masking() {
        assert_eq!(mask_key("sk_test_51Habcdefghijkl1234"), "sk_test_...1234");
        assert_eq!(mask_key("short"), "...");
        let dbg = format!("{:?}", config(&[("STRIPE_TEST_SECRET_KEY", "sk_test_51Hsecretsecret9876")]));
        assert!(!dbg.contains("secretsecret"));
        assert!(dbg.contains("sk_test_...9876"));
    }
}
