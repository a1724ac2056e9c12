//! Server Configuration
//!
//! Everything comes from the environment (optionally via `.env`).

use anyhow::Context;
use relay_payments::{StripeConfig, SupabaseConfig};
use relay_runtime::OpenAiConfig;

/// Top-level configuration for the relay binary
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,

    /// Exact origin allowed for cross-origin requests; any origin when unset
    pub allowed_origin: Option<String>,

    pub stripe: StripeConfig,
    pub supabase: SupabaseConfig,
    pub openai: OpenAiConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let port = match lookup("PORT").filter(|v| !v.is_empty()) {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("PORT is not a valid port: {raw}"))?,
            None => 3000,
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            allowed_origin: lookup("ALLOWED_ORIGIN").filter(|o| !o.is_empty()),
            stripe: StripeConfig::from_lookup(&lookup).context("Stripe configuration")?,
            supabase: SupabaseConfig::from_lookup(&lookup).context("record store configuration")?,
            openai: OpenAiConfig::from_lookup(&lookup).context("completion API configuration")?,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars(extra: &[(&str, &str)]) -> HashMap<String, String> {
        let mut vars: HashMap<String, String> = [
            ("STRIPE_SECRET_KEY", "sk_test_1"),
            ("STRIPE_WEBHOOK_SECRET", "whsec_1"),
            ("SUPABASE_URL", "https://xyz.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
            ("OPENAI_API_KEY", "sk-1"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        for (k, v) in extra {
            vars.insert((*k).to_string(), (*v).to_string());
        }
        vars
    }

    #[test]
    fn test_defaults() {
        let vars = vars(&[]);
        let config = AppConfig::from_lookup(|k| vars.get(k).cloned()).unwrap();

        assert_eq!(config.addr(), "0.0.0.0:3000");
        assert!(config.allowed_origin.is_none());
        assert_eq!(config.supabase.table, "pro_users");
        assert_eq!(config.openai.model, "gpt-4o");
    }

    #[test]
    fn test_overrides() {
        let vars = vars(&[
            ("PORT", "8080"),
            ("ALLOWED_ORIGIN", "chrome-extension://abc"),
        ]);
        let config = AppConfig::from_lookup(|k| vars.get(k).cloned()).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.allowed_origin.as_deref(), Some("chrome-extension://abc"));
    }

    #[test]
    fn test_empty_port_uses_default() {
        let vars = vars(&[("PORT", "")]);
        let config = AppConfig::from_lookup(|k| vars.get(k).cloned()).unwrap();

        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_bad_port_is_an_error() {
        let vars = vars(&[("PORT", "not-a-port")]);
        assert!(AppConfig::from_lookup(|k| vars.get(k).cloned()).is_err());
    }

    #[test]
    fn test_missing_secret_is_an_error() {
        let mut vars = vars(&[]);
        vars.remove("STRIPE_WEBHOOK_SECRET");
        assert!(AppConfig::from_lookup(|k| vars.get(k).cloned()).is_err());
    }
}
