use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub credits: CreditsConfig,
    #[serde(default)]
    pub engagement: EngagementConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Static bearer token the bot front end presents on every call.
    pub service_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    #[serde(default = "default_telegram_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub bot_username: String,
    /// Transport calls are bounded; a timeout counts as a failed send.
    #[serde(default = "default_send_timeout_secs")]
    pub send_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditsConfig {
    /// Free credits granted when an account is first created.
    #[serde(default = "default_starting_balance")]
    pub starting_balance: i64,
    /// Bonus paid to the referrer when a referred user hits their milestone.
    #[serde(default = "default_referral_bonus")]
    pub referral_bonus: i64,
    /// Referrals beyond this count are rewarded on the referred user's first
    /// payment instead of their first generation.
    #[serde(default = "default_referral_payment_tier_after")]
    pub referral_payment_tier_after: i64,
    /// Credits granted alongside a successful win-back notification.
    #[serde(default = "default_winback_bonus")]
    pub winback_bonus: i64,
}

impl Default for CreditsConfig {
    fn default() -> Self {
        Self {
            starting_balance: default_starting_balance(),
            referral_bonus: default_referral_bonus(),
            referral_payment_tier_after: default_referral_payment_tier_after(),
            winback_bonus: default_winback_bonus(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngagementConfig {
    /// Days of inactivity at zero balance before a re-engagement message.
    #[serde(default = "default_reengagement_inactive_days")]
    pub reengagement_inactive_days: i64,
    /// Days of inactivity before a win-back message.
    #[serde(default = "default_winback_inactive_days")]
    pub winback_inactive_days: i64,
    /// Weekday the win-back job runs on, 0 = Monday .. 6 = Sunday.
    #[serde(default)]
    pub winback_weekday: u32,
    /// Minutes before an unpaid invoice counts as abandoned.
    #[serde(default = "default_abandoned_invoice_delay_minutes")]
    pub abandoned_invoice_delay_minutes: i64,
    /// Pause between individual sends in batch jobs (transport rate limit).
    #[serde(default = "default_send_interval_ms")]
    pub send_interval_ms: u64,
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            reengagement_inactive_days: default_reengagement_inactive_days(),
            winback_inactive_days: default_winback_inactive_days(),
            winback_weekday: 0,
            abandoned_invoice_delay_minutes: default_abandoned_invoice_delay_minutes(),
            send_interval_ms: default_send_interval_ms(),
        }
    }
}

fn default_telegram_api_base() -> String {
    "https://api.telegram.org".to_string()
}
fn default_send_timeout_secs() -> u64 {
    10
}
fn default_starting_balance() -> i64 {
    3
}
fn default_referral_bonus() -> i64 {
    3
}
fn default_referral_payment_tier_after() -> i64 {
    10
}
fn default_winback_bonus() -> i64 {
    2
}
fn default_reengagement_inactive_days() -> i64 {
    3
}
fn default_winback_inactive_days() -> i64 {
    14
}
fn default_abandoned_invoice_delay_minutes() -> i64 {
    60
}
fn default_send_interval_ms() -> u64 {
    100
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => Self::parse(&config_str)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // No file: build from environment variables and defaults.
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                let database_url = get_env("DATABASE_URL")
                    .ok_or("DATABASE_URL is not set and no config.toml was found")?;
                let bot_token = get_env("TELEGRAM_BOT_TOKEN")
                    .ok_or("TELEGRAM_BOT_TOKEN is not set and no config.toml was found")?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                        service_token: get_env("SERVICE_TOKEN").unwrap_or_default(),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    telegram: TelegramConfig {
                        bot_token,
                        api_base: get_env("TELEGRAM_API_BASE")
                            .unwrap_or_else(default_telegram_api_base),
                        bot_username: get_env("TELEGRAM_BOT_USERNAME").unwrap_or_default(),
                        send_timeout_secs: get_env_parse(
                            "TELEGRAM_SEND_TIMEOUT_SECS",
                            default_send_timeout_secs(),
                        ),
                    },
                    credits: CreditsConfig::default(),
                    engagement: EngagementConfig::default(),
                }
            }
            Err(e) => {
                return Err(format!("Failed to read config file {config_path}: {e}").into());
            }
        };

        // Environment overrides apply even when the file exists.
        if let Ok(v) = env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT") {
            if let Ok(p) = v.parse() {
                config.server.port = p;
            }
        }
        if let Ok(v) = env::var("SERVICE_TOKEN") {
            config.server.service_token = v;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            config.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS") {
            if let Ok(mc) = v.parse() {
                config.database.max_connections = mc;
            }
        }
        if let Ok(v) = env::var("TELEGRAM_BOT_TOKEN") {
            config.telegram.bot_token = v;
        }
        if let Ok(v) = env::var("TELEGRAM_API_BASE") {
            config.telegram.api_base = v;
        }
        if let Ok(v) = env::var("TELEGRAM_BOT_USERNAME") {
            config.telegram.bot_username = v;
        }
        if let Ok(v) = env::var("TELEGRAM_SEND_TIMEOUT_SECS") {
            if let Ok(n) = v.parse() {
                config.telegram.send_timeout_secs = n;
            }
        }

        Ok(config)
    }

    fn parse(config_str: &str) -> Result<Self, Box<dyn std::error::Error>> {
        toml::from_str(config_str).map_err(|e| format!("Failed to parse config file: {e}").into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_config_with_defaults() {
        let config = Config::parse(
            r#"
            [server]
            host = "127.0.0.1"
            port = 8080
            service_token = "secret"

            [database]
            url = "sqlite://data/sparkpic.db?mode=rwc"
            max_connections = 5

            [telegram]
            bot_token = "123:abc"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.credits.starting_balance, 3);
        assert_eq!(config.credits.referral_payment_tier_after, 10);
        assert_eq!(config.engagement.winback_weekday, 0);
        assert_eq!(config.telegram.api_base, "https://api.telegram.org");
        assert_eq!(config.telegram.send_timeout_secs, 10);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = Config::parse(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000
            service_token = "s"

            [database]
            url = "sqlite::memory:"
            max_connections = 1

            [telegram]
            bot_token = "t"
            send_timeout_secs = 3

            [credits]
            starting_balance = 5
            referral_payment_tier_after = 2

            [engagement]
            winback_weekday = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.credits.starting_balance, 5);
        assert_eq!(config.credits.referral_payment_tier_after, 2);
        assert_eq!(config.engagement.winback_weekday, 4);
        assert_eq!(config.telegram.send_timeout_secs, 3);
    }
}
