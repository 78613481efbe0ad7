use std::env;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use chrono_tz::Tz;
use dotenvy::dotenv;

#[derive(Clone)]
pub struct Config {
    pub server_addr: String,
    /// Unset runs on the in-memory store
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub access_token_ttl: usize,
    pub timezone: Tz,

    // Rate limiting
    pub rate_kiosk_per_min: u32,
    pub rate_login_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    // Kiosk self-registration
    pub default_password: String,
    pub email_domain: String,

    pub admin: Option<AdminSeed>,

    pub log_dir: String,
    pub log_level: tracing::Level,
}

/// Administrator created at startup when no user has this email.
#[derive(Clone)]
pub struct AdminSeed {
    pub name: String,
    pub email: String,
    pub cpf: String,
    pub password: String,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = var_or(key, default);
    raw.parse()
        .map_err(|e| anyhow!("{key} has invalid value `{raw}`: {e}"))
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let admin = match (env::var("ADMIN_EMAIL"), env::var("ADMIN_PASSWORD")) {
            (Ok(email), Ok(password)) => Some(AdminSeed {
                name: var_or("ADMIN_NAME", "Administrator"),
                cpf: var_or("ADMIN_CPF", "00000000000"),
                email,
                password,
            }),
            _ => None,
        };

        Ok(Self {
            server_addr: var_or("SERVER_ADDR", "0.0.0.0:5000"),
            database_url: env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            access_token_ttl: parse_var("ACCESS_TOKEN_TTL", "900")?, // default 15 min
            timezone: parse_var("TIMEZONE", "America/Sao_Paulo")?,

            rate_kiosk_per_min: parse_var("RATE_KIOSK_PER_MIN", "120")?,
            rate_login_per_min: parse_var("RATE_LOGIN_PER_MIN", "60")?,
            rate_protected_per_min: parse_var("RATE_PROTECTED_PER_MIN", "1000")?,

            api_prefix: var_or("API_PREFIX", "/api"),

            default_password: var_or("DEFAULT_PASSWORD", "defaultpass"),
            email_domain: var_or("EMAIL_DOMAIN", "hercruz.com"),

            admin,

            log_dir: var_or("LOG_DIR", "logs"),
            log_level: parse_var("LOG_LEVEL", "debug")?,
        })
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            server_addr: "127.0.0.1:0".into(),
            database_url: None,
            jwt_secret: "test-secret".into(),
            access_token_ttl: 900,
            timezone: chrono_tz::America::Sao_Paulo,
            rate_kiosk_per_min: 1000,
            rate_login_per_min: 1000,
            rate_protected_per_min: 1000,
            api_prefix: "/api".into(),
            default_password: "defaultpass".into(),
            email_domain: "hercruz.com".into(),
            admin: None,
            log_dir: "logs".into(),
            log_level: tracing::Level::DEBUG,
        }
    }
}
