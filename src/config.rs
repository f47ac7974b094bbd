//! Process configuration read from the environment once at startup.

use std::env;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl Environment {
    fn parse(s: &str) -> Environment {
        match s {
            "production" => Environment::Production,
            "test" => Environment::Test,
            _ => Environment::Development,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub database_url: String,
}

impl AppConfig {
    /// Read config from the environment (and a `.env` file if present).
    pub fn from_env() -> AppConfig {
        dotenvy::dotenv().ok();
        AppConfig {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3000),
            environment: Environment::parse(
                env::var("APP_ENV").unwrap_or_default().to_lowercase().as_str(),
            ),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost/blog".into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_parse_defaults_to_development() {
        assert_eq!(Environment::parse("production"), Environment::Production);
        assert_eq!(Environment::parse("test"), Environment::Test);
        assert_eq!(Environment::parse(""), Environment::Development);
        assert_eq!(Environment::parse("staging"), Environment::Development);
    }
}
