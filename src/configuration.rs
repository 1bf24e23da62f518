use crate::error::ConfigError;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub jwt: JwtSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
    /// Upper bound for a single persistence round-trip or password hash
    #[serde(default = "default_store_timeout")]
    pub store_timeout_secs: u64,
    #[serde(default = "default_hash_cost")]
    pub password_hash_cost: u32,
}

/// Work factors bcrypt accepts
const HASH_COST_RANGE: std::ops::RangeInclusive<u32> = 4..=31;

impl ApplicationSettings {
    pub fn store_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.store_timeout_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !HASH_COST_RANGE.contains(&self.password_hash_cost) {
            return Err(ConfigError::InvalidValue(format!(
                "application.password_hash_cost must be within {}..={}, got {}",
                HASH_COST_RANGE.start(),
                HASH_COST_RANGE.end(),
                self.password_hash_cost
            )));
        }
        if self.store_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "application.store_timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_store_timeout() -> u64 {
    5
}

fn default_hash_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }

    pub fn connection_string_without_db(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}",
            self.username, self.password, self.host, self.port
        )
    }
}

/// Token signing settings
///
/// The secret is read once at startup and shared read-only by every worker.
#[derive(serde::Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub access_token_expiry: i64,   // seconds (43200 = 12 hours)
    pub refresh_token_expiry: i64,  // seconds (360000 = 100 hours)
}

impl JwtSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired("jwt.secret".to_string()));
        }
        if self.access_token_expiry <= 0 || self.refresh_token_expiry <= 0 {
            return Err(ConfigError::InvalidValue(
                "token expiry must be a positive number of seconds".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load settings from `configuration.yaml` (optional) and `APP__*` environment variables.
///
/// `APP__JWT__SECRET=...` overrides `jwt.secret`, and so on.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    let settings = settings
        .try_deserialize::<Settings>()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    settings.application.validate()?;
    settings.jwt.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt(secret: &str) -> JwtSettings {
        JwtSettings {
            secret: secret.to_string(),
            access_token_expiry: 43200,
            refresh_token_expiry: 360000,
        }
    }

    #[test]
    fn test_empty_secret_is_rejected() {
        assert!(matches!(
            jwt("   ").validate(),
            Err(ConfigError::MissingRequired(_))
        ));
    }

    #[test]
    fn test_non_positive_expiry_is_rejected() {
        let mut settings = jwt("secret");
        settings.access_token_expiry = 0;
        assert!(matches!(settings.validate(), Err(ConfigError::InvalidValue(_))));
    }

    fn application(password_hash_cost: u32) -> ApplicationSettings {
        ApplicationSettings {
            host: default_host(),
            port: 8000,
            store_timeout_secs: default_store_timeout(),
            password_hash_cost,
        }
    }

    #[test]
    fn test_hash_cost_outside_bcrypt_range_is_rejected() {
        for cost in [0, 3, 32, 99] {
            assert!(
                matches!(application(cost).validate(), Err(ConfigError::InvalidValue(_))),
                "cost {}",
                cost
            );
        }
        for cost in [4, 12, 31] {
            assert!(application(cost).validate().is_ok(), "cost {}", cost);
        }
    }

    #[test]
    fn test_zero_store_timeout_is_rejected() {
        let mut settings = application(12);
        settings.store_timeout_secs = 0;
        assert!(matches!(settings.validate(), Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_connection_strings() {
        let db = DatabaseSettings {
            username: "app".to_string(),
            password: "pw".to_string(),
            port: 5432,
            host: "localhost".to_string(),
            database_name: "movies".to_string(),
        };
        assert_eq!(db.connection_string(), "postgres://app:pw@localhost:5432/movies");
        assert_eq!(db.connection_string_without_db(), "postgres://app:pw@localhost:5432");
    }
}
