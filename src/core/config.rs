use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::env;

use crate::utils::prepare_address;

/// Connection parameters for one gateway instance.
///
/// The password and auth code never appear in serialized or `Debug` output.
/// The presence of an auth code selects the authenticate-then-login path;
/// without one the gateway logs in directly after connecting.
#[derive(Debug, Clone)]
pub struct ConnectConfig {
    pub front_address: String,
    pub broker_id: String,
    pub user_id: String,
    pub password: Secret<String>,
    pub auth_code: Option<Secret<String>>,
    pub app_id: String,
    pub user_product_info: String,
    /// Whether a failed settlement confirmation demotes the session back to
    /// `Connected`. Brokers generally keep the login alive, so this
    /// defaults to `false`.
    pub reset_login_on_settlement_error: bool,
}

// Custom Serialize implementation - never expose secrets in serialization
impl Serialize for ConnectConfig {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("ConnectConfig", 8)?;
        state.serialize_field("front_address", &self.front_address)?;
        state.serialize_field("broker_id", &self.broker_id)?;
        state.serialize_field("user_id", &self.user_id)?;
        state.serialize_field("password", "[REDACTED]")?;
        state.serialize_field("auth_code", &self.auth_code.as_ref().map(|_| "[REDACTED]"))?;
        state.serialize_field("app_id", &self.app_id)?;
        state.serialize_field("user_product_info", &self.user_product_info)?;
        state.serialize_field(
            "reset_login_on_settlement_error",
            &self.reset_login_on_settlement_error,
        )?;
        state.end()
    }
}

// Custom Deserialize implementation
impl<'de> Deserialize<'de> for ConnectConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct ConnectConfigHelper {
            front_address: String,
            broker_id: String,
            user_id: String,
            password: String,
            auth_code: Option<String>,
            #[serde(default)]
            app_id: String,
            #[serde(default)]
            user_product_info: String,
            #[serde(default)]
            reset_login_on_settlement_error: bool,
        }

        let helper = ConnectConfigHelper::deserialize(deserializer)?;
        Ok(Self {
            front_address: helper.front_address,
            broker_id: helper.broker_id,
            user_id: helper.user_id,
            password: Secret::new(helper.password),
            auth_code: helper.auth_code.map(Secret::new),
            app_id: helper.app_id,
            user_product_info: helper.user_product_info,
            reset_login_on_settlement_error: helper.reset_login_on_settlement_error,
        })
    }
}

impl ConnectConfig {
    /// Create a new configuration with the required connection parameters
    #[must_use]
    pub fn new(
        front_address: String,
        broker_id: String,
        user_id: String,
        password: String,
    ) -> Self {
        Self {
            front_address,
            broker_id,
            user_id,
            password: Secret::new(password),
            auth_code: None,
            app_id: String::new(),
            user_product_info: String::new(),
            reset_login_on_settlement_error: false,
        }
    }

    /// Create configuration from environment variables
    ///
    /// Expected environment variables:
    /// - `CTP_FRONT_ADDRESS`
    /// - `CTP_BROKER_ID`
    /// - `CTP_USER_ID`
    /// - `CTP_PASSWORD`
    /// - `CTP_AUTH_CODE` (optional - enables the authenticate path)
    /// - `CTP_APP_ID` (optional)
    pub fn from_env() -> Result<Self, ConfigError> {
        let front_address = env::var("CTP_FRONT_ADDRESS")
            .map_err(|_| ConfigError::MissingEnvironmentVariable("CTP_FRONT_ADDRESS".into()))?;
        let broker_id = env::var("CTP_BROKER_ID")
            .map_err(|_| ConfigError::MissingEnvironmentVariable("CTP_BROKER_ID".into()))?;
        let user_id = env::var("CTP_USER_ID")
            .map_err(|_| ConfigError::MissingEnvironmentVariable("CTP_USER_ID".into()))?;
        let password = env::var("CTP_PASSWORD")
            .map_err(|_| ConfigError::MissingEnvironmentVariable("CTP_PASSWORD".into()))?;

        let mut config = Self::new(front_address, broker_id, user_id, password);
        if let Ok(auth_code) = env::var("CTP_AUTH_CODE") {
            config.auth_code = Some(Secret::new(auth_code));
        }
        if let Ok(app_id) = env::var("CTP_APP_ID") {
            config.app_id = app_id;
        }
        Ok(config)
    }

    /// Create configuration from a .env file and environment variables
    ///
    /// **Security Warning**: Never commit .env files to version control!
    /// Add .env to your .gitignore file.
    #[cfg(feature = "env-file")]
    pub fn from_env_file(env_file_path: &str) -> Result<Self, ConfigError> {
        match dotenv::from_path(env_file_path) {
            Ok(_) => {}
            Err(dotenv::Error::Io(io_err)) if io_err.kind() == std::io::ErrorKind::NotFound => {
                // .env file doesn't exist, continue with system env vars
            }
            Err(e) => {
                return Err(ConfigError::InvalidConfiguration(format!(
                    "Failed to load .env file '{}': {}",
                    env_file_path, e
                )));
            }
        }

        Self::from_env()
    }

    /// Set the auth code, enabling the authenticate-then-login path
    #[must_use]
    pub fn auth_code(mut self, auth_code: String) -> Self {
        self.auth_code = Some(Secret::new(auth_code));
        self
    }

    /// Set the application identifier sent during authentication
    #[must_use]
    pub fn app_id(mut self, app_id: String) -> Self {
        self.app_id = app_id;
        self
    }

    /// Set the client product information sent during login
    #[must_use]
    pub fn user_product_info(mut self, info: String) -> Self {
        self.user_product_info = info;
        self
    }

    /// Demote the session on a failed settlement confirmation
    #[must_use]
    pub const fn reset_login_on_settlement_error(mut self, reset: bool) -> Self {
        self.reset_login_on_settlement_error = reset;
        self
    }

    /// Verify all required fields are present, reporting every missing one
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut missing = Vec::new();
        if self.front_address.is_empty() {
            missing.push("front_address");
        }
        if self.broker_id.is_empty() {
            missing.push("broker_id");
        }
        if self.user_id.is_empty() {
            missing.push("user_id");
        }
        if self.password.expose_secret().is_empty() {
            missing.push("password");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::MissingFields(missing.join(", ")))
        }
    }

    /// The front address with the default `tcp://` scheme applied if absent
    #[must_use]
    pub fn prepared_address(&self) -> String {
        prepare_address(&self.front_address)
    }

    /// True when an auth code is configured
    #[must_use]
    pub fn has_auth_code(&self) -> bool {
        self.auth_code.is_some()
    }

    /// Get the password (use carefully - exposes secret)
    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }

    /// Get the auth code (use carefully - exposes secret)
    pub fn auth_code_value(&self) -> Option<&str> {
        self.auth_code.as_ref().map(|c| c.expose_secret().as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvironmentVariable(String),

    #[error("Missing required connection parameters: {0}")]
    MissingFields(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}
