//! Session settings.
//!
//! Stores user preferences including:
//! - Session length and strict mode
//! - Reward rate (treats per success, cents per treat)
//! - The shelter that receives donations
//!
//! Each field lives under its own key in the kv store (see [`super::keys`]),
//! so a damaged value only resets that one setting to its default.

use serde::{Deserialize, Serialize};

use super::{keys, KvStore, KvStoreExt};
use crate::error::ConfigError;

/// Stand-in donation URL shipped with the defaults. Donating is refused
/// until the user replaces it.
pub const SHELTER_URL_PLACEHOLDER: &str = "https://example.org/donate";

/// Where pledged money goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shelter {
    #[serde(default = "default_shelter_name")]
    pub name: String,
    #[serde(default)]
    pub url: String,
}

impl Shelter {
    /// True when the URL is something other than empty or the placeholder.
    pub fn has_donation_url(&self) -> bool {
        let url = self.url.trim();
        !url.is_empty() && url != SHELTER_URL_PLACEHOLDER
    }
}

impl Default for Shelter {
    fn default() -> Self {
        Self {
            name: default_shelter_name(),
            url: SHELTER_URL_PLACEHOLDER.to_string(),
        }
    }
}

/// User-editable session and reward settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_duration_secs")]
    pub duration_secs: u64,
    #[serde(default)]
    pub strict_mode: bool,
    #[serde(default = "default_treats_per_success")]
    pub treats_per_success: u64,
    /// Cents pledged per treat.
    #[serde(default = "default_pledge_rate_cents")]
    pub pledge_rate_cents: u64,
    #[serde(default)]
    pub shelter: Shelter,
}

fn default_duration_secs() -> u64 {
    25 * 60
}
fn default_treats_per_success() -> u64 {
    1
}
fn default_pledge_rate_cents() -> u64 {
    25
}
fn default_shelter_name() -> String {
    "Your local shelter".into()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_secs: default_duration_secs(),
            strict_mode: false,
            treats_per_success: default_treats_per_success(),
            pledge_rate_cents: default_pledge_rate_cents(),
            shelter: Shelter::default(),
        }
    }
}

impl SessionConfig {
    /// Keys accepted by [`SessionConfig::get`] and [`SessionConfig::set`].
    pub const KEYS: [&'static str; 6] = [
        "duration_secs",
        "strict_mode",
        "treats_per_success",
        "pledge_rate_cents",
        "shelter.name",
        "shelter.url",
    ];

    /// Load every setting, falling back to the default per key.
    pub fn load(store: &impl KvStore) -> Self {
        let defaults = Self::default();
        let mut duration_secs = store.load(keys::DURATION_SECS, defaults.duration_secs);
        if duration_secs == 0 {
            tracing::debug!("stored session duration is zero, using default");
            duration_secs = defaults.duration_secs;
        }
        Self {
            duration_secs,
            strict_mode: store.load(keys::STRICT_MODE, defaults.strict_mode),
            treats_per_success: store.load(keys::TREATS_PER_SUCCESS, defaults.treats_per_success),
            pledge_rate_cents: store.load(keys::PLEDGE_RATE_CENTS, defaults.pledge_rate_cents),
            shelter: store.load(keys::SHELTER, defaults.shelter),
        }
    }

    /// Persist every setting. Best effort, like all kv writes.
    pub fn save(&self, store: &impl KvStore) {
        store.save(keys::DURATION_SECS, &self.duration_secs);
        store.save(keys::STRICT_MODE, &self.strict_mode);
        store.save(keys::TREATS_PER_SUCCESS, &self.treats_per_success);
        store.save(keys::PLEDGE_RATE_CENTS, &self.pledge_rate_cents);
        store.save(keys::SHELTER, &self.shelter);
    }

    /// # Errors
    ///
    /// Returns `InvalidValue` if the session duration is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.duration_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "duration_secs".into(),
                message: "must be greater than zero".into(),
            });
        }
        Ok(())
    }

    /// Get a setting as a string by dot-separated key. Only leaf keys from
    /// [`SessionConfig::KEYS`] resolve.
    pub fn get(&self, key: &str) -> Option<String> {
        if !Self::KEYS.contains(&key) {
            return None;
        }
        let json = serde_json::to_value(self).ok()?;
        let val = get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a setting by dot-separated key, parsing `value` according to the
    /// type currently stored there. The result is validated before it is
    /// applied; on error `self` is unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the new settings are invalid.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        if !Self::KEYS.contains(&key) {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        set_json_value_by_path(&mut json, key, value)?;
        let updated: SessionConfig =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Render the settings as a TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    /// Parse and validate a TOML settings document. Missing fields take
    /// their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not parse or is invalid.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let cfg: SessionConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }
}

fn get_json_value_by_path<'a>(
    root: &'a serde_json::Value,
    key: &str,
) -> Option<&'a serde_json::Value> {
    if key.is_empty() {
        return None;
    }

    let mut current = root;
    for part in key.split('.') {
        current = current.get(part)?;
    }
    Some(current)
}

fn set_json_value_by_path(
    root: &mut serde_json::Value,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    let unknown = || ConfigError::UnknownKey(key.to_string());
    let invalid = |message: String| ConfigError::InvalidValue {
        key: key.to_string(),
        message,
    };

    let mut parts = key.split('.').peekable();
    let mut current = root;
    while let Some(part) = parts.next() {
        if parts.peek().is_some() {
            current = current.get_mut(part).ok_or_else(unknown)?;
            continue;
        }

        let obj = current.as_object_mut().ok_or_else(unknown)?;
        let existing = obj.get(part).ok_or_else(unknown)?;
        let new_value = match existing {
            serde_json::Value::Bool(_) => value
                .trim()
                .parse::<bool>()
                .map(serde_json::Value::Bool)
                .map_err(|_| invalid(format!("expected true or false, got '{value}'")))?,
            serde_json::Value::Number(_) => value
                .trim()
                .parse::<u64>()
                .map(|n| serde_json::Value::Number(n.into()))
                .map_err(|_| invalid(format!("expected a non-negative integer, got '{value}'")))?,
            serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
            }
            _ => serde_json::Value::String(value.into()),
        };
        obj.insert(part.to_string(), new_value);
        return Ok(());
    }

    Err(unknown())
}
