use clap::builder::PossibleValuesParser;
use clap::Subcommand;
use pawfocus_core::{App, ConfigError, SessionConfig};
use std::path::PathBuf;

use super::print_json;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a setting
    Get {
        /// Setting key
        #[arg(value_parser = PossibleValuesParser::new(SessionConfig::KEYS))]
        key: String,
    },
    /// Change a setting
    Set {
        /// Setting key
        #[arg(value_parser = PossibleValuesParser::new(SessionConfig::KEYS))]
        key: String,
        /// New value
        value: String,
    },
    /// List all settings
    List,
    /// Reset settings to defaults
    Reset,
    /// Print settings as TOML
    Export,
    /// Replace settings from a TOML file
    Import {
        /// Path to a TOML file produced by `config export`
        path: PathBuf,
    },
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App::open()?;

    match action {
        ConfigAction::Get { key } => match app.config().get(&key) {
            Some(value) => println!("{value}"),
            None => return Err(ConfigError::UnknownKey(key).into()),
        },
        ConfigAction::Set { key, value } => {
            if key == "shelter.url" {
                check_shelter_url(&value)?;
            }
            app.update_config(|cfg| cfg.set(&key, &value))?;
            println!("ok");
        }
        ConfigAction::List => {
            print_json(app.config())?;
        }
        ConfigAction::Reset => {
            app.update_config(|cfg| {
                *cfg = SessionConfig::default();
                Ok(())
            })?;
            println!("config reset to defaults");
        }
        ConfigAction::Export => {
            print!("{}", app.config().to_toml()?);
        }
        ConfigAction::Import { path } => {
            app.import_config(&path)?;
            println!("ok");
        }
    }
    Ok(())
}

/// An empty URL is allowed and means "no shelter"; anything else must be
/// an absolute http(s) URL.
fn check_shelter_url(value: &str) -> Result<(), ConfigError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(());
    }
    let invalid = |message: String| ConfigError::InvalidValue {
        key: "shelter.url".into(),
        message,
    };
    let parsed = url::Url::parse(value).map_err(|e| invalid(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(format!("unsupported scheme '{other}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_https_and_empty() {
        assert!(check_shelter_url("https://shelter.example/donate").is_ok());
        assert!(check_shelter_url("").is_ok());
    }

    #[test]
    fn rejects_relative_and_odd_schemes() {
        assert!(check_shelter_url("shelter.example").is_err());
        assert!(check_shelter_url("ftp://shelter.example").is_err());
    }
}
