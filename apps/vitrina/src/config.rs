//! # Configuration
//!
//! Operator settings for a Vitrina deployment.
//!
//! Settings come from a TOML file (default `vitrina.toml`), then a few
//! environment variables override them:
//!
//! - `VITRINA_SOURCE_PATH`: local spreadsheet path
//! - `VITRINA_REMOTE_URL`: shared spreadsheet URL (wins over the path)
//! - `VITRINA_PHONE`: messaging phone number, digits only
//!
//! ```toml
//! phone_number = "5493510000000"
//!
//! [source]
//! remote_url = "https://docs.google.com/spreadsheets/d/FILE_ID/edit"
//!
//! [columns]
//! name = "DETALLE"
//!
//! [[contact_form]]
//! key = "nombre"
//! label = "Nombre"
//! required = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use vitrina_core::primitives::DEFAULT_GREETING;
use vitrina_core::{
    CatalogLoader, ColumnMap, ContactForm, OrderComposer, PhoneNumber, VitrinaError,
};

/// Config file read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "vitrina.toml";

/// Spreadsheet read when nothing else is configured.
pub const DEFAULT_SOURCE_PATH: &str = "productos.xlsx";

/// Maximum config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

// =============================================================================
// SOURCE
// =============================================================================

/// Where the catalog spreadsheet lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceConfig {
    /// A file on local disk.
    Path(PathBuf),
    /// A shared document that must be downloaded first.
    RemoteUrl(String),
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self::Path(PathBuf::from(DEFAULT_SOURCE_PATH))
    }
}

impl std::fmt::Display for SourceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path(path) => write!(f, "file {}", path.display()),
            Self::RemoteUrl(url) => write!(f, "remote {}", url),
        }
    }
}

// =============================================================================
// APP CONFIG
// =============================================================================

/// Complete application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub source: SourceConfig,
    /// Messaging number orders are sent to. Orders can be composed without
    /// it, but no deep link is produced.
    pub phone_number: Option<PhoneNumber>,
    pub greeting: String,
    pub columns: ColumnMap,
    pub contact_form: ContactForm,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            phone_number: None,
            greeting: DEFAULT_GREETING.to_string(),
            columns: ColumnMap::default(),
            contact_form: ContactForm::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration.
    ///
    /// With an explicit path the file must exist. Without one,
    /// `vitrina.toml` is read if present and defaults are used otherwise.
    /// Environment overrides are applied last.
    pub fn load(explicit: Option<&Path>) -> Result<Self, VitrinaError> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, VitrinaError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            VitrinaError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(VitrinaError::InvalidConfig(format!(
                "config file {} is larger than {} bytes",
                path.display(),
                MAX_CONFIG_FILE_SIZE
            )));
        }
        let text = std::fs::read_to_string(path).map_err(|e| {
            VitrinaError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&text)
    }

    /// Parse TOML text.
    pub fn from_toml(text: &str) -> Result<Self, VitrinaError> {
        toml::from_str(text).map_err(|e| VitrinaError::InvalidConfig(e.to_string()))
    }

    /// Apply environment-style overrides through `lookup`.
    ///
    /// Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), VitrinaError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = get("VITRINA_SOURCE_PATH") {
            self.source = SourceConfig::Path(PathBuf::from(path));
        }
        if let Some(url) = get("VITRINA_REMOTE_URL") {
            self.source = SourceConfig::RemoteUrl(url.trim().to_string());
        }
        if let Some(phone) = get("VITRINA_PHONE") {
            self.phone_number = Some(PhoneNumber::parse(&phone)?);
        }
        Ok(())
    }

    /// Check values that deserialization cannot.
    pub fn validate(&self) -> Result<(), VitrinaError> {
        self.contact_form.validate()?;
        if let SourceConfig::RemoteUrl(url) = &self.source {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(VitrinaError::InvalidConfig(format!(
                    "remote_url must be an http(s) URL: {}",
                    url
                )));
            }
        }
        let columns = &self.columns;
        for (field, name) in [
            ("name", &columns.name),
            ("price", &columns.price),
            ("stock", &columns.stock),
        ] {
            if name.trim().is_empty() {
                return Err(VitrinaError::InvalidConfig(format!(
                    "column name for {} is empty",
                    field
                )));
            }
        }
        Ok(())
    }

    /// Loader configured with these column names.
    #[must_use]
    pub fn loader(&self) -> CatalogLoader {
        CatalogLoader::new(self.columns.clone())
    }

    /// Composer configured with this form and greeting.
    #[must_use]
    pub fn composer(&self) -> OrderComposer {
        OrderComposer::new(self.contact_form.clone()).with_greeting(self.greeting.clone())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = AppConfig::from_toml("").expect("parse");
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.columns.name, "DETALLE");
        assert_eq!(config.contact_form.required_keys().len(), 4);
    }

    #[test]
    fn full_toml_parses() {
        let text = r#"
            phone_number = "5493510000000"
            greeting = "Hola!"

            [source]
            remote_url = "https://docs.google.com/spreadsheets/d/abc123/edit"

            [columns]
            name = "Nombre"
            price = "Precio"

            [[contact_form]]
            key = "nombre"
            label = "Nombre"
            required = true

            [[contact_form]]
            key = "email"
            label = "Email"
        "#;
        let config = AppConfig::from_toml(text).expect("parse");
        assert_eq!(
            config.source,
            SourceConfig::RemoteUrl("https://docs.google.com/spreadsheets/d/abc123/edit".into())
        );
        assert_eq!(
            config.phone_number.as_ref().map(PhoneNumber::as_str),
            Some("5493510000000")
        );
        assert_eq!(config.columns.name, "Nombre");
        assert_eq!(config.columns.stock, "STOCK");
        assert_eq!(config.contact_form.required_keys(), vec!["nombre"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn example_config_matches_defaults() {
        let text = include_str!("../../../vitrina.toml.example");
        let config = AppConfig::from_toml(text).expect("parse");
        assert!(config.validate().is_ok());
        assert_eq!(config.columns, ColumnMap::default());
        assert_eq!(config.contact_form, ContactForm::default());
        assert_eq!(config.source, SourceConfig::default());
    }

    #[test]
    fn invalid_phone_in_toml_is_rejected() {
        assert!(AppConfig::from_toml("phone_number = \"+54 9 351\"").is_err());
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = AppConfig::default();
        config
            .apply_overrides(|key| match key {
                "VITRINA_SOURCE_PATH" => Some("lista.csv".to_string()),
                "VITRINA_PHONE" => Some("123456".to_string()),
                _ => None,
            })
            .expect("overrides");
        assert_eq!(config.source, SourceConfig::Path(PathBuf::from("lista.csv")));
        assert_eq!(
            config.phone_number.as_ref().map(PhoneNumber::as_str),
            Some("123456")
        );
    }

    #[test]
    fn remote_override_wins_over_path() {
        let mut config = AppConfig::default();
        config
            .apply_overrides(|key| match key {
                "VITRINA_SOURCE_PATH" => Some("lista.csv".to_string()),
                "VITRINA_REMOTE_URL" => Some("https://example.com/d/x/edit".to_string()),
                _ => None,
            })
            .expect("overrides");
        assert!(matches!(config.source, SourceConfig::RemoteUrl(_)));
    }

    #[test]
    fn bad_env_phone_is_an_error() {
        let mut config = AppConfig::default();
        let result = config.apply_overrides(|key| {
            (key == "VITRINA_PHONE").then(|| "54-351".to_string())
        });
        assert!(matches!(result, Err(VitrinaError::InvalidPhoneNumber(_))));
    }

    #[test]
    fn validate_rejects_non_http_remote() {
        let config = AppConfig {
            source: SourceConfig::RemoteUrl("ftp://x".to_string()),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn explicit_missing_config_file_is_an_error() {
        let result = AppConfig::load(Some(Path::new("/no/such/vitrina.toml")));
        assert!(matches!(result, Err(VitrinaError::InvalidConfig(_))));
    }
}
