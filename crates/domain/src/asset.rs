//! Per-document presentation and logging options attached to every
//! destination a document produces.

use crate::args::ArgValue;
use crate::parse::parse_bool;
use notifyconf_shared::{ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};

/// Asset options shared by the destinations of one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetOptions {
    /// Application identifier.
    pub app_id: String,
    /// Application description.
    pub app_desc: String,
    /// Application URL.
    pub app_url: String,
    /// Theme name used to resolve images.
    pub theme: String,
    /// Default image file extension.
    pub default_extension: String,
    /// Image URL template.
    pub image_url_mask: String,
    /// Logo URL.
    pub image_url_logo: String,
    /// Local image path template.
    pub image_path_mask: String,
    /// Default HTML colour.
    pub default_html_color: String,
    /// Placeholder for unknown ASCII markers.
    pub default_ascii_chars: String,
    /// Text encoding of generated content.
    pub encoding: String,
    /// Mask secrets in URLs written to logs.
    pub secure_logging: bool,
    /// Deliver asynchronously.
    pub async_mode: bool,
    /// Interpret escape sequences in message bodies.
    pub interpret_escapes: bool,
    /// Generate PGP keys automatically.
    pub pgp_autogen: bool,
    /// Generate PEM keys automatically.
    pub pem_autogen: bool,
}

impl Default for AssetOptions {
    fn default() -> Self {
        Self {
            app_id: "notifyconf".to_owned(),
            app_desc: "notifyconf notifications".to_owned(),
            app_url: String::new(),
            theme: "default".to_owned(),
            default_extension: ".png".to_owned(),
            image_url_mask: String::new(),
            image_url_logo: String::new(),
            image_path_mask: String::new(),
            default_html_color: "#888888".to_owned(),
            default_ascii_chars: "[?]".to_owned(),
            encoding: "utf-8".to_owned(),
            secure_logging: true,
            async_mode: true,
            interpret_escapes: false,
            pgp_autogen: true,
            pem_autogen: true,
        }
    }
}

/// Why an asset key was not applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssetError {
    /// Keys starting or ending with `_` are reserved.
    #[error("ignored reserved asset key `{0}`")]
    Reserved(String),
    /// The key does not name an asset field.
    #[error("invalid asset key `{0}`")]
    UnknownKey(String),
    /// The value cannot be stored in the field.
    #[error("invalid asset value for `{0}`")]
    InvalidValue(String),
}

impl From<AssetError> for ErrorEnvelope {
    fn from(error: AssetError) -> Self {
        let key = match &error {
            AssetError::Reserved(key) | AssetError::UnknownKey(key) | AssetError::InvalidValue(key) => {
                key.clone()
            },
        };
        Self::expected(ErrorCode::new("config", "invalid_asset"), error.to_string())
            .with_metadata("key", key)
    }
}

enum AssetField<'a> {
    Text(&'a mut String),
    Flag(&'a mut bool),
}

impl AssetOptions {
    /// Set one field from a configuration value.
    ///
    /// Flags accept booleans or boolean words; text fields accept strings
    /// (trimmed). `null` counts as an empty string.
    pub fn apply(&mut self, key: &str, value: &ArgValue) -> Result<(), AssetError> {
        if key.starts_with('_') || key.ends_with('_') {
            return Err(AssetError::Reserved(key.to_owned()));
        }
        let field = self
            .field_mut(key)
            .ok_or_else(|| AssetError::UnknownKey(key.to_owned()))?;

        let empty = ArgValue::Str(String::new());
        let value = if value.is_null() { &empty } else { value };
        match (field, value) {
            (AssetField::Flag(flag), ArgValue::Bool(parsed)) => *flag = *parsed,
            (AssetField::Flag(flag), ArgValue::Str(text)) => *flag = parse_bool(text, false),
            (AssetField::Text(text), ArgValue::Str(raw)) => raw.trim().clone_into(text),
            _ => return Err(AssetError::InvalidValue(key.to_owned())),
        }
        Ok(())
    }

    fn field_mut(&mut self, key: &str) -> Option<AssetField<'_>> {
        let field = match key {
            "app_id" => AssetField::Text(&mut self.app_id),
            "app_desc" => AssetField::Text(&mut self.app_desc),
            "app_url" => AssetField::Text(&mut self.app_url),
            "theme" => AssetField::Text(&mut self.theme),
            "default_extension" => AssetField::Text(&mut self.default_extension),
            "image_url_mask" => AssetField::Text(&mut self.image_url_mask),
            "image_url_logo" => AssetField::Text(&mut self.image_url_logo),
            "image_path_mask" => AssetField::Text(&mut self.image_path_mask),
            "default_html_color" => AssetField::Text(&mut self.default_html_color),
            "default_ascii_chars" => AssetField::Text(&mut self.default_ascii_chars),
            "encoding" => AssetField::Text(&mut self.encoding),
            "secure_logging" => AssetField::Flag(&mut self.secure_logging),
            "async_mode" => AssetField::Flag(&mut self.async_mode),
            "interpret_escapes" => AssetField::Flag(&mut self.interpret_escapes),
            "pgp_autogen" => AssetField::Flag(&mut self.pgp_autogen),
            "pem_autogen" => AssetField::Flag(&mut self.pem_autogen),
            _ => return None,
        };
        Some(field)
    }
}
