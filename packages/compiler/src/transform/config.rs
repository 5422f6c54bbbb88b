//! Config Decoder
//!
//! Decodes the inline configuration literal a template may declare.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Inline template configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(alias = "Version", deserialize_with = "weak_int")]
    pub version: i64,
}

/// Configuration of a template without an inline declaration
pub const DEFAULT_CONFIG: Config = Config { version: 1 };

impl Default for Config {
    fn default() -> Self {
        DEFAULT_CONFIG
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Decode a config literal. Object literals are JSON, anything else is TOML.
pub fn decode(literal: &str) -> Result<Config, ConfigError> {
    let trimmed = literal.trim();
    if trimmed.starts_with('{') {
        Ok(serde_json::from_str(trimmed)?)
    } else {
        Ok(toml::from_str(trimmed)?)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WeakInt {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

fn weak_int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match WeakInt::deserialize(deserializer)? {
        WeakInt::Int(v) => Ok(v),
        WeakInt::Float(f) if !f.is_finite() || f.fract() != 0.0 => {
            Err(de::Error::custom(format!("{} is not an integer", f)))
        }
        WeakInt::Float(f) if (i64::MIN as f64..i64::MAX as f64).contains(&f) => Ok(f as i64),
        WeakInt::Float(f) => Err(de::Error::custom(format!("{} is out of range", f))),
        WeakInt::Str(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("{:?} is not an integer", s))),
        WeakInt::Bool(b) => Ok(i64::from(b)),
    }
}
