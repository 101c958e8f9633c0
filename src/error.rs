use colored::Colorize;
use std::num::{ParseFloatError, ParseIntError};
use std::path::PathBuf;
use thiserror::Error;

use crate::duration::DurationError;

/// Why a piece of environment text could not be turned into a field value
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("expected one of 1, t, T, TRUE, true, True, 0, f, F, FALSE, false, False")]
    Bool,
    #[error("{0}")]
    Int(#[from] ParseIntError),
    #[error("sign not allowed for unsigned integer")]
    UnsignedSign,
    #[error("{0}")]
    Float(#[from] ParseFloatError),
    #[error("value out of range for {type_name}")]
    FloatOutOfRange { type_name: &'static str },
    #[error("{0}")]
    Duration(#[from] DurationError),
    #[error("negative duration cannot be stored in an unsigned duration")]
    NegativeDuration,
    #[error("expected an RFC 3339 timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),
    #[error("expected exactly one character")]
    Char,
    #[error("{0}")]
    Addr(#[from] std::net::AddrParseError),
    /// The target type has no textual coercion rule
    #[error("unsupported field type: {type_name}")]
    Unsupported { type_name: String },
}

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The bind target is not a record
    #[error("{}: bind target must be a struct deriving Bind", .type_name.magenta().bold())]
    InvalidTarget { type_name: String },

    /// A set environment variable could not be parsed into its field
    #[error(
        "{}: Invalid value for field {}: {}",
        .var.magenta().bold(),
        .field.cyan(),
        .cause
    )]
    FieldBind {
        field: String,
        var: String,
        #[source]
        cause: ParseError,
    },

    /// A tagged field's type has no textual coercion rule
    #[error(
        "{}: field {} has unsupported type {}",
        .var.magenta().bold(),
        .field.cyan(),
        .type_name.red()
    )]
    UnsupportedType {
        field: String,
        var: String,
        type_name: String,
    },

    /// A set environment variable is not valid unicode
    #[error("{}: value for field {} is not valid unicode", .var.magenta().bold(), .field.cyan())]
    NotUnicode { field: String, var: String },

    #[cfg(feature = "file")]
    #[error("Failed to read config file {}: {source}", .path.display())]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[cfg(feature = "file")]
    #[error("Failed to decode config file {}: {source}", .path.display())]
    FileDecode {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[cfg(feature = "file")]
    #[error("Failed to encode current configuration: {0}")]
    FileEncode(#[from] toml::ser::Error),

    #[error("Failed to read .env file {}: {source}", .path.display())]
    Dotenv {
        path: PathBuf,
        source: dotenvy::Error,
    },

    #[error("Failed to write documentation to {}: {source}", .path.display())]
    DocsWrite {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Name of the environment variable involved, if any
    pub fn var(&self) -> Option<&str> {
        match self {
            ConfigError::FieldBind { var, .. }
            | ConfigError::UnsupportedType { var, .. }
            | ConfigError::NotUnicode { var, .. } => Some(var),
            _ => None,
        }
    }

    /// Dotted path of the field involved, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            ConfigError::FieldBind { field, .. }
            | ConfigError::UnsupportedType { field, .. }
            | ConfigError::NotUnicode { field, .. } => Some(field),
            _ => None,
        }
    }
}
