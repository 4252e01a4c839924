// SPDX-License-Identifier: GPL-3.0-or-later
// rexpad - Engine and preset error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised before a template can be rendered.
///
/// Malformed template commands are never an error; they render literally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("invalid pattern name '{0}': must start with a letter and contain only letters, digits or '_'")]
    InvalidName(String),

    #[error("duplicate pattern name '{0}'")]
    DuplicateName(String),

    #[error("invalid regex for '{name}': {message}")]
    InvalidPattern { name: String, message: String },
}

/// Why a MATH body failed to evaluate. Rendering maps all of these to `0`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MathError {
    #[error("empty expression")]
    Empty,

    #[error("unexpected '{found}' at offset {offset}")]
    Unexpected { found: char, offset: usize },

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("result is not a finite number")]
    NotFinite,

    #[error("expression nested too deeply")]
    TooDeep,
}

#[derive(Debug, Error)]
pub enum PresetError {
    #[error("failed to read preset {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write preset {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse preset {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize preset '{name}': {source}")]
    Serialize {
        name: String,
        #[source]
        source: toml::ser::Error,
    },

    #[error("preset name is empty")]
    EmptyName,

    #[error("preset '{0}' not found")]
    NotFound(String),
}
