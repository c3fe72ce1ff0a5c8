//! Parameter document loading.
//!
//! The main entry point is [`Loader`]; [`load_from_slice`], [`load_from_str`]
//! and [`load_file`] are shorthands for a loader without overrides.
//!
//! Loading is all-or-nothing. A document that is not JSON, or whose top level
//! is not an object, fails with [`LoadError::Parse`]. Anything else that is
//! wrong with the envelope or the parameters fails with
//! [`LoadError::Validation`], which lists every problem at once.

use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info};
use vra_core::validation::{Problem, ValidationError, json_kind};
use vra_core::{GuestConfig, validate_params};

use crate::overrides;

/// Conventional wrapper key of module argument documents.
pub const MODULE_ARGS_KEY: &str = "ANSIBLE_MODULE_ARGS";

/// Field path used for problems with the document envelope itself.
const DOCUMENT_FIELD: &str = "<document>";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// The input is not a JSON object.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The input is not well-formed JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The input is JSON, but its top level is not an object.
    #[error("top-level value must be a JSON object, found {0}")]
    NotAnObject(&'static str),
}

/// Errors that can occur while loading a parameter document.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The parameter file could not be read.
    #[error("failed to read parameter file {}: {source}", .path.display())]
    Io {
        /// The file that was being read.
        path: PathBuf,
        source: std::io::Error,
    },

    /// The document could not be parsed.
    #[error("failed to parse parameter document: {0}")]
    Parse(#[from] ParseError),

    /// The document parsed but its parameters are invalid.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl LoadError {
    /// Returns `true` if this is a [`LoadError::Parse`].
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse(_))
    }

    /// Returns `true` if this is a [`LoadError::Validation`].
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// The validation problems, if this is a [`LoadError::Validation`].
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(ParseError::Json(e))
    }
}

/// A specialized `Result` type for loading operations.
pub type Result<T> = std::result::Result<T, LoadError>;

// ---------------------------------------------------------------------------
// Loader
// ---------------------------------------------------------------------------

/// Loads and validates parameter documents, optionally applying overrides.
#[derive(Clone, Default)]
pub struct Loader {
    env_prefix: Option<String>,
    overrides: Vec<(String, String)>,
}

// Override values may hold the password, so only keys are shown.
impl fmt::Debug for Loader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Loader")
            .field("env_prefix", &self.env_prefix)
            .field(
                "overrides",
                &self.overrides.iter().map(|(k, _)| k).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Loader {
    /// Creates a loader that uses the document as-is.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overlays `<prefix><PARAM>` environment variables onto the parameters.
    ///
    /// See [`overrides::DEFAULT_ENV_PREFIX`] for the conventional prefix.
    pub fn with_env_overrides(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Replaces one scalar parameter. Explicit overrides win over the
    /// environment.
    pub fn with_override(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.push((key.into(), value.into()));
        self
    }

    /// Reads and loads the parameter file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Io`] if the file cannot be read, otherwise see
    /// [`Loader::load_from_slice`].
    pub fn load_file(&self, path: &Path) -> Result<GuestConfig> {
        info!(path = %path.display(), "loading parameter file");
        let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_from_slice(&bytes)
    }

    /// Loads a parameter document from text.
    pub fn load_from_str(&self, document: &str) -> Result<GuestConfig> {
        self.load_from_slice(document.as_bytes())
    }

    /// Loads a parameter document from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Parse`] on malformed JSON or a non-object top
    /// level, and [`LoadError::Validation`] on any envelope or schema problem.
    pub fn load_from_slice(&self, bytes: &[u8]) -> Result<GuestConfig> {
        let document: Value = serde_json::from_slice(bytes)?;
        let (wrapper, mut params) = unwrap_envelope(document)?;
        debug!(wrapper = %wrapper, params = params.len(), "parsed parameter document");

        let mut pending = match &self.env_prefix {
            Some(prefix) => overrides::from_env(prefix),
            None => Vec::new(),
        };
        pending.extend(self.overrides.iter().cloned());
        if !pending.is_empty() {
            let applied = overrides::apply(&mut params, &pending);
            info!(?applied, "applied parameter overrides");
        }

        Ok(validate_params(&params)?)
    }
}

/// Splits the document into its wrapper key and parameter object.
fn unwrap_envelope(document: Value) -> Result<(String, Map<String, Value>)> {
    let top = match document {
        Value::Object(map) => map,
        other => return Err(ParseError::NotAnObject(json_kind(&other)).into()),
    };

    let keys = top.len();
    let mut entries = top.into_iter();
    match (entries.next(), entries.next()) {
        (Some((wrapper, Value::Object(params))), None) => Ok((wrapper, params)),
        (Some((wrapper, other)), None) => Err(ValidationError::single(
            wrapper,
            Problem::WrongType {
                expected: "object",
                found: json_kind(&other),
            },
        )
        .into()),
        _ => Err(ValidationError::single(DOCUMENT_FIELD, Problem::Envelope { keys }).into()),
    }
}

// ---------------------------------------------------------------------------
// Shorthands
// ---------------------------------------------------------------------------

/// Loads a parameter document from raw bytes without overrides.
pub fn load_from_slice(bytes: &[u8]) -> Result<GuestConfig> {
    Loader::new().load_from_slice(bytes)
}

/// Loads a parameter document from text without overrides.
pub fn load_from_str(document: &str) -> Result<GuestConfig> {
    Loader::new().load_from_str(document)
}

/// Reads and loads a parameter file without overrides.
pub fn load_file(path: &Path) -> Result<GuestConfig> {
    Loader::new().load_file(path)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
