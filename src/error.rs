use crate::kind::Kind;
use colored::Colorize;
use std::{fmt, path::PathBuf};
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Why a raw string could not be written into a value.
///
/// These carry no field path; the caller that knows which field was being
/// written wraps them in [`Error::Field`].
#[derive(Debug, Error)]
pub enum CoerceError {
    /// Malformed literal for the destination kind
    #[error("cannot parse \"{input}\" as {kind}: {source}")]
    Parse {
        kind: Kind,
        input: String,
        #[source]
        source: BoxError,
    },

    /// Numeric literal that does not fit the destination width
    #[error("\"{input}\" is out of range for {kind}")]
    Overflow { kind: Kind, input: String },

    /// A sequence element failed; the whole sequence is rejected
    #[error("index {index}: {source}")]
    Element {
        index: usize,
        #[source]
        source: Box<CoerceError>,
    },

    /// The destination has no rule for being written from a string
    #[error("type {kind} cannot be set from a string")]
    Unsupported { kind: Kind },

    /// Structured input (list or table) given to a destination that cannot hold it
    #[error("cannot assign a {found} to {kind}")]
    Shape { kind: Kind, found: &'static str },
}

impl CoerceError {
    pub fn is_parse_error(&self) -> bool {
        match self {
            CoerceError::Parse { .. } | CoerceError::Overflow { .. } => true,
            CoerceError::Element { source, .. } => source.is_parse_error(),
            CoerceError::Unsupported { .. } | CoerceError::Shape { .. } => false,
        }
    }

    /// Index of the failing element for sequence destinations
    pub fn element_index(&self) -> Option<usize> {
        match self {
            CoerceError::Element { index, .. } => Some(*index),
            _ => None,
        }
    }
}

/// Errors that can occur while loading or validating a record
#[derive(Debug, Error)]
pub enum Error {
    /// A value could not be written into the named field
    #[error("field '{path}': {source}")]
    Field {
        path: String,
        #[source]
        source: CoerceError,
    },

    #[error("unknown field '{0}'")]
    UnknownField(String),

    /// Two leaves map to the same generated env or flag name
    #[error("name '{name}' is generated for both '{first}' and '{second}'")]
    NameCollision {
        name: String,
        first: String,
        second: String,
    },

    #[error(transparent)]
    Required(#[from] RequiredError),

    #[error("config path is not set")]
    PathNotSet,

    #[error("config file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("cannot tell the format of config file {}", .0.display())]
    UnknownFormat(PathBuf),

    #[error("config file {} must hold a table at the top level", .0.display())]
    NotATable(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        source: serde_yaml_ng::Error,
    },

    #[error(transparent)]
    Flag(#[from] clap::Error),

    #[error("failed to read dotenv file: {0}")]
    Dotenv(#[from] dotenvy::Error),
}

impl Error {
    pub(crate) fn field(path: impl Into<String>, source: CoerceError) -> Self {
        Error::Field {
            path: path.into(),
            source,
        }
    }

    /// Dotted path of the field a coercion error refers to
    pub fn field_path(&self) -> Option<&str> {
        match self {
            Error::Field { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Malformed literal (including overflow) rather than a schema problem
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Error::Field { source, .. } if source.is_parse_error())
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            Error::Field {
                source: CoerceError::Unsupported { .. },
                ..
            }
        )
    }
}

/// Every required field found zero-valued during one validation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredError {
    pub fields: Vec<String>,
}

impl RequiredError {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    pub fn messages(&self) -> impl Iterator<Item = String> + '_ {
        self.fields
            .iter()
            .map(|path| format!("field '{path}' is required"))
    }
}

impl fmt::Display for RequiredError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.fields.len() {
            1 => write!(f, "1 error occurred:")?,
            n => write!(f, "{n} errors occurred:")?,
        }
        for message in self.messages() {
            write!(f, "\n\t* {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for RequiredError {}

/// Format a load error into a report suitable for a terminal
pub fn format_errors(error: &Error) -> String {
    match error {
        Error::Required(required) => {
            let summary = required
                .fields
                .iter()
                .map(|path| format!("  - {}: is required", path.magenta().bold()))
                .collect::<Vec<_>>()
                .join("\n");
            format!(
                "Configuration failed with {} error(s):\n{}",
                required.fields.len().to_string().yellow().bold(),
                summary
            )
        }
        Error::Field { path, source } => format!(
            "Configuration failed with {} error(s):\n  - {}: {}",
            "1".yellow().bold(),
            path.magenta().bold(),
            source.to_string().red()
        ),
        other => format!(
            "Configuration failed with {} error(s):\n  - {}",
            "1".yellow().bold(),
            other
        ),
    }
}
