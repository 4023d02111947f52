//! Converter declarations and traits.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How a converter is invoked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reference {
    /// Implemented in-process (the string names the backing codec pair).
    Builtin(String),
    /// An external program called as `<program> <input> <output>`.
    External(PathBuf),
}

impl std::fmt::Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reference::Builtin(name) => write!(f, "builtin:{}", name),
            Reference::External(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Declaration of a converter's interface.
///
/// Every converter is a single edge of the format graph: it reads a file
/// in `from` format and writes a file in `to` format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverterDecl {
    /// Unique identifier for this converter.
    pub id: String,
    /// Source format tag.
    pub from: String,
    /// Destination format tag.
    pub to: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// How the converter is invoked.
    pub reference: Reference,
    /// The destination format is a storage-only target.
    ///
    /// Sink edges may only be the last hop of a pipeline, and their
    /// "output path" is a configuration document read by the storage
    /// adapter rather than a data file.
    #[serde(default)]
    pub sink: bool,
}

impl ConverterDecl {
    /// Create a new converter declaration for a `from -> to` edge.
    pub fn new(id: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            reference: Reference::Builtin(id.clone()),
            id,
            from: from.into(),
            to: to.into(),
            description: String::new(),
            sink: false,
        }
    }

    /// Set the description.
    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Set the invocation reference.
    pub fn reference(mut self, reference: Reference) -> Self {
        self.reference = reference;
        self
    }

    /// Mark the destination format as a storage sink.
    pub fn sink(mut self) -> Self {
        self.sink = true;
        self
    }

    /// Check if this converter handles exactly `from -> to`.
    pub fn connects(&self, from: &str, to: &str) -> bool {
        self.from == from && self.to == to
    }

    /// Check if this converter runs an external program.
    pub fn is_external(&self) -> bool {
        matches!(self.reference, Reference::External(_))
    }
}

/// Trait for implementing converters.
///
/// A converter is opaque to the router: it takes two filesystem paths and
/// either succeeds or fails. Built-in codecs and external programs are
/// used through the same interface.
pub trait Converter: Send + Sync {
    /// Get the declaration for this converter.
    fn decl(&self) -> &ConverterDecl;

    /// Read `input` and write the converted result to `output`.
    fn run(&self, input: &Path, output: &Path) -> Result<(), ConvertError>;

    /// Run the converter and report the outcome as a process exit code.
    ///
    /// `0` means success; any other value is a failure and carries no
    /// further meaning.
    fn invoke(&self, input: &Path, output: &Path) -> i32 {
        match self.run(input, output) {
            Ok(()) => 0,
            Err(ConvertError::ExitStatus { code: Some(code), .. }) if code != 0 => code,
            Err(e) => {
                tracing::debug!(converter = %self.decl().id, error = %e, "converter failed");
                1
            }
        }
    }
}

/// Errors that can occur during a single conversion.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("conversion failed: {0}")]
    Failed(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("{program} exited with {}", exit_description(.code))]
    ExitStatus { program: String, code: Option<i32> },

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("converter not found or not executable: {0}")]
    NotExecutable(String),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl ConvertError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::Io {
            path: path.into(),
            source,
        }
    }
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}
