//! Error types for the Fudge-Proto build driver
//!
//! Failures fall into two categories that a calling build system treats
//! differently: configuration errors (the invocation could not even be set
//! up) and build failures (the compiler ran, or tried to, and failed).

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while gathering and checking configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No source directory was configured
    #[error("Source directory must not be null")]
    MissingSourceDir,

    /// The schema compiler executable could not be located
    #[error("Schema compiler not found: {0}")]
    CompilerUnavailable(String),

    /// The schema compiler reported that its environment is unusable
    #[error("Invalid schema compiler environment: {0}")]
    InvalidEnvironment(String),

    /// A search directory does not exist after resolution
    #[error("Unable to find search directory: {0}")]
    MissingSearchDir(String),

    /// A search directory could not be canonicalized
    #[error("Unable to resolve search directory: {entry}")]
    UnresolvableSearchDir {
        entry: String,
        #[source]
        source: io::Error,
    },

    /// An exclude pattern is not a valid wildcard pattern
    #[error("Invalid exclude pattern '{pattern}': {message}")]
    InvalidExclude { pattern: String, message: String },

    /// An option carried a value of the wrong shape
    #[error("Invalid value '{value}' for {option}")]
    InvalidValue { option: String, value: String },

    /// The configuration file could not be read
    #[error("Unable to read configuration file {}", path.display())]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The configuration file is not valid JSON for [`crate::Config`]
    #[error("Malformed configuration file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors raised when the generation step itself fails
#[derive(Debug, Error)]
pub enum BuildFailure {
    /// The compiler ran and returned a non-zero status
    #[error("Compilation failed (status {status})")]
    CompilationFailed { status: i32 },

    /// The compiler could not be run to completion
    #[error("Error while running Fudge-Proto generator: {0}")]
    Compiler(String),
}

/// Errors raised by a [`crate::compiler::SchemaCompiler`] implementation
#[derive(Debug, Error)]
pub enum CompilerError {
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{0} was terminated by a signal")]
    Terminated(String),
}

/// Top-level error returned by [`crate::Generator::execute`]
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    #[error(transparent)]
    Failure(#[from] BuildFailure),
}

impl GenerateError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, GenerateError::Configuration(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, GenerateError::Failure(_))
    }

    /// Process exit code for the command-line driver
    pub fn exit_code(&self) -> i32 {
        match self {
            GenerateError::Configuration(_) => 2,
            GenerateError::Failure(_) => 1,
        }
    }
}
