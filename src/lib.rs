//! Fudge-Proto build driver
//!
//! This library finds the `.proto` files under a source directory that need
//! (re)compiling and hands them to the external Fudge-Proto compiler,
//! together with the flags derived from a [`Config`]. It does no schema
//! parsing or code generation of its own.
//!
//! ```no_run
//! use fudge_proto_build::{run, Config};
//!
//! let config = Config {
//!     source_dir: Some("src/main/java".to_string()),
//!     excludes: Some("**/internal/*.proto".to_string()),
//!     ..Config::default()
//! };
//! let compiled = run(config)?;
//! println!("compiled {} files", compiled);
//! # Ok::<(), fudge_proto_build::GenerateError>(())
//! ```

pub mod args;
pub mod compiler;
pub mod config;
pub mod discovery;
pub mod error;
pub mod generator;

pub use compiler::{ProcessCompiler, SchemaCompiler};
pub use config::Config;
pub use error::{BuildFailure, CompilerError, ConfigError, GenerateError};
pub use generator::{assemble, Generator, Invocation};

/// Run the compiler executable named in `config` over its source directory
///
/// Returns the number of files passed to the compiler.
pub fn run(config: Config) -> Result<usize, GenerateError> {
    config.validate()?;
    Generator::with_process_compiler(config)?.execute()
}
