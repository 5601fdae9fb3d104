//! Runs the Fudge-Proto compiler over a source tree
//!
//! One [`Generator::execute`] call checks the configuration, checks the
//! compiler environment, assembles the argument list (global flags followed
//! by every file needing compilation) and invokes the compiler exactly once.

use log::{debug, info};

use crate::args::global_args;
use crate::compiler::{ProcessCompiler, SchemaCompiler};
use crate::config::Config;
use crate::discovery::FileScanner;
use crate::error::{BuildFailure, ConfigError, GenerateError};

/// The argument list for one compiler run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Global flags followed by the files to compile
    pub args: Vec<String>,
    /// How many trailing entries of `args` are files
    pub file_count: usize,
}

impl Invocation {
    /// The files to compile, relative to the source directory
    pub fn files(&self) -> &[String] {
        &self.args[self.args.len() - self.file_count..]
    }

    /// The arguments joined the way they are echoed in verbose mode
    pub fn command_line(&self) -> String {
        self.args.join(" ")
    }
}

/// Build the argument list for `config`: global flags, then every file
/// needing compilation
pub fn assemble(config: &Config) -> Result<Invocation, ConfigError> {
    let source_dir = config.source_dir()?;
    let mut args = global_args(config, source_dir)?;
    let scanner = FileScanner::new(config, source_dir)?;
    let file_count = scanner.add_files(&mut args);
    debug!("{} files need compiling", file_count);

    Ok(Invocation { args, file_count })
}

/// Drives one compiler run for a configuration
pub struct Generator<C> {
    config: Config,
    compiler: C,
}

impl Generator<ProcessCompiler> {
    /// Use the compiler executable named by `config.compiler`
    pub fn with_process_compiler(config: Config) -> Result<Self, ConfigError> {
        let compiler = ProcessCompiler::locate(&config.compiler)
            .ok_or_else(|| ConfigError::CompilerUnavailable(config.compiler.clone()))?;
        Ok(Generator::new(config, compiler))
    }
}

impl<C: SchemaCompiler> Generator<C> {
    pub fn new(config: Config, compiler: C) -> Self {
        Generator { config, compiler }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn compiler(&self) -> &C {
        &self.compiler
    }

    /// Build the argument list without running the compiler
    pub fn assemble(&self) -> Result<Invocation, ConfigError> {
        assemble(&self.config)
    }

    /// Run the compiler and return how many files it was given
    pub fn execute(&self) -> Result<usize, GenerateError> {
        let source_dir = self.config.source_dir()?;
        if !self.compiler.check_environment() {
            return Err(ConfigError::InvalidEnvironment(self.config.compiler.clone()).into());
        }

        let invocation = self.assemble()?;
        if self.config.verbose {
            info!("Commandline: {}", invocation.command_line());
        }

        info!("Fudge-Proto generator started, directory: {}", source_dir);
        let status = self
            .compiler
            .compile(&invocation.args)
            .map_err(|e| BuildFailure::Compiler(e.to_string()))?;
        if status != 0 {
            return Err(BuildFailure::CompilationFailed { status }.into());
        }
        info!("Fudge-Proto generator completed");

        Ok(invocation.file_count)
    }
}
