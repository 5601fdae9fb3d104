//! The external Fudge-Proto compiler
//!
//! The build driver never parses schemas itself. Everything past argument
//! assembly is delegated to a [`SchemaCompiler`], which in production is the
//! `fudge-proto` executable run as a child process.

use log::debug;
use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::CompilerError;

/// A schema compiler the build driver can hand an argument list to
pub trait SchemaCompiler {
    /// Whether the compiler can run in the current environment
    fn check_environment(&self) -> bool;

    /// Run one compilation and return its status, zero meaning success
    fn compile(&self, args: &[String]) -> Result<i32, CompilerError>;
}

/// Runs the compiler executable as a child process
#[derive(Debug, Clone)]
pub struct ProcessCompiler {
    program: PathBuf,
}

impl ProcessCompiler {
    /// Locate `program`, either as a path or by searching `PATH`
    ///
    /// Returns `None` when no such executable exists.
    pub fn locate(program: &str) -> Option<Self> {
        let candidate = Path::new(program);
        if candidate.components().count() > 1 || candidate.is_absolute() {
            return candidate.is_file().then(|| ProcessCompiler::new(candidate));
        }

        let paths = env::var_os("PATH")?;
        env::split_paths(&paths)
            .flat_map(|dir| {
                let plain = dir.join(program);
                let suffixed = dir.join(format!("{}{}", program, env::consts::EXE_SUFFIX));
                [plain, suffixed]
            })
            .find(|path| path.is_file())
            .map(|path| {
                debug!("Found schema compiler at {}", path.display());
                ProcessCompiler::new(path)
            })
    }

    /// Use the executable at `program` without searching for it
    pub fn new<P: AsRef<Path>>(program: P) -> Self {
        ProcessCompiler {
            program: program.as_ref().to_path_buf(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl SchemaCompiler for ProcessCompiler {
    fn check_environment(&self) -> bool {
        self.program.is_file()
    }

    fn compile(&self, args: &[String]) -> Result<i32, CompilerError> {
        let program = self.program.display().to_string();
        debug!("Running {} with {} arguments", program, args.len());

        let status = Command::new(&self.program)
            .args(args)
            .status()
            .map_err(|source| CompilerError::Spawn {
                program: program.clone(),
                source,
            })?;

        status.code().ok_or(CompilerError::Terminated(program))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_locate_missing_program() {
        assert!(ProcessCompiler::locate("fudge-proto-definitely-not-installed-9c1e").is_none());

        let temp_dir = tempdir().unwrap();
        let missing = temp_dir.path().join("fudge-proto");
        assert!(ProcessCompiler::locate(&missing.to_string_lossy()).is_none());
    }

    #[test]
    fn test_locate_explicit_path() {
        let temp_dir = tempdir().unwrap();
        let program = temp_dir.path().join("fudge-proto");
        std::fs::write(&program, "").unwrap();

        let compiler = ProcessCompiler::locate(&program.to_string_lossy()).unwrap();
        assert_eq!(compiler.program(), program.as_path());
        assert!(compiler.check_environment());

        std::fs::remove_file(&program).unwrap();
        assert!(!compiler.check_environment());
    }

    #[test]
    fn test_spawn_failure_is_an_error() {
        let temp_dir = tempdir().unwrap();
        let compiler = ProcessCompiler::new(temp_dir.path().join("absent"));
        let result = compiler.compile(&["-lJava".to_string()]);
        assert!(matches!(result, Err(CompilerError::Spawn { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_status_is_returned() {
        let compiler = ProcessCompiler::locate("sh").expect("sh on PATH");
        let status = compiler
            .compile(&["-c".to_string(), "exit 3".to_string()])
            .unwrap();
        assert_eq!(status, 3);
    }
}
