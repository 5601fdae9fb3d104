//! Command-line assembly for the Fudge-Proto compiler
//!
//! The compiler reads its options positionally and by flag, so the order in
//! which [`global_args`] pushes them is part of the contract. Source files
//! are appended afterwards by [`crate::discovery`].

use lazy_static::lazy_static;
use log::{debug, info};
use regex::Regex;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::ConfigError;


/// The only output language the build driver asks for
pub const TARGET_LANGUAGE: &str = "Java";

lazy_static! {
    // The literal marker followed by either kind of slash; nothing looser.
    static ref RELATIVE_MARKER_RE: Regex = Regex::new(r"^\.\.\{RELATIVE\}\.\.[/\\]").unwrap();
}

/// How much the compiler should print about its own progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    None,
    Low,
    ListOnly,
    Full,
}

impl Verbosity {
    pub fn from_flags(verbose: bool, list_files: bool) -> Self {
        match (verbose, list_files) {
            (true, true) => Verbosity::Full,
            (true, false) => Verbosity::Low,
            (false, true) => Verbosity::ListOnly,
            (false, false) => Verbosity::None,
        }
    }

    /// The compiler flag for this level, if any
    pub fn flag(self) -> Option<&'static str> {
        match self {
            Verbosity::None => None,
            Verbosity::Low => Some("-v"),
            Verbosity::ListOnly => Some("-vv"),
            Verbosity::Full => Some("-vvv"),
        }
    }
}

/// Build the global part of the argument list, before any source files
pub fn global_args(config: &Config, source_dir: &str) -> Result<Vec<String>, ConfigError> {
    let mut args = Vec::with_capacity(16);
    args.push(format!("-d{}", source_dir));
    args.push(format!("-s{}", source_dir));
    args.push(format!("-l{}", TARGET_LANGUAGE));

    if let Some(mutable) = config.fields_mutable {
        args.push(if mutable { "-fmutable" } else { "-freadonly" }.to_string());
    }
    if let Some(required) = config.fields_required {
        args.push(if required { "-frequired" } else { "-foptional" }.to_string());
    }

    for entry in config.search_dirs() {
        if let Some(resolved) = resolve_search_dir(entry, source_dir)? {
            if config.verbose {
                info!("Searching {}", resolved);
            }
            args.push(format!("-p{}", resolved));
        }
    }

    if config.equals {
        args.push("-Xequals".to_string());
    }
    if config.to_string {
        args.push("-XtoString".to_string());
    }
    if config.hash_code {
        args.push("-XhashCode".to_string());
    }
    if let Some(context) = &config.fudge_context {
        args.push(format!("-XfudgeContext={}", context));
    }
    if config.git_ignore {
        args.push("-XgitIgnore".to_string());
    }
    if let Some(header) = &config.file_header {
        args.push(format!("-XfileHeader={}", header));
    }
    if let Some(footer) = &config.file_footer {
        args.push(format!("-XfileFooter={}", footer));
    }

    if let Some(flag) = Verbosity::from_flags(config.verbose, config.list_files).flag() {
        args.push(flag.to_string());
    }

    Ok(args)
}

/// Resolve one configured search directory
///
/// Returns `Ok(None)` when the entry names the source root itself, since the
/// compiler already searches there.
pub fn resolve_search_dir(entry: &str, source_dir: &str) -> Result<Option<String>, ConfigError> {
    let resolved = match strip_relative_marker(entry) {
        Some(relative) => find_in_ancestors(source_dir, relative)
            .map(|found| found.to_string_lossy().into_owned())
            .unwrap_or_else(|| relative.to_string()),
        None => entry.to_string(),
    };

    let resolved_path = Path::new(&resolved);
    let unresolvable = |source| ConfigError::UnresolvableSearchDir {
        entry: entry.to_string(),
        source,
    };
    let canonical = canonical_path(resolved_path).map_err(unresolvable)?;
    let root = canonical_path(Path::new(source_dir)).map_err(unresolvable)?;
    if canonical == root {
        debug!("Skipping search directory {}: same as source directory", entry);
        return Ok(None);
    }

    if !resolved_path.exists() {
        return Err(ConfigError::MissingSearchDir(entry.to_string()));
    }

    Ok(Some(resolved))
}

/// Canonical form of `path`, or its absolute form if it does not exist yet
fn canonical_path(path: &Path) -> io::Result<PathBuf> {
    match fs::canonicalize(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            if path.is_absolute() {
                Ok(path.to_path_buf())
            } else {
                Ok(env::current_dir()?.join(path))
            }
        }
        result => result,
    }
}

/// The path following the relative-escape marker, if the entry starts with one
pub fn strip_relative_marker(entry: &str) -> Option<&str> {
    RELATIVE_MARKER_RE.find(entry).map(|m| &entry[m.end()..])
}

/// Walk up from the parent of `source_dir` looking for `relative`
fn find_in_ancestors(source_dir: &str, relative: &str) -> Option<PathBuf> {
    let mut base = Path::new(source_dir).parent();
    while let Some(dir) = base {
        if dir.as_os_str().is_empty() {
            break;
        }
        let candidate = dir.join(relative);
        debug!("Looking for {}", candidate.display());
        if candidate.exists() {
            return Some(candidate);
        }
        base = dir.parent();
    }
    None
}
