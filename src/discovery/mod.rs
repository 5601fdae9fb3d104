//! Discovery of `.proto` files that need compiling
//!
//! A file under the source root is passed to the compiler unless its
//! generated `.java` twin is newer, or its path relative to the root matches
//! one of the exclude patterns.

use glob::{MatchOptions, Pattern};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::ConfigError;

#[cfg(test)]
mod tests;

/// Extension of the interface-definition files the compiler reads
pub const SOURCE_EXTENSION: &str = ".proto";

/// Extension of the files the compiler writes next to each source
pub const GENERATED_EXTENSION: &str = ".java";

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Compiled exclude patterns
#[derive(Debug, Default)]
pub struct ExcludeSet {
    patterns: Vec<Pattern>,
}

impl ExcludeSet {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ConfigError> {
        let patterns = patterns
            .iter()
            .map(|pattern| {
                let pattern = pattern.as_ref();
                debug!("Compiling exclude pattern {}", pattern);
                Pattern::new(pattern).map_err(|e| ConfigError::InvalidExclude {
                    pattern: pattern.to_string(),
                    message: e.msg.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ExcludeSet { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// The first pattern matching `relative`, if any
    pub fn matching(&self, relative: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|pattern| pattern.matches_with(relative, MATCH_OPTIONS))
            .map(Pattern::as_str)
    }
}

/// Whether a file name carries the `.proto` extension
pub fn is_candidate(name: &str) -> bool {
    name.ends_with(SOURCE_EXTENSION)
}

/// Where the compiler writes the output for `source`
pub fn generated_output_path(source: &Path) -> Option<PathBuf> {
    let name = source.file_name()?.to_str()?;
    let stem = name.strip_suffix(SOURCE_EXTENSION)?;
    Some(source.with_file_name(format!("{}{}", stem, GENERATED_EXTENSION)))
}

/// Whether the generated output for `source` exists and is strictly newer
///
/// An unreadable timestamp counts as the epoch, so a source whose time
/// cannot be read is up to date only when its output has a real one.
pub fn is_up_to_date(source: &Path) -> bool {
    let Some(target) = generated_output_path(source) else {
        return false;
    };
    let Ok(target_meta) = target.metadata() else {
        return false;
    };

    let target_time = target_meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
    let source_time = source
        .metadata()
        .and_then(|meta| meta.modified())
        .unwrap_or(SystemTime::UNIX_EPOCH);
    target_time > source_time
}

/// Express `path` relative to `root`
///
/// Strips the root prefix and at most one leading separator. A path that
/// does not start with the root is returned unchanged.
pub fn relative_path(root: &str, path: &str) -> String {
    match path.strip_prefix(root) {
        Some(rest) => rest
            .strip_prefix(&['/', '\\'][..])
            .unwrap_or(rest)
            .to_string(),
        None => path.to_string(),
    }
}

/// Walks a source tree and appends the files to compile to an argument list
pub struct FileScanner<'a> {
    root: &'a str,
    rebuild_all: bool,
    list_files: bool,
    excludes: ExcludeSet,
}

impl<'a> FileScanner<'a> {
    pub fn new(config: &Config, root: &'a str) -> Result<Self, ConfigError> {
        Ok(FileScanner {
            root,
            rebuild_all: config.rebuild_all,
            list_files: config.verbose && config.list_files,
            excludes: ExcludeSet::new(&config.exclude_patterns())?,
        })
    }

    /// Append every file under the root that needs compiling to `names`
    ///
    /// Returns how many were appended. A root that does not exist yields
    /// zero.
    pub fn add_files(&self, names: &mut Vec<String>) -> usize {
        let root = Path::new(self.root);
        if !root.is_dir() {
            debug!("Source directory {} does not exist", self.root);
            return 0;
        }

        let mut count = 0;
        for entry in WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
        {
            if !is_candidate(&entry.file_name().to_string_lossy()) {
                continue;
            }
            let Some(path) = entry.path().to_str() else {
                debug!("Skipping {}: path is not valid UTF-8", entry.path().display());
                continue;
            };
            if let Some(relative) = self.accept(entry.path(), path) {
                names.push(relative);
                count += 1;
            }
        }
        count
    }

    /// The relative path to compile for `file`, or `None` if it is skipped
    fn accept(&self, file: &Path, path: &str) -> Option<String> {
        if !self.rebuild_all && is_up_to_date(file) {
            if self.list_files {
                info!("Ignoring {}", file.display());
            }
            return None;
        }

        let relative = relative_path(self.root, path);
        if let Some(pattern) = self.excludes.matching(&relative) {
            if self.list_files {
                info!("Excluding {}", file.display());
            }
            debug!("{} matched exclude pattern {}", relative, pattern);
            return None;
        }

        if self.list_files {
            info!("Found {}", file.display());
        }
        Some(relative)
    }
}

/// The relative paths of every file that would be compiled for `config`
pub fn discover(config: &Config) -> Result<Vec<String>, ConfigError> {
    let root = config.source_dir()?;
    let scanner = FileScanner::new(config, root)?;
    let mut files = Vec::new();
    scanner.add_files(&mut files);
    Ok(files)
}
