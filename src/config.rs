use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

lazy_static! {
    static ref LIST_SEPARATOR_RE: Regex = Regex::new(r"[;]").unwrap();
}

/// Prefix shared by every environment variable read by [`Config::apply_env`]
pub const ENV_PREFIX: &str = "FUDGE_PROTO_";

/// Default name of the Fudge-Proto compiler executable
pub const DEFAULT_COMPILER: &str = "fudge-proto";

/// Options for one run of the Fudge-Proto compiler
///
/// Built once per invocation and never mutated while the run is in
/// progress. JSON keys use the camelCase names the build plugin has always
/// accepted (`sourceDir`, `listFiles`, `hashCode`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Root to scan, and the destination/search root given to the compiler
    #[serde(default)]
    pub source_dir: Option<String>,

    /// Wildcard patterns to exclude, separated by semicolons
    #[serde(default)]
    pub excludes: Option<String>,

    /// Extra directories the compiler searches for imports, separated by semicolons
    #[serde(default)]
    pub search_dir: Option<String>,

    /// Echo progress and the full command line
    #[serde(default)]
    pub verbose: bool,

    /// Echo every file found, ignored or excluded
    #[serde(default)]
    pub list_files: bool,

    /// Compile every file regardless of timestamps
    #[serde(default)]
    pub rebuild_all: bool,

    /// Have the compiler write a .gitignore for generated files
    #[serde(default)]
    pub git_ignore: bool,

    /// Generate equals methods
    #[serde(default = "default_true")]
    pub equals: bool,

    /// Generate hashCode methods
    #[serde(default = "default_true")]
    pub hash_code: bool,

    /// Generate toString methods
    #[serde(default = "default_true")]
    pub to_string: bool,

    /// Expression used in place of a parameterized context
    #[serde(default)]
    pub fudge_context: Option<String>,

    /// Whether fields are mutable by default; unset leaves it to the compiler
    #[serde(default)]
    pub fields_mutable: Option<bool>,

    /// Whether fields are required by default; unset leaves it to the compiler
    #[serde(default)]
    pub fields_required: Option<bool>,

    /// Literal text placed at the top of each generated file
    #[serde(default)]
    pub file_header: Option<String>,

    /// Literal text placed at the bottom of each generated file
    #[serde(default)]
    pub file_footer: Option<String>,

    /// Name or path of the compiler executable
    #[serde(default = "default_compiler")]
    pub compiler: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            source_dir: None,
            excludes: None,
            search_dir: None,
            verbose: false,
            list_files: false,
            rebuild_all: false,
            git_ignore: false,
            equals: default_true(),
            hash_code: default_true(),
            to_string: default_true(),
            fudge_context: None,
            fields_mutable: None,
            fields_required: None,
            file_header: None,
            file_footer: None,
            compiler: default_compiler(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_compiler() -> String {
    DEFAULT_COMPILER.to_string()
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::ConfigFile {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&content)?;
        debug!("Loaded configuration from {}", path.display());

        Ok(config)
    }

    /// Override options from `FUDGE_PROTO_*` environment variables
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_vars(|name| env::var(name).ok())
    }

    /// Override options from a variable lookup, keyed by the full
    /// `FUDGE_PROTO_*` name
    pub fn apply_vars<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |suffix: &str| lookup(&format!("{}{}", ENV_PREFIX, suffix));

        if let Some(value) = var("SOURCE_DIR") {
            self.source_dir = Some(value);
        }
        if let Some(value) = var("EXCLUDES") {
            self.excludes = Some(value);
        }
        if let Some(value) = var("SEARCH_DIR") {
            self.search_dir = Some(value);
        }
        if let Some(value) = var("FUDGE_CONTEXT") {
            self.fudge_context = Some(value);
        }
        if let Some(value) = var("FILE_HEADER") {
            self.file_header = Some(value);
        }
        if let Some(value) = var("FILE_FOOTER") {
            self.file_footer = Some(value);
        }
        if let Some(value) = var("COMPILER") {
            self.compiler = value;
        }

        let flags: [(&str, &mut bool); 7] = [
            ("VERBOSE", &mut self.verbose),
            ("LIST_FILES", &mut self.list_files),
            ("REBUILD_ALL", &mut self.rebuild_all),
            ("GIT_IGNORE", &mut self.git_ignore),
            ("EQUALS", &mut self.equals),
            ("HASH_CODE", &mut self.hash_code),
            ("TO_STRING", &mut self.to_string),
        ];
        for (suffix, field) in flags {
            if let Some(value) = var(suffix) {
                *field = parse_bool(&format!("{}{}", ENV_PREFIX, suffix), &value)?;
            }
        }

        if let Some(value) = var("FIELDS_MUTABLE") {
            self.fields_mutable = Some(parse_bool("FUDGE_PROTO_FIELDS_MUTABLE", &value)?);
        }
        if let Some(value) = var("FIELDS_REQUIRED") {
            self.fields_required = Some(parse_bool("FUDGE_PROTO_FIELDS_REQUIRED", &value)?);
        }

        Ok(())
    }

    /// Check the one precondition on the configuration: a non-empty source directory
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.source_dir().map(|_| ())
    }

    /// The configured source directory
    pub fn source_dir(&self) -> Result<&str, ConfigError> {
        match self.source_dir.as_deref() {
            Some(dir) if !dir.is_empty() => Ok(dir),
            _ => Err(ConfigError::MissingSourceDir),
        }
    }

    /// The exclude patterns, in configured order
    pub fn exclude_patterns(&self) -> Vec<&str> {
        self.excludes.as_deref().map(split_list).unwrap_or_default()
    }

    /// The raw search directory entries, in configured order
    pub fn search_dirs(&self) -> Vec<&str> {
        self.search_dir.as_deref().map(split_list).unwrap_or_default()
    }
}

/// Split a semicolon-separated option into its trimmed, non-empty entries
pub fn split_list(value: &str) -> Vec<&str> {
    LIST_SEPARATOR_RE
        .split(value)
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .collect()
}

/// Parse a boolean option value, accepting `true`/`false` in any case
pub fn parse_bool(option: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            option: option.to_string(),
            value: value.to_string(),
        }),
    }
}
