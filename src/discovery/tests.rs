use super::*;
use std::fs::{self, File};
use std::time::{Duration, SystemTime};
use tempfile::{tempdir, TempDir};

/// Write `path` with a modification time `age_secs` in the past
fn write_aged(path: &Path, age_secs: u64) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, "message Empty {}\n").unwrap();
    let file = File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::now() - Duration::from_secs(age_secs))
        .unwrap();
}

fn config_for(dir: &TempDir) -> Config {
    Config {
        source_dir: Some(dir.path().to_string_lossy().into_owned()),
        ..Config::default()
    }
}

fn sorted(mut files: Vec<String>) -> Vec<String> {
    files.sort();
    files
}

#[test]
fn test_relative_path_strips_root_and_one_separator() {
    assert_eq!(relative_path("src", "src/a.proto"), "a.proto");
    assert_eq!(relative_path("src/", "src/a.proto"), "a.proto");
    assert_eq!(relative_path("src", "src\\pkg\\a.proto"), "pkg\\a.proto");
    assert_eq!(relative_path("/work/src", "/work/src/pkg/a.proto"), "pkg/a.proto");
    assert_eq!(relative_path("/work/src", "/elsewhere/a.proto"), "/elsewhere/a.proto");
}

#[test]
fn test_candidate_and_output_names() {
    assert!(is_candidate("a.proto"));
    assert!(!is_candidate("a.proto.bak"));
    assert!(!is_candidate("a.java"));

    assert_eq!(
        generated_output_path(Path::new("pkg/Trade.proto")),
        Some(PathBuf::from("pkg/Trade.java"))
    );
    assert_eq!(generated_output_path(Path::new("pkg/Trade.txt")), None);
}

#[test]
fn test_up_to_date_requires_strictly_newer_output() {
    let temp_dir = tempdir().unwrap();
    let source = temp_dir.path().join("a.proto");
    let output = temp_dir.path().join("a.java");

    write_aged(&source, 100);
    assert!(!is_up_to_date(&source), "missing output is stale");

    write_aged(&output, 200);
    assert!(!is_up_to_date(&source), "older output is stale");

    write_aged(&output, 10);
    assert!(is_up_to_date(&source));

    let same = SystemTime::now() - Duration::from_secs(50);
    File::options().write(true).open(&source).unwrap().set_modified(same).unwrap();
    File::options().write(true).open(&output).unwrap().set_modified(same).unwrap();
    assert!(!is_up_to_date(&source), "equal timestamps are stale");
}

#[test]
fn test_exclude_patterns() {
    let excludes = ExcludeSet::new(&["sub/*", "**/internal/*.proto", "?.proto"]).unwrap();
    assert!(!excludes.is_empty());

    assert_eq!(excludes.matching("sub/c.proto"), Some("sub/*"));
    assert_eq!(excludes.matching("sub/deep/c.proto"), None);
    assert_eq!(
        excludes.matching("a/b/internal/x.proto"),
        Some("**/internal/*.proto")
    );
    assert_eq!(excludes.matching("a.proto"), Some("?.proto"));
    assert_eq!(excludes.matching("ab.proto"), None);

    assert!(ExcludeSet::new::<&str>(&[]).unwrap().is_empty());
}

#[test]
fn test_invalid_exclude_pattern_is_a_config_error() {
    match ExcludeSet::new(&["[abc"]) {
        Err(ConfigError::InvalidExclude { pattern, .. }) => assert_eq!(pattern, "[abc"),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_stale_fresh_and_excluded_files() {
    let temp_dir = tempdir().unwrap();
    let root = temp_dir.path();
    write_aged(&root.join("a.proto"), 100);
    write_aged(&root.join("b.proto"), 100);
    write_aged(&root.join("b.java"), 10);
    write_aged(&root.join("sub").join("c.proto"), 100);

    let config = Config {
        excludes: Some("sub/*".to_string()),
        ..config_for(&temp_dir)
    };
    let source_dir = config.source_dir().unwrap();
    let scanner = FileScanner::new(&config, source_dir).unwrap();

    let mut names = vec!["-dexisting".to_string()];
    let count = scanner.add_files(&mut names);

    assert_eq!(count, 1);
    assert_eq!(names, vec!["-dexisting", "a.proto"]);
}

#[test]
fn test_rebuild_all_ignores_timestamps() {
    let temp_dir = tempdir().unwrap();
    let root = temp_dir.path();
    write_aged(&root.join("a.proto"), 100);
    write_aged(&root.join("b.proto"), 100);
    write_aged(&root.join("b.java"), 10);

    let config = Config {
        rebuild_all: true,
        ..config_for(&temp_dir)
    };
    assert_eq!(sorted(discover(&config).unwrap()), vec!["a.proto", "b.proto"]);
}

#[test]
fn test_exclusion_applies_to_stale_files() {
    let temp_dir = tempdir().unwrap();
    let root = temp_dir.path();
    write_aged(&root.join("gen").join("old.proto"), 10);
    write_aged(&root.join("gen").join("old.java"), 100);
    write_aged(&root.join("keep.proto"), 10);

    let config = Config {
        excludes: Some("gen/*.proto".to_string()),
        rebuild_all: true,
        ..config_for(&temp_dir)
    };
    assert_eq!(discover(&config).unwrap(), vec!["keep.proto"]);
}

#[test]
fn test_nested_files_and_other_extensions() {
    let temp_dir = tempdir().unwrap();
    let root = temp_dir.path();
    write_aged(&root.join("com").join("example").join("Trade.proto"), 100);
    write_aged(&root.join("com").join("example").join("Notes.txt"), 100);
    write_aged(&root.join("com").join("example").join("Legacy.proto.bak"), 100);
    write_aged(&root.join("Top.proto"), 100);

    let files = sorted(discover(&config_for(&temp_dir)).unwrap());
    assert_eq!(files, vec!["Top.proto", "com/example/Trade.proto"]);
    assert!(files.iter().all(|f| !f.starts_with('/')));
}

#[test]
fn test_missing_root_yields_nothing() {
    let temp_dir = tempdir().unwrap();
    let missing = temp_dir.path().join("does-not-exist");
    let config = Config {
        source_dir: Some(missing.to_string_lossy().into_owned()),
        ..Config::default()
    };
    let source_dir = config.source_dir().unwrap();
    let scanner = FileScanner::new(&config, source_dir).unwrap();

    let mut names = Vec::new();
    assert_eq!(scanner.add_files(&mut names), 0);
    assert!(names.is_empty());
}

#[test]
fn test_discover_requires_source_dir() {
    assert!(matches!(
        discover(&Config::default()),
        Err(ConfigError::MissingSourceDir)
    ));
}

#[cfg(target_os = "linux")]
#[test]
fn test_non_utf8_names_are_skipped() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let temp_dir = tempdir().unwrap();
    let root = temp_dir.path();
    write_aged(&root.join("good.proto"), 100);
    write_aged(&root.join(OsStr::from_bytes(b"bad\xff.proto")), 100);
    write_aged(&root.join(OsStr::from_bytes(b"dir\xfe")).join("nested.proto"), 100);

    let files = discover(&config_for(&temp_dir)).unwrap();
    assert_eq!(files, vec!["good.proto"]);
    assert!(files.iter().all(|f| !f.contains('\u{FFFD}')));
}
