use clap::{App, Arg, ArgMatches};
use log::error;
use std::process;

use fudge_proto_build::config::{parse_bool, Config};
use fudge_proto_build::{assemble, ConfigError, GenerateError, Generator};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = cli().get_matches();
    if let Err(e) = run(&matches) {
        error!("{}", e);
        process::exit(e.exit_code());
    }
}

/// Boolean options as (flag, negated flag, help)
const SWITCHES: &[(&str, &str, &str)] = &[
    ("verbose", "no-verbose", "Echo progress and the full command line"),
    ("list-files", "no-list-files", "Echo every file found, ignored or excluded"),
    ("rebuild-all", "no-rebuild-all", "Compile every file regardless of timestamps"),
    ("git-ignore", "no-git-ignore", "Write a .gitignore for generated files"),
    ("equals", "no-equals", "Generate equals methods"),
    ("hash-code", "no-hash-code", "Generate hashCode methods"),
    ("to-string", "no-to-string", "Generate toString methods"),
];

fn cli() -> App<'static, 'static> {
    let app = App::new("fudge-proto-build")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Compiles stale .proto files in a source tree with the Fudge-Proto compiler")
        .arg(
            Arg::with_name("config")
                .long("config")
                .short("c")
                .value_name("FILE")
                .takes_value(true)
                .help("JSON configuration file; flags and FUDGE_PROTO_* variables override it"),
        )
        .arg(
            Arg::with_name("source-dir")
                .long("source-dir")
                .short("s")
                .value_name("DIR")
                .takes_value(true)
                .help("Directory to scan for .proto files and to generate into"),
        )
        .arg(
            Arg::with_name("excludes")
                .long("excludes")
                .value_name("PATTERNS")
                .takes_value(true)
                .help("Semicolon-separated wildcard patterns of files to skip"),
        )
        .arg(
            Arg::with_name("search-dir")
                .long("search-dir")
                .value_name("DIRS")
                .takes_value(true)
                .help("Semicolon-separated directories the compiler searches for imports"),
        )
        .arg(
            Arg::with_name("fudge-context")
                .long("fudge-context")
                .value_name("EXPR")
                .takes_value(true)
                .help("Expression used in place of a parameterized context"),
        )
        .arg(
            Arg::with_name("fields-mutable")
                .long("fields-mutable")
                .value_name("BOOL")
                .takes_value(true)
                .possible_values(&["true", "false"])
                .help("Whether fields are mutable by default"),
        )
        .arg(
            Arg::with_name("fields-required")
                .long("fields-required")
                .value_name("BOOL")
                .takes_value(true)
                .possible_values(&["true", "false"])
                .help("Whether fields are required by default"),
        )
        .arg(
            Arg::with_name("file-header")
                .long("file-header")
                .value_name("TEXT")
                .takes_value(true)
                .help("Text placed at the top of each generated file"),
        )
        .arg(
            Arg::with_name("file-footer")
                .long("file-footer")
                .value_name("TEXT")
                .takes_value(true)
                .help("Text placed at the bottom of each generated file"),
        )
        .arg(
            Arg::with_name("compiler")
                .long("compiler")
                .value_name("PROGRAM")
                .takes_value(true)
                .help("Name or path of the Fudge-Proto compiler executable"),
        )
        .arg(
            Arg::with_name("dry-run")
                .long("dry-run")
                .help("Print the compiler arguments instead of running it"),
        );

    // Each switch has a negated twin; whichever comes last on the command line wins.
    SWITCHES.iter().fold(app, |app, &(name, negated, help)| {
        app.arg(Arg::with_name(name).long(name).overrides_with(negated).help(help))
            .arg(
                Arg::with_name(negated)
                    .long(negated)
                    .overrides_with(name)
                    .help("Turn off the option above"),
            )
    })
}

/// `Some(true)` for the flag, `Some(false)` for its negation, `None` if neither is given
fn switch_value(matches: &ArgMatches, name: &str, negated: &str) -> Option<bool> {
    if matches.is_present(name) {
        Some(true)
    } else if matches.is_present(negated) {
        Some(false)
    } else {
        None
    }
}

fn run(matches: &ArgMatches) -> Result<(), GenerateError> {
    let mut config = match matches.value_of("config") {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    config.apply_env()?;
    apply_matches(&mut config, matches)?;

    if matches.is_present("dry-run") {
        let invocation = assemble(&config)?;
        for arg in &invocation.args {
            println!("{}", arg);
        }
        return Ok(());
    }

    config.validate()?;
    let generator = Generator::with_process_compiler(config)?;
    generator.execute()?;
    Ok(())
}

/// Layer command-line flags over the file and environment configuration
fn apply_matches(config: &mut Config, matches: &ArgMatches) -> Result<(), ConfigError> {
    let text = |name: &str| matches.value_of(name).map(str::to_string);

    if let Some(dir) = text("source-dir") {
        config.source_dir = Some(dir);
    }
    if let Some(excludes) = text("excludes") {
        config.excludes = Some(excludes);
    }
    if let Some(search_dir) = text("search-dir") {
        config.search_dir = Some(search_dir);
    }
    if let Some(context) = text("fudge-context") {
        config.fudge_context = Some(context);
    }
    if let Some(header) = text("file-header") {
        config.file_header = Some(header);
    }
    if let Some(footer) = text("file-footer") {
        config.file_footer = Some(footer);
    }
    if let Some(compiler) = text("compiler") {
        config.compiler = compiler;
    }

    let fields: [&mut bool; 7] = [
        &mut config.verbose,
        &mut config.list_files,
        &mut config.rebuild_all,
        &mut config.git_ignore,
        &mut config.equals,
        &mut config.hash_code,
        &mut config.to_string,
    ];
    for (&(name, negated, _), field) in SWITCHES.iter().zip(fields) {
        if let Some(value) = switch_value(matches, name, negated) {
            *field = value;
        }
    }

    if let Some(value) = matches.value_of("fields-mutable") {
        config.fields_mutable = Some(parse_bool("--fields-mutable", value)?);
    }
    if let Some(value) = matches.value_of("fields-required") {
        config.fields_required = Some(parse_bool("--fields-required", value)?);
    }

    Ok(())
}
