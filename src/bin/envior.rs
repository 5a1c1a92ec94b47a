use std::env;
use std::path::PathBuf;
use std::process;

use envior::{EnvironmentStore, StoreSettings};

const HELP: &str = "\
envior - manage grouped environment files and their cache

Usage:
  envior cache update [OPTIONS]
  envior cache delete [OPTIONS]
  envior --help
  envior --version

Commands:
  cache update    Re-parse the environment file and refresh the cache
  cache delete    Delete the environment cache entry if present
";

const CACHE_HELP: &str = "\
envior cache - refresh or delete the parsed-environment cache

Usage:
  envior cache update [OPTIONS]
  envior cache delete [OPTIONS]

Options:
  -d, --dir <DIR>          Directory containing the environment file.
                           Defaults to the current directory.
  -f, --file <NAME>        Environment file name. Defaults to .env.
  -c, --cache-dir <DIR>    Cache root directory. Defaults to <DIR>/cache.
  -h, --help               Show this help text.
";

#[derive(Debug, Clone, PartialEq, Eq)]
enum CacheCommand {
    Help,
    Update(CacheOptions),
    Delete(CacheOptions),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CacheOptions {
    directory: PathBuf,
    filename: Option<String>,
    cache_dir: Option<PathBuf>,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            filename: None,
            cache_dir: None,
        }
    }
}

fn main() {
    process::exit(run(env::args().skip(1).collect()));
}

fn run(args: Vec<String>) -> i32 {
    let Some(subcommand) = args.first() else {
        print_help();
        return 0;
    };

    match subcommand.as_str() {
        "-h" | "--help" | "help" => {
            print_help();
            0
        }
        "-V" | "--version" | "version" => {
            print_version();
            0
        }
        "cache" => match parse_cache_command(&args[1..]) {
            Ok(CacheCommand::Help) => {
                print_cache_help();
                0
            }
            Ok(CacheCommand::Update(options)) => execute_update(options),
            Ok(CacheCommand::Delete(options)) => execute_delete(options),
            Err(err) => {
                eprintln!("envior: {err}");
                eprintln!("Try `envior cache --help`.");
                1
            }
        },
        unknown => {
            eprintln!("envior: unknown subcommand `{unknown}`");
            eprintln!("Try `envior --help`.");
            1
        }
    }
}

fn parse_cache_command(args: &[String]) -> Result<CacheCommand, String> {
    let Some(action) = args.first() else {
        return Err("missing cache action: expected `update` or `delete`".to_owned());
    };

    let rest = &args[1..];
    match action.as_str() {
        "-h" | "--help" => Ok(CacheCommand::Help),
        "update" => parse_cache_options(rest, CacheCommand::Update),
        "delete" => parse_cache_options(rest, CacheCommand::Delete),
        unknown => Err(format!(
            "unknown cache action `{unknown}`: expected `update` or `delete`"
        )),
    }
}

fn parse_cache_options(
    args: &[String],
    wrap: fn(CacheOptions) -> CacheCommand,
) -> Result<CacheCommand, String> {
    let mut options = CacheOptions::default();
    let mut index = 0usize;

    while index < args.len() {
        match args[index].as_str() {
            "-h" | "--help" => return Ok(CacheCommand::Help),
            "-d" | "--dir" => {
                let value = option_value(args, &mut index, "-d/--dir")?;
                options.directory = PathBuf::from(value);
            }
            "-f" | "--file" => {
                let value = option_value(args, &mut index, "-f/--file")?;
                options.filename = Some(value.to_owned());
            }
            "-c" | "--cache-dir" => {
                let value = option_value(args, &mut index, "-c/--cache-dir")?;
                options.cache_dir = Some(PathBuf::from(value));
            }
            unknown => return Err(format!("unknown option `{unknown}`")),
        }
    }

    Ok(wrap(options))
}

fn option_value<'a>(
    args: &'a [String],
    index: &mut usize,
    flag: &str,
) -> Result<&'a str, String> {
    *index += 1;
    let Some(value) = args.get(*index) else {
        return Err(format!("missing value for `{flag}`"));
    };
    *index += 1;
    Ok(value)
}

fn settings_from(options: &CacheOptions) -> StoreSettings {
    let mut settings = StoreSettings::new(&options.directory).use_cache(true);
    if let Some(filename) = &options.filename {
        settings = settings.filename(filename.clone());
    }
    if let Some(cache_dir) = &options.cache_dir {
        settings = settings.cache_dir(cache_dir);
    }
    settings
}

fn execute_update(options: CacheOptions) -> i32 {
    let result =
        EnvironmentStore::open(settings_from(&options)).and_then(|store| store.update_cache());
    match result {
        Ok(()) => {
            println!("Environment cache updated");
            0
        }
        Err(err) => {
            eprintln!("envior: {err}");
            1
        }
    }
}

fn execute_delete(options: CacheOptions) -> i32 {
    let result =
        EnvironmentStore::open(settings_from(&options)).and_then(|store| store.delete_cache());
    match result {
        Ok(true) => {
            println!("Environment cache deleted");
            0
        }
        Ok(false) => {
            println!("Environment cache not deleted: no cache entry exists");
            0
        }
        Err(err) => {
            eprintln!("envior: {err}");
            1
        }
    }
}

fn print_help() {
    println!("{HELP}");
}

fn print_cache_help() {
    println!("{CACHE_HELP}");
}

fn print_version() {
    println!("envior {}", env!("CARGO_PKG_VERSION"));
}
