use anyhow::{Context, bail};
use clap::{Arg, ArgAction, ArgGroup, ArgMatches, Command, value_parser};
use std::ffi::OsString;
use std::path::PathBuf;
use std::process;
use symlink_backup::symlink::{self, Mode, OperationContext, linker};
use tracing_subscriber::{EnvFilter, fmt};

/// Long flags that are also accepted with a single leading dash (`-backup`).
const SINGLE_DASH_LONG_FLAGS: [&str; 2] = ["backup", "restore"];

fn main() {
    let matches = cli().get_matches_from(normalize_args(std::env::args_os()));

    init_logging(matches.get_count("verbose"));

    if let Err(err) = run(&matches) {
        tracing::error!("{:#}", err);
        process::exit(1);
    }
}

fn cli() -> Command {
    Command::new("symlink")
        .version(env!("CARGO_PKG_VERSION"))
        .about("backup tool for file symbolic links")
        .arg(
            Arg::new("backup")
                .long("backup")
                .help("directory (or single link) to backup all symbolic links to '*.symlink' files")
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("restore")
                .long("restore")
                .help("directory (or single file) to restore content of '*.symlink' files to symbolic links")
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .help("output directory for symbolic links/files")
                .value_name("DIRECTORY")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("directory")
                .short('d')
                .help("create missing symlink target as directory")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("log each step (repeat for more detail)")
                .action(ArgAction::Count),
        )
        .group(
            ArgGroup::new("mode")
                .args(["backup", "restore"])
                .required(true)
                .multiple(true),
        )
}

fn run(matches: &ArgMatches) -> anyhow::Result<()> {
    let path_arg = |id: &str| {
        matches
            .get_one::<PathBuf>(id)
            .filter(|path| !path.as_os_str().is_empty())
    };

    // backup wins when both are given
    let (mode, source) = match (path_arg("backup"), path_arg("restore")) {
        (Some(path), _) => (Mode::Backup, path),
        (None, Some(path)) => (Mode::Restore, path),
        (None, None) => bail!("a path is required for --backup or --restore"),
    };

    let ctx = OperationContext::new(mode, source)?
        .with_output_dir(matches.get_one::<PathBuf>("output").cloned())
        .with_create_missing_as_directory(matches.get_flag("directory"));
    tracing::debug!("{:?}", ctx);

    let linker = linker::for_current_platform();
    let action = match mode {
        Mode::Backup => "backup",
        Mode::Restore => "restore",
    };

    symlink::run(&ctx, linker.as_ref())
        .with_context(|| format!("{} of {} failed", action, ctx.source_path.display()))?;
    Ok(())
}

fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

/// Rewrites `-backup PATH` / `-restore=PATH` into their `--` spellings.
fn normalize_args(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    args.into_iter()
        .map(|arg| {
            if is_single_dash_long(&arg) {
                let mut long = OsString::from("-");
                long.push(&arg);
                long
            } else {
                arg
            }
        })
        .collect()
}

fn is_single_dash_long(arg: &OsString) -> bool {
    let Some(rest) = arg
        .to_str()
        .and_then(|s| s.strip_prefix('-'))
        .filter(|s| !s.starts_with('-'))
    else {
        return false;
    };

    SINGLE_DASH_LONG_FLAGS.iter().any(|name| {
        rest == *name
            || rest
                .strip_prefix(name)
                .is_some_and(|value| value.starts_with('='))
    })
}
