use std::io;
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::Parser;
use crossterm::style::Stylize;
use crossterm::tty::IsTty;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use mish::cli::{seed_environment, Cli, Invocation};
use mish::config::{self, Config};
use mish::dispatch::WriterDispatcher;
use mish::library::{resolve_scripts_dir, Library};
use mish::runner::{Mode, RunReport, Runner};
use mish::var::Environment;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(report) if report.is_clean() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            report_error(&format!("mish: {e:#}"));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<RunReport> {
    let config = load_config(&cli)?;

    let dir = resolve_scripts_dir(cli.scripts_dir.as_deref(), config.scripts_dir.as_deref());
    let library = Library::new(dir, config.extension.clone());

    if cli.list {
        for name in library.list()? {
            println!("{name}");
        }
        return Ok(RunReport::default());
    }

    let invocation = Invocation::from_args(&cli.args)?;
    let raw = cli.raw || invocation.raw;

    let mut options = config.expand_options();
    if let Some(policy) = cli.unclosed {
        options.unclosed = policy;
    }

    let reader = library.open(&invocation.script)?;
    info!(script = %invocation.script, dir = %library.dir().display(), raw, "running script");

    let mut runner = Runner::new(WriterDispatcher::stdout()).with_options(options);
    let report = if raw {
        runner.run_reader(reader, Mode::Raw, &mut Environment::new())?
    } else {
        let mut env = config.vars.clone();
        seed_environment(&mut env, &invocation.seed, options)
            .context("in script arguments")?;
        for (name, value) in env.iter() {
            debug!(%name, %value, "initial binding");
        }
        runner.run_reader(reader, Mode::Expand, &mut env)?
    };

    for err in &report.errors {
        report_error(&format!("{}: {err}", library.file_name(&invocation.script)));
    }
    Ok(report)
}

/// Load the rc file given with `--rc`, or the default one if it exists.
fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let (path, explicit) = match &cli.rc {
        Some(p) => (p.clone(), true),
        None => match config::default_path() {
            Some(p) if p.is_file() => (p, false),
            _ => return Ok(Config::default()),
        },
    };
    if explicit && !path.is_file() {
        bail!("rc file {} not found", path.display());
    }

    let (config, errors) = Config::load_file(&path)
        .with_context(|| format!("reading {}", path.display()))?;
    for e in errors {
        warn!(path = %path.display(), line = e.line, "{}", e.message);
        eprintln!("mish: warning: {}: {e}", path.display());
    }
    Ok(config)
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("MISH_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Print to stderr, in red when stderr is a terminal.
fn report_error(msg: &str) {
    if io::stderr().is_tty() {
        eprintln!("{}", msg.red());
    } else {
        eprintln!("{msg}");
    }
}
