mod output;
mod skills_commands;

use std::{path::PathBuf, process::ExitCode};

use {
    clap::{CommandFactory, FromArgMatches, Parser, error::ErrorKind},
    skillkit_config::{DEFAULT_FALLBACK_DIR, DEFAULT_PRIMARY_DIR},
    tracing::debug,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use crate::skills_commands::{SkillAction, SkillsContext};

#[derive(Parser)]
#[command(
    name = "skillkit",
    version,
    about = "List, validate and install SKILL.md skill definitions"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<SkillAction>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Skills directory (default: `skills/` next to the executable, else `./skills`).
    #[arg(long, global = true, env = "SKILLKIT_SKILLS_DIR")]
    skills_dir: Option<PathBuf>,

    /// Config file (default: ./skillkit.toml, then ~/.config/skillkit/skillkit.toml).
    #[arg(long, global = true, env = "SKILLKIT_CONFIG")]
    config: Option<PathBuf>,
}

fn command() -> clap::Command {
    Cli::command().after_help(format!(
        "Install locations:\n  \
         primary:  {DEFAULT_PRIMARY_DIR} (used if it exists, created if neither exists)\n  \
         fallback: {DEFAULT_FALLBACK_DIR} (used if it exists and primary does not)\n\
         Override both in skillkit.toml under [install], or pass --target."
    ))
}

/// Parse arguments. Help and version exit 0; any other parse error prints
/// the error and the usage summary and exits 1.
fn parse_cli() -> Result<Cli, ExitCode> {
    let mut cmd = command();
    let parsed = cmd
        .try_get_matches_from_mut(std::env::args_os())
        .and_then(|matches| Cli::from_arg_matches(&matches));

    match parsed {
        Ok(cli) => Ok(cli),
        Err(e)
            if matches!(
                e.kind(),
                ErrorKind::DisplayHelp
                    | ErrorKind::DisplayVersion
                    | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            ) =>
        {
            let _ = e.print();
            Err(ExitCode::SUCCESS)
        },
        Err(e) => {
            output::error(e.render().to_string().trim_end());
            eprintln!();
            eprintln!("{}", cmd.render_help());
            Err(ExitCode::FAILURE)
        },
    }
}

/// Logs go to stderr so stdout carries only command output.
fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = match parse_cli() {
        Ok(cli) => cli,
        Err(code) => return code,
    };

    init_telemetry(&cli);
    debug!(version = env!("CARGO_PKG_VERSION"), "skillkit starting");

    let Some(action) = cli.command else {
        println!("{}", command().render_help());
        return ExitCode::SUCCESS;
    };

    let skills_dir = cli.skills_dir;
    let config = cli.config;
    let load = || SkillsContext::load(skills_dir.as_deref(), config.as_deref());

    match skills_commands::handle_skills(action, load).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{e:#}"));
            ExitCode::FAILURE
        },
    }
}
