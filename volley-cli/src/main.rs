use clap::Parser;
use tracing_subscriber::EnvFilter;

mod args;
mod cmd;
mod commands;
mod exit_codes;
mod manifest;
mod output;

pub use args::*;
use commands::Command;

#[derive(Debug, Parser)]
#[command(name = "volley", version, about = "Paced, retrying batch runner for HTTP requests")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Logs go to stderr so stdout stays machine-readable. `LOG_FORMAT=json`
/// switches to JSON lines.
fn init_tracing() {
    let json_format = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("volley=info,volley_exec=info,volley_core=info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to create tokio runtime: {e}");
            std::process::exit(exit_codes::RUNTIME_ERROR);
        }
    };

    let exit_code = rt.block_on(run_command(cli.command));
    std::process::exit(exit_code);
}

async fn run_command(command: Command) -> i32 {
    match command {
        Command::Run {
            manifest,
            events,
            batch,
            output,
        } => cmd::run::run_cmd(&manifest, events, batch, output).await,
        Command::Config { batch, output } => cmd::config::config_cmd(batch, output),
    }
}
