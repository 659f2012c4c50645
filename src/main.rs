use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use tracing::error;

use ipgeo::cli::{Cli, Commands, ConfigCommands};
use ipgeo::config::{get_config, init_config};
use ipgeo::errors::IpGeoError;
use ipgeo::runtime::modes::{self, Mode};
use ipgeo::system::init_logging;

#[actix_web::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    if let Err(e) = init_config(cli.config.as_deref()) {
        report(&anyhow::Error::new(e));
        return ExitCode::FAILURE;
    }

    let result = match modes::detect_mode(cli.command.as_ref()) {
        Mode::Server => run_server().await,
        Mode::Cli => run_command(cli.command).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run_server() -> anyhow::Result<()> {
    // guard 必须存活到进程结束
    let _log_guard = init_logging(&get_config().logging)?;
    modes::run_server()
        .await
        .inspect_err(|e| error!("Server exited with error: {:#}", e))
}

async fn run_command(command: Option<Commands>) -> anyhow::Result<()> {
    match command {
        Some(Commands::Lookup { addresses, dataset }) => {
            // 不初始化日志，stdout 只输出 JSON，错误打到 stderr
            modes::run_lookup(&addresses, dataset).await
        }
        Some(Commands::Config {
            action: ConfigCommands::Generate { output_path, force },
        }) => modes::run_config_generate(output_path, force),
        Some(Commands::Serve) | None => Ok(()),
    }
}

fn report(e: &anyhow::Error) {
    match e.chain().find_map(|cause| cause.downcast_ref::<IpGeoError>()) {
        Some(geo) => eprintln!("{}: {}\n  {}", "Error".red().bold(), e, geo.format_colored()),
        None => eprintln!("{}: {:#}", "Error".red().bold(), e),
    }
}
