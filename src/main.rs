use anyhow::{Context, Result};
use lianke::{
    config::{Config, SERVICE_DESCRIPTION, SERVICE_NAME},
    logging, server,
    service::{self, Command, USAGE},
};
use std::{env, process::ExitCode};
use tracing::info;

#[tokio::main]
async fn main() -> ExitCode {
    // ─── 1) init logging ─────────────────────────────────────────────
    logging::init();

    // ─── 2) dispatch ─────────────────────────────────────────────────
    let command = Command::from_args(env::args().skip(1));
    match run(command).await {
        Ok(status) => {
            println!("{}", status);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

async fn run(command: Command) -> Result<String> {
    match command {
        Command::Serve => {
            let cfg = Config::from_env();
            info!(addr = %cfg.listen_addr(), "startup");
            let signal = server::serve(&cfg).await.context("serving")?;
            Ok(signal.status_message().to_string())
        }
        Command::Manage(action) => {
            let controller = service::controller_for_host(SERVICE_NAME, SERVICE_DESCRIPTION)?;
            let status = service::manage(action, controller.as_ref())
                .with_context(|| format!("{} {}", action, SERVICE_NAME))?;
            Ok(status)
        }
        Command::Usage(_) => Ok(USAGE.to_string()),
    }
}
