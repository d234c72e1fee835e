use autodock::config::{CommandMapping, Settings};
use autodock::error::AutodockError;
use autodock::logging::{FileLogger, setup_logging};
use autodock::{AppState, WEBHOOK_PATH, router};
use std::sync::Arc;
use tracing::{self, error, info};

fn exit_with(e: AutodockError) -> ! {
    eprintln!("Configuration error: {}", e);
    std::process::exit(1);
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let settings = Settings::from_env().unwrap_or_else(|e| exit_with(e));

    let file_logger = settings.log_dir.as_deref().map(FileLogger::new);
    let _log_guard = setup_logging(file_logger.as_ref()).unwrap_or_else(|e| exit_with(e));

    let commands = match CommandMapping::from_env() {
        Ok(commands) => commands,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    info!("Docker repository actions:");
    for (repo, command) in commands.iter() {
        info!("\t{}: {}", repo, command);
    }

    let bind_address = settings.bind_address.clone();
    let state = match AppState::new(commands, settings) {
        Ok(state) => Arc::new(state),
        Err(e) => {
            error!("Failed to initialise: {}", e);
            std::process::exit(1);
        }
    };

    let listener = match tokio::net::TcpListener::bind(&bind_address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Could not bind {}: {}", bind_address, e);
            std::process::exit(1);
        }
    };

    info!("Listening on {}", bind_address);
    info!("Point your Hook config at: http://{{IP+Port}}{}", WEBHOOK_PATH);

    if let Err(e) = axum::serve(listener, router(state)).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
