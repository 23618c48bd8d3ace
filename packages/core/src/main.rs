use clap::Parser;
use dotenvy::dotenv;
use tokio::net::TcpListener;

use logkit::api::{admin_router, LEVEL_PATH};
use logkit::bridge::init_tracing;
use logkit::cli::Cli;
use logkit::config::Config;
use logkit::error::AppError;
use logkit::{kv, Log, Logger};

#[tokio::main]
async fn main() {
    dotenv().ok();
    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(config) => config.merge_cli(&cli),
        Err(err) => {
            let logger = Logger::builder().level(cli.log.log_level).build().named("logkit");
            logger.fatalw("logkit stopped", &kv!["error" => AppError::Config(err).to_string()]);
            return;
        }
    };

    let logger = config.logger_builder().build().named("logkit");

    if let Err(err) = run(&config, &logger).await {
        logger.fatalw("logkit stopped", &kv!["error" => err.to_string()]);
    }
}

async fn run(config: &Config, logger: &Logger) -> Result<(), AppError> {
    init_tracing(logger)?;
    logkit::init(logger.clone())?;

    let listener = TcpListener::bind(config.admin_addr).await?;
    logger.infow(
        "admin server listening",
        &kv![
            "address" => listener.local_addr()?.to_string(),
            "level_path" => LEVEL_PATH,
            "level" => logger.atomic_level().level(),
            "development" => config.development,
        ],
    );

    let app = admin_router(logger.atomic_level().clone());
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    logger.info(&[&"shutdown complete"]);
    logger.sync()?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for ctrl-c");
    }
}
