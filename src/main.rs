use std::process::ExitCode;
use wgproxy::{run, Config};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = match Config::from_args(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = run(config).await {
        tracing::error!(error = %err, "fatal error");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
