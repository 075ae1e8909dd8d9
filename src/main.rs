use std::process::ExitCode;

use clap::Parser;
use taxrag::cli::handlers::*;
use taxrag::cli::output::*;
use taxrag::cli::Cli;
use taxrag::cli::Commands;
use taxrag::config::AppConfig;
use taxrag::config::EXAMPLE_CONFIG_FILE;
use taxrag::rag::RagService;
use taxrag::Result;
use tracing::error;
use tracing::info;
use tracing::warn;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration
    let mut config = match AppConfig::load_from(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            print_error(&format!("설정 파일을 읽지 못했습니다: {e}"));
            return ExitCode::FAILURE;
        }
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }

    // Initialize logging; the guard flushes the log file when main returns
    let _log_guard = match taxrag::logging::init_logging_with_config(Some(&config.logging)) {
        Ok(guard) => guard,
        Err(e) => {
            print_error(&e.to_string());
            return ExitCode::FAILURE;
        }
    };
    info!("Configuration loaded successfully");
    if AppConfig::uses_example_config(cli.config.as_deref()) {
        warn!(
            "Using {}. Please create config.toml for production use.",
            EXAMPLE_CONFIG_FILE
        );
    }

    match run(cli.command, &config).await {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, config: &AppConfig) -> Result<ExitCode> {
    if !command.needs_pipeline() {
        handle_config(config)?;
        return Ok(ExitCode::SUCCESS);
    }

    // Secrets first: nothing is served without them
    let missing = config.missing_secrets();
    if !missing.is_empty() {
        print_error("API 키가 설정되지 않았습니다. [.env] 파일을 확인하세요.");
        error!("Missing secrets: {}", missing.join(", "));
        return Ok(ExitCode::FAILURE);
    }
    if let Err(e) = config.validate() {
        print_error(&e.to_string());
        return Ok(ExitCode::FAILURE);
    }

    print_info("검색 파이프라인을 초기화하는 중입니다...");
    let rag = match RagService::from_config(config).await {
        Ok(rag) => rag,
        Err(e) => {
            error!("Initialization failed: {}", e);
            print_error(&format!("초기화에 실패했습니다: {e}"));
            return Ok(ExitCode::FAILURE);
        }
    };
    print_success("초기화가 완료되었습니다.");
    println!();

    // Execute the requested command
    match command {
        Commands::Chat { session } => handle_chat(config, &rag, session).await?,
        Commands::Ask { question, session } => {
            handle_ask(config, &rag, &question, session).await?;
        }
        Commands::Serve { host, port, cors } => {
            handle_serve_api(config, rag, host, port, cors).await?;
        }
        Commands::Config => handle_config(config)?,
    }
    Ok(ExitCode::SUCCESS)
}
