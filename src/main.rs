use clap::Parser;
use std::process::ExitCode;

use rpa_bot_kit::configs::{Environment, Settings, environment};
use rpa_bot_kit::loggers::ProcessType;
use rpa_bot_kit::utils::{initialize_app_with, run_app};
use rpa_bot_kit::workflows::Workflow;

#[derive(Parser, Debug)]
#[command(name = "rpa_bot_kit", about = "Runs the RPA bot workflow")]
struct Cli {
    /// Deployment environment; the ENVIRONMENT variable takes precedence.
    #[arg(long, value_enum)]
    env: Option<Environment>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let resolved = environment::init(cli.env);

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    if settings.processing.debug_mode {
        println!("{}", settings.summary());
        println!("Environment source: {:?}", resolved.source);
    }
    if let Err(e) = settings.paths.ensure_all() {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }
    if let Err(e) = initialize_app_with(settings).await {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    let outcome = run_app(|logger, _db| async move {
        let env_msg = format!("Starting RPA process in {} environment", resolved.environment.as_str().to_uppercase());
        logger.log_info("main", &env_msg, ProcessType::Robotic).await;
        let bot_msg = format!("Bot: {}", logger.bot_name());
        logger.log_info("main", &bot_msg, ProcessType::System).await;

        logger.log_info("main", "Initializing workflow", ProcessType::Robotic).await;
        let mut workflow = Workflow::new();

        let result = workflow.execute_logged(&logger).await;

        match result {
            Ok(report) => {
                let msg = format!("Workflow completed with status: {}", report.status);
                logger.log_success("main", &msg, ProcessType::Process).await;
                logger.log_info("main", "RPA process completed successfully", ProcessType::Robotic).await;
                ExitCode::SUCCESS
            }
            Err(e) => {
                let msg = format!("Critical error in RPA process: {e}");
                logger.log_critical("main", &msg, ProcessType::System).await;
                ExitCode::FAILURE
            }
        }
    })
    .await;

    match outcome {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
