use std::sync::Arc;

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

use pm_onboard::client::{ApiClient, LocalApi, OnboardingApi};
use pm_onboard::config::{ClientConfig, ServerConfig};
use pm_onboard::onboarding::{OnboardingManager, OnboardingRouteState, onboarding_routes};
use pm_onboard::store::{LibSqlBackend, ProjectStore};
use pm_onboard::wizard::{WizardContext, WizardController, run_terminal};

const USAGE: &str = "\
Usage: pm-onboard <command>

Commands:
  serve                          Run the Document Store API
  wizard [--local]               Interactive onboarding wizard
  list                           List projects
  create <name> [description]    Create a project
  onb-get <id>                   Show a project's onboarding document
  onb-save <id> '<json patch>'   Merge a partial document
  onb-commit <id>                Commit a project's onboarding";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// The wizard owns the terminal, so its logs go to a file instead.
fn init_file_logging(config: &ClientConfig) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(&config.log_dir)
        .with_context(|| format!("creating log dir {}", config.log_dir.display()))?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("wizard")
        .filename_suffix("log")
        .build(&config.log_dir)
        .context("opening wizard log file")?;
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_writer(writer)
        .init();
    Ok(guard)
}

async fn open_manager(db_path: &std::path::Path) -> anyhow::Result<Arc<OnboardingManager>> {
    let store: Arc<dyn ProjectStore> = Arc::new(
        LibSqlBackend::new_local(db_path)
            .await
            .with_context(|| format!("opening database at {}", db_path.display()))?,
    );
    Ok(Arc::new(OnboardingManager::new(store)))
}

async fn serve() -> anyhow::Result<()> {
    init_stderr_logging();
    let config = ServerConfig::from_env();
    let addr = config.socket_addr()?;

    eprintln!("📋 pm-onboard v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: http://{addr}");
    eprintln!("   Database: {}", config.db_path.display());
    eprintln!("   CORS: {}\n", config.cors_origins.join(", "));

    let manager = open_manager(&config.db_path).await?;
    let app = onboarding_routes(OnboardingRouteState { manager }, &config.cors_origins);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "Document Store listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await?;
    Ok(())
}

async fn wizard(local: bool) -> anyhow::Result<()> {
    let client_config = ClientConfig::from_env();
    let _guard = init_file_logging(&client_config)?;

    let api: Arc<dyn OnboardingApi> = if local {
        let server_config = ServerConfig::from_env();
        eprintln!("   Database: {}", server_config.db_path.display());
        Arc::new(LocalApi::new(open_manager(&server_config.db_path).await?))
    } else {
        eprintln!("   API: {}", client_config.api_base);
        Arc::new(ApiClient::new(client_config.api_base.clone()))
    };

    let mut controller = WizardController::new(WizardContext::new(api));
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    run_terminal(&mut controller, stdin, tokio::io::stdout()).await?;
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// One-shot client commands. Errors are reported by the caller.
async fn run_client_command(command: &str, args: &[String]) -> anyhow::Result<bool> {
    let client = ApiClient::new(ClientConfig::from_env().api_base);
    match (command, args) {
        ("list", []) => print_json(&client.list_projects().await?)?,
        ("create", [name]) => print_json(&client.create_project(name, "").await?)?,
        ("create", [name, description]) => {
            print_json(&client.create_project(name, description).await?)?
        }
        ("onb-get", [id]) => print_json(&client.get_onboarding(id).await?)?,
        ("onb-save", [id, patch]) => {
            let patch: serde_json::Value =
                serde_json::from_str(patch).context("patch must be valid JSON")?;
            print_json(&client.patch_raw(id, &patch).await?)?
        }
        ("onb-commit", [id]) => print_json(&client.commit_onboarding(id).await?)?,
        _ => return Ok(false),
    }
    Ok(true)
}

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((command, rest)) = args.split_first() else {
        eprintln!("{USAGE}");
        std::process::exit(1);
    };

    let result = match command.as_str() {
        "serve" if rest.is_empty() => serve().await,
        "wizard" if rest.is_empty() => wizard(false).await,
        "wizard" if rest == ["--local"] => wizard(true).await,
        "-h" | "--help" | "help" => {
            println!("{USAGE}");
            return;
        }
        other => {
            init_stderr_logging();
            match run_client_command(other, rest).await {
                Ok(true) => Ok(()),
                Ok(false) => {
                    eprintln!("{USAGE}");
                    std::process::exit(1);
                }
                Err(e) => Err(e),
            }
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(2);
    }
}
