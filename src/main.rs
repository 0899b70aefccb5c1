use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use firm_ai::constants;
use firm_ai::requester::ConsultationRequester;
use firm_ai::session::{self, SessionOptions};
use firm_ai::{web_server, Gateway, GatewayConfig};

// Define the command-line interface structure using clap
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Start the consultation web server.
    Serve {
        #[arg(
            long,
            env = constants::ENV_PORT,
            default_value_t = 3000,
            help = "Port for the web server."
        )]
        port: u16,
        #[arg(
            long,
            env = constants::ENV_API_KEY,
            hide_env_values = true,
            help = "Credential for the generation API."
        )]
        api_key: Option<String>,
        #[arg(
            long,
            env = constants::ENV_API_BASE,
            default_value = constants::DEFAULT_API_BASE,
            help = "Base URL of the OpenAI-compatible API."
        )]
        api_base: String,
        #[arg(
            long,
            env = constants::ENV_MODEL,
            default_value = constants::DEFAULT_MODEL,
            help = "Model identifier."
        )]
        model: String,
        #[arg(
            long,
            env = constants::ENV_WEBHOOK_URL,
            help = "Spreadsheet webhook receiving interaction logs."
        )]
        webhook_url: Option<String>,
    },
    /// Run a consultation in the terminal against a running server.
    Consult {
        #[arg(
            long,
            default_value = "http://127.0.0.1:3000",
            help = "Base URL of the Firm AI server."
        )]
        server: String,
        #[arg(long, default_value = ".", help = "Directory for exported consultations.")]
        export_dir: PathBuf,
        #[arg(long, help = "Print text immediately instead of typing it out.")]
        no_animation: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (for environment variables like API keys)
    dotenvy::dotenv().ok();

    // Reads log level from RUST_LOG (e.g., RUST_LOG=info,firm_ai=debug)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            port,
            api_key,
            api_base,
            model,
            webhook_url,
        } => {
            let config = GatewayConfig::default()
                .with_api_key(api_key)
                .with_api_base(api_base)
                .with_model(model)
                .with_webhook_url(webhook_url);

            if !config.has_api_key() {
                error!(
                    "{} is not set; consultations will return the configuration placeholder",
                    constants::ENV_API_KEY
                );
            }
            if config.webhook_url.is_none() {
                info!("{} is not set; interaction logging disabled", constants::ENV_WEBHOOK_URL);
            }
            info!(model = %config.model, "Starting Firm AI on port {}...", port);

            let gateway = Arc::new(Gateway::from_config(config));
            let mut web_server_handle = tokio::spawn(async move {
                if let Err(e) = web_server::start_web_server(port, gateway).await {
                    error!("Web server failed: {:?}", e);
                }
            });

            let ctrl_c = tokio::signal::ctrl_c();
            tokio::pin!(ctrl_c);

            tokio::select! {
                _ = &mut ctrl_c => {
                    info!("Ctrl-C received, initiating shutdown...");
                }
                res = &mut web_server_handle => {
                    match res {
                        Ok(_) => info!("Web server task completed unexpectedly."),
                        Err(e) if e.is_panic() => error!("Web server task panicked: {:?}", e),
                        Err(e) => error!("Web server task failed: {:?}", e),
                    }
                }
            }

            if !web_server_handle.is_finished() {
                info!("Aborting web server task...");
                web_server_handle.abort();
            }
            info!("Shutdown complete.");
        }
        Commands::Consult {
            server,
            export_dir,
            no_animation,
        } => {
            let requester = ConsultationRequester::new(&server);
            info!(endpoint = %requester.endpoint(), "Starting terminal consultation");
            let mut options = SessionOptions {
                export_dir,
                ..SessionOptions::default()
            };
            if no_animation {
                options.welcome_delay = std::time::Duration::ZERO;
                options.response_delay = std::time::Duration::ZERO;
            }

            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let mut stdout = std::io::stdout();
            session::run_consultation(&requester, stdin, &mut stdout, &options)
                .await
                .context("Consultation session failed")?;
        }
    }

    Ok(())
}
