//! freshseed - Short-lived seeds for cross-device freshness checks
//!
//! One device asks the server for a seed and shows it as a QR code with a
//! live countdown; another scans it and asks the server whether it is still
//! fresh.

use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand};
use freshseed_client::{
    connect, render_terminal, EnglishMessages, GenerationFlow, GenerationState, QrRenderer,
    ValidationFlow, ValidationState,
};
use freshseed_core::{ClientConfig, ServerConfig};
use freshseed_server::{create_router, AppState};
use freshseed_store::Sweeper;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

/// freshseed - issue and check short-lived QR seeds
#[derive(Parser, Debug)]
#[command(name = "freshseed")]
#[command(version, about, long_about = None)]
struct Args {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the seed server
    Serve(ServeArgs),
    /// Request a seed and display it as a QR code with a countdown
    Generate(GenerateArgs),
    /// Check a scanned seed against the server
    Validate(ValidateArgs),
}

#[derive(ClapArgs, Debug)]
struct ServeArgs {
    /// Address to bind to
    #[arg(short, long, default_value = "0.0.0.0")]
    bind: IpAddr,

    /// Server port
    #[arg(short, long, env = "PORT", default_value = "3000")]
    port: u16,

    /// Seed time-to-live in seconds
    #[arg(long, default_value = "300")]
    ttl: u64,

    /// Seconds between store sweeps
    #[arg(long, default_value = "60", value_parser = clap::value_parser!(u64).range(1..))]
    sweep_interval: u64,

    /// Seconds an expired seed is remembered before eviction
    #[arg(long, default_value = "300")]
    eviction_grace: u64,
}

#[derive(ClapArgs, Debug)]
struct ClientArgs {
    /// Seed server base URL
    #[arg(short, long, env = "FRESHSEED_SERVER", default_value = "http://localhost:3000")]
    server: String,

    /// Retransmissions allowed for transient failures
    #[arg(long, default_value = "1")]
    retries: u32,

    /// Milliseconds between attempts
    #[arg(long, default_value = "1300")]
    retry_delay: u64,
}

impl ClientArgs {
    fn config(&self) -> ClientConfig {
        ClientConfig::new()
            .with_server_url(self.server.clone())
            .with_max_retries(self.retries)
            .with_retry_delay_ms(self.retry_delay)
    }
}

#[derive(ClapArgs, Debug)]
struct GenerateArgs {
    #[command(flatten)]
    client: ClientArgs,

    /// Also write the QR code as a PNG
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// PNG side length in pixels
    #[arg(long, default_value = "500")]
    size: u32,
}

#[derive(ClapArgs, Debug)]
struct ValidateArgs {
    #[command(flatten)]
    client: ClientArgs,

    /// The scanned seed value
    seed: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .with_env_filter(EnvFilter::from_default_env().add_directive(log_level.into()))
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    match args.command {
        Command::Serve(serve) => run_server(serve).await,
        Command::Generate(generate) => run_generate(generate).await,
        Command::Validate(validate) => run_validate(validate).await,
    }
}

async fn run_server(args: ServeArgs) -> Result<()> {
    info!("freshseed v{}", env!("CARGO_PKG_VERSION"));

    let config = ServerConfig::new()
        .with_bind(args.bind)
        .with_port(args.port)
        .with_seed_ttl_secs(args.ttl)
        .with_sweep_interval_secs(args.sweep_interval)
        .with_eviction_grace_secs(args.eviction_grace);

    let state = Arc::new(AppState::with_system_clock(config.clone()));
    let mut sweeper = Sweeper::spawn(state.store(), config.sweep_interval());
    let router = create_router(state);

    let addr = config.socket_addr();
    info!("Seed TTL: {}s, sweep every {}s", config.seed_ttl_secs, config.sweep_interval_secs);
    info!("Server running at http://{}", addr);

    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        info!("Shutting down...");
    };

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;

    sweeper.stop();
    info!("Goodbye!");
    Ok(())
}

async fn run_generate(args: GenerateArgs) -> Result<()> {
    let config = args.client.config().with_qr_size(args.size);
    let flow = GenerationFlow::with_qr_size(
        connect(&config),
        Arc::new(QrRenderer),
        Arc::new(EnglishMessages),
        config.qr_size,
    );

    let mut states = flow.subscribe();
    flow.generate();

    // The full QR is printed once per seed; countdown ticks only rewrite the line
    let mut shown: Option<String> = None;
    loop {
        let state = tokio::select! {
            state = states.recv() => state,
            _ = tokio::signal::ctrl_c() => break,
        };

        match state {
            Ok(GenerationState::Loading) => info!("Requesting seed from {}...", config.server_url),
            Ok(GenerationState::Success {
                seed,
                image,
                expires_in_seconds,
            }) => {
                if shown.as_deref() != Some(seed.as_str()) {
                    show_seed(&seed, &image, args.output.as_ref(), expires_in_seconds);
                    shown = Some(seed);
                }
                if expires_in_seconds == 0 {
                    println!("\r  Seed expired.            ");
                    break;
                }
                print!("\r  Expires in {:>4}s", expires_in_seconds);
                std::io::Write::flush(&mut std::io::stdout()).ok();
            }
            Ok(GenerationState::Error { message }) => {
                anyhow::bail!(message);
            }
            Err(RecvError::Lagged(skipped)) => warn!("Display lagged by {} updates", skipped),
            Err(RecvError::Closed) => break,
        }
    }

    flow.close();
    Ok(())
}

fn show_seed(seed: &str, image: &freshseed_client::QrImage, output: Option<&PathBuf>, remaining: u32) {
    println!();
    match render_terminal(seed) {
        Some(art) => {
            for line in art.lines() {
                println!("  {}", line);
            }
        }
        None => warn!("Failed to render QR code for terminal"),
    }
    println!();
    println!("  Seed: {}", seed);
    println!("  Valid for {} seconds", remaining);

    if let Some(path) = output {
        match image.save(path) {
            Ok(()) => info!("QR code written to {}", path.display()),
            Err(e) => warn!("Failed to write {}: {}", path.display(), e),
        }
    }
    println!();
}

async fn run_validate(args: ValidateArgs) -> Result<()> {
    let config = args.client.config();
    let flow = ValidationFlow::new(connect(&config), Arc::new(EnglishMessages));

    let mut states = flow.subscribe();
    flow.on_scanned(args.seed);

    loop {
        match states.recv().await {
            Ok(ValidationState::Scan) => {}
            Ok(ValidationState::Loading) => info!("Validating against {}...", config.server_url),
            Ok(ValidationState::Success { valid: true }) => {
                println!("VALID");
                return Ok(());
            }
            Ok(ValidationState::Success { valid: false }) => {
                println!("INVALID");
                anyhow::bail!("seed was rejected by the server");
            }
            Ok(ValidationState::Error { message }) => anyhow::bail!(message),
            Err(RecvError::Lagged(_)) => {}
            Err(RecvError::Closed) => anyhow::bail!("validation flow closed unexpectedly"),
        }
    }
}
