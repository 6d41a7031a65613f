use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use meetscribe::config::Device;
use meetscribe::{
    create_router, AppState, Config, Exporter, LogSink, SessionRegistry, SledChunkStore,
    SpeechEngine, TranscriptionWorker, WhisperEngine,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "meetscribe", about = "Meeting-bot audio transcription server")]
struct Cli {
    /// Path to a config file (TOML)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the ingest + transcription server
    Serve {
        /// Port to listen on (overrides config)
        #[arg(long)]
        port: Option<u16>,

        /// Model size: tiny, base, small, medium or large (overrides config)
        #[arg(long)]
        model: Option<String>,

        /// Compute device: cpu or cuda (overrides config)
        #[arg(long)]
        device: Option<String>,
    },

    /// Export stored audio for a bot as a WAV file plus integrity report
    Export {
        /// Bot whose audio to export
        #[arg(long)]
        bot_id: String,

        /// Output WAV path
        #[arg(long, default_value = "output_audio.wav")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut cfg = Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Serve {
            port,
            model,
            device,
        } => {
            if let Some(port) = port {
                cfg.server.port = port;
            }
            if let Some(model) = model {
                cfg.transcription.model_size =
                    model.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            }
            if let Some(device) = device {
                cfg.transcription.device = match device.as_str() {
                    "cpu" => Device::Cpu,
                    "cuda" => Device::Cuda,
                    other => bail!("unknown device: {}", other),
                };
            }
            serve(cfg).await
        }
        Command::Export { bot_id, output } => export(cfg, &bot_id, &output).await,
    }
}

async fn serve(cfg: Config) -> Result<()> {
    info!("meetscribe v{}", env!("CARGO_PKG_VERSION"));

    if cfg.transcription.device == Device::Cuda && !cfg!(feature = "cuda") {
        warn!("cuda requested but this build has no cuda feature; inference runs on cpu");
    }

    let engine: Arc<dyn SpeechEngine> = Arc::new(
        WhisperEngine::new(cfg.engine()).context("failed to initialize speech engine")?,
    );
    info!("speech engine ready: {}", engine.model_name());

    let worker = Arc::new(TranscriptionWorker::new(
        engine,
        Arc::new(LogSink),
        cfg.transcription.concurrency,
        cfg.audio.sample_rate,
    ));
    let registry = Arc::new(SessionRegistry::new(cfg.session(), worker));
    let store = Arc::new(SledChunkStore::open(&cfg.storage.path)?);

    let state = AppState::new(Arc::clone(&registry), store);
    let router = create_router(state);

    let addr = format!("{}:{}", cfg.server.bind, cfg.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("listening on {}", addr);
    info!("ready to receive audio streams at ws://{}/stream", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;

    // Flush every live session so trailing audio still reaches the engine.
    registry.shutdown().await;

    Ok(())
}

async fn export(cfg: Config, bot_id: &str, output: &std::path::Path) -> Result<()> {
    let store = Arc::new(SledChunkStore::open(&cfg.storage.path)?);
    let exporter = Exporter::new(store, cfg.integrity);

    let artifact = exporter.export(bot_id).await?;
    let report = exporter.analyze(&artifact);

    artifact.write_wav(output)?;

    println!("{}", serde_json::to_string_pretty(&report)?);

    if report.silent {
        warn!("recording appears to be silent (max amplitude {})", report.max_amplitude);
    }
    if report.duration_mismatch {
        warn!(
            "duration mismatch: measured {:.2}s vs expected {:.2}s - possible data loss",
            report.measured_duration_secs, report.expected_duration_secs
        );
    }

    Ok(())
}
