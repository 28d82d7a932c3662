use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use agent_sim::{
    agent::{CameraSource, SimulatedAgent},
    build_router,
    config::{load_settings, DEFAULT_CONFIG_PATH},
    led::LoggingLed,
    scene::SyntheticScene,
    spawn_frame_loop, AppState,
};
use anyhow::Context;
use clap::Parser;
use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Args {
    /// Camera source URL or device index.
    #[arg(long)]
    source: Option<String>,
    #[arg(long)]
    bind: Option<String>,
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    let args = Args::parse();

    let mut settings = load_settings(&args.config)?;
    if let Some(source) = args.source {
        settings.camera_source = source;
    }
    if let Some(bind) = args.bind {
        settings.bind_addr = bind;
    }

    let agent = Arc::new(Mutex::new(SimulatedAgent::new(
        CameraSource::parse(&settings.camera_source),
        settings.capture_interval,
        Arc::new(LoggingLed),
    )));
    let frames = spawn_frame_loop(
        Arc::clone(&agent),
        SyntheticScene::default(),
        settings.frame_interval,
    );

    let app = build_router(AppState {
        agent: Arc::clone(&agent),
        frame_interval: settings.frame_interval,
    });
    let addr: SocketAddr = settings
        .bind_addr
        .parse()
        .with_context(|| format!("invalid bind address '{}'", settings.bind_addr))?;
    info!(%addr, "agent simulator listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;
    frames.abort();
    agent.lock().await.power_down();
    served?;
    Ok(())
}
