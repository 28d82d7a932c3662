mod config;
mod view;

use std::{future::Future, path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use clap::Parser;
use console_core::{ConsoleEvent, ConsoleSession, HttpRemoteController};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, BufReader},
    sync::broadcast::error::RecvError,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::{load_settings, DEFAULT_CONFIG_PATH};
use view::{parse_command, render, Command, HELP};

#[derive(Parser, Debug)]
struct Args {
    /// Base address of the remote agent.
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    #[arg(long)]
    poll_interval_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(&args.config)?;
    if let Some(url) = args.api_url {
        settings.api_url = url;
    }
    if let Some(ms) = args.poll_interval_ms.filter(|ms| *ms > 0) {
        settings.poll_interval = Duration::from_millis(ms);
    }

    let remote = HttpRemoteController::with_timeout(&settings.api_url, settings.request_timeout)
        .with_context(|| format!("cannot use remote address '{}'", settings.api_url))?;
    let feed_url = remote.video_feed_url()?.to_string();
    info!(api_url = %remote.base_url(), "console connecting");

    let session = ConsoleSession::new(Arc::new(remote), settings.session_options());
    let shutdown = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            warn!(%error, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };
    run_console(
        &session,
        &feed_url,
        BufReader::new(tokio::io::stdin()),
        shutdown,
    )
    .await
}

/// Drives the session until `q` or `shutdown`. End of input only stops command reading.
async fn run_console<R, S>(
    session: &ConsoleSession,
    feed_url: &str,
    input: R,
    shutdown: S,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    S: Future<Output = ()>,
{
    let mut events = session.subscribe_events();
    session.start().await;

    let mut last_frame = render(&session.snapshot().await, feed_url);
    println!("{last_frame}\n{HELP}");

    let mut lines = input.lines();
    let mut input_open = true;
    tokio::pin!(shutdown);

    let outcome = loop {
        tokio::select! {
            _ = &mut shutdown => break Ok(()),
            line = lines.next_line(), if input_open => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        info!("stdin closed; press ctrl-c to exit");
                        input_open = false;
                        continue;
                    }
                    Err(error) => break Err(error.into()),
                };
                match parse_command(&line) {
                    Command::Toggle => {
                        let request = session.toggle_mode().await;
                        println!("requested {}", request.target());
                    }
                    Command::Show => {
                        last_frame = render(&session.snapshot().await, feed_url);
                        println!("{last_frame}");
                    }
                    Command::Quit => break Ok(()),
                    Command::Help => println!("{HELP}"),
                }
            }
            event = events.recv() => match event {
                Ok(ConsoleEvent::PollFailed { .. } | ConsoleEvent::ModeRequested(_)) => {}
                Ok(_) => {
                    let frame = render(&session.snapshot().await, feed_url);
                    if frame != last_frame {
                        println!("{frame}");
                        last_frame = frame;
                    }
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "console fell behind event stream"),
                Err(RecvError::Closed) => break Ok(()),
            },
        }
    };

    session.stop().await;
    info!("console stopped");
    outcome
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
