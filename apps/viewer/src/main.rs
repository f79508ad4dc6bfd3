use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    sync::Arc,
    thread,
};

use anyhow::Result;
use clap::Parser;
use client_core::{
    load_settings, DisplaySurface, ElementId, FetcherSettings, MemoryDocument, MessageFetcher,
    TriggerEvent,
};
use futures::{future, stream, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "viewer")]
#[command(about = "Shows the backend greeting; press Enter to fetch again, q to quit")]
struct Args {
    /// Fetcher config file; ./fetcher.toml is used when present
    #[arg(long)]
    config: Option<PathBuf>,
    /// Absolute URL, or a path resolved against the page origin
    #[arg(long)]
    endpoint: Option<String>,
    #[arg(long)]
    page_origin: Option<String>,
    /// Request timeout; unset waits indefinitely
    #[arg(long)]
    timeout_secs: Option<u64>,
}

impl Args {
    fn apply(self, settings: &mut FetcherSettings) {
        if let Some(v) = self.endpoint {
            settings.endpoint = v;
        }
        if let Some(v) = self.page_origin {
            settings.page_origin = v;
        }
        if let Some(v) = self.timeout_secs {
            settings.timeout_secs = Some(v);
        }
    }
}

struct TerminalDisplay {
    id: ElementId,
}

impl DisplaySurface for TerminalDisplay {
    fn set_text(&self, text: &str) {
        let mut out = io::stdout().lock();
        let _ = writeln!(out, "[{}] {text}", self.id);
    }
}

fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

// Each line is one click; `q` or end of input stops.
fn activations<S>(lines: S, trigger: ElementId) -> impl Stream<Item = TriggerEvent>
where
    S: Stream<Item = String>,
{
    lines
        .take_while(|line| future::ready(line.trim() != "q"))
        .map(move |_| TriggerEvent::Activated(trigger.clone()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let mut settings = load_settings(args.config.as_deref())?;
    args.apply(&mut settings);

    let fetcher = MessageFetcher::from_settings(&settings)?;
    let binding = settings.binding();
    info!(endpoint = %fetcher.endpoint(), "viewer starting");

    let document = MemoryDocument::new()
        .with_display(
            binding.display.clone(),
            Arc::new(TerminalDisplay {
                id: binding.display.clone(),
            }),
        )
        .with_trigger(binding.trigger.clone());

    let lines = UnboundedReceiverStream::new(spawn_stdin_reader());
    let clicks = activations(lines, binding.trigger.clone());
    let events = stream::once(future::ready(TriggerEvent::PageLoaded)).chain(clicks);

    fetcher.attach(&document, &binding, events).await;
    Ok(())
}
