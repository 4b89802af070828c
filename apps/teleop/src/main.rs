use std::{fs::OpenOptions, future::Future, io, path::PathBuf, sync::Arc, sync::Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use command_transport::{CommandPublisher, LogPublisher, UdpPublisher};
use teleop_core::{
    run_session, ActionTable, CommandComposer, ControlHandle, ControlState, InputListener,
    PublishLoop, ShutdownFlag, StatusLine, StatusSink,
};
use tracing::{info, warn};

mod config;
mod terminal;

use config::{load_settings, Overrides, Settings, TransportKind};
use terminal::{KeyboardInput, TerminalGuard, TerminalSink};

#[derive(Parser, Debug)]
#[command(about = "Drive a vehicle control channel from the keyboard")]
struct Args {
    /// Settings file; `teleop.toml` in the working directory is used if present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, value_enum)]
    transport: Option<TransportKind>,
    /// UDP destination, e.g. 127.0.0.1:7400.
    #[arg(long)]
    target: Option<String>,
    #[arg(long)]
    channel: Option<String>,
    #[arg(long)]
    input_interval_ms: Option<u64>,
    #[arg(long)]
    publish_interval_ms: Option<u64>,
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            transport: self.transport,
            udp_target: self.target.clone(),
            channel: self.channel.clone(),
            input_interval_ms: self.input_interval_ms,
            publish_interval_ms: self.publish_interval_ms,
            log_file: self.log_file.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let settings = load_settings(args.config.as_deref(), args.overrides())?;
    init_tracing(&settings)?;
    info!(
        channel = %settings.channel,
        transport = ?settings.transport,
        input_interval_ms = settings.input_interval_ms,
        publish_interval_ms = settings.publish_interval_ms,
        "starting keyboard teleop"
    );

    let publisher = build_publisher(&settings).await?;
    terminal::ensure_rows(StatusLine::rows_required())?;

    let guard = TerminalGuard::enter().context("failed to switch terminal to raw mode")?;
    run(&settings, publisher).await;
    drop(guard);

    println!("Program exited.");
    Ok(())
}

async fn run(settings: &Settings, publisher: Arc<dyn CommandPublisher>) {
    let shutdown = ShutdownFlag::new();
    let interrupt = tokio::spawn(watch_interrupt(shutdown.clone()));

    let control = ControlHandle::new(
        ControlState::default(),
        settings.steps(),
        CommandComposer::new(settings.module_name.clone()),
    );
    let sink: Arc<dyn StatusSink> = Arc::new(TerminalSink::new());
    terminal::paint_layout(sink.as_ref(), &control.snapshot().await);

    let listener = InputListener::new(
        KeyboardInput::new(shutdown.clone()),
        ActionTable::default(),
        control.clone(),
        sink.clone(),
        shutdown.clone(),
    )
    .with_period(settings.input_period());
    let publish = PublishLoop::new(control, publisher, sink, shutdown)
        .with_period(settings.publish_period());

    run_session(listener, publish).await;
    interrupt.abort();
    info!("keyboard teleop stopped");
}

async fn build_publisher(settings: &Settings) -> Result<Arc<dyn CommandPublisher>> {
    let publisher: Arc<dyn CommandPublisher> = match settings.transport {
        TransportKind::Udp => Arc::new(
            UdpPublisher::bind(
                settings.channel.clone(),
                settings.udp_bind_addr()?,
                settings.udp_target_addr()?,
            )
            .await?,
        ),
        TransportKind::Log => Arc::new(LogPublisher::new(settings.channel.clone())),
    };
    Ok(publisher)
}

fn init_tracing(settings: &Settings) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&settings.log_file)
        .with_context(|| format!("failed to open log file {}", settings.log_file.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(settings.log_filter.as_str())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// SIGINT and SIGTERM take the same path as the quit key.
async fn watch_interrupt(shutdown: ShutdownFlag) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = match signal(SignalKind::terminate()) {
            Ok(stream) => stream,
            Err(err) => {
                warn!(error = %err, "cannot listen for SIGTERM");
                wait_for_ctrl_c().await;
                shutdown.request();
                return;
            }
        };
        tokio::select! {
            _ = wait_for_ctrl_c() => {}
            _ = terminate.recv() => {}
        }
    }
    #[cfg(not(unix))]
    wait_for_ctrl_c().await;

    info!("interrupt received");
    shutdown.request();
}

async fn wait_for_ctrl_c() {
    settle_signal("SIGINT", tokio::signal::ctrl_c()).await;
}

/// Resolves once `delivery` does. If the handler could not be installed it
/// never resolves; the quit key still works.
async fn settle_signal(name: &'static str, delivery: impl Future<Output = io::Result<()>>) {
    if let Err(err) = delivery.await {
        warn!(signal = name, error = %err, "cannot listen for signal");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn failed_handler_registration_does_not_count_as_an_interrupt() {
        let failed = async { Err::<(), _>(io::Error::other("no signal driver")) };
        let waited =
            tokio::time::timeout(Duration::from_millis(50), settle_signal("SIGINT", failed)).await;
        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn delivered_signal_resolves() {
        let delivered = async { io::Result::Ok(()) };
        tokio::time::timeout(Duration::from_secs(1), settle_signal("SIGINT", delivered))
            .await
            .expect("delivered signal");
    }
}
