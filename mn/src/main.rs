//! mn - watch MPD and announce changes via GNTP/Growl

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{CommandFactory, FromArgMatches};
use eyre::{Context, Result};
use tokio::sync::watch;
use tracing::{debug, error, info};

use mpdnotify::cli::{Cli, generate_after_help};
use mpdnotify::config::Config;
use mpdnotify::console::{Banner, Console};
use mpdnotify::monitor::{Connector, Monitor, Supervisor, SupervisorSettings, TcpConnector, connect_initial};
use mpdnotify::notify::{GntpNotifier, Notifier, register_or_disable};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>, debug_env: bool) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mpdnotify")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Priority: CLI --log-level > config file > DEBUG=1 > INFO
    let level_str = cli_log_level.or(config_log_level).or(debug_env.then_some("DEBUG"));
    let level = match level_str.map(|s| s.to_uppercase()) {
        Some(s) => match s.as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(log_dir.join("mpdnotify.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cmd = Cli::command().after_help(generate_after_help());
    let cli = Cli::from_arg_matches(&cmd.get_matches())?;

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());
    let debug_env = cli.debug || std::env::var("DEBUG").as_deref() == Ok("1");
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref(), debug_env)
        .context("Failed to setup logging")?;

    let config = Config::resolve(&cli).context("Failed to load configuration")?;
    info!(mpd = %config.mpd.address(), gntp_host = %config.gntp.host, gntp_port = config.gntp.port, "mn starting");

    let connector = TcpConnector::new(&config.mpd);
    let initial = connect_initial(&connector).await?;
    info!(address = %connector.address(), "Connected to MPD");

    let sink: Arc<dyn Notifier> = Arc::new(GntpNotifier::new(&config.gntp));
    let notifier = register_or_disable(sink, config.debug).await;
    if notifier.is_none() {
        eprintln!("GNTP/Growl not available - notifications disabled");
    }

    let mut console = Console::stdout();
    console.banner(&Banner {
        mpd_address: connector.address(),
        notifications: notifier.as_ref().map(|n| (n.address(), n.icon_mode())),
        debug: config.debug,
    });

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                debug!("main: ctrl_c received");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => error!(error = %e, "Failed to listen for Ctrl+C"),
        }
    });

    let monitor = Monitor::new(notifier, console, config.debug);
    let mut supervisor = Supervisor::new(connector, monitor, SupervisorSettings::default());
    supervisor.run(initial, shutdown_rx).await?;

    println!("\n👋 Shutting down MPD Monitor");
    info!("mn stopped");
    Ok(())
}
