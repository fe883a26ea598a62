//! gn - send a single Growl notification over GNTP
//!
//! Handy for checking that a Growl server is reachable and accepts the
//! password before pointing the monitor at it.

use std::path::PathBuf;

use clap::Parser;
use eyre::{Context, Result};
use gntp::{GntpClient, Icon, IconMode, Notification, NotificationType};

#[derive(Parser)]
#[command(name = "gn", about = "Send a notification to a GNTP/Growl server", version)]
struct Cli {
    /// Notification title
    title: String,

    /// Notification text
    #[arg(default_value = "")]
    text: String,

    /// GNTP host
    #[arg(long, default_value = "localhost")]
    host: String,

    /// GNTP port
    #[arg(long, default_value_t = gntp::DEFAULT_PORT)]
    port: u16,

    /// GNTP password
    #[arg(long)]
    password: Option<String>,

    /// Application name to register as
    #[arg(long, default_value = "gn")]
    app: String,

    /// Image to attach as icon
    #[arg(long)]
    icon: Option<PathBuf>,

    /// Icon mode: binary, dataurl, fileurl, httpurl
    #[arg(long, default_value = "binary")]
    icon_mode: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let client = GntpClient::new(&cli.app)
        .with_host(&cli.host)
        .with_port(cli.port)
        .with_password(cli.password)
        .with_icon_mode(IconMode::parse_lenient(&cli.icon_mode));

    let icon = match &cli.icon {
        Some(path) => {
            let data = std::fs::read(path).context(format!("Failed to read icon {}", path.display()))?;
            let mime = if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
                "image/png"
            } else {
                "image/jpeg"
            };
            Some(Icon::new(data, mime))
        }
        None => None,
    };

    client
        .register(&[NotificationType::new("message").with_display_name("Message")])
        .await
        .context("Failed to register with GNTP server")?;

    let notification = Notification::new("message", cli.title, cli.text).with_icon(icon);
    client
        .notify(&notification)
        .await
        .context("Failed to send notification")?;

    println!("Notification sent to {}", client.address());
    Ok(())
}
