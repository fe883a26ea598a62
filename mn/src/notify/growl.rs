//! Growl delivery through the `gntp` crate

use std::time::Duration;

use async_trait::async_trait;
use gntp::{GntpClient, Icon, IconMode, NotificationType};
use tracing::debug;

use super::{APP_NAME, Notification, NotificationKind, Notifier, NotifyError};
use crate::config::GntpConfig;

/// Timeout for a single GNTP request
const GNTP_TIMEOUT: Duration = Duration::from_secs(10);

pub struct GntpNotifier {
    client: GntpClient,
}

impl GntpNotifier {
    pub fn new(config: &GntpConfig) -> Self {
        debug!(host = %config.host, port = config.port, icon_mode = %config.icon_mode, "GntpNotifier::new: called");
        let client = GntpClient::new(APP_NAME)
            .with_host(&config.host)
            .with_port(config.port)
            .with_password(config.password.clone())
            .with_icon_mode(IconMode::parse_lenient(&config.icon_mode))
            .with_icon_dir(std::env::temp_dir().join("mpdnotify"))
            .with_timeout(GNTP_TIMEOUT);
        Self { client }
    }
}

#[async_trait]
impl Notifier for GntpNotifier {
    async fn register(&self) -> Result<(), NotifyError> {
        let types: Vec<NotificationType> = NotificationKind::ALL
            .iter()
            .map(|kind| NotificationType::new(kind.name()).with_display_name(kind.display_name()))
            .collect();
        self.client.register(&types).await?;
        Ok(())
    }

    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        debug!(kind = notification.kind.name(), title = %notification.title, "GntpNotifier::notify: called");
        let icon = notification
            .icon
            .as_ref()
            .map(|artwork| Icon::new(artwork.data.clone(), artwork.mime));
        let message = gntp::Notification::new(notification.kind.name(), &notification.title, &notification.body)
            .with_icon(icon);
        self.client.notify(&message).await?;
        Ok(())
    }

    fn address(&self) -> String {
        self.client.address()
    }

    fn icon_mode(&self) -> String {
        self.client.icon_mode().to_string()
    }
}
