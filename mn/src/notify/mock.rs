//! Recording notifier for unit tests

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tracing::debug;

use super::{Notification, NotificationKind, Notifier, NotifyError};

pub struct MockNotifier {
    fail_register: bool,
    fail_notify: bool,
    register_count: AtomicUsize,
    sent: Mutex<Vec<Notification>>,
}

impl Default for MockNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl MockNotifier {
    pub fn new() -> Self {
        Self {
            fail_register: false,
            fail_notify: false,
            register_count: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_registration() -> Self {
        Self {
            fail_register: true,
            ..Self::new()
        }
    }

    /// Records notifications but reports every delivery as failed
    pub fn failing_delivery() -> Self {
        Self {
            fail_notify: true,
            ..Self::new()
        }
    }

    pub fn register_count(&self) -> usize {
        self.register_count.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_kinds(&self) -> Vec<NotificationKind> {
        self.sent().iter().map(|n| n.kind).collect()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn register(&self) -> Result<(), NotifyError> {
        debug!("MockNotifier::register: called");
        self.register_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_register {
            return Err(NotifyError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }

    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        debug!(kind = notification.kind.name(), "MockNotifier::notify: called");
        self.sent.lock().unwrap().push(notification.clone());
        if self.fail_notify {
            return Err(NotifyError::Unavailable("server went away".to_string()));
        }
        Ok(())
    }

    fn address(&self) -> String {
        "mock:23053".to_string()
    }

    fn icon_mode(&self) -> String {
        "binary".to_string()
    }
}
