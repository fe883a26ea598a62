//! GNTP/1.0 request encoding and response parsing
//!
//! Only the two requests a notifying application needs are supported:
//! REGISTER (announce the application and its notification types) and
//! NOTIFY (display one notification). Requests are CRLF framed text with an
//! optional trailing binary resource block.

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::GntpError;
use crate::icon::Icon;

const CRLF: &str = "\r\n";
const PROTOCOL: &str = "GNTP/1.0";

/// One notification type announced at registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationType {
    pub name: String,
    pub display_name: String,
    pub enabled: bool,
}

impl NotificationType {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            name,
            enabled: true,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }
}

/// A single notification to display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Registered notification type name
    pub name: String,
    pub title: String,
    pub text: String,
    pub icon: Option<Icon>,
}

impl Notification {
    pub fn new(name: impl Into<String>, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            text: text.into(),
            icon: None,
        }
    }

    pub fn with_icon(mut self, icon: Option<Icon>) -> Self {
        self.icon = icon;
        self
    }
}

/// How the icon is referenced in an encoded NOTIFY
#[derive(Debug, Clone, Copy)]
pub enum IconRef<'a> {
    /// Sent inline as a binary resource block
    Inline(&'a Icon),
    /// Referenced by URL (data:, file:// or http://)
    Url(&'a str),
}

/// Password proof sent in the request line: `SHA256:<KEYHASH>.<SALT>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyHash {
    key_hash: String,
    salt: String,
}

impl KeyHash {
    /// Hash the password with a fresh random salt
    pub fn generate(password: &str) -> Self {
        let salt: [u8; 16] = rand::random();
        Self::with_salt(password, &salt)
    }

    pub fn with_salt(password: &str, salt: &[u8]) -> Self {
        let mut basis = password.as_bytes().to_vec();
        basis.extend_from_slice(salt);
        let key = Sha256::digest(&basis);
        let key_hash = Sha256::digest(key);
        Self {
            key_hash: format!("{:X}", key_hash),
            salt: to_upper_hex(salt),
        }
    }

    pub fn header(&self) -> String {
        format!("SHA256:{}.{}", self.key_hash, self.salt)
    }
}

fn to_upper_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02X}", b)).collect()
}

/// Header values are single-line; CR is dropped so multi-line text uses bare LF
fn header_value(value: &str) -> String {
    value.replace("\r\n", "\n").replace('\r', "\n")
}

fn request_line(message_type: &str, key: Option<&KeyHash>) -> String {
    match key {
        Some(key) => format!("{} {} NONE {}{}", PROTOCOL, message_type, key.header(), CRLF),
        None => format!("{} {} NONE{}", PROTOCOL, message_type, CRLF),
    }
}

fn push_header(out: &mut String, name: &str, value: &str) {
    out.push_str(name);
    out.push_str(": ");
    out.push_str(&header_value(value));
    out.push_str(CRLF);
}

/// Encode a REGISTER request
pub fn encode_register(app_name: &str, types: &[NotificationType], key: Option<&KeyHash>) -> Vec<u8> {
    debug!(%app_name, count = types.len(), "encode_register: called");
    let mut out = request_line("REGISTER", key);
    push_header(&mut out, "Application-Name", app_name);
    push_header(&mut out, "Notifications-Count", &types.len().to_string());
    out.push_str(CRLF);

    for notification_type in types {
        push_header(&mut out, "Notification-Name", &notification_type.name);
        push_header(&mut out, "Notification-Display-Name", &notification_type.display_name);
        push_header(
            &mut out,
            "Notification-Enabled",
            if notification_type.enabled { "True" } else { "False" },
        );
        out.push_str(CRLF);
    }
    out.into_bytes()
}

/// Encode a NOTIFY request
pub fn encode_notify(
    app_name: &str,
    notification: &Notification,
    icon: Option<IconRef<'_>>,
    key: Option<&KeyHash>,
) -> Vec<u8> {
    debug!(%app_name, name = %notification.name, "encode_notify: called");
    let mut out = request_line("NOTIFY", key);
    push_header(&mut out, "Application-Name", app_name);
    push_header(&mut out, "Notification-Name", &notification.name);
    push_header(&mut out, "Notification-Title", &notification.title);
    push_header(&mut out, "Notification-Text", &notification.text);

    let inline = match icon {
        Some(IconRef::Inline(icon)) => {
            let identifier = icon.identifier();
            push_header(
                &mut out,
                "Notification-Icon",
                &format!("x-growl-resource://{}", identifier),
            );
            Some((identifier, icon))
        }
        Some(IconRef::Url(url)) => {
            push_header(&mut out, "Notification-Icon", url);
            None
        }
        None => None,
    };
    out.push_str(CRLF);

    let mut bytes = out.into_bytes();
    if let Some((identifier, icon)) = inline {
        let mut block = String::new();
        push_header(&mut block, "Identifier", &identifier);
        push_header(&mut block, "Length", &icon.data.len().to_string());
        block.push_str(CRLF);
        bytes.extend_from_slice(block.as_bytes());
        bytes.extend_from_slice(&icon.data);
        bytes.extend_from_slice(CRLF.as_bytes());
        bytes.extend_from_slice(CRLF.as_bytes());
    }
    bytes
}

/// Parse a server response, turning `-ERROR` into [`GntpError::Rejected`]
pub fn parse_response(text: &str) -> Result<(), GntpError> {
    debug!(len = text.len(), "parse_response: called");
    let mut lines = text.lines();
    let first = lines
        .next()
        .ok_or_else(|| GntpError::InvalidResponse("empty response".to_string()))?;

    let mut parts = first.split_whitespace();
    let protocol = parts.next().unwrap_or_default();
    if !protocol.starts_with("GNTP/") {
        return Err(GntpError::InvalidResponse(format!("bad response line: {}", first)));
    }

    match parts.next() {
        Some("-OK") | Some("-CALLBACK") => Ok(()),
        Some("-ERROR") => {
            let mut code = 0;
            let mut description = String::new();
            for line in lines {
                if let Some((name, value)) = line.split_once(':') {
                    match name.trim() {
                        "Error-Code" => code = value.trim().parse().unwrap_or(0),
                        "Error-Description" => description = value.trim().to_string(),
                        _ => {}
                    }
                }
            }
            Err(GntpError::Rejected { code, description })
        }
        other => Err(GntpError::InvalidResponse(format!(
            "unknown response type: {}",
            other.unwrap_or_default()
        ))),
    }
}
