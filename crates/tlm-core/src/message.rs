//! Severity-tagged message channel.
//!
//! Every system owns one channel. Components never print or panic to report
//! trouble; they push a [`Message`] and the owner decides what to do with it.
//! Each push is also emitted as a `tracing` event so a subscriber sees the
//! same stream live.

use core::fmt;

/// Message severity, ordered from least to most severe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
        };
        f.write_str(s)
    }
}

/// One message, attributed to the object that raised it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Message {
    pub severity: Severity,
    /// Component or system name the message belongs to.
    pub source: String,
    pub text: String,
    /// Optional short tag for grouping repeated messages.
    pub tag: Option<String>,
}

impl Message {
    pub fn new(severity: Severity, source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            severity,
            source: source.into(),
            text: text.into(),
            tag: None,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn info(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(Severity::Info, source, text)
    }

    pub fn warning(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(Severity::Warning, source, text)
    }

    pub fn error(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(Severity::Error, source, text)
    }

    /// Emit this message as a tracing event.
    pub fn trace(&self) {
        let source = self.source.as_str();
        let text = self.text.as_str();
        match self.severity {
            Severity::Debug => tracing::debug!(source, "{text}"),
            Severity::Info => tracing::info!(source, "{text}"),
            Severity::Warning => tracing::warn!(source, "{text}"),
            Severity::Error | Severity::Fatal => tracing::error!(source, "{text}"),
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.source, self.text)
    }
}

/// Ordered message store.
#[derive(Clone, Debug, Default)]
pub struct MessageChannel {
    messages: Vec<Message>,
}

impl MessageChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a message and mirror it into `tracing`.
    pub fn push(&mut self, message: Message) {
        message.trace();
        self.messages.push(message);
    }

    pub fn extend(&mut self, messages: impl IntoIterator<Item = Message>) {
        for m in messages {
            self.push(m);
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Drain all stored messages, oldest first.
    pub fn take(&mut self) -> Vec<Message> {
        std::mem::take(&mut self.messages)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.messages
            .iter()
            .filter(|m| m.severity == severity)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(|m| m.severity >= Severity::Error)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
