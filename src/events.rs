//! Event System
//!
//! Module load outcomes reported to front ends

use crate::logging::{LogLevel, should_log_with_env};
use chrono::Local;
use std::fmt::Display;
use tokio::sync::mpsc;

#[derive(Debug, Copy, Clone, Eq, PartialEq, strum::Display)]
pub enum EventType {
    /// Module data was replaced.
    Success,
    /// Module data was replaced, but some sources served fallback data.
    Fallback,
    /// The module pipeline failed and its fallback was returned.
    Error,
    /// An auto-refresh tick started.
    Refresh,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Module identifier, `None` for manager-wide events.
    pub module: Option<String>,
    pub msg: String,
    pub timestamp: String,
    pub event_type: EventType,
    pub log_level: LogLevel,
}

impl Event {
    fn new(module: Option<String>, msg: String, event_type: EventType, log_level: LogLevel) -> Self {
        Self {
            module,
            msg,
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            event_type,
            log_level,
        }
    }

    pub fn module_with_level(
        module: &str,
        msg: String,
        event_type: EventType,
        log_level: LogLevel,
    ) -> Self {
        Self::new(Some(module.to_string()), msg, event_type, log_level)
    }

    pub fn refresh(msg: String) -> Self {
        Self::new(None, msg, EventType::Refresh, LogLevel::Debug)
    }

    pub fn should_display(&self) -> bool {
        // Always show success events and info level events
        if self.event_type == EventType::Success || self.log_level >= LogLevel::Info {
            return true;
        }
        should_log_with_env(self.log_level)
    }
}

impl Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.module {
            Some(module) => write!(
                f,
                "{} [{}] {}: {}",
                self.event_type, self.timestamp, module, self.msg
            ),
            None => write!(f, "{} [{}] {}", self.event_type, self.timestamp, self.msg),
        }
    }
}

/// Clonable handle for emitting events; a closed receiver is ignored.
#[derive(Clone, Debug)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    pub async fn send_event(&self, event: Event) {
        let _ = self.sender.send(event).await;
    }
}
