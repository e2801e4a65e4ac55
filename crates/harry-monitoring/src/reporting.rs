//! Error reporting.
//!
//! [`ErrorReporter`] is the seam where an external error-tracking service
//! plugs in. It is enabled by configuring a DSN; every captured event gets an
//! id, is logged through `tracing` with sanitized text, and is kept in a
//! small in-memory buffer that `/admin metrics` can show. When no DSN is
//! configured every call is a no-op.

use chrono::{DateTime, Utc};
use harry_common::{sanitize_for_log, truncate_string};
use harry_config::MonitoringConfig;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Recent events kept in memory.
const MAX_RECENT_EVENTS: usize = 50;

/// Severity of a captured event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportLevel {
    /// Informational.
    Info,
    /// Something unexpected but handled.
    Warning,
    /// A failure.
    Error,
}

impl fmt::Display for ReportLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// A captured error or message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEvent {
    /// Unique event id.
    pub id: Uuid,
    /// When it was captured.
    pub timestamp: DateTime<Utc>,
    /// Severity.
    pub level: ReportLevel,
    /// Sanitized message.
    pub message: String,
    /// Caller supplied context, values sanitized.
    pub context: BTreeMap<String, String>,
    /// Tags set on the reporter at capture time.
    pub tags: BTreeMap<String, String>,
    /// User the event is attributed to, if any.
    pub user: Option<String>,
    /// Deployment environment.
    pub environment: String,
}

#[derive(Debug, Default)]
struct ReporterState {
    tags: BTreeMap<String, String>,
    user: Option<String>,
    recent: VecDeque<ReportEvent>,
}

/// Captures errors and messages for later inspection.
#[derive(Debug)]
pub struct ErrorReporter {
    enabled: bool,
    environment: String,
    state: Mutex<ReporterState>,
}

impl ErrorReporter {
    /// Builds a reporter from configuration; disabled without a DSN.
    pub fn new(config: &MonitoringConfig) -> Self {
        let enabled = config
            .error_reporting_dsn
            .as_deref()
            .is_some_and(|dsn| !dsn.trim().is_empty());
        if enabled {
            info!("Error reporting enabled (environment: {})", config.environment);
        } else {
            info!("Error reporting disabled (no DSN configured)");
        }
        Self {
            enabled,
            environment: config.environment.clone(),
            state: Mutex::new(ReporterState::default()),
        }
    }

    /// A reporter that ignores everything.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            environment: String::new(),
            state: Mutex::new(ReporterState::default()),
        }
    }

    /// Whether events are being captured.
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Captures an error with optional context. Returns the event id.
    pub fn capture_error(
        &self,
        err: &(dyn std::error::Error + 'static),
        context: &[(&str, String)],
    ) -> Option<Uuid> {
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        self.capture(ReportLevel::Error, &message, context)
    }

    /// Captures a plain message. Returns the event id.
    pub fn capture_message(
        &self,
        message: &str,
        level: ReportLevel,
        context: &[(&str, String)],
    ) -> Option<Uuid> {
        self.capture(level, message, context)
    }

    /// Sets a tag attached to every later event.
    pub fn set_tag(&self, key: &str, value: &str) {
        if !self.enabled {
            return;
        }
        self.state
            .lock()
            .tags
            .insert(key.to_string(), truncate_string(value, 200));
    }

    /// Attributes later events to a user.
    pub fn set_user(&self, user_id: u64, username: Option<&str>) {
        if !self.enabled {
            return;
        }
        let user = match username {
            Some(name) => format!("{user_id} ({})", sanitize_for_log(name)),
            None => user_id.to_string(),
        };
        self.state.lock().user = Some(user);
    }

    /// Most recent events, newest last.
    pub fn recent_events(&self) -> Vec<ReportEvent> {
        self.state.lock().recent.iter().cloned().collect()
    }

    fn capture(&self, level: ReportLevel, message: &str, context: &[(&str, String)]) -> Option<Uuid> {
        if !self.enabled {
            return None;
        }
        let message = sanitize_for_log(message);
        let context: BTreeMap<String, String> = context
            .iter()
            .map(|(k, v)| ((*k).to_string(), sanitize_for_log(v)))
            .collect();

        let mut state = self.state.lock();
        let event = ReportEvent {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            level,
            message,
            context,
            tags: state.tags.clone(),
            user: state.user.clone(),
            environment: self.environment.clone(),
        };

        match level {
            ReportLevel::Error => error!(event_id = %event.id, "Reported error: {}", event.message),
            ReportLevel::Warning => warn!(event_id = %event.id, "Reported warning: {}", event.message),
            ReportLevel::Info => info!(event_id = %event.id, "Reported message: {}", event.message),
        }

        let id = event.id;
        state.recent.push_back(event);
        while state.recent.len() > MAX_RECENT_EVENTS {
            state.recent.pop_front();
        }
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harry_common::HarryError;

    fn enabled() -> ErrorReporter {
        ErrorReporter::new(&MonitoringConfig {
            error_reporting_dsn: Some("https://public@errors.example.com/1".to_string()),
            environment: "test".to_string(),
            slow_command_seconds: 5.0,
        })
    }

    #[test]
    fn test_disabled_reporter_is_a_no_op() {
        let reporter = ErrorReporter::new(&MonitoringConfig::default());
        assert!(!reporter.is_enabled());
        assert!(reporter
            .capture_message("hello", ReportLevel::Info, &[])
            .is_none());
        reporter.set_tag("command", "fun");
        assert!(reporter.recent_events().is_empty());
    }

    #[test]
    fn test_capture_error_includes_source_chain_and_context() {
        let reporter = enabled();
        reporter.set_tag("command", "admin budget");
        reporter.set_user(42, Some("Coach"));

        let err = HarryError::RetryExhausted {
            operation: "chat completion".to_string(),
            attempts: 3,
            source: Box::new(HarryError::network("timed out")),
        };
        let id = reporter
            .capture_error(&err, &[("guild", "123".to_string())])
            .unwrap();

        let events = reporter.recent_events();
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.id, id);
        assert_eq!(event.level, ReportLevel::Error);
        assert!(event.message.contains("failed after 3 attempts"));
        assert!(event.message.contains("timed out"));
        assert_eq!(event.context.get("guild").map(String::as_str), Some("123"));
        assert_eq!(event.tags.get("command").map(String::as_str), Some("admin budget"));
        assert_eq!(event.user.as_deref(), Some("42 (Coach)"));
        assert_eq!(event.environment, "test");
    }

    #[test]
    fn test_messages_are_sanitized() {
        let reporter = enabled();
        reporter.capture_message("leaked token=abc123", ReportLevel::Warning, &[]);
        let events = reporter.recent_events();
        assert!(!events[0].message.contains("abc123"));
    }

    #[test]
    fn test_recent_events_are_bounded() {
        let reporter = enabled();
        for i in 0..(MAX_RECENT_EVENTS + 5) {
            reporter.capture_message(&format!("event {i}"), ReportLevel::Info, &[]);
        }
        let events = reporter.recent_events();
        assert_eq!(events.len(), MAX_RECENT_EVENTS);
        assert_eq!(events[0].message, "event 5");
    }
}
