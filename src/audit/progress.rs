//! Progress notifications emitted while a run is in flight
//!
//! Events are transient and carry no persisted meaning. Delivery order matches emission
//! order: `discover-start`, `discover-complete`, then interleaved `page-start`,
//! `page-complete`, and `error` events as audits settle.

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;

/// A pipeline state transition
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum AuditProgressEvent {
    DiscoverStart {
        url: String,
    },
    DiscoverComplete {
        urls: Vec<String>,
    },
    PageStart {
        url: String,
        index: usize,
        total: usize,
    },
    PageComplete {
        url: String,
        index: usize,
        total: usize,
        performance: u32,
        accessibility: u32,
        seo: u32,
    },
    Error {
        url: String,
        message: String,
    },
}

impl AuditProgressEvent {
    /// The page URL this event concerns, if any
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::DiscoverStart { url }
            | Self::PageStart { url, .. }
            | Self::PageComplete { url, .. }
            | Self::Error { url, .. } => Some(url),
            Self::DiscoverComplete { .. } => None,
        }
    }
}

/// Receiver of progress events
///
/// Implemented for plain closures; [`channel_sink`] adapts an unbounded channel.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: AuditProgressEvent);
}

/// Forwards events into an unbounded channel, ignoring a dropped receiver
pub fn channel_sink(tx: UnboundedSender<AuditProgressEvent>) -> impl ProgressSink {
    move |event: AuditProgressEvent| {
        let _ = tx.send(event);
    }
}

impl<F> ProgressSink for F
where
    F: Fn(AuditProgressEvent) + Send + Sync,
{
    fn emit(&self, event: AuditProgressEvent) {
        self(event)
    }
}
