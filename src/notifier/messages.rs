//! Change event payloads carried on the store topic.
//!
//! Events are serializable so they can cross a process boundary unchanged, and
//! carry an optional trace context so an observer's handling span can be linked
//! to the span that performed the write.

use crate::domain::ScoreRecord;
use serde::{Deserialize, Serialize};

/// Distributed tracing context for cross-context span propagation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceContext {
    /// OpenTelemetry trace ID as a hex string.
    pub trace_id: String,

    /// Span ID of the publishing span.
    pub parent_span_id: String,
}

impl TraceContext {
    /// Captures the trace and span IDs of the active tracing span.
    ///
    /// Returns `None` when no OpenTelemetry layer is installed or the span is
    /// not sampled.
    #[must_use]
    pub fn from_current() -> Option<Self> {
        use opentelemetry::trace::TraceContextExt;
        use tracing_opentelemetry::OpenTelemetrySpanExt;

        let otel_context = tracing::Span::current().context();
        let span_ref = otel_context.span();
        let span_context = span_ref.span_context();

        if !span_context.is_valid() {
            return None;
        }

        Some(Self {
            trace_id: format!("{:032x}", span_context.trace_id()),
            parent_span_id: format!("{:016x}", span_context.span_id()),
        })
    }

    /// Attaches this context as the remote parent for spans created while the
    /// returned guard is alive.
    #[must_use]
    pub fn attach(&self) -> Option<opentelemetry::ContextGuard> {
        use opentelemetry::trace::{
            SpanContext, SpanId, TraceContextExt, TraceFlags, TraceId, TraceState,
        };

        let trace_id = TraceId::from_hex(&self.trace_id).ok()?;
        let span_id = SpanId::from_hex(&self.parent_span_id).ok()?;

        let span_context = SpanContext::new(
            trace_id,
            span_id,
            TraceFlags::SAMPLED,
            true,
            TraceState::default(),
        );

        Some(
            opentelemetry::Context::current()
                .with_remote_span_context(span_context)
                .attach(),
        )
    }
}

/// What happened to the record collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ChangeKind {
    /// A record was appended; carries the full collection, newest-first.
    Updated {
        /// Collection after the write.
        snapshot: Vec<ScoreRecord>,
    },

    /// The collection was emptied.
    Cleared,
}

impl ChangeKind {
    /// Whether this change emptied the store.
    #[must_use]
    pub const fn is_cleared(&self) -> bool {
        matches!(self, Self::Cleared)
    }

    /// The post-write collection, `None` for a clear.
    #[must_use]
    pub fn snapshot(&self) -> Option<&[ScoreRecord]> {
        match self {
            Self::Updated { snapshot } => Some(snapshot),
            Self::Cleared => None,
        }
    }
}

/// One notification on a named topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Topic (storage key) the change belongs to.
    pub topic: String,

    /// The change itself.
    #[serde(flatten)]
    pub kind: ChangeKind,

    /// Trace context of the publisher.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub trace_context: Option<TraceContext>,
}

impl ChangeEvent {
    /// Creates an event stamped with the current trace context.
    #[must_use]
    pub fn new(topic: impl Into<String>, kind: ChangeKind) -> Self {
        Self {
            topic: topic.into(),
            kind,
            trace_context: TraceContext::from_current(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleared_serializes_without_snapshot() {
        let event = ChangeEvent {
            topic: "ecoBrowseReports".to_string(),
            kind: ChangeKind::Cleared,
            trace_context: None,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json, serde_json::json!({ "topic": "ecoBrowseReports", "kind": "cleared" }));
    }

    #[test]
    fn updated_round_trips_through_json() {
        let record = ScoreRecord::new(5, "https://a.com", 0.5).unwrap();
        let event = ChangeEvent {
            topic: "t".to_string(),
            kind: ChangeKind::Updated {
                snapshot: vec![record],
            },
            trace_context: None,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"kind\":\"updated\""));
        let back: ChangeEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn no_trace_context_without_otel_layer() {
        assert!(TraceContext::from_current().is_none());
    }

    #[test]
    fn attach_rejects_malformed_ids() {
        let context = TraceContext {
            trace_id: "zz".to_string(),
            parent_span_id: "00".to_string(),
        };
        assert!(context.attach().is_none());
    }
}
