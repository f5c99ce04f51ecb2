//! Tracing subscriber setup.

use super::file_writer::RotationPolicy;
use super::tracer;
use crate::Config;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::resource::Resource;
use opentelemetry_sdk::trace::TracerProvider;
use std::path::PathBuf;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// File name of the OTLP trace export inside the data directory.
pub const TRACE_FILE_NAME: &str = "ecobrowse-otlp.json";

/// Keeps the span exporter alive; shuts it down on drop so the last spans are
/// written before the process exits.
#[derive(Debug, Default)]
#[must_use = "dropping the guard stops trace export"]
pub struct TracingGuard {
    provider: Option<TracerProvider>,
    trace_file: Option<PathBuf>,
}

impl TracingGuard {
    /// Path of the OTLP export, if file export is active.
    #[must_use]
    pub fn trace_file(&self) -> Option<&PathBuf> {
        self.trace_file.as_ref()
    }
}

impl Drop for TracingGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take() {
            let _ = provider.shutdown();
        }
    }
}

/// Installs the global subscriber.
///
/// The filter comes from `RUST_LOG` when set, else from `level_override`, else
/// from `config.trace_level`. Formatted events go to stderr. When
/// `config.trace_export` is on, spans are also exported as OTLP JSON to
/// [`TRACE_FILE_NAME`] in `data_dir`, rotated per the configured policy.
///
/// Calling this more than once is harmless: only the first subscriber is
/// installed.
pub fn init_tracing(config: &Config, data_dir: PathBuf, level_override: Option<&str>) -> TracingGuard {
    let level = level_override.unwrap_or(&config.trace_level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    let mut guard = TracingGuard::default();
    let otel_layer = if config.trace_export && std::fs::create_dir_all(&data_dir).is_ok() {
        let trace_file = data_dir.join(TRACE_FILE_NAME);
        let resource = Resource::new(vec![
            opentelemetry::KeyValue::new("service.name", "ecobrowse"),
            opentelemetry::KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
        ]);
        let policy = RotationPolicy {
            max_bytes: config.trace_max_bytes,
            backups: config.trace_backups,
        };
        let provider = tracer::create_tracer_provider(trace_file.clone(), policy, resource);
        let layer = OpenTelemetryLayer::new(provider.tracer("ecobrowse"));
        guard.provider = Some(provider);
        guard.trace_file = Some(trace_file);
        Some(layer)
    } else {
        None
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(otel_layer)
        .try_init();

    if let Some(path) = guard.trace_file() {
        tracing::debug!(path = ?path, "exporting spans");
    }
    guard
}
