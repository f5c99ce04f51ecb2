//! Tracer provider backed by a file span exporter.

use super::file_writer::{RotatingFileWriter, RotationPolicy};
use super::span_formatter::SpanFormatter;
use futures_util::future::BoxFuture;
use opentelemetry::trace::TraceError;
use opentelemetry_sdk::export::trace::{ExportResult, SpanData, SpanExporter};
use opentelemetry_sdk::resource::Resource;
use opentelemetry_sdk::trace::TracerProvider;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

/// Writes each exported batch as one OTLP JSON line.
struct FileSpanExporter {
    writer: RotatingFileWriter,
    formatter: SpanFormatter,
    is_shutdown: AtomicBool,
}

impl SpanExporter for FileSpanExporter {
    fn export(&mut self, batch: Vec<SpanData>) -> BoxFuture<'static, ExportResult> {
        let result = if self.is_shutdown.load(Ordering::SeqCst) {
            Err(TraceError::from("exporter is shut down"))
        } else {
            let line = self.formatter.format_batch(&batch).to_string();
            self.writer
                .write_line(&line)
                .map_err(|e| TraceError::from(e.to_string()))
        };
        Box::pin(std::future::ready(result))
    }

    fn shutdown(&mut self) {
        self.is_shutdown.store(true, Ordering::SeqCst);
    }
}

impl std::fmt::Debug for FileSpanExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSpanExporter")
            .field("writer", &self.writer)
            .field("is_shutdown", &self.is_shutdown)
            .finish_non_exhaustive()
    }
}

/// Builds a provider that exports each span to `file_path` as it closes.
#[must_use]
pub fn create_tracer_provider(file_path: PathBuf, policy: RotationPolicy, resource: Resource) -> TracerProvider {
    let exporter = FileSpanExporter {
        writer: RotatingFileWriter::new(file_path, policy),
        formatter: SpanFormatter::new(resource.clone()),
        is_shutdown: AtomicBool::new(false),
    };

    TracerProvider::builder()
        .with_config(opentelemetry_sdk::trace::Config::default().with_resource(resource))
        .with_simple_exporter(exporter)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::FutureExt;
    use tempfile::TempDir;

    fn exporter(path: PathBuf) -> FileSpanExporter {
        FileSpanExporter {
            writer: RotatingFileWriter::new(path, RotationPolicy::default()),
            formatter: SpanFormatter::new(Resource::empty()),
            is_shutdown: AtomicBool::new(false),
        }
    }

    #[test]
    fn writes_one_line_per_batch() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trace.json");
        let mut exporter = exporter(path.clone());

        for _ in 0..2 {
            let result = exporter.export(Vec::new()).now_or_never().unwrap();
            assert!(result.is_ok());
        }

        let written = std::fs::read_to_string(path).unwrap();
        assert_eq!(written.lines().count(), 2);
    }

    #[test]
    fn refuses_export_after_shutdown() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trace.json");
        let mut exporter = exporter(path.clone());

        exporter.shutdown();
        let result = exporter.export(Vec::new()).now_or_never().unwrap();
        assert!(result.is_err());
        assert!(!path.exists());
    }
}
