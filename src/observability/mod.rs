//! Structured logging and optional OpenTelemetry span export.
//!
//! ```text
//! tracing macros → EnvFilter ─┬→ fmt layer → stderr
//!                             └→ tracing-opentelemetry → FileSpanExporter → OTLP JSON lines
//! ```
//!
//! The stderr layer is always on. File export is opt-in (`trace_export = true`)
//! and writes `ecobrowse-otlp.json` in the data directory, rotating by size.
//!
//! # Modules
//!
//! - [`init`]: Subscriber installation
//! - `tracer`: Tracer provider with the file exporter
//! - `span_formatter`: OTLP JSON encoding
//! - `file_writer`: Size-rotated line writer

mod file_writer;
mod init;
mod span_formatter;
mod tracer;

pub use file_writer::{RotationPolicy, DEFAULT_BACKUPS, DEFAULT_MAX_BYTES};
pub use init::{init_tracing, TracingGuard, TRACE_FILE_NAME};
