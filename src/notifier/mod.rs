//! Change notification for the record store.
//!
//! Independent views of the score history stay consistent through a single
//! named topic rather than shared references. The store publishes one event per
//! successful write; views subscribe, and also load explicitly on mount because
//! events published before they subscribed are not replayed.
//!
//! # Architecture
//!
//! ```text
//! RecordStore::append/clear ─► ChangeNotifier::publish ─► Subscription (per view)
//!                                     ▲
//! other process ─► file ─► StoreWatcher::poll
//! ```
//!
//! - `messages`: Event payloads with trace context propagation
//! - `hub`: The per-topic publish/subscribe channel
//! - `watch`: Polling bridge for writes made by other processes

pub mod hub;
pub mod messages;
pub mod watch;

pub use hub::{ChangeNotifier, Subscription};
pub use messages::{ChangeEvent, ChangeKind, TraceContext};
pub use watch::StoreWatcher;
