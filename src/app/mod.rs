//! Application layer coordinating dashboard state, events and actions.
//!
//! The layer follows a unidirectional data flow:
//!
//! ```text
//! User intent → Event → handle_event → State mutation → Actions → Dashboard
//!                  ↑                                                  │
//!                  └──────────── action outcomes / store changes ─────┘
//! ```
//!
//! # Modules
//!
//! - [`actions`]: Side effect commands emitted by the event handler
//! - [`handler`]: Event processing and state transitions
//! - [`runtime`]: Executes actions against the store, scorer and advisor
//! - [`state`]: Dashboard state container and user notices

pub mod actions;
pub mod handler;
pub mod runtime;
pub mod state;

pub use actions::Action;
pub use handler::{handle_event, Event};
pub use runtime::Dashboard;
pub use state::{DashboardState, Notice, NoticeLevel};
