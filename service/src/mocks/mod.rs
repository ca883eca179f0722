//! Mock provider implementations for testing.
//!
//! In-memory implementations of all provider traits for unit and
//! integration tests.

pub mod notifier;
pub mod record_store;

pub use notifier::{RecordingNotifier, SentMessage};
pub use record_store::MockRecordStore;
