//! # AllocateMe Service
//!
//! The imperative shell around `allocateme-core`: storage and delivery
//! providers, dependency injection, and one operation per use case.
//!
//! ## Example
//!
//! ```
//! use allocateme_service::mocks::{MockRecordStore, RecordingNotifier};
//! use allocateme_service::{AllocateEnvironment, SignupConfig, SignupService};
//! use allocateme_core::environment::SystemClock;
//!
//! let env = AllocateEnvironment::new(
//!     MockRecordStore::new(),
//!     RecordingNotifier::new(),
//!     SystemClock,
//!     SignupConfig::default(),
//! );
//! let service = SignupService::new(env);
//! # let _ = service;
//! ```

pub mod config;
pub mod environment;
pub mod providers;
pub mod services;
pub mod views;

/// Mock providers for testing (enabled by the `test-utils` feature).
#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

pub use config::SignupConfig;
pub use environment::AllocateEnvironment;
pub use providers::{Notifier, RecordStore};
pub use services::SignupService;
