//! Axum HTTP surface for AllocateMe.
//!
//! Handlers are thin: they pull ids, credentials and typed bodies out of the
//! request, call one [`SignupService`](allocateme_service::SignupService)
//! operation and map the outcome to a response.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         Imperative Shell (Axum)         │  ← HTTP, JSON, CSV
//! │  - Credential + body extraction         │  ← 400 / 401 / 403 mapping
//! ├─────────────────────────────────────────┤
//! │         SignupService                   │  ← storage, notifier, clock
//! ├─────────────────────────────────────────┤
//! │         Functional Core                 │  ← validation, lifecycle,
//! │                                         │    serial dictatorship
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! let service = SignupService::new(AllocateEnvironment::new(store, notifier, SystemClock, config));
//! let app = allocateme_web::router(AppState::new(service));
//! axum::serve(listener, app).await?;
//! ```

#![forbid(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::AppError;
pub use extractors::{AdminCredential, JsonBody};
pub use router::router;
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
