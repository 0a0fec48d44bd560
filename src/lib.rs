//! Dayplan: LLM-backed schedule planning service.
//!
//! A small HTTP backend that turns free-form activity lists into concrete
//! day schedules. The flow for every planning request:
//! Request → Prompt → Chat completion → Sanitize → Validate → Reconcile
//!
//! # Architecture
//!
//! - **gateway**: axum routes, request parsing, the success envelope
//! - **schedule**: the pure core (wire types, sanitizer, validator,
//!   identity matcher, reconciler, prompt builder)
//! - **completion**: OpenAI-compatible chat-completion client
//! - **cloudkit**: CloudKit web-services relay for vote records
//! - **config**: environment-driven deployment settings
//!
//! The service is stateless; the caller holds the schedule between
//! requests and sends it back for updates.

pub mod cloudkit;
pub mod completion;
pub mod config;
pub mod error;
pub mod gateway;
pub mod schedule;

pub use config::AppConfig;
pub use error::{ApiError, Result};
pub use gateway::{AppState, router};
