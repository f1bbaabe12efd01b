//! Core types and trait definitions for the carelog incident register.
//!
//! This crate has no HTTP or database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// Native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod account;
pub mod error;
pub mod id;
pub mod incident;
pub mod lifecycle;
pub mod register;
pub mod store;
pub mod validate;

pub use error::{Error, Result};
pub use register::IncidentRegister;
