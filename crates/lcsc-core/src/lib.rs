//! Core types, algorithms and trait definitions for the LCSC scheduler.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it.
//!
//! The interesting part is [`availability`]: given every person's declared
//! events, it works out how many people are free in each operating hour of a
//! multi-week window.

// Store traits declare `Send` futures explicitly; implementations and test
// doubles use plain `async fn`.
#![allow(async_fn_in_trait)]

pub mod availability;
pub mod error;
pub mod event;
pub mod normalize;
pub mod person;
pub mod report;
pub mod role;
pub mod store;
pub mod time;

pub use error::{Error, Result};
