//! Common utilities for the numbat layout engine.
//!
//! This crate provides shared infrastructure used by all layout components:
//! - **Fixed point** - the saturating [`Fx`] value every length is expressed in
//! - **Warning System** - deduplicated diagnostics for unsupported input
//! - **URL resolution** - relative resource references against a base URL

pub mod fx;
pub mod url;
pub mod warning;

pub use fx::{Fx, ParseFxError};
