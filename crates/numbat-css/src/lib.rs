//! Resolved style for the numbat layout engine.
//!
//! - **Properties** - the [`PropertyId`] vocabulary the layout reacts to
//! - **Values** - colours, lengths, keywords and their parsing
//! - **Cascade** - the [`Cascade`] accessor and the per-element [`StyleSet`]
//! - **UA defaults** - default `display` and heading typography

pub mod cascade;
pub mod property;
pub mod ua;
pub mod values;

pub use cascade::{Cascade, EdgeKind, Edges, StyleSet};
pub use property::PropertyId;
pub use values::{CssError, Keyword, Length, PropValue, Rgba, Unit, parse_value};
