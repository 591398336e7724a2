//! The primitive tree numbat layout populates.
//!
//! - **Tree** - arena of [`Primitive`]s linked by parent and sibling indices
//! - **Fonts** - [`FontProvider`] and [`FontMetrics`], including text fitting
//! - **Images** - natural sizes of image assets, possibly not yet known
//! - **Display list** - flattened absolute-coordinate drawing commands

pub mod display_list;
pub mod error;
pub mod font;
pub mod geometry;
pub mod image;
pub mod primitive;
pub mod tree;

pub use display_list::{DisplayCommand, DisplayList};
pub use error::DisplayError;
pub use font::{
    FixedPitchFont, FixedPitchFonts, Fit, FontChoice, FontHandle, FontMetrics, FontProvider,
};
pub use geometry::{LayoutRect, Radii, Size};
pub use image::ImageStore;
pub use primitive::{ImageRef, Primitive, PrimitiveId, PrimitiveKind, TextRun};
pub use tree::{DisplayTree, NodeView};
