//! Drawable primitives.
//!
//! A primitive is one drawable unit: a filled rectangle, a run of text or an
//! image. Primitives are nodes in a [`DisplayTree`](crate::DisplayTree);
//! their boxes are relative to their parent's box.

use numbat_common::Fx;
use numbat_css::Rgba;
use serde::Serialize;

use crate::font::FontHandle;
use crate::geometry::{LayoutRect, Radii};

/// A type-safe index into the primitive arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PrimitiveId(pub usize);

/// A text run and its intrinsic metrics.
#[derive(Debug, Clone, Serialize)]
pub struct TextRun {
    /// The consumed text, empty until the run is updated.
    pub text: String,
    /// Font the run is measured and drawn with.
    #[serde(skip)]
    pub font: FontHandle,
    /// Text colour.
    pub color: Rgba,
    /// Whether the run may wrap at soft opportunities.
    pub word_wrap: bool,
    /// The font's ascent.
    pub ascent: Fx,
    /// The font's line height.
    pub height: Fx,
    /// Shared ascent of the line this run was grouped into.
    pub group_ascent: Option<Fx>,
    /// Shared height of the line this run was grouped into.
    pub group_height: Option<Fx>,
}

impl TextRun {
    /// An empty run for `font`.
    #[must_use]
    pub fn new(font: FontHandle, color: Rgba) -> Self {
        let ascent = font.ascent();
        let height = font.line_height();
        Self {
            text: String::new(),
            font,
            color,
            word_wrap: false,
            ascent,
            height,
            group_ascent: None,
            group_height: None,
        }
    }
}

/// An image placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRef {
    /// Resolved URL of the asset.
    pub url: String,
    /// True while the size waits on the asset's natural size.
    pub deferred: bool,
}

/// What a primitive draws.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PrimitiveKind {
    /// A filled, optionally rounded rectangle.
    Rect {
        /// Corner radii clockwise from top-left.
        radii: Radii,
        /// Fill colour.
        color: Rgba,
    },
    /// A run of text.
    Text(TextRun),
    /// An image.
    Image(ImageRef),
}

/// One node of the primitive tree.
#[derive(Debug, Clone)]
pub struct Primitive {
    /// What is drawn.
    pub kind: PrimitiveKind,
    /// Box relative to the parent primitive.
    pub bbox: LayoutRect,
    /// Parent, or `None` for top-level primitives.
    pub parent: Option<PrimitiveId>,
    /// Children in creation order.
    pub children: Vec<PrimitiveId>,
    /// The sibling created just before this one under the same parent.
    pub prev_sibling: Option<PrimitiveId>,
    /// The sibling created just after this one under the same parent.
    pub next_sibling: Option<PrimitiveId>,
    /// True when this primitive continues the line of its previous sibling.
    pub runon: bool,
    /// Author identifier (`id` attribute), if tagged.
    pub id_tag: Option<String>,
}

impl Primitive {
    /// The text run, if this is one.
    #[must_use]
    pub const fn as_text(&self) -> Option<&TextRun> {
        match &self.kind {
            PrimitiveKind::Text(run) => Some(run),
            _ => None,
        }
    }

    /// Mutable access to the text run, if this is one.
    pub fn as_text_mut(&mut self) -> Option<&mut TextRun> {
        match &mut self.kind {
            PrimitiveKind::Text(run) => Some(run),
            _ => None,
        }
    }

    /// True for text runs.
    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self.kind, PrimitiveKind::Text(_))
    }
}
