//! Display List - a flat sequence of drawing commands
//!
//! [CSS 2.1 Appendix E](https://www.w3.org/TR/CSS2/zindex.html)
//!
//! Primitive boxes are relative to their parent. Flattening resolves every
//! box to absolute device coordinates and emits commands in tree order
//! (parents before children), which is back to front for this tree.

use numbat_common::Fx;
use numbat_css::Rgba;
use serde::Serialize;

use crate::geometry::Radii;
use crate::primitive::{PrimitiveId, PrimitiveKind};
use crate::tree::DisplayTree;

/// A single drawing command in absolute coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DisplayCommand {
    /// Fill a rectangle with a solid color.
    FillRect {
        /// X coordinate of the rectangle's top-left corner.
        x: Fx,
        /// Y coordinate of the rectangle's top-left corner.
        y: Fx,
        /// Width of the rectangle in pixels.
        width: Fx,
        /// Height of the rectangle in pixels.
        height: Fx,
        /// Fill color.
        color: Rgba,
        /// [§ 5 'border-radius'](https://www.w3.org/TR/css-backgrounds-3/#border-radius)
        radii: Radii,
    },

    /// Draw text.
    DrawText {
        /// X coordinate of the run's left edge.
        x: Fx,
        /// Y coordinate of the run's top edge.
        y: Fx,
        /// Y coordinate of the baseline.
        baseline: Fx,
        /// The text content to draw.
        text: String,
        /// Line height of the font.
        font_height: Fx,
        /// Text color.
        color: Rgba,
    },

    /// Draw an image at a position.
    DrawImage {
        /// X coordinate of the image's top-left corner.
        x: Fx,
        /// Y coordinate of the image's top-left corner.
        y: Fx,
        /// Rendered width of the image in pixels.
        width: Fx,
        /// Rendered height of the image in pixels.
        height: Fx,
        /// Resolved URL, the lookup key for image data.
        src: String,
    },
}

/// A list of display commands to execute in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DisplayList {
    commands: Vec<DisplayCommand>,
}

impl DisplayList {
    /// Create an empty display list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Flatten `tree` into absolute-coordinate commands.
    ///
    /// Deferred images and empty text runs produce no command.
    #[must_use]
    pub fn from_tree(tree: &DisplayTree) -> Self {
        let mut list = Self::new();
        for id in tree.children(None) {
            list.flatten(tree, *id, Fx::ZERO, Fx::ZERO);
        }
        list
    }

    fn flatten(&mut self, tree: &DisplayTree, id: PrimitiveId, ox: Fx, oy: Fx) {
        let Some(node) = tree.get(id) else {
            return;
        };
        let bbox = node.bbox.translated(ox, oy);

        match &node.kind {
            PrimitiveKind::Rect { radii, color } => self.push(DisplayCommand::FillRect {
                x: bbox.x,
                y: bbox.y,
                width: bbox.w,
                height: bbox.h,
                color: *color,
                radii: *radii,
            }),
            PrimitiveKind::Text(run) if !run.text.is_empty() => {
                self.push(DisplayCommand::DrawText {
                    x: bbox.x,
                    y: bbox.y,
                    baseline: bbox.y + run.ascent,
                    text: run.text.clone(),
                    font_height: run.height,
                    color: run.color,
                });
            }
            PrimitiveKind::Image(image) if !image.deferred => {
                self.push(DisplayCommand::DrawImage {
                    x: bbox.x,
                    y: bbox.y,
                    width: bbox.w,
                    height: bbox.h,
                    src: image.url.clone(),
                });
            }
            PrimitiveKind::Text(_) | PrimitiveKind::Image(_) => {}
        }

        for child in &node.children {
            self.flatten(tree, *child, bbox.x, bbox.y);
        }
    }

    /// Add a command to the display list.
    pub fn push(&mut self, command: DisplayCommand) {
        self.commands.push(command);
    }

    /// Get the commands in painting order.
    #[must_use]
    pub fn commands(&self) -> &[DisplayCommand] {
        &self.commands
    }

    /// Get the number of commands.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check if the display list is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
