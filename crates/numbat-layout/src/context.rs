//! The layout context: per-document state threaded through every event.

use numbat_common::Fx;
use numbat_display::{DisplayTree, FontChoice, FontProvider, ImageStore, Size};

use crate::config::LayoutConfig;
use crate::stack::{Frame, LayoutStack};

/// State of one document layout.
///
/// Owns the layout stack and, for the caller's convenience, the primitive
/// tree it populates. Layout only ever appends to the tree and moves
/// primitives; it never removes them.
pub struct LayoutContext {
    pub(crate) viewport: Size,
    pub(crate) base_url: Option<String>,
    pub(crate) default_font: FontChoice,
    pub(crate) tree: DisplayTree,
    pub(crate) images: ImageStore,
    pub(crate) fonts: Box<dyn FontProvider>,
    pub(crate) stack: LayoutStack,
    pub(crate) aborted: bool,
}

impl LayoutContext {
    /// A fresh context for `config`, choosing fonts from `fonts`.
    #[must_use]
    pub fn new(config: &LayoutConfig, fonts: Box<dyn FontProvider>) -> Self {
        let viewport = Size {
            w: config.viewport_width,
            h: config.viewport_height,
        };
        Self {
            viewport,
            base_url: config.base_url.clone(),
            default_font: config.default_font(),
            tree: DisplayTree::with_limit(config.primitive_limit),
            images: config.image_store(),
            fonts,
            stack: LayoutStack::new(viewport.w),
            aborted: false,
        }
    }

    /// Viewport size.
    #[must_use]
    pub const fn viewport(&self) -> Size {
        self.viewport
    }

    /// The primitive tree built so far.
    #[must_use]
    pub const fn tree(&self) -> &DisplayTree {
        &self.tree
    }

    /// Mutable access to the primitive tree.
    pub const fn tree_mut(&mut self) -> &mut DisplayTree {
        &mut self.tree
    }

    /// Give up the primitive tree.
    #[must_use]
    pub fn into_tree(self) -> DisplayTree {
        self.tree
    }

    /// The image store.
    #[must_use]
    pub const fn images(&self) -> &ImageStore {
        &self.images
    }

    /// Mutable access to the image store.
    pub const fn images_mut(&mut self) -> &mut ImageStore {
        &mut self.images
    }

    /// The layout stack.
    #[must_use]
    pub const fn stack(&self) -> &LayoutStack {
        &self.stack
    }

    /// Mutable access to the layout stack.
    pub const fn stack_mut(&mut self) -> &mut LayoutStack {
        &mut self.stack
    }

    /// True after a fatal error or a `Failed` notification.
    #[must_use]
    pub const fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// The frame at `index`, which callers obtained from the stack.
    pub(crate) fn frame(&self, index: usize) -> Option<&Frame> {
        self.stack.get(index)
    }

    pub(crate) fn frame_mut(&mut self, index: usize) -> Option<&mut Frame> {
        self.stack.get_mut(index)
    }

    /// Width that percentages in the style of frame `index` resolve
    /// against: the content width of its nearest enclosing container, or
    /// the viewport width for the root.
    pub(crate) fn percent_reference(&self, index: usize) -> Fx {
        self.stack
            .nearest_container(index, false)
            .and_then(|container| self.frame(container))
            .map_or(self.viewport.w, |frame| frame.content_width)
    }

    /// The available width for a block whose style may name a width.
    ///
    /// An explicit `width` wins, otherwise the viewport width.
    pub(crate) fn explicit_or_viewport_width(&self, index: usize) -> Fx {
        use numbat_css::{Cascade, PropertyId};

        let reference = self.percent_reference(index);
        self.frame(index)
            .and_then(|f| f.style.explicit_px(PropertyId::Width, reference))
            .unwrap_or(self.viewport.w)
    }
}

impl std::fmt::Debug for LayoutContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutContext")
            .field("viewport", &self.viewport)
            .field("base_url", &self.base_url)
            .field("primitives", &self.tree.len())
            .field("depth", &self.stack.len())
            .field("aborted", &self.aborted)
            .finish_non_exhaustive()
    }
}
