//! Arena primitive tree.
//!
//! The tree uses arena allocation with [`PrimitiveId`] indices for all
//! relationships. Each node records its parent and both siblings, so the
//! line finalizer can walk the current line backward from the most recent
//! primitive without holding references into the arena.
//!
//! Primitives are never removed; the tree owner drops the whole arena.

use std::collections::HashMap;

use numbat_common::Fx;
use numbat_css::Rgba;
use serde::Serialize;

use crate::error::DisplayError;
use crate::font::{Fit, FontHandle};
use crate::geometry::{LayoutRect, Radii};
use crate::image::ImageStore;
use crate::primitive::{ImageRef, Primitive, PrimitiveId, PrimitiveKind, TextRun};

/// The primitive tree populated by layout.
#[derive(Debug, Default)]
pub struct DisplayTree {
    nodes: Vec<Primitive>,
    /// Children of the (implicit) root, in creation order.
    top: Vec<PrimitiveId>,
    ids: HashMap<String, PrimitiveId>,
    limit: Option<usize>,
}

impl DisplayTree {
    /// An empty, unbounded tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty tree refusing to hold more than `limit` primitives.
    #[must_use]
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    /// Get a primitive by its id.
    #[must_use]
    pub fn get(&self, id: PrimitiveId) -> Option<&Primitive> {
        self.nodes.get(id.0)
    }

    /// Get a mutable reference to a primitive by its id.
    pub fn get_mut(&mut self, id: PrimitiveId) -> Option<&mut Primitive> {
        self.nodes.get_mut(id.0)
    }

    /// Number of primitives.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when nothing was created yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Children of `parent`; `None` lists the top-level primitives.
    #[must_use]
    pub fn children(&self, parent: Option<PrimitiveId>) -> &[PrimitiveId] {
        match parent {
            None => &self.top,
            Some(id) => self.get(id).map_or(&[], |p| p.children.as_slice()),
        }
    }

    /// The most recently created child of `parent`.
    #[must_use]
    pub fn last_child(&self, parent: Option<PrimitiveId>) -> Option<PrimitiveId> {
        self.children(parent).last().copied()
    }

    /// Get the parent of a primitive.
    #[must_use]
    pub fn parent(&self, id: PrimitiveId) -> Option<PrimitiveId> {
        self.get(id).and_then(|p| p.parent)
    }

    /// Get the previous sibling of a primitive.
    #[must_use]
    pub fn prev_sibling(&self, id: PrimitiveId) -> Option<PrimitiveId> {
        self.get(id).and_then(|p| p.prev_sibling)
    }

    /// Get the next sibling of a primitive.
    #[must_use]
    pub fn next_sibling(&self, id: PrimitiveId) -> Option<PrimitiveId> {
        self.get(id).and_then(|p| p.next_sibling)
    }

    /// Iterate `id` and then its preceding siblings, nearest first.
    #[must_use]
    pub fn preceding_siblings(&self, id: PrimitiveId) -> PrecedingSiblings<'_> {
        PrecedingSiblings {
            tree: self,
            current: Some(id),
        }
    }

    /// Iterate `id` and then its following siblings.
    #[must_use]
    pub fn following_siblings(&self, id: PrimitiveId) -> FollowingSiblings<'_> {
        FollowingSiblings {
            tree: self,
            current: Some(id),
        }
    }

    /// Every primitive in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (PrimitiveId, &Primitive)> {
        self.nodes.iter().enumerate().map(|(i, p)| (PrimitiveId(i), p))
    }

    /// The box of `id`.
    ///
    /// # Errors
    ///
    /// [`DisplayError::UnknownPrimitive`] for an id from another tree.
    pub fn bbox(&self, id: PrimitiveId) -> Result<LayoutRect, DisplayError> {
        self.get(id)
            .map(|p| p.bbox)
            .ok_or(DisplayError::UnknownPrimitive(id))
    }

    /// Mutable access to the box of `id`.
    ///
    /// # Errors
    ///
    /// [`DisplayError::UnknownPrimitive`] for an id from another tree.
    pub fn bbox_mut(&mut self, id: PrimitiveId) -> Result<&mut LayoutRect, DisplayError> {
        self.get_mut(id)
            .map(|p| &mut p.bbox)
            .ok_or(DisplayError::UnknownPrimitive(id))
    }

    /// Allocate a primitive and append it as the last child of `parent`.
    fn append(
        &mut self,
        parent: Option<PrimitiveId>,
        bbox: LayoutRect,
        kind: PrimitiveKind,
    ) -> Result<PrimitiveId, DisplayError> {
        if let Some(limit) = self.limit
            && self.nodes.len() >= limit
        {
            return Err(DisplayError::Exhausted { limit });
        }
        if let Some(parent) = parent
            && self.get(parent).is_none()
        {
            return Err(DisplayError::UnknownPrimitive(parent));
        }

        let id = PrimitiveId(self.nodes.len());
        let prev_sibling = self.last_child(parent);
        self.nodes.push(Primitive {
            kind,
            bbox,
            parent,
            children: Vec::new(),
            prev_sibling,
            next_sibling: None,
            runon: false,
            id_tag: None,
        });

        if let Some(prev) = prev_sibling {
            self.nodes[prev.0].next_sibling = Some(id);
        }
        match parent {
            None => self.top.push(id),
            Some(parent) => self.nodes[parent.0].children.push(id),
        }
        Ok(id)
    }

    /// Create a filled rectangle under `parent`.
    ///
    /// # Errors
    ///
    /// [`DisplayError::Exhausted`] at the primitive limit.
    pub fn create_rect(
        &mut self,
        parent: Option<PrimitiveId>,
        bbox: LayoutRect,
        radii: Radii,
        color: Rgba,
    ) -> Result<PrimitiveId, DisplayError> {
        self.append(parent, bbox, PrimitiveKind::Rect { radii, color })
    }

    /// Create an empty text run under `parent`; fill it with
    /// [`DisplayTree::update_text`].
    ///
    /// # Errors
    ///
    /// [`DisplayError::Exhausted`] at the primitive limit.
    pub fn create_text(
        &mut self,
        parent: Option<PrimitiveId>,
        bbox: LayoutRect,
        font: FontHandle,
        color: Rgba,
    ) -> Result<PrimitiveId, DisplayError> {
        self.append(parent, bbox, PrimitiveKind::Text(TextRun::new(font, color)))
    }

    /// Create an image placement under `parent`.
    ///
    /// # Errors
    ///
    /// [`DisplayError::Exhausted`] at the primitive limit.
    pub fn create_image(
        &mut self,
        parent: Option<PrimitiveId>,
        bbox: LayoutRect,
        url: String,
        deferred: bool,
    ) -> Result<PrimitiveId, DisplayError> {
        self.append(parent, bbox, PrimitiveKind::Image(ImageRef { url, deferred }))
    }

    /// Fit as much of `text` as the run's font allows in `fit_width`, store
    /// the consumed part and set the box to its bounding size.
    ///
    /// A fit that ends past the text or inside a character consumes
    /// nothing.
    ///
    /// # Errors
    ///
    /// [`DisplayError::UnknownPrimitive`] or [`DisplayError::NotText`].
    pub fn update_text(
        &mut self,
        id: PrimitiveId,
        text: &str,
        fit_width: Fx,
    ) -> Result<Fit, DisplayError> {
        let node = self
            .nodes
            .get_mut(id.0)
            .ok_or(DisplayError::UnknownPrimitive(id))?;
        let run = node.as_text_mut().ok_or(DisplayError::NotText(id))?;

        let fit = run.font.fit(text, fit_width);
        let Some(consumed) = text.get(..fit.consumed) else {
            log::error!(
                target: "numbat::font",
                "font fit took {} of {} bytes, not a char boundary",
                fit.consumed,
                text.len()
            );
            run.text.clear();
            node.bbox.w = Fx::ZERO;
            node.bbox.h = fit.height;
            return Ok(Fit {
                consumed: 0,
                wrapped: false,
                width: Fx::ZERO,
                height: fit.height,
            });
        };
        run.text = consumed.trim_end_matches('\n').to_string();
        node.bbox.w = fit.width;
        node.bbox.h = fit.height;
        Ok(fit)
    }

    /// Store an author identifier on `id` and index it.
    ///
    /// A later primitive with the same identifier takes over the index.
    pub fn tag_id(&mut self, id: PrimitiveId, identifier: &str) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.id_tag = Some(identifier.to_string());
            let _ = self.ids.insert(identifier.to_string(), id);
        }
    }

    /// The primitive tagged with `identifier`.
    #[must_use]
    pub fn by_id(&self, identifier: &str) -> Option<PrimitiveId> {
        self.ids.get(identifier).copied()
    }

    /// Give deferred images their natural size once `images` knows it.
    ///
    /// Returns how many images were resolved.
    pub fn resolve_images(&mut self, images: &ImageStore) -> usize {
        let mut resolved = 0;
        for node in &mut self.nodes {
            if let PrimitiveKind::Image(image) = &mut node.kind
                && image.deferred
                && let Some(size) = images.natural_size(&image.url)
            {
                image.deferred = false;
                node.bbox.w = size.w;
                node.bbox.h = size.h;
                resolved += 1;
            }
        }
        resolved
    }

    /// A nested, serializable view of the tree.
    #[must_use]
    pub fn view(&self) -> Vec<NodeView<'_>> {
        self.children(None).iter().map(|id| self.view_of(*id)).collect()
    }

    fn view_of(&self, id: PrimitiveId) -> NodeView<'_> {
        let node = &self.nodes[id.0];
        NodeView {
            id,
            primitive: &node.kind,
            bbox: node.bbox,
            runon: node.runon,
            id_tag: node.id_tag.as_deref(),
            children: node.children.iter().map(|c| self.view_of(*c)).collect(),
        }
    }
}

/// Borrowed nested view of one primitive, for inspection output.
#[derive(Debug, Serialize)]
pub struct NodeView<'a> {
    /// Arena index.
    pub id: PrimitiveId,
    /// What is drawn.
    #[serde(flatten)]
    pub primitive: &'a PrimitiveKind,
    /// Box relative to the parent.
    pub bbox: LayoutRect,
    /// Continues the previous sibling's line.
    pub runon: bool,
    /// Author identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_tag: Option<&'a str>,
    /// Nested children.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeView<'a>>,
}

/// Iterator over a primitive and its preceding siblings.
pub struct PrecedingSiblings<'a> {
    tree: &'a DisplayTree,
    current: Option<PrimitiveId>,
}

impl Iterator for PrecedingSiblings<'_> {
    type Item = PrimitiveId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.prev_sibling(id);
        Some(id)
    }
}

/// Iterator over a primitive and its following siblings.
pub struct FollowingSiblings<'a> {
    tree: &'a DisplayTree,
    current: Option<PrimitiveId>,
}

impl Iterator for FollowingSiblings<'_> {
    type Item = PrimitiveId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.next_sibling(id);
        Some(id)
    }
}
