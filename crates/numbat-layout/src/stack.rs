//! The layout stack.
//!
//! One [`Frame`] per open element, mirroring markup nesting, on top of a
//! root frame that stands for the viewport.

use std::collections::BTreeMap;

use numbat_common::Fx;
use numbat_css::{Cascade, EdgeKind, Edges, Keyword, StyleSet};
use numbat_display::{FontHandle, PrimitiveId};

/// A flow cursor: the next free insertion point in a frame's content box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    /// Horizontal position.
    pub x: Fx,
    /// Vertical position. Only ever grows.
    pub y: Fx,
}

/// Layout state of one open element.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Lowercase tag name; empty for the root frame.
    pub tag: String,
    /// Element attributes.
    pub attrs: BTreeMap<String, String>,
    /// Resolved style.
    pub style: StyleSet,
    /// Where the next inline or block content goes.
    pub cursor: Cursor,
    /// Largest horizontal extent reached so far. Never shrinks.
    pub widest: Fx,
    /// Resolved width of the block, padding included.
    pub content_width: Fx,
    /// The next inline primitive continues the current line.
    pub runon: bool,
    /// Font chosen for this element's text, resolved on first use.
    pub font: Option<FontHandle>,
    /// Background rectangle awaiting its final size.
    pub primitive: Option<PrimitiveId>,
    /// Establishes a container that primitives and lines are anchored to.
    pub container: bool,
    /// Inside a `display: none` subtree.
    pub hidden: bool,
}

impl Frame {
    /// A frame for an element that was just opened.
    #[must_use]
    pub fn new(
        tag: &str,
        attrs: BTreeMap<String, String>,
        style: StyleSet,
        parent_hidden: bool,
    ) -> Self {
        let tag = tag.to_ascii_lowercase();
        let hidden = parent_hidden || style.display() == Keyword::None;
        let container = tag == "div" && !hidden;
        Self {
            tag,
            attrs,
            style,
            cursor: Cursor::default(),
            widest: Fx::ZERO,
            content_width: Fx::ZERO,
            runon: false,
            font: None,
            primitive: None,
            container,
            hidden,
        }
    }

    /// The root frame for a viewport `width` wide.
    #[must_use]
    pub fn root(width: Fx) -> Self {
        Self {
            tag: String::new(),
            attrs: BTreeMap::new(),
            style: StyleSet::resolve("html", &StyleSet::new(), None),
            cursor: Cursor::default(),
            widest: Fx::ZERO,
            content_width: width,
            runon: false,
            font: None,
            primitive: None,
            container: true,
            hidden: false,
        }
    }

    /// `padding-*` in px.
    #[must_use]
    pub fn padding(&self, reference: Fx) -> Edges {
        self.style.edges(EdgeKind::Padding, reference)
    }

    /// `margin-*` in px (`auto` is 0).
    #[must_use]
    pub fn margin(&self, reference: Fx) -> Edges {
        self.style.edges(EdgeKind::Margin, reference)
    }

    /// Block-level boxes start on a new line and push the next sibling down.
    #[must_use]
    pub fn is_block(&self) -> bool {
        matches!(self.style.display(), Keyword::Block | Keyword::ListItem)
    }

    /// Raise `widest` to `extent` if it is larger.
    pub fn extend_widest(&mut self, extent: Fx) {
        self.widest = self.widest.max(extent);
    }
}

/// LIFO of frames; index 0 is always the root.
#[derive(Debug, Clone)]
pub struct LayoutStack {
    frames: Vec<Frame>,
}

impl LayoutStack {
    /// A stack holding only the root frame.
    #[must_use]
    pub fn new(viewport_width: Fx) -> Self {
        Self {
            frames: vec![Frame::root(viewport_width)],
        }
    }

    /// Index of the root frame.
    pub const ROOT: usize = 0;

    /// Push a frame for a newly opened element.
    pub fn push(&mut self, frame: Frame) -> usize {
        self.frames.push(frame);
        self.frames.len() - 1
    }

    /// Pop the innermost element frame. The root frame is never popped.
    pub fn pop(&mut self) -> Option<Frame> {
        if self.frames.len() <= 1 {
            log::error!(target: "numbat::layout", "pop with no open element");
            return None;
        }
        self.frames.pop()
    }

    /// Index of the innermost frame.
    #[must_use]
    pub fn top(&self) -> usize {
        self.frames.len().saturating_sub(1)
    }

    /// Number of frames, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// True when only the root frame remains.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.len() <= 1
    }

    /// The frame at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// Mutable access to the frame at `index`.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Frame> {
        self.frames.get_mut(index)
    }

    /// Nearest frame at or below `from` (or strictly below when `inclusive`
    /// is false) that establishes a container.
    #[must_use]
    pub fn nearest_container(&self, from: usize, inclusive: bool) -> Option<usize> {
        let end = if inclusive { from.checked_add(1)? } else { from };
        self.frames
            .get(..end.min(self.frames.len()))?
            .iter()
            .rposition(|frame| frame.container)
    }

    /// Iterate frames from the root outward.
    pub fn iter(&self) -> std::slice::Iter<'_, Frame> {
        self.frames.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(tag: &str, style: &str) -> Frame {
        let style = StyleSet::resolve(tag, &StyleSet::parse_inline(style), None);
        Frame::new(tag, BTreeMap::new(), style, false)
    }

    #[test]
    fn test_root_is_not_popped() {
        let mut stack = LayoutStack::new(Fx::from_whole(320));
        assert!(stack.pop().is_none());
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn test_nearest_container() {
        let mut stack = LayoutStack::new(Fx::from_whole(320));
        let div = stack.push(frame("div", ""));
        let span = stack.push(frame("span", ""));

        assert_eq!(stack.nearest_container(span, true), Some(div));
        assert_eq!(stack.nearest_container(div, true), Some(div));
        assert_eq!(stack.nearest_container(div, false), Some(LayoutStack::ROOT));
        assert_eq!(stack.nearest_container(LayoutStack::ROOT, false), None);
    }

    #[test]
    fn test_hidden_div_is_not_a_container() {
        let mut stack = LayoutStack::new(Fx::from_whole(320));
        let hidden = stack.push(frame("div", "display: none"));
        let inner = Frame::new("div", BTreeMap::new(), StyleSet::new(), true);
        let inner = stack.push(inner);

        assert!(stack.get(hidden).unwrap().hidden);
        assert!(!stack.get(inner).unwrap().container);
        assert_eq!(stack.nearest_container(inner, true), Some(LayoutStack::ROOT));
    }

    #[test]
    fn test_iter_searches_from_innermost() {
        let mut stack = LayoutStack::new(Fx::from_whole(320));
        let _ = stack.push(frame("div", ""));
        let inner = stack.push(frame("div", ""));
        let _ = stack.push(frame("span", ""));

        assert_eq!(stack.iter().rposition(|f| f.tag == "div"), Some(inner));
        assert_eq!(stack.iter().rev().count(), 4);
    }
}
