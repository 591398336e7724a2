//! The box/flow dispatcher.
//!
//! One call per markup event. The caller keeps the layout stack in step
//! with the markup: it pushes a [`Frame`](crate::Frame) before dispatching
//! [`Reason::ElementStart`] and pops it after [`Reason::ElementEnd`].
//!
//! Element events work against the element's own frame (`ps`, the top of
//! the stack) and the nearest container strictly below it (`psb`). Content
//! events look for the container starting at the innermost element itself,
//! since text is a child of that element.

use std::rc::Rc;

use numbat_common::Fx;
use numbat_common::url::resolve_url;
use numbat_common::warning::warn_once;
use numbat_css::{Cascade, Keyword, PropertyId, Rgba};
use numbat_display::{LayoutRect, Radii};
use strum_macros::Display;

use crate::context::LayoutContext;
use crate::error::LayoutError;
use crate::stack::LayoutStack;

/// Why the dispatcher is being called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Reason {
    /// The parser was created.
    Constructed,
    /// The parser is being destroyed.
    Destructed,
    /// An element was opened; its frame is on top of the stack.
    ElementStart,
    /// An element is closing; its frame is still on top of the stack.
    ElementEnd,
    /// Text content of the innermost element.
    Content,
    /// A comment.
    Comment,
    /// The document ended normally.
    Complete,
    /// The document was abandoned.
    Failed,
}

/// `h1` to `h6`.
pub(crate) fn is_heading(tag: &str) -> bool {
    matches!(tag.as_bytes(), [b'h', b'1'..=b'6'])
}

/// [§ 4.1.1 Phase I: Collapsing and Transformation](https://www.w3.org/TR/css-text-3/#white-space-phase-1)
///
/// "Any sequence of collapsible spaces and tabs immediately preceding or
/// following a segment break is removed." Segment breaks and tabs become
/// spaces and runs of spaces collapse to one. Leading line breaks are
/// dropped, as is a leading space when the text starts a line.
fn collapse_white_space(text: &str, starts_line: bool) -> String {
    let text = text.trim_start_matches(['\n', '\r']);
    let mut out = String::with_capacity(text.len());
    let mut in_space = starts_line;
    for ch in text.chars() {
        if ch.is_ascii_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    out
}

impl LayoutContext {
    /// Lay out one event.
    ///
    /// `token` is the tag name for element events and the text for content
    /// and comments. After a fatal error or [`Reason::Failed`] every later
    /// call is ignored.
    ///
    /// # Errors
    ///
    /// [`LayoutError::Display`] when the primitive tree refuses an
    /// allocation, [`LayoutError::NoProgress`] when text fitting stalls.
    pub fn dispatch(&mut self, reason: Reason, token: &str) -> Result<(), LayoutError> {
        if self.aborted {
            return Ok(());
        }

        #[cfg(feature = "layout-trace")]
        log::trace!(target: "numbat::layout", "[DISPATCH] {reason} {token:?}");

        let result = match reason {
            Reason::Constructed | Reason::Destructed | Reason::Comment => Ok(()),
            Reason::Complete => {
                log::debug!(target: "numbat::layout", "document complete");
                Ok(())
            }
            Reason::Failed => {
                log::debug!(target: "numbat::layout", "document failed, layout stops");
                self.aborted = true;
                Ok(())
            }
            Reason::ElementStart => self.element_start(token),
            Reason::ElementEnd => self.element_end(token),
            Reason::Content => self.content(token),
        };

        if result.is_err() {
            self.aborted = true;
        }
        result
    }

    /// The element frame on top of the stack and its container.
    fn element_frames(&self, tag: &str) -> Option<(usize, usize)> {
        let ps = self.stack.top();
        if ps == LayoutStack::ROOT {
            log::error!(target: "numbat::layout", "<{tag}> event with no open frame");
            return None;
        }
        if self.frame(ps).is_none_or(|f| f.hidden) {
            return None;
        }
        let psb = self.stack.nearest_container(ps, false)?;
        Some((ps, psb))
    }

    fn element_start(&mut self, tag: &str) -> Result<(), LayoutError> {
        let tag = tag.to_ascii_lowercase();
        let Some((ps, psb)) = self.element_frames(&tag) else {
            return Ok(());
        };

        match tag.as_str() {
            "br" => self.finalize_line(Some(psb), Some(ps)),
            "div" => self.open_container(ps, psb)?,
            "img" => self.place_image(ps, psb)?,
            t if is_heading(t) => self.open_heading(ps, psb),
            _ => {}
        }
        Ok(())
    }

    fn element_end(&mut self, tag: &str) -> Result<(), LayoutError> {
        let tag = tag.to_ascii_lowercase();
        let Some((ps, psb)) = self.element_frames(&tag) else {
            return Ok(());
        };

        match tag.as_str() {
            "div" => self.close_container(ps, psb)?,
            t if is_heading(t) => self.close_heading(ps, psb),
            _ => {}
        }
        Ok(())
    }

    /// A heading starts on a fresh line below its top margin and padding.
    fn open_heading(&mut self, ps: usize, psb: usize) {
        self.close_open_line(psb);
        let Some(reference) = self.frame(psb).map(|f| f.content_width) else {
            return;
        };
        let Some(frame) = self.frame(ps) else {
            return;
        };
        let advance = frame.margin(reference).top + frame.padding(reference).top;
        if let Some(parent) = self.frame_mut(psb) {
            parent.cursor.y += advance;
        }
    }

    /// Close the heading's line, then move below its bottom padding and
    /// margin.
    fn close_heading(&mut self, ps: usize, psb: usize) {
        self.finalize_line(Some(psb), Some(ps));
        let Some(reference) = self.frame(psb).map(|f| f.content_width) else {
            return;
        };
        let Some(frame) = self.frame(ps) else {
            return;
        };
        let advance = frame.padding(reference).bottom + frame.margin(reference).bottom;
        if let Some(parent) = self.frame_mut(psb) {
            parent.cursor.y += advance;
        }
    }

    /// [§ 10.3.3 Block-level, non-replaced elements in normal flow](https://www.w3.org/TR/CSS2/visudet.html#blockwidth)
    ///
    /// Start a container with a provisional box.
    ///
    /// STEP 1: A block-level container closes the line its parent has open.
    ///
    /// STEP 2: The origin is `left`/`top` for absolute positioning, else the
    /// parent's cursor plus this element's margin.
    ///
    /// STEP 3: The width is what remains of the viewport from the origin,
    /// clamped down to an explicit width, plus horizontal padding. The
    /// height is the viewport height. Both are corrected on close.
    ///
    /// STEP 4: Create the background rectangle under the parent container
    /// and start the content cursor inside the padding.
    fn open_container(&mut self, ps: usize, psb: usize) -> Result<(), LayoutError> {
        let Some(parent) = self.frame(psb) else {
            return Ok(());
        };
        let reference = parent.content_width;
        let parent_cursor = parent.cursor;
        let parent_primitive = parent.primitive;

        let Some(frame) = self.frame(ps) else {
            return Ok(());
        };
        let style = &frame.style;
        let absolute = style.is_absolute();
        let block = frame.is_block();
        let padding = frame.padding(reference);
        let margin = frame.margin(reference);

        // STEP 2
        let (x, y) = if absolute {
            (
                style.px(PropertyId::Left, self.viewport.w),
                style.px(PropertyId::Top, self.viewport.h),
            )
        } else {
            (parent_cursor.x + margin.left, parent_cursor.y + margin.top)
        };

        // STEP 3
        let mut w = self.viewport.w - x;
        if let Some(explicit) = style.explicit_px(PropertyId::Width, reference)
            && explicit < w
        {
            w = explicit;
        }
        w += padding.horizontal();
        let bbox = LayoutRect::new(x, y, w, self.viewport.h);

        let radii: Radii = PropertyId::RADII.map(|id| style.px(id, w));
        let color = style
            .color(PropertyId::BackgroundColor)
            .unwrap_or(Rgba::TRANSPARENT);
        let identifier = frame.attrs.get("id").cloned();

        // STEP 1
        if block && !absolute {
            self.close_open_line(psb);
        }

        // STEP 4
        let rect = self.tree.create_rect(parent_primitive, bbox, radii, color)?;
        if let Some(identifier) = identifier {
            self.tree.tag_id(rect, &identifier);
        }
        if let Some(frame) = self.frame_mut(ps) {
            frame.primitive = Some(rect);
            frame.content_width = w;
            frame.cursor.x = padding.left;
            frame.cursor.y = padding.top;
        }
        if !block && !absolute {
            self.runon(psb, rect);
        }

        #[cfg(feature = "layout-trace")]
        log::trace!(target: "numbat::layout", "[DIV OPEN] {rect:?} provisional {bbox:?}");

        Ok(())
    }

    /// Close a container.
    ///
    /// STEP 1: Close its own trailing line and add bottom padding.
    ///
    /// STEP 2: Resolve the rectangle: `height` is explicit (plus vertical
    /// padding) or the accumulated cursor; `width` is explicit (plus
    /// horizontal padding) or `widest` plus right padding.
    ///
    /// STEP 3: [§ 10.3.3](https://www.w3.org/TR/CSS2/visudet.html#blockwidth)
    /// "If both 'margin-left' and 'margin-right' are 'auto', their used
    /// values are equal. This horizontally centers the element with respect
    /// to the edges of the containing block."
    ///
    /// STEP 4: Unless absolutely positioned, hand the used space to the
    /// parent: below for blocks, beside for inline-level containers.
    fn close_container(&mut self, ps: usize, psb: usize) -> Result<(), LayoutError> {
        let Some(reference) = self.frame(psb).map(|f| f.content_width) else {
            return Ok(());
        };
        let viewport = self.viewport;

        // STEP 1
        if let Some(frame) = self.frame_mut(ps) {
            let x = frame.cursor.x;
            frame.extend_widest(x);
        }
        self.finalize_line(Some(ps), Some(ps));

        let Some(frame) = self.frame_mut(ps) else {
            return Ok(());
        };
        let padding = frame.padding(reference);
        let margin = frame.margin(reference);
        frame.cursor.y += padding.bottom;
        let Some(rect) = frame.primitive.take() else {
            return Ok(());
        };

        let style = &frame.style;
        let absolute = style.is_absolute();
        let block = frame.is_block();
        let centered = style.keyword(PropertyId::MarginLeft) == Some(Keyword::Auto)
            && style.keyword(PropertyId::MarginRight) == Some(Keyword::Auto);

        // STEP 2
        let h = style
            .explicit_px(PropertyId::Height, viewport.h)
            .map_or(frame.cursor.y, |h| h + padding.vertical());
        let w = style
            .explicit_px(PropertyId::Width, reference)
            .map_or(frame.widest + padding.right, |w| w + padding.horizontal());

        let available = self.explicit_or_viewport_width(psb);
        let bbox = self.tree.bbox_mut(rect)?;
        bbox.w = w;
        bbox.h = h;

        // STEP 3
        if centered {
            bbox.x = (available - bbox.w).half();
        }
        let bbox = *bbox;

        #[cfg(feature = "layout-trace")]
        log::trace!(target: "numbat::layout", "[DIV CLOSE] {rect:?} resolved {bbox:?}");

        // STEP 4
        if absolute {
            return Ok(());
        }
        let Some(parent) = self.frame_mut(psb) else {
            return Ok(());
        };
        if block {
            parent.cursor.y += margin.top + bbox.h + margin.bottom;
            parent.cursor.x = Fx::ZERO;
            parent.runon = false;
            parent.extend_widest(bbox.right() + margin.right);
        } else {
            parent.cursor.x = bbox.right() + margin.right;
            let x = parent.cursor.x;
            parent.extend_widest(x);
        }
        Ok(())
    }

    /// [§ 10.3.2 Inline, replaced elements](https://www.w3.org/TR/CSS2/visudet.html#inline-replaced-width)
    ///
    /// Place an image. An explicit height wins, and so does an explicit
    /// width narrower than the space left on the line; otherwise the natural
    /// size is used. When neither is known the image is created with an empty box and
    /// resolved later from the image store.
    fn place_image(&mut self, ps: usize, psb: usize) -> Result<(), LayoutError> {
        self.close_open_line(psb);

        let Some(parent) = self.frame(psb) else {
            return Ok(());
        };
        let reference = parent.content_width;
        let parent_cursor = parent.cursor;
        let parent_primitive = parent.primitive;

        let Some(frame) = self.frame(ps) else {
            return Ok(());
        };
        let style = &frame.style;
        let absolute = style.is_absolute();
        let margin = frame.margin(reference);
        let identifier = frame.attrs.get("id").cloned();

        let Some(src) = frame.attrs.get("src") else {
            warn_once("layout", "<img> without src is not laid out");
            return Ok(());
        };
        let url = match resolve_url(src, self.base_url.as_deref()) {
            Ok(url) => url,
            Err(err) => {
                warn_once("layout", &format!("<img src={src:?}>: {err}"));
                return Ok(());
            }
        };

        let (x, y) = if absolute {
            (
                style.px(PropertyId::Left, self.viewport.w),
                style.px(PropertyId::Top, self.viewport.h),
            )
        } else {
            (parent_cursor.x + margin.left, parent_cursor.y + margin.top)
        };
        let available = self.viewport.w - x;
        let explicit_w = style.explicit_px(PropertyId::Width, reference);
        let fitting_w = explicit_w.filter(|w| *w < available);
        let explicit_h = style.explicit_px(PropertyId::Height, self.viewport.h);

        // A width that does not fit gives way to the natural width; with no
        // natural size yet it is capped at the available width.
        let natural = self.images.find_or_materialize(&url);
        let size = match (fitting_w, explicit_h, natural) {
            (w, h, Some(natural)) => Some((w.unwrap_or(natural.w), h.unwrap_or(natural.h))),
            (Some(w), Some(h), None) => Some((w, h)),
            (None, Some(h), None) if explicit_w.is_some() => Some((available, h)),
            _ => None,
        };

        let Some((w, h)) = size else {
            log::debug!(target: "numbat::layout", "image {url} deferred until its size is known");
            let image = self.tree.create_image(
                parent_primitive,
                LayoutRect::new(x, y, Fx::ZERO, Fx::ZERO),
                url,
                true,
            )?;
            if let Some(identifier) = identifier {
                self.tree.tag_id(image, &identifier);
            }
            return Ok(());
        };

        let bbox = LayoutRect::new(x, y, w, h);
        let image = self.tree.create_image(parent_primitive, bbox, url, false)?;
        if let Some(identifier) = identifier {
            self.tree.tag_id(image, &identifier);
        }
        if !absolute && let Some(parent) = self.frame_mut(psb) {
            parent.cursor.x = bbox.right();
            parent.cursor.y = bbox.bottom();
            let x = parent.cursor.x;
            parent.extend_widest(x);
        }
        Ok(())
    }

    /// [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
    ///
    /// Lay out text, one text primitive per line it occupies.
    ///
    /// STEP 1: Skip hidden elements, whitespace-only text and text below
    /// the bottom of the viewport.
    ///
    /// STEP 2: Each fragment starts at the parent's cursor (or at the start
    /// of the line for the first fragment of a fresh line) and may use the
    /// rest of the line up to the container's right content edge, or the
    /// rest of the viewport when that leaves nothing.
    ///
    /// STEP 3: The text run takes as many bytes as fit. If the font reports
    /// a wrap, the line is closed and the rest goes on the next line.
    fn content(&mut self, token: &str) -> Result<(), LayoutError> {
        let ps = self.stack.top();

        // STEP 1
        let Some(frame) = self.frame(ps) else {
            return Ok(());
        };
        if frame.hidden {
            return Ok(());
        }
        let Some(psb) = self.stack.nearest_container(ps, true) else {
            log::error!(target: "numbat::layout", "content with no container");
            return Ok(());
        };
        let Some(parent) = self.frame(psb) else {
            return Ok(());
        };
        let text = collapse_white_space(token, !parent.runon);
        if text.trim().is_empty() {
            return Ok(());
        }
        if parent.cursor.y.whole() > self.viewport.h.whole() {
            return Ok(());
        }

        let parent_padding = parent.padding(self.percent_reference(psb));
        let parent_primitive = parent.primitive;
        let Some(frame) = self.frame(ps) else {
            return Ok(());
        };
        let padding_left = frame.padding(self.percent_reference(ps)).left;
        let color = frame.style.color(PropertyId::Color).unwrap_or(Rgba::BLACK);
        let Some(font) = self.frame_font(ps) else {
            return Ok(());
        };
        let line_height = font.line_height();

        let mut offset = 0;
        while offset < text.len() {
            let Some(parent) = self.frame(psb) else {
                break;
            };

            // STEP 2
            let fresh = offset == 0 && !parent.runon;
            let indent = if fresh { Fx::ZERO } else { parent.cursor.x };
            let x = if ps == psb && !fresh {
                indent
            } else {
                indent + padding_left
            };
            let y = parent.cursor.y;
            let right_edge = parent.content_width - parent_padding.right;
            let mut fit_width = (right_edge - x).non_negative();
            if fit_width.is_zero() {
                fit_width = (self.viewport.w - x).non_negative();
            }

            // STEP 3
            let run = self.tree.create_text(
                parent_primitive,
                LayoutRect::new(x, y, fit_width, line_height),
                Rc::clone(&font),
                color,
            )?;
            self.runon(psb, run);
            if let Some(text) = self.tree.get_mut(run).and_then(|p| p.as_text_mut()) {
                text.word_wrap = true;
            }

            let fit = self.tree.update_text(run, &text[offset..], fit_width)?;
            if fit.consumed == 0 {
                return Err(LayoutError::NoProgress {
                    offset,
                    len: text.len(),
                });
            }
            offset += fit.consumed;

            if let Some(parent) = self.frame_mut(psb) {
                parent.cursor.x = x + fit.width;
            }

            if fit.wrapped {
                self.finalize_line(Some(psb), Some(ps));
                if let Some(parent) = self.frame_mut(psb) {
                    parent.cursor.x = Fx::ZERO;
                }
                if ps != psb
                    && let Some(frame) = self.frame_mut(ps)
                {
                    frame.cursor.x = Fx::ZERO;
                    frame.cursor.y += fit.height;
                }
            }
        }
        Ok(())
    }
}
