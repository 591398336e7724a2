//! Line finalization and run-on linkage.
//!
//! [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
//!
//! "The rectangular area that contains the boxes that form a line is called
//! a line box."
//!
//! Lines are not materialized. A line is the run of sibling primitives under
//! a container that ends at the most recent one and extends backward while
//! each primitive's `runon` flag is set; the first primitive of the line is
//! the one whose flag is clear. Closing a line walks that run.

use numbat_common::Fx;
use numbat_css::{Cascade, Keyword, PropertyId};
use numbat_display::PrimitiveId;

use crate::context::LayoutContext;

/// What a backward walk over the current line found.
#[derive(Debug, Clone, Copy)]
struct LineRun {
    first: PrimitiveId,
    line_height: Fx,
    group_ascent: Fx,
    group_height: Fx,
    has_text: bool,
}

impl LayoutContext {
    /// Mark `primitive` as continuing the open line of frame `index` if one
    /// is open, then open it.
    pub(crate) fn runon(&mut self, index: usize, primitive: PrimitiveId) {
        let Some(frame) = self.stack.get_mut(index) else {
            log::error!(target: "numbat::layout", "run-on for missing frame {index}");
            return;
        };
        let continues = frame.runon;
        frame.runon = true;
        if let Some(node) = self.tree.get_mut(primitive) {
            node.runon = continues;
        }
    }

    /// Finalize the open line of `owner` if it has one.
    pub(crate) fn close_open_line(&mut self, owner: usize) {
        if self.frame(owner).is_some_and(|f| f.runon) {
            self.finalize_line(Some(owner), Some(owner));
        }
    }

    /// Close the current line of frame `owner`.
    ///
    /// `governor` is the frame whose style supplies padding, right margin and
    /// `text-align`; usually the owner itself, but a `<br>` or a closing
    /// heading closes the line of its container using its own style.
    ///
    /// A line that is already closed is left alone, so two `<br>` in a row
    /// or `</h1></div>` close one line, not two.
    ///
    /// STEP 1: Walk back from the last primitive of the owner's container
    /// while primitives continue the line, recording the tallest box and,
    /// over text runs, the smallest ascent and largest height.
    ///
    /// STEP 2: Stamp the group metrics on every text run of the line and
    /// move each onto the shared baseline.
    ///
    /// STEP 3: Track the used width in `widest`. A line without text stops
    /// here, so an empty container never produces a blank line.
    ///
    /// STEP 4: Apply `text-align`.
    ///
    /// STEP 5: Advance the owner's cursor to the next line.
    pub fn finalize_line(&mut self, owner: Option<usize>, governor: Option<usize>) {
        let (Some(owner), Some(governor)) = (owner, governor) else {
            log::error!(target: "numbat::layout", "line finalizer called without frames");
            return;
        };
        let (Some(owner_frame), Some(gov_frame)) = (self.frame(owner), self.frame(governor)) else {
            log::error!(target: "numbat::layout", "line finalizer frames {owner}/{governor} absent");
            return;
        };

        let reference = self.percent_reference(governor);
        let gov_padding = gov_frame.padding(reference);
        let gov_margin = gov_frame.margin(reference);
        let align = gov_frame.style.keyword(PropertyId::TextAlign);
        let container = owner_frame.primitive;
        let used = owner_frame.cursor.x;
        let open = owner_frame.runon;

        let available =
            self.explicit_or_viewport_width(owner) - gov_margin.right - gov_padding.right;

        if let Some(frame) = self.frame_mut(owner) {
            frame.extend_widest(gov_padding.horizontal());
        }
        if !open {
            return;
        }

        let Some(last) = self.tree.last_child(container) else {
            return;
        };

        // STEP 1
        let run = self.walk_line(last);

        // STEP 2
        self.group_baseline(&run);

        // STEP 3
        if let Some(frame) = self.frame_mut(owner) {
            frame.extend_widest(used);
        }
        if !run.has_text {
            return;
        }

        // STEP 4
        // [§ 16.2 Alignment: the 'text-align' property](https://www.w3.org/TR/CSS2/text.html#alignment-prop)
        // "This property describes how inline-level content of a block
        // container is aligned."
        let first_x = self.tree.get(run.first).map_or(Fx::ZERO, |p| p.bbox.x);
        let shift = match align {
            Some(Keyword::Center) => Some(gov_padding.left + (available - used).half()),
            Some(Keyword::Right) => Some(available - used - first_x),
            _ => None,
        };
        if let Some(shift) = shift {
            if let Some(frame) = self.frame_mut(owner) {
                frame.extend_widest(shift + used);
            }
            let ids: Vec<PrimitiveId> = self.tree.following_siblings(run.first).collect();
            for id in ids {
                if let Some(node) = self.tree.get_mut(id) {
                    node.bbox.x += shift;
                }
            }
        }

        #[cfg(feature = "layout-trace")]
        log::trace!(
            target: "numbat::line",
            "[LINE] owner={owner} governor={governor} used={used} avail={available} \
             height={} ascent={} group_height={} shift={shift:?}",
            run.line_height,
            run.group_ascent,
            run.group_height,
        );

        // STEP 5
        if let Some(frame) = self.frame_mut(owner) {
            frame.cursor.y += run.line_height;
            frame.cursor.x = Fx::ZERO;
            frame.runon = false;
        }
    }

    fn walk_line(&self, last: PrimitiveId) -> LineRun {
        let mut run = LineRun {
            first: last,
            line_height: Fx::ZERO,
            group_ascent: Fx::MAX,
            group_height: Fx::ZERO,
            has_text: false,
        };
        for id in self.tree.preceding_siblings(last) {
            let Some(node) = self.tree.get(id) else {
                break;
            };
            run.first = id;
            run.line_height = run.line_height.max(node.bbox.h);
            if let Some(text) = node.as_text() {
                run.has_text = true;
                run.group_ascent = run.group_ascent.min(text.ascent);
                run.group_height = run.group_height.max(text.height);
            }
            if !node.runon {
                break;
            }
        }
        run
    }

    /// [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
    ///
    /// Every text run moves up by `(height - ascent) - (group height - group
    /// ascent)`.
    fn group_baseline(&mut self, run: &LineRun) {
        if !run.has_text {
            return;
        }
        let ids: Vec<PrimitiveId> = self.tree.following_siblings(run.first).collect();
        for id in ids {
            let Some(node) = self.tree.get_mut(id) else {
                continue;
            };
            let Some(text) = node.as_text_mut() else {
                continue;
            };
            text.group_ascent = Some(run.group_ascent);
            text.group_height = Some(run.group_height);
            let offset = (text.height - text.ascent) - (run.group_height - run.group_ascent);
            node.bbox.y -= offset;
        }
    }
}
