//! A layout session: feeds a markup event stream through the dispatcher and
//! keeps the layout stack in step with element nesting.

use numbat_css::StyleSet;
use numbat_display::{DisplayList, DisplayTree, FixedPitchFonts, FontProvider};

use crate::config::LayoutConfig;
use crate::context::LayoutContext;
use crate::dispatch::Reason;
use crate::error::LayoutError;
use crate::event::{ElementStart, Event};
use crate::stack::{Frame, LayoutStack};

/// [§ 13.1.2 Elements](https://html.spec.whatwg.org/multipage/syntax.html#void-elements)
///
/// "Void elements only have a start tag; end tags must not be specified for
/// void elements."
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// One document being laid out.
#[derive(Debug)]
pub struct Session {
    context: LayoutContext,
}

impl Session {
    /// A session laying out for `config` with fonts from `fonts`.
    #[must_use]
    pub fn new(config: &LayoutConfig, fonts: Box<dyn FontProvider>) -> Self {
        Self {
            context: LayoutContext::new(config, fonts),
        }
    }

    /// A session using [`FixedPitchFonts`].
    #[must_use]
    pub fn with_fixed_pitch(config: &LayoutConfig) -> Self {
        Self::new(config, Box::new(FixedPitchFonts::new()))
    }

    /// Lay out one event.
    ///
    /// # Errors
    ///
    /// The first fatal [`LayoutError`]; the session ignores every event after
    /// it.
    pub fn feed(&mut self, event: &Event) -> Result<(), LayoutError> {
        if self.context.is_aborted() {
            return Ok(());
        }
        match event {
            Event::Start(start) => self.start(start),
            Event::End(tag) => self.end(&tag.to_ascii_lowercase()),
            Event::Text(text) => self.context.dispatch(Reason::Content, text),
            Event::Comment(text) => self.context.dispatch(Reason::Comment, text),
            Event::Complete => self.complete(),
            Event::Failed => {
                self.context.dispatch(Reason::Failed, "")?;
                while !self.context.stack.is_empty() {
                    let _ = self.context.stack.pop();
                }
                Ok(())
            }
            Event::Constructed | Event::Destructed => self.context.dispatch(event.reason(), ""),
        }
    }

    /// Lay out a whole event stream, stopping at the first fatal error.
    ///
    /// # Errors
    ///
    /// As [`Session::feed`].
    pub fn run<'a>(
        &mut self,
        events: impl IntoIterator<Item = &'a Event>,
    ) -> Result<(), LayoutError> {
        for event in events {
            self.feed(event)?;
        }
        Ok(())
    }

    fn start(&mut self, start: &ElementStart) -> Result<(), LayoutError> {
        let tag = start.tag.to_ascii_lowercase();
        let top = self.context.stack.top();
        let Some(parent) = self.context.stack.get(top) else {
            return Ok(());
        };
        let style = StyleSet::resolve(
            &tag,
            &StyleSet::parse_inline(&start.style),
            Some(&parent.style),
        );
        let frame = Frame::new(&tag, start.attrs.clone(), style, parent.hidden);
        let _ = self.context.stack.push(frame);

        let started = self.context.dispatch(Reason::ElementStart, &tag);
        if is_void(&tag) {
            self.close_top()?;
        }
        started
    }

    /// Close every frame down to the innermost one named `tag`.
    ///
    /// Frames above it are elements the markup left open; they are closed
    /// implicitly, innermost first.
    fn end(&mut self, tag: &str) -> Result<(), LayoutError> {
        if is_void(tag) {
            log::debug!(target: "numbat::layout", "ignoring </{tag}>");
            return Ok(());
        }
        let Some(index) = self
            .context
            .stack
            .iter()
            .rposition(|frame| frame.tag == tag)
            .filter(|index| *index != LayoutStack::ROOT)
        else {
            log::error!(target: "numbat::layout", "</{tag}> without a matching open element");
            return Ok(());
        };

        while self.context.stack.top() >= index && !self.context.stack.is_empty() {
            if self.context.stack.top() > index
                && let Some(frame) = self.context.stack.get(self.context.stack.top())
            {
                log::debug!(
                    target: "numbat::layout",
                    "<{}> closed implicitly by </{tag}>",
                    frame.tag
                );
            }
            self.close_top()?;
        }
        Ok(())
    }

    /// Dispatch the end of the innermost element and pop its frame.
    fn close_top(&mut self) -> Result<(), LayoutError> {
        let top = self.context.stack.top();
        let tag = self
            .context
            .stack
            .get(top)
            .map(|frame| frame.tag.clone())
            .unwrap_or_default();
        let ended = self.context.dispatch(Reason::ElementEnd, &tag);
        let _ = self.context.stack.pop();
        ended
    }

    /// Close what is still open, the root's trailing line included, and
    /// size images whose natural size arrived meanwhile.
    fn complete(&mut self) -> Result<(), LayoutError> {
        while !self.context.stack.is_empty() {
            self.close_top()?;
        }
        self.context.close_open_line(LayoutStack::ROOT);
        let resolved = self.context.tree.resolve_images(&self.context.images);
        if resolved > 0 {
            log::debug!(target: "numbat::image", "resolved {resolved} deferred images");
        }
        self.context.dispatch(Reason::Complete, "")
    }

    /// The layout context.
    #[must_use]
    pub const fn context(&self) -> &LayoutContext {
        &self.context
    }

    /// Mutable access to the layout context, e.g. to record image sizes.
    pub const fn context_mut(&mut self) -> &mut LayoutContext {
        &mut self.context
    }

    /// The primitive tree built so far.
    #[must_use]
    pub const fn tree(&self) -> &DisplayTree {
        self.context.tree()
    }

    /// Give up the primitive tree.
    #[must_use]
    pub fn into_tree(self) -> DisplayTree {
        self.context.into_tree()
    }

    /// Flatten the tree into drawing commands.
    #[must_use]
    pub fn display_list(&self) -> DisplayList {
        DisplayList::from_tree(self.context.tree())
    }

    /// True after a fatal error or a `Failed` event.
    #[must_use]
    pub const fn is_aborted(&self) -> bool {
        self.context.is_aborted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::with_fixed_pitch(&LayoutConfig::default())
    }

    #[test]
    fn test_void_elements_pop_immediately() {
        let mut s = session();
        s.feed(&Event::Start(ElementStart::new("div"))).unwrap();
        s.feed(&Event::Start(ElementStart::new("br"))).unwrap();
        assert_eq!(s.context().stack().len(), 2);
        s.feed(&Event::End("br".to_string())).unwrap();
        assert_eq!(s.context().stack().len(), 2);
    }

    #[test]
    fn test_end_closes_implicitly_open_children() {
        let mut s = session();
        s.feed(&Event::Start(ElementStart::new("div"))).unwrap();
        s.feed(&Event::Start(ElementStart::new("span"))).unwrap();
        s.feed(&Event::Start(ElementStart::new("b"))).unwrap();
        assert_eq!(s.context().stack().len(), 4);
        s.feed(&Event::End("DIV".to_string())).unwrap();
        assert!(s.context().stack().is_empty());
    }

    #[test]
    fn test_unmatched_end_is_ignored() {
        let mut s = session();
        s.feed(&Event::Start(ElementStart::new("span"))).unwrap();
        s.feed(&Event::End("div".to_string())).unwrap();
        assert_eq!(s.context().stack().len(), 2);
        assert!(!s.is_aborted());
    }

    #[test]
    fn test_failed_discards_stack() {
        let mut s = session();
        s.feed(&Event::Start(ElementStart::new("div"))).unwrap();
        s.feed(&Event::Failed).unwrap();
        assert!(s.is_aborted());
        assert!(s.context().stack().is_empty());
        s.feed(&Event::Text("ignored".to_string())).unwrap();
        assert_eq!(s.tree().len(), 1);
    }
}
