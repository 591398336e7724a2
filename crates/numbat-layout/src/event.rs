//! Markup events, as a tokenizer reports them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dispatch::Reason;

/// An element being opened.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementStart {
    /// Tag name.
    pub tag: String,
    /// Attributes other than `style`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    /// Inline `style` declarations.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub style: String,
}

impl ElementStart {
    /// `<tag>` with no attributes.
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Self::default()
        }
    }

    /// Add an attribute.
    #[must_use]
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        let _ = self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    /// Set the inline style.
    #[must_use]
    pub fn style(mut self, css: &str) -> Self {
        css.clone_into(&mut self.style);
        self
    }
}

/// One reason-tagged construct of the document.
///
/// Serialized as an externally tagged enum, so an event stream reads as
/// `[{"start": {"tag": "div"}}, {"text": "Hi"}, {"end": "div"}, "complete"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    /// The parser was created.
    Constructed,
    /// The parser is being destroyed.
    Destructed,
    /// An opening tag.
    Start(ElementStart),
    /// A closing tag.
    End(String),
    /// Character data.
    Text(String),
    /// A comment.
    Comment(String),
    /// The end of the document.
    Complete,
    /// The document was abandoned.
    Failed,
}

impl Event {
    /// The dispatcher reason this event maps to.
    #[must_use]
    pub const fn reason(&self) -> Reason {
        match self {
            Self::Constructed => Reason::Constructed,
            Self::Destructed => Reason::Destructed,
            Self::Start(_) => Reason::ElementStart,
            Self::End(_) => Reason::ElementEnd,
            Self::Text(_) => Reason::Content,
            Self::Comment(_) => Reason::Comment,
            Self::Complete => Reason::Complete,
            Self::Failed => Reason::Failed,
        }
    }
}
