//! User-Agent defaults.
//!
//! [WHATWG HTML § 15 Rendering](https://html.spec.whatwg.org/multipage/rendering.html)
//!
//! "User agents are expected to have a default style sheet that presents elements
//! of HTML documents in ways consistent with general user expectations."
//!
//! UA rules have the lowest priority: any author declaration overrides them.

use std::collections::HashMap;
use std::sync::OnceLock;

use numbat_common::warning::warn_once;

use crate::cascade::StyleSet;
use crate::values::Keyword;

/// Default rules for the handful of elements whose typography differs from
/// the inherited defaults. Each line is `tag[, tag...] { declarations }`.
const UA_CSS: &str = r"
h1 { font-size: 2em; font-weight: bold }
h2 { font-size: 1.5em; font-weight: bold }
h3 { font-size: 1.17em; font-weight: bold }
h4 { font-size: 1em; font-weight: bold }
h5 { font-size: 0.83em; font-weight: bold }
h6 { font-size: 0.67em; font-weight: bold }
b, strong { font-weight: bolder }
center { text-align: center }
";

/// The parsed UA rules, keyed by tag name.
fn rules() -> &'static HashMap<&'static str, StyleSet> {
    static RULES: OnceLock<HashMap<&'static str, StyleSet>> = OnceLock::new();
    RULES.get_or_init(|| {
        let mut rules = HashMap::new();
        for line in UA_CSS.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let Some((selectors, rest)) = line.split_once('{') else {
                warn_once("css", &format!("malformed UA rule '{line}'"));
                continue;
            };
            let declarations = StyleSet::parse_inline(rest.trim_end_matches('}'));
            for tag in selectors.split(',').map(str::trim) {
                let _ = rules.insert(tag, declarations.clone());
            }
        }
        rules
    })
}

/// UA declarations for `tag`, if it has any.
#[must_use]
pub fn defaults_for(tag: &str) -> Option<&'static StyleSet> {
    rules().get(tag)
}

/// [§ 15.3 Rendering](https://html.spec.whatwg.org/multipage/rendering.html)
///
/// The default `display` for an element.
///
/// Returns `Keyword::None` for hidden elements, `Keyword::Block` for flow
/// content, `Keyword::ListItem` for `li` and `Keyword::Inline` otherwise.
#[must_use]
pub fn default_display(tag: &str) -> Keyword {
    // [§ 15.3.1 Hidden elements]
    // "The following elements must have their display set to none:"
    const HIDDEN: [&str; 15] = [
        "area", "base", "basefont", "datalist", "head", "link", "meta", "noembed", "noframes",
        "param", "rp", "script", "style", "template", "title",
    ];

    // [§ 15.3.3 Flow content]
    const BLOCK: [&str; 43] = [
        "address",
        "article",
        "aside",
        "blockquote",
        "body",
        "center",
        "dd",
        "details",
        "dialog",
        "dir",
        "div",
        "dl",
        "dt",
        "fieldset",
        "figcaption",
        "figure",
        "footer",
        "form",
        "h1",
        "h2",
        "h3",
        "h4",
        "h5",
        "h6",
        "header",
        "hgroup",
        "hr",
        "html",
        "legend",
        "listing",
        "main",
        "menu",
        "nav",
        "ol",
        "p",
        "plaintext",
        "pre",
        "search",
        "section",
        "summary",
        "ul",
        "xmp",
        "table",
    ];

    if HIDDEN.contains(&tag) {
        Keyword::None
    } else if BLOCK.contains(&tag) {
        Keyword::Block
    } else if tag == "li" {
        // [§ 15.3.8 Lists]
        // "li { display: list-item; }"
        Keyword::ListItem
    } else {
        Keyword::Inline
    }
}
