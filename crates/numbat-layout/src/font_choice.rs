//! Font selection for text content, memoized per frame.

use std::rc::Rc;

use numbat_common::Fx;
use numbat_css::{Cascade, Keyword, PropertyId, StyleSet};
use numbat_display::{FontChoice, FontHandle};

use crate::context::LayoutContext;

/// [§ 3.2 font-weight](https://www.w3.org/TR/css-fonts-4/#font-weight-prop)
///
/// `bold` is 700. `bolder` is taken as 800 without consulting the parent
/// weight. A numeric weight is used as is.
fn weight(style: &StyleSet, default: u16) -> u16 {
    match style.keyword(PropertyId::FontWeight) {
        Some(Keyword::Bold) => 700,
        Some(Keyword::Bolder) => 800,
        Some(Keyword::Normal) => 400,
        _ => style
            .number(PropertyId::FontWeight)
            .and_then(|w| u16::try_from(w.whole()).ok())
            .filter(|w| *w > 0)
            .unwrap_or(default),
    }
}

/// The font request for an element with `style`.
///
/// Sizes are whole pixels: the chosen font's line height is the truncated
/// `font-size`.
#[must_use]
pub fn choose(style: &StyleSet, defaults: &FontChoice) -> FontChoice {
    let fixed_height = style
        .length(PropertyId::FontSize)
        .map_or(defaults.fixed_height, |_| {
            Fx::from_whole(style.font_size().whole())
        });
    FontChoice {
        family: style
            .text(PropertyId::FontFamily)
            .map_or_else(|| defaults.family.clone(), str::to_string),
        fixed_height,
        weight: weight(style, defaults.weight),
    }
}

impl LayoutContext {
    /// The font of the frame at `index`, choosing it on first use.
    pub(crate) fn frame_font(&mut self, index: usize) -> Option<FontHandle> {
        let frame = self.stack.get(index)?;
        if let Some(font) = &frame.font {
            return Some(Rc::clone(font));
        }
        let choice = choose(&frame.style, &self.default_font);
        let font = self.fonts.choose(&choice);
        if let Some(frame) = self.stack.get_mut(index) {
            frame.font = Some(Rc::clone(&font));
        }
        Some(font)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_keywords() {
        let defaults = FontChoice::default();
        let pick = |css: &str| choose(&StyleSet::parse_inline(css), &defaults).weight;
        assert_eq!(pick(""), 400);
        assert_eq!(pick("font-weight: bold"), 700);
        assert_eq!(pick("font-weight: bolder"), 800);
        assert_eq!(pick("font-weight: 300"), 300);
    }

    #[test]
    fn test_size_is_truncated_to_whole_px() {
        let defaults = FontChoice::default();
        let style = StyleSet::resolve("h3", &StyleSet::new(), None);
        let choice = choose(&style, &defaults);
        assert_eq!(choice.fixed_height, Fx::from_whole(18));
        assert_eq!(choice.family, "serif");
    }

    #[test]
    fn test_family_from_cascade() {
        let style = StyleSet::parse_inline("font-family: mono; font-size: 12px");
        let choice = choose(&style, &FontChoice::default());
        assert_eq!(choice.family, "mono");
        assert_eq!(choice.fixed_height, Fx::from_whole(12));
    }
}
