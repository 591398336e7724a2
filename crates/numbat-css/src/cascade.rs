//! Per-element resolved style and the accessor the layout engine queries.
//!
//! [CSS Cascading and Inheritance Level 4](https://www.w3.org/TR/css-cascade-4/)
//!
//! Selector matching and specificity are out of scope here: the caller hands
//! each element its declared values (typically from a `style` attribute) and
//! [`StyleSet::resolve`] folds in inheritance and user agent defaults.

use std::collections::BTreeMap;

use numbat_common::Fx;
use numbat_common::warning::warn_once;
use serde::{Deserialize, Serialize};

use crate::property::{PropertyId, expand_shorthand};
use crate::ua;
use crate::values::{
    CssError, DEFAULT_FONT_SIZE_PX, Keyword, Length, PropValue, Rgba, Unit, parse_value,
};

/// [§ 8.1 Box dimensions](https://www.w3.org/TR/CSS2/box.html#box-dimensions)
/// Edge sizes for margin or padding, in device pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edges {
    /// Top edge.
    pub top: Fx,
    /// Right edge.
    pub right: Fx,
    /// Bottom edge.
    pub bottom: Fx,
    /// Left edge.
    pub left: Fx,
}

impl Edges {
    /// Sum of left and right.
    #[must_use]
    pub fn horizontal(&self) -> Fx {
        self.left + self.right
    }

    /// Sum of top and bottom.
    #[must_use]
    pub fn vertical(&self) -> Fx {
        self.top + self.bottom
    }
}

/// Which box edge family [`Cascade::edges`] reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// `margin-*`.
    Margin,
    /// `padding-*`.
    Padding,
}

impl EdgeKind {
    const fn properties(self) -> [PropertyId; 4] {
        match self {
            Self::Margin => [
                PropertyId::MarginTop,
                PropertyId::MarginRight,
                PropertyId::MarginBottom,
                PropertyId::MarginLeft,
            ],
            Self::Padding => [
                PropertyId::PaddingTop,
                PropertyId::PaddingRight,
                PropertyId::PaddingBottom,
                PropertyId::PaddingLeft,
            ],
        }
    }
}

/// Resolved property lookup for one element.
///
/// Only [`Cascade::value`] is required; every other method is derived from
/// it. "Unset" is `None`.
pub trait Cascade {
    /// The winning value for `id`, if any.
    fn value(&self, id: PropertyId) -> Option<&PropValue>;

    /// The declared length for `id`.
    fn length(&self, id: PropertyId) -> Option<Length> {
        match self.value(id) {
            Some(PropValue::Length(length)) => Some(*length),
            _ => None,
        }
    }

    /// The keyword value for `id`.
    fn keyword(&self, id: PropertyId) -> Option<Keyword> {
        match self.value(id) {
            Some(PropValue::Keyword(keyword)) => Some(*keyword),
            _ => None,
        }
    }

    /// The colour value for `id`.
    fn color(&self, id: PropertyId) -> Option<Rgba> {
        match self.value(id) {
            Some(PropValue::Color(color)) => Some(*color),
            _ => None,
        }
    }

    /// The text value for `id`.
    fn text(&self, id: PropertyId) -> Option<&str> {
        match self.value(id) {
            Some(PropValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// The numeric value for `id`.
    fn number(&self, id: PropertyId) -> Option<Fx> {
        match self.value(id) {
            Some(PropValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    /// True when `id` is unset or `auto`.
    fn is_auto(&self, id: PropertyId) -> bool {
        matches!(self.value(id), None | Some(PropValue::Keyword(Keyword::Auto)))
    }

    /// Used font size in px (16 when unset).
    fn font_size(&self) -> Fx {
        self.length(PropertyId::FontSize)
            .filter(|l| l.unit == Unit::Px)
            .map_or(Fx::from_whole(DEFAULT_FONT_SIZE_PX), |l| l.value)
    }

    /// The length for `id` in px when one was declared.
    ///
    /// `em` is relative to this element's font size, percentages to
    /// `reference`.
    fn explicit_px(&self, id: PropertyId, reference: Fx) -> Option<Fx> {
        self.length(id)
            .map(|length| length.to_px(self.font_size(), reference))
    }

    /// Like [`Cascade::explicit_px`] but unset, `auto` and keywords are 0.
    fn px(&self, id: PropertyId, reference: Fx) -> Fx {
        self.explicit_px(id, reference).unwrap_or(Fx::ZERO)
    }

    /// The four margin or padding edges.
    fn edges(&self, kind: EdgeKind, reference: Fx) -> Edges {
        let [top, right, bottom, left] = kind.properties();
        Edges {
            top: self.px(top, reference),
            right: self.px(right, reference),
            bottom: self.px(bottom, reference),
            left: self.px(left, reference),
        }
    }

    /// [§ 2 The display property](https://www.w3.org/TR/css-display-3/#the-display-properties)
    /// "Initial: inline"
    fn display(&self) -> Keyword {
        self.keyword(PropertyId::Display).unwrap_or(Keyword::Inline)
    }

    /// True for `position: absolute`.
    fn is_absolute(&self) -> bool {
        self.keyword(PropertyId::Position) == Some(Keyword::Absolute)
    }
}

/// The values that apply to one element, keyed by property.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleSet {
    values: BTreeMap<PropertyId, PropValue>,
}

impl Cascade for StyleSet {
    fn value(&self, id: PropertyId) -> Option<&PropValue> {
        self.values.get(&id)
    }
}

impl StyleSet {
    /// An empty set: every property unset.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    /// Set a single longhand value.
    pub fn set(&mut self, id: PropertyId, value: PropValue) {
        let _ = self.values.insert(id, value);
    }

    /// Remove a value, making the property unset.
    pub fn unset(&mut self, id: PropertyId) -> Option<PropValue> {
        self.values.remove(&id)
    }

    /// Number of set properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no property is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate the set values in property order.
    pub fn iter(&self) -> impl Iterator<Item = (PropertyId, &PropValue)> {
        self.values.iter().map(|(id, value)| (*id, value))
    }

    /// Declare `name: value`, expanding the `margin`, `padding` and
    /// `border-radius` shorthands.
    ///
    /// # Errors
    ///
    /// Unknown property names, unparsable values and shorthands with more
    /// than four components.
    pub fn declare(&mut self, name: &str, value: &str) -> Result<(), CssError> {
        let name = name.trim().to_ascii_lowercase();

        if let Some(longhands) = expand_shorthand(&name) {
            // [§ 8.3 Margin properties](https://www.w3.org/TR/CSS2/box.html#margin-properties)
            // "If there is only one component value, it applies to all sides. If
            // there are two values, the top and bottom margins are set to the
            // first value and the right and left margins are set to the second.
            // If there are three values, the top is set to the first value, the
            // left and right are set to the second, and the bottom is set to the
            // third. If there are four values, they apply to the top, right,
            // bottom, and left, respectively."
            let parts: Vec<&str> = value.split_whitespace().collect();
            let [top, right, bottom, left] = match parts.as_slice() {
                [a] => [*a, *a, *a, *a],
                [a, b] => [*a, *b, *a, *b],
                [a, b, c] => [*a, *b, *c, *b],
                [a, b, c, d] => [*a, *b, *c, *d],
                _ => {
                    return Err(CssError::ShorthandArity {
                        name,
                        count: parts.len(),
                    });
                }
            };
            let mut parsed = Vec::with_capacity(4);
            for (id, part) in longhands.into_iter().zip([top, right, bottom, left]) {
                parsed.push((id, parse_value(id, part)?));
            }
            for (id, value) in parsed {
                self.set(id, value);
            }
            return Ok(());
        }

        let id: PropertyId = name
            .parse()
            .map_err(|_| CssError::UnknownProperty(name.clone()))?;
        let parsed = parse_value(id, value)?;
        self.set(id, parsed);
        Ok(())
    }

    /// Parse an inline declaration block (`"padding: 4px; color: red"`).
    ///
    /// Bad declarations are reported once and skipped, the rest still apply.
    #[must_use]
    pub fn parse_inline(block: &str) -> Self {
        let mut set = Self::new();
        for declaration in block.split(';') {
            let declaration = declaration.trim();
            if declaration.is_empty() {
                continue;
            }
            let result = declaration
                .split_once(':')
                .ok_or_else(|| CssError::Malformed(declaration.to_string()))
                .and_then(|(name, value)| set.declare(name, value));
            if let Err(err) = result {
                warn_once("css", &err.to_string());
            }
        }
        set
    }

    /// Compute the style of an element from its declared values.
    ///
    /// [§ 6 Cascading](https://www.w3.org/TR/css-cascade-4/#cascading)
    ///
    /// STEP 1: Inherited properties start from the parent's resolved value.
    ///
    /// STEP 2: User agent defaults for `tag` apply over inherited values.
    ///
    /// STEP 3: Author declarations win over both.
    ///
    /// STEP 4: A relative `font-size` is resolved against the parent's font
    /// size so descendants inherit a px value.
    #[must_use]
    pub fn resolve(tag: &str, declared: &Self, parent: Option<&Self>) -> Self {
        let mut resolved = Self::new();

        // STEP 1
        if let Some(parent) = parent {
            for (id, value) in parent.iter().filter(|(id, _)| id.is_inherited()) {
                resolved.set(id, value.clone());
            }
        }

        // STEP 2
        if let Some(defaults) = ua::defaults_for(tag) {
            for (id, value) in defaults.iter() {
                resolved.set(id, value.clone());
            }
        }
        if resolved.value(PropertyId::Display).is_none() {
            resolved.set(PropertyId::Display, PropValue::Keyword(ua::default_display(tag)));
        }

        // STEP 3
        for (id, value) in declared.iter() {
            resolved.set(id, value.clone());
        }

        // STEP 4
        // [§ 3.5 font-size](https://www.w3.org/TR/css-fonts-4/#font-size-prop)
        // "Percentages: refer to parent element's font size"
        let parent_size = parent.map_or(Fx::from_whole(DEFAULT_FONT_SIZE_PX), Cascade::font_size);
        if let Some(length) = resolved.length(PropertyId::FontSize)
            && length.unit != Unit::Px
        {
            let px = length.to_px(parent_size, parent_size);
            resolved.set(PropertyId::FontSize, PropValue::Length(Length::px(px)));
        }

        resolved
    }
}
