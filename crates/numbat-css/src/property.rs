//! Property identifiers understood by the layout engine.
//!
//! The cascade is keyed by [`PropertyId`]. Only the properties the flow
//! layout reacts to are listed; anything else in author input is reported
//! once and dropped.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// A style property the layout engine queries.
///
/// Names follow CSS spelling (`padding-left`, `border-top-left-radius`).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum PropertyId {
    /// [§ 2 Box Layout Modes: the display property](https://www.w3.org/TR/css-display-3/#the-display-properties)
    Display,
    /// [§ 2 Choosing A Positioning Scheme](https://www.w3.org/TR/css-position-3/#position-property)
    Position,
    /// Left inset for absolutely positioned boxes.
    Left,
    /// Top inset for absolutely positioned boxes.
    Top,
    /// Content width.
    Width,
    /// Content height.
    Height,
    /// Top margin.
    MarginTop,
    /// Right margin.
    MarginRight,
    /// Bottom margin.
    MarginBottom,
    /// Left margin.
    MarginLeft,
    /// Top padding.
    PaddingTop,
    /// Right padding.
    PaddingRight,
    /// Bottom padding.
    PaddingBottom,
    /// Left padding.
    PaddingLeft,
    /// [§ 5.1 'border-radius'](https://www.w3.org/TR/css-backgrounds-3/#border-radius)
    BorderTopLeftRadius,
    /// Top-right corner radius.
    BorderTopRightRadius,
    /// Bottom-right corner radius.
    BorderBottomRightRadius,
    /// Bottom-left corner radius.
    BorderBottomLeftRadius,
    /// Background fill of container rectangles.
    BackgroundColor,
    /// Text colour.
    Color,
    /// Font family list, passed through to the font provider.
    FontFamily,
    /// Font size; also the fixed line height of the chosen font.
    FontSize,
    /// Font weight (keyword or number).
    FontWeight,
    /// [§ 16.2 Alignment: the 'text-align' property](https://www.w3.org/TR/CSS2/text.html#alignment-prop)
    TextAlign,
}

impl PropertyId {
    /// The four corner radii, clockwise from top-left.
    pub const RADII: [Self; 4] = [
        Self::BorderTopLeftRadius,
        Self::BorderTopRightRadius,
        Self::BorderBottomRightRadius,
        Self::BorderBottomLeftRadius,
    ];

    /// [§ 7.1 Inherited Properties](https://www.w3.org/TR/css-cascade-4/#inherited-property)
    ///
    /// "Some properties are inherited from an ancestor element to its
    /// descendants."
    #[must_use]
    pub const fn is_inherited(self) -> bool {
        matches!(
            self,
            Self::Color | Self::FontFamily | Self::FontSize | Self::FontWeight | Self::TextAlign
        )
    }

    /// Properties whose value is a length (or `auto`).
    #[must_use]
    pub const fn takes_length(self) -> bool {
        matches!(
            self,
            Self::Left
                | Self::Top
                | Self::Width
                | Self::Height
                | Self::MarginTop
                | Self::MarginRight
                | Self::MarginBottom
                | Self::MarginLeft
                | Self::PaddingTop
                | Self::PaddingRight
                | Self::PaddingBottom
                | Self::PaddingLeft
                | Self::BorderTopLeftRadius
                | Self::BorderTopRightRadius
                | Self::BorderBottomRightRadius
                | Self::BorderBottomLeftRadius
                | Self::FontSize
        )
    }
}

/// Shorthand expansion to longhand properties, in `top right bottom left`
/// order for box edges.
#[must_use]
pub fn expand_shorthand(name: &str) -> Option<[PropertyId; 4]> {
    match name {
        "margin" => Some([
            PropertyId::MarginTop,
            PropertyId::MarginRight,
            PropertyId::MarginBottom,
            PropertyId::MarginLeft,
        ]),
        "padding" => Some([
            PropertyId::PaddingTop,
            PropertyId::PaddingRight,
            PropertyId::PaddingBottom,
            PropertyId::PaddingLeft,
        ]),
        "border-radius" => Some(PropertyId::RADII),
        _ => None,
    }
}
