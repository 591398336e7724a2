//! Resolved CSS values and their parsing.
//!
//! - [CSS Values and Units Level 4](https://www.w3.org/TR/css-values-4/)
//! - [CSS Color Level 4](https://www.w3.org/TR/css-color-4/)
//!
//! The layout engine only ever reacts to four kinds of answer from the
//! cascade: a colour, a length (with unit), an enumerated keyword, or a
//! number. Font family lists travel as plain text.

use numbat_common::Fx;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString, IntoStaticStr};

use crate::property::PropertyId;

/// User agent default font size.
/// [§ 3.5 font-size](https://www.w3.org/TR/css-fonts-4/#font-size-prop)
/// "Initial: medium" - medium is 16px.
pub const DEFAULT_FONT_SIZE_PX: i32 = 16;

/// Errors produced while parsing a declaration value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CssError {
    /// The property name is not one the engine understands.
    #[error("unknown property '{0}'")]
    UnknownProperty(String),
    /// The value does not parse for this property.
    #[error("invalid value '{value}' for {property}")]
    InvalidValue {
        /// Property being declared.
        property: PropertyId,
        /// The offending input.
        value: String,
    },
    /// A shorthand received the wrong number of components.
    #[error("'{name}' takes 1 to 4 values, got {count}")]
    ShorthandArity {
        /// Shorthand name.
        name: String,
        /// Number of components found.
        count: usize,
    },
    /// A declaration without a `:` separator.
    #[error("malformed declaration '{0}'")]
    Malformed(String),
}

/// [§ 4 Color syntax](https://www.w3.org/TR/css-color-4/#color-syntax)
/// sRGB color represented as RGBA components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    /// "the red color channel" (0-255)
    pub r: u8,
    /// "the green color channel" (0-255)
    pub g: u8,
    /// "the blue color channel" (0-255)
    pub b: u8,
    /// "the alpha channel" (0-255, 255 = fully opaque)
    pub a: u8,
}

impl Rgba {
    /// Opaque black, the initial value of `color`.
    pub const BLACK: Self = Self::opaque(0, 0, 0);

    /// Opaque white.
    pub const WHITE: Self = Self::opaque(255, 255, 255);

    /// Fully transparent, the initial value of `background-color`.
    pub const TRANSPARENT: Self = Self { r: 0, g: 0, b: 0, a: 0 };

    /// A colour with full alpha.
    #[must_use]
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// [§ 4.2 The RGB hexadecimal notations](https://www.w3.org/TR/css-color-4/#hex-notation)
    /// "The syntax of a <hex-color> is a <hash-token> token whose value consists of
    /// 3, 4, 6, or 8 hexadecimal digits."
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let short = |i: usize| u8::from_str_radix(&hex[i..=i].repeat(2), 16).ok();
        let long = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            // "The three-digit RGB notation (#RGB) is converted into six-digit form
            // (#RRGGBB) by replicating digits, not by adding zeros."
            3 => Some(Self::opaque(short(0)?, short(1)?, short(2)?)),
            4 => Some(Self {
                r: short(0)?,
                g: short(1)?,
                b: short(2)?,
                a: short(3)?,
            }),
            6 => Some(Self::opaque(long(0)?, long(2)?, long(4)?)),
            8 => Some(Self {
                r: long(0)?,
                g: long(2)?,
                b: long(4)?,
                a: long(6)?,
            }),
            _ => None,
        }
    }

    /// [§ 6.1 Named Colors](https://www.w3.org/TR/css-color-4/#named-colors)
    ///
    /// The basic sixteen HTML colours plus `transparent`.
    #[must_use]
    pub fn from_named(name: &str) -> Option<Self> {
        let color = match name.to_ascii_lowercase().as_str() {
            "black" => Self::BLACK,
            "white" => Self::WHITE,
            "transparent" => Self::TRANSPARENT,
            "red" => Self::opaque(255, 0, 0),
            "green" => Self::opaque(0, 128, 0),
            "blue" => Self::opaque(0, 0, 255),
            "yellow" => Self::opaque(255, 255, 0),
            "gray" | "grey" => Self::opaque(128, 128, 128),
            "silver" => Self::opaque(192, 192, 192),
            "maroon" => Self::opaque(128, 0, 0),
            "purple" => Self::opaque(128, 0, 128),
            "fuchsia" | "magenta" => Self::opaque(255, 0, 255),
            "lime" => Self::opaque(0, 255, 0),
            "olive" => Self::opaque(128, 128, 0),
            "navy" => Self::opaque(0, 0, 128),
            "teal" => Self::opaque(0, 128, 128),
            "aqua" | "cyan" => Self::opaque(0, 255, 255),
            _ => return None,
        };
        Some(color)
    }

    /// Parse either notation.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.starts_with('#') {
            Self::from_hex(input)
        } else {
            Self::from_named(input)
        }
    }
}

/// Units a [`Length`] may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// [§ 6.1 Absolute lengths](https://www.w3.org/TR/css-values-4/#absolute-lengths)
    /// Device pixels on the target display.
    Px,
    /// [§ 5.1.1 Font-relative lengths](https://www.w3.org/TR/css-values-4/#font-relative-lengths)
    /// "Equal to the computed value of the font-size property of the element"
    Em,
    /// [§ 4.3 Percentages](https://www.w3.org/TR/css-values-4/#percentages)
    /// Relative to a property-specific reference length.
    Percent,
}

/// [§ 4.1 Lengths](https://www.w3.org/TR/css-values-4/#lengths)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Length {
    /// Magnitude in `unit`.
    pub value: Fx,
    /// The unit the value was written in.
    pub unit: Unit,
}

impl Length {
    /// A device-pixel length.
    #[must_use]
    pub const fn px(value: Fx) -> Self {
        Self {
            value,
            unit: Unit::Px,
        }
    }

    /// Convert to device pixels.
    ///
    /// `font_size` resolves `em`, `reference` resolves percentages.
    #[must_use]
    pub fn to_px(self, font_size: Fx, reference: Fx) -> Fx {
        match self.unit {
            Unit::Px => self.value,
            Unit::Em => self.value.mul(font_size),
            Unit::Percent => reference.mul(self.value).div_int(100),
        }
    }

    /// Parse `12px`, `1.5em`, `50%` or a bare number (taken as px).
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        let (number, unit) = if let Some(n) = input.strip_suffix("px") {
            (n, Unit::Px)
        } else if let Some(n) = input.strip_suffix("em") {
            (n, Unit::Em)
        } else if let Some(n) = input.strip_suffix('%') {
            (n, Unit::Percent)
        } else {
            (input, Unit::Px)
        };
        let value = number.trim_start_matches('+').parse::<Fx>().ok()?;
        Some(Self { value, unit })
    }
}

/// Enumerated keywords the layout engine distinguishes.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum Keyword {
    /// `auto` for widths, heights, margins and insets.
    Auto,
    /// `display: none`.
    None,
    /// `display: block`.
    Block,
    /// `display: inline`.
    Inline,
    /// `display: inline-block`.
    InlineBlock,
    /// `display: list-item`.
    ListItem,
    /// `position: static`.
    Static,
    /// `position: relative`.
    Relative,
    /// `position: absolute`.
    Absolute,
    /// `text-align: left`.
    Left,
    /// `text-align: right`.
    Right,
    /// `text-align: center`.
    Center,
    /// `font-weight: normal`.
    Normal,
    /// `font-weight: bold`.
    Bold,
    /// `font-weight: bolder`.
    Bolder,
}

impl Keyword {
    /// Whether this keyword is a valid value of `property`.
    #[must_use]
    pub const fn applies_to(self, property: PropertyId) -> bool {
        match property {
            PropertyId::Display => matches!(
                self,
                Self::None | Self::Block | Self::Inline | Self::InlineBlock | Self::ListItem
            ),
            PropertyId::Position => matches!(self, Self::Static | Self::Relative | Self::Absolute),
            PropertyId::TextAlign => matches!(self, Self::Left | Self::Right | Self::Center),
            PropertyId::FontWeight => matches!(self, Self::Normal | Self::Bold | Self::Bolder),
            _ => matches!(self, Self::Auto) && property.takes_length(),
        }
    }
}

/// A resolved property value as answered by the cascade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PropValue {
    /// A colour.
    Color(Rgba),
    /// A length with unit.
    Length(Length),
    /// A plain number (numeric font weights).
    Number(Fx),
    /// An enumerated keyword.
    Keyword(Keyword),
    /// Free text (font family lists).
    Text(String),
}

/// Parse `input` as a value of `property`.
///
/// # Errors
///
/// [`CssError::InvalidValue`] when the text is not acceptable for the
/// property.
pub fn parse_value(property: PropertyId, input: &str) -> Result<PropValue, CssError> {
    let input = input.trim();
    let invalid = || CssError::InvalidValue {
        property,
        value: input.to_string(),
    };

    if let Ok(keyword) = input.parse::<Keyword>() {
        return if keyword.applies_to(property) {
            Ok(PropValue::Keyword(keyword))
        } else {
            Err(invalid())
        };
    }

    match property {
        PropertyId::Color | PropertyId::BackgroundColor => {
            Rgba::parse(input).map(PropValue::Color).ok_or_else(invalid)
        }
        PropertyId::FontWeight => input
            .parse::<Fx>()
            .ok()
            .filter(|w| *w > Fx::ZERO)
            .map(PropValue::Number)
            .ok_or_else(invalid),
        PropertyId::FontFamily if !input.is_empty() => Ok(PropValue::Text(input.to_string())),
        p if p.takes_length() => Length::parse(input)
            .map(PropValue::Length)
            .ok_or_else(invalid),
        _ => Err(invalid()),
    }
}
