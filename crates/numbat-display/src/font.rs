//! Font capability: choice, metrics and text fitting.
//!
//! [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
//!
//! "CSS assumes that every font has font metrics that specify a
//! characteristic height above the baseline and a depth below it."
//!
//! Layout never sees glyph outlines. It asks a [`FontProvider`] for a handle
//! matching a [`FontChoice`], then uses the handle's fixed line height and
//! ascent for baseline grouping and [`FontMetrics::fit`] for wrapping.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use numbat_common::Fx;
use serde::{Deserialize, Serialize};

/// What the layout asks for when it needs a font.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontChoice {
    /// Comma separated family list, most preferred first.
    pub family: String,
    /// Line height in px; also the nominal size.
    pub fixed_height: Fx,
    /// [§ 3.2 font-weight](https://www.w3.org/TR/css-fonts-4/#font-weight-prop)
    /// Numeric weight: 400 is normal, 700 is bold.
    pub weight: u16,
}

impl Default for FontChoice {
    fn default() -> Self {
        Self {
            family: "serif".to_string(),
            fixed_height: Fx::from_whole(16),
            weight: 400,
        }
    }
}

/// Result of fitting text into a width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fit {
    /// Bytes of the input taken into this run (always on a char boundary).
    pub consumed: usize,
    /// True when input remains that belongs on the next line.
    pub wrapped: bool,
    /// Measured width of the consumed text, without trailing whitespace.
    pub width: Fx,
    /// Height of the run.
    pub height: Fx,
}

/// Metrics of a chosen font.
///
/// Implementors provide per-codepoint advances and the fixed vertical
/// metrics; fitting is derived.
pub trait FontMetrics: fmt::Debug {
    /// The fixed line height.
    fn line_height(&self) -> Fx;

    /// Distance from the top of the line to the baseline.
    fn ascent(&self) -> Fx;

    /// Horizontal advance of one codepoint.
    fn advance(&self, ch: char) -> Fx;

    /// Total advance of a string.
    fn text_width(&self, text: &str) -> Fx {
        text.chars().fold(Fx::ZERO, |w, ch| w + self.advance(ch))
    }

    /// [§ 5.5.2 Breaking Rules](https://www.w3.org/TR/css-text-3/#line-break-details)
    ///
    /// Take as much of `text` as fits in `max_width`.
    ///
    /// STEP 1: A soft wrap opportunity exists after every space or tab run;
    /// the run hangs and is not measured.
    ///
    /// STEP 2: A newline is a forced break and is consumed with the line.
    ///
    /// STEP 3: When the next word would overflow, break at the last
    /// opportunity. "If the word is too long to fit on a line by itself,
    /// break at an arbitrary point."
    ///
    /// At least one character of non-empty input is always consumed.
    fn fit(&self, text: &str, max_width: Fx) -> Fit {
        let height = self.line_height();
        let mut committed = Fx::ZERO;
        let mut hanging = Fx::ZERO;
        let mut last_break: Option<(usize, Fx)> = None;

        for (idx, ch) in text.char_indices() {
            let end = idx + ch.len_utf8();
            match ch {
                // STEP 2
                '\n' => {
                    return Fit {
                        consumed: end,
                        wrapped: end < text.len(),
                        width: committed,
                        height,
                    };
                }
                // STEP 1
                ' ' | '\t' => {
                    hanging += self.advance(ch);
                    last_break = Some((end, committed));
                }
                _ => {
                    let candidate = committed + hanging + self.advance(ch);
                    if candidate > max_width && idx > 0 {
                        // STEP 3
                        let (consumed, width) = last_break.unwrap_or((idx, committed));
                        return Fit {
                            consumed,
                            wrapped: true,
                            width,
                            height,
                        };
                    }
                    committed = candidate;
                    hanging = Fx::ZERO;
                }
            }
        }

        Fit {
            consumed: text.len(),
            wrapped: false,
            width: committed,
            height,
        }
    }
}

/// A shared font handle; frames memoize one each.
pub type FontHandle = Rc<dyn FontMetrics>;

/// Maps a [`FontChoice`] to a handle. Always answers: providers fall back
/// rather than fail.
pub trait FontProvider {
    /// Choose the best available font for `choice`.
    fn choose(&mut self, choice: &FontChoice) -> FontHandle;
}

/// A deterministic fixed-pitch font.
///
/// Each codepoint advances 3/5 of the size (bold weights widen by a
/// further 1/10), the ascent is 4/5 of the size and the line height equals
/// the size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPitchFont {
    size: Fx,
    advance: Fx,
}

/// Weights at or above this are drawn wider.
const BOLD_WEIGHT: u16 = 700;

impl FixedPitchFont {
    /// A font for `size` and `weight`.
    #[must_use]
    pub fn new(size: Fx, weight: u16) -> Self {
        let mut advance = size.scale(3, 5);
        if weight >= BOLD_WEIGHT {
            advance += size.div_int(10);
        }
        Self { size, advance }
    }
}

impl FontMetrics for FixedPitchFont {
    fn line_height(&self) -> Fx {
        self.size
    }

    fn ascent(&self) -> Fx {
        self.size.scale(4, 5)
    }

    fn advance(&self, ch: char) -> Fx {
        if ch == '\n' { Fx::ZERO } else { self.advance }
    }
}

/// [`FontProvider`] handing out [`FixedPitchFont`]s, one cached handle per
/// distinct choice.
#[derive(Debug, Default)]
pub struct FixedPitchFonts {
    cache: HashMap<FontChoice, FontHandle>,
}

impl FixedPitchFonts {
    /// An empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct handles created so far.
    #[must_use]
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

impl FontProvider for FixedPitchFonts {
    fn choose(&mut self, choice: &FontChoice) -> FontHandle {
        Rc::clone(self.cache.entry(choice.clone()).or_insert_with(|| {
            log::debug!(
                target: "numbat::font",
                "new font {} {}px weight {}",
                choice.family,
                choice.fixed_height,
                choice.weight
            );
            Rc::new(FixedPitchFont::new(choice.fixed_height, choice.weight))
        }))
    }
}
