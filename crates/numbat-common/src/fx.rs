//! Saturating fixed-point numbers.
//!
//! Every length the layout engine touches (viewport size, cursors, boxes,
//! font metrics) is an [`Fx`]: a signed 32.32 fixed-point value. Arithmetic
//! saturates at the representable range instead of wrapping or panicking, so
//! pathological style input can push a box off-screen but never corrupt the
//! tree.

use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

use fixed::types::I32F32;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A `(whole, fraction)` fixed-point value with saturating arithmetic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fx(I32F32);

/// Error returned when a decimal string is not a valid [`Fx`].
#[derive(Debug, thiserror::Error)]
#[error("invalid fixed-point value '{input}'")]
pub struct ParseFxError {
    input: String,
    #[source]
    source: fixed::ParseFixedError,
}

impl Fx {
    /// Zero.
    pub const ZERO: Self = Self(I32F32::ZERO);

    /// Largest representable value; saturated sums stop here.
    pub const MAX: Self = Self(I32F32::MAX);

    /// Smallest representable value.
    pub const MIN: Self = Self(I32F32::MIN);

    /// A value with the given whole part and no fraction.
    #[must_use]
    pub const fn from_whole(whole: i32) -> Self {
        Self(I32F32::from_bits((whole as i64) << 32))
    }

    /// `num / den`, saturating on division by zero.
    #[must_use]
    pub fn from_ratio(num: i32, den: i32) -> Self {
        Self::from_whole(num).div_int(den)
    }

    /// The whole part, rounded toward negative infinity.
    #[must_use]
    pub fn whole(self) -> i32 {
        self.0.int().to_num::<i32>()
    }

    /// The fractional part, always in `[0, 1)`.
    #[must_use]
    pub fn frac(self) -> Self {
        Self(self.0.frac())
    }

    /// True when both fields are zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0.to_bits() == 0
    }

    /// True when the value has no fractional part.
    #[must_use]
    pub const fn is_integral(self) -> bool {
        self.0.to_bits() & 0xffff_ffff == 0
    }

    /// Division by an integer. Division by zero saturates toward the sign of
    /// the numerator (zero stays zero).
    #[must_use]
    pub fn div_int(self, divisor: i32) -> Self {
        match self.0.checked_div_int(i64::from(divisor)) {
            Some(v) => Self(v),
            None => self.saturated(),
        }
    }

    /// Division by another fixed-point value, saturating like [`Fx::div_int`].
    #[must_use]
    pub fn div(self, divisor: Self) -> Self {
        self.0.checked_div(divisor.0).map_or_else(|| self.saturated(), Self)
    }

    /// Half of the value; used for centering.
    #[must_use]
    pub fn half(self) -> Self {
        self.div_int(2)
    }

    /// Multiplication by an integer, saturating.
    #[must_use]
    pub fn mul_int(self, factor: i32) -> Self {
        Self(self.0.saturating_mul_int(i64::from(factor)))
    }

    /// Multiplication by another fixed-point value, saturating.
    #[must_use]
    pub fn mul(self, rhs: Self) -> Self {
        Self(self.0.saturating_mul(rhs.0))
    }

    /// `self * num / den`, the ratio form font metrics are expressed in.
    #[must_use]
    pub fn scale(self, num: i32, den: i32) -> Self {
        self.mul_int(num).div_int(den)
    }

    /// Clamp negative values to zero.
    #[must_use]
    pub fn non_negative(self) -> Self {
        self.max(Self::ZERO)
    }

    const fn saturated(self) -> Self {
        let bits = self.0.to_bits();
        if bits == 0 {
            Self::ZERO
        } else if bits > 0 {
            Self::MAX
        } else {
            Self::MIN
        }
    }
}

impl Add for Fx {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Fx {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Fx {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Fx {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Neg for Fx {
    type Output = Self;

    fn neg(self) -> Self {
        Self(self.0.saturating_neg())
    }
}

impl From<i32> for Fx {
    fn from(whole: i32) -> Self {
        Self::from_whole(whole)
    }
}

impl fmt::Display for Fx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for Fx {
    type Err = ParseFxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        I32F32::from_str(s.trim())
            .map(Self)
            .map_err(|source| ParseFxError {
                input: s.to_string(),
                source,
            })
    }
}

impl Serialize for Fx {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_integral() {
            serializer.serialize_i32(self.whole())
        } else {
            serializer.collect_str(self)
        }
    }
}

impl<'de> Deserialize<'de> for Fx {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(FxVisitor)
    }
}

struct FxVisitor;

impl Visitor<'_> for FxVisitor {
    type Value = Fx;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer or a decimal string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Fx, E> {
        i32::try_from(v)
            .map(Fx::from_whole)
            .map_err(|_| E::custom(format!("{v} is out of range")))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Fx, E> {
        i32::try_from(v)
            .map(Fx::from_whole)
            .map_err(|_| E::custom(format!("{v} is out of range")))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Fx, E> {
        Err(E::custom(format!(
            "{v}: fractional values must be written as strings"
        )))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Fx, E> {
        v.parse().map_err(E::custom)
    }
}
