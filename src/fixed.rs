//! 8.8 fixed-point numbers for sub-pixel motion.
//!
//! The high part is whole pixels, the low 8 bits are the fraction.  Values
//! are stored in an `i32` so a position plus a velocity never overflows,
//! even though every quantity the games use fits in 16 bits.

use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// Number of fractional bits.
pub const FRAC_BITS: u32 = 8;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fixed(i32);

impl Fixed {
    pub const ZERO: Fixed = Fixed(0);
    /// One whole pixel.
    pub const ONE: Fixed = Fixed(1 << FRAC_BITS);

    /// Wrap a raw 8.8 value, e.g. `0x0140` = 1.25 px.
    pub const fn from_raw(raw: i32) -> Self {
        Fixed(raw)
    }

    pub const fn from_px(px: i32) -> Self {
        Fixed(px << FRAC_BITS)
    }

    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Whole-pixel part (floor).
    pub const fn px(self) -> i32 {
        self.0 >> FRAC_BITS
    }

    pub const fn abs(self) -> Self {
        Fixed(self.0.abs())
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn clamp(self, min: Fixed, max: Fixed) -> Self {
        Fixed(self.0.clamp(min.0, max.0))
    }

    /// Clamp the magnitude into `[min, max]`, keeping the sign.  Zero is
    /// treated as positive.
    pub fn clamp_magnitude(self, min: Fixed, max: Fixed) -> Self {
        let mag = self.0.abs().clamp(min.0, max.0);
        if self.0 < 0 {
            Fixed(-mag)
        } else {
            Fixed(mag)
        }
    }
}

impl Add for Fixed {
    type Output = Fixed;
    fn add(self, rhs: Fixed) -> Fixed {
        Fixed(self.0 + rhs.0)
    }
}

impl AddAssign for Fixed {
    fn add_assign(&mut self, rhs: Fixed) {
        self.0 += rhs.0;
    }
}

impl Sub for Fixed {
    type Output = Fixed;
    fn sub(self, rhs: Fixed) -> Fixed {
        Fixed(self.0 - rhs.0)
    }
}

impl SubAssign for Fixed {
    fn sub_assign(&mut self, rhs: Fixed) {
        self.0 -= rhs.0;
    }
}

impl Neg for Fixed {
    type Output = Fixed;
    fn neg(self) -> Fixed {
        Fixed(-self.0)
    }
}
