use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Innings pitched, counted in outs.
///
/// Box scores write innings in baseball notation where the digit after the
/// point is a count of outs (`6.2` is six innings and two outs, 20 outs). All
/// arithmetic happens on outs; notation is only a view.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Outs(pub u32);

impl Outs {
    pub const PER_INNING: u32 = 3;
    pub const ZERO: Outs = Outs(0);
    /// Nine innings.
    pub const REGULATION: Outs = Outs(27);

    pub fn from_innings(innings: u32) -> Self {
        Outs(innings * Self::PER_INNING)
    }

    /// Parses notation such as `4.2`. Negative or NaN input is zero outs.
    pub fn from_notation(value: f64) -> Self {
        if value.is_nan() || value <= 0.0 {
            return Outs::ZERO;
        }
        let whole = value.trunc();
        let extra = ((value - whole) * 10.0).round();
        Outs(whole as u32 * Self::PER_INNING + extra as u32)
    }

    pub fn notation(self) -> f64 {
        f64::from(self.whole_innings()) + f64::from(self.0 % Self::PER_INNING) * 0.1
    }

    /// True innings (`20 outs` is `6.667`).
    pub fn innings(self) -> f64 {
        f64::from(self.0) / f64::from(Self::PER_INNING)
    }

    pub fn whole_innings(self) -> u32 {
        self.0 / Self::PER_INNING
    }

    pub fn saturating_sub(self, other: Outs) -> Outs {
        Outs(self.0.saturating_sub(other.0))
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Outs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.whole_innings(), self.0 % Self::PER_INNING)
    }
}

impl Add for Outs {
    type Output = Outs;

    fn add(self, rhs: Outs) -> Outs {
        Outs(self.0 + rhs.0)
    }
}

impl AddAssign for Outs {
    fn add_assign(&mut self, rhs: Outs) {
        self.0 += rhs.0;
    }
}

impl Sum for Outs {
    fn sum<I: Iterator<Item = Outs>>(iter: I) -> Outs {
        iter.fold(Outs::ZERO, Add::add)
    }
}
