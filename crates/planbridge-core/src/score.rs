//! HardSoftScore - Two-level score with hard and soft constraints

use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub};
use std::str::FromStr;

/// A score with separate hard and soft constraint levels.
///
/// Hard constraints must be satisfied for a solution to be feasible.
/// Soft constraints are optimization objectives.
///
/// When comparing scores:
/// 1. Hard scores are compared first
/// 2. Soft scores are only compared when hard scores are equal
///
/// # Examples
///
/// ```
/// use planbridge_core::HardSoftScore;
///
/// let score1 = HardSoftScore::of(-1, -100); // 1 hard constraint broken
/// let score2 = HardSoftScore::of(0, -200);  // Feasible but poor soft score
///
/// // Feasible solutions are always better than infeasible ones
/// assert!(score2 > score1);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HardSoftScore {
    hard: i64,
    soft: i64,
}

impl HardSoftScore {
    /// The zero score.
    pub const ZERO: HardSoftScore = HardSoftScore { hard: 0, soft: 0 };

    /// One hard constraint unit.
    pub const ONE_HARD: HardSoftScore = HardSoftScore { hard: 1, soft: 0 };

    /// One soft constraint unit.
    pub const ONE_SOFT: HardSoftScore = HardSoftScore { hard: 0, soft: 1 };

    /// Creates a new HardSoftScore.
    #[inline]
    pub const fn of(hard: i64, soft: i64) -> Self {
        HardSoftScore { hard, soft }
    }

    /// Creates a score with only a hard component.
    #[inline]
    pub const fn of_hard(hard: i64) -> Self {
        HardSoftScore { hard, soft: 0 }
    }

    /// Creates a score with only a soft component.
    #[inline]
    pub const fn of_soft(soft: i64) -> Self {
        HardSoftScore { hard: 0, soft }
    }

    /// Returns the hard score component.
    #[inline]
    pub const fn hard(&self) -> i64 {
        self.hard
    }

    /// Returns the soft score component.
    #[inline]
    pub const fn soft(&self) -> i64 {
        self.soft
    }

    /// Returns true if no hard constraints are broken.
    #[inline]
    pub const fn is_feasible(&self) -> bool {
        self.hard >= 0
    }

    /// Multiplies both levels by an integer factor.
    #[inline]
    pub const fn scale(&self, factor: i64) -> Self {
        HardSoftScore {
            hard: self.hard * factor,
            soft: self.soft * factor,
        }
    }
}

impl PartialOrd for HardSoftScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HardSoftScore {
    fn cmp(&self, other: &Self) -> Ordering {
        self.hard
            .cmp(&other.hard)
            .then_with(|| self.soft.cmp(&other.soft))
    }
}

impl Add for HardSoftScore {
    type Output = HardSoftScore;

    fn add(self, rhs: Self) -> Self {
        HardSoftScore::of(self.hard + rhs.hard, self.soft + rhs.soft)
    }
}

impl AddAssign for HardSoftScore {
    fn add_assign(&mut self, rhs: Self) {
        self.hard += rhs.hard;
        self.soft += rhs.soft;
    }
}

impl Sub for HardSoftScore {
    type Output = HardSoftScore;

    fn sub(self, rhs: Self) -> Self {
        HardSoftScore::of(self.hard - rhs.hard, self.soft - rhs.soft)
    }
}

impl Neg for HardSoftScore {
    type Output = HardSoftScore;

    fn neg(self) -> Self {
        HardSoftScore::of(-self.hard, -self.soft)
    }
}

impl Sum for HardSoftScore {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(HardSoftScore::ZERO, Add::add)
    }
}

impl fmt::Display for HardSoftScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}hard/{}soft", self.hard, self.soft)
    }
}

impl fmt::Debug for HardSoftScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Error produced when parsing a score string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreParseError(pub String);

impl fmt::Display for ScoreParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid score string: {}", self.0)
    }
}

impl std::error::Error for ScoreParseError {}

impl FromStr for HardSoftScore {
    type Err = ScoreParseError;

    /// Parses `"1hard"`, `"2soft"` or the full `"1hard/2soft"` form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parse_level = |part: &str, suffix: &str| -> Result<i64, ScoreParseError> {
            part.trim()
                .strip_suffix(suffix)
                .ok_or_else(|| ScoreParseError(s.to_string()))?
                .parse()
                .map_err(|_| ScoreParseError(s.to_string()))
        };

        if let Some((hard_part, soft_part)) = s.split_once('/') {
            let hard = parse_level(hard_part, "hard")?;
            let soft = parse_level(soft_part, "soft")?;
            return Ok(HardSoftScore::of(hard, soft));
        }
        if s.ends_with("hard") {
            return Ok(HardSoftScore::of_hard(parse_level(s, "hard")?));
        }
        if s.ends_with("soft") {
            return Ok(HardSoftScore::of_soft(parse_level(s, "soft")?));
        }
        Err(ScoreParseError(s.to_string()))
    }
}
