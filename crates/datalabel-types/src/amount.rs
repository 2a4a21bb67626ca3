use serde::{Deserialize, Serialize};
use std::fmt;

/// An amount of QU, the native currency funding the reward pool.
///
/// QU has no fractional unit, so the inner value is the amount itself.
/// All arithmetic on balances goes through the checked constructors;
/// saturating variants exist for counters that must not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QuAmount(u64);

impl QuAmount {
    pub const ZERO: Self = Self(0);
    pub const MAX: Self = Self(u64::MAX);

    pub const fn from_qu(qu: u64) -> Self {
        Self(qu)
    }

    pub const fn to_qu(&self) -> u64 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(&self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(&self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// Scales the amount by a count, e.g. a per-worker reward by the
    /// number of winners in a payout batch.
    pub fn checked_mul(&self, count: u64) -> Option<Self> {
        self.0.checked_mul(count).map(Self)
    }

    pub fn saturating_add(&self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(&self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl fmt::Display for QuAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} QU", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_arithmetic() {
        let a = QuAmount::from_qu(100);
        let b = QuAmount::from_qu(30);

        assert_eq!(a.checked_add(b), Some(QuAmount::from_qu(130)));
        assert_eq!(a.checked_sub(b), Some(QuAmount::from_qu(70)));
        assert_eq!(b.checked_sub(a), None);
        assert_eq!(QuAmount::MAX.checked_add(QuAmount::from_qu(1)), None);
    }

    #[test]
    fn test_checked_mul() {
        let reward = QuAmount::from_qu(1000);
        assert_eq!(reward.checked_mul(3), Some(QuAmount::from_qu(3000)));
        assert_eq!(QuAmount::MAX.checked_mul(2), None);
        assert_eq!(reward.checked_mul(0), Some(QuAmount::ZERO));
    }

    #[test]
    fn test_saturating() {
        assert_eq!(
            QuAmount::MAX.saturating_add(QuAmount::from_qu(5)),
            QuAmount::MAX
        );
        assert_eq!(
            QuAmount::ZERO.saturating_sub(QuAmount::from_qu(5)),
            QuAmount::ZERO
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(QuAmount::from_qu(1000).to_string(), "1000 QU");
        assert!(QuAmount::ZERO.is_zero());
    }

    #[test]
    fn test_serializes_as_bare_number() {
        let amount = QuAmount::from_qu(1000);
        assert_eq!(serde_json::to_string(&amount).unwrap(), "1000");
        let back: QuAmount = serde_json::from_str("1000").unwrap();
        assert_eq!(back, amount);
    }
}
