use serde::{Deserialize, Serialize};
use std::fmt;

/// A worker's answer for a task.
///
/// Labels are opaque to the contract: the byte is whatever the task's
/// option list means off-chain (0 = first option, 1 = second, ...).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Label(u8);

impl Label {
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    pub const fn value(&self) -> u8 {
        self.0
    }
}

impl From<u8> for Label {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Label({})", self.0)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
