//! Temporal validity windows of rate records.

use serde::{Deserialize, Serialize};
use time::Date;

/// True iff `valid_from <= reference <= valid_to`.
///
/// An inverted window (`valid_from > valid_to`) is never valid, whatever the reference date.
pub fn is_valid_on_date(valid_from: Date, valid_to: Date, reference: Date) -> bool {
    valid_from <= valid_to && valid_from <= reference && reference <= valid_to
}

/// Inclusive `[valid_from, valid_to]` window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Validity {
    pub valid_from: Date,
    pub valid_to: Date,
}

impl Validity {
    pub fn new(valid_from: Date, valid_to: Date) -> Self {
        Self {
            valid_from,
            valid_to,
        }
    }

    pub fn contains(&self, reference: Date) -> bool {
        is_valid_on_date(self.valid_from, self.valid_to, reference)
    }

    pub fn is_inverted(&self) -> bool {
        self.valid_from > self.valid_to
    }

    pub fn status_on(&self, reference: Date) -> ValidityStatus {
        if self.is_inverted() {
            ValidityStatus::Inverted
        } else if reference < self.valid_from {
            ValidityStatus::NotYetValid
        } else if reference > self.valid_to {
            ValidityStatus::Expired
        } else {
            ValidityStatus::Active
        }
    }

    /// Whole days left until the window closes, counting the reference day as day zero.
    /// `None` unless the window is active on `reference`.
    pub fn days_remaining(&self, reference: Date) -> Option<i64> {
        self.contains(reference)
            .then(|| (self.valid_to - reference).whole_days())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidityStatus {
    Active,
    Expired,
    NotYetValid,
    Inverted,
}

impl ValidityStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Expired => "expired",
            Self::NotYetValid => "not yet valid",
            Self::Inverted => "inverted window",
        }
    }
}
