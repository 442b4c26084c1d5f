use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Priority label assigned by the classifier (or defaulted on failure).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
    Other,
}

impl Priority {
    pub const ALL: [Self; 4] = [Self::High, Self::Medium, Self::Low, Self::Other];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
            Self::Other => "Other",
        }
    }

    /// Sort rank for admin listings: High sorts before Medium, Medium
    /// before Low, Low before Other.
    #[must_use]
    pub const fn rank(self) -> i32 {
        match self {
            Self::High => 1,
            Self::Medium => 2,
            Self::Low => 3,
            Self::Other => 4,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "High" => Ok(Self::High),
            "Medium" => Ok(Self::Medium),
            "Low" => Ok(Self::Low),
            "Other" => Ok(Self::Other),
            _ => Err(()),
        }
    }
}

/// Complaint lifecycle label.
///
/// The expected path is Registered -> Under Review -> In Progress ->
/// Resolved, but transition ordering is not enforced: an admin may set any
/// status from any other status. Validity is membership in this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Registered,
    UnderReview,
    InProgress,
    Resolved,
}

impl Status {
    pub const ALL: [Self; 4] = [
        Self::Registered,
        Self::UnderReview,
        Self::InProgress,
        Self::Resolved,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Registered => "Registered",
            Self::UnderReview => "Under Review",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Registered" => Ok(Self::Registered),
            "Under Review" => Ok(Self::UnderReview),
            "In Progress" => Ok(Self::InProgress),
            "Resolved" => Ok(Self::Resolved),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_round_trips_through_strings() {
        for p in Priority::ALL {
            assert_eq!(p.as_str().parse::<Priority>(), Ok(p));
        }
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn priority_rank_orders_high_first() {
        assert!(Priority::High.rank() < Priority::Medium.rank());
        assert!(Priority::Medium.rank() < Priority::Low.rank());
        assert!(Priority::Low.rank() < Priority::Other.rank());
    }

    #[test]
    fn status_round_trips_through_strings() {
        for s in Status::ALL {
            assert_eq!(s.as_str().parse::<Status>(), Ok(s));
        }
        assert!("Closed".parse::<Status>().is_err());
    }

    #[test]
    fn status_labels_match_storage_format() {
        assert_eq!(Status::UnderReview.as_str(), "Under Review");
        assert_eq!(Status::InProgress.as_str(), "In Progress");
    }
}
