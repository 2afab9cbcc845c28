//! Status enums for the ATS entities.
//!
//! Statuses are persisted as snake_case TEXT; rows carry them as `String`
//! and the handlers parse them through these enums so that every status
//! change goes through the transition tables in `pipeline::transitions`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! status_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!(
                        "unknown {} '{other}'",
                        stringify!($name)
                    )),
                }
            }
        }
    };
}

status_enum!(JobStatus {
    Draft => "draft",
    Open => "open",
    OnHold => "on_hold",
    Closed => "closed",
    Filled => "filled",
});

status_enum!(JobType {
    FullTime => "full_time",
    PartTime => "part_time",
    Contract => "contract",
    Internship => "internship",
});

status_enum!(ApplicationStatus {
    Pending => "pending",
    Reviewing => "reviewing",
    Approved => "approved",
    Rejected => "rejected",
});

// Status of a candidate's per-job application sub-record as it moves
// through the hiring pipeline.
status_enum!(PipelineStatus {
    New => "new",
    Screening => "screening",
    Interview => "interview",
    Offer => "offer",
    Hired => "hired",
    Rejected => "rejected",
    Withdrawn => "withdrawn",
});

status_enum!(InterviewStatus {
    Scheduled => "scheduled",
    Completed => "completed",
    Cancelled => "cancelled",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_text() {
        for status in JobStatus::ALL {
            assert_eq!(JobStatus::from_str(status.as_str()), Ok(*status));
        }
        for status in PipelineStatus::ALL {
            assert_eq!(PipelineStatus::from_str(status.as_str()), Ok(*status));
        }
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        assert!(JobStatus::from_str("archived").is_err());
        assert!(ApplicationStatus::from_str("").is_err());
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&JobStatus::OnHold).unwrap();
        assert_eq!(json, "\"on_hold\"");
    }
}
