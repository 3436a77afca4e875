//! Task priority levels.
//!
//! Four ranked levels (the Eisenhower quadrants) plus "none". The on-disk
//! token is the braced code, `{p1}`..`{p4}`; a task without a priority
//! carries no token at all.

use serde::{Deserialize, Serialize};

/// Closed priority enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    P1,
    P2,
    P3,
    P4,
    #[default]
    None,
}

/// Display metadata for one priority level.
pub struct PriorityMeta {
    pub code: &'static str,
    pub label: &'static str,
    pub color: &'static str,
}

/// All priorities in rank order, highest first. `None` sorts last.
pub const PRIORITIES: [Priority; 5] = [
    Priority::P1,
    Priority::P2,
    Priority::P3,
    Priority::P4,
    Priority::None,
];

impl Priority {
    pub fn meta(self) -> &'static PriorityMeta {
        match self {
            Priority::P1 => &PriorityMeta {
                code: "p1",
                label: "Urgent & Important",
                color: "red",
            },
            Priority::P2 => &PriorityMeta {
                code: "p2",
                label: "Urgent & Not Important",
                color: "orange",
            },
            Priority::P3 => &PriorityMeta {
                code: "p3",
                label: "Not Urgent & Important",
                color: "yellow",
            },
            Priority::P4 => &PriorityMeta {
                code: "p4",
                label: "Not Urgent & Not Important",
                color: "green",
            },
            Priority::None => &PriorityMeta {
                code: "none",
                label: "No Priority",
                color: "blue",
            },
        }
    }

    /// Short code as used in CLI arguments ("p1".."p4", "none").
    pub fn code(self) -> &'static str {
        self.meta().code
    }

    pub fn label(self) -> &'static str {
        self.meta().label
    }

    pub fn color(self) -> &'static str {
        self.meta().color
    }

    /// The in-line markup token, or `None` for the unprioritized level.
    pub fn token(self) -> Option<String> {
        match self {
            Priority::None => None,
            other => Some(format!("{{{}}}", other.code())),
        }
    }

    /// Parse a short code. Unknown codes are not priorities.
    pub fn from_code(code: &str) -> Option<Priority> {
        PRIORITIES
            .iter()
            .copied()
            .find(|priority| priority.code().eq_ignore_ascii_case(code))
    }

    /// Position in the fixed ranking, for sorting and grouping.
    pub fn rank(self) -> usize {
        PRIORITIES
            .iter()
            .position(|priority| *priority == self)
            .unwrap_or(PRIORITIES.len())
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for priority in PRIORITIES {
            assert_eq!(Priority::from_code(priority.code()), Some(priority));
        }
    }

    #[test]
    fn unknown_code_is_rejected() {
        assert_eq!(Priority::from_code("p5"), None);
        assert_eq!(Priority::from_code("urgent"), None);
    }

    #[test]
    fn none_has_no_token() {
        assert_eq!(Priority::None.token(), None);
        assert_eq!(Priority::P2.token().as_deref(), Some("{p2}"));
    }

    #[test]
    fn rank_orders_highest_first() {
        assert!(Priority::P1.rank() < Priority::P4.rank());
        assert!(Priority::P4.rank() < Priority::None.rank());
    }
}
