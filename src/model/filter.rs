use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::task::Task;

/// Which tasks a view shows, by completion status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl StatusFilter {
    /// Every selector, in display order
    pub const ALL: [StatusFilter; 3] = [
        StatusFilter::All,
        StatusFilter::Active,
        StatusFilter::Completed,
    ];

    /// Parse a selector name (case-insensitive)
    pub fn parse_filter(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Some(StatusFilter::All),
            "active" => Some(StatusFilter::Active),
            "completed" => Some(StatusFilter::Completed),
            _ => None,
        }
    }

    /// Whether a task passes this selector
    pub fn admits(self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => !task.completed,
            StatusFilter::Completed => task.completed,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusFilter::All => "All",
            StatusFilter::Active => "Active",
            StatusFilter::Completed => "Completed",
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => write!(f, "all"),
            StatusFilter::Active => write!(f, "active"),
            StatusFilter::Completed => write!(f, "completed"),
        }
    }
}
