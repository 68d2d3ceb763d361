use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed taxonomy of service categories used to match contractors to
/// tenders. Pure lookup data; adding a variant is a schema change for the
/// whole marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeCategory {
    Plumbing,
    Electrical,
    Heating,
    Carpentry,
    General,
    Other,
}

impl TradeCategory {
    pub const ALL: [TradeCategory; 6] = [
        TradeCategory::Plumbing,
        TradeCategory::Electrical,
        TradeCategory::Heating,
        TradeCategory::Carpentry,
        TradeCategory::General,
        TradeCategory::Other,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            TradeCategory::Plumbing => "plumbing",
            TradeCategory::Electrical => "electrical",
            TradeCategory::Heating => "heating",
            TradeCategory::Carpentry => "carpentry",
            TradeCategory::General => "general",
            TradeCategory::Other => "other",
        }
    }

    /// Human-facing name used in notifications and listings.
    pub const fn display_name(self) -> &'static str {
        match self {
            TradeCategory::Plumbing => "Plumbing",
            TradeCategory::Electrical => "Electrical",
            TradeCategory::Heating => "Heating & Gas",
            TradeCategory::Carpentry => "Carpentry & Joinery",
            TradeCategory::General => "General Maintenance",
            TradeCategory::Other => "Other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|trade| trade.label() == value.trim().to_ascii_lowercase())
    }
}

impl fmt::Display for TradeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
