//! Resource catalog for the snapshot API
//!
//! The set of categories the dashboard may request is closed: every
//! category is a variant of [`Category`] and is bound to exactly one
//! JSON resource in backing storage.

use serde::Serialize;
use std::fmt;

/// A telemetry category served under `/api/{category}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Logins,
    Devices,
    Locations,
    Compromised,
    SuricataRules,
    Reports,
}

impl Category {
    /// Every recognized category, in dashboard order
    pub const ALL: [Category; 6] = [
        Category::Logins,
        Category::Devices,
        Category::Locations,
        Category::Compromised,
        Category::SuricataRules,
        Category::Reports,
    ];

    /// Resolve a request path segment. Exact, case-sensitive match only.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "logins" => Some(Self::Logins),
            "devices" => Some(Self::Devices),
            "locations" => Some(Self::Locations),
            "compromised" => Some(Self::Compromised),
            "suricata_rules" => Some(Self::SuricataRules),
            "reports" => Some(Self::Reports),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Logins => "logins",
            Self::Devices => "devices",
            Self::Locations => "locations",
            Self::Compromised => "compromised",
            Self::SuricataRules => "suricata_rules",
            Self::Reports => "reports",
        }
    }

    /// Storage key of the JSON resource bound to this category
    pub fn resource_key(self) -> &'static str {
        match self {
            Self::Logins => "logins.json",
            Self::Devices => "devices.json",
            Self::Locations => "locations.json",
            Self::Compromised => "compromised.json",
            Self::SuricataRules => "suricata_rules.json",
            Self::Reports => "reports.json",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns true iff `name` is one of the recognized category identifiers
pub fn is_valid(name: &str) -> bool {
    Category::from_name(name).is_some()
}

/// Storage key for a category that has already been validated
pub fn resource_key_for(category: Category) -> &'static str {
    category.resource_key()
}
