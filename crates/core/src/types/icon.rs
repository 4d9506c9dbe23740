//! Tribute icon choice.

use serde::{Deserialize, Serialize};

/// The symbol a visitor picks when leaving a tribute.
///
/// Stored as the lowercase variant name. Older documents may carry an empty
/// string or no icon at all; those read as `None` at the call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TributeIcon {
    Candle,
    Flower,
    Feather,
}

impl TributeIcon {
    /// All icons in the order the form offers them.
    pub const ALL: [Self; 3] = [Self::Candle, Self::Flower, Self::Feather];

    /// Stored value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Candle => "candle",
            Self::Flower => "flower",
            Self::Feather => "feather",
        }
    }

    /// Caption shown under the icon in the tribute form.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Candle => "Light a Candle",
            Self::Flower => "Lay a Flower",
            Self::Feather => "Leave a Note",
        }
    }

    /// Parse a stored value, treating empty and unknown values as no icon.
    #[must_use]
    pub fn from_stored(value: &str) -> Option<Self> {
        value.parse().ok()
    }
}

impl std::fmt::Display for TributeIcon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TributeIcon {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "candle" => Ok(Self::Candle),
            "flower" => Ok(Self::Flower),
            "feather" => Ok(Self::Feather),
            _ => Err(format!("invalid tribute icon: {s}")),
        }
    }
}
