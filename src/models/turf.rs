use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurfType {
    Natural,
    Artificial,
    Hybrid,
}

impl TurfType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurfType::Natural => "natural",
            TurfType::Artificial => "artificial",
            TurfType::Hybrid => "hybrid",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "natural" | "grass" => Some(TurfType::Natural),
            "artificial" | "synthetic" => Some(TurfType::Artificial),
            "hybrid" => Some(TurfType::Hybrid),
            _ => None,
        }
    }

    /// Hours of rain it takes to knock one unit of damage into this surface.
    /// Lower means more rain-sensitive.
    pub const fn rain_cut_hours(&self) -> u32 {
        match self {
            TurfType::Artificial => 6,
            TurfType::Hybrid => 4,
            TurfType::Natural => 3,
        }
    }

    /// Hours the surface needs to dry out before maintenance can start.
    pub const fn drying_hours(&self) -> i64 {
        match self {
            TurfType::Artificial => 12,
            TurfType::Hybrid => 24,
            TurfType::Natural => 36,
        }
    }

    pub fn all() -> &'static [TurfType] {
        &[TurfType::Natural, TurfType::Artificial, TurfType::Hybrid]
    }
}

impl std::fmt::Display for TurfType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
