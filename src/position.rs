// src/position.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// The fantasy-relevant statistical categories published by the stats site.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PositionCode {
    QB,
    RB,
    WR,
    TE,
    K,
    DST,
}

impl PositionCode {
    /// Every position, in the order the pipeline processes them.
    pub const ALL: [PositionCode; 6] = [
        PositionCode::QB,
        PositionCode::RB,
        PositionCode::WR,
        PositionCode::TE,
        PositionCode::K,
        PositionCode::DST,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PositionCode::QB => "QB",
            PositionCode::RB => "RB",
            PositionCode::WR => "WR",
            PositionCode::TE => "TE",
            PositionCode::K => "K",
            PositionCode::DST => "DST",
        }
    }

    /// Exact match on the label shown on the site (`"QB"`, `"DST"`, ...).
    pub fn from_label(label: &str) -> Option<Self> {
        PositionCode::ALL
            .into_iter()
            .find(|p| p.as_str() == label.trim())
    }

    /// Lower-cased code used as the stats page path segment.
    pub fn path_segment(&self) -> String {
        self.as_str().to_ascii_lowercase()
    }

    /// `<POSITION>_stats.csv`
    pub fn file_name(&self) -> String {
        format!("{}_stats.csv", self.as_str())
    }

    /// Name of the identity column in this position's output.
    pub fn identity_column(&self) -> &'static str {
        match self {
            PositionCode::DST => "team",
            _ => "player",
        }
    }
}

impl fmt::Display for PositionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
