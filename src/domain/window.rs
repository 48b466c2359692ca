// Time window domain model
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Symbolic look-back range offered to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RangeSelector {
    #[serde(rename = "1h")]
    LastHour,
    #[default]
    #[serde(rename = "24h")]
    LastDay,
    #[serde(rename = "7d")]
    LastWeek,
    #[serde(rename = "30d")]
    LastMonth,
}

impl RangeSelector {
    pub const ALL: [RangeSelector; 4] = [
        RangeSelector::LastHour,
        RangeSelector::LastDay,
        RangeSelector::LastWeek,
        RangeSelector::LastMonth,
    ];

    pub fn duration_secs(self) -> i64 {
        match self {
            RangeSelector::LastHour => 3_600,
            RangeSelector::LastDay => 86_400,
            RangeSelector::LastWeek => 604_800,
            RangeSelector::LastMonth => 2_592_000,
        }
    }

    /// Short code used on the wire and on the command line.
    pub fn code(self) -> &'static str {
        match self {
            RangeSelector::LastHour => "1h",
            RangeSelector::LastDay => "24h",
            RangeSelector::LastWeek => "7d",
            RangeSelector::LastMonth => "30d",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RangeSelector::LastHour => "Last Hour",
            RangeSelector::LastDay => "Last 24 Hours",
            RangeSelector::LastWeek => "Last 7 Days",
            RangeSelector::LastMonth => "Last 30 Days",
        }
    }

    pub fn next(self) -> Self {
        match self {
            RangeSelector::LastHour => RangeSelector::LastDay,
            RangeSelector::LastDay => RangeSelector::LastWeek,
            RangeSelector::LastWeek => RangeSelector::LastMonth,
            RangeSelector::LastMonth => RangeSelector::LastHour,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            RangeSelector::LastHour => RangeSelector::LastMonth,
            RangeSelector::LastDay => RangeSelector::LastHour,
            RangeSelector::LastWeek => RangeSelector::LastDay,
            RangeSelector::LastMonth => RangeSelector::LastWeek,
        }
    }
}

impl fmt::Display for RangeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown range '{0}', expected one of 1h, 24h, 7d, 30d")]
pub struct UnknownRange(pub String);

impl FromStr for RangeSelector {
    type Err = UnknownRange;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RangeSelector::ALL
            .into_iter()
            .find(|range| range.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownRange(s.to_string()))
    }
}

/// Absolute `[from, to]` interval in epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    pub from: i64,
    pub to: i64,
}

impl TimeWindow {
    /// Window of the selector's duration ending at `now`.
    pub fn ending_at(selector: RangeSelector, now: i64) -> Self {
        Self {
            from: now - selector.duration_secs(),
            to: now,
        }
    }

    /// Window ending at the current wall-clock second. Not cached: every call
    /// anchors at its own "now".
    pub fn resolve(selector: RangeSelector) -> Self {
        Self::ending_at(selector, chrono::Utc::now().timestamp())
    }

    pub fn duration_secs(&self) -> i64 {
        self.to - self.from
    }
}
