// =============================================================================
// Timeframe — the seven supported chart resolutions
// =============================================================================
//
// Each timeframe is bound to a fixed retrieval range (how much history the
// chart endpoint is asked for) and a flag marking whether exchange-session
// filtering applies. Intraday resolutions (5m through 4h) carry bars outside
// regular trading hours that must be discarded before analysis.
// =============================================================================

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "4h")]
    H4,
    #[serde(rename = "1d")]
    D1,
    #[serde(rename = "1wk")]
    W1,
    #[serde(rename = "1mo")]
    Mo1,
}

impl Timeframe {
    /// Interval token sent to the chart endpoint.
    pub fn interval(self) -> &'static str {
        match self {
            Self::M5 => "5m",
            Self::M15 => "15m",
            Self::H1 => "1h",
            Self::H4 => "4h",
            Self::D1 => "1d",
            Self::W1 => "1wk",
            Self::Mo1 => "1mo",
        }
    }

    /// Fixed retrieval range for this resolution.
    pub fn range(self) -> &'static str {
        match self {
            Self::M5 => "7d",
            Self::M15 => "15d",
            Self::H1 => "30d",
            Self::H4 => "60d",
            Self::D1 => "3mo",
            Self::W1 => "1y",
            Self::Mo1 => "2y",
        }
    }

    /// Whether bars must be restricted to the exchange session window.
    pub fn is_intraday(self) -> bool {
        matches!(self, Self::M5 | Self::M15 | Self::H1 | Self::H4)
    }

    pub const ALL: [Timeframe; 7] = [
        Self::M5,
        Self::M15,
        Self::H1,
        Self::H4,
        Self::D1,
        Self::W1,
        Self::Mo1,
    ];
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.interval())
    }
}

impl std::str::FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "5m" => Ok(Self::M5),
            "15m" => Ok(Self::M15),
            "1h" => Ok(Self::H1),
            "4h" => Ok(Self::H4),
            "1d" => Ok(Self::D1),
            "1wk" => Ok(Self::W1),
            "1mo" => Ok(Self::Mo1),
            other => Err(format!(
                "unknown timeframe '{other}' (expected 5m, 15m, 1h, 4h, 1d, 1wk or 1mo)"
            )),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_map_matches_resolution_tiers() {
        assert_eq!(Timeframe::M5.range(), "7d");
        assert_eq!(Timeframe::M15.range(), "15d");
        assert_eq!(Timeframe::H1.range(), "30d");
        assert_eq!(Timeframe::H4.range(), "60d");
        assert_eq!(Timeframe::D1.range(), "3mo");
        assert_eq!(Timeframe::W1.range(), "1y");
        assert_eq!(Timeframe::Mo1.range(), "2y");
    }

    #[test]
    fn intraday_flag_splits_at_daily() {
        for tf in [Timeframe::M5, Timeframe::M15, Timeframe::H1, Timeframe::H4] {
            assert!(tf.is_intraday(), "{tf} should be intraday");
        }
        for tf in [Timeframe::D1, Timeframe::W1, Timeframe::Mo1] {
            assert!(!tf.is_intraday(), "{tf} should not be intraday");
        }
    }

    #[test]
    fn from_str_roundtrips_every_variant() {
        for tf in Timeframe::ALL {
            let parsed: Timeframe = tf.interval().parse().unwrap();
            assert_eq!(parsed, tf);
        }
        assert!("2d".parse::<Timeframe>().is_err());
    }

    #[test]
    fn serde_uses_interval_names() {
        let json = serde_json::to_string(&Timeframe::W1).unwrap();
        assert_eq!(json, "\"1wk\"");
        let tf: Timeframe = serde_json::from_str("\"5m\"").unwrap();
        assert_eq!(tf, Timeframe::M5);
    }
}
