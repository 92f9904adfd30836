use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Coarse three-level risk category, as chosen from the generation form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskProfile {
    Conservative,
    Moderate,
    Aggressive,
}

impl RiskProfile {
    /// Wire name (`"conservative"`, `"moderate"`, `"aggressive"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskProfile::Conservative => "conservative",
            RiskProfile::Moderate => "moderate",
            RiskProfile::Aggressive => "aggressive",
        }
    }

    /// Parse a wire name, case-insensitively.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value.trim().to_lowercase().as_str() {
            "conservative" => Ok(RiskProfile::Conservative),
            "moderate" => Ok(RiskProfile::Moderate),
            "aggressive" => Ok(RiskProfile::Aggressive),
            other => Err(CoreError::Validation(format!(
                "Unknown risk profile '{other}': expected conservative, moderate or aggressive"
            ))),
        }
    }
}

impl std::fmt::Display for RiskProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskProfile::Conservative => write!(f, "Conservative"),
            RiskProfile::Moderate => write!(f, "Moderate"),
            RiskProfile::Aggressive => write!(f, "Aggressive"),
        }
    }
}

/// Fine-grained risk score from the 1–10 slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct RiskLevel(u8);

impl RiskLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    pub fn new(level: u8) -> Result<Self, CoreError> {
        if (Self::MIN..=Self::MAX).contains(&level) {
            Ok(Self(level))
        } else {
            Err(CoreError::Validation(format!(
                "Risk level {level} out of range (expected {}..={})",
                Self::MIN,
                Self::MAX
            )))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for RiskLevel {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RiskLevel> for u8 {
    fn from(level: RiskLevel) -> Self {
        level.0
    }
}

/// How aggressively a portfolio is weighted toward volatile assets.
///
/// The API speaks two dialects: the generation form sends a [`RiskProfile`],
/// the dashboard slider a [`RiskLevel`]. A portfolio keeps whichever one the
/// server returned; converting between them is always explicit:
///
/// | Level | Profile |
/// |-------|---------|
/// | 1–4   | Conservative |
/// | 5–7   | Moderate |
/// | 8–10  | Aggressive |
///
/// and back: Conservative → 3, Moderate → 6, Aggressive → 9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RiskSpec {
    Level(RiskLevel),
    Profile(RiskProfile),
}

impl RiskSpec {
    pub fn level(level: u8) -> Result<Self, CoreError> {
        RiskLevel::new(level).map(RiskSpec::Level)
    }

    pub fn to_profile(&self) -> RiskProfile {
        match self {
            RiskSpec::Profile(profile) => *profile,
            RiskSpec::Level(level) => match level.value() {
                1..=4 => RiskProfile::Conservative,
                5..=7 => RiskProfile::Moderate,
                _ => RiskProfile::Aggressive,
            },
        }
    }

    pub fn to_level(&self) -> RiskLevel {
        match self {
            RiskSpec::Level(level) => *level,
            RiskSpec::Profile(RiskProfile::Conservative) => RiskLevel(3),
            RiskSpec::Profile(RiskProfile::Moderate) => RiskLevel(6),
            RiskSpec::Profile(RiskProfile::Aggressive) => RiskLevel(9),
        }
    }

    /// Text shown in the summary header: `"7/10"` or `"Moderate"`.
    pub fn display_label(&self) -> String {
        match self {
            RiskSpec::Level(level) => format!("{}/10", level.value()),
            RiskSpec::Profile(profile) => profile.to_string(),
        }
    }
}

impl From<RiskProfile> for RiskSpec {
    fn from(profile: RiskProfile) -> Self {
        RiskSpec::Profile(profile)
    }
}

impl From<RiskLevel> for RiskSpec {
    fn from(level: RiskLevel) -> Self {
        RiskSpec::Level(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_bands_map_to_profiles() {
        let expected = [
            (1, RiskProfile::Conservative),
            (4, RiskProfile::Conservative),
            (5, RiskProfile::Moderate),
            (7, RiskProfile::Moderate),
            (8, RiskProfile::Aggressive),
            (10, RiskProfile::Aggressive),
        ];
        for (level, profile) in expected {
            assert_eq!(RiskSpec::level(level).unwrap().to_profile(), profile);
        }
    }

    #[test]
    fn profile_representative_level_stays_in_its_band() {
        for profile in [
            RiskProfile::Conservative,
            RiskProfile::Moderate,
            RiskProfile::Aggressive,
        ] {
            let level = RiskSpec::Profile(profile).to_level();
            assert_eq!(RiskSpec::Level(level).to_profile(), profile);
        }
    }

    #[test]
    fn level_out_of_range_rejected() {
        assert!(RiskLevel::new(0).is_err());
        assert!(RiskLevel::new(11).is_err());
    }
}
