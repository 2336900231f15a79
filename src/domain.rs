use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::fmt;

/// The five fixed categories that tag and color branches
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    SelfAwareness,
    LifeSciences,
    UniversalLaws,
    CreativeExpression,
    SocialConnection,
}

impl Domain {
    pub const ALL: [Domain; 5] = [
        Domain::SelfAwareness,
        Domain::LifeSciences,
        Domain::UniversalLaws,
        Domain::CreativeExpression,
        Domain::SocialConnection,
    ];

    /// Position in `Domain::ALL`, used to index per-domain arrays
    pub fn index(self) -> usize {
        match self {
            Domain::SelfAwareness => 0,
            Domain::LifeSciences => 1,
            Domain::UniversalLaws => 2,
            Domain::CreativeExpression => 3,
            Domain::SocialConnection => 4,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Domain::SelfAwareness => "self_awareness",
            Domain::LifeSciences => "life_sciences",
            Domain::UniversalLaws => "universal_laws",
            Domain::CreativeExpression => "creative_expression",
            Domain::SocialConnection => "social_connection",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Domain::SelfAwareness => "Self-Awareness",
            Domain::LifeSciences => "Life Sciences",
            Domain::UniversalLaws => "Universal Laws",
            Domain::CreativeExpression => "Creative Expression",
            Domain::SocialConnection => "Social Connection",
        }
    }

    /// Hue in degrees
    pub fn hue(self) -> f32 {
        match self {
            Domain::SelfAwareness => 280.0,      // violet
            Domain::LifeSciences => 120.0,       // green
            Domain::UniversalLaws => 210.0,      // blue
            Domain::CreativeExpression => 30.0,  // orange
            Domain::SocialConnection => 340.0,   // rose
        }
    }

    /// Angle a first seed takes when leaving the trunk. The five angles fan
    /// out from upper-left to upper-right (canvas y grows downward).
    pub fn seed_angle(self) -> f32 {
        match self {
            Domain::SelfAwareness => -5.0 * PI / 6.0,
            Domain::LifeSciences => -2.0 * PI / 3.0,
            Domain::UniversalLaws => -PI / 2.0,
            Domain::CreativeExpression => -PI / 3.0,
            Domain::SocialConnection => -PI / 6.0,
        }
    }

    pub fn hotkey(self) -> char {
        (b'1' + self.index() as u8) as char
    }

    pub fn from_hotkey(c: char) -> Option<Domain> {
        Domain::ALL.iter().copied().find(|d| d.hotkey() == c)
    }

    /// Parse a domain key, accepting either `-` or `_` as separator
    pub fn from_key(key: &str) -> Option<Domain> {
        let normalized = key.trim().to_lowercase().replace(['-', ' '], "_");
        Domain::ALL.iter().copied().find(|d| d.key() == normalized)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Domain::from_key(s).ok_or_else(|| {
            let known: Vec<&str> = Domain::ALL.iter().map(|d| d.key()).collect();
            format!("unknown domain '{}' (expected one of: {})", s, known.join(", "))
        })
    }
}
