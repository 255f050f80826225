use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Playing role, normalised from the free-text values in stored documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(into = "String")]
pub enum Role {
    Batter,
    WicketKeeper,
    #[default]
    AllRounder,
    Bowler,
}

impl Role {
    /// Display order of the role sections
    pub const DISPLAY_ORDER: [Role; 4] = [
        Role::Batter,
        Role::WicketKeeper,
        Role::AllRounder,
        Role::Bowler,
    ];

    /// Parse a stored role string. Anything unrecognised is an all-rounder.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_uppercase().as_str() {
            "BAT" | "BATTER" | "BATSMAN" => Role::Batter,
            "WK" | "WICKETKEEPER" | "WICKET-KEEPER" | "WICKET KEEPER" | "KEEPER" => {
                Role::WicketKeeper
            }
            "BOWL" | "BOWLER" => Role::Bowler,
            _ => Role::AllRounder,
        }
    }

    /// Short code written back to the store
    pub fn code(&self) -> &'static str {
        match self {
            Role::Batter => "BAT",
            Role::WicketKeeper => "WK",
            Role::AllRounder => "AR",
            Role::Bowler => "BOWL",
        }
    }

    pub fn section_label(&self) -> &'static str {
        match self {
            Role::Batter => "Batters",
            Role::WicketKeeper => "WK",
            Role::AllRounder => "All-Rounders",
            Role::Bowler => "Bowlers",
        }
    }

    pub fn section_icon(&self) -> &'static str {
        match self {
            Role::WicketKeeper => "🧤",
            Role::Bowler => "🔴",
            Role::Batter | Role::AllRounder => "🏏",
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.code().to_string()
    }
}

/// Card tier, only affects the icon shown next to a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Rarity {
    Legend,
    Epic,
    #[default]
    Common,
}

impl Rarity {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "legend" | "legendary" => Rarity::Legend,
            "epic" => Rarity::Epic,
            _ => Rarity::Common,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Rarity::Legend => "🌟",
            Rarity::Epic => "🎖",
            Rarity::Common => "🏅",
        }
    }
}

/// Identity of a player record, used to check that a selection still
/// points at the same card
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlayerKey {
    pub name: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawPlayer")]
pub struct Player {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Role")]
    pub role: Role,
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "Rarity")]
    pub rarity: Rarity,
    #[serde(rename = "BAT")]
    pub batting: u32,
    #[serde(rename = "BOWL")]
    pub bowling: u32,
    #[serde(rename = "OVR", skip_serializing_if = "Option::is_none")]
    pub overall: Option<u32>,
}

impl Player {
    /// Overall rating: the explicit value, or the batting/bowling average
    /// rounded half up
    pub fn rating(&self) -> u32 {
        self.overall.unwrap_or_else(|| {
            let total = u64::from(self.batting) + u64::from(self.bowling) + 1;
            (total / 2) as u32
        })
    }

    pub fn key(&self) -> PlayerKey {
        PlayerKey {
            name: self.name.clone(),
            country: self.country.clone(),
        }
    }

    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "Unknown"
        } else {
            &self.name
        }
    }
}

// Stored documents mix capitalised and lowercase keys, so accept both
#[derive(Deserialize)]
struct RawPlayer {
    #[serde(rename = "Name")]
    name_upper: Option<String>,
    #[serde(rename = "name")]
    name_lower: Option<String>,
    #[serde(rename = "Role")]
    role_upper: Option<String>,
    #[serde(rename = "role")]
    role_lower: Option<String>,
    #[serde(rename = "Country")]
    country_upper: Option<String>,
    #[serde(rename = "country")]
    country_lower: Option<String>,
    #[serde(rename = "Rarity")]
    rarity_upper: Option<String>,
    #[serde(rename = "rarity")]
    rarity_lower: Option<String>,
    #[serde(rename = "BAT")]
    #[serde(default, deserialize_with = "lenient_rating")]
    bat: Option<u32>,
    #[serde(default, deserialize_with = "lenient_rating")]
    batting: Option<u32>,
    #[serde(rename = "BOWL")]
    #[serde(default, deserialize_with = "lenient_rating")]
    bowl: Option<u32>,
    #[serde(default, deserialize_with = "lenient_rating")]
    bowling: Option<u32>,
    #[serde(rename = "OVR")]
    #[serde(default, deserialize_with = "lenient_rating")]
    ovr: Option<u32>,
    #[serde(default, deserialize_with = "lenient_rating")]
    overall: Option<u32>,
}

/// Ratings are sometimes stored as floats or numeric strings. Those are
/// rounded to the nearest whole number and clamped into range; anything else
/// counts as missing.
fn lenient_rating<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(rating_from_value))
}

fn rating_from_value(value: &Value) -> Option<u32> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !number.is_finite() {
        return None;
    }
    Some(number.round().clamp(0.0, u32::MAX as f64) as u32)
}

impl From<RawPlayer> for Player {
    fn from(raw: RawPlayer) -> Self {
        Player {
            name: raw.name_upper.or(raw.name_lower).unwrap_or_default(),
            role: raw
                .role_upper
                .or(raw.role_lower)
                .map(|r| Role::parse(&r))
                .unwrap_or_default(),
            country: raw.country_upper.or(raw.country_lower).unwrap_or_default(),
            rarity: raw
                .rarity_upper
                .or(raw.rarity_lower)
                .map(|r| Rarity::parse(&r))
                .unwrap_or_default(),
            batting: raw.bat.or(raw.batting).unwrap_or(0),
            bowling: raw.bowl.or(raw.bowling).unwrap_or(0),
            overall: raw.ovr.or(raw.overall),
        }
    }
}

#[cfg(test)]
pub(crate) fn test_player(name: &str, role: Role, rating: u32) -> Player {
    Player {
        name: name.to_string(),
        role,
        country: "India".to_string(),
        rarity: Rarity::Common,
        batting: rating,
        bowling: rating,
        overall: Some(rating),
    }
}
