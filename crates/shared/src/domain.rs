use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Catalog identity of a product.
///
/// Backends disagree on the JSON type of ids: some emit strings, the seed backend emits
/// integers. Both decode to the same textual id, so `7` and `"7"` name one product.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawProductId")]
pub struct ProductId(pub String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawProductId {
    Text(String),
    Number(i64),
}

impl From<RawProductId> for ProductId {
    fn from(value: RawProductId) -> Self {
        match value {
            RawProductId::Text(text) => Self(text),
            RawProductId::Number(number) => Self(number.to_string()),
        }
    }
}

impl From<u32> for ProductId {
    fn from(id: u32) -> Self {
        Self(id.to_string())
    }
}

impl ProductId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A catalog entry. Recommendation responses reuse the same shape and fill in
/// `explanation` and `score`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: f64,
    pub category: String,
    pub rating: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviorRecord {
    #[serde(default)]
    pub viewed: Vec<ProductId>,
    #[serde(default)]
    pub purchased: Vec<ProductId>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PersonaId {
    #[default]
    #[serde(rename = "user1")]
    User1,
    #[serde(rename = "user2")]
    User2,
    #[serde(rename = "user3")]
    User3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersonaProfile {
    pub id: PersonaId,
    pub name: &'static str,
    pub icon: &'static str,
}

pub const PERSONAS: [PersonaProfile; 3] = [
    PersonaProfile {
        id: PersonaId::User1,
        name: "Fitness Enthusiast",
        icon: "🏃",
    },
    PersonaProfile {
        id: PersonaId::User2,
        name: "Tech Professional",
        icon: "💻",
    },
    PersonaProfile {
        id: PersonaId::User3,
        name: "Home Enthusiast",
        icon: "🏠",
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown persona key '{0}' (expected one of user1, user2, user3)")]
pub struct UnknownPersona(pub String);

impl PersonaId {
    pub const ALL: [PersonaId; 3] = [PersonaId::User1, PersonaId::User2, PersonaId::User3];

    pub fn key(self) -> &'static str {
        match self {
            PersonaId::User1 => "user1",
            PersonaId::User2 => "user2",
            PersonaId::User3 => "user3",
        }
    }

    /// Looks a persona up by its wire key. Unknown keys yield `None`.
    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|persona| persona.key() == key.trim())
    }

    pub fn profile(self) -> &'static PersonaProfile {
        match self {
            PersonaId::User1 => &PERSONAS[0],
            PersonaId::User2 => &PERSONAS[1],
            PersonaId::User3 => &PERSONAS[2],
        }
    }
}

impl fmt::Display for PersonaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for PersonaId {
    type Err = UnknownPersona;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownPersona(s.to_string()))
    }
}
