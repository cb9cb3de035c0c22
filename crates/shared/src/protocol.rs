//! Wire contract with the recommendation backend. Paths are relative to the configured
//! base URL.

use serde::{Deserialize, Serialize};

use crate::domain::PersonaId;

pub const PRODUCTS_PATH: &str = "/products";
pub const HEALTH_PATH: &str = "/healthz";

pub fn behavior_path(persona: PersonaId) -> String {
    format!("/user/{}/behavior", persona.key())
}

pub fn recommendations_path(persona: PersonaId) -> String {
    format!("/recommendations/{}", persona.key())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationsQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}
