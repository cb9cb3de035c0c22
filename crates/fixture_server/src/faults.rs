use std::{collections::HashSet, str::FromStr, time::Duration};

use axum::{http::StatusCode, Json};
use shared::error::{ApiError, ErrorCode};
use tracing::info;

use crate::config::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixtureRoute {
    Products,
    Behavior,
    Recommendations,
}

impl FixtureRoute {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Behavior => "behavior",
            Self::Recommendations => "recommendations",
        }
    }
}

impl FromStr for FixtureRoute {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "products" => Ok(Self::Products),
            "behavior" => Ok(Self::Behavior),
            "recommendations" => Ok(Self::Recommendations),
            _ => Err(()),
        }
    }
}

/// Latency and failures injected in front of the fixture data.
#[derive(Debug, Clone, Default)]
pub struct FaultPlan {
    pub latency: Duration,
    pub slow_persona: Option<String>,
    pub slow_persona_latency: Duration,
    pub failing: HashSet<FixtureRoute>,
}

impl FaultPlan {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            latency: Duration::from_millis(settings.latency_ms),
            slow_persona: settings.slow_persona.clone(),
            slow_persona_latency: Duration::from_millis(settings.slow_persona_latency_ms),
            failing: settings.fail_routes.iter().copied().collect(),
        }
    }

    pub fn delay_for(&self, route: FixtureRoute, persona: Option<&str>) -> Duration {
        let slow = route == FixtureRoute::Recommendations
            && persona.is_some()
            && self.slow_persona.as_deref() == persona;
        if slow {
            self.latency + self.slow_persona_latency
        } else {
            self.latency
        }
    }

    pub async fn apply(
        &self,
        route: FixtureRoute,
        persona: Option<&str>,
    ) -> Result<(), (StatusCode, Json<ApiError>)> {
        let delay = self.delay_for(route, persona);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if self.failing.contains(&route) {
            info!(route = route.as_str(), ?persona, "injecting failure");
            return Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiError::new(
                    ErrorCode::Unavailable,
                    format!("{} temporarily unavailable", route.as_str()),
                )),
            ));
        }
        Ok(())
    }
}
