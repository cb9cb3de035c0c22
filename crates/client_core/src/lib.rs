//! Client-side orchestration for the persona recommendation dashboard: the backend
//! service seam, settings, the derived-view resolver, the view-model snapshot and the
//! orchestrator that keeps them consistent across overlapping fetches.

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod resolver;
pub mod service;
pub mod view_model;

pub use config::{load_settings, DashboardSettings, ListPolicy};
pub use error::{ConfigError, FetchError, FetchErrorKind};
pub use orchestrator::{
    DashboardEvent, FetchCategory, FetchTicket, Orchestrator, OrchestratorOptions, PendingLoad,
};
pub use resolver::{resolve_activity, ActivityView};
pub use service::{HttpRecommenderService, RecommenderService};
pub use view_model::{
    BehaviorPanel, CatalogPanel, DashboardSnapshot, PanelError, RecommendationPanel,
    RecommendationStatus,
};
