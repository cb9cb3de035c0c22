//! The snapshot presentation reads, and the per-field-group writes the loaders apply.

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::domain::{BehaviorRecord, PersonaId, Product};

use crate::{
    config::ListPolicy,
    error::{FetchError, FetchErrorKind},
    resolver::{resolve_activity, ActivityView},
};

pub const CATALOG_ERROR_MESSAGE: &str = "Failed to load products";
pub const RECOMMENDATION_ERROR_MESSAGE: &str = "Failed to load recommendations";

/// A banner-ready failure: headline, underlying detail and a remediation hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelError {
    pub kind: FetchErrorKind,
    pub message: String,
    pub detail: String,
    pub hint: String,
}

impl PanelError {
    pub fn from_fetch(message: &str, err: &FetchError, origin: &str) -> Self {
        let kind = err.kind();
        Self {
            kind,
            message: message.to_string(),
            detail: err.to_string(),
            hint: kind.hint(origin),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CatalogPanel {
    pub products: Vec<Product>,
    pub error: Option<PanelError>,
    pub loaded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BehaviorPanel {
    /// Persona the record belongs to; `None` until a behavior fetch has succeeded.
    pub persona: Option<PersonaId>,
    pub record: BehaviorRecord,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecommendationPanel {
    /// Persona whose list `items` holds. Under `ListPolicy::Retain` this can lag behind the
    /// selected persona while a fetch is loading or after it failed.
    pub persona: Option<PersonaId>,
    pub items: Vec<Product>,
    pub status: RecommendationStatus,
    pub error: Option<PanelError>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl RecommendationPanel {
    pub fn is_loading(&self) -> bool {
        self.status == RecommendationStatus::Loading
    }

    /// Items paired with their 1-based rank.
    pub fn ranked(&self) -> impl Iterator<Item = (usize, &Product)> {
        self.items.iter().enumerate().map(|(idx, item)| (idx + 1, item))
    }

    pub(crate) fn begin(&mut self, policy: ListPolicy) {
        self.status = RecommendationStatus::Loading;
        self.error = None;
        if policy == ListPolicy::Clear {
            self.clear_items();
        }
    }

    pub(crate) fn succeed(&mut self, persona: PersonaId, items: Vec<Product>, at: DateTime<Utc>) {
        self.status = RecommendationStatus::Success;
        self.error = None;
        self.persona = Some(persona);
        self.items = items;
        self.updated_at = Some(at);
    }

    pub(crate) fn fail(&mut self, error: PanelError, policy: ListPolicy) {
        self.status = RecommendationStatus::Failed;
        self.error = Some(error);
        if policy == ListPolicy::Clear {
            self.clear_items();
        }
    }

    fn clear_items(&mut self) {
        self.items.clear();
        self.persona = None;
    }
}

/// Everything the presentation layer renders. Cloned out of the orchestrator as a whole,
/// so a reader never sees half of a write.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub persona: PersonaId,
    pub catalog: CatalogPanel,
    pub behavior: BehaviorPanel,
    pub activity: ActivityView,
    pub recommendations: RecommendationPanel,
    pub revision: u64,
}

impl DashboardSnapshot {
    pub fn new(persona: PersonaId) -> Self {
        Self {
            persona,
            ..Self::default()
        }
    }

    pub fn is_loading(&self) -> bool {
        self.recommendations.is_loading()
    }

    pub(crate) fn replace_catalog(&mut self, products: Vec<Product>, at: DateTime<Utc>) {
        self.catalog = CatalogPanel {
            products,
            error: None,
            loaded_at: Some(at),
        };
        self.refresh_activity();
    }

    /// A failed catalog load keeps whatever products are already held; on the startup
    /// path that is the empty catalog.
    pub(crate) fn fail_catalog(&mut self, error: PanelError) {
        self.catalog.error = Some(error);
        self.bump();
    }

    pub(crate) fn replace_behavior(&mut self, persona: PersonaId, record: BehaviorRecord) {
        self.behavior = BehaviorPanel {
            persona: Some(persona),
            record,
        };
        self.refresh_activity();
    }

    pub(crate) fn bump(&mut self) {
        self.revision += 1;
    }

    fn refresh_activity(&mut self) {
        self.activity = resolve_activity(&self.catalog.products, &self.behavior.record);
        self.bump();
    }
}
