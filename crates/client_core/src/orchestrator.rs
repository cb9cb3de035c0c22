//! Persona selection and the three loaders that feed the dashboard snapshot.
//!
//! Every fetch is issued with a [`FetchTicket`] carrying the persona active at issue time
//! and a per-category sequence number. A response is applied only if its ticket is still
//! the newest for its category and its persona is still selected; anything else is
//! discarded, so a slow answer for an old persona or an old refresh never overwrites a
//! newer one.

use std::{future::Future, sync::Arc, time::Duration};

use chrono::Utc;
use futures::future::join_all;
use serde::Serialize;
use shared::{
    domain::{PersonaId, PersonaProfile, PERSONAS},
    protocol::{behavior_path, recommendations_path, PRODUCTS_PATH},
};
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    config::{DashboardSettings, ListPolicy},
    error::FetchError,
    service::{HttpRecommenderService, RecommenderService},
    view_model::{
        DashboardSnapshot, PanelError, CATALOG_ERROR_MESSAGE, RECOMMENDATION_ERROR_MESSAGE,
    },
};

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchCategory {
    Catalog,
    Behavior,
    Recommendations,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FetchTicket {
    pub category: FetchCategory,
    pub persona: PersonaId,
    pub seq: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    PersonaSelected(PersonaId),
    CatalogUpdated { products: usize },
    CatalogFailed(PanelError),
    BehaviorUpdated { persona: PersonaId },
    RecommendationsLoading(FetchTicket),
    RecommendationsUpdated { persona: PersonaId, count: usize },
    RecommendationsFailed { persona: PersonaId, error: PanelError },
    StaleResponseDiscarded(FetchTicket),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorOptions {
    pub request_timeout: Duration,
    pub list_policy: ListPolicy,
    pub initial_persona: PersonaId,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self::from(&DashboardSettings::default())
    }
}

impl From<&DashboardSettings> for OrchestratorOptions {
    fn from(settings: &DashboardSettings) -> Self {
        Self {
            request_timeout: settings.request_timeout(),
            list_policy: settings.list_policy,
            initial_persona: settings.initial_persona,
        }
    }
}

/// Loads spawned by a selection or refresh. Dropping it leaves the loads running.
#[must_use = "await `settled` to wait for the loads, or drop to let them run detached"]
pub struct PendingLoad {
    handles: Vec<JoinHandle<()>>,
}

impl PendingLoad {
    fn new(handles: Vec<JoinHandle<()>>) -> Self {
        Self { handles }
    }

    /// Waits until every spawned load has applied or discarded its response.
    pub async fn settled(self) {
        for result in join_all(self.handles).await {
            if let Err(err) = result {
                warn!(%err, "dashboard load task ended abnormally");
            }
        }
    }
}

struct OrchestratorState {
    snapshot: DashboardSnapshot,
    catalog_seq: u64,
    behavior_seq: u64,
    recommendation_seq: u64,
}

impl OrchestratorState {
    fn issue(&mut self, category: FetchCategory) -> FetchTicket {
        let counter = match category {
            FetchCategory::Catalog => &mut self.catalog_seq,
            FetchCategory::Behavior => &mut self.behavior_seq,
            FetchCategory::Recommendations => &mut self.recommendation_seq,
        };
        *counter += 1;
        FetchTicket {
            category,
            persona: self.snapshot.persona,
            seq: *counter,
        }
    }

    fn is_current(&self, ticket: &FetchTicket) -> bool {
        match ticket.category {
            // The catalog does not depend on the persona.
            FetchCategory::Catalog => ticket.seq == self.catalog_seq,
            FetchCategory::Behavior => {
                ticket.seq == self.behavior_seq && ticket.persona == self.snapshot.persona
            }
            FetchCategory::Recommendations => {
                ticket.seq == self.recommendation_seq && ticket.persona == self.snapshot.persona
            }
        }
    }
}

pub struct Orchestrator {
    service: Arc<dyn RecommenderService>,
    options: OrchestratorOptions,
    origin: String,
    state: Mutex<OrchestratorState>,
    events: broadcast::Sender<DashboardEvent>,
}

impl Orchestrator {
    pub fn new(service: Arc<dyn RecommenderService>, options: OrchestratorOptions) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let origin = service.origin();
        Arc::new(Self {
            service,
            options,
            origin,
            state: Mutex::new(OrchestratorState {
                snapshot: DashboardSnapshot::new(options.initial_persona),
                catalog_seq: 0,
                behavior_seq: 0,
                recommendation_seq: 0,
            }),
            events,
        })
    }

    /// Builds an orchestrator backed by the HTTP service described by `settings`.
    pub fn from_settings(settings: &DashboardSettings) -> Result<Arc<Self>, FetchError> {
        let service = HttpRecommenderService::from_settings(settings)?;
        Ok(Self::new(Arc::new(service), OrchestratorOptions::from(settings)))
    }

    pub fn personas() -> &'static [PersonaProfile] {
        &PERSONAS
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<DashboardEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> DashboardSnapshot {
        self.state.lock().await.snapshot.clone()
    }

    /// Session start: one catalog load plus the initial persona's behavior and
    /// recommendation loads, all in flight together.
    pub async fn start(self: &Arc<Self>) -> PendingLoad {
        let this = Arc::clone(self);
        let catalog = tokio::spawn(async move { this.load_catalog().await });

        let persona = self.state.lock().await.snapshot.persona;
        let mut pending = self.select_persona(persona).await;
        pending.handles.push(catalog);
        pending
    }

    /// Catalog loader. Replaces the catalog on success; on failure records the banner and
    /// keeps what is already held. Never retries on its own.
    pub async fn load_catalog(&self) {
        let ticket = self.state.lock().await.issue(FetchCategory::Catalog);
        let result = self
            .bounded(PRODUCTS_PATH.to_string(), self.service.list_products())
            .await;

        let mut state = self.state.lock().await;
        if !state.is_current(&ticket) {
            self.discard(ticket);
            return;
        }
        match result {
            Ok(products) => {
                let count = products.len();
                state.snapshot.replace_catalog(products, Utc::now());
                info!(products = count, "catalog loaded");
                self.emit(DashboardEvent::CatalogUpdated { products: count });
            }
            Err(err) => {
                warn!(%err, "catalog load failed");
                let error = PanelError::from_fetch(CATALOG_ERROR_MESSAGE, &err, &self.origin);
                state.snapshot.fail_catalog(error.clone());
                self.emit(DashboardEvent::CatalogFailed(error));
            }
        }
    }

    /// Selects `persona` and starts its behavior and recommendation loads. Selecting the
    /// already active persona reloads both.
    pub async fn select_persona(self: &Arc<Self>, persona: PersonaId) -> PendingLoad {
        let (behavior_ticket, recommendation_ticket) = {
            let mut state = self.state.lock().await;
            state.snapshot.persona = persona;
            let behavior_ticket = state.issue(FetchCategory::Behavior);
            let recommendation_ticket = self.begin_recommendations(&mut state);
            (behavior_ticket, recommendation_ticket)
        };
        info!(persona = %persona, "persona selected");
        self.emit(DashboardEvent::PersonaSelected(persona));
        self.emit(DashboardEvent::RecommendationsLoading(recommendation_ticket));

        let behavior = {
            let this = Arc::clone(self);
            tokio::spawn(async move { this.load_behavior(behavior_ticket).await })
        };
        let recommendations = {
            let this = Arc::clone(self);
            tokio::spawn(async move { this.load_recommendations(recommendation_ticket).await })
        };
        PendingLoad::new(vec![behavior, recommendations])
    }

    /// Selects a persona by wire key. Unknown keys are ignored and start no loads.
    pub async fn select_persona_key(self: &Arc<Self>, key: &str) -> Option<PendingLoad> {
        let Some(persona) = PersonaId::parse(key) else {
            debug!(key, "ignoring unknown persona key");
            return None;
        };
        Some(self.select_persona(persona).await)
    }

    /// Manual refresh of the recommendation list for the selected persona. Allowed in any
    /// state; an older in-flight request is superseded.
    pub async fn refresh(self: &Arc<Self>) -> PendingLoad {
        let ticket = {
            let mut state = self.state.lock().await;
            self.begin_recommendations(&mut state)
        };
        debug!(persona = %ticket.persona, seq = ticket.seq, "refreshing recommendations");
        self.emit(DashboardEvent::RecommendationsLoading(ticket));

        let this = Arc::clone(self);
        PendingLoad::new(vec![tokio::spawn(async move {
            this.load_recommendations(ticket).await
        })])
    }

    fn begin_recommendations(&self, state: &mut OrchestratorState) -> FetchTicket {
        let ticket = state.issue(FetchCategory::Recommendations);
        state
            .snapshot
            .recommendations
            .begin(self.options.list_policy);
        state.snapshot.bump();
        ticket
    }

    async fn load_behavior(&self, ticket: FetchTicket) {
        let result = self
            .bounded(
                behavior_path(ticket.persona),
                self.service.user_behavior(ticket.persona),
            )
            .await;

        let mut state = self.state.lock().await;
        if !state.is_current(&ticket) {
            self.discard(ticket);
            return;
        }
        match result {
            Ok(record) => {
                debug!(
                    persona = %ticket.persona,
                    viewed = record.viewed.len(),
                    purchased = record.purchased.len(),
                    "behavior loaded"
                );
                state.snapshot.replace_behavior(ticket.persona, record);
                self.emit(DashboardEvent::BehaviorUpdated {
                    persona: ticket.persona,
                });
            }
            Err(err) => {
                warn!(persona = %ticket.persona, %err, "behavior load failed; keeping previous record");
            }
        }
    }

    async fn load_recommendations(&self, ticket: FetchTicket) {
        let result = self
            .bounded(
                recommendations_path(ticket.persona),
                self.service.recommendations(ticket.persona),
            )
            .await;

        let mut state = self.state.lock().await;
        if !state.is_current(&ticket) {
            self.discard(ticket);
            return;
        }
        match result {
            Ok(items) => {
                let count = items.len();
                state
                    .snapshot
                    .recommendations
                    .succeed(ticket.persona, items, Utc::now());
                state.snapshot.bump();
                info!(persona = %ticket.persona, count, "recommendations loaded");
                self.emit(DashboardEvent::RecommendationsUpdated {
                    persona: ticket.persona,
                    count,
                });
            }
            Err(err) => {
                warn!(persona = %ticket.persona, %err, "recommendation load failed");
                let error = PanelError::from_fetch(RECOMMENDATION_ERROR_MESSAGE, &err, &self.origin);
                state
                    .snapshot
                    .recommendations
                    .fail(error.clone(), self.options.list_policy);
                state.snapshot.bump();
                self.emit(DashboardEvent::RecommendationsFailed {
                    persona: ticket.persona,
                    error,
                });
            }
        }
    }

    async fn bounded<T>(
        &self,
        path: String,
        fetch: impl Future<Output = Result<T, FetchError>>,
    ) -> Result<T, FetchError> {
        match tokio::time::timeout(self.options.request_timeout, fetch).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::timeout(path, self.options.request_timeout)),
        }
    }

    fn discard(&self, ticket: FetchTicket) {
        debug!(
            category = ?ticket.category,
            persona = %ticket.persona,
            seq = ticket.seq,
            "discarding stale response"
        );
        self.emit(DashboardEvent::StaleResponseDiscarded(ticket));
    }

    fn emit(&self, event: DashboardEvent) {
        // No subscribers is fine; the snapshot is the source of truth.
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
#[path = "tests/orchestrator_tests.rs"]
mod tests;
