//! Plain-text rendering of a dashboard snapshot.

use std::fmt;

use client_core::{DashboardEvent, DashboardSnapshot, PanelError, RecommendationStatus};
use shared::domain::{PersonaId, Product};

const RECENTLY_VIEWED_LIMIT: usize = 5;
const RULE: &str = "------------------------------------------------------------";

pub const EMPTY_RECOMMENDATIONS: &str = "No recommendations available yet.";

pub struct DashboardView<'a>(pub &'a DashboardSnapshot);

impl fmt::Display for DashboardView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.0;
        writeln!(f, "{RULE}")?;
        writeln!(f, "AI Product Recommender")?;
        write_persona_picker(f, snapshot.persona)?;

        if let Some(error) = &snapshot.catalog.error {
            write_banner(f, error)?;
        }
        if let Some(error) = &snapshot.recommendations.error {
            write_banner(f, error)?;
        }

        writeln!(f)?;
        writeln!(f, "User Activity")?;
        if let Some(shown) = snapshot.behavior.persona.filter(|p| *p != snapshot.persona) {
            writeln!(f, "  (showing earlier activity for {})", shown.profile().name)?;
        }
        writeln!(
            f,
            "  Products Viewed: {}",
            snapshot.behavior.record.viewed.len()
        )?;
        writeln!(
            f,
            "  Products Purchased: {}",
            snapshot.behavior.record.purchased.len()
        )?;

        let viewed = &snapshot.activity.viewed;
        if !viewed.is_empty() {
            writeln!(f)?;
            writeln!(f, "Recently Viewed")?;
            for product in viewed.iter().take(RECENTLY_VIEWED_LIMIT) {
                writeln!(f, "  {}  {}", product.name, format_price(product.price))?;
            }
        }

        let purchased = &snapshot.activity.purchased;
        if !purchased.is_empty() {
            writeln!(f)?;
            writeln!(f, "Purchase History")?;
            for product in purchased {
                writeln!(f, "  {}  {}", product.name, format_price(product.price))?;
            }
        }

        writeln!(f)?;
        write_recommendations(f, snapshot)?;
        write!(f, "{RULE}")
    }
}

fn write_persona_picker(f: &mut fmt::Formatter<'_>, selected: PersonaId) -> fmt::Result {
    let profile = selected.profile();
    writeln!(f, "Persona: {} {} ({})", profile.icon, profile.name, selected)?;
    let choices: Vec<String> = PersonaId::ALL
        .iter()
        .enumerate()
        .map(|(idx, persona)| {
            let profile = persona.profile();
            let marker = if *persona == selected { "*" } else { " " };
            format!("{marker}[{}] {} {}", idx + 1, profile.icon, profile.name)
        })
        .collect();
    writeln!(f, "  {}", choices.join("  "))
}

fn write_banner(f: &mut fmt::Formatter<'_>, error: &PanelError) -> fmt::Result {
    writeln!(f, "! {}: {}", error.message, error.detail)?;
    writeln!(f, "  Tip: {}", error.hint)
}

fn write_recommendations(f: &mut fmt::Formatter<'_>, snapshot: &DashboardSnapshot) -> fmt::Result {
    let panel = &snapshot.recommendations;
    let heading = match panel.status {
        RecommendationStatus::Loading => "Recommended For You (loading...)",
        _ => "Recommended For You",
    };
    writeln!(f, "{heading}")?;

    if let Some(shown) = panel.persona.filter(|p| *p != snapshot.persona) {
        if !panel.items.is_empty() {
            writeln!(f, "  (showing earlier results for {})", shown.profile().name)?;
        }
    }

    if panel.items.is_empty() {
        if panel.status != RecommendationStatus::Loading {
            writeln!(f, "  {EMPTY_RECOMMENDATIONS}")?;
        }
        return Ok(());
    }

    for (rank, product) in panel.ranked() {
        write_recommendation(f, rank, product)?;
    }
    Ok(())
}

fn write_recommendation(f: &mut fmt::Formatter<'_>, rank: usize, product: &Product) -> fmt::Result {
    writeln!(
        f,
        "  #{rank} {}  {}  {}  {}",
        product.name,
        format_price(product.price),
        format_rating(product.rating),
        product.category
    )?;
    if let Some(explanation) = &product.explanation {
        writeln!(f, "     Why recommend? {explanation}")?;
    }
    if let Some(score) = product.score {
        writeln!(f, "     Relevance Score: {}", format_score(score))?;
    }
    if !product.tags.is_empty() {
        writeln!(f, "     {}", tag_chips(&product.tags))?;
    }
    Ok(())
}

pub fn format_price(price: f64) -> String {
    format!("${price:.2}")
}

pub fn format_rating(rating: f64) -> String {
    format!("★ {rating:.1}")
}

pub fn format_score(score: f64) -> String {
    format!("{score:.1}")
}

pub fn tag_chips(tags: &[String]) -> String {
    tags.iter()
        .map(|tag| format!("[{tag}]"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventEffect {
    /// Print a one-line status.
    Status(String),
    /// Print the whole dashboard again.
    Redraw,
    Ignore,
}

pub fn event_effect(event: &DashboardEvent) -> EventEffect {
    match event {
        DashboardEvent::PersonaSelected(persona) => {
            let profile = persona.profile();
            EventEffect::Status(format!("switched to {} {}", profile.icon, profile.name))
        }
        DashboardEvent::RecommendationsLoading(ticket) => {
            EventEffect::Status(format!("loading recommendations for {}...", ticket.persona))
        }
        DashboardEvent::StaleResponseDiscarded(_) => EventEffect::Ignore,
        DashboardEvent::CatalogUpdated { .. }
        | DashboardEvent::CatalogFailed(_)
        | DashboardEvent::BehaviorUpdated { .. }
        | DashboardEvent::RecommendationsUpdated { .. }
        | DashboardEvent::RecommendationsFailed { .. } => EventEffect::Redraw,
    }
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
