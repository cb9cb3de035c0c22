use super::*;

use client_core::{
    ActivityView, BehaviorPanel, FetchCategory, FetchErrorKind, FetchTicket, RecommendationPanel,
};
use shared::domain::{BehaviorRecord, ProductId};

fn product(id: u32, name: &str, price: f64) -> Product {
    Product {
        id: ProductId::from(id),
        name: name.to_string(),
        price,
        category: "Sports".into(),
        rating: 4.5,
        explanation: None,
        score: None,
        tags: Vec::new(),
    }
}

fn recommended(id: u32, name: &str, score: Option<f64>) -> Product {
    Product {
        explanation: Some(format!("We recommend the {name} for you.")),
        score,
        tags: vec!["fitness".into(), "yoga".into()],
        ..product(id, name, 29.99)
    }
}

fn panel_error(message: &str) -> PanelError {
    PanelError {
        kind: FetchErrorKind::Unreachable,
        message: message.to_string(),
        detail: "request to /products failed: connection refused".into(),
        hint: "Check that the recommendation service is reachable at http://localhost:8080."
            .into(),
    }
}

fn loaded_snapshot() -> DashboardSnapshot {
    let viewed: Vec<Product> = (1..=7).map(|i| product(i, &format!("Viewed {i}"), 10.0)).collect();
    let mut snapshot = DashboardSnapshot::new(PersonaId::User1);
    snapshot.behavior = BehaviorPanel {
        persona: Some(PersonaId::User1),
        record: BehaviorRecord {
            viewed: viewed.iter().map(|p| p.id.clone()).collect(),
            purchased: vec![ProductId::from(1)],
        },
    };
    snapshot.activity = ActivityView {
        viewed,
        purchased: vec![product(1, "Viewed 1", 10.0)],
    };
    snapshot.recommendations = RecommendationPanel {
        persona: Some(PersonaId::User1),
        items: vec![
            recommended(4, "Yoga Mat", Some(8.46)),
            recommended(10, "Water Bottle", None),
        ],
        status: RecommendationStatus::Success,
        ..RecommendationPanel::default()
    };
    snapshot
}

#[test]
fn formats_money_rating_and_score() {
    assert_eq!(format_price(49.99), "$49.99");
    assert_eq!(format_price(24.9), "$24.90");
    assert_eq!(format_rating(4.5), "★ 4.5");
    assert_eq!(format_score(8.46), "8.5");
    assert_eq!(tag_chips(&["fitness".into(), "yoga".into()]), "[fitness] [yoga]");
}

#[test]
fn renders_ranked_recommendations_with_optional_score() {
    let text = DashboardView(&loaded_snapshot()).to_string();
    assert!(text.contains("#1 Yoga Mat  $29.99  ★ 4.5  Sports"));
    assert!(text.contains("#2 Water Bottle"));
    assert!(text.contains("Why recommend? We recommend the Yoga Mat for you."));
    assert_eq!(text.matches("Relevance Score:").count(), 1);
    assert!(text.contains("Relevance Score: 8.5"));
    assert!(text.contains("[fitness] [yoga]"));
    assert!(!text.contains(EMPTY_RECOMMENDATIONS));
}

#[test]
fn caps_recently_viewed_and_counts_raw_history() {
    let text = DashboardView(&loaded_snapshot()).to_string();
    assert!(text.contains("Products Viewed: 7"));
    assert!(text.contains("Products Purchased: 1"));
    assert!(text.contains("Viewed 5"));
    assert!(!text.contains("Viewed 6"));
    assert!(text.contains("Purchase History"));
}

#[test]
fn empty_list_shows_placeholder_unless_loading() {
    let mut snapshot = DashboardSnapshot::new(PersonaId::User2);
    snapshot.recommendations.status = RecommendationStatus::Success;
    let text = DashboardView(&snapshot).to_string();
    assert!(text.contains(EMPTY_RECOMMENDATIONS));
    assert!(!text.contains("Recently Viewed"));

    snapshot.recommendations.status = RecommendationStatus::Loading;
    let text = DashboardView(&snapshot).to_string();
    assert!(text.contains("(loading...)"));
    assert!(!text.contains(EMPTY_RECOMMENDATIONS));
}

#[test]
fn banners_carry_message_and_tip() {
    let mut snapshot = DashboardSnapshot::new(PersonaId::User3);
    snapshot.catalog.error = Some(panel_error("Failed to load products"));
    let text = DashboardView(&snapshot).to_string();
    assert!(text.contains("! Failed to load products: request to /products failed"));
    assert!(text.contains("Tip: Check that the recommendation service is reachable"));
    assert!(text.contains("*[3] 🏠 Home Enthusiast"));
}

#[test]
fn retained_list_names_the_persona_it_belongs_to() {
    let mut snapshot = loaded_snapshot();
    snapshot.persona = PersonaId::User2;
    snapshot.recommendations.status = RecommendationStatus::Loading;
    let text = DashboardView(&snapshot).to_string();
    assert!(text.contains("(showing earlier results for Fitness Enthusiast)"));
}

#[test]
fn stale_discards_do_not_redraw() {
    let ticket = FetchTicket {
        category: FetchCategory::Recommendations,
        persona: PersonaId::User1,
        seq: 3,
    };
    assert_eq!(
        event_effect(&DashboardEvent::StaleResponseDiscarded(ticket)),
        EventEffect::Ignore
    );
    assert_eq!(
        event_effect(&DashboardEvent::RecommendationsUpdated {
            persona: PersonaId::User1,
            count: 2
        }),
        EventEffect::Redraw
    );
    assert_eq!(
        event_effect(&DashboardEvent::RecommendationsLoading(ticket)),
        EventEffect::Status("loading recommendations for user1...".into())
    );
}

#[test]
fn activity_from_another_persona_is_labelled() {
    let mut snapshot = loaded_snapshot();
    snapshot.persona = PersonaId::User3;
    let text = DashboardView(&snapshot).to_string();
    assert!(text.contains("(showing earlier activity for Fitness Enthusiast)"));

    let text = DashboardView(&loaded_snapshot()).to_string();
    assert!(!text.contains("showing earlier activity"));
}
