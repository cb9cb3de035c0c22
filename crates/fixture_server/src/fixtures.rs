use std::{collections::HashMap, fs, path::Path};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use shared::domain::{BehaviorRecord, Product, ProductId};

/// Canned backend data: the catalog, per-persona histories and precomputed
/// recommendation lists. Unknown personas have neither history nor recommendations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixtureSet {
    pub products: Vec<Product>,
    #[serde(default)]
    pub behavior: HashMap<String, BehaviorRecord>,
    #[serde(default)]
    pub recommendations: HashMap<String, Vec<Product>>,
}

impl FixtureSet {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read fixture file '{}'", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse fixture file '{}'", path.display()))
    }

    pub fn behavior_for(&self, persona: &str) -> BehaviorRecord {
        self.behavior.get(persona).cloned().unwrap_or_default()
    }

    pub fn recommendations_for(&self, persona: &str, limit: usize) -> Vec<Product> {
        self.recommendations
            .get(persona)
            .map(|items| items.iter().take(limit).cloned().collect())
            .unwrap_or_default()
    }

    /// Ten products and the three demo personas' histories, newest interaction first.
    pub fn seed() -> Self {
        let products = vec![
            seed_product(1, "Wireless Headphones", "Electronics", 79.99, 4.5, ["audio", "wireless", "music"]),
            seed_product(2, "Running Shoes", "Sports", 89.99, 4.7, ["fitness", "running", "outdoor"]),
            seed_product(3, "Coffee Maker", "Home", 49.99, 4.3, ["kitchen", "coffee", "appliance"]),
            seed_product(4, "Yoga Mat", "Sports", 29.99, 4.6, ["fitness", "yoga", "exercise"]),
            seed_product(5, "Laptop Stand", "Electronics", 39.99, 4.4, ["workspace", "ergonomic", "desk"]),
            seed_product(6, "Smart Watch", "Electronics", 199.99, 4.8, ["fitness", "tech", "wearable"]),
            seed_product(7, "Protein Powder", "Health", 34.99, 4.5, ["fitness", "nutrition", "supplement"]),
            seed_product(8, "Desk Lamp", "Home", 44.99, 4.2, ["workspace", "lighting", "desk"]),
            seed_product(9, "Bluetooth Speaker", "Electronics", 59.99, 4.6, ["audio", "wireless", "portable"]),
            seed_product(10, "Water Bottle", "Sports", 24.99, 4.4, ["fitness", "hydration", "outdoor"]),
        ];

        let behavior = HashMap::from([
            ("user1".to_string(), history(&[10, 7, 6, 4, 2], &[4, 2])),
            ("user2".to_string(), history(&[9, 8, 6, 5, 1], &[8, 5])),
            ("user3".to_string(), history(&[8, 3], &[3])),
        ]);

        let picks: [(&str, [(u32, f64, &str); 5]); 3] = [
            (
                "user1",
                [
                    (10, 66.0, "you've shown interest in Sports products, it matches your interests in fitness, hydration, outdoor. At $24.99, it offers great value for money."),
                    (6, 62.0, "you've shown interest in Electronics products, it matches your interests in fitness, tech, wearable, it has excellent customer reviews (4.8★). This premium product is priced at $199.99."),
                    (7, 61.25, "you've shown interest in Health products, it matches your interests in fitness, nutrition, supplement, it has excellent customer reviews (4.5★). At $34.99, it offers great value for money."),
                    (9, 53.0, "you've shown interest in Electronics products, it has excellent customer reviews (4.6★). This premium product is priced at $59.99."),
                    (1, 52.5, "you've shown interest in Electronics products, it has excellent customer reviews (4.5★). This premium product is priced at $79.99."),
                ],
            ),
            (
                "user2",
                [
                    (3, 51.5, "you've shown interest in Home products, it complements your recent Home purchases. At $49.99, it offers great value for money."),
                    (9, 51.5, "you've shown interest in Electronics products, it matches your interests in audio, wireless, portable, it complements your recent Electronics purchases, it has excellent customer reviews (4.6★). This premium product is priced at $59.99."),
                    (1, 51.25, "you've shown interest in Electronics products, it matches your interests in audio, wireless, music, it complements your recent Electronics purchases, it has excellent customer reviews (4.5★). This premium product is priced at $79.99."),
                    (6, 42.0, "you've shown interest in Electronics products, it matches your interests in fitness, tech, wearable, it complements your recent Electronics purchases, it has excellent customer reviews (4.8★). This premium product is priced at $199.99."),
                    (2, 33.5, "it matches your interests in fitness, it has excellent customer reviews (4.7★). This premium product is priced at $89.99."),
                ],
            ),
            (
                "user3",
                [
                    (5, 42.0, "it matches your interests in workspace, desk. At $39.99, it offers great value for money."),
                    (8, 40.5, "you've shown interest in Home products, it matches your interests in workspace, lighting, desk, it complements your recent Home purchases. At $44.99, it offers great value for money."),
                    (6, 24.0, "it has excellent customer reviews (4.8★). This premium product is priced at $199.99."),
                    (2, 23.5, "it has excellent customer reviews (4.7★). This premium product is priced at $89.99."),
                    (4, 23.0, "it has excellent customer reviews (4.6★). At $29.99, it offers great value for money."),
                ],
            ),
        ];

        let recommendations = picks
            .into_iter()
            .map(|(persona, entries)| {
                let items = entries
                    .into_iter()
                    .filter_map(|(id, score, reason)| {
                        let product = products.iter().find(|p| p.id == ProductId::from(id))?;
                        Some(Product {
                            explanation: Some(format!(
                                "We recommend the {} for you because {reason}",
                                product.name
                            )),
                            score: Some(score),
                            ..product.clone()
                        })
                    })
                    .collect();
                (persona.to_string(), items)
            })
            .collect();

        Self {
            products,
            behavior,
            recommendations,
        }
    }
}

fn seed_product(
    id: u32,
    name: &str,
    category: &str,
    price: f64,
    rating: f64,
    tags: [&str; 3],
) -> Product {
    Product {
        id: ProductId::from(id),
        name: name.to_string(),
        price,
        category: category.to_string(),
        rating,
        explanation: None,
        score: None,
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

fn history(viewed: &[u32], purchased: &[u32]) -> BehaviorRecord {
    BehaviorRecord {
        viewed: viewed.iter().copied().map(ProductId::from).collect(),
        purchased: purchased.iter().copied().map(ProductId::from).collect(),
    }
}
