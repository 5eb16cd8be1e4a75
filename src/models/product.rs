// SPDX-License-Identifier: MIT

//! Product catalog and per-user recommendation bundle models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    Cleanser,
    Toner,
    Moisturizer,
    Serum,
    Sunscreen,
    Treatment,
    Mask,
    Exfoliator,
    EyeCream,
    SpotTreatment,
}

/// Price range category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceRange {
    Budget,
    MidRange,
    Premium,
    Luxury,
}

/// Individual skincare product; may be part of a bundle or standalone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub category: ProductCategory,
    pub price: f64,
    pub currency: String,

    pub description: Option<String>,
    pub ingredients: Vec<String>,
    pub image_url: Option<String>,
    /// Affiliate link or product page
    pub product_url: Option<String>,

    pub price_range: Option<PriceRange>,
    /// Skin types this product suits; empty means all
    pub skin_types: Vec<String>,
    pub targets_concerns: Vec<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_active: bool,

    pub recommendation_count: u32,
    pub click_count: u32,
}

impl Product {
    pub fn new(id: String, name: String, brand: String, category: ProductCategory, price: f64) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            brand,
            category,
            price,
            currency: "USD".to_string(),
            description: None,
            ingredients: Vec::new(),
            image_url: None,
            product_url: None,
            price_range: None,
            skin_types: Vec::new(),
            targets_concerns: Vec::new(),
            created_at: now,
            updated_at: now,
            is_active: true,
            recommendation_count: 0,
            click_count: 0,
        }
    }

    pub fn increment_recommendations(&mut self) {
        self.recommendation_count += 1;
        self.updated_at = Utc::now();
    }

    pub fn increment_clicks(&mut self) {
        self.click_count += 1;
        self.updated_at = Utc::now();
    }

    pub fn is_suitable_for_skin_type(&self, skin_type: &str) -> bool {
        self.skin_types.is_empty() || self.skin_types.iter().any(|t| t == skin_type)
    }

    pub fn targets_concern(&self, concern: &str) -> bool {
        self.targets_concerns.iter().any(|c| c == concern)
    }
}

/// Personalized product bundle generated from a user's analysis and profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductBundle {
    /// Owning user's Firebase UID
    pub user_uid: String,
    pub title: String,
    pub description: String,
    pub products: Vec<Product>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    pub generated_from_analysis_id: Option<String>,
    pub skin_concerns_addressed: Vec<String>,

    /// Always the sum of the constituent product prices; recomputed on
    /// every add/remove, never set directly.
    pub total_price: f64,
    pub currency: String,
    /// How long the products are expected to last
    pub estimated_duration_days: u32,

    pub is_active: bool,
    pub is_purchased: bool,
    pub purchased_at: Option<DateTime<Utc>>,
    pub viewed_at: Option<DateTime<Utc>>,
}

impl ProductBundle {
    pub fn new(user_uid: String, title: String, description: String) -> Self {
        let now = Utc::now();
        Self {
            user_uid,
            title,
            description,
            products: Vec::new(),
            created_at: now,
            updated_at: now,
            generated_from_analysis_id: None,
            skin_concerns_addressed: Vec::new(),
            total_price: 0.0,
            currency: "USD".to_string(),
            estimated_duration_days: 30,
            is_active: true,
            is_purchased: false,
            purchased_at: None,
            viewed_at: None,
        }
    }

    pub fn add_product(&mut self, product: Product) {
        self.products.push(product);
        self.recalculate_total();
        self.updated_at = Utc::now();
    }

    pub fn remove_product(&mut self, product_id: &str) -> bool {
        let initial_len = self.products.len();
        self.products.retain(|p| p.id != product_id);

        if self.products.len() < initial_len {
            self.recalculate_total();
            self.updated_at = Utc::now();
            true
        } else {
            false
        }
    }

    fn recalculate_total(&mut self) {
        self.total_price = self.products.iter().map(|p| p.price).sum();
    }

    /// Record the first time the user viewed the bundle.
    pub fn mark_viewed(&mut self) {
        if self.viewed_at.is_none() {
            let now = Utc::now();
            self.viewed_at = Some(now);
            self.updated_at = now;
        }
    }

    pub fn mark_purchased(&mut self) {
        let now = Utc::now();
        self.is_purchased = true;
        self.purchased_at = Some(now);
        self.updated_at = now;

        for product in &mut self.products {
            product.increment_recommendations();
        }
    }

    pub fn products_by_category(&self, category: ProductCategory) -> Vec<&Product> {
        self.products.iter().filter(|p| p.category == category).collect()
    }

    pub fn has_category(&self, category: ProductCategory) -> bool {
        self.products.iter().any(|p| p.category == category)
    }

    /// Bundle cost per day over its expected lifetime.
    pub fn daily_cost(&self) -> f64 {
        if self.estimated_duration_days == 0 {
            return 0.0;
        }
        self.total_price / self.estimated_duration_days as f64
    }
}
