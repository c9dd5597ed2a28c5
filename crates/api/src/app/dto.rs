use serde::{Deserialize, Serialize};

use retailforge_catalog::{ProductTemplate, ProductVariant};
use retailforge_loyalty::NewLoyaltyCard;

/// Template with its generated variants.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateView {
    #[serde(flatten)]
    pub template: ProductTemplate,
    pub variants: Vec<ProductVariant>,
}

/// Batch of card creation payloads.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCardsRequest {
    pub cards: Vec<NewLoyaltyCard>,
}

/// `{"items": [...]}` list envelope.
#[derive(Debug, Clone, Serialize)]
pub struct Items<T> {
    pub items: Vec<T>,
}

impl<T> From<Vec<T>> for Items<T> {
    fn from(items: Vec<T>) -> Self {
        Self { items }
    }
}
