//! Resolves a free-text product description against the catalog.
//!
//! The outcome is one of: no product, exactly one product, or several
//! products plus the attribute dimensions the caller should ask about next.

use std::sync::Arc;

use db::models::product::{Attribute, AttributeSet, Product};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info};
use ts_rs::TS;

use super::{catalog::CatalogLookup, slot_parser::SlotParser};

pub const NO_MATCH_MESSAGE: &str = "No matching product found, please check your input";

#[derive(Debug, Error)]
pub enum DialogError {
    #[error("search failed")]
    CatalogQueryFailed(#[source] sqlx::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolutionOutcome {
    NoMatch {
        message: String,
    },
    UniqueMatch {
        product: Product,
    },
    MultipleMatches {
        products: Vec<Product>,
        missing_attributes: Vec<Attribute>,
    },
}

/// Request body for a dialog turn
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct DialogInput {
    pub text: String,
}

#[derive(Clone)]
pub struct DialogEngine {
    parser: SlotParser,
    catalog: Arc<dyn CatalogLookup>,
    search_limit: i64,
}

impl DialogEngine {
    pub fn new(parser: SlotParser, catalog: Arc<dyn CatalogLookup>, search_limit: i64) -> Self {
        Self {
            parser,
            catalog,
            search_limit,
        }
    }

    pub fn parse_slots(&self, text: &str) -> AttributeSet {
        self.parser.parse_slots(text)
    }

    /// Parse `text` into slots and resolve them against the catalog
    pub async fn process_user_input(&self, text: &str) -> Result<ResolutionOutcome, DialogError> {
        let slots = self.parse_slots(text);
        debug!(text = %text, slots = ?slots, "Parsed dialog slots");
        self.resolve(&slots).await
    }

    /// Resolve an explicit attribute set, e.g. after the user picked a color
    /// or length in a disambiguation round.
    pub async fn resolve(&self, slots: &AttributeSet) -> Result<ResolutionOutcome, DialogError> {
        let mut products = self
            .catalog
            .find(slots, self.search_limit)
            .await
            .map_err(|e| {
                error!(error = %e, "Catalog search failed");
                DialogError::CatalogQueryFailed(e)
            })?;

        info!(
            constrained = slots.len(),
            matches = products.len(),
            "Dialog resolution complete"
        );

        let outcome = match products.len() {
            0 => ResolutionOutcome::NoMatch {
                message: NO_MATCH_MESSAGE.to_string(),
            },
            1 => ResolutionOutcome::UniqueMatch {
                product: products.remove(0),
            },
            _ => {
                let missing_attributes = missing_attributes(slots, &products);
                ResolutionOutcome::MultipleMatches {
                    products,
                    missing_attributes,
                }
            }
        };

        Ok(outcome)
    }
}

/// Dimensions the input did not constrain for which at least one product has
/// a non-empty value. Presence is enough: two products sharing the same color
/// still flag color.
fn missing_attributes(constrained: &AttributeSet, products: &[Product]) -> Vec<Attribute> {
    Attribute::ALL
        .into_iter()
        .filter(|attribute| !constrained.contains(*attribute))
        .filter(|attribute| {
            products.iter().any(|product| {
                product
                    .attribute(*attribute)
                    .is_some_and(|value| !value.trim().is_empty())
            })
        })
        .collect()
}
