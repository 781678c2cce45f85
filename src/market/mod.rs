//! Market module for Eco store data.
//!
//! This module handles:
//! - Wire types for the store payload
//! - Normalization into listings
//! - Wire types for the recipe payload
//! - The HTTP client and offline snapshots
//! - Mock source for testing

pub mod client;
pub mod listing;
pub mod mock;
pub mod recipes;
pub mod snapshot;
pub mod types;

use std::future::Future;

pub use client::EcoClient;
pub use listing::{clean_store_name, Direction, Listing, ListingSet};
pub use mock::{MockMarket, MockStoreBuilder};
pub use recipes::{
    load_recipes, IngredientRecord, ProductRecord, RecipeFile, RecipeRecord, RecipeSource,
    RecipesPayload, SkillNeedRecord, StaticRecipes, VariantRecord,
};
pub use snapshot::{load_snapshot, save_snapshot, SnapshotSource};
pub use types::{OfferRecord, StoreRecord, StoresPayload};

use crate::error::FetchError;

/// Anything that can produce one store document per call.
pub trait MarketSource: Send + Sync {
    /// Fetch the current stores.
    fn fetch_stores(&self) -> impl Future<Output = Result<StoresPayload, FetchError>> + Send;
}
