//! Wire types for the EcoPriceCalculator recipe payload.
//!
//! Read with the same leniency as the store payload: a recipe element that
//! does not decode is kept as a malformed record and ignored by analysis.

use std::future::Future;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use crate::error::FetchError;

use super::types::{json_kind, lenient, lenient_records, records, Record};

/// Top-level payload: `{"Recipes": [...]}` or a bare recipe array.
#[derive(Debug, Clone, Default)]
pub struct RecipesPayload {
    /// Every recipe the server knows.
    pub recipes: Vec<RecipeRecord>,
}

impl RecipesPayload {
    /// Decode a raw JSON document.
    pub fn from_value(value: Value) -> Result<Self, FetchError> {
        let items = match value {
            Value::Object(mut map) => match map.remove("Recipes") {
                Some(Value::Array(items)) => items,
                Some(other) => {
                    return Err(FetchError::Parse(format!(
                        "Recipes is {}, expected an array",
                        json_kind(&other)
                    )))
                }
                None => {
                    return Err(FetchError::Parse(
                        "document has no Recipes array".to_string(),
                    ))
                }
            },
            Value::Array(items) => items,
            other => {
                return Err(FetchError::Parse(format!(
                    "expected a recipe object or array, got {}",
                    json_kind(&other)
                )))
            }
        };

        Ok(Self {
            recipes: records(items),
        })
    }
}

/// One recipe family with its variants.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RecipeRecord {
    /// Recipe name.
    #[serde(default, deserialize_with = "lenient")]
    pub key: Option<String>,
    /// Concrete ingredient/product combinations.
    #[serde(default, deserialize_with = "lenient_records")]
    pub variants: Vec<VariantRecord>,
    /// Skills required, primary profession first.
    #[serde(default, deserialize_with = "lenient_records")]
    pub skill_needs: Vec<SkillNeedRecord>,
    /// Table the recipe is crafted on.
    #[serde(default, deserialize_with = "lenient")]
    pub crafting_table: Option<String>,
    /// Seconds per craft before skill bonuses.
    #[serde(default, deserialize_with = "lenient")]
    pub base_craft_time: Option<Decimal>,
    /// Calories per craft before skill bonuses.
    #[serde(default, deserialize_with = "lenient")]
    pub base_labor_cost: Option<Decimal>,
}

// A recipe with no key is skipped by analysis.
impl Record for RecipeRecord {
    fn malformed() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VariantRecord {
    /// Variant name, usually the main product.
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_records")]
    pub ingredients: Vec<IngredientRecord>,
    #[serde(default, deserialize_with = "lenient_records")]
    pub products: Vec<ProductRecord>,
}

impl Record for VariantRecord {
    fn malformed() -> Self {
        Self::default()
    }
}

/// An input: either a specific item or any item carrying a tag.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IngredientRecord {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub tag: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_specific_item: Option<bool>,
    /// Units consumed per craft. The plugin spells the key `Ammount`.
    #[serde(default, rename = "Ammount", deserialize_with = "lenient")]
    pub amount: Option<Decimal>,
}

impl Record for IngredientRecord {
    fn malformed() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProductRecord {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    /// Units produced per craft.
    #[serde(default, rename = "Ammount", deserialize_with = "lenient")]
    pub amount: Option<Decimal>,
}

impl Record for ProductRecord {
    fn malformed() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SkillNeedRecord {
    #[serde(default, deserialize_with = "lenient")]
    pub skill: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub level: Option<u32>,
}

impl Record for SkillNeedRecord {
    fn malformed() -> Self {
        Self::default()
    }
}

/// Anything that can produce the recipe document.
pub trait RecipeSource: Send + Sync {
    /// Fetch every recipe.
    fn fetch_recipes(&self) -> impl Future<Output = Result<RecipesPayload, FetchError>> + Send;
}

/// Read a recipe document saved with `snapshot --recipes`.
pub async fn load_recipes(path: &Path) -> Result<RecipesPayload, FetchError> {
    let body = tokio::fs::read(path)
        .await
        .map_err(|source| FetchError::Snapshot {
            path: path.display().to_string(),
            source,
        })?;
    let raw: Value = serde_json::from_slice(&body)
        .map_err(|e| FetchError::Parse(format!("{}: {}", path.display(), e)))?;
    RecipesPayload::from_value(raw)
}

/// Recipe source backed by a saved file.
#[derive(Debug, Clone)]
pub struct RecipeFile {
    path: PathBuf,
}

impl RecipeFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecipeSource for RecipeFile {
    async fn fetch_recipes(&self) -> Result<RecipesPayload, FetchError> {
        load_recipes(&self.path).await
    }
}

/// Recipes held in memory, for tests and offline analysis.
#[derive(Debug, Clone, Default)]
pub struct StaticRecipes(pub Vec<RecipeRecord>);

impl RecipeSource for StaticRecipes {
    async fn fetch_recipes(&self) -> Result<RecipesPayload, FetchError> {
        Ok(RecipesPayload {
            recipes: self.0.clone(),
        })
    }
}
