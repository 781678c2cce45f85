//! Wire types for the EcoPriceCalculator store payload.
//!
//! The payload is owned by the game server plugin, so every field is read
//! leniently: a value of the wrong type becomes `None` instead of failing
//! the whole document. Validation happens later in [`super::listing`].

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::FetchError;

/// Top-level payload: either `{"Stores": [...]}` or a bare store array.
#[derive(Debug, Clone)]
pub enum StoresPayload {
    /// Shape served by the plugin.
    Wrapped {
        /// All stores on the server.
        stores: Vec<StoreRecord>,
    },
    /// Bare array of stores.
    Bare(Vec<StoreRecord>),
}

impl StoresPayload {
    /// Decode a raw JSON document.
    ///
    /// Elements of the store array are decoded one at a time; an element
    /// that is not a store object is kept as a malformed record.
    pub fn from_value(value: Value) -> Result<Self, FetchError> {
        match value {
            Value::Object(mut map) => match map.remove("Stores") {
                Some(Value::Array(items)) => Ok(StoresPayload::Wrapped {
                    stores: records(items),
                }),
                Some(other) => Err(FetchError::Parse(format!(
                    "Stores is {}, expected an array",
                    json_kind(&other)
                ))),
                None => Err(FetchError::Parse(
                    "document has no Stores array".to_string(),
                )),
            },
            Value::Array(items) => Ok(StoresPayload::Bare(records(items))),
            other => Err(FetchError::Parse(format!(
                "expected a store object or array, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Store records regardless of payload shape.
    pub fn stores(&self) -> &[StoreRecord] {
        match self {
            StoresPayload::Wrapped { stores } => stores,
            StoresPayload::Bare(stores) => stores,
        }
    }

    /// Consume into store records.
    pub fn into_stores(self) -> Vec<StoreRecord> {
        match self {
            StoresPayload::Wrapped { stores } => stores,
            StoresPayload::Bare(stores) => stores,
        }
    }
}

/// A wire record that can stand in for an element that failed to decode.
pub(crate) trait Record: DeserializeOwned {
    /// Placeholder for an undecodable element.
    fn malformed() -> Self;
}

/// One in-game store.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StoreRecord {
    /// Display name, possibly wrapped in `<color=...>` markup.
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    /// Store owner's available funds.
    #[serde(default, deserialize_with = "lenient")]
    pub balance: Option<Decimal>,
    /// Currency the store trades in.
    #[serde(default, deserialize_with = "lenient")]
    pub currency_name: Option<String>,
    /// Whether the store is open.
    #[serde(default, deserialize_with = "lenient")]
    pub enabled: Option<bool>,
    /// Buy and sell offers.
    #[serde(default, deserialize_with = "lenient_records")]
    pub all_offers: Vec<OfferRecord>,
    /// Element was not a store object.
    #[serde(skip)]
    pub malformed: bool,
}

impl Record for StoreRecord {
    fn malformed() -> Self {
        Self {
            malformed: true,
            ..Self::default()
        }
    }
}

/// One buy or sell offer inside a store.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OfferRecord {
    /// Item display name.
    #[serde(default, deserialize_with = "lenient")]
    pub item_name: Option<String>,
    /// Unit price.
    #[serde(default, deserialize_with = "lenient")]
    pub price: Option<Decimal>,
    /// Units in stock (sell offers) or wanted (buy offers).
    #[serde(default, deserialize_with = "lenient")]
    pub quantity: Option<Decimal>,
    /// True when the store is buying the item.
    #[serde(default, deserialize_with = "lenient")]
    pub buying: Option<bool>,
}

impl Record for OfferRecord {
    // Every field missing: normalization counts it as malformed.
    fn malformed() -> Self {
        Self::default()
    }
}

/// Decode array elements independently, substituting a malformed record
/// for each element that does not fit.
pub(crate) fn records<T: Record>(items: Vec<Value>) -> Vec<T> {
    items
        .into_iter()
        .map(|item| serde_json::from_value(item).unwrap_or_else(|_| T::malformed()))
        .collect()
}

/// Deserialize any JSON value, keeping it only if it fits `T`.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Array of records decoded element by element; a non-array becomes empty.
pub(crate) fn lenient_records<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Record,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(records(items)),
        _ => Ok(Vec::new()),
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn parses_wrapped_payload() {
        let payload = StoresPayload::from_value(json!({
            "Stores": [{
                "Name": "<color=#FF0000>Red Market</color>",
                "Balance": 1250.5,
                "CurrencyName": "Credits",
                "Enabled": true,
                "AllOffers": [
                    {"ItemName": "Wood", "Price": 10.25, "Quantity": 40, "Buying": false}
                ]
            }]
        }))
        .unwrap();

        let stores = payload.stores();
        assert_eq!(stores.len(), 1);
        assert_eq!(stores[0].balance, Some(dec!(1250.5)));
        assert_eq!(stores[0].all_offers[0].price, Some(dec!(10.25)));
        assert_eq!(stores[0].all_offers[0].buying, Some(false));
    }

    #[test]
    fn parses_bare_array() {
        let payload = StoresPayload::from_value(json!([
            {"Name": "A", "CurrencyName": "Credits", "Enabled": true, "AllOffers": []}
        ]))
        .unwrap();

        assert_eq!(payload.into_stores().len(), 1);
    }

    #[test]
    fn wrong_field_types_become_none() {
        let payload = StoresPayload::from_value(json!({
            "Stores": [{
                "Name": "A",
                "CurrencyName": 7,
                "AllOffers": [
                    {"ItemName": "Wood", "Price": "cheap", "Quantity": null, "Buying": "yes"}
                ]
            }]
        }))
        .unwrap();

        let store = &payload.stores()[0];
        assert_eq!(store.currency_name, None);
        assert_eq!(store.enabled, None);
        let offer = &store.all_offers[0];
        assert_eq!(offer.price, None);
        assert_eq!(offer.quantity, None);
        assert_eq!(offer.buying, None);
    }

    #[test]
    fn rejects_non_store_document() {
        let result = StoresPayload::from_value(json!({"error": "plugin offline"}));
        assert!(matches!(result, Err(FetchError::Parse(_))));
    }

    #[test]
    fn bad_offer_element_keeps_its_siblings() {
        let payload = StoresPayload::from_value(json!({
            "Stores": [{
                "Name": "A",
                "CurrencyName": "Credits",
                "Enabled": true,
                "AllOffers": [
                    {"ItemName": "Wood", "Price": 10, "Quantity": 20, "Buying": false},
                    null,
                    "Iron"
                ]
            }]
        }))
        .unwrap();

        let offers = &payload.stores()[0].all_offers;
        assert_eq!(offers.len(), 3);
        assert_eq!(offers[0].item_name.as_deref(), Some("Wood"));
        assert_eq!(offers[1].item_name, None);
        assert_eq!(offers[2].price, None);
    }

    #[test]
    fn bad_store_element_is_marked_malformed() {
        let payload = StoresPayload::from_value(json!({
            "Stores": [
                {"Name": "A", "CurrencyName": "Credits", "Enabled": true, "AllOffers": []},
                "garbage",
                42
            ]
        }))
        .unwrap();

        let stores = payload.stores();
        assert_eq!(stores.len(), 3);
        assert!(!stores[0].malformed);
        assert!(stores[1].malformed);
        assert!(stores[2].malformed);
    }

    #[test]
    fn single_store_bare_array_is_not_mistaken_for_wrapper() {
        let payload = StoresPayload::from_value(json!([
            {"Name": "A", "CurrencyName": "Credits", "Enabled": true,
             "AllOffers": [{"ItemName": "Wood", "Price": 1, "Quantity": 1, "Buying": true}]}
        ]))
        .unwrap();

        assert!(matches!(payload, StoresPayload::Bare(_)));
        assert_eq!(payload.stores()[0].all_offers.len(), 1);
    }

    #[test]
    fn stores_field_must_be_an_array() {
        let result = StoresPayload::from_value(json!({"Stores": "none"}));
        assert!(matches!(result, Err(FetchError::Parse(_))));
    }
}
