use chrono::NaiveDate;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single add-on chosen on a cart line, by id and quantity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddonSelection {
    pub addon_id: ObjectId,
    pub quantity: u16,
}

/// Client-supplied selection of a listing with dates, guests and add-ons.
/// Validated and re-priced server-side before anything is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub listing_id: ObjectId,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub guests: u16,
    #[serde(default)]
    pub addons: Vec<AddonSelection>,
}

/// Priced add-on as it appears on a quote or a persisted booking item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricedAddon {
    pub addon_id: ObjectId,
    pub name: String,
    pub price: f32,
    pub quantity: u16,
    pub subtotal: f32,
}

/// Result of pricing one cart line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricedLine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_id: Option<Uuid>,
    pub listing_id: ObjectId,
    pub nights: u32,
    pub guests: u16,
    pub unit_price: f32,
    pub base: f32,
    pub addons: Vec<PricedAddon>,
    pub subtotal: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartTotals {
    pub subtotal: f32,
    pub tax_rate: f32,
    pub tax: f32,
    pub total: f32,
    pub currency: String,
}

#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub lines: Vec<CartLine>,
}

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub lines: Vec<PricedLine>,
    pub totals: CartTotals,
}
