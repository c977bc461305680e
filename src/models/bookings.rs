use chrono::{DateTime, NaiveDate, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::models::cart::{CartLine, PricedAddon};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    /// Only pending and confirmed bookings hold their date ranges against
    /// other candidates.
    pub fn blocks_availability(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }
}

/// One listing selection inside a booking, frozen at checkout with the
/// server-side price it was charged at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingItem {
    pub listing_id: ObjectId,
    pub title: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub nights: u32,
    pub guests: u16,
    pub unit_price: f32,
    pub addons: Vec<PricedAddon>,
    pub subtotal: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub reference: String,
    pub status: BookingStatus,
    pub currency: String,
    pub subtotal: f32,
    pub tax: f32,
    pub total: f32,
    pub customer_id: Option<String>,
    pub transaction_id: Option<String>,
    pub items: Vec<BookingItem>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A dated stay held by an existing pending/confirmed booking item, the unit
/// the availability check works over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookedStay {
    pub listing_id: ObjectId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct BookingInput {
    pub lines: Vec<CartLine>,
    pub customer_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BookingWithPaymentInput {
    pub lines: Vec<CartLine>,
    pub customer_id: String,
    pub payment_intent_id: String,
}
