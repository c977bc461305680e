use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// How a listing's base price is applied when a line is priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PricingBasis {
    /// Base price is multiplied by the number of nights in the stay range.
    PerNight,
    /// Base price is multiplied by the guest count; nights do not apply.
    PerGuest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingType {
    HotelRoom,
    BedAndBreakfast,
    Car,
    Tour,
    Guide,
    Ticket,
}

impl ListingType {
    /// Closed lookup from listing type to pricing basis. Stays (rooms, BnBs)
    /// and rentals are charged per night; experiences are charged per guest.
    pub fn pricing_basis(&self) -> PricingBasis {
        match self {
            ListingType::HotelRoom | ListingType::BedAndBreakfast | ListingType::Car => {
                PricingBasis::PerNight
            }
            ListingType::Tour | ListingType::Guide | ListingType::Ticket => PricingBasis::PerGuest,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Draft,
    Active,
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddonPricing {
    PerPerson,
    PerStay,
    PerNight,
}

/// Optional extra attached to a listing. Selected instances are referenced
/// from cart lines by id with a chosen quantity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Addon {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub price: f32,
    pub pricing: AddonPricing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub vendor_id: ObjectId,
    pub location_id: ObjectId,
    pub title: String,
    pub description: Option<String>,
    pub listing_type: ListingType,
    pub unit_price: f32,
    pub currency: String,
    pub capacity: u16,
    pub status: ListingStatus,
    #[serde(default)]
    pub addons: Vec<Addon>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Listing {
    pub fn addon(&self, addon_id: &ObjectId) -> Option<&Addon> {
        self.addons.iter().find(|a| a.id == *addon_id)
    }
}

#[derive(Debug, Deserialize)]
pub struct ListingStatusUpdate {
    pub status: ListingStatus,
}
