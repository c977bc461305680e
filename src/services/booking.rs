use std::fmt;

use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use rand::{distributions::Alphanumeric, Rng};

use crate::models::bookings::{BookedStay, Booking, BookingItem, BookingStatus};
use crate::models::cart::CartLine;
use crate::services::availability::{AvailabilityService, RangeError};
use crate::services::cart::{CartError, CartService};
use crate::services::pricing::{PricingService, TaxPolicy};
use crate::services::repository::{BookingRepository, ListingRepository, RepositoryError};

#[derive(Debug)]
pub enum BookingError {
    ListingNotFound(ObjectId),
    Cart(CartError),
    Range(RangeError),
    Unavailable(ObjectId),
    Repository(RepositoryError),
}

impl fmt::Display for BookingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingError::ListingNotFound(id) => write!(f, "listing {} not found", id),
            BookingError::Cart(err) => write!(f, "{}", err),
            BookingError::Range(err) => write!(f, "{}", err),
            BookingError::Unavailable(id) => {
                write!(f, "listing {} is not available for the requested dates", id)
            }
            BookingError::Repository(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for BookingError {}

impl From<CartError> for BookingError {
    fn from(err: CartError) -> Self {
        BookingError::Cart(err)
    }
}

impl From<RangeError> for BookingError {
    fn from(err: RangeError) -> Self {
        BookingError::Range(err)
    }
}

impl From<RepositoryError> for BookingError {
    fn from(err: RepositoryError) -> Self {
        BookingError::Repository(err)
    }
}

pub struct BookingService;

impl BookingService {
    /// Short human-readable reference printed on vouchers and receipts.
    pub fn reference_code() -> String {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(6)
            .map(char::from)
            .collect::<String>()
            .to_uppercase();
        format!("VZ-{}", suffix)
    }

    /// Validate and re-price the submitted cart lines, check every dated
    /// line for conflicts (against persisted stays and against the other
    /// lines of the same request), and persist the result as a pending
    /// booking.
    /// Prices are always computed server-side; client-sent amounts are
    /// ignored.
    pub async fn create<L, B>(
        listings: &L,
        bookings: &B,
        policy: &TaxPolicy,
        user_id: ObjectId,
        lines: &[CartLine],
        customer_id: Option<String>,
        transaction_id: Option<String>,
    ) -> Result<Booking, BookingError>
    where
        L: ListingRepository,
        B: BookingRepository,
    {
        let mut items = Vec::with_capacity(lines.len());
        let mut priced_lines = Vec::with_capacity(lines.len());
        let mut currency: Option<String> = None;
        // Dated lines accepted earlier in this request. Lines must not
        // conflict with each other any more than with persisted stays.
        let mut held: Vec<BookedStay> = Vec::new();

        for line in lines {
            let listing = match listings.get(&line.listing_id).await {
                Ok(listing) => listing,
                Err(RepositoryError::NotFound) => {
                    return Err(BookingError::ListingNotFound(line.listing_id))
                }
                Err(err) => return Err(err.into()),
            };

            let normalized = CartService::normalize_line(&listing, line)?;
            CartService::ensure_bookable(&listing, &normalized)?;

            if let (Some(start), Some(end)) = (normalized.start_date, normalized.end_date) {
                let mut existing = bookings.booked_stays(&line.listing_id).await?;
                existing.extend(held.iter().cloned());
                let available = AvailabilityService::is_range_available(
                    &line.listing_id,
                    start,
                    end,
                    &existing,
                )?;
                if !available {
                    return Err(BookingError::Unavailable(line.listing_id));
                }
                held.push(BookedStay {
                    listing_id: line.listing_id,
                    start_date: start,
                    end_date: end,
                });
            }

            currency.get_or_insert_with(|| listing.currency.clone());

            let priced = PricingService::price_line(&listing, &normalized);
            items.push(BookingItem {
                listing_id: priced.listing_id,
                title: listing.title.clone(),
                start_date: normalized.start_date,
                end_date: normalized.end_date,
                nights: priced.nights,
                guests: priced.guests,
                unit_price: priced.unit_price,
                addons: priced.addons.clone(),
                subtotal: priced.subtotal,
            });
            priced_lines.push(priced);
        }

        let currency = currency.unwrap_or_else(|| "usd".to_string());
        let totals = PricingService::cart_totals(&priced_lines, policy, &currency);

        let now = Utc::now();
        let mut booking = Booking {
            id: None,
            user_id,
            reference: Self::reference_code(),
            status: BookingStatus::Pending,
            currency,
            subtotal: totals.subtotal,
            tax: totals.tax,
            total: totals.total,
            customer_id,
            transaction_id,
            items,
            created_at: Some(now),
            updated_at: Some(now),
        };

        let id = bookings.insert(&booking).await?;
        booking.id = Some(id);
        Ok(booking)
    }
}
