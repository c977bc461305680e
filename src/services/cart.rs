use std::fmt;

use crate::models::cart::CartLine;
use crate::models::listing::{Listing, ListingStatus, PricingBasis};
use crate::services::pricing::PricingService;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    ListingNotActive,
    AddonNotOnListing,
    IncompleteDateRange,
    InvalidDateRange,
}

impl fmt::Display for CartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CartError::ListingNotActive => write!(f, "listing is not open for booking"),
            CartError::AddonNotOnListing => {
                write!(f, "selected add-on does not belong to the listing")
            }
            CartError::IncompleteDateRange => {
                write!(f, "a nightly listing needs both a start and an end date")
            }
            CartError::InvalidDateRange => write!(f, "start date must not be after end date"),
        }
    }
}

impl std::error::Error for CartError {}

pub struct CartService;

impl CartService {
    /// Guest counts outside `[1, capacity]` are clamped rather than
    /// rejected.
    pub fn clamp_guests(listing: &Listing, requested: u16) -> u16 {
        requested.clamp(1, listing.capacity.max(1))
    }

    /// Validate a client-supplied line against its listing and return the
    /// normalized form used for pricing: zero/negative add-on quantities are
    /// dropped, guests are clamped, and every remaining selection must
    /// reference an add-on that belongs to the listing.
    pub fn normalize_line(listing: &Listing, line: &CartLine) -> Result<CartLine, CartError> {
        if listing.status != ListingStatus::Active {
            return Err(CartError::ListingNotActive);
        }

        if let (Some(start), Some(end)) = (line.start_date, line.end_date) {
            if start > end {
                return Err(CartError::InvalidDateRange);
            }
        }

        let mut normalized = line.clone();
        normalized.guests = Self::clamp_guests(listing, line.guests);
        normalized.addons.retain(|sel| sel.quantity > 0);

        for sel in &normalized.addons {
            if listing.addon(&sel.addon_id).is_none() {
                return Err(CartError::AddonNotOnListing);
            }
        }

        Ok(normalized)
    }

    /// Checkout gate: a nightly line must price to at least one night before
    /// it can become a booking item.
    pub fn ensure_bookable(listing: &Listing, line: &CartLine) -> Result<(), CartError> {
        if listing.listing_type.pricing_basis() == PricingBasis::PerNight
            && PricingService::nights(listing, line) == 0
        {
            return Err(CartError::IncompleteDateRange);
        }
        Ok(())
    }
}
