use crate::models::cart::{CartLine, CartTotals, PricedAddon, PricedLine};
use crate::models::listing::{AddonPricing, Listing, PricingBasis};

/// Tax applied on top of the cart subtotal. The rate lives in configuration
/// rather than in the call sites so every surface charges the same way.
#[derive(Debug, Clone)]
pub struct TaxPolicy {
    pub rate: f32,
    pub label: String,
}

impl Default for TaxPolicy {
    fn default() -> Self {
        Self {
            rate: 0.18,
            label: "tax".to_string(),
        }
    }
}

impl TaxPolicy {
    /// Read the tax policy from environment variables or use defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            rate: std::env::var("TAX_RATE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.rate),
            label: std::env::var("TAX_LABEL").unwrap_or(defaults.label),
        }
    }
}

pub struct PricingService;

impl PricingService {
    /// Number of nights a cart line covers. Zero while the range is
    /// incomplete, so an unfinished selection prices to zero instead of
    /// failing; callers gate checkout on `nights > 0`. A non-empty same-day
    /// range on a nightly listing still counts as one night.
    pub fn nights(listing: &Listing, line: &CartLine) -> u32 {
        if listing.listing_type.pricing_basis() != PricingBasis::PerNight {
            return 0;
        }
        match (line.start_date, line.end_date) {
            (Some(start), Some(end)) => {
                let days = (end - start).num_days();
                if days < 0 {
                    0
                } else {
                    days.max(1) as u32
                }
            }
            _ => 0,
        }
    }

    /// Price a single cart line against its listing. Pure; assumes the line
    /// was validated by the cart service (add-ons belong to the listing,
    /// guests within capacity, quantities positive).
    pub fn price_line(listing: &Listing, line: &CartLine) -> PricedLine {
        let nights = Self::nights(listing, line);

        let base = match listing.listing_type.pricing_basis() {
            PricingBasis::PerNight => listing.unit_price * nights as f32,
            PricingBasis::PerGuest => listing.unit_price * line.guests as f32,
        };

        let addons: Vec<PricedAddon> = line
            .addons
            .iter()
            .filter_map(|sel| listing.addon(&sel.addon_id).map(|addon| (addon, sel)))
            .map(|(addon, sel)| {
                // Per-night add-ons scale with the stay length; per-stay and
                // per-person both charge flat on the chosen quantity.
                let multiplier = match addon.pricing {
                    AddonPricing::PerNight => nights as f32,
                    AddonPricing::PerStay | AddonPricing::PerPerson => 1.0,
                };
                PricedAddon {
                    addon_id: addon.id,
                    name: addon.name.clone(),
                    price: addon.price,
                    quantity: sel.quantity,
                    subtotal: addon.price * sel.quantity as f32 * multiplier,
                }
            })
            .collect();

        let addon_total: f32 = addons.iter().map(|a| a.subtotal).sum();

        PricedLine {
            line_id: line.id,
            listing_id: line.listing_id,
            nights,
            guests: line.guests,
            unit_price: listing.unit_price,
            base,
            addons,
            subtotal: base + addon_total,
        }
    }

    /// Aggregate priced lines into cart totals.
    pub fn cart_totals(lines: &[PricedLine], policy: &TaxPolicy, currency: &str) -> CartTotals {
        let subtotal: f32 = lines.iter().map(|l| l.subtotal).sum();
        let tax = subtotal * policy.rate;

        CartTotals {
            subtotal,
            tax_rate: policy.rate,
            tax,
            total: subtotal + tax,
            currency: currency.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::cart::AddonSelection;
    use crate::models::listing::{Addon, ListingStatus, ListingType};
    use chrono::NaiveDate;
    use mongodb::bson::oid::ObjectId;

    fn nightly_listing(unit_price: f32) -> Listing {
        Listing {
            id: Some(ObjectId::new()),
            vendor_id: ObjectId::new(),
            location_id: ObjectId::new(),
            title: "Lakeside Room".to_string(),
            description: None,
            listing_type: ListingType::HotelRoom,
            unit_price,
            currency: "usd".to_string(),
            capacity: 4,
            status: ListingStatus::Active,
            addons: vec![],
            created_at: None,
            updated_at: None,
        }
    }

    fn line(listing: &Listing, start: Option<NaiveDate>, end: Option<NaiveDate>) -> CartLine {
        CartLine {
            id: None,
            listing_id: listing.id.unwrap(),
            start_date: start,
            end_date: end,
            guests: 2,
            addons: vec![],
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn nightly_base_is_unit_price_times_nights() {
        let listing = nightly_listing(100.0);
        let line = line(&listing, Some(date(2024, 1, 10)), Some(date(2024, 1, 13)));

        let priced = PricingService::price_line(&listing, &line);
        assert_eq!(priced.nights, 3);
        assert_eq!(priced.subtotal, 300.0);
    }

    #[test]
    fn missing_end_date_prices_to_zero() {
        let listing = nightly_listing(100.0);
        let line = line(&listing, Some(date(2024, 1, 10)), None);

        let priced = PricingService::price_line(&listing, &line);
        assert_eq!(priced.nights, 0);
        assert_eq!(priced.subtotal, 0.0);
    }

    #[test]
    fn same_day_range_counts_as_one_night() {
        let listing = nightly_listing(80.0);
        let line = line(&listing, Some(date(2024, 3, 5)), Some(date(2024, 3, 5)));

        let priced = PricingService::price_line(&listing, &line);
        assert_eq!(priced.nights, 1);
        assert_eq!(priced.subtotal, 80.0);
    }

    #[test]
    fn guest_unit_listing_multiplies_by_guests() {
        let mut listing = nightly_listing(45.0);
        listing.listing_type = ListingType::Tour;

        let mut l = line(&listing, None, None);
        l.guests = 3;

        let priced = PricingService::price_line(&listing, &l);
        assert_eq!(priced.nights, 0);
        assert_eq!(priced.subtotal, 135.0);
    }

    #[test]
    fn per_night_addon_scales_with_nights() {
        let mut listing = nightly_listing(100.0);
        let addon_id = ObjectId::new();
        listing.addons.push(Addon {
            id: addon_id,
            name: "Breakfast".to_string(),
            price: 20.0,
            pricing: AddonPricing::PerNight,
        });

        let mut l = line(&listing, Some(date(2024, 1, 10)), Some(date(2024, 1, 13)));
        l.addons.push(AddonSelection {
            addon_id,
            quantity: 1,
        });

        // 100 * 3 nights + 20 * 1 * 3 nights
        let priced = PricingService::price_line(&listing, &l);
        assert_eq!(priced.subtotal, 360.0);
    }

    #[test]
    fn per_stay_addon_is_flat_on_quantity() {
        let mut listing = nightly_listing(100.0);
        let addon_id = ObjectId::new();
        listing.addons.push(Addon {
            id: addon_id,
            name: "Airport pickup".to_string(),
            price: 35.0,
            pricing: AddonPricing::PerStay,
        });

        let mut l = line(&listing, Some(date(2024, 1, 10)), Some(date(2024, 1, 14)));
        l.addons.push(AddonSelection {
            addon_id,
            quantity: 2,
        });

        let priced = PricingService::price_line(&listing, &l);
        let addon_subtotal = priced.addons[0].subtotal;
        assert_eq!(addon_subtotal, 70.0);
        assert_eq!(priced.subtotal, 400.0 + 70.0);
    }

    #[test]
    fn pricing_is_deterministic() {
        let listing = nightly_listing(100.0);
        let l = line(&listing, Some(date(2024, 1, 10)), Some(date(2024, 1, 13)));

        let first = PricingService::price_line(&listing, &l);
        let second = PricingService::price_line(&listing, &l);
        assert_eq!(first.subtotal, second.subtotal);
        assert_eq!(first.nights, second.nights);
    }

    #[test]
    fn cart_totals_apply_tax_rate() {
        let listing = nightly_listing(1.0);
        let policy = TaxPolicy {
            rate: 0.18,
            label: "tax".to_string(),
        };

        let mut a = PricingService::price_line(
            &listing,
            &line(&listing, Some(date(2024, 1, 1)), Some(date(2024, 1, 2))),
        );
        a.subtotal = 360.0;
        let mut b = a.clone();
        b.subtotal = 150.0;

        let totals = PricingService::cart_totals(&[a, b], &policy, "usd");
        assert_eq!(totals.subtotal, 510.0);
        assert!((totals.tax - 91.80).abs() < 0.01);
        assert!((totals.total - 601.80).abs() < 0.01);
    }

    #[test]
    fn tax_policy_defaults() {
        let policy = TaxPolicy::default();
        assert_eq!(policy.rate, 0.18);
        assert_eq!(policy.label, "tax");
    }
}
