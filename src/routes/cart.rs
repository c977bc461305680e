use actix_web::{web, HttpResponse, Responder};
use mongodb::Client;
use std::sync::Arc;

use crate::models::cart::{QuoteRequest, QuoteResponse};
use crate::services::cart::CartService;
use crate::services::pricing::{PricingService, TaxPolicy};
use crate::services::repository::{ListingRepository, MongoListingRepository, RepositoryError};

/// Price a cart server-side. Lines with incomplete date ranges quote to
/// zero; checkout is gated separately when the booking is created.
pub async fn quote_cart(
    data: web::Data<Arc<Client>>,
    policy: web::Data<TaxPolicy>,
    input: web::Json<QuoteRequest>,
) -> impl Responder {
    let repo = MongoListingRepository::new(data.get_ref().clone());
    let input = input.into_inner();

    let mut priced = Vec::with_capacity(input.lines.len());
    let mut currency: Option<String> = None;

    for line in &input.lines {
        let listing = match repo.get(&line.listing_id).await {
            Ok(listing) => listing,
            Err(RepositoryError::NotFound) => {
                return HttpResponse::NotFound()
                    .body(format!("Listing {} not found", line.listing_id));
            }
            Err(err) => {
                eprintln!("Failed to fetch listing: {:?}", err);
                return HttpResponse::InternalServerError().body("Failed to price cart.");
            }
        };

        let normalized = match CartService::normalize_line(&listing, line) {
            Ok(normalized) => normalized,
            Err(err) => return HttpResponse::BadRequest().body(err.to_string()),
        };

        currency.get_or_insert_with(|| listing.currency.clone());
        priced.push(PricingService::price_line(&listing, &normalized));
    }

    let currency = currency.unwrap_or_else(|| "usd".to_string());
    let totals = PricingService::cart_totals(&priced, policy.get_ref(), &currency);

    HttpResponse::Ok().json(QuoteResponse {
        lines: priced,
        totals,
    })
}
