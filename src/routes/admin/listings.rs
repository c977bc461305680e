use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use mongodb::Client;
use std::sync::Arc;

use crate::models::listing::{Listing, ListingStatusUpdate};
use crate::services::repository::{ListingRepository, MongoListingRepository, RepositoryError};

pub async fn create_listing(
    data: web::Data<Arc<Client>>,
    input: web::Json<Listing>,
) -> impl Responder {
    let mut listing = input.into_inner();

    if listing.capacity < 1 {
        return HttpResponse::BadRequest().body("Capacity must be at least 1");
    }
    if listing.unit_price < 0.0 || listing.addons.iter().any(|a| a.price < 0.0) {
        return HttpResponse::BadRequest().body("Prices must not be negative");
    }

    let now = Utc::now();
    listing.id = None;
    listing.created_at = Some(now);
    listing.updated_at = Some(now);

    let repo = MongoListingRepository::new(data.get_ref().clone());
    match repo.insert(&listing).await {
        Ok(id) => HttpResponse::Ok().json(serde_json::json!({ "listing_id": id.to_string() })),
        Err(err) => {
            eprintln!("Failed to create listing: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to create listing")
        }
    }
}

pub async fn update_listing_status(
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
    input: web::Json<ListingStatusUpdate>,
) -> impl Responder {
    let listing_id = match ObjectId::parse_str(path.into_inner()) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid listing ID format"),
    };

    let repo = MongoListingRepository::new(data.get_ref().clone());
    match repo.set_status(&listing_id, input.status).await {
        Ok(_) => HttpResponse::Ok().body("Listing status updated"),
        Err(RepositoryError::NotFound) => HttpResponse::NotFound().body("Listing not found"),
        Err(err) => {
            eprintln!("Failed to update listing status: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to update listing status")
        }
    }
}
