use actix_web::{web, HttpResponse, Responder};
use mongodb::bson::oid::ObjectId;
use mongodb::Client;
use std::sync::Arc;

use crate::models::listing::ListingType;
use crate::services::repository::{ListingRepository, MongoListingRepository, RepositoryError};

#[derive(serde::Deserialize)]
pub struct QueryParams {
    listing_type: Option<ListingType>,
    location_id: Option<String>,
}

pub async fn get_listings(
    data: web::Data<Arc<Client>>,
    params: web::Query<QueryParams>,
) -> impl Responder {
    let repo = MongoListingRepository::new(data.get_ref().clone());

    let location_id = match &params.location_id {
        Some(raw) => match ObjectId::parse_str(raw) {
            Ok(id) => Some(id),
            Err(_) => return HttpResponse::BadRequest().body("Invalid location ID format"),
        },
        None => None,
    };

    match repo.list_active(params.listing_type, location_id).await {
        Ok(listings) => HttpResponse::Ok().json(listings),
        Err(err) => {
            eprintln!("Failed to fetch listings: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch listings.")
        }
    }
}

pub async fn get_listing_by_id(
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
) -> impl Responder {
    let listing_id = match ObjectId::parse_str(path.into_inner()) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid listing ID format"),
    };

    let repo = MongoListingRepository::new(data.get_ref().clone());

    match repo.get(&listing_id).await {
        Ok(listing) => HttpResponse::Ok().json(listing),
        Err(RepositoryError::NotFound) => HttpResponse::NotFound().body("Listing not found"),
        Err(err) => {
            eprintln!("Failed to fetch listing: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch listing.")
        }
    }
}
