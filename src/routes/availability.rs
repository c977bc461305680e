use actix_web::{web, HttpResponse, Responder};
use chrono::NaiveDate;
use mongodb::bson::oid::ObjectId;
use mongodb::Client;
use std::sync::Arc;

use crate::services::availability::AvailabilityService;
use crate::services::repository::{BookingRepository, MongoBookingRepository};

#[derive(serde::Deserialize)]
pub struct AvailabilityQuery {
    start: NaiveDate,
    end: NaiveDate,
}

/// Whether `[start, end]` is free of conflicts with existing pending or
/// confirmed bookings for the listing. Inclusive semantics: a stay ending on
/// a given day blocks another starting that day.
pub async fn check_availability(
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
    query: web::Query<AvailabilityQuery>,
) -> impl Responder {
    let listing_id = match ObjectId::parse_str(path.into_inner()) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid listing ID format"),
    };

    let repo = MongoBookingRepository::new(data.get_ref().clone());

    let existing = match repo.booked_stays(&listing_id).await {
        Ok(stays) => stays,
        Err(err) => {
            eprintln!("Failed to fetch booked stays: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to check availability.");
        }
    };

    match AvailabilityService::is_range_available(&listing_id, query.start, query.end, &existing) {
        Ok(available) => HttpResponse::Ok().json(serde_json::json!({
            "listing_id": listing_id.to_string(),
            "start": query.start,
            "end": query.end,
            "available": available,
        })),
        Err(err) => HttpResponse::BadRequest().body(err.to_string()),
    }
}
