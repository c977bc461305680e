use actix_web::{web, HttpResponse, Responder};
use mongodb::bson::oid::ObjectId;
use mongodb::Client;
use std::{str::FromStr, sync::Arc};
use stripe::CapturePaymentIntent;

use crate::middleware::auth::Claims;
use crate::models::bookings::{BookingInput, BookingStatus, BookingWithPaymentInput};
use crate::services::booking::{BookingError, BookingService};
use crate::services::pricing::TaxPolicy;
use crate::services::repository::{
    BookingRepository, MongoBookingRepository, MongoListingRepository, RepositoryError,
};

fn booking_error_response(err: BookingError) -> HttpResponse {
    match err {
        BookingError::ListingNotFound(id) => {
            HttpResponse::NotFound().body(format!("Listing {} not found", id))
        }
        BookingError::Unavailable(id) => HttpResponse::Conflict().body(format!(
            "Listing {} is not available for the requested dates",
            id
        )),
        BookingError::Cart(err) => HttpResponse::BadRequest().body(err.to_string()),
        BookingError::Range(err) => HttpResponse::BadRequest().body(err.to_string()),
        BookingError::Repository(err) => {
            eprintln!("Repository error while creating booking: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to create booking")
        }
    }
}

pub async fn add_booking(
    data: web::Data<Arc<Client>>,
    policy: web::Data<TaxPolicy>,
    input: web::Json<BookingInput>,
    path: web::Path<(String,)>,
    claims: Claims,
) -> impl Responder {
    let (user_id,) = path.into_inner();
    if user_id != claims.user_id {
        return HttpResponse::Forbidden().body("Forbidden");
    }
    let user_id = match ObjectId::parse_str(&claims.user_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid user ID format"),
    };

    let client = data.get_ref().clone();
    let listings = MongoListingRepository::new(client.clone());
    let bookings = MongoBookingRepository::new(client);
    let input = input.into_inner();

    if input.lines.is_empty() {
        return HttpResponse::BadRequest().body("Booking must contain at least one line");
    }

    match BookingService::create(
        &listings,
        &bookings,
        policy.get_ref(),
        user_id,
        &input.lines,
        input.customer_id,
        None,
    )
    .await
    {
        Ok(booking) => HttpResponse::Ok().json(booking),
        Err(err) => booking_error_response(err),
    }
}

pub async fn get_all_bookings(
    data: web::Data<Arc<Client>>,
    path: web::Path<(String,)>,
    claims: Claims,
) -> impl Responder {
    if path.into_inner().0 != claims.user_id {
        return HttpResponse::Forbidden().body("Forbidden");
    }
    let user_id = match ObjectId::parse_str(&claims.user_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid user ID format"),
    };

    let bookings = MongoBookingRepository::new(data.get_ref().clone());

    match bookings.for_user(&user_id).await {
        Ok(bookings) => HttpResponse::Ok().json(bookings),
        Err(err) => {
            eprintln!("Error fetching bookings: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch bookings")
        }
    }
}

pub async fn get_booking_by_id(
    data: web::Data<Arc<Client>>,
    path: web::Path<(String, String)>,
    claims: Claims,
) -> impl Responder {
    let (user_id, booking_id) = path.into_inner();
    if user_id != claims.user_id {
        return HttpResponse::Forbidden().body("Forbidden");
    }

    let booking_id = match ObjectId::parse_str(&booking_id) {
        Ok(id) => id,
        Err(e) => {
            eprintln!("Invalid booking ID format: {:?}", e);
            return HttpResponse::BadRequest().body("Invalid booking ID format");
        }
    };
    let user_id = match ObjectId::parse_str(&claims.user_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid user ID format"),
    };

    let bookings = MongoBookingRepository::new(data.get_ref().clone());

    match bookings.get(&user_id, &booking_id).await {
        Ok(booking) => HttpResponse::Ok().json(booking),
        Err(RepositoryError::NotFound) => HttpResponse::NotFound().body("Booking not found"),
        Err(err) => {
            eprintln!("Error fetching booking: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch booking")
        }
    }
}

/// Completed bookings are immutable; anything else can be cancelled by its
/// owner, which releases the held date ranges.
pub async fn cancel_booking(
    data: web::Data<Arc<Client>>,
    path: web::Path<(String, String)>,
    claims: Claims,
) -> impl Responder {
    let (user_id, booking_id) = path.into_inner();
    if user_id != claims.user_id {
        return HttpResponse::Forbidden().body("Forbidden");
    }

    let booking_id = match ObjectId::parse_str(&booking_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid booking ID format"),
    };
    let user_id = match ObjectId::parse_str(&claims.user_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid user ID format"),
    };

    let bookings = MongoBookingRepository::new(data.get_ref().clone());

    let booking = match bookings.get(&user_id, &booking_id).await {
        Ok(booking) => booking,
        Err(RepositoryError::NotFound) => {
            return HttpResponse::NotFound().body("Booking not found")
        }
        Err(err) => {
            eprintln!("Error fetching booking: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to fetch booking");
        }
    };

    if booking.status == BookingStatus::Completed {
        return HttpResponse::Conflict().body("Completed bookings cannot be cancelled");
    }

    match bookings
        .set_status(&booking_id, BookingStatus::Cancelled)
        .await
    {
        Ok(_) => HttpResponse::Ok().body("Booking cancelled"),
        Err(err) => {
            eprintln!("Error cancelling booking: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to cancel booking")
        }
    }
}

pub async fn add_booking_with_payment(
    mongodb_data: web::Data<Arc<Client>>,
    stripe_data: web::Data<Arc<stripe::Client>>,
    policy: web::Data<TaxPolicy>,
    input: web::Json<BookingWithPaymentInput>,
    path: web::Path<(String,)>,
    claims: Claims,
) -> impl Responder {
    let (user_id,) = path.into_inner();
    if user_id != claims.user_id {
        return HttpResponse::Forbidden().body("Forbidden");
    }
    let user_id = match ObjectId::parse_str(&claims.user_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid user ID format"),
    };

    let client = mongodb_data.get_ref().clone();
    let listings = MongoListingRepository::new(client.clone());
    let bookings = MongoBookingRepository::new(client);
    let input = input.into_inner();

    let payment_intent_id = match stripe::PaymentIntentId::from_str(&input.payment_intent_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid payment intent ID"),
    };

    // 1. Verify the payment intent exists and is in a capturable state
    match stripe::PaymentIntent::retrieve(stripe_data.as_ref(), &payment_intent_id, &[]).await {
        Ok(intent) => {
            if intent.status != stripe::PaymentIntentStatus::RequiresCapture {
                return HttpResponse::BadRequest().body(format!(
                    "Payment intent is not in a capturable state. Current status: {:?}",
                    intent.status
                ));
            }
        }
        Err(e) => {
            eprintln!("Error retrieving payment intent: {:?}", e);
            return HttpResponse::InternalServerError()
                .body(format!("Failed to retrieve payment intent: {}", e));
        }
    }

    // 2. Validate, price and persist the booking as pending
    let booking = match BookingService::create(
        &listings,
        &bookings,
        policy.get_ref(),
        user_id,
        &input.lines,
        Some(input.customer_id),
        Some(input.payment_intent_id.clone()),
    )
    .await
    {
        Ok(booking) => booking,
        Err(err) => return booking_error_response(err),
    };

    let booking_id = booking.id.expect("inserted booking always has an id");

    // 3. Capture the payment
    match stripe::PaymentIntent::capture(
        stripe_data.as_ref(),
        &input.payment_intent_id,
        CapturePaymentIntent::default(),
    )
    .await
    {
        Ok(captured_intent) => {
            let update_status = if captured_intent.status.to_string() == "succeeded" {
                BookingStatus::Confirmed
            } else {
                BookingStatus::Pending
            };

            match bookings.set_status(&booking_id, update_status).await {
                Ok(_) => HttpResponse::Ok().json(serde_json::json!({
                    "success": true,
                    "booking_id": booking_id.to_string(),
                    "reference": booking.reference,
                    "payment_intent": captured_intent,
                    "status": update_status.as_str(),
                })),
                Err(update_err) => {
                    eprintln!("Error updating booking status: {:?}", update_err);
                    // Payment was captured but status update failed
                    HttpResponse::Ok().json(serde_json::json!({
                        "success": true,
                        "warning": "Booking created and payment captured, but failed to update booking status",
                        "booking_id": booking_id.to_string(),
                        "payment_intent": captured_intent,
                    }))
                }
            }
        }
        Err(capture_err) => {
            eprintln!("Error capturing payment: {:?}", capture_err);
            // Release the held dates since payment failed
            let _ = bookings
                .set_status(&booking_id, BookingStatus::Cancelled)
                .await;

            HttpResponse::InternalServerError().json(serde_json::json!({
                "success": false,
                "booking_id": booking_id.to_string(),
                "error": format!("Booking created but payment capture failed: {}", capture_err),
            }))
        }
    }
}
