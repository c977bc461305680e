use actix_web::{web, HttpRequest, HttpResponse, Responder};
use mongodb::Client;
use serde::{Deserialize, Serialize};
use std::{str::FromStr, sync::Arc};
use stripe::{CapturePaymentIntent, EventObject, EventType, Webhook};

use crate::middleware::auth::Claims;
use crate::models::bookings::BookingStatus;
use crate::services::repository::{BookingRepository, MongoBookingRepository, RepositoryError};

#[derive(Serialize, Deserialize)]
pub struct PaymentIntentInput {
    user_id: String,
    amount: i64,
    customer_id: String,
    payment_method_id: String,
}

#[derive(Serialize, Deserialize)]
pub struct CapturePayment {
    user_id: String,
    payment_intent_id: String,
}

#[derive(Clone)]
pub struct StripeConfig {
    pub webhook_secret: String,
}

pub async fn create_payment_intent(
    claims: Claims,
    data: web::Data<Arc<stripe::Client>>,
    input: web::Json<PaymentIntentInput>,
) -> impl Responder {
    if claims.user_id != input.user_id {
        return HttpResponse::Forbidden().body("Forbidden");
    }

    let input = input.into_inner();

    let customer_id = match stripe::CustomerId::from_str(&input.customer_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid customer ID"),
    };
    let payment_method_id = match stripe::PaymentMethodId::from_str(&input.payment_method_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid payment method ID"),
    };

    let mut create_intent = stripe::CreatePaymentIntent::new(input.amount, stripe::Currency::USD);
    create_intent.customer = Some(customer_id);
    create_intent.payment_method = Some(payment_method_id);
    // Manual, as we capture once the booking is created
    create_intent.capture_method = Some(stripe::PaymentIntentCaptureMethod::Manual);

    match stripe::PaymentIntent::create(data.as_ref(), create_intent).await {
        Ok(intent) => HttpResponse::Ok().json(intent),
        Err(e) => {
            eprintln!("Error creating payment intent: {:?}", e);
            HttpResponse::InternalServerError()
                .body(format!("Failed to create payment intent: {}", e))
        }
    }
}

pub async fn capture_payment(
    claims: Claims,
    data: web::Data<Arc<stripe::Client>>,
    input: web::Json<CapturePayment>,
) -> impl Responder {
    if claims.user_id != input.user_id {
        return HttpResponse::Forbidden().body("Forbidden");
    }

    let input = input.into_inner();
    let payment_intent_id = match stripe::PaymentIntentId::from_str(&input.payment_intent_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid payment intent ID"),
    };

    // First retrieve the payment intent to check its status
    match stripe::PaymentIntent::retrieve(data.as_ref(), &payment_intent_id, &[]).await {
        Ok(intent) => {
            if intent.status != stripe::PaymentIntentStatus::RequiresCapture {
                return HttpResponse::BadRequest().body(format!(
                    "Payment intent is not in a capturable state. Current status: {:?}",
                    intent.status
                ));
            }

            match stripe::PaymentIntent::capture(
                data.as_ref(),
                &input.payment_intent_id,
                CapturePaymentIntent::default(),
            )
            .await
            {
                Ok(captured_intent) => HttpResponse::Ok().json(captured_intent),
                Err(e) => {
                    eprintln!("Error capturing payment: {:?}", e);
                    HttpResponse::InternalServerError()
                        .body(format!("Failed to capture payment: {}", e))
                }
            }
        }
        Err(e) => {
            eprintln!("Error retrieving payment intent: {:?}", e);
            HttpResponse::InternalServerError()
                .body(format!("Failed to retrieve payment intent: {}", e))
        }
    }
}

async fn set_status_by_transaction(
    bookings: &MongoBookingRepository,
    transaction_id: &str,
    status: BookingStatus,
) {
    match bookings.find_by_transaction(transaction_id).await {
        Ok(booking) => {
            if let Some(id) = booking.id {
                if let Err(err) = bookings.set_status(&id, status).await {
                    eprintln!("Failed to update booking {}: {:?}", id, err);
                }
            }
        }
        Err(RepositoryError::NotFound) => {
            // Intent was created but checkout never completed; nothing to update
        }
        Err(err) => eprintln!(
            "Failed to look up booking for transaction {}: {:?}",
            transaction_id, err
        ),
    }
}

pub async fn handle_stripe_webhook(
    req: HttpRequest,
    payload: web::Bytes,
    stripe_config: web::Data<StripeConfig>,
    mongo: web::Data<Arc<Client>>,
) -> impl Responder {
    // Get the Stripe-Signature header
    let signature = match req.headers().get("stripe-signature") {
        Some(sig) => sig.to_str().unwrap_or(""),
        None => {
            return HttpResponse::BadRequest().body("Missing stripe-signature header");
        }
    };

    let payload_str = match String::from_utf8(payload.to_vec()) {
        Ok(s) => s,
        Err(_) => {
            return HttpResponse::BadRequest().body("Invalid payload encoding");
        }
    };

    let event =
        match Webhook::construct_event(&payload_str, signature, &stripe_config.webhook_secret) {
            Ok(event) => event,
            Err(e) => {
                eprintln!("Webhook error: {:?}", e);
                return HttpResponse::BadRequest().body(format!("Webhook error: {}", e));
            }
        };

    let bookings = MongoBookingRepository::new(mongo.get_ref().clone());

    match event.type_ {
        EventType::PaymentIntentSucceeded => {
            if let EventObject::PaymentIntent(payment_intent) = event.data.object {
                set_status_by_transaction(
                    &bookings,
                    payment_intent.id.as_str(),
                    BookingStatus::Confirmed,
                )
                .await;
                HttpResponse::Ok().json(serde_json::json!({ "received": true }))
            } else {
                HttpResponse::BadRequest().body("Invalid payment intent object")
            }
        }

        EventType::PaymentIntentPaymentFailed => {
            if let EventObject::PaymentIntent(payment_intent) = event.data.object {
                println!("Payment failed: {}", payment_intent.id);
                set_status_by_transaction(
                    &bookings,
                    payment_intent.id.as_str(),
                    BookingStatus::Cancelled,
                )
                .await;
                HttpResponse::Ok().json(serde_json::json!({ "received": true }))
            } else {
                HttpResponse::BadRequest().body("Invalid payment intent object")
            }
        }

        // Handle other event types as needed
        _ => {
            println!("Unhandled event type: {:?}", event.type_);
            HttpResponse::Ok().json(serde_json::json!({ "received": true }))
        }
    }
}
