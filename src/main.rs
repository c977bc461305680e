use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use vizit_api::db;
use vizit_api::middleware;
use vizit_api::routes;
use vizit_api::services::pricing::TaxPolicy;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    println!("Application starting...");

    env_logger::init_from_env(Env::default().default_filter_or("info"));

    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    } else {
        println!("Release mode");
    }

    let host = std::env::var("HOST").unwrap_or_else(|_| HOST.to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| PORT.to_string())
        .parse()
        .unwrap_or(PORT);
    println!("Attempting to bind to {}:{}", host, port);

    let mongo_uri = std::env::var("MONGODB_URI").expect("MONGODB_URI must be set");
    let client = db::mongo::create_mongo_client(&mongo_uri).await;
    println!("MongoDB connection established");

    let stripe_secret = std::env::var("STRIPE_SECRET_KEY").expect("STRIPE_SECRET_KEY must be set");
    let stripe_client = Arc::new(stripe::Client::new(stripe_secret));
    let stripe_config = routes::payment::StripeConfig {
        webhook_secret: std::env::var("STRIPE_WEBHOOK_SECRET").unwrap_or_default(),
    };

    let tax_policy = TaxPolicy::from_env();
    println!(
        "Tax policy: rate {} labeled {:?}",
        tax_policy.rate, tax_policy.label
    );

    println!("Starting HTTP server...");

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .route("/health", web::get().to(routes::health::health_check))
            .app_data(web::Data::new(client.clone()))
            .app_data(web::Data::new(stripe_client.clone()))
            .app_data(web::Data::new(stripe_config.clone()))
            .app_data(web::Data::new(tax_policy.clone()))
            .route(
                "/stripe/webhook",
                web::post().to(routes::payment::handle_stripe_webhook),
            )
            .service(
                web::scope("/api")
                    // Public routes
                    .service(
                        web::scope("/auth")
                            .route("/signup", web::post().to(routes::account::auth::signup))
                            .route("/signin", web::post().to(routes::account::auth::signin))
                            .service(
                                web::scope("")
                                    .wrap(middleware::auth::AuthMiddleware)
                                    .route(
                                        "/session",
                                        web::get().to(routes::account::auth::user_session),
                                    ),
                            ),
                    )
                    .configure(routes::admin::config)
                    .service(
                        web::scope("")
                            .route("/locations", web::get().to(routes::location::get_locations))
                            .route("/listings", web::get().to(routes::listing::get_listings))
                            .route(
                                "/listings/{id}",
                                web::get().to(routes::listing::get_listing_by_id),
                            )
                            .route(
                                "/listings/{id}/availability",
                                web::get().to(routes::availability::check_availability),
                            )
                            .route("/cart/quote", web::post().to(routes::cart::quote_cart))
                            // Protected routes
                            .service(
                                web::scope("/account/{id}")
                                    .wrap(middleware::auth::AuthMiddleware)
                                    .route(
                                        "/bookings",
                                        web::post().to(routes::account::bookings::add_booking),
                                    )
                                    .route(
                                        "/bookings",
                                        web::get().to(routes::account::bookings::get_all_bookings),
                                    )
                                    .route(
                                        "/bookings/checkout",
                                        web::post()
                                            .to(routes::account::bookings::add_booking_with_payment),
                                    )
                                    .route(
                                        "/bookings/{booking_id}",
                                        web::get().to(routes::account::bookings::get_booking_by_id),
                                    )
                                    .route(
                                        "/bookings/{booking_id}/cancel",
                                        web::put().to(routes::account::bookings::cancel_booking),
                                    ),
                            )
                            .service(
                                web::scope("/payment")
                                    .wrap(middleware::auth::AuthMiddleware)
                                    .route(
                                        "/payment-intent",
                                        web::post().to(routes::payment::create_payment_intent),
                                    )
                                    .route(
                                        "/capture-payment",
                                        web::post().to(routes::payment::capture_payment),
                                    ),
                            ),
                    ),
            )
    })
    .bind((host, port))?
    .run()
    .await
}
