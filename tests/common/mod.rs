use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App};
use mongodb::options::ClientOptions;

use vizit_api::middleware;
use vizit_api::routes;
use vizit_api::services::pricing::TaxPolicy;

pub struct TestApp {
    pub client: Arc<mongodb::Client>,
}

impl TestApp {
    /// The client connects lazily and the route tests only exercise request
    /// paths that fail before any query is issued, so no MongoDB server has
    /// to be running.
    pub async fn new() -> Self {
        let uri = std::env::var("MONGODB_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let mut options = ClientOptions::parse(&uri)
            .await
            .expect("MongoDB URI may be incorrect! Failed to parse.");
        options.connect_timeout = Some(Duration::from_secs(1));
        options.server_selection_timeout = Some(Duration::from_secs(1));
        let client = Arc::new(
            mongodb::Client::with_options(options)
                .expect("Failed to create MongoDB client with options"),
        );

        Self { client }
    }

    /// Same route tree as the server binary, with the real handlers and
    /// middleware wired in.
    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<
                impl actix_web::body::MessageBody<Error: Into<actix_web::Error>>,
            >,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let stripe_client = Arc::new(stripe::Client::new("sk_test_dummy"));
        let stripe_config = routes::payment::StripeConfig {
            webhook_secret: "whsec_dummy".to_string(),
        };

        App::new()
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .app_data(web::Data::new(self.client.clone()))
            .app_data(web::Data::new(stripe_client))
            .app_data(web::Data::new(stripe_config))
            .app_data(web::Data::new(TaxPolicy::default()))
            .route(
                "/stripe/webhook",
                web::post().to(routes::payment::handle_stripe_webhook),
            )
            .service(
                web::scope("/api")
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
    }
}
