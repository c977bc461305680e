pub mod listings;

use actix_web::web;

use crate::middleware::auth::AuthMiddleware;
use crate::middleware::role_auth::RequireRole;
use crate::models::user::UserRole;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .wrap(RequireRole::new(UserRole::Admin))
            .wrap(AuthMiddleware)
            .route("/listings", web::post().to(listings::create_listing))
            .route(
                "/listings/{id}/status",
                web::put().to(listings::update_listing_status),
            ),
    );
}
