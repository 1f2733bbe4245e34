//! Home routes (authentication required via extractor).

use actix_web::{get, HttpResponse, Responder};

use actix_apikey_core::http::security::{AuthenticatedCredential, OptionalCredential};

/// Home page - shows the caller behind the key.
/// Uses AuthenticatedCredential extractor (returns 401 if not authenticated).
#[get("/")]
pub async fn index(credential: AuthenticatedCredential) -> impl Responder {
    HttpResponse::Ok().body(format!(
        "Welcome, {}!\nRoles: {:?}\nDiscriminator: {:?}",
        credential.get_username(),
        credential.get_roles(),
        credential.get_discriminator()
    ))
}

/// Status page - uses OptionalCredential extractor (never fails).
#[get("/status")]
pub async fn status(credential: OptionalCredential) -> impl Responder {
    match credential.into_inner() {
        Some(c) => HttpResponse::Ok().body(format!("Authenticated as: {}", c.get_username())),
        None => HttpResponse::Ok().body("Anonymous"),
    }
}
