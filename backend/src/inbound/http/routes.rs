//! Route table for the `/api` surface.
//!
//! ```text
//! /api/auth/{register,login,googleSign,me}
//! /api/upload
//! /api/courses, /api/courses/create, /api/courses/{id}
//! /api/components, /api/components/create, /api/components/{id}
//! /api/products, /api/products/create, /api/products/{id}
//! /api/projects, /api/projects/create
//! /api/updateVisibility
//! /api/orders
//! ```

use actix_web::error::{JsonPayloadError, QueryPayloadError};
use actix_web::{HttpRequest, web};

use crate::domain::Error;
use crate::inbound::http::{auth, catalogue, courses, orders, upload, visibility};

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let error = match err {
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            Error::payload_too_large(err.to_string())
        }
        other => Error::invalid_request(format!("Malformed JSON body: {other}")),
    };
    error.into()
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(format!("Invalid query string: {err}")).into()
}

/// Register every `/api` route together with the JSON and query error
/// handlers that turn extractor failures into domain errors.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .service(
            web::scope("/api")
                .service(
                    web::scope("/auth")
                        .service(auth::register)
                        .service(auth::login)
                        .service(auth::google_sign)
                        .service(auth::current_user),
                )
                .service(upload::upload_file)
                .service(
                    web::scope("/courses")
                        .service(courses::create_course)
                        .service(courses::list_courses)
                        .service(courses::get_course)
                        .service(courses::patch_course),
                )
                .service(
                    web::scope("/components")
                        .service(catalogue::create_component)
                        .service(catalogue::list_components)
                        .service(catalogue::patch_component),
                )
                .service(
                    web::scope("/products")
                        .service(catalogue::create_product)
                        .service(catalogue::list_products)
                        .service(catalogue::patch_product),
                )
                .service(
                    web::scope("/projects")
                        .service(catalogue::create_project)
                        .service(catalogue::list_projects),
                )
                .service(visibility::update_visibility)
                .service(orders::place_order)
                .service(orders::list_orders),
        );
}
