use actix_multipart::form::MultipartFormConfig;
use actix_web::error::InternalError;
use actix_web::http::header;
use actix_web::{HttpResponse, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages, Level};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use tera::{Context, Tera};

use crate::auth::AdminUser;
use crate::services::ServiceError;

pub mod admin;
pub mod api;
pub mod main;

/// Body of every JSON error response.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorDetail {
    pub detail: String,
}

impl ErrorDetail {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// Bootstrap alert class for a flash message level.
pub fn alert_level_to_str(level: &Level) -> &'static str {
    match level {
        Level::Error => "danger",
        Level::Warning => "warning",
        Level::Success => "success",
        Level::Info => "info",
        Level::Debug => "secondary",
    }
}

pub fn render_template(tera: &Tera, template: &str, context: &Context) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(tera.render(template, context).unwrap_or_else(|e| {
            log::error!("Failed to render template '{template}': {e}");
            String::new()
        }))
}

pub fn base_context(
    flash_messages: &IncomingFlashMessages,
    admin: Option<&AdminUser>,
    current_page: &str,
) -> Context {
    let alerts = flash_messages
        .iter()
        .map(|f| (f.content(), alert_level_to_str(&f.level())))
        .collect::<Vec<_>>();

    let mut context = Context::new();
    context.insert("alerts", &alerts);
    context.insert("current_admin", &admin.map(|a| a.username.as_str()));
    context.insert("current_page", current_page);
    context
}

/// `303 See Other` to `location`, so a browser follows a POST with a GET.
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Unwrap the optional admin of an HTML handler or send the browser to the
/// login page.
pub fn ensure_admin(admin: Option<AdminUser>) -> Result<AdminUser, HttpResponse> {
    admin.ok_or_else(|| {
        FlashMessage::warning("Please log in to continue").send();
        redirect("/admin")
    })
}

/// Date used for expiry badges.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// JSON error response for a failed service call.
pub fn api_error(err: ServiceError) -> HttpResponse {
    match err {
        ServiceError::Unauthorized => {
            HttpResponse::Unauthorized().json(ErrorDetail::new("Not authenticated"))
        }
        ServiceError::NotFound => HttpResponse::NotFound().json(ErrorDetail::new("Coupon not found")),
        ServiceError::TypeConstraint(message) | ServiceError::Form(message) => {
            HttpResponse::BadRequest().json(ErrorDetail::new(message))
        }
        ServiceError::Internal => {
            HttpResponse::InternalServerError().json(ErrorDetail::new("Internal server error"))
        }
    }
}

/// Mount the JSON API under `/api`.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    let json_config = web::JsonConfig::default().error_handler(|err, _req| {
        let response = HttpResponse::BadRequest().json(ErrorDetail::new(err.to_string()));
        InternalError::from_response(err, response).into()
    });
    let path_config = web::PathConfig::default().error_handler(|err, _req| {
        let response = HttpResponse::NotFound().json(ErrorDetail::new("Coupon not found"));
        InternalError::from_response(err, response).into()
    });
    let multipart_config = MultipartFormConfig::default()
        .total_limit(12 * 1024 * 1024)
        .error_handler(|err, _req| {
            let response = HttpResponse::BadRequest().json(ErrorDetail::new(err.to_string()));
            InternalError::from_response(err, response).into()
        });

    cfg.service(
        web::scope("/api")
            .app_data(json_config)
            .app_data(path_config)
            .app_data(multipart_config)
            .service(api::list_coupons)
            .service(api::get_coupon)
            .service(api::list_categories)
            .service(api::login)
            .service(api::export_coupons)
            .service(api::import_coupons)
            .service(api::upload_logo)
            .service(api::create_coupon)
            .service(api::update_coupon)
            .service(api::delete_coupon)
            .service(api::set_featured),
    );
}

/// Mount the server-rendered catalog and admin pages.
pub fn configure_html(cfg: &mut web::ServiceConfig) {
    cfg.service(main::index)
        .service(main::show_coupon)
        .service(main::about)
        .service(admin::login_page)
        .service(admin::login)
        .service(admin::logout)
        .service(admin::dashboard)
        .service(admin::new_coupon)
        .service(admin::create_coupon)
        .service(admin::import_coupons)
        .service(admin::edit_coupon)
        .service(admin::update_coupon)
        .service(admin::delete_coupon)
        .service(admin::toggle_featured);
}
