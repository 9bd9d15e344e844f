use std::path::Path;

use actix_identity::Identity;
use actix_multipart::form::MultipartForm;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::auth::AdminUser;
use crate::domain::types::{Category, LogoUrl};
use crate::dto::coupons::CouponFormValues;
use crate::forms::auth::{LoginForm, LoginFormPayload};
use crate::forms::coupons::{CouponFormPayload, CouponMultipartForm};
use crate::forms::import_export::UploadImportForm;
use crate::forms::uploads::LogoUpload;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, ensure_admin, redirect, render_template, today};
use crate::services::auth::login as login_service;
use crate::services::coupons::{
    create_coupon as create_coupon_service, delete_coupon as delete_coupon_service,
    get_admin_coupon, list_admin_coupons, toggle_featured as toggle_featured_service,
    update_coupon as update_coupon_service,
};
use crate::services::import_export::import_coupons as import_coupons_service;
use crate::services::uploads::{remove_logo, upload_logo as upload_logo_service};
use crate::services::{ServiceError, ServiceResult};

const DASHBOARD: &str = "/admin/dashboard";
/// Flash messages live in a cookie, so only the first few row errors fit.
const MAX_FLASHED_ROW_ERRORS: usize = 5;

fn category_names() -> Vec<&'static str> {
    Category::ALL.iter().map(|c| c.as_str()).collect()
}

/// Validate the multipart form, then store a picked logo file.
/// Also returns the URL of a newly stored logo.
fn coupon_payload(
    form: &CouponMultipartForm,
    server_config: &ServerConfig,
) -> ServiceResult<(CouponFormPayload, Option<String>)> {
    let mut payload = CouponFormPayload::try_from(form.to_coupon_form())?;

    let Some(file) = form.logo_file() else {
        return Ok((payload, None));
    };

    let upload = LogoUpload::from_temp_file(file).map_err(|e| {
        log::error!("Failed to read uploaded logo: {e}");
        ServiceError::Internal
    })?;
    let upload_dir = Path::new(&server_config.upload_dir);
    let url = upload_logo_service(upload, upload_dir)?;
    match LogoUrl::new(url.as_str()) {
        Ok(logo_url) => payload.logo_url = Some(logo_url),
        Err(e) => {
            remove_logo(&url, upload_dir);
            return Err(e.into());
        }
    }

    Ok((payload, Some(url)))
}

/// Run a coupon write, removing the freshly stored logo when it fails.
fn with_logo_cleanup<T>(
    stored_logo: Option<String>,
    server_config: &ServerConfig,
    write: impl FnOnce() -> ServiceResult<T>,
) -> ServiceResult<T> {
    let result = write();
    if let (Err(_), Some(url)) = (&result, stored_logo) {
        remove_logo(&url, Path::new(&server_config.upload_dir));
    }
    result
}

#[get("/admin")]
pub async fn login_page(
    admin: Option<AdminUser>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    if admin.is_some() {
        return redirect(DASHBOARD);
    }

    let context = base_context(&flash_messages, None, "login");
    render_template(&tera, "admin/login.html", &context)
}

#[post("/admin/login")]
pub async fn login(
    request: HttpRequest,
    web::Form(form): web::Form<LoginForm>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    let payload = match LoginFormPayload::try_from(form) {
        Ok(payload) => payload,
        Err(err) => {
            FlashMessage::error(err.to_string()).send();
            return redirect("/admin");
        }
    };

    match login_service(payload, &server_config) {
        Ok(response) => match Identity::login(&request.extensions(), response.token) {
            Ok(_) => redirect(DASHBOARD),
            Err(e) => {
                log::error!("Failed to store admin session: {e}");
                HttpResponse::InternalServerError().finish()
            }
        },
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Invalid credentials").send();
            redirect("/admin")
        }
        Err(err) => {
            log::error!("Failed to log in: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/admin/logout")]
pub async fn logout(user: Option<Identity>) -> impl Responder {
    if let Some(user) = user {
        user.logout();
    }
    FlashMessage::info("Logged out").send();
    redirect("/admin")
}

#[get("/admin/dashboard")]
pub async fn dashboard(
    admin: Option<AdminUser>,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let admin = match ensure_admin(admin) {
        Ok(admin) => admin,
        Err(response) => return response,
    };

    match list_admin_coupons(&admin, repo.get_ref(), today()) {
        Ok(coupons) => {
            let mut context = base_context(&flash_messages, Some(&admin), "dashboard");
            context.insert("coupons", &coupons);
            render_template(&tera, "admin/dashboard.html", &context)
        }
        Err(err) => {
            log::error!("Failed to list coupons: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/admin/coupons/new")]
pub async fn new_coupon(
    admin: Option<AdminUser>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let admin = match ensure_admin(admin) {
        Ok(admin) => admin,
        Err(response) => return response,
    };

    let mut context = base_context(&flash_messages, Some(&admin), "new_coupon");
    context.insert("form", &CouponFormValues::default());
    context.insert("categories", &category_names());
    context.insert("form_action", "/admin/coupons");
    render_template(&tera, "admin/coupon_form.html", &context)
}

#[post("/admin/coupons")]
pub async fn create_coupon(
    admin: Option<AdminUser>,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    MultipartForm(form): MultipartForm<CouponMultipartForm>,
) -> impl Responder {
    let admin = match ensure_admin(admin) {
        Ok(admin) => admin,
        Err(response) => return response,
    };

    let result = coupon_payload(&form, &server_config).and_then(|(payload, stored_logo)| {
        with_logo_cleanup(stored_logo, &server_config, || {
            create_coupon_service(payload, &admin, repo.get_ref())
        })
    });

    match result {
        Ok(_) => {
            FlashMessage::success("Coupon created").send();
            redirect(DASHBOARD)
        }
        Err(ServiceError::Form(message) | ServiceError::TypeConstraint(message)) => {
            FlashMessage::error(message).send();
            redirect("/admin/coupons/new")
        }
        Err(err) => {
            log::error!("Failed to create coupon: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/admin/coupons/{coupon_id}/edit")]
pub async fn edit_coupon(
    coupon_id: web::Path<i32>,
    admin: Option<AdminUser>,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let admin = match ensure_admin(admin) {
        Ok(admin) => admin,
        Err(response) => return response,
    };
    let coupon_id = coupon_id.into_inner();

    match get_admin_coupon(coupon_id, &admin, repo.get_ref()) {
        Ok(coupon) => {
            let mut context = base_context(&flash_messages, Some(&admin), "edit_coupon");
            context.insert("form", &CouponFormValues::from(coupon));
            context.insert("categories", &category_names());
            context.insert(
                "form_action",
                &format!("/admin/coupons/{coupon_id}/update"),
            );
            render_template(&tera, "admin/coupon_form.html", &context)
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Coupon not found").send();
            redirect(DASHBOARD)
        }
        Err(err) => {
            log::error!("Failed to load coupon {coupon_id}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/admin/coupons/{coupon_id}/update")]
pub async fn update_coupon(
    coupon_id: web::Path<i32>,
    admin: Option<AdminUser>,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    MultipartForm(form): MultipartForm<CouponMultipartForm>,
) -> impl Responder {
    let admin = match ensure_admin(admin) {
        Ok(admin) => admin,
        Err(response) => return response,
    };
    let coupon_id = coupon_id.into_inner();

    let result = coupon_payload(&form, &server_config).and_then(|(payload, stored_logo)| {
        with_logo_cleanup(stored_logo, &server_config, || {
            update_coupon_service(coupon_id, payload, &admin, repo.get_ref())
        })
    });

    match result {
        Ok(_) => {
            FlashMessage::success("Coupon updated").send();
            redirect(DASHBOARD)
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Coupon not found").send();
            redirect(DASHBOARD)
        }
        Err(ServiceError::Form(message) | ServiceError::TypeConstraint(message)) => {
            FlashMessage::error(message).send();
            redirect(&format!("/admin/coupons/{coupon_id}/edit"))
        }
        Err(err) => {
            log::error!("Failed to update coupon {coupon_id}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/admin/coupons/{coupon_id}/delete")]
pub async fn delete_coupon(
    coupon_id: web::Path<i32>,
    admin: Option<AdminUser>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let admin = match ensure_admin(admin) {
        Ok(admin) => admin,
        Err(response) => return response,
    };

    match delete_coupon_service(coupon_id.into_inner(), &admin, repo.get_ref()) {
        Ok(()) => {
            FlashMessage::success("Coupon deleted").send();
            redirect(DASHBOARD)
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Coupon not found").send();
            redirect(DASHBOARD)
        }
        Err(err) => {
            log::error!("Failed to delete coupon: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/admin/coupons/{coupon_id}/feature")]
pub async fn toggle_featured(
    coupon_id: web::Path<i32>,
    admin: Option<AdminUser>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let admin = match ensure_admin(admin) {
        Ok(admin) => admin,
        Err(response) => return response,
    };

    match toggle_featured_service(coupon_id.into_inner(), &admin, repo.get_ref()) {
        Ok(coupon) => {
            let message = if coupon.featured {
                format!("{} is now featured", coupon.title)
            } else {
                format!("{} is no longer featured", coupon.title)
            };
            FlashMessage::success(message).send();
            redirect(DASHBOARD)
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Coupon not found").send();
            redirect(DASHBOARD)
        }
        Err(err) => {
            log::error!("Failed to toggle featured flag: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/admin/coupons/import")]
pub async fn import_coupons(
    admin: Option<AdminUser>,
    repo: web::Data<DieselRepository>,
    MultipartForm(mut form): MultipartForm<UploadImportForm>,
) -> impl Responder {
    let admin = match ensure_admin(admin) {
        Ok(admin) => admin,
        Err(response) => return response,
    };

    match import_coupons_service(&mut form, &admin, repo.get_ref()) {
        Ok(report) => {
            let summary = format!(
                "Import finished: {} created, {} updated, {} skipped",
                report.created, report.updated, report.skipped
            );
            if report.errors.is_empty() {
                FlashMessage::success(summary).send();
            } else {
                FlashMessage::warning(summary).send();
                for error in report.errors.iter().take(MAX_FLASHED_ROW_ERRORS) {
                    FlashMessage::error(format!("Row {}: {}", error.row_number, error.message))
                        .send();
                }
            }
            redirect(DASHBOARD)
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect(DASHBOARD)
        }
        Err(err) => {
            log::error!("Failed to import coupons: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}
