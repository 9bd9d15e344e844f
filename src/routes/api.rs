use std::path::Path;

use actix_multipart::form::MultipartForm;
use actix_web::{HttpResponse, Responder, delete, get, patch, post, put, web};
use serde::{Deserialize, Serialize};

use crate::auth::AdminUser;
use crate::forms::auth::{LoginForm, LoginFormPayload};
use crate::forms::coupons::{CouponForm, CouponFormPayload};
use crate::forms::import_export::UploadImportForm;
use crate::forms::uploads::{LogoUpload, UploadLogoForm};
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{ErrorDetail, api_error};
use crate::services::ServiceError;
use crate::services::auth::login as login_service;
use crate::services::catalog::{
    CouponsQueryParams, get_coupon_dto, list_categories as list_categories_service,
    list_coupons as list_coupons_service,
};
use crate::services::coupons::{
    create_coupon as create_coupon_service, delete_coupon as delete_coupon_service,
    set_featured as set_featured_service, update_coupon as update_coupon_service,
};
use crate::services::import_export::{
    export_coupons as export_coupons_service, import_coupons as import_coupons_service,
};
use crate::services::uploads::upload_logo as upload_logo_service;

#[derive(Deserialize, Debug)]
struct FeaturedPayload {
    featured: bool,
}

#[derive(Deserialize, Debug)]
struct ExportQueryParams {
    format: Option<String>,
}

#[derive(Serialize)]
struct MessageResponse {
    message: &'static str,
}

#[derive(Serialize)]
struct UploadLogoResponse {
    url: String,
}

#[get("/coupons")]
pub async fn list_coupons(
    params: web::Query<CouponsQueryParams>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match list_coupons_service(&params, repo.get_ref()) {
        Ok(coupons) => HttpResponse::Ok().json(coupons),
        Err(err) => api_error(err),
    }
}

#[get("/coupons/{coupon_id}")]
pub async fn get_coupon(
    coupon_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match get_coupon_dto(coupon_id.into_inner(), repo.get_ref()) {
        Ok(coupon) => HttpResponse::Ok().json(coupon),
        Err(err) => api_error(err),
    }
}

#[get("/categories")]
pub async fn list_categories() -> impl Responder {
    HttpResponse::Ok().json(list_categories_service())
}

#[post("/admin/login")]
pub async fn login(
    form: web::Json<LoginForm>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    let payload = match LoginFormPayload::try_from(form.into_inner()) {
        Ok(payload) => payload,
        Err(err) => return api_error(err.into()),
    };

    match login_service(payload, &server_config) {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(ServiceError::Unauthorized) => {
            HttpResponse::Unauthorized().json(ErrorDetail::new("Invalid credentials"))
        }
        Err(err) => api_error(err),
    }
}

#[post("/admin/coupons")]
pub async fn create_coupon(
    admin: AdminUser,
    form: web::Json<CouponForm>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let payload = match CouponFormPayload::try_from(form.into_inner()) {
        Ok(payload) => payload,
        Err(err) => return api_error(err.into()),
    };

    match create_coupon_service(payload, &admin, repo.get_ref()) {
        Ok(coupon) => HttpResponse::Created().json(coupon),
        Err(err) => api_error(err),
    }
}

#[put("/admin/coupons/{coupon_id}")]
pub async fn update_coupon(
    coupon_id: web::Path<i32>,
    admin: AdminUser,
    form: web::Json<CouponForm>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let payload = match CouponFormPayload::try_from(form.into_inner()) {
        Ok(payload) => payload,
        Err(err) => return api_error(err.into()),
    };

    match update_coupon_service(coupon_id.into_inner(), payload, &admin, repo.get_ref()) {
        Ok(coupon) => HttpResponse::Ok().json(coupon),
        Err(err) => api_error(err),
    }
}

#[delete("/admin/coupons/{coupon_id}")]
pub async fn delete_coupon(
    coupon_id: web::Path<i32>,
    admin: AdminUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match delete_coupon_service(coupon_id.into_inner(), &admin, repo.get_ref()) {
        Ok(()) => HttpResponse::Ok().json(MessageResponse {
            message: "Coupon deleted successfully",
        }),
        Err(err) => api_error(err),
    }
}

#[patch("/admin/coupons/{coupon_id}/featured")]
pub async fn set_featured(
    coupon_id: web::Path<i32>,
    admin: AdminUser,
    form: web::Json<FeaturedPayload>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match set_featured_service(
        coupon_id.into_inner(),
        form.featured,
        &admin,
        repo.get_ref(),
    ) {
        Ok(coupon) => HttpResponse::Ok().json(coupon),
        Err(err) => api_error(err),
    }
}

#[post("/admin/upload-logo")]
pub async fn upload_logo(
    _admin: AdminUser,
    server_config: web::Data<ServerConfig>,
    MultipartForm(form): MultipartForm<UploadLogoForm>,
) -> impl Responder {
    let upload = match LogoUpload::from_temp_file(&form.file) {
        Ok(upload) => upload,
        Err(e) => {
            log::error!("Failed to read uploaded logo: {e}");
            return api_error(ServiceError::Internal);
        }
    };

    match upload_logo_service(upload, Path::new(&server_config.upload_dir)) {
        Ok(url) => HttpResponse::Ok().json(UploadLogoResponse { url }),
        Err(err) => api_error(err),
    }
}

#[get("/admin/coupons/export")]
pub async fn export_coupons(
    params: web::Query<ExportQueryParams>,
    admin: AdminUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let format = params.format.as_deref().unwrap_or("csv");

    match export_coupons_service(format, &admin, repo.get_ref()) {
        Ok(file) => HttpResponse::Ok()
            .append_header(("Content-Type", file.content_type))
            .append_header((
                "Content-Disposition",
                format!("attachment; filename=\"{}\"", file.file_name),
            ))
            .body(file.bytes),
        Err(err) => api_error(err),
    }
}

#[post("/admin/coupons/import")]
pub async fn import_coupons(
    admin: AdminUser,
    repo: web::Data<DieselRepository>,
    MultipartForm(mut form): MultipartForm<UploadImportForm>,
) -> impl Responder {
    match import_coupons_service(&mut form, &admin, repo.get_ref()) {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(err) => api_error(err),
    }
}
