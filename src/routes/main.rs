use actix_web::{HttpResponse, Responder, get, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::auth::AdminUser;
use crate::repository::DieselRepository;
use crate::routes::{base_context, redirect, render_template, today};
use crate::services::ServiceError;
use crate::services::catalog::{
    CouponsQueryParams, show_catalog as show_catalog_service,
    show_coupon as show_coupon_service,
};

#[get("/")]
pub async fn index(
    params: web::Query<CouponsQueryParams>,
    admin: Option<AdminUser>,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match show_catalog_service(&params, repo.get_ref(), today()) {
        Ok(page) => {
            let mut context = base_context(&flash_messages, admin.as_ref(), "index");
            context.insert("coupons", &page.coupons);
            context.insert("featured", &page.featured);
            context.insert("categories", &page.categories);
            context.insert("selected_category", page.selected_category);
            context.insert("search", &page.search);
            render_template(&tera, "main/index.html", &context)
        }
        Err(ServiceError::TypeConstraint(message)) => {
            FlashMessage::error(message).send();
            redirect("/")
        }
        Err(err) => {
            log::error!("Failed to render catalog: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/coupons/{coupon_id}")]
pub async fn show_coupon(
    coupon_id: web::Path<i32>,
    admin: Option<AdminUser>,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match show_coupon_service(coupon_id.into_inner(), repo.get_ref(), today()) {
        Ok(coupon) => {
            let mut context = base_context(&flash_messages, admin.as_ref(), "coupon");
            context.insert("coupon", &coupon);
            render_template(&tera, "main/coupon.html", &context)
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Coupon not found").send();
            redirect("/")
        }
        Err(err) => {
            log::error!("Failed to show coupon: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/about")]
pub async fn about(
    admin: Option<AdminUser>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let context = base_context(&flash_messages, admin.as_ref(), "about");
    render_template(&tera, "main/about.html", &context)
}
