use std::env;
use std::io;

use actix_files::Files;
use actix_identity::IdentityMiddleware;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::{App, HttpServer, middleware, web};
use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};
use config::{Config, Environment, File};
use tera::Tera;

use coupondeck::auth::verify_password;
use coupondeck::db::{establish_connection_pool, run_migrations};
use coupondeck::models::config::ServerConfig;
use coupondeck::repository::DieselRepository;
use coupondeck::routes::{configure_api, configure_html};

fn load_config() -> Result<ServerConfig, config::ConfigError> {
    let config_path = env::var("APP_CONFIG").unwrap_or_else(|_| "config/default".to_string());

    Config::builder()
        .add_source(File::with_name(&config_path))
        // `APP_PORT=9000`, `APP_ADMIN__USERNAME=root`
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let server_config = load_config().map_err(|e| {
        log::error!("Failed to load configuration: {e}");
        io::Error::other(e)
    })?;

    if let Err(e) = verify_password("", &server_config.admin.password_hash) {
        log::error!("admin.password_hash is not an Argon2 hash, see the hash-password binary: {e}");
        return Err(io::Error::other(e));
    }

    let secret_key = Key::try_from(server_config.secret.as_bytes()).map_err(|e| {
        log::error!("The secret must be at least 64 bytes long: {e}");
        io::Error::other(e)
    })?;

    let pool = establish_connection_pool(&server_config.database_url).map_err(|e| {
        log::error!("Failed to establish database connection: {e}");
        io::Error::other(e)
    })?;

    run_migrations(&pool).map_err(|e| {
        log::error!("Failed to run migrations: {e}");
        io::Error::other(e)
    })?;

    let tera = Tera::new(&server_config.templates_dir).map_err(|e| {
        log::error!("Failed to parse templates: {e}");
        io::Error::other(e)
    })?;

    std::fs::create_dir_all(&server_config.upload_dir)?;

    let message_store = CookieMessageStore::builder(secret_key.clone()).build();
    let message_framework = FlashMessagesFramework::builder(message_store).build();

    let bind_address = (server_config.address.clone(), server_config.port);
    let upload_dir = server_config.upload_dir.clone();

    let repo = web::Data::new(DieselRepository::new(pool));
    let server_config = web::Data::new(server_config);
    let tera = web::Data::new(tera);

    log::info!("Listening on {}:{}", bind_address.0, bind_address.1);

    HttpServer::new(move || {
        App::new()
            .wrap(message_framework.clone())
            .wrap(IdentityMiddleware::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_secure(false)
                    .build(),
            )
            .wrap(middleware::Logger::default())
            .app_data(repo.clone())
            .app_data(server_config.clone())
            .app_data(tera.clone())
            .service(Files::new("/assets", "./assets"))
            .service(Files::new("/uploads", &upload_dir))
            .configure(configure_api)
            .configure(configure_html)
    })
    .bind(bind_address)?
    .run()
    .await
}
