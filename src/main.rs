mod api;
mod database;
mod jobs;
mod middleware;
mod models;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::env;
use std::sync::Arc;
use std::time::Duration;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Get configuration from environment
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "5000".to_string());
    let mongodb_uri = env::var("MONGODB_URI").expect("MONGODB_URI must be set");
    // Pas de secret par défaut : un déploiement sans JWT_SECRET ne démarre pas
    env::var("JWT_SECRET").expect("JWT_SECRET must be set");
    let client_url = env::var("CLIENT_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

    log::info!("🚀 Starting MTG Collection Service...");
    log::info!("📊 Database: {}", mongodb_uri);

    // MongoDB : le ping est non bloquant, le serveur démarre même si la base
    // est indisponible (mode dégradé, reconnexion gérée par le driver).
    let db = database::MongoDB::new(&mongodb_uri)
        .await
        .expect("Invalid MongoDB configuration");

    let db_data = web::Data::new(db.clone());

    // Cache Scryfall partagé : TTL 5 min, borné à 1000 entrées
    let cache_data = web::Data::new(utils::TtlCache::new(Duration::from_secs(300), 1000));

    // Rate limiting par IP : 100 requêtes / minute
    let rate_state = Arc::new(middleware::SlidingWindow::new(100, Duration::from_secs(60)));

    log::info!("🧹 Starting background jobs...");
    jobs::start_cache_sweeper(cache_data.clone(), Arc::clone(&rate_state));
    log::info!("✅ Background jobs started");

    log::info!("🌐 Server starting on {}:{}", host, port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", host, port);
    log::info!("📄 OpenAPI spec at: http://{}:{}/api-docs/openapi.json", host, port);

    // Start HTTP server
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&client_url)
            .allowed_origin("http://localhost:3000")
            .allowed_origin("http://localhost:5173")
            .allowed_origin("http://127.0.0.1:3000")
            .allowed_origin("http://127.0.0.1:5173")
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .supports_credentials()
            .max_age(3600);

        // Generate OpenAPI specification
        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(db_data.clone())
            .app_data(cache_data.clone())
            .wrap(cors)
            .wrap(middleware::SecurityHeaders)
            .wrap(middleware::RateLimiter::new(Arc::clone(&rate_state)))
            .wrap(Logger::default())
            // Swagger UI
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone()),
            )
            // Health check
            .route("/health", web::get().to(api::health::health_check))
            // Auth: register/login publics, le reste derrière le middleware JWT
            .service(
                web::scope("/api/auth")
                    .route("/register", web::post().to(api::auth::register))
                    .route("/login", web::post().to(api::auth::login))
                    .service(
                        web::scope("")
                            .wrap(middleware::auth::AuthMiddleware)
                            .route("/me", web::get().to(api::auth::get_me))
                            .route("/profile", web::put().to(api::auth::update_profile))
                            .route("/password", web::put().to(api::auth::change_password))
                            .route("/logout", web::post().to(api::auth::logout))
                            .route("/account", web::delete().to(api::auth::delete_account)),
                    ),
            )
            // Users
            .service(
                web::scope("/api/users")
                    .wrap(middleware::auth::AuthMiddleware)
                    .route("/{id}", web::get().to(api::users::get_user))
                    .route("/{id}", web::put().to(api::users::update_user))
                    .route("/{id}", web::delete().to(api::users::delete_user)),
            )
            // Collections
            .service(
                web::scope("/api/collections")
                    .wrap(middleware::auth::AuthMiddleware)
                    .route("", web::get().to(api::collections::list_collections))
                    .route("", web::post().to(api::collections::create_collection))
                    .route("/{id}", web::get().to(api::collections::get_collection))
                    .route("/{id}", web::put().to(api::collections::update_collection))
                    .route("/{id}", web::delete().to(api::collections::delete_collection))
                    .route("/{id}/cards", web::post().to(api::collections::add_card))
                    .route(
                        "/{id}/cards/{card_id}",
                        web::put().to(api::collections::update_card),
                    )
                    .route(
                        "/{id}/cards/{card_id}",
                        web::delete().to(api::collections::remove_card),
                    ),
            )
            // Decks
            .service(
                web::scope("/api/decks")
                    .wrap(middleware::auth::AuthMiddleware)
                    .route("", web::get().to(api::decks::list_decks))
                    .route("", web::post().to(api::decks::create_deck))
                    .route("/{id}", web::get().to(api::decks::get_deck))
                    .route("/{id}", web::put().to(api::decks::update_deck))
                    .route("/{id}", web::delete().to(api::decks::delete_deck))
                    .route("/{id}/cards", web::post().to(api::decks::add_card))
                    .route(
                        "/{id}/cards/{card_id}",
                        web::put().to(api::decks::update_card),
                    )
                    .route(
                        "/{id}/cards/{card_id}",
                        web::delete().to(api::decks::remove_card),
                    )
                    .route("/{id}/commander", web::put().to(api::decks::set_commander))
                    .route("/{id}/clone", web::post().to(api::decks::clone_deck))
                    .route("/{id}/validate", web::get().to(api::decks::validate_deck)),
            )
            // Cards: proxy Scryfall public (pas de JWT)
            .service(
                web::scope("/api/cards")
                    .route("/search", web::get().to(api::cards::search))
                    .route("/named", web::get().to(api::cards::named))
                    .route("/random", web::get().to(api::cards::random))
                    .route("/autocomplete", web::get().to(api::cards::autocomplete))
                    .route("/sets", web::get().to(api::cards::sets))
                    .route("/symbology", web::get().to(api::cards::symbology))
                    // catch-all, doit rester en dernier
                    .route("/{id}", web::get().to(api::cards::get_card)),
            )
            // Stats
            .service(
                web::scope("/api/stats")
                    .wrap(middleware::auth::AuthMiddleware)
                    .route("/dashboard", web::get().to(api::stats::dashboard)),
            )
    })
    .bind(format!("{}:{}", host, port))?
    .run()
    .await
}
