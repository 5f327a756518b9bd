use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "MTG Collection Service API",
        version = "1.0.0",
        description = "API documentation for the MTG collection manager. \n\n**Authentication:** Most endpoints require a JWT Bearer token.\n\n**Features:**\n- Account registration and JWT login\n- Card search proxied to Scryfall (French-localized, English fallback)\n- Personal card collections with per-printing tracking\n- Deck building with per-format legality validation\n- Dashboard statistics",
        contact(
            name = "MTG Collection Team",
            email = "support@mtg-collection.fr"
        )
    ),
    paths(
        // Auth endpoints
        crate::api::auth::register,
        crate::api::auth::login,
        crate::api::auth::get_me,

        // Health
        crate::api::health::health_check,

        // Cards (Scryfall proxy)
        crate::api::cards::search,

        // Collections
        crate::api::collections::add_card,

        // Decks
        crate::api::decks::add_card,
        crate::api::decks::validate_deck,

        // Stats
        crate::api::stats::dashboard,
    ),
    components(
        schemas(
            // Auth
            crate::services::auth_service::RegisterRequest,
            crate::services::auth_service::LoginRequest,
            crate::services::auth_service::UpdateProfileRequest,
            crate::services::auth_service::ChangePasswordRequest,
            crate::services::auth_service::AuthResponse,
            crate::models::UserInfo,
            crate::models::PublicProfile,

            // Health
            crate::api::health::HealthResponse,

            // Collections
            crate::services::collection_service::CreateCollectionRequest,
            crate::services::collection_service::UpdateCollectionRequest,
            crate::services::collection_service::AddCardRequest,
            crate::services::collection_service::UpdateCardRequest,
            crate::models::CardCondition,
            crate::models::CollectionEntry,

            // Decks
            crate::services::deck_service::CreateDeckRequest,
            crate::services::deck_service::UpdateDeckRequest,
            crate::services::deck_service::AddDeckCardRequest,
            crate::services::deck_service::UpdateDeckCardRequest,
            crate::services::deck_service::SetCommanderRequest,
            crate::services::legality::DeckValidationReport,
            crate::models::DeckFormat,
            crate::models::DeckEntry,
            crate::models::Commander,

            // Stats
            crate::services::stats_service::DashboardStats,
        )
    ),
    tags(
        (name = "Auth", description = "Registration, login, and account management. Local email/password with JWT sessions."),
        (name = "Health", description = "Health check endpoint for monitoring service status."),
        (name = "Cards", description = "Card search and lookup, proxied to the Scryfall API with a shared TTL cache."),
        (name = "Collections", description = "Personal card collections. Entries track printing, condition, language, and foil."),
        (name = "Decks", description = "Deck building endpoints with per-format legality checks (banlists, color identity, copy limits)."),
        (name = "Stats", description = "Aggregated dashboard statistics over the user's collections and decks."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Enter your JWT token"))
                        .build(),
                ),
            );
        }
    }
}
