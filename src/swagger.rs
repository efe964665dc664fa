use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::UserRole;
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::login,
        handlers::auth::guest_login,
        handlers::draw::spin,
        handlers::draw::reset,
        handlers::draw::clear_all,
        handlers::draw::clear_participants,
        handlers::draw::clear_prizes,
        handlers::draw::get_board,
        handlers::draw::get_results,
        handlers::draw::get_history,
        handlers::participant::list_eligible,
        handlers::participant::list_all,
        handlers::participant::create,
        handlers::participant::create_bulk,
        handlers::participant::delete,
        handlers::prize::list,
        handlers::prize::create,
        handlers::prize::update,
        handlers::prize::delete,
    ),
    components(
        schemas(
            UserRole,
            LoginRequest,
            AuthResponse,
            SpinRequest,
            SpinWinner,
            SpinResponse,
            ResetSummary,
            ClearSummary,
            HistoryEntryResponse,
            HistoryQuery,
            HistoryPageResponse,
            ResultsResponse,
            BoardParticipant,
            BoardPrize,
            SpinBoardResponse,
            ParticipantResponse,
            ParticipantDetailResponse,
            CreateParticipantRequest,
            BulkParticipantsRequest,
            BulkParticipantsResponse,
            CreatedResponse,
            PrizeResponse,
            PrizeQuery,
            CreatePrizeRequest,
            UpdatePrizeRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Authentication API"),
        (name = "draw", description = "Draw engine API"),
        (name = "participant", description = "Participant registry API"),
        (name = "prize", description = "Prize catalog API"),
    ),
    info(
        title = "Lucky Draw Backend API",
        version = "1.0.0",
        description = "Lucky Draw Backend REST API documentation"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_draw_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/draw/spin"));
        assert!(doc.paths.paths.contains_key("/participants/bulk"));
        assert!(doc.paths.paths.contains_key("/prizes/{id}"));
    }
}
