use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::models::*;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::settings::get_settings,
        handlers::settings::save_settings,
        handlers::upload::upload_file,
    ),
    components(
        schemas(
            SettingsEntry,
            UploadResponse,
            MediaKind,
            BannerItem,
            BannerSettings,
            BannerItemInput,
            Reservation,
            ReservationStatus,
            NewReservation,
            Member,
            MemberStatus,
            NewMember,
            Review,
            ReviewStatus,
            NewReview,
            Portfolio,
            PortfolioForm,
            PaymentSettings,
            PaymentMethods,
            PaymentMethod,
            Program,
            ProgramInput,
            TaxSettings,
            NotificationSettings,
            BaseStats,
            DashboardStats,
        )
    ),
    tags(
        (name = "settings", description = "Settings document API"),
        (name = "upload", description = "Media upload API"),
    ),
    info(
        title = "Infinity Gym Backend API",
        version = "1.0.0",
        description = "Settings document and media upload endpoints"
    ),
    servers(
        (url = "/api", description = "Local server")
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
    fn test_openapi_lists_endpoints() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/settings"));
        assert!(doc.paths.paths.contains_key("/upload"));
    }
}
