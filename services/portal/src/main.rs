use sea_orm::Database;
use tracing::info;

use lms_core::config::Config;
use lms_core::tracing::init_tracing;
use lms_portal::config::PortalConfig;
use lms_portal::router::build_router;
use lms_portal::state::AppState;
use lms_portal::usecase::login::SeedAdminUseCase;

#[tokio::main]
async fn main() {
    let config = PortalConfig::from_env().expect("invalid portal configuration");
    init_tracing(config.log_format);

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let state = AppState {
        db,
        jwt_secret: config.jwt_secret,
        public_url: config.public_url,
    };

    let seed = SeedAdminUseCase {
        users: state.user_repo(),
    };
    seed.execute(&config.admin_email, &config.admin_password)
        .await
        .expect("failed to seed administrator");

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.portal_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("portal service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
