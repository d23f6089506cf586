//! # Web Server
//!
//! A thin REST surface over the scheduling services. Every collection gets the
//! same five routes, instantiated per record type; handlers only bind the
//! request, call one service operation and map its error to a status code.

use axum::{
    Router,
    routing::{get, post},
};
use configuration::ServerSettings;
use core_types::{Department, Schedule, Shift, ShiftTemplate, ShiftType, Team, TeamMember, User};
use database::Store;
use scheduling::{Resource, Scheduling};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer, ExposeHeaders},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;

pub use error::AppError;

/// The shared application state that all handlers can access.
pub struct AppState<S> {
    pub service: Scheduling<S>,
}

type AppRouter<S> = Router<Arc<AppState<S>>>;

/// Mounts list/create on `/api/{name}` and get/update/delete on `/api/{name}/:id`.
fn collection<S: Store, R: Resource>(router: AppRouter<S>, name: &str) -> AppRouter<S> {
    router
        .route(
            &format!("/api/{name}"),
            get(handlers::list::<S, R>).post(handlers::create::<S, R>),
        )
        .route(
            &format!("/api/{name}/:id"),
            get(handlers::fetch::<S, R>)
                .patch(handlers::update::<S, R>)
                .delete(handlers::remove::<S, R>),
        )
}

/// Builds the full application router.
///
/// Requests running longer than `timeout` are answered with 408. A write cut
/// off before its commit is rolled back with the dropped transaction.
pub fn router<S: Store>(service: Scheduling<S>, timeout: Duration) -> Router {
    let state = Arc::new(AppState { service });
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any())
        .expose_headers(ExposeHeaders::any());

    // --- DEFINE THE APPLICATION ROUTES ---
    let mut app: AppRouter<S> = Router::new()
        .route("/api/health", get(handlers::health::<S>))
        .route("/api/admin/status", get(handlers::status::<S>))
        .route("/api/admin/seed", post(handlers::seed::<S>))
        .route("/api/admin/reset", post(handlers::reset::<S>))
        .route("/api/admin/reset-and-seed", post(handlers::reset_and_seed::<S>));

    app = collection::<S, User>(app, "users");
    app = collection::<S, Team>(app, "teams");
    app = collection::<S, Department>(app, "departments");
    app = collection::<S, ShiftType>(app, "shift-types");
    app = collection::<S, ShiftTemplate>(app, "shift-templates");
    app = collection::<S, Schedule>(app, "schedules");
    app = collection::<S, Shift>(app, "shifts");
    app = collection::<S, TeamMember>(app, "team-members");

    app.route("/api/schedules/:id/shifts", get(handlers::schedule_shifts::<S>))
        .route("/api/shift-templates/:id/week", get(handlers::template_week::<S>))
        .route("/api/teams/:id/members", get(handlers::team_members::<S>))
        .fallback(handlers::fallback)
        .with_state(state)
        .layer(cors)
        .layer(TimeoutLayer::new(timeout))
        // This middleware will automatically log information about every incoming request.
        .layer(TraceLayer::new_for_http())
}

/// Binds the configured address and serves until Ctrl-C.
pub async fn run_server<S: Store>(
    settings: &ServerSettings,
    service: Scheduling<S>,
) -> anyhow::Result<()> {
    let addr = settings.addr()?;
    let app = router(service, settings.request_timeout());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Web server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Web server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for the shutdown signal.");
    }
}
