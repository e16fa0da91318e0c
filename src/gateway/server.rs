use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    response::{IntoResponse, Json, Response},
    routing::{get, patch, post},
    Router,
};
use tokio::sync::oneshot;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

use crate::gateway::handlers;
use crate::gateway::middleware;
use crate::gateway::upstream::UpstreamClient;

/// Axum application state: the upstream client is the only shared piece,
/// and it is immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<UpstreamClient>,
}

/// Axum server instance
pub struct AxumServer {
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl AxumServer {
    /// Start the gateway server.
    pub async fn start(
        host: String,
        port: u16,
        upstream: Arc<UpstreamClient>,
        enable_request_logging: bool,
    ) -> Result<(Self, tokio::task::JoinHandle<()>), String> {
        let state = AppState { upstream };

        let app = Self::build_router(state, enable_request_logging);

        let addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| format!("Failed to bind address {}: {}", addr, e))?;

        tracing::info!("Gateway listening at http://{}", addr);

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let server_instance = Self {
            shutdown_tx: Some(shutdown_tx),
        };

        let handle = tokio::spawn(async move {
            use hyper::server::conn::http1;
            use hyper_util::rt::TokioIo;
            use hyper_util::service::TowerToHyperService;

            loop {
                tokio::select! {
                    res = listener.accept() => {
                        match res {
                            Ok((stream, _)) => {
                                let io = TokioIo::new(stream);
                                let service = TowerToHyperService::new(app.clone());

                                tokio::task::spawn(async move {
                                    if let Err(err) = http1::Builder::new()
                                        .serve_connection(io, service)
                                        .await
                                    {
                                        debug!("Connection handling ended or error: {:?}", err);
                                    }
                                });
                            }
                            Err(e) => {
                                error!("Failed to accept connection: {:?}", e);
                            }
                        }
                    }
                    _ = &mut shutdown_rx => {
                        tracing::info!("Gateway stopped listening");
                        break;
                    }
                }
            }
        });

        Ok((server_instance, handle))
    }

    fn build_router(state: AppState, enable_request_logging: bool) -> Router {
        let router = Router::new()
            // Auth (the only routes that relay Set-Cookie)
            .route("/api/auth/login", post(handlers::auth::login))
            .route("/api/auth/logout", post(handlers::auth::logout))
            .route("/api/auth/register", post(handlers::auth::register))
            .route("/api/auth/refresh", post(handlers::auth::refresh))
            .route("/api/auth/forgot-password", post(handlers::auth::forgot_password))
            .route("/api/auth/reset-password", post(handlers::auth::reset_password))
            .route("/api/auth/profile", get(handlers::auth::profile))
            // Admin
            .route("/api/admin/businesses", get(handlers::admin::list_businesses))
            .route("/api/admin/businesses/:id", get(handlers::admin::get_business))
            .route(
                "/api/admin/categories",
                get(handlers::admin::list_categories).post(handlers::admin::create_category),
            )
            .route(
                "/api/admin/categories/:id",
                patch(handlers::admin::update_category).delete(handlers::admin::delete_category),
            )
            .route(
                "/api/admin/content",
                get(handlers::admin::get_content).put(handlers::admin::update_content),
            )
            .route("/api/admin/dashboard/stats", get(handlers::admin::dashboard_stats))
            .route(
                "/api/admin/plans",
                get(handlers::admin::list_plans).post(handlers::admin::create_plan),
            )
            .route(
                "/api/admin/plans/:id",
                patch(handlers::admin::update_plan).delete(handlers::admin::delete_plan),
            )
            .route("/api/admin/services", get(handlers::admin::list_services))
            .route("/api/admin/services/:id", axum::routing::delete(handlers::admin::delete_service))
            .route("/api/admin/staff", get(handlers::admin::list_staff))
            .route("/api/admin/subscriptions", get(handlers::admin::list_subscriptions))
            .route("/api/admin/users", get(handlers::admin::list_users))
            .route("/api/admin/users/:id/restrict", patch(handlers::admin::restrict_user))
            .route("/api/admin/users/:id/unrestrict", patch(handlers::admin::unrestrict_user))
            // Customer
            .route(
                "/api/customer/bookings",
                get(handlers::customer::list_bookings).post(handlers::customer::create_booking),
            )
            .route("/api/customer/bookings/:id", get(handlers::customer::get_booking))
            .route(
                "/api/customer/bookings/:id/cancel",
                patch(handlers::customer::cancel_booking),
            )
            .route(
                "/api/customer/cart",
                get(handlers::customer::get_cart).post(handlers::customer::add_to_cart),
            )
            .route(
                "/api/customer/cart/:item_id",
                axum::routing::delete(handlers::customer::remove_from_cart),
            )
            .route("/api/customer/checkout", post(handlers::customer::checkout))
            .route("/api/customer/feedback", post(handlers::customer::submit_feedback))
            .route(
                "/api/customer/profile",
                get(handlers::customer::get_profile).put(handlers::customer::update_profile),
            )
            .route("/api/customer/providers", get(handlers::customer::list_providers))
            .route("/api/customer/providers/:id", get(handlers::customer::get_provider))
            // Provider
            .route(
                "/api/provider/address",
                get(handlers::provider::get_address).put(handlers::provider::update_address),
            )
            .route(
                "/api/provider/bank-accounts",
                get(handlers::provider::list_bank_accounts)
                    .post(handlers::provider::add_bank_account),
            )
            .route(
                "/api/provider/bank-accounts/:id",
                axum::routing::delete(handlers::provider::remove_bank_account),
            )
            .route("/api/provider/bookings", get(handlers::provider::list_bookings))
            .route(
                "/api/provider/bookings/:id/status",
                patch(handlers::provider::update_booking_status),
            )
            .route(
                "/api/provider/cancellations",
                get(handlers::provider::list_cancellations)
                    .patch(handlers::provider::decide_cancellation),
            )
            .route("/api/provider/dashboard", get(handlers::provider::dashboard))
            .route("/api/provider/feedback", get(handlers::provider::list_feedback))
            .route(
                "/api/provider/services",
                get(handlers::provider::list_services).post(handlers::provider::create_service),
            )
            .route(
                "/api/provider/services/:id",
                patch(handlers::provider::update_service)
                    .delete(handlers::provider::delete_service),
            )
            .route(
                "/api/provider/slots",
                get(handlers::provider::get_slots).put(handlers::provider::update_slots),
            )
            .route(
                "/api/provider/staff",
                get(handlers::provider::list_staff).post(handlers::provider::add_staff),
            )
            .route("/api/provider/staff/leave", get(handlers::provider::list_staff_leave))
            .route(
                "/api/provider/staff/:id",
                axum::routing::delete(handlers::provider::remove_staff),
            )
            .route(
                "/api/provider/subscription",
                get(handlers::provider::get_subscription).post(handlers::provider::subscribe),
            )
            .route(
                "/api/provider/teams",
                get(handlers::provider::list_teams).post(handlers::provider::create_team),
            )
            .route("/api/provider/teams/:id", patch(handlers::provider::update_team))
            // Staff
            .route(
                "/api/staff/applications",
                get(handlers::staff::list_applications).post(handlers::staff::apply),
            )
            .route(
                "/api/staff/availability",
                get(handlers::staff::get_availability).put(handlers::staff::update_availability),
            )
            .route(
                "/api/staff/bank-accounts",
                get(handlers::staff::list_bank_accounts).post(handlers::staff::add_bank_account),
            )
            .route("/api/staff/bookings", get(handlers::staff::list_bookings))
            .route(
                "/api/staff/bookings/:id/status",
                patch(handlers::staff::update_booking_status),
            )
            .route("/api/staff/dashboard", get(handlers::staff::dashboard))
            .route("/api/staff/earnings", get(handlers::staff::list_earnings))
            .route(
                "/api/staff/leave",
                get(handlers::staff::list_leave).post(handlers::staff::request_leave),
            )
            .route("/api/staff/payments", get(handlers::staff::list_payments))
            .route(
                "/api/staff/profile",
                get(handlers::staff::get_profile).put(handlers::staff::update_profile),
            )
            .route("/healthz", get(health_check_handler))
            .layer(DefaultBodyLimit::max(2 * 1024 * 1024))
            .layer(middleware::cors_layer());

        // Per-request trace logging is opt-in via config
        let router = if enable_request_logging {
            router.layer(TraceLayer::new_for_http())
        } else {
            router
        };

        router.with_state(state)
    }

    /// Stop the server
    pub fn stop(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Health check handler; answered locally, never proxied.
async fn health_check_handler() -> Response {
    Json(serde_json::json!({
        "status": "ok"
    }))
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::config::GatewayConfig;

    fn test_state() -> AppState {
        let config = GatewayConfig::default();
        AppState {
            upstream: Arc::new(UpstreamClient::new(&config).unwrap()),
        }
    }

    // Route registration conflicts panic inside Router::route, so building
    // the full table in both logging modes is the regression check.
    #[test]
    fn router_builds_with_request_logging_enabled() {
        let _ = AxumServer::build_router(test_state(), true);
    }

    #[test]
    fn router_builds_with_request_logging_disabled() {
        let _ = AxumServer::build_router(test_state(), false);
    }
}
