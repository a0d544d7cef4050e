//! Route definitions for the Materials Inventory Platform

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public apart from /me)
        .nest("/auth", auth_routes(state.clone()))
        // Protected routes - user administration
        .nest("/users", user_routes(state.clone()))
        // Protected routes - supplier management
        .nest("/suppliers", supplier_routes(state.clone()))
        // Protected routes - warehouse management
        .nest("/warehouses", warehouse_routes(state.clone()))
        // Protected routes - material management
        .nest("/materials", material_routes(state.clone()))
        // Protected routes - stock ledger
        .nest("/stock", stock_routes(state.clone()))
        // Protected routes - reports
        .nest("/reports", report_routes(state))
}

/// Authentication routes
fn auth_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/me", get(handlers::me))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/refresh", post(handlers::refresh))
        .merge(protected)
}

/// User administration routes (protected)
fn user_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_users))
        .route("/:user_id/role", put(handlers::update_user_role))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Supplier management routes (protected)
fn supplier_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_suppliers).post(handlers::create_supplier))
        .route(
            "/:supplier_id",
            get(handlers::get_supplier)
                .put(handlers::update_supplier)
                .delete(handlers::delete_supplier),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Warehouse management routes (protected)
fn warehouse_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_warehouses).post(handlers::create_warehouse))
        .route(
            "/:warehouse_id",
            get(handlers::get_warehouse)
                .put(handlers::update_warehouse)
                .delete(handlers::delete_warehouse),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Material management routes (protected)
fn material_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_materials).post(handlers::create_material))
        .route(
            "/:material_id",
            get(handlers::get_material)
                .put(handlers::update_material)
                .delete(handlers::delete_material),
        )
        .route("/:material_id/history", get(handlers::get_material_history))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Stock ledger routes (protected)
fn stock_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/adjustments", post(handlers::adjust_stock))
        .route("/history", get(handlers::list_stock_history))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Reporting routes (protected)
fn report_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/reorder", get(handlers::get_reorder_report))
        .route("/dashboard", get(handlers::get_dashboard))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
