//! Tenant branding endpoint

use axum::{Extension, Json};
use candle_shared::TenantConfig;

use crate::tenant::ResolvedTenant;

/// Branding of the tenant serving this host (name, logo, colors)
pub async fn current_tenant(Extension(tenant): Extension<ResolvedTenant>) -> Json<TenantConfig> {
    Json(TenantConfig::clone(&tenant.0))
}
