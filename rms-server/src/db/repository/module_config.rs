//! Module Config Repository

use super::RepoResult;
use shared::models::ModuleFlag;
use sqlx::SqliteConnection;

/// Whether `module` is enabled for the current tenant. A missing row means
/// the module was never configured and counts as disabled.
pub async fn is_enabled(conn: &mut SqliteConnection, module: &str) -> RepoResult<bool> {
    let enabled = sqlx::query_scalar::<_, bool>(
        "SELECT enabled FROM module_config
         WHERE module = ? AND restaurant_id = (SELECT restaurant_id FROM _tenant_scope)",
    )
    .bind(module)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(enabled.unwrap_or(false))
}

/// All configured module flags of the current tenant
pub async fn list(conn: &mut SqliteConnection) -> RepoResult<Vec<ModuleFlag>> {
    let flags = sqlx::query_as::<_, ModuleFlag>(
        "SELECT module, enabled FROM module_config
         WHERE restaurant_id = (SELECT restaurant_id FROM _tenant_scope)
         ORDER BY module",
    )
    .fetch_all(&mut *conn)
    .await?;
    Ok(flags)
}
