//! Staff Repository
//!
//! 员工是系统级数据：登录发生在租户上下文建立之前，所以这里直接走池，
//! 不经过租户网关。用户名全局唯一，查到的行自带 restaurant_id。

use super::RepoResult;
use shared::models::Staff;
use sqlx::SqlitePool;

/// Look up a staff account by its globally unique username
pub async fn find_by_username(pool: &SqlitePool, username: &str) -> RepoResult<Option<Staff>> {
    let staff = sqlx::query_as::<_, Staff>(
        "SELECT id, restaurant_id, username, password_hash, display_name, role
         FROM staff
         WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(staff)
}
