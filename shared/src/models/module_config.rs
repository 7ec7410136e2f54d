//! Module Flag Model

use serde::{Deserialize, Serialize};

/// Per-tenant enable/disable switch for an optional module.
///
/// Read by the module gate, written only through the settings surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ModuleFlag {
    pub module: String,
    pub enabled: bool,
}
