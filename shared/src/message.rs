//! Change notification payloads
//!
//! Every committed mutation publishes a [`ChangeNotice`] on the server's
//! broadcast channel; terminals subscribe via the SSE feed instead of
//! polling. Versions increase monotonically per resource so a client can
//! discard stale payloads after a reconnect.

use serde::{Deserialize, Serialize};

/// A resource change, pushed to all connected terminals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeNotice {
    /// Resource type ("order", "table", "invoice", "cuadre", ...)
    pub resource: String,
    /// Per-resource monotonically increasing version
    pub version: u64,
    /// Change type ("created", "updated", "deleted", ...)
    pub action: String,
    /// Resource ID
    pub id: String,
    /// Resource data (None for deletions)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}
