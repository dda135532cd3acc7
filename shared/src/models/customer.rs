//! Customer snapshot

use serde::{Deserialize, Serialize};

/// Customer data frozen onto an order or invoice.
///
/// Either an ad-hoc snapshot (name/phone/document) or a weak link to a
/// registered user via `user_id`; the user directory itself is an
/// external collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

impl CustomerSnapshot {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.phone.is_none() && self.document.is_none() && self.user_id.is_none()
    }
}
