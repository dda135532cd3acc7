//! Small utilities shared across crates

/// Current time as epoch milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a new v4 UUID string (order/item/invoice ids)
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
