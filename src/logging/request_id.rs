//! Correlation IDs for relayed calls

use uuid::Uuid;

/// Fresh UUID v4 used as the `request_id` field on relay log lines.
pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}
