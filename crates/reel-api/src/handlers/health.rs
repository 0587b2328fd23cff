//! `GET /health` — the one unauthenticated route.

use crate::response::Envelope;

pub async fn handler() -> Envelope<serde_json::Value> {
  Envelope::ok(serde_json::json!({}), "service healthy")
}
