//! Request and response bodies
//!
//! Field names follow the public JSON contract, which is in Spanish.

pub mod auth;
pub mod party;
pub mod policy;
pub mod billing;
pub mod claims;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `{mensaje}` confirmation body
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub mensaje: String,
}

impl MessageResponse {
    pub fn new(mensaje: impl Into<String>) -> Self {
        Self { mensaje: mensaje.into() }
    }
}

/// `?poliza_id=` filter
#[derive(Debug, Default, Deserialize)]
pub struct PolicyFilter {
    pub poliza_id: Option<Uuid>,
}
