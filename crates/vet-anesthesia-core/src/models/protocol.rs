//! Anesthetic protocol models.

use serde::{Deserialize, Serialize};

use super::Drug;

/// A named, ordered set of drugs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Protocol {
    /// Local UUID
    pub protocol_id: String,
    /// Protocol name (e.g., "Canine premedication")
    pub name: String,
    /// Free-text description
    pub description: Option<String>,
    /// Creation timestamp
    pub created_at: String,
}

impl Protocol {
    pub fn new(name: String, description: Option<String>) -> Self {
        Self {
            protocol_id: uuid::Uuid::new_v4().to_string(),
            name,
            description,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Link between a protocol and one of its drugs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProtocolDrug {
    pub protocol_id: String,
    pub drug_id: String,
    /// 1-based position within the protocol
    pub position: u32,
}

/// A drug resolved from a protocol, with its position.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProtocolStep {
    pub position: u32,
    pub drug: Drug,
}
