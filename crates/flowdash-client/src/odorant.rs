//! Odorant drum endpoints

use crate::client::{validated, ApiClient, MessageResponse};
use flowdash_core::types::{DrumCreate, DrumRefill, OdorantDrum, RefillRecord};
use flowdash_core::Result;
use serde::{Deserialize, Serialize};

/// Response of the drum creation endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DrumCreated {
    /// Outcome description
    pub message: String,

    /// Identifier of the new drum
    pub drum_id: i64,
}

/// Response of the refill endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RefillOutcome {
    /// Outcome description
    pub message: String,

    /// Level before the refill (liters)
    pub previous_level: f64,

    /// Amount added (liters)
    pub refilled_amount: f64,

    /// Level after the refill, clamped at drum capacity (liters)
    pub new_level: f64,
}

impl ApiClient {
    /// Active odorant drums with derived consumption figures, lowest level
    /// first
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn odorant_drums(&self, section_id: Option<i64>) -> Result<Vec<OdorantDrum>> {
        let mut params = Vec::new();
        if let Some(section_id) = section_id {
            params.push(format!("section_id={section_id}"));
        }
        self.get_json("/odorant/drums", &params).await
    }

    /// Install a new drum; any previous active drum for the device is
    /// retired by the backend.
    ///
    /// # Errors
    ///
    /// Returns [`flowdash_core::Error::Validation`] if the payload fails
    /// local validation.
    pub async fn create_drum(&self, payload: &DrumCreate) -> Result<DrumCreated> {
        validated(payload)?;
        self.post_json("/odorant/drums", payload).await
    }

    /// Refill a drum; the backend clamps the new level at drum capacity
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or the request fails.
    pub async fn refill_drum(&self, payload: &DrumRefill) -> Result<RefillOutcome> {
        validated(payload)?;
        self.post_json("/odorant/drums/refill", payload).await
    }

    /// Refill history of one drum, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn refill_history(&self, drum_id: i64) -> Result<Vec<RefillRecord>> {
        self.get_json(&format!("/odorant/drums/{drum_id}/history"), &[])
            .await
    }

    /// Recompute consumption for every active drum from the latest flow data
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn update_consumption(&self) -> Result<MessageResponse> {
        self.post_empty("/odorant/drums/update-consumption").await
    }
}
