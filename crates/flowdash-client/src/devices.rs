//! Device registry endpoints

use crate::client::{validated, ApiClient, MessageResponse};
use flowdash_core::types::{Device, DeviceCreate, DeviceReading, DeviceStats};
use flowdash_core::Result;

impl ApiClient {
    /// List every registered device with its latest reading
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn list_devices(&self) -> Result<Vec<Device>> {
        self.get_json("/devices/", &[]).await
    }

    /// Fetch one device by client id
    ///
    /// # Errors
    ///
    /// Returns [`flowdash_core::Error::NotFound`] for an unknown client id.
    pub async fn get_device(&self, client_id: &str) -> Result<Device> {
        self.get_json(&format!("/devices/{}", urlencoding::encode(client_id)), &[])
            .await
    }

    /// Register a new device
    ///
    /// # Errors
    ///
    /// Returns [`flowdash_core::Error::Validation`] if the payload fails
    /// local validation, before any request is made.
    pub async fn create_device(&self, payload: &DeviceCreate) -> Result<Device> {
        validated(payload)?;
        self.post_json("/devices/", payload).await
    }

    /// Replace a device's registration data
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or the request fails.
    pub async fn update_device(&self, client_id: &str, payload: &DeviceCreate) -> Result<Device> {
        validated(payload)?;
        self.put_json(
            &format!("/devices/{}", urlencoding::encode(client_id)),
            payload,
        )
        .await
    }

    /// Change only a device's display name
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn rename_device(&self, client_id: &str, device_name: &str) -> Result<Device> {
        let query = vec![format!(
            "device_name={}",
            urlencoding::encode(device_name)
        )];
        self.patch_query(
            &format!("/devices/{}/name", urlencoding::encode(client_id)),
            &query,
        )
        .await
    }

    /// Delete a device and all of its readings
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn delete_device(&self, client_id: &str) -> Result<MessageResponse> {
        self.delete_json(&format!("/devices/{}", urlencoding::encode(client_id)))
            .await
    }

    /// Fleet-level device counters
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn device_stats(&self) -> Result<DeviceStats> {
        self.get_json("/devices/stats", &[]).await
    }

    /// Recent readings for one device, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn device_readings(
        &self,
        client_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<DeviceReading>> {
        let mut query = Vec::new();
        if let Some(limit) = limit {
            query.push(format!("limit={limit}"));
        }
        self.get_json(
            &format!("/devices/{}/readings", urlencoding::encode(client_id)),
            &query,
        )
        .await
    }
}
