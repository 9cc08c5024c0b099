//! Home Assistant REST API sink.
//!
//! Sensor states go to `/api/states/sensor.<name>`, notifications to
//! `/api/services/notify/<service>`. Every request carries the long-lived
//! access token and is bounded by the configured timeout.

use serde_json::{json, Value};

use super::sink::{Attributes, NotificationMetadata, Sink};
use crate::core::config::SinkConfig;
use crate::error::{HubError, Result};

const SOURCE: &str = "thermal-hub";

#[derive(Debug, Clone)]
pub struct HomeAssistantSink {
    base_url: String,
    token: String,
    notify_service: String,
    client: reqwest::Client,
}

impl HomeAssistantSink {
    pub fn new(config: &SinkConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("thermal-hub/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            notify_service: config.notify_service.clone(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post(&self, path: &str, body: &Value) -> Result<reqwest::StatusCode> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(HubError::sink(format!("{} returned {}: {}", path, status, text)));
        }

        Ok(status)
    }
}

#[async_trait::async_trait]
impl Sink for HomeAssistantSink {
    async fn update_sensor(
        &self,
        name: &str,
        value: &Value,
        attributes: &Attributes,
    ) -> Result<()> {
        let body = sensor_body(value, attributes);
        self.post(&format!("/api/states/sensor.{}", name), &body)
            .await?;
        log::debug!("Updated sensor {}: {}", name, body["state"]);
        Ok(())
    }

    async fn notify(
        &self,
        title: &str,
        message: &str,
        metadata: &NotificationMetadata,
    ) -> Result<()> {
        let mut data = serde_json::to_value(metadata)?;
        if let Some(object) = data.as_object_mut() {
            object.insert("source".to_string(), json!(SOURCE));
        }

        let body = json!({
            "title": title,
            "message": message,
            "data": data,
        });

        self.post(
            &format!("/api/services/notify/{}", self.notify_service),
            &body,
        )
        .await?;
        log::debug!("Notification delivered: {}", title);
        Ok(())
    }

    async fn test_connection(&self) -> bool {
        let result = self
            .client
            .get(format!("{}/api/", self.base_url))
            .bearer_auth(&self.token)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                log::debug!("Home Assistant connection test successful");
                true
            }
            Ok(response) => {
                log::error!("Home Assistant connection test failed: {}", response.status());
                false
            }
            Err(e) => {
                log::error!("Home Assistant connection test error: {}", e);
                false
            }
        }
    }

    fn name(&self) -> &str {
        "homeassistant"
    }
}

/// Sensor payload: the state is sent as a string, as the states API expects.
fn sensor_body(value: &Value, attributes: &Attributes) -> Value {
    let state = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    let mut attributes = attributes.clone();
    attributes.insert(
        "last_updated".to_string(),
        json!(chrono::Local::now().to_rfc3339()),
    );
    attributes.insert("source".to_string(), json!(SOURCE));

    json!({
        "state": state,
        "attributes": attributes,
    })
}
