use super::{IsochroneResponse, Query};
use crate::{conf::Conf, Error, Result};
use serde::Serialize;
use tracing::{info, warn};
use url::Url;

const ISOCHRONES_PATH: &str = "v2/isochrones/driving-car";

#[derive(Serialize, Debug, PartialEq)]
pub struct IsochroneRequest {
    /// `[lon, lat]` pairs
    pub locations: Vec<[f64; 2]>,
    /// Seconds
    pub range: Vec<u32>,
}

impl From<&Query> for IsochroneRequest {
    fn from(query: &Query) -> Self {
        IsochroneRequest {
            locations: vec![[query.lon, query.lat]],
            range: query.range_seconds(),
        }
    }
}

/// OpenRouteService isochrones client.
#[derive(Clone)]
pub struct OrsClient {
    client: reqwest::Client,
    endpoint: Url,
    api_key: String,
}

impl OrsClient {
    pub fn new(conf: &Conf) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(conf.ors_timeout)
            .build()?;
        let mut base = conf.ors_api_url.clone();
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        Ok(OrsClient {
            client,
            endpoint: base.join(ISOCHRONES_PATH)?,
            api_key: conf.ors_api_key.clone(),
        })
    }

    #[cfg(test)]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub async fn fetch(&self, query: &Query) -> Result<IsochroneResponse> {
        let request = IsochroneRequest::from(query);
        info!(
            lat = query.lat,
            lon = query.lon,
            range = ?request.range,
            "Requesting isochrones",
        );
        let response = self
            .client
            .post(self.endpoint.clone())
            .header("Authorization", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        info!(http_status_code = status.as_u16(), "Got routing service response");
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = upstream_message(&body);
            warn!(
                http_status_code = status.as_u16(),
                upstream_message = message.as_str(),
                "Routing service rejected the request",
            );
            return Err(Error::Http {
                status: status.as_u16(),
                message,
            });
        }
        let response: IsochroneResponse = response.json().await?;
        info!(features = response.features.len(), "Fetched isochrones");
        Ok(response)
    }
}

/// Routing service errors look like `{"error": {"code": 3002, "message": "..."}}`
/// or `{"error": "..."}`, fall back to the raw body otherwise.
fn upstream_message(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.trim().to_string();
    };
    let error = &json["error"];
    if let Some(message) = error["message"].as_str() {
        return message.to_string();
    }
    if let Some(message) = error.as_str() {
        return message.to_string();
    }
    body.trim().to_string()
}
