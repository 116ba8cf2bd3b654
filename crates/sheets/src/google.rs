use crate::api::{CellValue, GridRegion, SheetsApi};
use crate::auth::{ServiceAccountAuth, ServiceAccountKey};
use crate::error::SheetsError;
use async_trait::async_trait;
use configuration::SheetsConfig;
use serde::Serialize;
use serde_json::json;
use std::path::Path;
use std::time::Duration;
use url::Url;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRange<'a> {
    range: &'a str,
    major_dimension: &'static str,
    values: Vec<Vec<CellValue>>,
}

/// A `SheetsApi` backed by the Google Sheets v4 REST API.
///
/// One long-lived HTTP client and token cache, reused for every cycle.
pub struct GoogleSheetsClient {
    client: reqwest::Client,
    auth: ServiceAccountAuth,
    base_url: Url,
    spreadsheet_id: String,
}

impl GoogleSheetsClient {
    /// Loads the service-account key and prepares the client. No request is made
    /// here; credential problems that can be detected offline fail immediately.
    pub fn new(
        credentials_path: &Path,
        spreadsheet_id: &str,
        config: &SheetsConfig,
    ) -> Result<Self, SheetsError> {
        let key = ServiceAccountKey::from_file(credentials_path)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        let auth = ServiceAccountAuth::new(client.clone(), key)?;
        tracing::info!(
            service_account = auth.client_email(),
            spreadsheet_id,
            "Sheets client ready."
        );

        Ok(Self {
            client,
            auth,
            base_url: Url::parse(&config.api_base_url)?,
            spreadsheet_id: spreadsheet_id.to_string(),
        })
    }

    /// `{base}/spreadsheets/{id}/{segments...}` with each segment escaped.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, SheetsError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| SheetsError::InvalidUrl(self.base_url.to_string()))?;
            path.pop_if_empty().push("spreadsheets");
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<(), SheetsError> {
        let token = self.auth.access_token().await?;
        let response = request.bearer_auth(token).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to decode error response".to_string());
            return Err(SheetsError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl SheetsApi for GoogleSheetsClient {
    async fn clear(&self, range: &str) -> Result<(), SheetsError> {
        let clear_segment = format!("{range}:clear");
        let url = self.endpoint(&[self.spreadsheet_id.as_str(), "values", clear_segment.as_str()])?;
        self.send(self.client.post(url).json(&json!({}))).await
    }

    async fn update_values(
        &self,
        range: &str,
        values: Vec<Vec<CellValue>>,
    ) -> Result<(), SheetsError> {
        let url = self.endpoint(&[self.spreadsheet_id.as_str(), "values", range])?;
        let body = ValueRange {
            range,
            major_dimension: "ROWS",
            values,
        };
        let request = self
            .client
            .put(url)
            .query(&[("valueInputOption", "RAW")])
            .json(&body);
        self.send(request).await
    }

    async fn format_bold(&self, region: GridRegion) -> Result<(), SheetsError> {
        let batch_segment = format!("{}:batchUpdate", self.spreadsheet_id);
        let url = self.endpoint(&[batch_segment.as_str()])?;
        let body = json!({
            "requests": [{
                "repeatCell": {
                    "range": region,
                    "cell": { "userEnteredFormat": { "textFormat": { "bold": true } } },
                    "fields": "userEnteredFormat.textFormat.bold"
                }
            }]
        });
        self.send(self.client.post(url).json(&body)).await
    }
}
