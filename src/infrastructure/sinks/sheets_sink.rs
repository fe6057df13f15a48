//! Google Sheets sink
//!
//! Authenticates with a service-account key (RS256 JWT bearer grant) and
//! writes the header plus every row with a single `values.update` call,
//! starting at the configured range.

#![allow(clippy::uninlined_format_args)]

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use super::{ProductSink, SinkError, SinkReport};
use crate::domain::product::ProductTable;
use crate::infrastructure::config::SheetsConfig;

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const TOKEN_LIFETIME_SECONDS: i64 = 3600;

/// The subset of a service-account key file the sink needs
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    pub token_uri: String,
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> Result<Self, SinkError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SinkError::Credentials(format!("cannot read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&content)
            .map_err(|e| SinkError::Credentials(format!("malformed key file {}: {}", path.display(), e)))
    }
}

/// JWT claims for the OAuth2 bearer grant
#[derive(Debug, Serialize)]
struct GrantClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

pub struct SheetsSink {
    client: Client,
    spreadsheet_id: String,
    range: String,
    credentials_path: PathBuf,
}

impl SheetsSink {
    pub fn new(
        spreadsheet_id: impl Into<String>,
        range: impl Into<String>,
        credentials_path: impl Into<PathBuf>,
    ) -> Result<Self, SinkError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            spreadsheet_id: spreadsheet_id.into(),
            range: range.into(),
            credentials_path: credentials_path.into(),
        })
    }

    /// `None` when no spreadsheet is configured
    pub fn from_config(config: &SheetsConfig) -> Result<Option<Self>, SinkError> {
        match config.spreadsheet_id.as_deref().filter(|id| !id.trim().is_empty()) {
            Some(id) => Self::new(id, &config.range, &config.credentials_path).map(Some),
            None => Ok(None),
        }
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    /// `values.update` endpoint for the configured range
    pub fn values_url(&self) -> Result<Url, SinkError> {
        let mut url = Url::parse(SHEETS_API_BASE).map_err(|e| SinkError::Other(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| SinkError::Other("sheets API base cannot take path segments".to_string()))?
            .extend([self.spreadsheet_id.as_str(), "values", self.range.as_str()]);
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");
        Ok(url)
    }

    async fn access_token(&self, key: &ServiceAccountKey) -> Result<String, SinkError> {
        let assertion = sign_grant_assertion(key, chrono::Utc::now().timestamp())?;
        let body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", JWT_BEARER_GRANT)
            .append_pair("assertion", &assertion)
            .finish();

        debug!("Requesting access token from {}", key.token_uri);
        let response = self
            .client
            .post(&key.token_uri)
            .header(reqwest::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(SinkError::Auth(format!("token endpoint returned {}: {}", status, detail)));
        }
        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }
}

/// Sign the RS256 assertion exchanged for an access token
pub fn sign_grant_assertion(key: &ServiceAccountKey, issued_at: i64) -> Result<String, SinkError> {
    let claims = GrantClaims {
        iss: &key.client_email,
        scope: SPREADSHEETS_SCOPE,
        aud: &key.token_uri,
        iat: issued_at,
        exp: issued_at + TOKEN_LIFETIME_SECONDS,
    };
    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| SinkError::Auth(format!("invalid private key: {}", e)))?;
    encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)
        .map_err(|e| SinkError::Auth(format!("failed to sign assertion: {}", e)))
}

/// Header row followed by one row per product; numbers stay numeric
pub fn build_values(table: &ProductTable) -> Vec<Vec<Value>> {
    let mut values = Vec::with_capacity(table.len() + 1);
    values.push(ProductTable::header().iter().map(|h| json!(h)).collect());
    values.extend(table.iter().map(|row| {
        vec![
            json!(row.title),
            json!(row.price),
            json!(row.rating),
            json!(row.colors),
            json!(row.size),
            json!(row.gender),
            json!(row.timestamp),
        ]
    }));
    values
}

#[async_trait]
impl ProductSink for SheetsSink {
    fn name(&self) -> &str {
        "google-sheets"
    }

    async fn persist(&self, table: &ProductTable) -> Result<SinkReport, SinkError> {
        let destination = format!("{}/{}", self.spreadsheet_id, self.range);
        if table.is_empty() {
            info!("No rows to upload to Google Sheets, skipping");
            return Ok(SinkReport {
                sink: self.name().to_string(),
                rows_written: 0,
                destination,
            });
        }

        let key = ServiceAccountKey::from_file(&self.credentials_path)?;
        let token = self.access_token(&key).await?;

        let response = self
            .client
            .put(self.values_url()?)
            .bearer_auth(token)
            .json(&json!({ "values": build_values(table) }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(SinkError::Other(format!("Sheets API returned {}: {}", status, detail)));
        }

        info!("📊 Uploaded {} products to Google Sheets {}", table.len(), destination);
        Ok(SinkReport {
            sink: self.name().to_string(),
            rows_written: table.len(),
            destination,
        })
    }
}
