//! Airtable REST tables.

use std::fmt;

use log::debug;
use reqwest::Url;
use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::AirtableConfig;
use crate::error::StoreError;
use crate::schema::FieldMap;
use crate::store::{FieldEquals, StoredRow, Table};

/// Blocking Airtable API client, shared by all tables of a run
#[derive(Clone)]
pub struct AirtableClient {
    http: Client,
    api_url: String,
    access_token: String,
}

impl fmt::Debug for AirtableClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AirtableClient")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

impl AirtableClient {
    /// Create a client from the store configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &AirtableConfig) -> Result<Self, StoreError> {
        let http = Client::builder()
            .user_agent(concat!("tender-sync/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            access_token: config.access_token.clone(),
        })
    }

    /// Handle on one table of a base
    #[must_use]
    pub fn table(&self, base_id: &str, table_id: &str) -> AirtableTable<'_> {
        AirtableTable {
            client: self,
            base_id: base_id.to_string(),
            table_id: table_id.to_string(),
        }
    }

    fn url(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url =
            Url::parse(&self.api_url).map_err(|e| StoreError::InvalidUrl(format!("{}: {e}", self.api_url)))?;
        url.path_segments_mut()
            .map_err(|()| StoreError::InvalidUrl(self.api_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, StoreError> {
        let response = request.bearer_auth(&self.access_token).send()?;
        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            return Err(StoreError::Api {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// One Airtable table
#[derive(Debug, Clone)]
pub struct AirtableTable<'a> {
    client: &'a AirtableClient,
    base_id: String,
    table_id: String,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    records: Vec<StoredRow>,
    offset: Option<String>,
}

#[derive(Debug, Serialize)]
struct WriteRequest<'a> {
    fields: &'a FieldMap,
    typecast: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiErrorBody {
    Detailed { error: ApiErrorDetail },
    Plain { error: String },
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(rename = "type")]
    kind: Option<String>,
    message: Option<String>,
}

/// Readable message from an error response body
fn api_error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(ApiErrorBody::Plain { error }) => error,
        Ok(ApiErrorBody::Detailed { error }) => match (error.kind, error.message) {
            (Some(kind), Some(message)) => format!("{kind}: {message}"),
            (Some(text), None) | (None, Some(text)) => text,
            (None, None) => body.to_string(),
        },
        Err(_) => body.chars().take(512).collect(),
    }
}

impl AirtableTable<'_> {
    fn table_url(&self) -> Result<Url, StoreError> {
        self.client.url(&[&self.base_id, &self.table_id])
    }

    fn row_url(&self, row_id: &str) -> Result<Url, StoreError> {
        self.client.url(&[&self.base_id, &self.table_id, row_id])
    }

    fn write(&self, request: RequestBuilder, fields: &FieldMap) -> Result<StoredRow, StoreError> {
        self.client.execute(request.json(&WriteRequest {
            fields,
            typecast: true,
        }))
    }
}

impl Table for AirtableTable<'_> {
    fn name(&self) -> &str {
        &self.table_id
    }

    fn query(&self, filter: &FieldEquals) -> Result<Vec<StoredRow>, StoreError> {
        let url = self.table_url()?;
        let formula = filter.to_formula();
        let mut rows = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let mut request = self
                .client
                .http
                .get(url.clone())
                .query(&[("filterByFormula", formula.as_str())]);
            if let Some(offset) = &offset {
                request = request.query(&[("offset", offset.as_str())]);
            }

            let page: ListResponse = self.client.execute(request)?;
            rows.extend(page.records);
            match page.offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        debug!("{formula} matched {} rows in {}", rows.len(), self.table_id);
        Ok(rows)
    }

    fn create(&self, fields: &FieldMap) -> Result<StoredRow, StoreError> {
        let request = self.client.http.post(self.table_url()?);
        self.write(request, fields)
    }

    fn update(&self, row_id: &str, fields: &FieldMap) -> Result<StoredRow, StoreError> {
        let request = self.client.http.patch(self.row_url(row_id)?);
        self.write(request, fields)
    }
}
