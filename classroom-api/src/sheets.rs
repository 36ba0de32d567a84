//! The report spreadsheet, read and written through the Google Sheets values API.

use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::client::Client;
use crate::creds::CredentialProvider;
use crate::error::FetchError;
use crate::services::fetch_service::{self, http_client, ApiRequest, Endpoint, FetchService};

/// Values are read as entered rather than as displayed: formulas come back as `=...` text and
/// dates as serial numbers. Writing them back as user input restores the same formulas and numbers.
const VALUE_INPUT_OPTION: &str = "USER_ENTERED";
const VALUE_RENDER_OPTION: &str = "FORMULA";
const DATE_TIME_RENDER_OPTION: &str = "SERIAL_NUMBER";

pub fn spreadsheet_client(
    creds: impl CredentialProvider + 'static,
    base_url: &str,
    spreadsheet_id: SpreadsheetId,
) -> Result<SpreadsheetClient<impl FetchService>> {
    let endpoint = Endpoint::new(base_url, Arc::new(creds))?;
    let client = Client::new(fetch_service::service(http_client()?, endpoint));
    Ok(SpreadsheetClient::new(client, spreadsheet_id))
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpreadsheetId {
    id: String,
}

impl SpreadsheetId {
    pub fn new(id: String) -> Self {
        Self { id }
    }

    pub fn as_str(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for SpreadsheetId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.id.fmt(f)
    }
}

/// A block of cell values in row-major order, addressed in A1 notation. Cells keep their JSON type,
/// so numbers and booleans survive a read followed by a write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueRange {
    #[serde(default)]
    range: String,
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

impl ValueRange {
    pub fn new(range: String, values: Vec<Vec<Value>>) -> Self {
        Self { range, values }
    }

    pub fn range(&self) -> &str {
        &self.range
    }

    pub fn values(&self) -> &[Vec<Value>] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Vec<Value>> {
        self.values
    }
}

pub struct SpreadsheetClient<Service> {
    client: Client<Service>,
    spreadsheet_id: SpreadsheetId,
}

impl<S: FetchService> SpreadsheetClient<S> {
    pub fn new(client: Client<S>, spreadsheet_id: SpreadsheetId) -> Self {
        Self {
            client,
            spreadsheet_id,
        }
    }

    pub fn spreadsheet_id(&self) -> &SpreadsheetId {
        &self.spreadsheet_id
    }

    /// Reads every value in `range`. An entirely empty range has no `values` and reads as no rows.
    #[tracing::instrument(skip(self), fields(spreadsheet = %self.spreadsheet_id), err)]
    pub async fn read_range(&self, range: &str) -> Result<ValueRange, FetchError> {
        let request = ApiRequest::get([
            "v4",
            "spreadsheets",
            self.spreadsheet_id.as_str(),
            "values",
            range,
        ])
        .with_query("majorDimension", "ROWS")
        .with_query("valueRenderOption", VALUE_RENDER_OPTION)
        .with_query("dateTimeRenderOption", DATE_TIME_RENDER_OPTION);

        self.client.get_json(request).await
    }

    /// Overwrites each range with its values in a single request.
    #[tracing::instrument(
        skip(self, data),
        fields(spreadsheet = %self.spreadsheet_id, num_ranges = data.len()),
        err
    )]
    pub async fn batch_update(&self, data: &[ValueRange]) -> Result<(), FetchError> {
        let body = json!({
            "valueInputOption": VALUE_INPUT_OPTION,
            "data": data,
        });
        let request = ApiRequest::post_json(
            [
                "v4",
                "spreadsheets",
                self.spreadsheet_id.as_str(),
                "values:batchUpdate",
            ],
            body,
        );

        let response = self.client.fetch(request).await?;
        debug!(%response, "batch update applied");
        Ok(())
    }
}
