use std::env;

use anyhow::{Context, Result};
use classroom_api::classroom::Classroom;
use classroom_api::classroom_selector::ClassroomSelector;
use classroom_api::client::{client, Client};
use classroom_api::creds::BearerToken;
use classroom_api::services::fetch_service::FetchService;
use classroom_api::sheets::{spreadsheet_client, SpreadsheetClient, SpreadsheetId};
use classroom_api::{GITHUB_API_URL, SHEETS_API_URL};
use dotenvy::dotenv;
use tracing::debug;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, registry, EnvFilter};

pub const DEFAULT_SHEET_RANGE: &str = "Sheet1";

/// Settings read from the environment, after loading any `.env` file.
#[derive(Debug, Clone)]
pub struct Config {
    github_token: BearerToken,
    github_api_url: String,
    sheets_token: Option<BearerToken>,
    sheets_api_url: String,
    spreadsheet_id: Option<SpreadsheetId>,
    sheet_range: String,
    classroom: Option<ClassroomSelector>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenv() {
            debug!(path = %path.display(), "loaded environment file");
        }

        Ok(Self {
            github_token: BearerToken::from_env("GH_PAT").context("`GH_PAT` must be set")?,
            github_api_url: var_or("GITHUB_API_URL", GITHUB_API_URL),
            sheets_token: BearerToken::from_env("SHEETS_TOKEN").ok(),
            sheets_api_url: var_or("SHEETS_API_URL", SHEETS_API_URL),
            spreadsheet_id: env::var("SPREADSHEET_ID").ok().map(SpreadsheetId::new),
            sheet_range: var_or("SHEET_RANGE", DEFAULT_SHEET_RANGE),
            classroom: env::var("CLASSROOM").ok().map(ClassroomSelector::new),
        })
    }

    pub fn sheet_range(&self) -> &str {
        &self.sheet_range
    }

    pub fn classroom(&self) -> Option<&ClassroomSelector> {
        self.classroom.as_ref()
    }

    pub fn classroom_client(&self) -> Result<Client<impl FetchService>> {
        client(self.github_token.clone(), &self.github_api_url)
    }

    pub fn spreadsheet_client(&self) -> Result<SpreadsheetClient<impl FetchService>> {
        let token = self
            .sheets_token
            .clone()
            .context("`SHEETS_TOKEN` must be set to use the report sheet")?;
        let spreadsheet_id = self
            .spreadsheet_id
            .clone()
            .context("`SPREADSHEET_ID` must be set to use the report sheet")?;
        spreadsheet_client(token, &self.sheets_api_url, spreadsheet_id)
    }
}

fn var_or(var: &str, default: &str) -> String {
    env::var(var).unwrap_or_else(|_| default.to_owned())
}

/// Resolves `selector` to a classroom. A selector that reads as an id is looked up directly, so
/// classrooms beyond the first page of the listing can be selected. Otherwise, or if no classroom
/// has that id, the listed classrooms are matched by id and then by name.
pub async fn select_classroom(
    classroom: &Client<impl FetchService>,
    selector: &ClassroomSelector,
) -> Result<Classroom> {
    if let Some(id) = selector.as_id() {
        match classroom.get_classroom(id).await {
            Ok(found) => return Ok(found),
            Err(error) if error.upstream().is_some_and(|upstream| upstream.code() == 404) => {
                debug!(%id, "no classroom with this id; matching by name");
            }
            Err(error) => return Err(error).context(format!("could not look up classroom {id}")),
        }
    }

    let classrooms = classroom
        .get_classrooms()
        .await
        .context("could not list classrooms")?;

    selector
        .select_from(&classrooms)
        .cloned()
        .with_context(|| format!("could not find classroom with selector {selector:?}"))
}

pub fn init_tracing() -> Result<()> {
    registry()
        .with(fmt::layer().event_format(format().pretty()))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env()?,
        )
        .init();
    Ok(())
}
