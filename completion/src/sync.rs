use anyhow::{Context, Result};
use classroom_api::classroom::ClassroomId;
use classroom_api::client::Client;
use classroom_api::services::fetch_service::FetchService;
use classroom_api::sheets::{SpreadsheetClient, ValueRange};
use tracing::info;

use crate::grid::{reconcile, Grid, GridLayout};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Write,
    DryRun,
}

#[derive(Debug, Clone)]
pub struct SyncReport {
    grid: Grid,
    changed_cells: usize,
    written: bool,
}

impl SyncReport {
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn changed_cells(&self) -> usize {
        self.changed_cells
    }

    pub fn written(&self) -> bool {
        self.written
    }
}

/// Reads the report sheet's `range`, reconciles it against the classroom, and writes the whole
/// grid back to the same range in one batch update. Nothing is written if any lookup fails.
#[tracing::instrument(
    skip(classroom, sheets, layout),
    fields(spreadsheet = %sheets.spreadsheet_id()),
    err
)]
pub async fn sync_sheet(
    classroom: &Client<impl FetchService>,
    classroom_id: ClassroomId,
    sheets: &SpreadsheetClient<impl FetchService>,
    range: &str,
    layout: &GridLayout,
    mode: WriteMode,
) -> Result<SyncReport> {
    let current = Grid::new(
        sheets
            .read_range(range)
            .await
            .context("could not read the report sheet")?
            .into_values(),
    );
    info!(num_rows = current.rows().len(), "read report sheet");

    let reconciled = reconcile(current.clone(), classroom_id, classroom, layout)
        .await
        .context("could not determine completion from the classroom")?;
    let changed_cells = current.changed_cells(&reconciled);
    info!(changed_cells, "reconciled report sheet");

    let written = match mode {
        WriteMode::Write => {
            let update = ValueRange::new(range.to_owned(), reconciled.rows().to_vec());
            sheets
                .batch_update(&[update])
                .await
                .context("could not write the report sheet")?;
            true
        }
        WriteMode::DryRun => {
            info!("dry run; leaving report sheet untouched");
            false
        }
    };

    Ok(SyncReport {
        grid: reconciled,
        changed_cells,
        written,
    })
}
