use std::collections::HashSet;
use std::io;

use anyhow::{Context, Result};
use app_utils::{select_classroom, Config};
use classroom_api::assignment::AssignmentTitle;
use classroom_api::classroom::Classroom;
use classroom_api::classroom_selector::ClassroomSelector;
use classroom_api::client::Client;
use classroom_api::services::fetch_service::FetchService;
use completion::aggregate::aggregate;
use completion::grid::{cell_text, Grid, GridLayout};
use completion::sync::{sync_sheet, WriteMode};
use tracing::info;

pub async fn list_classrooms(config: &Config) -> Result<()> {
    let classroom = config.classroom_client()?;
    let classrooms = classroom
        .get_classrooms()
        .await
        .context("could not list classrooms")?;

    let mut out = tsv_writer();
    out.write_record(["id", "name", "archived"])?;
    for classroom in &classrooms {
        out.write_record([
            classroom.id().to_string(),
            classroom.name().to_owned(),
            classroom.archived().to_string(),
        ])?;
    }
    out.flush()?;

    Ok(())
}

pub async fn list_assignments(config: &Config, selector: Option<String>) -> Result<()> {
    let classroom = config.classroom_client()?;
    let target = target_classroom(config, &classroom, selector).await?;

    let assignments = classroom
        .get_assignments(target.id())
        .await
        .with_context(|| format!("could not list assignments for {}", target.name()))?;

    let mut out = tsv_writer();
    out.write_record(["id", "title"])?;
    for assignment in &assignments {
        out.write_record([assignment.id().to_string(), assignment.title().to_string()])?;
    }
    out.flush()?;

    Ok(())
}

pub async fn print_status(
    config: &Config,
    selector: Option<String>,
    titles: Vec<String>,
) -> Result<()> {
    let classroom = config.classroom_client()?;
    let target = target_classroom(config, &classroom, selector).await?;

    let titles: HashSet<AssignmentTitle> = titles.into_iter().map(AssignmentTitle::new).collect();
    let result = aggregate(target.id(), &titles, &classroom)
        .await
        .context("could not determine completion")?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

pub async fn sync(
    config: &Config,
    selector: Option<String>,
    range: Option<String>,
    dry_run: bool,
) -> Result<()> {
    let classroom = config.classroom_client()?;
    let sheets = config.spreadsheet_client()?;
    let target = target_classroom(config, &classroom, selector).await?;

    let range = range.as_deref().unwrap_or(config.sheet_range());
    let mode = if dry_run {
        WriteMode::DryRun
    } else {
        WriteMode::Write
    };

    let report = sync_sheet(
        &classroom,
        target.id(),
        &sheets,
        range,
        &GridLayout::default(),
        mode,
    )
    .await?;
    info!(
        classroom = target.name(),
        changed_cells = report.changed_cells(),
        written = report.written(),
        "sync finished"
    );

    if !report.written() {
        write_grid(report.grid())?;
    }
    Ok(())
}

async fn target_classroom(
    config: &Config,
    classroom: &Client<impl FetchService>,
    selector: Option<String>,
) -> Result<Classroom> {
    let selector = selector
        .map(ClassroomSelector::new)
        .or_else(|| config.classroom().cloned())
        .context("no classroom given; pass `--classroom` or set `CLASSROOM`")?;

    let target = select_classroom(classroom, &selector).await?;
    info!(id = %target.id(), name = target.name(), "selected classroom");
    Ok(target)
}

fn tsv_writer() -> csv::Writer<io::Stdout> {
    csv::WriterBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_writer(io::stdout())
}

fn write_grid(grid: &Grid) -> Result<()> {
    let mut out = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(io::stdout());
    for row in grid.rows() {
        out.write_record(row.iter().map(|cell| cell_text(cell).into_owned()))?;
    }
    out.flush()?;
    Ok(())
}
