//! The report sheet as a grid of cells, and merging completion into it.
//!
//! The header row names an assignment in each column from [`FIRST_ASSIGNMENT_COLUMN`] on. Every
//! other row is a student, identified by the login in [`STUDENT_COLUMN`]. Reconciling rewrites the
//! (student row, assignment column) cells and nothing else. Cells hold the JSON values the sheet
//! returns, so formulas and numbers elsewhere in the grid are carried through untouched.

use std::borrow::Cow;
use std::collections::HashSet;

use classroom_api::assignment::AssignmentTitle;
use classroom_api::classroom::ClassroomId;
use classroom_api::client::Client;
use classroom_api::error::FetchError;
use classroom_api::services::fetch_service::FetchService;
use itertools::{EitherOrBoth, Itertools};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::aggregate::{aggregate, AggregateResult};

pub const HEADER_ROW: usize = 0;
pub const FIRST_DATA_ROW: usize = 1;
pub const STUDENT_COLUMN: usize = 1;
pub const FIRST_ASSIGNMENT_COLUMN: usize = 2;

pub const COMPLETED: &str = "Completed";
pub const UNCOMPLETED: &str = "Uncompleted";

/// Where the header, the students and the assignments sit in a [`Grid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub header_row: usize,
    pub first_data_row: usize,
    pub student_column: usize,
    pub first_assignment_column: usize,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            header_row: HEADER_ROW,
            first_data_row: FIRST_DATA_ROW,
            student_column: STUDENT_COLUMN,
            first_assignment_column: FIRST_ASSIGNMENT_COLUMN,
        }
    }
}

pub fn completion_status(completed: bool) -> &'static str {
    if completed {
        COMPLETED
    } else {
        UNCOMPLETED
    }
}

/// The text of a cell as the sheet would show it for a plain value. Empty cells read as "".
pub fn cell_text(cell: &Value) -> Cow<'_, str> {
    match cell {
        Value::String(text) => Cow::Borrowed(text.as_str()),
        Value::Null => Cow::Borrowed(""),
        other => Cow::Owned(other.to_string()),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grid {
    rows: Vec<Vec<Value>>,
}

impl Grid {
    pub fn new(rows: Vec<Vec<Value>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<Value>> {
        self.rows
    }

    pub fn header(&self, layout: &GridLayout) -> Option<&[Value]> {
        self.rows.get(layout.header_row).map(Vec::as_slice)
    }

    /// The columns whose header names an assignment. Blank header cells name nothing.
    pub fn assignment_columns(&self, layout: &GridLayout) -> Vec<(usize, AssignmentTitle)> {
        let Some(header) = self.header(layout) else {
            return Vec::new();
        };

        header
            .iter()
            .enumerate()
            .skip(layout.first_assignment_column)
            .map(|(column, cell)| (column, cell_text(cell)))
            .filter(|(_, title)| !title.is_empty())
            .map(|(column, title)| (column, AssignmentTitle::new(title.into_owned())))
            .collect()
    }

    pub fn assignment_titles(&self, layout: &GridLayout) -> HashSet<AssignmentTitle> {
        self.assignment_columns(layout)
            .into_iter()
            .map(|(_, title)| title)
            .collect()
    }

    /// Writes `Completed` or `Uncompleted` into every assignment cell of every student row. An
    /// assignment missing from `aggregate` leaves its whole column `Uncompleted`. Student rows too
    /// short to reach an assignment column are padded with blank cells first. Rows with a blank
    /// student cell are spacers and stay as they are.
    pub fn apply(&mut self, aggregate: &AggregateResult, layout: &GridLayout) {
        let columns = self.assignment_columns(layout);
        if columns.is_empty() {
            return;
        }

        let student_rows = self
            .rows
            .iter_mut()
            .enumerate()
            .filter(|(index, _)| *index >= layout.first_data_row && *index != layout.header_row);

        for (_, row) in student_rows {
            let student = row
                .get(layout.student_column)
                .map(|cell| cell_text(cell).into_owned())
                .unwrap_or_default();
            if student.is_empty() {
                continue;
            }
            for (column, title) in &columns {
                let completed = aggregate.is_completed(title.as_str(), &student);
                set_cell(row, *column, completion_status(completed));
            }
        }
    }

    /// The number of cells that differ from `other`, counting cells present in only one grid.
    pub fn changed_cells(&self, other: &Grid) -> usize {
        self.rows
            .iter()
            .zip_longest(&other.rows)
            .map(|rows| match rows {
                EitherOrBoth::Both(left, right) => left
                    .iter()
                    .zip_longest(right)
                    .filter(|cells| !matches!(cells, EitherOrBoth::Both(l, r) if l == r))
                    .count(),
                EitherOrBoth::Left(row) | EitherOrBoth::Right(row) => row.len(),
            })
            .sum()
    }
}

impl From<Vec<Vec<Value>>> for Grid {
    fn from(rows: Vec<Vec<Value>>) -> Self {
        Self::new(rows)
    }
}

fn set_cell(row: &mut Vec<Value>, column: usize, value: &str) {
    if row.len() <= column {
        row.resize(column + 1, Value::String(String::new()));
    }
    row[column] = Value::String(value.to_owned());
}

/// Fetches completion for every assignment named in the header and merges it into `grid`.
/// Reconciling an already reconciled grid against unchanged classroom data changes nothing.
#[tracing::instrument(skip(grid, classroom, layout), fields(num_rows = grid.rows().len()), err)]
pub async fn reconcile(
    mut grid: Grid,
    classroom_id: ClassroomId,
    classroom: &Client<impl FetchService>,
    layout: &GridLayout,
) -> Result<Grid, FetchError> {
    let titles = grid.assignment_titles(layout);
    if titles.is_empty() {
        info!("header names no assignments; nothing to reconcile");
        return Ok(grid);
    }

    let aggregate = aggregate(classroom_id, &titles, classroom).await?;
    grid.apply(&aggregate, layout);

    Ok(grid)
}

#[cfg(test)]
mod tests {
    use classroom_api::testing::FakeApi;
    use classroom_api::types::StudentLogin;
    use serde_json::json;

    use super::*;
    use crate::evaluate::CompletionMap;

    fn grid(rows: &[&[&str]]) -> Grid {
        Grid::new(
            rows.iter()
                .map(|row| row.iter().map(|cell| json!(cell)).collect())
                .collect(),
        )
    }

    fn aggregate_of(entries: &[(&str, &[(&str, bool)])]) -> AggregateResult {
        entries
            .iter()
            .map(|(title, students)| {
                let mut completion = CompletionMap::new();
                for (student, completed) in students.iter() {
                    completion.insert(StudentLogin::new(student.to_string()), *completed);
                }
                (AssignmentTitle::from(*title), completion)
            })
            .collect()
    }

    #[test]
    fn titles_come_from_header_after_student_column() {
        let grid = grid(&[&["id", "student", "HW1", "", "HW2"], &["r1", "alice"]]);
        let columns = grid.assignment_columns(&GridLayout::default());
        assert_eq!(
            columns,
            [(2, AssignmentTitle::from("HW1")), (4, AssignmentTitle::from("HW2"))]
        );
    }

    #[test]
    fn missing_assignment_column_becomes_uncompleted() {
        let mut grid = grid(&[&["id", "student", "HW1", "HW2"], &["r1", "alice", "x", "y"]]);
        let aggregate = aggregate_of(&[("HW1", &[("alice", true)])]);

        grid.apply(&aggregate, &GridLayout::default());

        assert_eq!(grid.rows()[1], ["r1", "alice", "Completed", "Uncompleted"]);
    }

    #[test]
    fn only_assignment_cells_of_student_rows_change() {
        let original = grid(&[
            &["id", "student", "HW1", "", "HW2"],
            &["r1", "alice", "", "note", "Completed"],
            &["r2", "bob", "Completed", "other", ""],
        ]);
        let aggregate = aggregate_of(&[
            ("HW1", &[("alice", true), ("bob", false)]),
            ("HW2", &[("bob", true)]),
        ]);

        let mut reconciled = original.clone();
        reconciled.apply(&aggregate, &GridLayout::default());

        assert_eq!(reconciled.rows().len(), original.rows().len());
        assert_eq!(reconciled.rows()[0], original.rows()[0]);
        for (before, after) in original.rows().iter().zip(reconciled.rows()).skip(1) {
            assert_eq!(before.len(), after.len());
            assert_eq!(before[..2], after[..2]);
            assert_eq!(before[3], after[3]);
        }
        assert_eq!(reconciled.rows()[1][2], COMPLETED);
        assert_eq!(reconciled.rows()[1][4], UNCOMPLETED);
        assert_eq!(reconciled.rows()[2][2], UNCOMPLETED);
        assert_eq!(reconciled.rows()[2][4], COMPLETED);
    }

    #[test]
    fn short_rows_are_padded_to_reach_assignment_cells() {
        let mut grid = grid(&[&["id", "student", "HW1", "HW2"], &["r1", "alice"]]);
        grid.apply(&AggregateResult::new(), &GridLayout::default());
        assert_eq!(grid.rows()[1], ["r1", "alice", "Uncompleted", "Uncompleted"]);
    }

    #[test]
    fn rows_without_a_student_are_left_alone() {
        let mut grid = grid(&[
            &["id", "student", "HW1"],
            &["r1", "alice", ""],
            &[],
            &["subtotal", "", "=COUNTIF(C2:C2,\"Completed\")"],
        ]);
        let before = grid.clone();
        grid.apply(&aggregate_of(&[("HW1", &[("alice", true)])]), &GridLayout::default());

        assert_eq!(grid.rows()[1], ["r1", "alice", "Completed"]);
        assert_eq!(grid.rows()[2..], before.rows()[2..]);
    }

    #[test]
    fn non_text_cells_are_kept_and_matched_by_text() {
        let mut grid = Grid::new(vec![
            vec![json!("id"), json!("student"), json!("HW1"), json!("")],
            vec![json!(1), json!(12345), json!(""), json!(45292)],
        ]);
        grid.apply(&aggregate_of(&[("HW1", &[("12345", true)])]), &GridLayout::default());

        assert_eq!(
            grid.rows()[1],
            [json!(1), json!(12345), json!("Completed"), json!(45292)]
        );
    }

    #[test]
    fn cell_text_renders_plain_values() {
        assert_eq!(cell_text(&json!("HW1")), "HW1");
        assert_eq!(cell_text(&json!(3)), "3");
        assert_eq!(cell_text(&json!(true)), "true");
        assert_eq!(cell_text(&Value::Null), "");
    }

    #[test]
    fn applying_twice_changes_nothing() {
        let mut once = grid(&[
            &["id", "student", "HW1", "HW2"],
            &["r1", "alice", "x", "y"],
            &["r2", "bob", "", ""],
        ]);
        let aggregate = aggregate_of(&[("HW1", &[("alice", true)]), ("HW2", &[("bob", true)])]);
        once.apply(&aggregate, &GridLayout::default());

        let mut twice = once.clone();
        twice.apply(&aggregate, &GridLayout::default());

        assert_eq!(once, twice);
        assert_eq!(once.changed_cells(&twice), 0);
    }

    #[test]
    fn custom_layout_moves_header_and_students() {
        let layout = GridLayout {
            header_row: 1,
            first_data_row: 2,
            student_column: 0,
            first_assignment_column: 1,
        };
        let mut grid = grid(&[
            &["Completion report", ""],
            &["student", "HW1"],
            &["alice", ""],
        ]);
        grid.apply(&aggregate_of(&[("HW1", &[("alice", true)])]), &layout);

        assert_eq!(grid.rows()[0], ["Completion report", ""]);
        assert_eq!(grid.rows()[2], ["alice", "Completed"]);
    }

    #[test]
    fn counts_changed_cells() {
        let before = grid(&[&["a", "b"], &["c"]]);
        let after = grid(&[&["a", "x"], &["c", "d"], &["e"]]);
        assert_eq!(before.changed_cells(&after), 3);
    }

    #[tokio::test]
    async fn reconciles_against_classroom() {
        let fake = FakeApi::new()
            .with_json(
                "/classrooms/7/assignments",
                json!([{ "id": 1, "title": "HW1" }]),
            )
            .with_json(
                "/assignments/1/accepted_assignments",
                json!([{
                    "students": [{ "login": "alice" }],
                    "repository": { "full_name": "org/hw1-alice" }
                }]),
            )
            .with_json(
                "/repos/org/hw1-alice/pulls",
                json!([{ "title": "Feedback", "state": "closed" }]),
            );
        let classroom = fake.client();
        let layout = GridLayout::default();
        let input = grid(&[
            &["id", "student", "HW1", "HW2"],
            &["r1", "alice", "x", "y"],
            &["r2", "bob", "x", "y"],
        ]);

        let once = reconcile(input, ClassroomId::new(7), &classroom, &layout)
            .await
            .unwrap();
        let twice = reconcile(once.clone(), ClassroomId::new(7), &classroom, &layout)
            .await
            .unwrap();

        assert_eq!(once.rows()[1], ["r1", "alice", "Completed", "Uncompleted"]);
        assert_eq!(once.rows()[2], ["r2", "bob", "Uncompleted", "Uncompleted"]);
        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn header_without_assignments_skips_classroom() {
        let fake = FakeApi::new();
        let input = grid(&[&["id", "student"], &["r1", "alice"]]);

        let output = reconcile(
            input.clone(),
            ClassroomId::new(7),
            &fake.client(),
            &GridLayout::default(),
        )
        .await
        .unwrap();

        assert_eq!(output, input);
        assert!(fake.requested_paths().is_empty());
    }
}
