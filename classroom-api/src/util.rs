use crate::assignment::AssignmentId;
use crate::classroom::ClassroomId;
use crate::types::RepoFullName;

pub const GITHUB_API_URL: &str = "https://api.github.com";
pub const GITHUB_ACCEPT: &str = "application/vnd.github+json";
pub const GITHUB_API_VERSION: &str = "2022-11-28";

pub const SHEETS_API_URL: &str = "https://sheets.googleapis.com";
pub const JSON_ACCEPT: &str = "application/json";

pub const USER_AGENT: &str = concat!("completion-sync/", env!("CARGO_PKG_VERSION"));

/// Splits a slash-separated path into its non-empty segments.
pub fn path_segments(path: &str) -> impl Iterator<Item = String> + '_ {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(ToOwned::to_owned)
}

pub fn classroom_path(classroom: ClassroomId) -> String {
    format!("/classrooms/{classroom}")
}

pub fn assignments_path(classroom: ClassroomId) -> String {
    format!("/classrooms/{classroom}/assignments")
}

pub fn accepted_assignments_path(assignment: AssignmentId) -> String {
    format!("/assignments/{assignment}/accepted_assignments")
}

pub fn pulls_path(repository: &RepoFullName) -> String {
    format!("/repos/{repository}/pulls")
}
