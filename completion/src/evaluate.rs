use std::collections::BTreeMap;

use classroom_api::client::Client;
use classroom_api::error::FetchError;
use classroom_api::pull_request::PullRequest;
use classroom_api::services::fetch_service::FetchService;
use classroom_api::submission::Submission;
use classroom_api::types::StudentLogin;
use futures::{stream, StreamExt, TryStreamExt};
use serde::Serialize;
use tracing::{debug, warn};

/// Whether each student completed one assignment. Students without an entry have not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CompletionMap {
    completed: BTreeMap<StudentLogin, bool>,
}

impl CompletionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a student's status, returning the status it replaced.
    pub fn insert(&mut self, student: StudentLogin, completed: bool) -> Option<bool> {
        self.completed.insert(student, completed)
    }

    pub fn get(&self, student: &str) -> Option<bool> {
        self.completed.get(student).copied()
    }

    pub fn is_completed(&self, student: &str) -> bool {
        self.get(student).unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StudentLogin, bool)> {
        self.completed
            .iter()
            .map(|(student, completed)| (student, *completed))
    }

    pub fn len(&self) -> usize {
        self.completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.completed.is_empty()
    }
}

/// A submission is complete once any of its closed pull requests is the feedback request.
pub fn is_complete(closed_pulls: &[PullRequest]) -> bool {
    closed_pulls.iter().any(PullRequest::is_feedback)
}

/// Checks each submission's repository for a closed feedback pull request, one repository at a
/// time and in the order given. The first failed lookup fails the whole evaluation.
///
/// A student listed on several submissions gets the status of the last one.
pub async fn evaluate_submissions(
    submissions: &[Submission],
    classroom: &Client<impl FetchService>,
) -> Result<CompletionMap, FetchError> {
    let statuses: Vec<(&Submission, bool)> = stream::iter(submissions)
        .then(|submission| async move {
            let closed_pulls = classroom
                .get_closed_pull_requests(submission.repository())
                .await?;
            let completed = is_complete(&closed_pulls);
            debug!(
                student = %submission.student(),
                repository = %submission.repository(),
                completed,
                "evaluated submission"
            );
            Ok::<_, FetchError>((submission, completed))
        })
        .try_collect()
        .await?;

    Ok(completion_map(statuses))
}

fn completion_map<'a>(
    statuses: impl IntoIterator<Item = (&'a Submission, bool)>,
) -> CompletionMap {
    let mut map = CompletionMap::new();
    for (submission, completed) in statuses {
        if let Some(previous) = map.insert(submission.student().clone(), completed) {
            warn!(
                student = %submission.student(),
                repository = %submission.repository(),
                previous,
                completed,
                "student has more than one submission; keeping the last"
            );
        }
    }
    map
}
