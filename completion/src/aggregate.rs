use std::collections::HashSet;

use classroom_api::assignment::{Assignment, AssignmentTitle};
use classroom_api::classroom::ClassroomId;
use classroom_api::client::Client;
use classroom_api::error::FetchError;
use classroom_api::services::fetch_service::FetchService;
use classroom_api::submission::submissions;
use futures::{stream, StreamExt, TryStreamExt};
use itertools::Itertools;
use serde::{Serialize, Serializer};
use tracing::info;

use crate::evaluate::{evaluate_submissions, CompletionMap};

/// Completion for each requested assignment, in the order the classroom lists assignments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateResult {
    entries: Vec<(AssignmentTitle, CompletionMap)>,
}

impl AggregateResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the completion for `title`, replacing any earlier entry in place.
    pub fn insert(&mut self, title: AssignmentTitle, completion: CompletionMap) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == title) {
            Some((_, existing)) => *existing = completion,
            None => self.entries.push((title, completion)),
        }
    }

    pub fn get(&self, title: &str) -> Option<&CompletionMap> {
        self.entries
            .iter()
            .find(|(existing, _)| existing.as_str() == title)
            .map(|(_, completion)| completion)
    }

    /// Unknown assignments and unknown students both count as not completed.
    pub fn is_completed(&self, title: &str, student: &str) -> bool {
        self.get(title)
            .is_some_and(|completion| completion.is_completed(student))
    }

    pub fn titles(&self) -> impl Iterator<Item = &AssignmentTitle> {
        self.entries.iter().map(|(title, _)| title)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AssignmentTitle, &CompletionMap)> {
        self.entries.iter().map(|(title, completion)| (title, completion))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Extend<(AssignmentTitle, CompletionMap)> for AggregateResult {
    fn extend<I: IntoIterator<Item = (AssignmentTitle, CompletionMap)>>(&mut self, iter: I) {
        for (title, completion) in iter {
            self.insert(title, completion);
        }
    }
}

impl FromIterator<(AssignmentTitle, CompletionMap)> for AggregateResult {
    fn from_iter<I: IntoIterator<Item = (AssignmentTitle, CompletionMap)>>(iter: I) -> Self {
        let mut result = Self::new();
        result.extend(iter);
        result
    }
}

impl Serialize for AggregateResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

/// Completion for each assignment in the classroom whose title is in `titles`. Titles that match
/// no assignment are left out; assignments that weren't asked for are never looked at.
#[tracing::instrument(skip(titles, classroom), fields(num_titles = titles.len()), err)]
pub async fn aggregate(
    classroom_id: ClassroomId,
    titles: &HashSet<AssignmentTitle>,
    classroom: &Client<impl FetchService>,
) -> Result<AggregateResult, FetchError> {
    let assignments = classroom.get_assignments(classroom_id).await?;

    let missing = missing_titles(&assignments, titles);
    if !missing.is_empty() {
        info!(
            missing = %missing.iter().format(", "),
            "some requested assignments are not in the classroom"
        );
    }

    stream::iter(requested_assignments(&assignments, titles))
        .then(|assignment| async move {
            let completion = evaluate_assignment(assignment, classroom).await?;
            Ok::<_, FetchError>((assignment.title().clone(), completion))
        })
        .try_collect()
        .await
}

/// Completion for the students who accepted `assignment`.
#[tracing::instrument(skip(assignment, classroom), fields(assignment = %assignment.title()), err)]
pub async fn evaluate_assignment(
    assignment: &Assignment,
    classroom: &Client<impl FetchService>,
) -> Result<CompletionMap, FetchError> {
    let accepted = classroom.get_accepted_assignments(assignment.id()).await?;
    let submissions = submissions(&accepted);
    info!(num_submissions = submissions.len(), "evaluating submissions");

    evaluate_submissions(&submissions, classroom).await
}

pub fn requested_assignments<'a>(
    assignments: &'a [Assignment],
    titles: &'a HashSet<AssignmentTitle>,
) -> impl Iterator<Item = &'a Assignment> + 'a {
    assignments
        .iter()
        .filter(move |assignment| titles.contains(assignment.title()))
}

fn missing_titles<'a>(
    assignments: &[Assignment],
    titles: &'a HashSet<AssignmentTitle>,
) -> Vec<&'a AssignmentTitle> {
    titles
        .iter()
        .filter(|title| !assignments.iter().any(|assignment| assignment.title() == *title))
        .sorted()
        .collect()
}
