use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::types::{RepoFullName, StudentLogin};

/// An accepted assignment as the classroom reports it: the students who accepted it and the
/// repository created for them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptedAssignment {
    students: Vec<Student>,
    repository: Repository,
}

impl AcceptedAssignment {
    pub fn new(students: Vec<StudentLogin>, repository: RepoFullName) -> Self {
        Self {
            students: students.into_iter().map(|login| Student { login }).collect(),
            repository: Repository {
                full_name: repository,
            },
        }
    }

    pub fn students(&self) -> impl Iterator<Item = &StudentLogin> {
        self.students.iter().map(|student| &student.login)
    }

    pub fn repository(&self) -> &RepoFullName {
        &self.repository.full_name
    }

    /// The submission credited to the first listed student. Other members of a group are not
    /// credited. Returns `None` when no student is listed.
    pub fn submission(&self) -> Option<Submission> {
        let student = self.students().next()?.clone();
        if self.students.len() > 1 {
            warn!(
                %student,
                repository = %self.repository(),
                num_students = self.students.len(),
                "only the first student of a group submission is credited"
            );
        }
        Some(Submission::new(student, self.repository().clone()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Student {
    login: StudentLogin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Repository {
    full_name: RepoFullName,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    student: StudentLogin,
    repository: RepoFullName,
}

impl Submission {
    pub fn new(student: StudentLogin, repository: RepoFullName) -> Self {
        Self {
            student,
            repository,
        }
    }

    pub fn student(&self) -> &StudentLogin {
        &self.student
    }

    pub fn repository(&self) -> &RepoFullName {
        &self.repository
    }
}

/// Submissions for every accepted assignment that lists at least one student, in the order given.
pub fn submissions(accepted: &[AcceptedAssignment]) -> Vec<Submission> {
    accepted
        .iter()
        .filter_map(|accepted| {
            let submission = accepted.submission();
            if submission.is_none() {
                warn!(repository = %accepted.repository(), "accepted assignment lists no students");
            }
            submission
        })
        .collect()
}
