//! Identifiers shared across the classroom and repository APIs that don't "do" much on their own.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A student's GitHub login, used as the student identifier everywhere, including the student
/// column of the report sheet.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentLogin {
    login: String,
}

impl StudentLogin {
    pub fn new(login: String) -> Self {
        Self { login }
    }

    pub fn as_str(&self) -> &str {
        &self.login
    }
}

impl Borrow<str> for StudentLogin {
    fn borrow(&self) -> &str {
        &self.login
    }
}

impl fmt::Display for StudentLogin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.login.fmt(f)
    }
}

/// An `owner/repo` repository name.
#[derive(Debug, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepoFullName {
    full_name: String,
}

impl RepoFullName {
    pub fn new(full_name: String) -> Self {
        Self { full_name }
    }

    pub fn as_str(&self) -> &str {
        &self.full_name
    }
}

impl fmt::Display for RepoFullName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.full_name.fmt(f)
    }
}
