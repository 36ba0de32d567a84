use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    id: AssignmentId,
    title: AssignmentTitle,
}

impl Assignment {
    pub fn new(id: AssignmentId, title: AssignmentTitle) -> Self {
        Self { id, title }
    }

    pub fn id(&self) -> AssignmentId {
        self.id
    }

    pub fn title(&self) -> &AssignmentTitle {
        &self.title
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssignmentId {
    id: u64,
}

impl AssignmentId {
    pub fn new(id: u64) -> Self {
        Self { id }
    }

    pub fn as_u64(self) -> u64 {
        self.id
    }
}

impl fmt::Display for AssignmentId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.id.fmt(f)
    }
}

/// An assignment title exactly as the classroom reports it. Titles are compared byte for byte;
/// the report sheet's header must spell them identically.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssignmentTitle {
    title: String,
}

impl AssignmentTitle {
    pub fn new(title: String) -> Self {
        Self { title }
    }

    pub fn as_str(&self) -> &str {
        &self.title
    }
}

impl Borrow<str> for AssignmentTitle {
    fn borrow(&self) -> &str {
        &self.title
    }
}

impl fmt::Display for AssignmentTitle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.title.fmt(f)
    }
}

impl From<&str> for AssignmentTitle {
    fn from(title: &str) -> Self {
        Self::new(title.to_owned())
    }
}
