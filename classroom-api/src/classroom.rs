use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classroom {
    id: ClassroomId,
    name: String,
    #[serde(default)]
    archived: bool,
    #[serde(default)]
    url: Option<String>,
}

impl Classroom {
    pub fn new(id: ClassroomId, name: String) -> Self {
        Self {
            id,
            name,
            archived: false,
            url: None,
        }
    }

    pub fn id(&self) -> ClassroomId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn archived(&self) -> bool {
        self.archived
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassroomId {
    id: u64,
}

impl ClassroomId {
    pub fn new(id: u64) -> Self {
        Self { id }
    }

    pub fn as_u64(self) -> u64 {
        self.id
    }
}

impl FromStr for ClassroomId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self::new)
    }
}

impl fmt::Display for ClassroomId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.id.fmt(f)
    }
}
