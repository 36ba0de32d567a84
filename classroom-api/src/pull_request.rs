use serde::{Deserialize, Serialize};

/// Title of the review request that marks a submission as complete. Matched exactly: no case
/// folding and no trimming.
pub const FEEDBACK_TITLE: &str = "Feedback";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    title: String,
    state: PullRequestState,
}

impl PullRequest {
    pub fn new(title: String, state: PullRequestState) -> Self {
        Self { title, state }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn state(&self) -> PullRequestState {
        self.state
    }

    pub fn is_feedback(&self) -> bool {
        self.title == FEEDBACK_TITLE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullRequestState {
    Open,
    Closed,
}

impl PullRequestState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feedback_title_matches_exactly() {
        let closed = |title: &str| PullRequest::new(title.to_owned(), PullRequestState::Closed);

        assert!(closed("Feedback").is_feedback());
        assert!(!closed("feedback").is_feedback());
        assert!(!closed(" Feedback").is_feedback());
        assert!(!closed("Feedback ").is_feedback());
        assert!(!closed("FEEDBACK").is_feedback());
    }
}
