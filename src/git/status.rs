//! Target classification and result status

/// What a run does to a target, decided once at the start of its pipeline
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// The working copy does not exist yet and will be created
    Clone,
    /// The working copy exists and will be brought up to date
    Update,
    /// The working copy must not exist at the end of the run
    Delete,
}

impl Action {
    /// Classifies a target from its delete flag and whether its path exists
    pub fn classify(delete: bool, exists: bool) -> Self {
        if delete {
            Action::Delete
        } else if exists {
            Action::Update
        } else {
            Action::Clone
        }
    }

    /// Upper-case label used in outcome headers
    pub fn label(&self) -> &'static str {
        match self {
            Action::Clone => "CLONE",
            Action::Update => "UPDATE",
            Action::Delete => "DELETE",
        }
    }
}

/// Status enum representing the final state of one target
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// Working copy was created, updated, switched or deleted
    Changed,
    /// Pipeline completed and nothing needed doing
    Unchanged,
    /// An error stopped the pipeline
    Failed,
}

impl Status {
    pub fn from_flags(error: bool, changed: bool) -> Self {
        if error {
            Status::Failed
        } else if changed {
            Status::Changed
        } else {
            Status::Unchanged
        }
    }

    /// Returns the emoji symbol for this status
    pub fn symbol(&self) -> &'static str {
        match self {
            Status::Unchanged => "🟢",
            Status::Changed => "🟡",
            Status::Failed => "🔴",
        }
    }

    /// Returns the text representation of this status
    pub fn text(&self) -> &'static str {
        match self {
            Status::Unchanged => "up to date",
            Status::Changed => "changed",
            Status::Failed => "failed",
        }
    }
}
