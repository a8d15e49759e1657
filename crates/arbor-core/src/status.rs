/// Result of one `update` of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Running,
    Success,
    Failure,
}

impl Status {
    /// `true` for `Success` and `Failure`.
    pub fn is_settled(self) -> bool {
        !matches!(self, Status::Running)
    }

    pub fn from_bool(ok: bool) -> Self {
        if ok {
            Status::Success
        } else {
            Status::Failure
        }
    }
}

impl core::fmt::Display for Status {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Status::Running => "running",
            Status::Success => "success",
            Status::Failure => "failure",
        })
    }
}

/// Lifecycle state a node keeps between ticks.
///
/// `Success` and `Failure` are never stored: a node that settles runs `on_stop` and drops back
/// to `Inactive` within the same update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum NodeState {
    #[default]
    Inactive,
    Running,
}
