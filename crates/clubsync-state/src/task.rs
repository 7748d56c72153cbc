//! # Task Progress

use clubsync_core::TransitionError;
use serde::{Deserialize, Serialize};

/// Progress of an assigned task.
///
/// `Todo ↔ InProgress`, either of them `→ Done`, and `Done → InProgress`
/// to reopen. Staying in the same status is not a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started.
    Todo,
    /// Being worked on.
    InProgress,
    /// Finished.
    Done,
}

impl TaskStatus {
    /// The canonical string name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Done => "done",
        }
    }

    /// Convert a canonical name back to a status.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "todo" => Some(Self::Todo),
            "in_progress" => Some(Self::InProgress),
            "done" => Some(Self::Done),
            _ => None,
        }
    }

    /// States reachable in one step.
    pub fn valid_transitions(&self) -> &'static [TaskStatus] {
        match self {
            Self::Todo => &[Self::InProgress, Self::Done],
            Self::InProgress => &[Self::Todo, Self::Done],
            Self::Done => &[Self::InProgress],
        }
    }

    /// Always false: a finished task can be reopened.
    pub fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }

    /// Move to `target` if the edge exists.
    pub fn transition_to(self, target: TaskStatus) -> Result<Self, TransitionError> {
        if self.valid_transitions().contains(&target) {
            Ok(target)
        } else {
            Err(TransitionError::InvalidTransition {
                kind: "task",
                from: self.as_str().to_string(),
                to: target.as_str().to_string(),
            })
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task priority, ordered `Low < Medium < High`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    /// Nice to have.
    Low,
    /// Default priority.
    #[default]
    Medium,
    /// Urgent.
    High,
}

impl TaskPriority {
    /// The canonical string name of this priority.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Convert a canonical name back to a priority.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_path() {
        let s = TaskStatus::Todo
            .transition_to(TaskStatus::InProgress)
            .and_then(|s| s.transition_to(TaskStatus::Done))
            .unwrap();
        assert_eq!(s, TaskStatus::Done);
    }

    #[test]
    fn todo_can_jump_to_done() {
        assert_eq!(
            TaskStatus::Todo.transition_to(TaskStatus::Done),
            Ok(TaskStatus::Done)
        );
    }

    #[test]
    fn done_reopens_to_in_progress_only() {
        assert!(TaskStatus::Done.transition_to(TaskStatus::InProgress).is_ok());
        assert!(TaskStatus::Done.transition_to(TaskStatus::Todo).is_err());
    }

    #[test]
    fn self_transition_rejected() {
        for s in [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done] {
            assert!(s.transition_to(s).is_err());
        }
    }

    #[test]
    fn in_progress_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        assert_eq!(TaskStatus::from_name("in_progress"), Some(TaskStatus::InProgress));
    }

    #[test]
    fn priority_order_and_default() {
        assert!(TaskPriority::Low < TaskPriority::Medium);
        assert!(TaskPriority::Medium < TaskPriority::High);
        assert_eq!(TaskPriority::default(), TaskPriority::Medium);
    }
}
