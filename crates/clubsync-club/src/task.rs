//! Assignable tasks.

use chrono::{DateTime, NaiveDate, Utc};
use clubsync_core::TransitionError;
use clubsync_state::{TaskPriority, TaskStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A to-do item, optionally assigned to a member.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Task {
    pub id: Uuid,
    pub club_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// Member id, not user id.
    pub assignee_id: Option<Uuid>,
    pub due_date: Option<NaiveDate>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    /// Set while the task is `done`.
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Move the task along its lifecycle and keep `completed_at` in step.
    pub fn set_status(
        &mut self,
        target: TaskStatus,
        at: DateTime<Utc>,
    ) -> Result<(), TransitionError> {
        self.status = self.status.transition_to(target)?;
        self.completed_at = (self.status == TaskStatus::Done).then_some(at);
        self.updated_at = at;
        Ok(())
    }

    /// Whether the due date has passed without the task being done.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status != TaskStatus::Done && self.due_date.is_some_and(|d| d < today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> Task {
        let now = Utc::now();
        Task {
            id: Uuid::new_v4(),
            club_id: Uuid::new_v4(),
            title: "Order T-shirts".into(),
            description: None,
            assignee_id: None,
            due_date: NaiveDate::from_ymd_opt(2024, 5, 1),
            priority: TaskPriority::High,
            status: TaskStatus::Todo,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn completing_sets_completed_at_and_reopening_clears_it() {
        let mut t = task();
        t.set_status(TaskStatus::Done, Utc::now()).unwrap();
        assert!(t.completed_at.is_some());
        t.set_status(TaskStatus::InProgress, Utc::now()).unwrap();
        assert!(t.completed_at.is_none());
    }

    #[test]
    fn rejected_transition_leaves_task_untouched() {
        let mut t = task();
        let before = t.updated_at;
        assert!(t.set_status(TaskStatus::Todo, Utc::now()).is_err());
        assert_eq!(t.status, TaskStatus::Todo);
        assert_eq!(t.updated_at, before);
    }

    #[test]
    fn overdue_only_when_open() {
        let mut t = task();
        let later = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert!(t.is_overdue(later));
        t.set_status(TaskStatus::Done, Utc::now()).unwrap();
        assert!(!t.is_overdue(later));
    }
}
