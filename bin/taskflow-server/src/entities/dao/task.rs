use chrono::{DateTime, NaiveDateTime, Utc};

/// A row in the `tasks` table.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRecord {
    /// Assigned by the store on first save; `None` until then.
    pub id: Option<i64>,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Free-text label such as `"Pending"` or `"In Progress"`.
    pub status: Option<String>,
    pub assignee: Option<String>,
    pub deadline: Option<NaiveDateTime>,
    pub priority: Option<i32>,
    pub created_on: DateTime<Utc>,
    /// `None` until the first replace or patch.
    pub updated_on: Option<DateTime<Utc>>,
}

impl TaskRecord {
    /// Stamp `updated_on` with the current time.
    ///
    /// The stamp never precedes `created_on`, even if the wall clock was
    /// stepped backwards between the two writes.
    pub fn touch(&mut self) {
        self.updated_on = Some(Utc::now().max(self.created_on));
    }
}
