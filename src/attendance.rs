use crate::models::AttendanceRecord;
use chrono::{DateTime, NaiveDate, Utc};

/// Completion checks of the current group, at most one per student and date.
#[derive(Debug, Clone, Default)]
pub struct AttendanceLog {
    records: Vec<AttendanceRecord>,
}

impl AttendanceLog {
    pub fn new(records: Vec<AttendanceRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[AttendanceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_completed(&self, student_id: &str, date: NaiveDate) -> bool {
        self.records.iter().any(|record| {
            record.student_id == student_id && record.date == date && record.completed
        })
    }

    /// Creates the record for `(student_id, date)` or updates the existing one
    /// in place. `id` is only used when a new record is created.
    pub fn record_check(
        &mut self,
        id: String,
        student_id: &str,
        date: NaiveDate,
        completed: bool,
        checked_by: &str,
        now: DateTime<Utc>,
    ) -> &AttendanceRecord {
        let index = match self
            .records
            .iter()
            .position(|record| record.student_id == student_id && record.date == date)
        {
            Some(index) => {
                let record = &mut self.records[index];
                record.completed = completed;
                record.checked_by = checked_by.to_string();
                record.updated_at = now;
                index
            }
            None => {
                self.records.push(AttendanceRecord {
                    id,
                    student_id: student_id.to_string(),
                    date,
                    completed,
                    checked_by: checked_by.to_string(),
                    created_at: now,
                    updated_at: now,
                });
                self.records.len() - 1
            }
        };
        &self.records[index]
    }

    /// Drops every record of `student_id`; returns how many were removed.
    pub fn remove_student(&mut self, student_id: &str) -> usize {
        let before = self.records.len();
        self.records.retain(|record| record.student_id != student_id);
        before - self.records.len()
    }
}
