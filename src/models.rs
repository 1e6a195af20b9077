use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub korean_name: String,
    pub english_name: String,
    pub class_name: String,
    pub active: bool,
}

/// A teaching group ("class" in the school sense).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub schedule: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: String,
    pub student_id: String,
    pub date: NaiveDate,
    pub completed: bool,
    pub checked_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// ISO-8601 week identifier, written `YYYY-Www`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WeekId {
    pub year: i32,
    pub week: u32,
}

impl WeekId {
    pub fn new(year: i32, week: u32) -> Self {
        Self { year, week }
    }
}

impl fmt::Display for WeekId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-W{:02}", self.year, self.week)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWeekIdError(String);

impl fmt::Display for ParseWeekIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid week identifier '{}', expected YYYY-Www", self.0)
    }
}

impl std::error::Error for ParseWeekIdError {}

impl FromStr for WeekId {
    type Err = ParseWeekIdError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let err = || ParseWeekIdError(value.to_string());
        let (year, week) = value.trim().split_once("-W").ok_or_else(err)?;
        if year.is_empty() || week.is_empty() {
            return Err(err());
        }
        let year = year.parse::<i32>().map_err(|_| err())?;
        let week = week.parse::<u32>().map_err(|_| err())?;
        Ok(Self { year, week })
    }
}

impl TryFrom<String> for WeekId {
    type Error = ParseWeekIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WeekId> for String {
    fn from(week: WeekId) -> Self {
        week.to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentStat {
    pub student: Student,
    pub completed: usize,
    pub total: usize,
    pub rate: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyStat {
    pub date: NaiveDate,
    pub completed: usize,
    pub total: usize,
    pub rate: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OverallStats {
    pub total_students: usize,
    pub total_assignments: usize,
    pub total_completed: usize,
    pub completion_rate: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    #[serde(rename = "B+")]
    BPlus,
    B,
    C,
}

impl Grade {
    pub fn as_str(self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::C => "C",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedStudent {
    pub rank: usize,
    #[serde(flatten)]
    pub stat: StudentStat,
    pub grade: Grade,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GoalStatus {
    pub goal: u32,
    pub rate: u32,
    pub achieved: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatisticsReport {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub weekdays: usize,
    pub students: Vec<StudentStat>,
    pub daily: Vec<DailyStat>,
    pub overall: OverallStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeekRow {
    pub student: Student,
    pub checks: [bool; 5],
    pub rate: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeekTable {
    pub week: WeekId,
    pub dates: [NaiveDate; 5],
    pub rows: Vec<WeekRow>,
}

/// Backup snapshot of the global group list plus one group's working set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub classes: Vec<Group>,
    pub current_class: String,
    pub students: Vec<Student>,
    pub homework_checks: Vec<AttendanceRecord>,
    pub export_date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct NewStudentRequest {
    pub korean_name: String,
    pub english_name: String,
}

#[derive(Debug, Deserialize)]
pub struct NewGroupRequest {
    pub name: String,
    pub schedule: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    pub student_id: String,
    pub date: NaiveDate,
    pub completed: bool,
    #[serde(default)]
    pub checked_by: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WeekQuery {
    pub week: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// `month`, `last7`, `last30` or `default`; overrides `start`/`end`.
    pub preset: Option<String>,
    pub goal: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GroupsResponse {
    pub current: String,
    pub groups: Vec<Group>,
}

#[derive(Debug, Serialize)]
pub struct DeletedStudent {
    pub student: Student,
    pub removed_checks: usize,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub report: StatisticsReport,
    pub ranking: Vec<RankedStudent>,
    pub goal: GoalStatus,
}
