use crate::attendance::AttendanceLog;
use crate::calendar::{date_range, is_weekday, week_to_dates};
use crate::errors::AppError;
use crate::models::{
    DailyStat, GoalStatus, Grade, OverallStats, RankedStudent, StatisticsReport, Student,
    StudentStat, WeekId, WeekRow, WeekTable,
};
use chrono::NaiveDate;

pub const DEFAULT_GOAL_RATE: u32 = 80;

/// `round(100 * completed / total)`, halves rounded up; 0 when `total` is 0.
pub fn completion_rate(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let rate = (200 * completed as u64 + total as u64) / (2 * total as u64);
    rate as u32
}

/// One entry per active student, in roster order.
pub fn per_student_stats(
    students: &[Student],
    dates: &[NaiveDate],
    log: &AttendanceLog,
) -> Vec<StudentStat> {
    students
        .iter()
        .filter(|student| student.active)
        .map(|student| {
            let completed = dates
                .iter()
                .filter(|date| log.is_completed(&student.id, **date))
                .count();
            StudentStat {
                student: student.clone(),
                completed,
                total: dates.len(),
                rate: completion_rate(completed, dates.len()),
            }
        })
        .collect()
}

pub fn per_day_stats(
    students: &[Student],
    dates: &[NaiveDate],
    log: &AttendanceLog,
) -> Vec<DailyStat> {
    let active: Vec<&Student> = students.iter().filter(|student| student.active).collect();
    dates
        .iter()
        .map(|date| {
            let completed = active
                .iter()
                .filter(|student| log.is_completed(&student.id, *date))
                .count();
            DailyStat {
                date: *date,
                completed,
                total: active.len(),
                rate: completion_rate(completed, active.len()),
            }
        })
        .collect()
}

/// Totals are summed before dividing, so students with more expected days
/// weigh more than in a mean of per-student rates.
pub fn overall_stats(stats: &[StudentStat]) -> OverallStats {
    let total_assignments: usize = stats.iter().map(|stat| stat.total).sum();
    let total_completed: usize = stats.iter().map(|stat| stat.completed).sum();
    OverallStats {
        total_students: stats.len(),
        total_assignments,
        total_completed,
        completion_rate: completion_rate(total_completed, total_assignments),
    }
}

/// Statistics over the weekdays of `[start, end]` for the active students.
pub fn build_statistics(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    students: &[Student],
    log: &AttendanceLog,
) -> Result<StatisticsReport, AppError> {
    let (Some(start), Some(end)) = (start, end) else {
        return Err(AppError::bad_request("both start and end dates are required"));
    };
    if start > end {
        return Err(AppError::bad_request("start date cannot be after end date"));
    }

    let weekdays: Vec<NaiveDate> = date_range(start, end)
        .into_iter()
        .filter(|date| is_weekday(*date))
        .collect();

    let per_student = per_student_stats(students, &weekdays, log);
    let daily = per_day_stats(students, &weekdays, log);
    let overall = overall_stats(&per_student);

    Ok(StatisticsReport {
        start,
        end,
        weekdays: weekdays.len(),
        students: per_student,
        daily,
        overall,
    })
}

pub fn letter_grade(rate: u32) -> Grade {
    match rate {
        90.. => Grade::APlus,
        80..=89 => Grade::A,
        70..=79 => Grade::BPlus,
        60..=69 => Grade::B,
        _ => Grade::C,
    }
}

/// Students ordered by rate, best first; ties keep roster order.
pub fn ranked(stats: &[StudentStat]) -> Vec<RankedStudent> {
    let mut sorted = stats.to_vec();
    sorted.sort_by(|a, b| b.rate.cmp(&a.rate));
    sorted
        .into_iter()
        .enumerate()
        .map(|(index, stat)| RankedStudent {
            rank: index + 1,
            grade: letter_grade(stat.rate),
            stat,
        })
        .collect()
}

pub fn goal_status(rate: u32, goal: u32) -> GoalStatus {
    GoalStatus {
        goal,
        rate,
        achieved: rate >= goal,
    }
}

/// The Monday-to-Friday check grid for `week`; `None` when the week cannot be
/// placed on the calendar.
pub fn week_table(week: WeekId, students: &[Student], log: &AttendanceLog) -> Option<WeekTable> {
    let dates = week_to_dates(week)?;
    let rows = students
        .iter()
        .filter(|student| student.active)
        .map(|student| {
            let checks = dates.map(|date| log.is_completed(&student.id, date));
            let completed = checks.iter().filter(|checked| **checked).count();
            WeekRow {
                student: student.clone(),
                checks,
                rate: completion_rate(completed, checks.len()),
            }
        })
        .collect();

    Some(WeekTable { week, dates, rows })
}
