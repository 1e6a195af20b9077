use crate::attendance::AttendanceLog;
use crate::errors::AppError;
use crate::groups::{GroupRegistry, DEFAULT_GROUP_ID, DEFAULT_GROUP_NAME};
use crate::models::{
    AttendanceRecord, ExportDocument, Group, StatisticsReport, Student, WeekId, WeekTable,
};
use crate::roster::Roster;
use crate::stats;
use crate::storage::{checks_key, students_key, KvStore, CURRENT_GROUP_KEY, GROUPS_KEY};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashSet;
use tracing::info;

const SEED_STUDENTS: [(&str, &str); 9] = [
    ("김태이", "Tay"),
    ("박재이", "Jay"),
    ("박준희", "Junhee"),
    ("송주원", "Juwon"),
    ("양승호", "Ryan"),
    ("이로빈", "Robin"),
    ("조예슬", "Stella"),
    ("편주원", "James"),
    ("서선준", "Seonjun"),
];

/// The working set of the current group plus the group list.
///
/// Every mutation writes the keys it touched back to the given store; the
/// caller decides when the store reaches disk.
#[derive(Debug)]
pub struct Workspace {
    groups: GroupRegistry,
    roster: Roster,
    attendance: AttendanceLog,
    seed_roster: bool,
    id_counter: u64,
}

impl Workspace {
    pub fn load(store: &mut KvStore, seed_roster: bool) -> Result<Self, AppError> {
        let stored: Option<Vec<Group>> = store.get(GROUPS_KEY)?;
        let current: Option<String> = store.get(CURRENT_GROUP_KEY)?;
        let fresh = stored.is_none();

        let mut workspace = Self {
            groups: GroupRegistry::new(stored.unwrap_or_default(), current),
            roster: Roster::default(),
            attendance: AttendanceLog::default(),
            seed_roster,
            id_counter: 0,
        };
        if fresh {
            store.set(GROUPS_KEY, &workspace.groups.groups())?;
        }
        let current = workspace.groups.current_id().to_string();
        let (roster, attendance) = workspace.read_group_data(store, &current)?;
        workspace.roster = roster;
        workspace.attendance = attendance;
        Ok(workspace)
    }

    /// Reads a group's students and checks without touching the working set.
    /// The default group is seeded here when it has no stored roster.
    fn read_group_data(
        &mut self,
        store: &mut KvStore,
        group_id: &str,
    ) -> Result<(Roster, AttendanceLog), AppError> {
        let students: Option<Vec<Student>> = store.get(&students_key(group_id))?;
        let checks: Option<Vec<AttendanceRecord>> = store.get(&checks_key(group_id))?;
        let attendance = AttendanceLog::new(checks.unwrap_or_default());

        let roster = match students {
            Some(students) => Roster::new(students),
            None if group_id == DEFAULT_GROUP_ID && self.seed_roster => {
                let class_name = self
                    .groups
                    .get(group_id)
                    .map(|group| group.name.clone())
                    .unwrap_or_else(|| DEFAULT_GROUP_NAME.to_string());
                let roster = self.seed_students(&class_name)?;
                store.set(&students_key(group_id), &roster.students())?;
                info!("seeded default roster with {} students", roster.students().len());
                roster
            }
            None => Roster::default(),
        };
        Ok((roster, attendance))
    }

    fn seed_students(&mut self, class_name: &str) -> Result<Roster, AppError> {
        let mut roster = Roster::default();
        for (korean_name, english_name) in SEED_STUDENTS {
            let id = self.next_id();
            roster.add(id, korean_name, english_name, class_name)?;
        }
        Ok(roster)
    }

    pub fn next_id(&mut self) -> String {
        self.id_counter = self.id_counter.wrapping_add(1);
        format!(
            "id_{:x}{:04x}",
            Utc::now().timestamp_millis(),
            self.id_counter & 0xffff
        )
    }

    pub fn groups(&self) -> &GroupRegistry {
        &self.groups
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn attendance(&self) -> &AttendanceLog {
        &self.attendance
    }

    pub fn add_student(
        &mut self,
        store: &mut KvStore,
        korean_name: &str,
        english_name: &str,
    ) -> Result<Student, AppError> {
        let id = self.next_id();
        let class_name = self.groups.current_name().to_string();
        let student = self
            .roster
            .add(id, korean_name, english_name, &class_name)?
            .clone();
        self.save_students(store)?;
        Ok(student)
    }

    pub fn toggle_student(&mut self, store: &mut KvStore, id: &str) -> Result<Student, AppError> {
        let student = self.roster.toggle_active(id)?.clone();
        self.save_students(store)?;
        Ok(student)
    }

    /// Removes the student and all of their checks. Returns the student and
    /// the number of checks dropped.
    pub fn delete_student(
        &mut self,
        store: &mut KvStore,
        id: &str,
    ) -> Result<(Student, usize), AppError> {
        let student = self.roster.remove(id)?;
        self.save_students(store)?;
        let removed = self.attendance.remove_student(id);
        self.save_checks(store)?;
        Ok((student, removed))
    }

    pub fn record_check(
        &mut self,
        store: &mut KvStore,
        student_id: &str,
        date: NaiveDate,
        completed: bool,
        checked_by: &str,
        now: DateTime<Utc>,
    ) -> Result<AttendanceRecord, AppError> {
        if self.roster.get(student_id).is_none() {
            return Err(AppError::not_found(format!("student '{student_id}' not found")));
        }
        let id = self.next_id();
        let record = self
            .attendance
            .record_check(id, student_id, date, completed, checked_by, now)
            .clone();
        self.save_checks(store)?;
        Ok(record)
    }

    pub fn add_group(
        &mut self,
        store: &mut KvStore,
        name: &str,
        schedule: &str,
        description: Option<&str>,
    ) -> Result<Group, AppError> {
        let id = self.next_id();
        let group = self.groups.add(id, name, schedule, description)?.clone();
        store.set(GROUPS_KEY, &self.groups.groups())?;
        Ok(group)
    }

    /// Swaps the working set for the selected group's. Returns whether the
    /// current group changed.
    pub fn select_group(&mut self, store: &mut KvStore, id: &str) -> Result<bool, AppError> {
        if self.groups.get(id).is_none() {
            return Err(AppError::not_found(format!("group '{id}' not found")));
        }
        if self.groups.current_id() == id {
            return Ok(false);
        }

        let (roster, attendance) = self.read_group_data(store, id)?;
        store.set(CURRENT_GROUP_KEY, &id)?;
        self.groups.select(id)?;
        self.roster = roster;
        self.attendance = attendance;
        info!("switched to group {id}");
        Ok(true)
    }

    /// Deletes a group together with its students and checks.
    pub fn delete_group(&mut self, store: &mut KvStore, id: &str) -> Result<Group, AppError> {
        let was_current = self.groups.current_id() == id;
        let mut groups = self.groups.clone();
        let group = groups.remove(id)?;
        let fallback = if was_current {
            Some(self.read_group_data(store, groups.current_id())?)
        } else {
            None
        };

        store.set(GROUPS_KEY, &groups.groups())?;
        store.remove(&students_key(id));
        store.remove(&checks_key(id));
        if let Some((roster, attendance)) = fallback {
            store.set(CURRENT_GROUP_KEY, &groups.current_id())?;
            self.roster = roster;
            self.attendance = attendance;
        }
        self.groups = groups;
        info!("deleted group {id} ({})", group.name);
        Ok(group)
    }

    /// Wipes every stored key and starts over from the default group.
    pub fn reset(&mut self, store: &mut KvStore) -> Result<(), AppError> {
        store.clear();
        *self = Self::load(store, self.seed_roster)?;
        info!("all data reset");
        Ok(())
    }

    pub fn export(&self, now: DateTime<Utc>) -> ExportDocument {
        ExportDocument {
            classes: self.groups.groups().to_vec(),
            current_class: self.groups.current_id().to_string(),
            students: self.roster.students().to_vec(),
            homework_checks: self.attendance.records().to_vec(),
            export_date: now,
        }
    }

    /// Replaces the group list and the exported group's working set, then
    /// makes that group current. Other groups' stored data is left alone.
    pub fn restore(
        &mut self,
        store: &mut KvStore,
        document: ExportDocument,
    ) -> Result<(), AppError> {
        validate_backup(&document)?;

        store.set(GROUPS_KEY, &document.classes)?;
        store.set(CURRENT_GROUP_KEY, &document.current_class)?;
        store.set(&students_key(&document.current_class), &document.students)?;
        store.set(&checks_key(&document.current_class), &document.homework_checks)?;

        self.groups = GroupRegistry::new(document.classes, Some(document.current_class));
        self.roster = Roster::new(document.students);
        self.attendance = AttendanceLog::new(document.homework_checks);
        info!("restored backup for group {}", self.groups.current_id());
        Ok(())
    }

    pub fn week_table(&self, week: WeekId) -> Option<WeekTable> {
        stats::week_table(week, self.roster.students(), &self.attendance)
    }

    pub fn statistics(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<StatisticsReport, AppError> {
        stats::build_statistics(start, end, self.roster.students(), &self.attendance)
    }

    fn save_students(&self, store: &mut KvStore) -> Result<(), AppError> {
        store.set(&students_key(self.groups.current_id()), &self.roster.students())
    }

    fn save_checks(&self, store: &mut KvStore) -> Result<(), AppError> {
        store.set(&checks_key(self.groups.current_id()), &self.attendance.records())
    }
}

/// Rejects backups whose ids or check pairs repeat, or whose current group
/// is missing from the group list.
fn validate_backup(document: &ExportDocument) -> Result<(), AppError> {
    let mut group_ids = HashSet::new();
    if let Some(group) = document
        .classes
        .iter()
        .find(|group| !group_ids.insert(group.id.as_str()))
    {
        return Err(AppError::bad_request(format!(
            "group id '{}' appears twice in the backup",
            group.id
        )));
    }
    let mut names = HashSet::new();
    if !document.classes.iter().all(|group| names.insert(group.name.as_str())) {
        return Err(AppError::bad_request("group names in the backup are not unique"));
    }
    if !group_ids.contains(document.current_class.as_str()) {
        return Err(AppError::bad_request(format!(
            "backup group '{}' is not in its group list",
            document.current_class
        )));
    }

    let mut student_ids = HashSet::new();
    if let Some(student) = document
        .students
        .iter()
        .find(|student| !student_ids.insert(student.id.as_str()))
    {
        return Err(AppError::bad_request(format!(
            "student id '{}' appears twice in the backup",
            student.id
        )));
    }

    let mut pairs = HashSet::new();
    if let Some(record) = document
        .homework_checks
        .iter()
        .find(|record| !pairs.insert((record.student_id.as_str(), record.date)))
    {
        return Err(AppError::bad_request(format!(
            "student '{}' has more than one check on {}",
            record.student_id, record.date
        )));
    }
    Ok(())
}
