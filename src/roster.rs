use crate::errors::AppError;
use crate::models::Student;

/// Students of the current group, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    students: Vec<Student>,
}

impl Roster {
    pub fn new(students: Vec<Student>) -> Self {
        Self { students }
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn active(&self) -> impl Iterator<Item = &Student> {
        self.students.iter().filter(|student| student.active)
    }

    pub fn get(&self, id: &str) -> Option<&Student> {
        self.students.iter().find(|student| student.id == id)
    }

    pub fn add(
        &mut self,
        id: String,
        korean_name: &str,
        english_name: &str,
        class_name: &str,
    ) -> Result<&Student, AppError> {
        let korean_name = korean_name.trim();
        let english_name = english_name.trim();
        if korean_name.is_empty() || english_name.is_empty() {
            return Err(AppError::bad_request(
                "korean_name and english_name are required",
            ));
        }

        self.students.push(Student {
            id,
            korean_name: korean_name.to_string(),
            english_name: english_name.to_string(),
            class_name: class_name.to_string(),
            active: true,
        });
        Ok(&self.students[self.students.len() - 1])
    }

    pub fn toggle_active(&mut self, id: &str) -> Result<&Student, AppError> {
        let student = self
            .students
            .iter_mut()
            .find(|student| student.id == id)
            .ok_or_else(|| AppError::not_found(format!("student '{id}' not found")))?;
        student.active = !student.active;
        Ok(&*student)
    }

    pub fn remove(&mut self, id: &str) -> Result<Student, AppError> {
        let index = self
            .students
            .iter()
            .position(|student| student.id == id)
            .ok_or_else(|| AppError::not_found(format!("student '{id}' not found")))?;
        Ok(self.students.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Roster {
        let mut roster = Roster::default();
        roster.add("a".into(), "김태이", "Tay", "A7-1").unwrap();
        roster.add("b".into(), "박재이", "Jay", "A7-1").unwrap();
        roster.add("c".into(), "박준희", "Junhee", "A7-1").unwrap();
        roster
    }

    #[test]
    fn add_trims_and_activates() {
        let mut roster = Roster::default();
        let student = roster.add("x".into(), "  송주원 ", " Juwon", "A7-1").unwrap();
        assert_eq!(student.korean_name, "송주원");
        assert_eq!(student.english_name, "Juwon");
        assert!(student.active);
    }

    #[test]
    fn add_rejects_blank_names() {
        let mut roster = Roster::default();
        let err = roster.add("x".into(), "   ", "Juwon", "A7-1").unwrap_err();
        assert!(err.is_user_error());
        assert!(roster.add("y".into(), "송주원", "", "A7-1").is_err());
        assert!(roster.students().is_empty());
    }

    #[test]
    fn toggle_hides_from_active_but_keeps_roster() {
        let mut roster = roster();
        assert!(!roster.toggle_active("b").unwrap().active);
        let active: Vec<&str> = roster.active().map(|s| s.id.as_str()).collect();
        assert_eq!(active, vec!["a", "c"]);
        assert_eq!(roster.students().len(), 3);
        assert!(roster.toggle_active("b").unwrap().active);
    }

    #[test]
    fn remove_preserves_order_of_the_rest() {
        let mut roster = roster();
        assert_eq!(roster.remove("b").unwrap().english_name, "Jay");
        let ids: Vec<&str> = roster.students().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(roster.remove("b").unwrap_err().status.as_u16(), 404);
    }
}
