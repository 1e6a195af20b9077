use crate::errors::AppError;
use crate::models::Group;

pub const DEFAULT_GROUP_ID: &str = "class_default";
pub const DEFAULT_GROUP_NAME: &str = "A7-1 Let's Speak 1";

pub fn default_group() -> Group {
    Group {
        id: DEFAULT_GROUP_ID.to_string(),
        name: DEFAULT_GROUP_NAME.to_string(),
        schedule: "월-금 15:10-16:00".to_string(),
        description: "기본반".to_string(),
    }
}

/// All groups plus the pointer to the one currently worked on.
#[derive(Debug, Clone)]
pub struct GroupRegistry {
    groups: Vec<Group>,
    current: String,
}

impl Default for GroupRegistry {
    fn default() -> Self {
        Self::new(Vec::new(), None)
    }
}

impl GroupRegistry {
    /// An empty list falls back to the default group; a missing or unknown
    /// `current` falls back to the first group.
    pub fn new(groups: Vec<Group>, current: Option<String>) -> Self {
        let groups = if groups.is_empty() {
            vec![default_group()]
        } else {
            groups
        };
        let current = current
            .filter(|id| groups.iter().any(|group| &group.id == id))
            .unwrap_or_else(|| groups[0].id.clone());
        Self { groups, current }
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn current_id(&self) -> &str {
        &self.current
    }

    pub fn current(&self) -> Option<&Group> {
        self.get(&self.current)
    }

    /// Name stamped on students added to the current group.
    pub fn current_name(&self) -> &str {
        self.current()
            .map(|group| group.name.as_str())
            .unwrap_or(DEFAULT_GROUP_NAME)
    }

    pub fn get(&self, id: &str) -> Option<&Group> {
        self.groups.iter().find(|group| group.id == id)
    }

    pub fn add(
        &mut self,
        id: String,
        name: &str,
        schedule: &str,
        description: Option<&str>,
    ) -> Result<&Group, AppError> {
        let name = name.trim();
        let schedule = schedule.trim();
        if name.is_empty() || schedule.is_empty() {
            return Err(AppError::bad_request("name and schedule are required"));
        }
        if self.groups.iter().any(|group| group.name == name) {
            return Err(AppError::conflict(format!("a group named '{name}' already exists")));
        }

        self.groups.push(Group {
            id,
            name: name.to_string(),
            schedule: schedule.to_string(),
            description: description.map(str::trim).unwrap_or_default().to_string(),
        });
        Ok(&self.groups[self.groups.len() - 1])
    }

    /// Returns whether the current group changed.
    pub fn select(&mut self, id: &str) -> Result<bool, AppError> {
        if self.get(id).is_none() {
            return Err(AppError::not_found(format!("group '{id}' not found")));
        }
        if self.current == id {
            return Ok(false);
        }
        self.current = id.to_string();
        Ok(true)
    }

    /// Removes a group. When it was current, the first remaining group
    /// becomes current.
    pub fn remove(&mut self, id: &str) -> Result<Group, AppError> {
        if id == DEFAULT_GROUP_ID {
            return Err(AppError::bad_request("the default group cannot be deleted"));
        }
        let index = self
            .groups
            .iter()
            .position(|group| group.id == id)
            .ok_or_else(|| AppError::not_found(format!("group '{id}' not found")))?;
        if self.groups.len() == 1 {
            return Err(AppError::bad_request("the last group cannot be deleted"));
        }

        let removed = self.groups.remove(index);
        if self.current == removed.id {
            self.current = self.groups[0].id.clone();
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> GroupRegistry {
        let mut registry = GroupRegistry::default();
        registry
            .add("g2".into(), "B3-2 Let's Talk", "화목 17:00", None)
            .unwrap();
        registry
    }

    #[test]
    fn empty_registry_starts_with_default_group() {
        let registry = GroupRegistry::default();
        assert_eq!(registry.current_id(), DEFAULT_GROUP_ID);
        assert_eq!(registry.current_name(), DEFAULT_GROUP_NAME);
        assert_eq!(registry.groups().len(), 1);
    }

    #[test]
    fn unknown_current_falls_back_to_first() {
        let registry = GroupRegistry::new(vec![default_group()], Some("gone".into()));
        assert_eq!(registry.current_id(), DEFAULT_GROUP_ID);
    }

    #[test]
    fn add_rejects_duplicates_and_blanks() {
        let mut registry = registry();
        let err = registry
            .add("g3".into(), "B3-2 Let's Talk", "월 10:00", None)
            .unwrap_err();
        assert_eq!(err.status.as_u16(), 409);
        assert!(registry.add("g4".into(), " ", "월 10:00", None).is_err());
        assert!(registry.add("g5".into(), "C1", "  ", None).is_err());
        assert_eq!(registry.groups().len(), 2);
    }

    #[test]
    fn default_group_cannot_be_removed() {
        let mut registry = registry();
        assert!(registry.remove(DEFAULT_GROUP_ID).is_err());
        assert_eq!(registry.groups().len(), 2);
    }

    #[test]
    fn removing_current_group_selects_first() {
        let mut registry = registry();
        assert!(registry.select("g2").unwrap());
        assert!(!registry.select("g2").unwrap());
        registry.remove("g2").unwrap();
        assert_eq!(registry.current_id(), DEFAULT_GROUP_ID);
        assert!(registry.select("g2").is_err());
    }
}
