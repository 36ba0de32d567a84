use crate::classroom::{Classroom, ClassroomId};

#[derive(Debug, Clone)]
pub struct ClassroomSelector {
    selector: String,
}

impl ClassroomSelector {
    pub fn new(selector: String) -> Self {
        Self { selector }
    }

    pub fn as_str(&self) -> &str {
        &self.selector
    }

    /// The classroom id this selector names, if it reads as one.
    pub fn as_id(&self) -> Option<ClassroomId> {
        self.selector.parse().ok()
    }

    pub fn select_from<'a>(&self, classrooms: &'a [Classroom]) -> Option<&'a Classroom> {
        self.select_as_id(classrooms)
            .or_else(|| self.select_as_name(classrooms))
    }

    fn select_as_id<'a>(&self, classrooms: &'a [Classroom]) -> Option<&'a Classroom> {
        classrooms
            .iter()
            .find(|classroom| classroom.id().to_string() == self.selector)
    }

    fn select_as_name<'a>(&self, classrooms: &'a [Classroom]) -> Option<&'a Classroom> {
        classrooms
            .iter()
            .find(|classroom| classroom.name() == self.selector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classrooms() -> Vec<Classroom> {
        vec![
            Classroom::new(ClassroomId::new(11), "Intro to Programming".to_owned()),
            // A classroom whose name looks like another's id
            Classroom::new(ClassroomId::new(12), "11".to_owned()),
        ]
    }

    #[test]
    fn prefers_id_over_name() {
        let classrooms = classrooms();
        let selected = ClassroomSelector::new("11".to_owned()).select_from(&classrooms);
        assert_eq!(selected.map(Classroom::id), Some(ClassroomId::new(11)));
    }

    #[test]
    fn falls_back_to_name() {
        let classrooms = classrooms();
        let selected = ClassroomSelector::new("Intro to Programming".to_owned())
            .select_from(&classrooms);
        assert_eq!(selected.map(Classroom::id), Some(ClassroomId::new(11)));
    }

    #[test]
    fn numeric_selector_reads_as_id() {
        assert_eq!(
            ClassroomSelector::new(" 99 ".to_owned()).as_id(),
            Some(ClassroomId::new(99))
        );
        assert_eq!(ClassroomSelector::new("CS 101".to_owned()).as_id(), None);
    }

    #[test]
    fn unknown_selector_selects_nothing() {
        let classrooms = classrooms();
        assert!(ClassroomSelector::new("Databases".to_owned())
            .select_from(&classrooms)
            .is_none());
    }
}
