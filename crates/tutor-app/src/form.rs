use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw input of the "new student" form, as typed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStudentForm {
    pub name: String,
    pub grade: String,
    pub interests: Vec<String>,
}

/// Form values after validation: trimmed, blank interests dropped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidStudent {
    pub name: String,
    pub grade: String,
    pub interests: Vec<String>,
}

/// Per-field validation messages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    pub name: Option<String>,
    pub grade: Option<String>,
    pub interests: Option<String>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.grade.is_none() && self.interests.is_none()
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = [&self.name, &self.grade, &self.interests]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for FormErrors {}

impl NewStudentForm {
    pub fn new(name: impl Into<String>, grade: impl Into<String>, interests: Vec<String>) -> Self {
        Self {
            name: name.into(),
            grade: grade.into(),
            interests,
        }
    }

    pub fn validate(&self) -> Result<ValidStudent, FormErrors> {
        let name = self.name.trim();
        let grade = self.grade.trim();
        let interests: Vec<String> = self
            .interests
            .iter()
            .map(|i| i.trim())
            .filter(|i| !i.is_empty())
            .map(str::to_string)
            .collect();

        let mut errors = FormErrors::default();
        if name.is_empty() {
            errors.name = Some("Student name is required".to_string());
        }
        if grade.is_empty() {
            errors.grade = Some("Grade level is required".to_string());
        }
        if interests.is_empty() {
            errors.interests = Some("At least one interest is required".to_string());
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ValidStudent {
            name: name.to_string(),
            grade: grade.to_string(),
            interests,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_form_is_trimmed() {
        let form = NewStudentForm::new(
            "  Alex ",
            "5th ",
            vec![" Science".to_string(), "   ".to_string(), "Animals".to_string()],
        );

        let student = form.validate().unwrap();
        assert_eq!(student.name, "Alex");
        assert_eq!(student.grade, "5th");
        assert_eq!(student.interests, vec!["Science", "Animals"]);
    }

    #[test]
    fn test_every_missing_field_is_reported() {
        let form = NewStudentForm::new(" ", "", vec![String::new()]);

        let errors = form.validate().unwrap_err();
        assert_eq!(errors.name.as_deref(), Some("Student name is required"));
        assert_eq!(errors.grade.as_deref(), Some("Grade level is required"));
        assert_eq!(errors.interests.as_deref(), Some("At least one interest is required"));
        assert_eq!(
            errors.to_string(),
            "Student name is required; Grade level is required; At least one interest is required"
        );
    }

    #[test]
    fn test_interests_required() {
        let form = NewStudentForm::new("Alex", "5th", vec![]);

        let errors = form.validate().unwrap_err();
        assert!(errors.name.is_none());
        assert!(errors.interests.is_some());
    }
}
