use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tutor_types::StudentContext;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub teacher_id: String,
    pub name: String,
    pub grade: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub interests: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Nullable `text[]` column: `null` reads as no interests
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Student {
    /// Profile handed to the assistant with every prompt
    pub fn context(&self) -> StudentContext {
        StudentContext::new(self.name.clone(), self.grade.clone(), self.interests.clone())
    }
}

impl From<&Student> for StudentContext {
    fn from(student: &Student) -> Self {
        student.context()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStudent {
    pub teacher_id: String,
    pub name: String,
    pub grade: String,
    pub interests: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(interests: serde_json::Value) -> serde_json::Value {
        json!({
            "id": "s1",
            "teacher_id": "teach-1",
            "name": "Alex",
            "grade": "5th",
            "interests": interests,
            "created_at": "2024-03-01T09:59:00+00:00"
        })
    }

    #[test]
    fn test_null_interests_read_as_empty() {
        let student: Student = serde_json::from_value(row(json!(null))).unwrap();
        assert!(student.interests.is_empty());

        let student: Student = serde_json::from_value(row(json!(["Science"]))).unwrap();
        assert_eq!(student.interests, vec!["Science"]);
    }

    #[test]
    fn test_missing_interests_read_as_empty() {
        let mut value = row(json!([]));
        value.as_object_mut().unwrap().remove("interests");

        let student: Student = serde_json::from_value(value).unwrap();
        assert!(student.interests.is_empty());
    }
}
