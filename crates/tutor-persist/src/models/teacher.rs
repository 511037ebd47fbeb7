use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity record keyed by the auth provider's member id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: String,
    #[serde(rename = "memberstack_id")]
    pub external_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTeacher {
    #[serde(rename = "memberstack_id")]
    pub external_id: String,
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}
