use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Student profile sent alongside every prompt so replies can be tailored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentContext {
    pub name: String,
    pub grade: String,
    pub interests: Vec<String>,
}

impl StudentContext {
    pub fn new(
        name: impl Into<String>,
        grade: impl Into<String>,
        interests: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            grade: grade.into(),
            interests,
        }
    }
}

/// Author of a message within a thread
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    Teacher,
    Ai,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::Teacher => "teacher",
            Sender::Ai => "ai",
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "teacher" => Ok(Sender::Teacher),
            "ai" => Ok(Sender::Ai),
            other => Err(format!("Unknown sender: {}", other)),
        }
    }
}
