use serde::{Deserialize, Serialize};

use crate::error::PublishError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutPage {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Markdown body.
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tech_stack: Option<Vec<TechItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changelog: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updates: Option<Vec<UpdateEntry>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechItem {
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub desc: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateEntry {
    pub date: String,
    pub title: String,
}

impl AboutPage {
    pub fn validate(&self) -> Result<(), PublishError> {
        if self.title.trim().is_empty() {
            return Err(PublishError::Validation("about title must not be empty".into()));
        }

        if let Some(stack) = &self.tech_stack {
            if let Some(pos) = stack.iter().position(|item| item.name.trim().is_empty()) {
                return Err(PublishError::Validation(format!(
                    "techStack[{}] has an empty name",
                    pos
                )));
            }
        }

        if let Some(updates) = &self.updates {
            if let Some(pos) = updates
                .iter()
                .position(|u| u.date.trim().is_empty() || u.title.trim().is_empty())
            {
                return Err(PublishError::Validation(format!(
                    "updates[{}] needs both a date and a title",
                    pos
                )));
            }
        }

        Ok(())
    }
}
