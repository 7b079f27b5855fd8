use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

use crate::error::PublishError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default)]
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

/// Tasks per calendar day, keyed `YYYY-MM-DD`. Sorted keys keep the
/// committed JSON stable between saves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schedule(pub BTreeMap<String, Vec<Task>>);

impl Schedule {
    pub fn validate(&self) -> Result<(), PublishError> {
        for (day, tasks) in &self.0 {
            NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|_| {
                PublishError::Validation(format!("{:?} is not a YYYY-MM-DD date", day))
            })?;

            let mut seen = HashSet::new();
            for task in tasks {
                if task.text.trim().is_empty() {
                    return Err(PublishError::Validation(format!(
                        "empty task text on {}",
                        day
                    )));
                }
                if !task.id.is_empty() && !seen.insert(task.id.as_str()) {
                    return Err(PublishError::Validation(format!(
                        "duplicate task id {} on {}",
                        task.id, day
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn normalized(&self) -> Schedule {
        let days = self
            .0
            .iter()
            .filter(|(_, tasks)| !tasks.is_empty())
            .map(|(day, tasks)| {
                let tasks = tasks
                    .iter()
                    .map(|task| Task {
                        id: if task.id.is_empty() {
                            Uuid::new_v4().to_string()
                        } else {
                            task.id.clone()
                        },
                        text: task.text.trim().to_string(),
                        completed: task.completed,
                    })
                    .collect();
                (day.clone(), tasks)
            })
            .collect();
        Schedule(days)
    }
}
