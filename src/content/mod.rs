//! Page content that gets committed to the site repository, one JSON file
//! per page type.

pub mod about;
pub mod schedule;

pub use about::AboutPage;
pub use schedule::Schedule;

use std::fmt;

use crate::error::PublishError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    About,
    Schedule,
}

impl ContentKind {
    pub fn commit_message(self) -> &'static str {
        match self {
            ContentKind::About => "chore: update about page content",
            ContentKind::Schedule => "chore: update schedule tasks",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ContentKind::About => "about",
            ContentKind::Schedule => "schedule",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContentDocument {
    About(AboutPage),
    Schedule(Schedule),
}

impl ContentDocument {
    pub fn kind(&self) -> ContentKind {
        match self {
            ContentDocument::About(_) => ContentKind::About,
            ContentDocument::Schedule(_) => ContentKind::Schedule,
        }
    }

    pub fn prepare(&self) -> Result<ContentDocument, PublishError> {
        match self {
            ContentDocument::About(page) => {
                page.validate()?;
                Ok(ContentDocument::About(page.clone()))
            }
            ContentDocument::Schedule(schedule) => {
                let normalized = schedule.normalized();
                normalized.validate()?;
                Ok(ContentDocument::Schedule(normalized))
            }
        }
    }

    /// Two-space indented JSON, the layout the site reads at build time.
    pub fn to_canonical_json(&self) -> Result<String, PublishError> {
        let json = match self {
            ContentDocument::About(page) => serde_json::to_string_pretty(page),
            ContentDocument::Schedule(schedule) => serde_json::to_string_pretty(schedule),
        };
        json.map_err(|e| PublishError::Validation(e.to_string()))
    }
}
