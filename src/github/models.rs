use serde::{Deserialize, Serialize};

use crate::utils::from_base64_utf8;

#[derive(Serialize, Deserialize, Debug)]
pub struct Claims {
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

#[derive(Deserialize, Debug)]
pub struct Installation {
    pub id: u64,
}

#[derive(Deserialize, Debug)]
pub struct InstallationToken {
    pub token: String,
    pub expires_at: String,
}

/// Body of `GET /repos/{owner}/{repo}/contents/{path}`. A directory comes
/// back as an array of entries instead of a single object.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum ContentsResponse {
    File(FileEntry),
    Directory(Vec<serde_json::Value>),
}

#[derive(Deserialize, Debug)]
pub struct FileEntry {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub path: String,
    pub sha: String,
    #[serde(default)]
    pub content: Option<String>,
}

impl FileEntry {
    pub fn decoded_content(&self) -> Option<String> {
        self.content
            .as_deref()
            .and_then(|c| from_base64_utf8(c).ok())
    }
}

#[derive(Serialize, Debug)]
pub struct PutFileRequest<'a> {
    pub message: &'a str,
    pub content: &'a str,
    pub branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<&'a str>,
}

#[derive(Deserialize, Debug)]
pub struct PutFileResponse {
    pub content: Option<FileEntry>,
    pub commit: Commit,
}

#[derive(Deserialize, Debug)]
pub struct Commit {
    pub sha: String,
    #[serde(default)]
    pub html_url: Option<String>,
}
