use crate::store::Action;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only JSON lines log of one client session
pub struct Journal {
    pub path: PathBuf,
    session_id: String,
    base_url: String,
    file: File,
}

#[derive(Serialize)]
struct Event<'a> {
    ts: DateTime<Utc>,
    session_id: &'a str,
    base_url: &'a str,
    #[serde(rename = "type")]
    event_type: &'a str,
    #[serde(flatten)]
    data: serde_json::Value,
}

impl Journal {
    pub fn new(path: &Path, session_id: &str, base_url: &str) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            session_id: session_id.to_string(),
            base_url: base_url.to_string(),
            file,
        })
    }

    pub fn log(&mut self, event_type: &str, data: serde_json::Value) -> Result<()> {
        let event = Event {
            ts: Utc::now(),
            session_id: &self.session_id,
            base_url: &self.base_url,
            event_type,
            data,
        };
        let line = serde_json::to_string(&event)?;
        writeln!(self.file, "{}", line)?;
        self.file.flush()?;
        Ok(())
    }

    pub fn navigate(&mut self, path: &str) -> Result<()> {
        self.log("navigate", serde_json::json!({ "path": path }))
    }

    pub fn command(&mut self, line: &str) -> Result<()> {
        self.log("command", serde_json::json!({ "line": line }))
    }

    /// Log a dispatched store action
    pub fn action(&mut self, name: &str, detail: serde_json::Value) -> Result<()> {
        self.log(
            "action",
            serde_json::json!({ "action": name, "detail": detail }),
        )
    }

    pub fn dispatched(&mut self, action: &Action) -> Result<()> {
        let detail = match action {
            Action::SignedIn(profile) => serde_json::json!({ "username": profile.username }),
            Action::SignedOut => serde_json::json!({}),
            Action::ProfileEdited(patch) => serde_json::to_value(patch)?,
            Action::TutoringChanged { course, action } => {
                serde_json::json!({ "code": course.code, "action": action })
            }
        };
        self.action(action.name(), detail)
    }

    pub fn alert(&mut self, level: &str, text: &str) -> Result<()> {
        self.log(
            "alert",
            serde_json::json!({ "level": level, "text": text }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Course, ProfilePatch};

    #[test]
    fn test_journal_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal").join("s1.jsonl");
        let mut journal = Journal::new(&path, "s1", "http://localhost:8080").unwrap();
        journal.navigate("/courses").unwrap();
        journal
            .dispatched(&Action::TutoringChanged {
                course: Course {
                    code: "cop-3502".to_string(),
                    name: "Programming Fundamentals 1".to_string(),
                },
                action: true,
            })
            .unwrap();
        journal.alert("error", "Error 401: nope").unwrap();

        let content = std::fs::read_to_string(&journal.path).unwrap();
        let lines: Vec<serde_json::Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["type"], "navigate");
        assert_eq!(lines[0]["path"], "/courses");
        assert_eq!(lines[0]["session_id"], "s1");
        assert_eq!(lines[1]["action"], "tutoring_changed");
        assert_eq!(lines[1]["detail"]["code"], "cop-3502");
        assert_eq!(lines[2]["level"], "error");
        assert!(lines[2]["ts"].is_string());
    }

    #[test]
    fn test_profile_edit_detail() {
        let dir = tempfile::tempdir().unwrap();
        let mut journal = Journal::new(&dir.path().join("s2.jsonl"), "s2", "http://x").unwrap();
        let patch = ProfilePatch {
            bio: Some("Likes trees".to_string()),
            ..ProfilePatch::default()
        };
        journal.dispatched(&Action::ProfileEdited(patch)).unwrap();

        let content = std::fs::read_to_string(&journal.path).unwrap();
        let line: serde_json::Value = serde_json::from_str(content.trim()).unwrap();
        assert_eq!(line["action"], "profile_edited");
        assert_eq!(line["detail"], serde_json::json!({ "bio": "Likes trees" }));
    }
}
