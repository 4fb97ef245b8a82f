//! Profile editing.
//!
//! Edits collect in a local map and only the changed fields are sent. The
//! shared profile is merged after the backend accepts them.

use super::PageEnv;
use crate::api;
use crate::model::{Profile, ProfilePatch};
use crate::store::{Action, Session};
use crate::task::Task;
use crate::ui::Element;
use anyhow::{bail, Result};
use std::collections::BTreeMap;
use std::time::Duration;

/// Editable fields: (name on the wire, label)
pub const FIELDS: &[(&str, &str)] = &[
    ("firstname", "First Name"),
    ("lastname", "Last Name"),
    ("email", "Email Address"),
    ("phone", "Phone Number"),
    ("bio", "Bio"),
    ("availability", "Availability"),
];

/// Fields the backend only applies to tutors
const TUTOR_FIELDS: &[&str] = &["bio", "availability"];

fn shown_to(profile: &Profile, field: &str) -> bool {
    profile.is_tutor() || !TUTOR_FIELDS.contains(&field)
}

fn current_value(profile: &Profile, field: &str) -> String {
    match field {
        "firstname" => profile.firstname.clone(),
        "lastname" => profile.lastname.clone(),
        "email" => profile.email.clone(),
        "phone" => profile.phone.clone(),
        "bio" => profile.bio.clone(),
        "availability" => profile.availability.join(", "),
        _ => String::new(),
    }
}

pub struct ProfilePage {
    env: PageEnv,
    changed: BTreeMap<String, String>,
    pending: Option<Task<ProfilePatch>>,
}

impl ProfilePage {
    pub fn mount(env: &PageEnv) -> Self {
        Self {
            env: env.clone(),
            changed: BTreeMap::new(),
            pending: None,
        }
    }

    pub fn edit(&mut self, field: &str, value: &str) -> Result<()> {
        if !FIELDS.iter().any(|(name, _)| *name == field) {
            let known: Vec<&str> = FIELDS.iter().map(|(name, _)| *name).collect();
            bail!("Unknown field '{}'. Editable: {}", field, known.join(", "));
        }
        let tutor = self.env.store.profile().is_some_and(|p| p.is_tutor());
        if TUTOR_FIELDS.contains(&field) && !tutor {
            bail!("Only tutors can edit '{}'", field);
        }
        self.changed.insert(field.to_string(), value.to_string());
        Ok(())
    }

    #[cfg(test)]
    pub fn changed(&self) -> &BTreeMap<String, String> {
        &self.changed
    }

    /// The PATCH body for the fields edited so far
    pub fn patch(&self) -> ProfilePatch {
        let get = |field: &str| self.changed.get(field).cloned();
        ProfilePatch {
            firstname: get("firstname"),
            lastname: get("lastname"),
            email: get("email"),
            phone: get("phone"),
            bio: get("bio"),
            availability: get("availability"),
            tutoring: None,
        }
    }

    /// Send the changed fields. Returns false when nothing was sent.
    pub fn submit(&mut self) -> bool {
        if self.pending.is_some() {
            return false;
        }
        if self.env.store.profile().is_none() {
            self.env.store.alert("Sign in to edit your profile.");
            return false;
        }
        let patch = self.patch();
        if patch.is_empty() {
            self.env.store.inform("No changes to save.");
            return false;
        }

        let remote = self.env.remote.clone();
        self.pending = Some(Task::spawn(self.env.executor.as_ref(), move || {
            api::patch_profile(remote.as_ref(), &patch).map(|_| patch)
        }));
        true
    }

    pub fn poll(&mut self) {
        let result = self.pending.as_ref().and_then(|task| task.poll());
        if let Some(result) = result {
            self.finish(result);
        }
    }

    pub fn settle(&mut self, timeout: Duration) {
        let result = self.pending.as_ref().and_then(|task| task.wait(timeout));
        if let Some(result) = result {
            self.finish(result);
        }
    }

    fn finish(&mut self, result: Result<ProfilePatch, crate::remote::HttpError>) {
        self.pending = None;
        match result {
            Ok(patch) => {
                self.env.store.dispatch(Action::ProfileEdited(patch));
                self.changed.clear();
                self.env.store.inform("Profile updated.");
            }
            // Edits stay so the user can retry
            Err(err) => self.env.store.alert(err.to_string()),
        }
    }

    pub fn render(&mut self) -> Element {
        self.poll();
        match self.env.store.session() {
            Session::Unknown => Element::spinner(),
            Session::Anonymous => Element::container(vec![
                Element::notice("Sign in to edit your profile."),
                Element::link("signIn", "/signIn", vec![Element::text("Sign in")]),
            ]),
            Session::User(profile) => {
                let mut children = vec![Element::heading("Edit Profile")];
                for (field, label) in FIELDS.iter().filter(|(f, _)| shown_to(&profile, f)) {
                    let value = self
                        .changed
                        .get(*field)
                        .cloned()
                        .unwrap_or_else(|| current_value(&profile, field));
                    children.push(Element::input(field, label, &value));
                }
                children.push(Element::button("submit", "Update").disabled(self.pending.is_some()));
                Element::container(children)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::fixtures::{harness, profile};
    use crate::remote::Method;
    use crate::store::AlertLevel;
    use serde_json::json;

    #[test]
    fn test_unknown_profile_shows_spinner() {
        let h = harness();
        let mut page = ProfilePage::mount(&h.env);
        let ui = page.render();
        assert!(ui.find_by_class("loadingContainer").is_some());
        assert!(ui.find_by_title("firstname").is_none());
    }

    #[test]
    fn test_anonymous_prompts_sign_in() {
        let h = harness();
        h.env.store.dispatch(Action::SignedOut);
        let mut page = ProfilePage::mount(&h.env);
        let ui = page.render();
        assert!(ui.text_content().contains("Sign in to edit your profile."));
        assert!(!page.submit());
    }

    #[test]
    fn test_fields_seeded_from_profile() {
        let h = harness();
        let mut me = profile("alice");
        me.firstname = "Alice".to_string();
        me.rating = Some(4.0);
        me.availability = vec!["Monday".to_string(), "Friday".to_string()];
        h.env.store.dispatch(Action::SignedIn(me));

        let mut page = ProfilePage::mount(&h.env);
        let ui = page.render();
        assert_eq!(ui.find_by_title("firstname").unwrap().text.as_deref(), Some("Alice"));
        assert_eq!(
            ui.find_by_title("availability").unwrap().text.as_deref(),
            Some("Monday, Friday")
        );

        page.edit("firstname", "Ally").unwrap();
        let ui = page.render();
        assert_eq!(ui.find_by_title("firstname").unwrap().text.as_deref(), Some("Ally"));
        // Not merged into the shared profile before submit
        assert_eq!(h.env.store.profile().unwrap().firstname, "Alice");
    }

    #[test]
    fn test_unknown_field_rejected() {
        let h = harness();
        let mut page = ProfilePage::mount(&h.env);
        let err = page.edit("username", "root").unwrap_err();
        assert!(err.to_string().contains("Unknown field"));
        assert!(page.changed().is_empty());
    }

    #[test]
    fn test_plain_user_has_no_tutor_fields() {
        let h = harness();
        h.env.store.dispatch(Action::SignedIn(profile("bob")));
        let mut page = ProfilePage::mount(&h.env);

        let ui = page.render();
        for field in ["firstname", "lastname", "email", "phone"] {
            assert!(ui.find_by_title(field).is_some(), "missing {}", field);
        }
        assert!(ui.find_by_title("bio").is_none());
        assert!(ui.find_by_title("availability").is_none());

        let err = page.edit("bio", "Math tutor").unwrap_err();
        assert_eq!(err.to_string(), "Only tutors can edit 'bio'");
        assert!(page.edit("availability", "Monday").is_err());
        assert!(page.changed().is_empty());
        page.edit("phone", "555-0100").unwrap();
        assert_eq!(page.patch().bio, None);
    }

    #[test]
    fn test_tutor_edits_bio_and_availability() {
        let h = harness();
        let mut me = profile("alice");
        me.rating = Some(4.5);
        me.bio = "Loves graphs".to_string();
        h.env.store.dispatch(Action::SignedIn(me));
        h.remote.respond_always(json!({}));
        let mut page = ProfilePage::mount(&h.env);

        let ui = page.render();
        assert_eq!(ui.find_by_title("bio").unwrap().text.as_deref(), Some("Loves graphs"));
        assert!(ui.find_by_title("availability").is_some());

        page.edit("availability", "Monday, Friday").unwrap();
        assert!(page.submit());
        h.exec.run_all();
        page.render();

        let patches = h.remote.calls_to(Method::Patch, "/profile");
        assert_eq!(patches[0].body.as_deref(), Some(r#"{"availability":"Monday, Friday"}"#));
        assert_eq!(h.env.store.profile().unwrap().availability, vec!["Monday", "Friday"]);
    }

    #[test]
    fn test_submit_sends_only_changes_and_merges() {
        let h = harness();
        h.env.store.dispatch(Action::SignedIn(profile("alice")));
        h.remote.respond_always(json!({}));
        let mut page = ProfilePage::mount(&h.env);
        page.edit("email", "alice@example.com").unwrap();
        page.edit("phone", "555-0100").unwrap();

        assert!(page.submit());
        assert!(!page.submit());
        h.exec.run_all();
        page.render();

        let patches = h.remote.calls_to(Method::Patch, "/profile");
        assert_eq!(patches.len(), 1);
        assert_eq!(
            patches[0].body.as_deref(),
            Some(r#"{"email":"alice@example.com","phone":"555-0100"}"#)
        );
        let merged = h.env.store.profile().unwrap();
        assert_eq!(merged.email, "alice@example.com");
        assert_eq!(merged.phone, "555-0100");
        assert!(page.changed().is_empty());

        let alerts = h.env.store.take_alerts();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].level, AlertLevel::Info);
        assert_eq!(alerts[0].text, "Profile updated.");
    }

    #[test]
    fn test_submit_failure_alerts_and_keeps_edits() {
        let h = harness();
        let mut me = profile("alice");
        me.rating = Some(4.0);
        h.env.store.dispatch(Action::SignedIn(me));
        h.remote.fail_once(400, "json: cannot unmarshal number");
        let mut page = ProfilePage::mount(&h.env);
        page.edit("bio", "Math tutor").unwrap();

        assert!(page.submit());
        h.exec.run_all();
        page.render();

        let alerts = h.env.store.take_alerts();
        assert_eq!(alerts[0].level, AlertLevel::Error);
        assert_eq!(alerts[0].text, "Error 400: json: cannot unmarshal number");
        assert_eq!(page.changed().get("bio").map(String::as_str), Some("Math tutor"));
        assert_eq!(h.env.store.profile().unwrap().bio, "");
    }

    #[test]
    fn test_empty_submit_is_noop() {
        let h = harness();
        h.env.store.dispatch(Action::SignedIn(profile("alice")));
        let mut page = ProfilePage::mount(&h.env);
        assert!(!page.submit());
        assert_eq!(h.exec.pending(), 0);
        assert_eq!(h.env.store.take_alerts()[0].text, "No changes to save.");
    }
}
