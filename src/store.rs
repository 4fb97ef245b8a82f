//! Application state shared by every view.
//!
//! The current profile lives here and nowhere else. Views read it through a
//! cloned [`Store`] handle and change it only with [`Store::dispatch`].

use crate::model::{CourseRef, Profile, ProfilePatch};
use std::cell::RefCell;
use std::rc::Rc;

/// Who is using the client
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Session {
    /// The session check has not answered yet
    #[default]
    Unknown,
    Anonymous,
    User(Profile),
}

impl Session {
    pub fn profile(&self) -> Option<&Profile> {
        match self {
            Session::User(profile) => Some(profile),
            _ => None,
        }
    }
}

/// Every way the shared state can change
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SignedIn(Profile),
    SignedOut,
    ProfileEdited(ProfilePatch),
    TutoringChanged { course: CourseRef, action: bool },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::SignedIn(_) => "signed_in",
            Action::SignedOut => "signed_out",
            Action::ProfileEdited(_) => "profile_edited",
            Action::TutoringChanged { .. } => "tutoring_changed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub level: AlertLevel,
    pub text: String,
}

#[derive(Debug, Default)]
pub struct AppState {
    pub session: Session,
    alerts: Vec<Alert>,
}

/// Pure state transition for one action
pub fn reduce(session: &mut Session, action: &Action) {
    match action {
        Action::SignedIn(profile) => *session = Session::User(profile.clone()),
        Action::SignedOut => *session = Session::Anonymous,
        Action::ProfileEdited(patch) => {
            if let Session::User(profile) = session {
                profile.apply(patch);
            }
        }
        Action::TutoringChanged { course, action } => {
            if let Session::User(profile) = session {
                profile.apply_tutoring(course, *action);
            }
        }
    }
}

type Listener = Box<dyn Fn(&Action)>;

/// Cheap, cloneable handle on the application state
#[derive(Clone, Default)]
pub struct Store {
    state: Rc<RefCell<AppState>>,
    listeners: Rc<RefCell<Vec<Listener>>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Session {
        self.state.borrow().session.clone()
    }

    pub fn profile(&self) -> Option<Profile> {
        self.state.borrow().session.profile().cloned()
    }

    /// The single mutation entry point
    pub fn dispatch(&self, action: Action) {
        reduce(&mut self.state.borrow_mut().session, &action);
        for listener in self.listeners.borrow().iter() {
            listener(&action);
        }
    }

    /// Observe every dispatched action after it was applied
    pub fn subscribe(&self, listener: impl Fn(&Action) + 'static) {
        self.listeners.borrow_mut().push(Box::new(listener));
    }

    /// Blocking user-facing message, shown by the shell after the command
    pub fn alert(&self, text: impl Into<String>) {
        self.push_alert(AlertLevel::Error, text.into());
    }

    pub fn inform(&self, text: impl Into<String>) {
        self.push_alert(AlertLevel::Info, text.into());
    }

    fn push_alert(&self, level: AlertLevel, text: String) {
        self.state.borrow_mut().alerts.push(Alert { level, text });
    }

    pub fn take_alerts(&self) -> Vec<Alert> {
        std::mem::take(&mut self.state.borrow_mut().alerts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Course;
    use std::cell::Cell;

    fn alice() -> Profile {
        Profile {
            username: "alice".to_string(),
            ..Profile::default()
        }
    }

    #[test]
    fn test_sign_in_and_out() {
        let store = Store::new();
        assert_eq!(store.session(), Session::Unknown);
        assert!(store.profile().is_none());

        store.dispatch(Action::SignedIn(alice()));
        assert_eq!(store.profile().unwrap().username, "alice");

        store.dispatch(Action::SignedOut);
        assert_eq!(store.session(), Session::Anonymous);
    }

    #[test]
    fn test_edits_ignored_without_user() {
        let mut session = Session::Anonymous;
        reduce(&mut session, &Action::ProfileEdited(ProfilePatch::default()));
        reduce(
            &mut session,
            &Action::TutoringChanged {
                course: Course::default(),
                action: true,
            },
        );
        assert_eq!(session, Session::Anonymous);
    }

    #[test]
    fn test_tutoring_changed_updates_profile() {
        let store = Store::new();
        store.dispatch(Action::SignedIn(alice()));
        let course = Course {
            code: "cop-3502".to_string(),
            name: "Programming Fundamentals 1".to_string(),
        };
        store.dispatch(Action::TutoringChanged {
            course: course.clone(),
            action: true,
        });
        assert!(store.profile().unwrap().is_tutoring("cop-3502"));

        store.dispatch(Action::TutoringChanged {
            course,
            action: false,
        });
        assert!(!store.profile().unwrap().is_tutoring("cop-3502"));
    }

    #[test]
    fn test_listeners_see_applied_state() {
        let store = Store::new();
        let seen = Rc::new(Cell::new(0));
        let counter = seen.clone();
        let observer = store.clone();
        store.subscribe(move |action| {
            assert_eq!(action.name(), "signed_in");
            assert!(observer.profile().is_some());
            counter.set(counter.get() + 1);
        });
        store.dispatch(Action::SignedIn(alice()));
        assert_eq!(seen.get(), 1);
    }

    #[test]
    fn test_alerts_drain() {
        let store = Store::new();
        store.alert("Error 500: boom");
        store.inform("Profile updated.");
        let alerts = store.take_alerts();
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].level, AlertLevel::Error);
        assert_eq!(alerts[1].text, "Profile updated.");
        assert!(store.take_alerts().is_empty());
    }
}
