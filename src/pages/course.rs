//! Course detail with its tutor roster, and the register/unregister toggle.
//!
//! The toggle is a command: PATCH `/profile`, wait for the answer, then
//! apply the smallest local change (roster entry in, or out) and tell the
//! store. Nothing is re-fetched. A failed PATCH raises an alert and leaves
//! the roster exactly as it was.

use super::PageEnv;
use crate::api;
use crate::filter::Filter;
use crate::loader::AsyncData;
use crate::model::{CourseDetail, Profile, Tutor};
use crate::remote::HttpError;
use crate::store::Action;
use crate::task::Task;
use crate::ui::Element;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affordance {
    Add,
    Remove,
}

impl Affordance {
    pub fn title(&self) -> &'static str {
        match self {
            Affordance::Add => "addbutton",
            Affordance::Remove => "removebutton",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Affordance::Add => "Become a Tutor",
            Affordance::Remove => "Stop Tutoring",
        }
    }

    /// The `action` flag sent to the backend
    fn action(&self) -> bool {
        matches!(self, Affordance::Add)
    }
}

/// Which toggle, if any, the current profile gets on this roster
pub fn affordance_for(detail: &CourseDetail, profile: Option<&Profile>) -> Option<Affordance> {
    let profile = profile?;
    if detail.tutors.iter().any(|t| t.username == profile.username) {
        Some(Affordance::Remove)
    } else {
        Some(Affordance::Add)
    }
}

/// Insert keeping username order; an existing entry wins
pub fn insert_tutor(tutors: &mut Vec<Tutor>, tutor: Tutor) -> bool {
    if tutors.iter().any(|t| t.username == tutor.username) {
        return false;
    }
    let at = tutors.partition_point(|t| t.username < tutor.username);
    tutors.insert(at, tutor);
    true
}

pub fn remove_tutor(tutors: &mut Vec<Tutor>, username: &str) -> bool {
    let before = tutors.len();
    tutors.retain(|t| t.username != username);
    tutors.len() != before
}

struct PendingToggle {
    action: bool,
    task: Task<()>,
}

pub struct CoursePage {
    code: String,
    env: PageEnv,
    detail: AsyncData<CourseDetail>,
    pending: Option<PendingToggle>,
    filter: Filter,
}

impl CoursePage {
    pub fn mount(env: &PageEnv, code: &str) -> Self {
        let remote = env.remote.clone();
        let key = code.to_string();
        Self {
            code: code.to_string(),
            env: env.clone(),
            detail: AsyncData::new(env.executor.clone(), move || {
                api::fetch_course(remote.as_ref(), &key)
            }),
            pending: None,
            filter: Filter::default(),
        }
    }

    #[cfg(test)]
    pub fn code(&self) -> &str {
        &self.code
    }

    #[cfg(test)]
    pub fn detail(&self) -> Option<&CourseDetail> {
        self.detail.data()
    }

    pub fn type_query(&mut self, text: &str) {
        self.filter.set(text);
    }

    pub fn affordance(&self) -> Option<Affordance> {
        let profile = self.env.store.profile();
        affordance_for(self.detail.data()?, profile.as_ref())
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Activate the rendered affordance with the given title, the way a
    /// user clicks a button. Returns false when no such button is enabled.
    pub fn click(&mut self, title: &str) -> bool {
        self.poll();
        match self.affordance() {
            Some(affordance) if affordance.title() == title => self.activate(affordance),
            _ => false,
        }
    }

    fn activate(&mut self, affordance: Affordance) -> bool {
        if self.pending.is_some() {
            return false;
        }
        let remote = self.env.remote.clone();
        let code = self.code.clone();
        let action = affordance.action();
        let task = Task::spawn(self.env.executor.as_ref(), move || {
            api::set_tutoring(remote.as_ref(), &code, action)
        });
        self.pending = Some(PendingToggle { action, task });
        true
    }

    pub fn poll(&mut self) {
        self.detail.poll();
        let result = self.pending.as_ref().and_then(|p| p.task.poll());
        if let Some(result) = result {
            self.finish_toggle(result);
        }
    }

    pub fn settle(&mut self, timeout: Duration) {
        if !self.detail.is_settled() {
            self.detail.wait(timeout);
        }
        let result = self.pending.as_ref().and_then(|p| p.task.wait(timeout));
        if let Some(result) = result {
            self.finish_toggle(result);
        }
    }

    fn finish_toggle(&mut self, result: Result<(), HttpError>) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        if let Err(err) = result {
            self.env.store.alert(err.to_string());
            return;
        }

        let Some(profile) = self.env.store.profile() else {
            return;
        };
        let Some(detail) = self.detail.data_mut() else {
            return;
        };
        if pending.action {
            insert_tutor(&mut detail.tutors, Tutor::from(&profile));
        } else {
            remove_tutor(&mut detail.tutors, &profile.username);
        }
        let course = detail.course.clone();
        self.env.store.dispatch(Action::TutoringChanged {
            course,
            action: pending.action,
        });
    }

    pub fn render(&mut self) -> Element {
        self.poll();
        let profile = self.env.store.profile();
        let pending = self.pending.is_some();
        let filter = &self.filter;
        self.detail
            .render(|detail| view(detail, profile.as_ref(), pending, filter))
    }
}

fn tutor_item(tutor: &Tutor) -> Element {
    let availability = if tutor.availability.is_empty() {
        "No availability listed".to_string()
    } else {
        tutor.availability.join(", ")
    };
    Element::link(
        &tutor.username,
        &format!("/tutors/{}", tutor.username),
        vec![
            Element::text(tutor.display_name()),
            Element::text(format!("Rating: {:.1}", tutor.rating)),
            Element::text(availability),
        ],
    )
}

fn view(detail: &CourseDetail, profile: Option<&Profile>, pending: bool, filter: &Filter) -> Element {
    let roster = if detail.tutors.is_empty() {
        vec![Element::text("No Tutors Available")]
    } else {
        let shown = filter.apply(&detail.tutors);
        if shown.is_empty() {
            vec![Element::text(format!("No tutors match \"{}\"", filter.original))]
        } else {
            shown.into_iter().map(tutor_item).collect()
        }
    };

    let mut children = vec![
        Element::heading(detail.course.code.to_uppercase()),
        Element::text(&detail.course.name).with_title("coursename"),
    ];
    if let Some(affordance) = affordance_for(detail, profile) {
        children.push(Element::button(affordance.title(), affordance.label()).disabled(pending));
    }
    if !detail.tutors.is_empty() {
        children.push(Element::input("TutorSearch", "Search Tutors", &filter.original));
    }
    children.push(Element::heading("Tutors"));
    children.push(Element::list("tutorlist", roster));

    Element::container(children).with_class("Course")
}
