//! Public page of one tutor and the courses they teach.

use super::PageEnv;
use crate::api;
use crate::loader::AsyncData;
use crate::model::TutorDetail;
use crate::ui::Element;
use std::time::Duration;

pub struct TutorPage {
    data: AsyncData<TutorDetail>,
}

impl TutorPage {
    pub fn mount(env: &PageEnv, username: &str) -> Self {
        let remote = env.remote.clone();
        let username = username.to_string();
        Self {
            data: AsyncData::new(env.executor.clone(), move || {
                api::fetch_tutor(remote.as_ref(), &username)
            }),
        }
    }

    pub fn render(&mut self) -> Element {
        self.data.render(view)
    }

    pub fn poll(&mut self) {
        self.data.poll();
    }

    pub fn settle(&mut self, timeout: Duration) {
        if !self.data.is_settled() {
            self.data.wait(timeout);
        }
    }
}

fn view(detail: &TutorDetail) -> Element {
    let tutor = &detail.tutor;
    let mut children = vec![
        Element::heading(tutor.display_name()),
        Element::text(format!("@{}", tutor.username)),
        Element::text(format!("Rating: {:.1}", tutor.rating)),
    ];
    if !tutor.bio.is_empty() {
        children.push(Element::text(&tutor.bio).with_title("bio"));
    }
    for (label, value) in [("Email", &tutor.email), ("Phone", &tutor.phone)] {
        if !value.is_empty() {
            children.push(Element::text(format!("{}: {}", label, value)));
        }
    }
    if !tutor.availability.is_empty() {
        children.push(
            Element::text(format!("Available: {}", tutor.availability.join(", ")))
                .with_title("availability"),
        );
    }

    let courses = if detail.courses.is_empty() {
        vec![Element::text("Not tutoring any courses")]
    } else {
        detail
            .courses
            .iter()
            .map(|c| {
                Element::link(
                    &c.code,
                    &format!("/courses/{}", c.code),
                    vec![Element::text(c.code.to_uppercase()), Element::text(&c.name)],
                )
            })
            .collect()
    };
    children.push(Element::heading("Courses"));
    children.push(Element::list("courselist", courses));

    Element::container(children).with_class("Tutor")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::fixtures::harness;
    use serde_json::json;

    #[test]
    fn test_tutor_detail() {
        let h = harness();
        h.remote.respond_once(json!({
            "tutor": {
                "username": "jdoe",
                "firstname": "John",
                "lastname": "Doe",
                "email": "JohnDoe@gmail.com",
                "rating": 3.0,
                "bio": "",
                "availability": ["Monday", "Tuesday"]
            },
            "courses": [
                { "code": "cop-3502", "name": "Programming Fundamentals 1" },
                { "code": "cnt-4007", "name": "Computer Network Fundamentals" }
            ]
        }));
        let mut page = TutorPage::mount(&h.env, "jdoe");
        assert!(page.render().find_by_class("loadingContainer").is_some());
        h.exec.run_all();

        let ui = page.render();
        assert_eq!(h.remote.calls()[0].path, "/tutors/jdoe");
        assert!(ui.text_content().starts_with("John Doe @jdoe Rating: 3.0"));
        assert!(ui.find_by_title("bio").is_none());
        assert_eq!(
            ui.find_by_title("availability").unwrap().text_content(),
            "Available: Monday, Tuesday"
        );
        assert_eq!(ui.find_by_title("courselist").unwrap().children.len(), 2);
    }

    #[test]
    fn test_tutor_without_courses() {
        let h = harness();
        h.remote.respond_once(json!({ "tutor": { "username": "solo" }, "courses": [] }));
        let mut page = TutorPage::mount(&h.env, "solo");
        page.render();
        h.exec.run_all();
        let ui = page.render();
        assert_eq!(
            ui.find_by_title("courselist").unwrap().text_content(),
            "Not tutoring any courses"
        );
    }

    #[test]
    fn test_unknown_tutor() {
        let h = harness();
        h.remote.fail_once(404, "Tutor ghost not found.");
        let mut page = TutorPage::mount(&h.env, "ghost");
        page.render();
        h.exec.run_all();
        assert_eq!(page.render().text_content(), "Error 404: Tutor ghost not found.");
    }
}
