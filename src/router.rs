//! Route table and the page mounted for each route.

use crate::api::valid_segment;
use crate::pages::auth::{AuthMode, AuthPage};
use crate::pages::course::CoursePage;
use crate::pages::courses::CoursesPage;
use crate::pages::profile::ProfilePage;
use crate::pages::tutor::TutorPage;
use crate::pages::{self, PageEnv};
use crate::ui::Element;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Landing,
    Courses,
    Course(String),
    SignUp,
    SignIn,
    Profile,
    Tutor(String),
    NotFound(String),
}

impl Route {
    pub fn parse(path: &str) -> Self {
        let trimmed = path.trim();
        let trimmed = trimmed.strip_suffix('/').filter(|p| !p.is_empty()).unwrap_or(trimmed);
        let segments: Vec<&str> = trimmed.trim_start_matches('/').split('/').collect();

        match segments.as_slice() {
            [""] => Route::Landing,
            ["courses"] => Route::Courses,
            ["courses", code] if valid_segment(code) => Route::Course(code.to_string()),
            ["signUp"] => Route::SignUp,
            ["signIn"] => Route::SignIn,
            ["profile"] => Route::Profile,
            ["tutors", username] if valid_segment(username) => Route::Tutor(username.to_string()),
            _ => Route::NotFound(path.trim().to_string()),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Landing => "/".to_string(),
            Route::Courses => "/courses".to_string(),
            Route::Course(code) => format!("/courses/{}", code),
            Route::SignUp => "/signUp".to_string(),
            Route::SignIn => "/signIn".to_string(),
            Route::Profile => "/profile".to_string(),
            Route::Tutor(username) => format!("/tutors/{}", username),
            Route::NotFound(path) => path.clone(),
        }
    }
}

/// The view currently mounted. Replacing it unmounts the old one.
pub enum Page {
    Landing,
    Courses(CoursesPage),
    Course(CoursePage),
    Tutor(TutorPage),
    Profile(ProfilePage),
    Auth(AuthPage),
    NotFound(String),
}

impl Page {
    pub fn mount(route: &Route, env: &PageEnv) -> Self {
        match route {
            Route::Landing => Page::Landing,
            Route::Courses => Page::Courses(CoursesPage::mount(env)),
            Route::Course(code) => Page::Course(CoursePage::mount(env, code)),
            Route::Tutor(username) => Page::Tutor(TutorPage::mount(env, username)),
            Route::Profile => Page::Profile(ProfilePage::mount(env)),
            Route::SignIn => Page::Auth(AuthPage::mount(env, AuthMode::SignIn)),
            Route::SignUp => Page::Auth(AuthPage::mount(env, AuthMode::SignUp)),
            Route::NotFound(path) => Page::NotFound(path.clone()),
        }
    }

    pub fn render(&mut self) -> Element {
        match self {
            Page::Landing => pages::landing(),
            Page::Courses(page) => page.render(),
            Page::Course(page) => page.render(),
            Page::Tutor(page) => page.render(),
            Page::Profile(page) => page.render(),
            Page::Auth(page) => page.render(),
            Page::NotFound(path) => pages::not_found(path),
        }
    }

    pub fn poll(&mut self) {
        match self {
            Page::Courses(page) => page.poll(),
            Page::Course(page) => page.poll(),
            Page::Tutor(page) => page.poll(),
            Page::Profile(page) => page.poll(),
            Page::Auth(page) => page.poll(),
            Page::Landing | Page::NotFound(_) => {}
        }
    }

    /// Wait (bounded) for whatever the page has in flight
    pub fn settle(&mut self, timeout: Duration) {
        match self {
            Page::Courses(page) => page.settle(timeout),
            Page::Course(page) => page.settle(timeout),
            Page::Tutor(page) => page.settle(timeout),
            Page::Profile(page) => page.settle(timeout),
            Page::Auth(page) => page.settle(timeout),
            Page::Landing | Page::NotFound(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::fixtures::harness;

    #[test]
    fn test_parse_routes() {
        assert_eq!(Route::parse("/"), Route::Landing);
        assert_eq!(Route::parse(""), Route::Landing);
        assert_eq!(Route::parse("/courses"), Route::Courses);
        assert_eq!(Route::parse("/courses/"), Route::Courses);
        assert_eq!(Route::parse("courses"), Route::Courses);
        assert_eq!(
            Route::parse("/courses/cop-3502"),
            Route::Course("cop-3502".to_string())
        );
        assert_eq!(Route::parse("/signUp"), Route::SignUp);
        assert_eq!(Route::parse("/signIn"), Route::SignIn);
        assert_eq!(Route::parse("/profile"), Route::Profile);
        assert_eq!(Route::parse("/tutors/alice"), Route::Tutor("alice".to_string()));
    }

    #[test]
    fn test_wildcard() {
        assert_eq!(Route::parse("/signup"), Route::NotFound("/signup".to_string()));
        assert_eq!(
            Route::parse("/courses/a/b"),
            Route::NotFound("/courses/a/b".to_string())
        );
        assert_eq!(
            Route::parse("/tutors/a b"),
            Route::NotFound("/tutors/a b".to_string())
        );
    }

    #[test]
    fn test_path_roundtrip() {
        for path in ["/", "/courses", "/courses/cop-3502", "/signUp", "/signIn", "/profile", "/tutors/bob"] {
            assert_eq!(Route::parse(path).path(), path);
        }
    }

    #[test]
    fn test_mount_and_render() {
        let h = harness();
        let mut landing = Page::mount(&Route::Landing, &h.env);
        assert!(landing.render().find_by_title("nav").is_some());

        let mut missing = Page::mount(&Route::parse("/nowhere"), &h.env);
        let ui = missing.render();
        assert!(ui.find_by_class("errorPage").is_some());
        assert!(ui.text_content().contains("/nowhere"));

        let mut courses = Page::mount(&Route::Courses, &h.env);
        assert!(courses.render().find_by_class("loadingContainer").is_some());
        assert_eq!(h.exec.pending(), 1);

        // Navigating away while loading unmounts without trouble
        drop(courses);
        h.exec.run_all();
    }
}
