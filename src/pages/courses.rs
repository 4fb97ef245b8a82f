//! Course catalogue with a search box.

use super::PageEnv;
use crate::api;
use crate::filter::Filter;
use crate::loader::AsyncData;
use crate::model::CoursesEnvelope;
use crate::ui::Element;
use std::time::Duration;

pub struct CoursesPage {
    data: AsyncData<CoursesEnvelope>,
    filter: Filter,
}

impl CoursesPage {
    pub fn mount(env: &PageEnv) -> Self {
        let remote = env.remote.clone();
        Self {
            data: AsyncData::new(env.executor.clone(), move || {
                api::fetch_courses(remote.as_ref())
            }),
            filter: Filter::default(),
        }
    }

    /// One keystroke's worth of search input
    pub fn type_query(&mut self, text: &str) {
        self.filter.set(text);
    }

    #[cfg(test)]
    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn render(&mut self) -> Element {
        let filter = &self.filter;
        self.data.render(|data| view(data, filter))
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

fn view(data: &CoursesEnvelope, filter: &Filter) -> Element {
    let links = filter
        .apply(&data.courses)
        .into_iter()
        .map(|c| {
            Element::link(
                &c.code,
                &format!("/courses/{}", c.code),
                vec![Element::text(c.code.to_uppercase()), Element::text(&c.name)],
            )
        })
        .collect();

    Element::container(vec![
        Element::heading("Courses"),
        Element::input("SearchBar", "Search Courses", &filter.original),
        Element::list("buttonStack", links),
    ])
    .with_class("Courses")
}
