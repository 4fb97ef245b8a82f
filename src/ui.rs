//! Virtual element tree.
//!
//! Views render to [`Element`] trees instead of a DOM. Elements carry the
//! `title`/`class` attributes tests query by, and the REPL prints them with
//! [`Element::render_text`].

use crate::remote::HttpError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Container,
    Heading,
    Text,
    Spinner,
    Error,
    Notice,
    Input,
    Button,
    Link,
    List,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub kind: Kind,
    pub title: Option<String>,
    pub class: Option<String>,
    /// Identity within a list
    pub key: Option<String>,
    pub text: Option<String>,
    /// Route a link navigates to
    pub href: Option<String>,
    pub disabled: bool,
    pub children: Vec<Element>,
}

impl Element {
    fn new(kind: Kind) -> Self {
        Self {
            kind,
            title: None,
            class: None,
            key: None,
            text: None,
            href: None,
            disabled: false,
            children: Vec::new(),
        }
    }

    pub fn container(children: Vec<Element>) -> Self {
        Self {
            children,
            ..Self::new(Kind::Container)
        }
    }

    pub fn heading(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::new(Kind::Heading)
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::new(Kind::Text)
        }
    }

    pub fn notice(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::new(Kind::Notice)
        }
    }

    pub fn spinner() -> Self {
        Self {
            class: Some("loadingContainer".to_string()),
            text: Some("Loading...".to_string()),
            ..Self::new(Kind::Spinner)
        }
    }

    pub fn error(err: &HttpError) -> Self {
        Self {
            class: Some("errorContainer".to_string()),
            text: Some(err.to_string()),
            ..Self::new(Kind::Error)
        }
    }

    pub fn input(title: &str, label: &str, value: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            key: Some(label.to_string()),
            text: Some(value.to_string()),
            ..Self::new(Kind::Input)
        }
    }

    pub fn button(title: &str, label: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            text: Some(label.to_string()),
            ..Self::new(Kind::Button)
        }
    }

    pub fn link(key: &str, href: &str, children: Vec<Element>) -> Self {
        Self {
            key: Some(key.to_string()),
            href: Some(href.to_string()),
            children,
            ..Self::new(Kind::Link)
        }
    }

    pub fn list(title: &str, items: Vec<Element>) -> Self {
        Self {
            title: Some(title.to_string()),
            children: items,
            ..Self::new(Kind::List)
        }
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.class = Some(class.to_string());
        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Depth-first search including `self`
    pub fn find(&self, pred: &dyn Fn(&Element) -> bool) -> Option<&Element> {
        if pred(self) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(pred))
    }

    #[cfg(test)]
    pub fn find_all<'a>(&'a self, pred: &dyn Fn(&Element) -> bool, out: &mut Vec<&'a Element>) {
        if pred(self) {
            out.push(self);
        }
        for child in &self.children {
            child.find_all(pred, out);
        }
    }

    #[cfg(test)]
    pub fn find_by_title(&self, title: &str) -> Option<&Element> {
        self.find(&|e: &Element| e.title.as_deref() == Some(title))
    }

    #[cfg(test)]
    pub fn find_by_class(&self, class: &str) -> Option<&Element> {
        self.find(&|e: &Element| e.class.as_deref() == Some(class))
    }

    #[cfg(test)]
    pub fn has_kind(&self, kind: Kind) -> bool {
        self.find(&|e: &Element| e.kind == kind).is_some()
    }

    /// Concatenated text of this element and all descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let Some(text) = &self.text {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(text);
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }

    /// Keys that occur more than once among this element's direct children
    #[cfg(test)]
    pub fn duplicate_keys(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut dups = Vec::new();
        for key in self.children.iter().filter_map(|c| c.key.as_deref()) {
            if !seen.insert(key) && !dups.iter().any(|d| d == key) {
                dups.push(key.to_string());
            }
        }
        dups
    }

    /// Plain-text rendering for the terminal
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        self.write_text(0, &mut out);
        out
    }

    fn write_text(&self, depth: usize, out: &mut String) {
        let indent = "  ".repeat(depth);
        let text = self.text.as_deref().unwrap_or("");
        let line = match self.kind {
            Kind::Container => None,
            Kind::Heading => Some(format!("== {} ==", text)),
            Kind::Text => Some(text.to_string()),
            Kind::Spinner => Some(format!("... {}", text)),
            Kind::Error => Some(format!("!! {}", text)),
            Kind::Notice => Some(format!("** {}", text)),
            Kind::Input => Some(format!(
                "[{}: {}]",
                self.key.as_deref().unwrap_or("input"),
                text
            )),
            Kind::Button => Some(format!(
                "<{}>{}",
                text,
                if self.disabled { " (pending)" } else { "" }
            )),
            Kind::Link => {
                let label: Vec<String> = self
                    .children
                    .iter()
                    .map(|c| c.text_content())
                    .filter(|t| !t.is_empty())
                    .collect();
                out.push_str(&format!(
                    "{}- {}  -> {}\n",
                    indent,
                    label.join(" | "),
                    self.href.as_deref().unwrap_or("")
                ));
                return;
            }
            Kind::List => None,
        };

        let child_depth = match line {
            Some(line) => {
                out.push_str(&indent);
                out.push_str(&line);
                out.push('\n');
                depth + 1
            }
            None => depth,
        };
        for child in &self.children {
            child.write_text(child_depth, out);
        }
    }
}
