//! Navigation history and the commands typed at the prompt.

use crate::model::Profile;
use crate::pages::auth::{self, AuthMode};
use crate::pages::course::Affordance;
use crate::pages::PageEnv;
use crate::router::{Page, Route};
use crate::store::Session;
use crate::task::Task;
use crate::ui::{Element, Kind};
use anyhow::{bail, Context, Result};
use std::time::Duration;

/// One line typed at the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Open(String),
    Follow(String),
    Back,
    Reload,
    Search(String),
    Add,
    Remove,
    Edit { field: String, value: String },
    Submit,
    SignIn { username: String, password: String },
    SignUp { username: String, password: String },
    SignOut,
    WhoAmI,
}

pub const USAGE: &[(&str, &str)] = &[
    ("open", "open <path>"),
    ("follow", "follow <key>"),
    ("back", "back"),
    ("reload", "reload"),
    ("search", "search [text]"),
    ("add", "add"),
    ("remove", "remove"),
    ("edit", "edit <field> <value>"),
    ("submit", "submit"),
    ("signin", "signin <username> <password>"),
    ("signup", "signup <username> <password>"),
    ("signout", "signout"),
    ("whoami", "whoami"),
];

impl Command {
    pub fn parse(line: &str) -> Result<Self> {
        let words = shell_words::split(line).context("Could not split command")?;
        let Some((name, rest)) = words.split_first() else {
            bail!("Empty command");
        };

        let command = match (name.as_str(), rest) {
            ("open", [path]) => Command::Open(path.clone()),
            ("follow", [key]) => Command::Follow(key.clone()),
            ("back", []) => Command::Back,
            ("reload", []) => Command::Reload,
            // No text clears the query
            ("search", text) => Command::Search(text.join(" ")),
            ("add", []) => Command::Add,
            ("remove", []) => Command::Remove,
            ("edit", [field, value @ ..]) => Command::Edit {
                field: field.clone(),
                value: value.join(" "),
            },
            ("submit", []) => Command::Submit,
            ("signin", [username, password]) => Command::SignIn {
                username: username.clone(),
                password: password.clone(),
            },
            ("signup", [username, password]) => Command::SignUp {
                username: username.clone(),
                password: password.clone(),
            },
            ("signout", []) => Command::SignOut,
            ("whoami", []) => Command::WhoAmI,
            (name, _) => match USAGE.iter().find(|(known, _)| *known == name) {
                Some((_, usage)) => bail!("Usage: {}", usage),
                None => bail!("Unknown command '{}'. Type /help for commands.", name),
            },
        };
        Ok(command)
    }
}

pub struct App {
    env: PageEnv,
    route: Route,
    page: Page,
    history: Vec<Route>,
    session_check: Option<Task<Option<Profile>>>,
    signing_out: Option<Task<()>>,
}

impl App {
    /// Mount `start` and ask the backend who we are
    pub fn new(env: PageEnv, start: &str) -> Self {
        let route = Route::parse(start);
        let page = Page::mount(&route, &env);
        let session_check = Some(auth::check_session(&env));
        Self {
            env,
            route,
            page,
            history: Vec::new(),
            session_check,
            signing_out: None,
        }
    }

    pub fn env(&self) -> &PageEnv {
        &self.env
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Mount the page for `path`. The previous page is unmounted.
    pub fn navigate(&mut self, path: &str) -> &Route {
        let route = Route::parse(path);
        let previous = std::mem::replace(&mut self.route, route);
        self.history.push(previous);
        self.page = Page::mount(&self.route, &self.env);
        &self.route
    }

    pub fn back(&mut self) -> bool {
        let Some(route) = self.history.pop() else {
            return false;
        };
        self.route = route;
        self.page = Page::mount(&self.route, &self.env);
        true
    }

    /// Remount the current route, fetching everything again
    pub fn reload(&mut self) {
        self.page = Page::mount(&self.route, &self.env);
    }

    /// Navigate to the target of the rendered link with the given key
    pub fn follow(&mut self, key: &str) -> bool {
        let ui = self.render();
        let href = ui
            .find(&|e: &Element| e.kind == Kind::Link && e.key.as_deref() == Some(key))
            .and_then(|link| link.href.clone());
        match href {
            Some(href) => {
                self.navigate(&href);
                true
            }
            None => false,
        }
    }

    /// Run one command. Returns text to show the user, if any.
    pub fn execute(&mut self, command: Command) -> Result<Option<String>> {
        match command {
            Command::Open(path) => {
                self.navigate(&path);
            }
            Command::Follow(key) => {
                if !self.follow(&key) {
                    bail!("No link '{}' on this page", key);
                }
            }
            Command::Back => {
                if !self.back() {
                    bail!("No earlier page");
                }
            }
            Command::Reload => self.reload(),
            Command::Search(text) => match &mut self.page {
                Page::Courses(page) => page.type_query(&text),
                Page::Course(page) => page.type_query(&text),
                _ => bail!("Nothing to search on this page"),
            },
            Command::Add => self.toggle(Affordance::Add)?,
            Command::Remove => self.toggle(Affordance::Remove)?,
            Command::Edit { field, value } => match &mut self.page {
                Page::Profile(page) => page.edit(&field, &value)?,
                _ => bail!("Open /profile to edit your profile"),
            },
            Command::Submit => match &mut self.page {
                Page::Profile(page) => {
                    page.submit();
                }
                Page::Auth(page) => {
                    page.submit();
                }
                _ => bail!("Nothing to submit on this page"),
            },
            Command::SignIn { username, password } => {
                self.authenticate(AuthMode::SignIn, &username, &password)
            }
            Command::SignUp { username, password } => {
                self.authenticate(AuthMode::SignUp, &username, &password)
            }
            Command::SignOut => {
                if self.signing_out.is_some() {
                    bail!("Already signing out");
                }
                if self.env.store.profile().is_none() {
                    return Ok(Some("Not signed in.".to_string()));
                }
                self.signing_out = Some(auth::sign_out(&self.env));
            }
            Command::WhoAmI => {
                self.poll();
                let text = match self.env.store.session() {
                    Session::Unknown => "Checking session...".to_string(),
                    Session::Anonymous => "Not signed in.".to_string(),
                    Session::User(profile) => {
                        format!("{} (@{})", profile.display_name(), profile.username)
                    }
                };
                return Ok(Some(text));
            }
        }
        Ok(None)
    }

    fn toggle(&mut self, affordance: Affordance) -> Result<()> {
        let Page::Course(page) = &mut self.page else {
            bail!("Open a course to change tutoring");
        };
        if page.is_pending() {
            bail!("Still waiting for the last change");
        }
        if !page.click(affordance.title()) {
            bail!("No '{}' button on this page", affordance.label());
        }
        Ok(())
    }

    fn authenticate(&mut self, mode: AuthMode, username: &str, password: &str) {
        let on_form = matches!(&self.page, Page::Auth(page) if page.mode() == mode);
        if !on_form {
            let path = match mode {
                AuthMode::SignIn => "/signIn",
                AuthMode::SignUp => "/signUp",
            };
            self.navigate(path);
        }
        if let Page::Auth(page) = &mut self.page {
            page.fill(username, password);
            page.submit();
        }
    }

    /// Drain whatever finished without blocking
    pub fn poll(&mut self) {
        let checked = self.session_check.as_ref().and_then(|task| task.poll());
        if let Some(result) = checked {
            self.session_check = None;
            auth::finish_session_check(&self.env, result);
        }
        let signed_out = self.signing_out.as_ref().and_then(|task| task.poll());
        if let Some(result) = signed_out {
            self.signing_out = None;
            auth::finish_sign_out(&self.env, result);
        }
        self.page.poll();
    }

    /// Block (bounded by `timeout` per task) until in-flight work lands
    pub fn settle(&mut self, timeout: Duration) {
        let checked = self.session_check.as_ref().and_then(|task| task.wait(timeout));
        if let Some(result) = checked {
            self.session_check = None;
            auth::finish_session_check(&self.env, result);
        }
        let signed_out = self.signing_out.as_ref().and_then(|task| task.wait(timeout));
        if let Some(result) = signed_out {
            self.signing_out = None;
            auth::finish_sign_out(&self.env, result);
        }
        self.page.settle(timeout);
    }

    pub fn render(&mut self) -> Element {
        self.poll();
        self.page.render()
    }
}
