//! Sign-in and sign-up forms, and the session check they finish with.

use super::PageEnv;
use crate::api;
use crate::model::{Credentials, Profile};
use crate::remote::{HttpError, RemoteCall};
use crate::store::Action;
use crate::task::Task;
use crate::ui::Element;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    SignIn,
    SignUp,
}

impl AuthMode {
    fn heading(&self) -> &'static str {
        match self {
            AuthMode::SignIn => "Sign In",
            AuthMode::SignUp => "Sign Up",
        }
    }
}

/// Authenticate, then load the profile the new session belongs to
fn authenticate(
    remote: &dyn RemoteCall,
    mode: AuthMode,
    credentials: &Credentials,
) -> Result<Profile, HttpError> {
    match mode {
        AuthMode::SignIn => api::sign_in(remote, credentials)?,
        AuthMode::SignUp => api::sign_up(remote, credentials)?,
    }
    api::fetch_session(remote)?
        .ok_or_else(|| HttpError::unexpected("Signed in but no profile was returned"))
}

pub struct AuthPage {
    mode: AuthMode,
    env: PageEnv,
    username: String,
    password: String,
    pending: Option<Task<Profile>>,
}

impl AuthPage {
    pub fn mount(env: &PageEnv, mode: AuthMode) -> Self {
        Self {
            mode,
            env: env.clone(),
            username: String::new(),
            password: String::new(),
            pending: None,
        }
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn fill(&mut self, username: &str, password: &str) {
        self.username = username.to_string();
        self.password = password.to_string();
    }

    pub fn submit(&mut self) -> bool {
        if self.pending.is_some() {
            return false;
        }
        if self.username.is_empty() || self.password.is_empty() {
            self.env.store.alert("Username and password are required.");
            return false;
        }
        let remote = self.env.remote.clone();
        let mode = self.mode;
        let credentials = Credentials {
            username: self.username.clone(),
            password: self.password.clone(),
        };
        self.pending = Some(Task::spawn(self.env.executor.as_ref(), move || {
            authenticate(remote.as_ref(), mode, &credentials)
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

    fn finish(&mut self, result: Result<Profile, HttpError>) {
        self.pending = None;
        self.password.clear();
        match result {
            Ok(profile) => {
                let name = profile.username.clone();
                self.env.store.dispatch(Action::SignedIn(profile));
                self.env.store.inform(format!("Signed in as {}.", name));
            }
            Err(err) => self.env.store.alert(err.to_string()),
        }
    }

    pub fn render(&mut self) -> Element {
        self.poll();
        let masked = "*".repeat(self.password.chars().count());
        let other = match self.mode {
            AuthMode::SignIn => Element::link("signUp", "/signUp", vec![Element::text("Need an account? Sign up")]),
            AuthMode::SignUp => Element::link("signIn", "/signIn", vec![Element::text("Have an account? Sign in")]),
        };
        let mut children = vec![Element::heading(self.mode.heading())];
        if let Some(profile) = self.env.store.profile() {
            children.push(Element::notice(format!("Signed in as {}.", profile.username)));
        }
        children.push(Element::input("username", "Username", &self.username));
        children.push(Element::input("password", "Password", &masked));
        children.push(Element::button("submit", self.mode.heading()).disabled(self.pending.is_some()));
        children.push(other);
        Element::container(children)
    }
}

/// The session check the shell runs once at startup
pub fn check_session(env: &PageEnv) -> Task<Option<Profile>> {
    let remote = env.remote.clone();
    Task::spawn(env.executor.as_ref(), move || api::fetch_session(remote.as_ref()))
}

pub fn finish_session_check(env: &PageEnv, result: Result<Option<Profile>, HttpError>) {
    match result {
        Ok(Some(profile)) => env.store.dispatch(Action::SignedIn(profile)),
        Ok(None) => env.store.dispatch(Action::SignedOut),
        Err(err) => {
            env.store.dispatch(Action::SignedOut);
            env.store.alert(err.to_string());
        }
    }
}

pub fn sign_out(env: &PageEnv) -> Task<()> {
    let remote = env.remote.clone();
    Task::spawn(env.executor.as_ref(), move || api::sign_out(remote.as_ref()))
}

pub fn finish_sign_out(env: &PageEnv, result: Result<(), HttpError>) {
    match result {
        Ok(()) => {
            if let Ok(mut jar) = env.jar.lock() {
                jar.clear();
            }
            env.store.dispatch(Action::SignedOut);
            env.store.inform("Signed out.");
        }
        Err(err) => env.store.alert(err.to_string()),
    }
}
