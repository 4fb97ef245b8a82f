//! Views mounted by the router.

pub mod auth;
pub mod course;
pub mod courses;
pub mod profile;
pub mod tutor;

use crate::remote::RemoteCall;
use crate::session::CookieJar;
use crate::store::Store;
use crate::task::Executor;
use crate::ui::Element;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

/// What every view gets at mount time
#[derive(Clone)]
pub struct PageEnv {
    pub remote: Arc<dyn RemoteCall>,
    pub executor: Rc<dyn Executor>,
    pub store: Store,
    /// Cookies the remote sends with every call
    pub jar: Arc<Mutex<CookieJar>>,
}

impl PageEnv {
    pub fn new(
        remote: Arc<dyn RemoteCall>,
        executor: Rc<dyn Executor>,
        store: Store,
        jar: Arc<Mutex<CookieJar>>,
    ) -> Self {
        Self {
            remote,
            executor,
            store,
            jar,
        }
    }
}

pub fn landing() -> Element {
    Element::container(vec![
        Element::heading("TutsVILLE"),
        Element::text("Find a tutor for the course you are taking."),
        Element::list(
            "nav",
            vec![
                Element::link("courses", "/courses", vec![Element::text("Browse courses")]),
                Element::link("signIn", "/signIn", vec![Element::text("Sign in")]),
                Element::link("signUp", "/signUp", vec![Element::text("Sign up")]),
            ],
        ),
    ])
}

pub fn not_found(path: &str) -> Element {
    Element::container(vec![
        Element::heading("Page not found"),
        Element::text(format!("Nothing lives at {}", path)),
        Element::link("home", "/", vec![Element::text("Back home")]),
    ])
    .with_class("errorPage")
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::PageEnv;
    use crate::model::{Profile, Tutor};
    use crate::session::CookieJar;
    use crate::store::Store;
    use crate::task::ManualExecutor;
    use crate::testing::MockRemote;
    use std::rc::Rc;
    use std::sync::{Arc, Mutex};

    pub struct Harness {
        pub env: PageEnv,
        pub remote: Arc<MockRemote>,
        pub exec: Rc<ManualExecutor>,
    }

    pub fn harness() -> Harness {
        let remote = Arc::new(MockRemote::new());
        let exec = Rc::new(ManualExecutor::new());
        let jar = Arc::new(Mutex::new(CookieJar::new()));
        let env = PageEnv::new(remote.clone(), exec.clone(), Store::new(), jar);
        Harness { env, remote, exec }
    }

    pub fn tutor(username: &str) -> Tutor {
        Tutor {
            username: username.to_string(),
            ..Tutor::default()
        }
    }

    pub fn profile(username: &str) -> Profile {
        Profile {
            username: username.to_string(),
            ..Profile::default()
        }
    }
}
