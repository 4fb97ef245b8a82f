//! Async data component: owns the load lifecycle of one remote resource.
//!
//! `Idle -> Loading -> {Loaded | Failed}`. The load starts on the first
//! render and never again for the same instance; a view is only ever handed
//! fully loaded data. Dropping the component revokes the task's liveness
//! token so a late result is thrown away.

use crate::remote::HttpError;
use crate::task::{Executor, Task};
use crate::ui::Element;
use std::rc::Rc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Idle,
    Loading,
    Loaded(T),
    Failed(HttpError),
}

impl<T> LoadState<T> {
    pub fn is_settled(&self) -> bool {
        matches!(self, LoadState::Loaded(_) | LoadState::Failed(_))
    }
}

type Loader<T> = Box<dyn FnOnce() -> Result<T, HttpError> + Send>;

pub struct AsyncData<T> {
    state: LoadState<T>,
    loader: Option<Loader<T>>,
    task: Option<Task<T>>,
    executor: Rc<dyn Executor>,
}

impl<T: Send + 'static> AsyncData<T> {
    pub fn new<F>(executor: Rc<dyn Executor>, loader: F) -> Self
    where
        F: FnOnce() -> Result<T, HttpError> + Send + 'static,
    {
        Self {
            state: LoadState::Idle,
            loader: Some(Box::new(loader)),
            task: None,
            executor,
        }
    }

    /// `Idle -> Loading`. Later calls do nothing.
    pub fn start(&mut self) {
        if let Some(loader) = self.loader.take() {
            self.task = Some(Task::spawn(self.executor.as_ref(), loader));
            self.state = LoadState::Loading;
        }
    }

    /// Apply a finished load if one is waiting. Returns true on a transition.
    pub fn poll(&mut self) -> bool {
        let result = self.task.as_ref().and_then(|task| task.poll());
        self.settle(result)
    }

    /// Like [`poll`](Self::poll) but blocks up to `timeout` for the result
    pub fn wait(&mut self, timeout: Duration) -> bool {
        self.start();
        let result = self.task.as_ref().and_then(|task| task.wait(timeout));
        self.settle(result)
    }

    fn settle(&mut self, result: Option<Result<T, HttpError>>) -> bool {
        let Some(result) = result else {
            return false;
        };
        self.task = None;
        self.state = match result {
            Ok(data) => LoadState::Loaded(data),
            Err(err) => LoadState::Failed(err),
        };
        true
    }

    /// Render exactly one of spinner, error, or `view(data)`
    pub fn render(&mut self, view: impl FnOnce(&T) -> Element) -> Element {
        self.start();
        self.poll();
        match &self.state {
            LoadState::Idle | LoadState::Loading => Element::spinner(),
            LoadState::Failed(err) => Element::error(err),
            LoadState::Loaded(data) => view(data),
        }
    }
}

impl<T> AsyncData<T> {
    #[cfg(test)]
    pub fn state(&self) -> &LoadState<T> {
        &self.state
    }

    pub fn data(&self) -> Option<&T> {
        match &self.state {
            LoadState::Loaded(data) => Some(data),
            _ => None,
        }
    }

    /// Loaded data for local reconciliation; never triggers a reload
    pub fn data_mut(&mut self) -> Option<&mut T> {
        match &mut self.state {
            LoadState::Loaded(data) => Some(data),
            _ => None,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.state.is_settled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::ManualExecutor;
    use crate::ui::Kind;
    use std::cell::Cell;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn view(n: &u32) -> Element {
        Element::text(format!("value {}", n)).with_title("content")
    }

    #[test]
    fn test_idle_until_first_render() {
        let exec = Rc::new(ManualExecutor::new());
        let data = AsyncData::new(exec.clone(), || Ok(1u32));
        assert_eq!(*data.state(), LoadState::Idle);
        assert_eq!(exec.pending(), 0);
    }

    #[test]
    fn test_never_resolving_loader_only_shows_spinner() {
        let exec = Rc::new(ManualExecutor::new());
        let mut data = AsyncData::new(exec.clone(), || Ok(7u32));

        for _ in 0..5 {
            let ui = data.render(view);
            assert!(ui.find_by_class("loadingContainer").is_some());
            assert!(ui.find_by_title("content").is_none());
            assert!(!ui.has_kind(Kind::Error));
        }
        // One load per mount, no matter how often it re-renders
        assert_eq!(exec.pending(), 1);
        assert_eq!(*data.state(), LoadState::Loading);
    }

    #[test]
    fn test_loaded_delegates_to_view() {
        let exec = Rc::new(ManualExecutor::new());
        let mut data = AsyncData::new(exec.clone(), || Ok(7u32));
        data.render(view);
        exec.run_all();

        let ui = data.render(view);
        assert_eq!(ui.text_content(), "value 7");
        assert!(ui.find_by_class("loadingContainer").is_none());
        assert_eq!(data.data(), Some(&7));

        // Re-rendering a loaded component does not load again
        data.render(view);
        assert_eq!(exec.pending(), 0);
    }

    #[test]
    fn test_failure_is_distinct() {
        let exec = Rc::new(ManualExecutor::new());
        let mut data = AsyncData::new(exec.clone(), || Err::<u32, _>(HttpError::new(404, "nope")));
        data.render(view);
        exec.run_all();

        let calls = Cell::new(0);
        let ui = data.render(|n| {
            calls.set(calls.get() + 1);
            view(n)
        });
        assert_eq!(calls.get(), 0);
        assert!(ui.find_by_class("errorContainer").is_some());
        assert!(ui.find_by_class("loadingContainer").is_none());
        assert_eq!(ui.text_content(), "Error 404: nope");
        assert!(data.is_settled());
    }

    #[test]
    fn test_unmount_while_pending_is_safe() {
        let exec = Rc::new(ManualExecutor::new());
        let finished = Arc::new(AtomicUsize::new(0));
        let counter = finished.clone();
        let mut data = AsyncData::new(exec.clone(), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(3u32)
        });
        data.render(view);
        drop(data);

        assert_eq!(exec.run_all(), 1);
        assert_eq!(finished.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unmount_before_rejection_is_safe() {
        let exec = Rc::new(ManualExecutor::new());
        let mut data = AsyncData::new(exec.clone(), || Err::<u32, _>(HttpError::unexpected("down")));
        data.render(view);
        drop(data);
        assert_eq!(exec.run_all(), 1);
    }

    #[test]
    fn test_data_mut_only_when_loaded() {
        let exec = Rc::new(ManualExecutor::new());
        let mut data = AsyncData::new(exec.clone(), || Ok(vec![1u32]));
        assert!(data.data_mut().is_none());
        data.start();
        exec.run_all();
        assert!(data.poll());
        data.data_mut().unwrap().push(2);
        assert_eq!(data.data(), Some(&vec![1, 2]));
        assert!(!data.poll());
    }

    #[test]
    fn test_wait_with_threads() {
        let mut data = AsyncData::new(Rc::new(crate::task::ThreadExecutor), || Ok(5u32));
        assert!(data.wait(Duration::from_secs(5)));
        assert_eq!(data.data(), Some(&5));
    }
}
