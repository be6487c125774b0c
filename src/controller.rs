//! Task list controller: the view-state holder between a front end and the
//! task store.
//!
//! The controller owns the published state (task list, search query, item
//! being edited, edit buffer, last error). Front ends read snapshots or
//! subscribe to changes and call the operations below; they never write state
//! directly.
//!
//! Operations that touch the store run the store call on a blocking worker and
//! return a [`Pending`] immediately. Dropping the `Pending` leaves the work
//! running; awaiting it yields the outcome. Completions commit their results
//! through the controller's [`Observable`] senders, so subscribers see each
//! change as one atomic replacement.
//!
//! Overlapping operations are not mutually excluded. Reloads are numbered as
//! they are issued and a result is only published if no later reload has
//! already published, so the most recently issued reload wins.

use crate::error::{Result, StorageError};
use crate::observable::Observable;
use crate::store::TaskStore;
use crate::types::{Task, TaskId, is_blank, sort_for_display};
use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Handle to a store operation started by the controller.
///
/// Awaiting it returns the operation's result. Dropping it detaches the work.
#[derive(Debug)]
pub struct Pending {
    handle: Option<JoinHandle<Result<()>>>,
}

impl Pending {
    /// An operation that did nothing and has already finished.
    fn ready() -> Self {
        Self { handle: None }
    }

    fn spawn<F>(fut: F) -> Self
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        Self {
            handle: Some(tokio::spawn(fut)),
        }
    }

    /// Whether the operation has completed.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(|h| h.is_finished())
    }
}

impl IntoFuture for Pending {
    type Output = Result<()>;
    type IntoFuture = Pin<Box<dyn Future<Output = Result<()>> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move {
            match self.handle {
                Some(handle) => handle.await?,
                None => Ok(()),
            }
        })
    }
}

/// Published state shared between the controller and its background work.
struct State {
    tasks: Observable<Vec<Task>>,
    search_query: Observable<String>,
    editing_item: Observable<Option<Task>>,
    editing_text: Observable<String>,
    last_error: Observable<Option<String>>,
    reloads_issued: AtomicU64,
    reloads_applied: AtomicU64,
    /// Bumped every time a dialog is opened.
    dialog_session: AtomicU64,
    disposed: AtomicBool,
}

impl State {
    fn new() -> Self {
        Self {
            tasks: Observable::new(Vec::new()),
            search_query: Observable::new(String::new()),
            editing_item: Observable::new(None),
            editing_text: Observable::new(String::new()),
            last_error: Observable::new(None),
            reloads_issued: AtomicU64::new(0),
            reloads_applied: AtomicU64::new(0),
            dialog_session: AtomicU64::new(0),
            disposed: AtomicBool::new(false),
        }
    }

    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    fn next_reload(&self) -> u64 {
        self.reloads_issued.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Publish a reload result unless a later-issued reload already did.
    fn publish_tasks(&self, seq: u64, tasks: Vec<Task>) -> bool {
        // The check runs under the channel's write lock so a stale result
        // cannot slip in between the check and the write.
        self.tasks.update(|current| {
            let prev = self.reloads_applied.fetch_max(seq, Ordering::AcqRel);
            if prev >= seq {
                return false;
            }
            *current = tasks;
            true
        })
    }

    /// Whether a later-issued reload has already published.
    fn is_superseded(&self, seq: u64) -> bool {
        self.reloads_applied.load(Ordering::Acquire) >= seq
    }

    fn open_dialog(&self, item: Task, text: String) {
        self.dialog_session.fetch_add(1, Ordering::AcqRel);
        self.editing_item.set(Some(item));
        self.editing_text.set(text);
    }

    fn current_session(&self) -> u64 {
        self.dialog_session.load(Ordering::Acquire)
    }

    fn clear_error(&self) {
        self.last_error.update(|err| err.take().is_some());
    }

    fn report(&self, operation: &str, err: &StorageError) {
        warn!(operation, error = %err, "Store call failed");
        if !self.is_disposed() {
            self.last_error.set(Some(err.to_string()));
        }
    }

    /// Close the dialog if no other dialog was opened since `session`.
    fn close_dialog_for(&self, session: u64) {
        let closed = self.editing_item.update(|current| {
            if current.is_none() || self.current_session() != session {
                return false;
            }
            *current = None;
            true
        });
        if closed {
            self.editing_text.set(String::new());
        }
    }
}

/// Run a store call on a blocking worker.
async fn run_blocking<S, T, F>(store: &Arc<S>, f: F) -> Result<T>
where
    S: TaskStore,
    T: Send + 'static,
    F: FnOnce(&S) -> Result<T> + Send + 'static,
{
    let store = Arc::clone(store);
    tokio::task::spawn_blocking(move || f(store.as_ref())).await?
}

/// Issue a reload: number it and capture the query it will run.
fn issue_reload<S: TaskStore>(
    store: Arc<S>,
    state: Arc<State>,
) -> impl Future<Output = Result<()>> + Send + 'static {
    let seq = state.next_reload();
    let query = state.search_query.get();
    reload_tasks(store, state, seq, query)
}

/// Query the store and publish the result.
async fn reload_tasks<S: TaskStore>(
    store: Arc<S>,
    state: Arc<State>,
    seq: u64,
    query: String,
) -> Result<()> {
    let result = run_blocking(&store, move |s| {
        if is_blank(&query) {
            s.get_all()
        } else {
            s.get_filtered(&query)
        }
    })
    .await;

    if state.is_disposed() {
        debug!(seq, "Discarding reload result after dispose");
        return Ok(());
    }

    match result {
        Ok(tasks) => {
            let count = tasks.len();
            if state.publish_tasks(seq, tasks) {
                debug!(seq, count, "Published tasks");
            } else {
                debug!(seq, "Dropped stale reload result");
            }
            state.clear_error();
            Ok(())
        }
        Err(err) => {
            if state.is_superseded(seq) {
                debug!(seq, error = %err, "Stale reload failed after a newer one published");
            } else {
                state.report("reload", &err);
            }
            Err(err)
        }
    }
}

/// Run a store write, then reload on success.
async fn write_then_reload<S, F>(
    store: Arc<S>,
    state: Arc<State>,
    operation: &'static str,
    write: F,
) -> Result<()>
where
    S: TaskStore,
    F: FnOnce(&S) -> Result<()> + Send + 'static,
{
    if let Err(err) = run_blocking(&store, write).await {
        state.report(operation, &err);
        return Err(err);
    }
    if state.is_disposed() {
        return Ok(());
    }
    issue_reload(store, state).await
}

/// View-state holder for a single task list.
pub struct TaskListController<S: TaskStore> {
    store: Arc<S>,
    state: Arc<State>,
}

impl<S: TaskStore> TaskListController<S> {
    /// Create a controller over an already-opened store.
    ///
    /// Nothing is loaded until [`reload`](Self::reload) is called.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            state: Arc::new(State::new()),
        }
    }

    /// The store this controller writes to.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    // ---------------------------------------------------------------------
    // Published state
    // ---------------------------------------------------------------------

    /// Tasks from the most recent successful load, in store order.
    pub fn tasks(&self) -> Vec<Task> {
        self.state.tasks.get()
    }

    /// Tasks ordered for display: incomplete first, store order otherwise.
    pub fn sorted_tasks(&self) -> Vec<Task> {
        sort_for_display(&self.state.tasks.get())
    }

    pub fn search_query(&self) -> String {
        self.state.search_query.get()
    }

    pub fn editing_item(&self) -> Option<Task> {
        self.state.editing_item.get()
    }

    pub fn editing_text(&self) -> String {
        self.state.editing_text.get()
    }

    /// Message of the most recent store failure, cleared by the next
    /// successful store call.
    pub fn last_error(&self) -> Option<String> {
        self.state.last_error.get()
    }

    /// The edit dialog is shown exactly when an item is being edited.
    pub fn dialog_visible(&self) -> bool {
        self.state.editing_item.get().is_some()
    }

    /// Saving is allowed only with non-blank text.
    pub fn can_save(&self) -> bool {
        !is_blank(&self.state.editing_text.get())
    }

    pub fn subscribe_tasks(&self) -> watch::Receiver<Vec<Task>> {
        self.state.tasks.subscribe()
    }

    pub fn subscribe_search_query(&self) -> watch::Receiver<String> {
        self.state.search_query.subscribe()
    }

    pub fn subscribe_editing_item(&self) -> watch::Receiver<Option<Task>> {
        self.state.editing_item.subscribe()
    }

    pub fn subscribe_editing_text(&self) -> watch::Receiver<String> {
        self.state.editing_text.subscribe()
    }

    pub fn subscribe_last_error(&self) -> watch::Receiver<Option<String>> {
        self.state.last_error.subscribe()
    }

    // ---------------------------------------------------------------------
    // Edit dialog
    // ---------------------------------------------------------------------

    /// Open the dialog for a new, unsaved task.
    pub fn start_add(&self) {
        self.state.open_dialog(Task::new(""), String::new());
    }

    /// Open the dialog for an existing task.
    pub fn start_edit(&self, task: Task) {
        let text = task.text.clone();
        self.state.open_dialog(task, text);
    }

    pub fn set_editing_text(&self, text: impl Into<String>) {
        self.state.editing_text.set(text.into());
    }

    /// Dismiss the dialog.
    ///
    /// With blank text the item is treated as abandoned: a persisted item is
    /// deleted from the store (followed by a reload) and an unsaved one is
    /// dropped. The dialog closes immediately in every case.
    pub fn cancel_or_commit_dialog(&self) -> Pending {
        let item = self.state.editing_item.get();
        let text = self.state.editing_text.get();

        self.state.editing_item.set(None);
        self.state.editing_text.set(String::new());

        match item.and_then(|t| t.id) {
            Some(id) if is_blank(&text) => {
                debug!(task_id = id, "Dismissed blank edit, deleting task");
                self.spawn_delete(id)
            }
            _ => Pending::ready(),
        }
    }

    /// Persist the item being edited, then reload and close the dialog.
    ///
    /// Does nothing when [`can_save`](Self::can_save) is false. An item whose
    /// id is still present in the store is updated; anything else is
    /// inserted as a new row. On failure the dialog stays open so the save
    /// can be retried.
    pub fn save(&self) -> Pending {
        if !self.can_save() || self.state.is_disposed() {
            return Pending::ready();
        }

        let session = self.state.current_session();
        let text = self.state.editing_text.get();
        let task = match self.state.editing_item.get() {
            Some(item) => item.with_text(text),
            None => Task::new(text),
        };

        let store = Arc::clone(&self.store);
        let state = Arc::clone(&self.state);
        Pending::spawn(async move {
            let write = run_blocking(&store, move |s| {
                if let Some(id) = task.id
                    && s.exists_by_id(id)?
                {
                    s.update(&task)
                } else {
                    s.insert(&task).map(|_| ())
                }
            })
            .await;

            if let Err(err) = write {
                state.report("save", &err);
                return Err(err);
            }
            if state.is_disposed() {
                return Ok(());
            }

            let reloaded = issue_reload(store, Arc::clone(&state)).await;
            state.close_dialog_for(session);
            reloaded
        })
    }

    // ---------------------------------------------------------------------
    // List operations
    // ---------------------------------------------------------------------

    /// Delete a task, then reload. Closes the dialog if it shows that task.
    pub fn delete(&self, task: &Task) -> Pending {
        let editing_matches = self.state.editing_item.get().is_some_and(|item| {
            item == *task || (task.id.is_some() && item.id == task.id)
        });
        if editing_matches {
            self.state.editing_item.set(None);
            self.state.editing_text.set(String::new());
        }

        match task.id {
            Some(id) => self.spawn_delete(id),
            None => Pending::ready(),
        }
    }

    /// Persist a new completion flag for `task`, then reload.
    pub fn set_completed(&self, task: &Task, completed: bool) -> Pending {
        if self.state.is_disposed() {
            return Pending::ready();
        }
        let updated = task.with_completed(completed);
        Pending::spawn(write_then_reload(
            Arc::clone(&self.store),
            Arc::clone(&self.state),
            "set_completed",
            move |s| s.update(&updated),
        ))
    }

    /// Change the search query, then reload.
    pub fn set_search_query(&self, query: impl Into<String>) -> Pending {
        self.state.search_query.set(query.into());
        self.reload()
    }

    /// Replace the published task list from the store.
    pub fn reload(&self) -> Pending {
        if self.state.is_disposed() {
            return Pending::ready();
        }
        Pending::spawn(issue_reload(
            Arc::clone(&self.store),
            Arc::clone(&self.state),
        ))
    }

    /// Stop publishing. Work already in flight keeps running but its results
    /// are discarded, and later operations do nothing.
    pub fn dispose(&self) {
        if !self.state.disposed.swap(true, Ordering::AcqRel) {
            debug!("Task list controller disposed");
        }
    }

    fn spawn_delete(&self, id: TaskId) -> Pending {
        if self.state.is_disposed() {
            return Pending::ready();
        }
        Pending::spawn(write_then_reload(
            Arc::clone(&self.store),
            Arc::clone(&self.state),
            "delete",
            move |s| s.delete_by_id(id),
        ))
    }
}

impl<S: TaskStore> Drop for TaskListController<S> {
    fn drop(&mut self) {
        self.dispose();
    }
}
