use std::mem;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::database::DatabaseError;
use crate::models::{NewTask, RemoteTask, Task};
use crate::navigation::{Navigator, Route, RouteKind};
use crate::remote::{FetchOutcome, FetchTracker, RemoteFetcher};
use crate::tui::error::TuiError;
use crate::tui::events::Keymap;
use crate::tui::state::{
    FormEvent, FormOutcome, HomeState, ListEvent, ListIntent, MenuEvent, RemoteEvent, RemoteIntent, RemoteLoad,
    RemoteState, TaskForm, TaskListState,
};
use crate::utils::today;
use crate::{Config, Database};

/// How long a status notification stays on screen
const STATUS_MESSAGE_TIMEOUT: Duration = Duration::from_secs(3);

/// View state of one entry of the navigation stack
#[derive(Debug, Clone)]
pub enum Screen {
    Home(HomeState),
    /// create_step1
    Details(TaskForm),
    /// create_step2
    DueDate(TaskForm),
    TaskList(TaskListState),
    Edit { task: Task, form: TaskForm },
    Remote(RemoteState),
}

impl Default for Screen {
    fn default() -> Self {
        Screen::Home(HomeState::default())
    }
}

pub struct App {
    pub config: Config,
    pub database: Database,
    pub keymap: Keymap,
    pub navigator: Navigator,
    /// One entry per navigator stack entry
    screens: Vec<Screen>,
    pub status_message: Option<String>,
    pub status_message_time: Option<Instant>,
    pub show_help: bool,
    fetcher: RemoteFetcher,
    fetch_tracker: FetchTracker,
    fetch_rx: Option<Receiver<FetchOutcome>>,
}

impl App {
    pub fn new(config: Config, database: Database) -> Result<Self, TuiError> {
        let keymap = Keymap::from_config(&config.key_bindings)?;
        let counts = database.task_counts()?;
        let fetcher = RemoteFetcher::from_config(&config);

        Ok(Self {
            config,
            database,
            keymap,
            navigator: Navigator::new(),
            screens: vec![Screen::Home(HomeState::new(counts))],
            status_message: None,
            status_message_time: None,
            show_help: false,
            fetcher,
            fetch_tracker: FetchTracker::new(),
            fetch_rx: None,
        })
    }

    pub fn screen(&self) -> &Screen {
        // screens mirrors the navigator, which always holds home
        &self.screens[self.screens.len() - 1]
    }

    pub fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_message_time = Some(Instant::now());
    }

    pub fn check_status_message_timeout(&mut self) {
        if let Some(time) = self.status_message_time {
            if time.elapsed() >= STATUS_MESSAGE_TIMEOUT {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }

    /// True while a popup on the current screen is consuming keys
    pub fn has_overlay(&self) -> bool {
        match self.screen() {
            Screen::TaskList(list) => list.pending_delete.is_some() || list.filter_panel.is_some(),
            _ => false,
        }
    }

    fn build_screen(&self, route: &Route) -> Result<Screen, DatabaseError> {
        let screen = match route {
            Route::Home => Screen::Home(HomeState::new(self.database.task_counts()?)),
            Route::CreateStep1 => Screen::Details(TaskForm::details(today())),
            Route::CreateStep2 { .. } => Screen::DueDate(TaskForm::due_date(today())),
            Route::MyTasks => Screen::TaskList(TaskListState::new(self.database.get_all_tasks()?)),
            Route::EditTask { task_id } => {
                let task = self.database.get_task(*task_id)?;
                Screen::Edit {
                    form: TaskForm::edit(&task, today()),
                    task,
                }
            }
            Route::ApiTasks => Screen::Remote(RemoteState::loading(self.config.remote_display_limit)),
        };
        Ok(screen)
    }

    /// Follow an edge of the screen graph and build the target's view state
    pub fn open(&mut self, route: Route) {
        if let Err(e) = self.navigator.navigate(route.clone()) {
            warn!(error = %e, "navigation rejected");
            self.set_status_message(e.to_string());
            return;
        }

        match self.build_screen(&route) {
            Ok(screen) => {
                self.screens.push(screen);
                if route.kind() == RouteKind::ApiTasks {
                    self.start_fetch();
                }
            }
            Err(e) if e.is_not_found() => {
                warn!(route = %route, "task not found, returning to list");
                self.navigator.pop_back_to(RouteKind::MyTasks);
                self.sync_screens();
                self.set_status_message("Task not found");
            }
            Err(e) => {
                warn!(route = %route, error = %e, "failed to open screen");
                self.navigator.pop_back();
                self.sync_screens();
                self.set_status_message(format!("Failed to load: {}", e));
            }
        }
    }

    /// Pop one screen. Returns false at home.
    pub fn go_back(&mut self) -> bool {
        if self.navigator.current().kind() == RouteKind::ApiTasks {
            self.cancel_fetch();
        }
        if !self.navigator.pop_back() {
            return false;
        }
        self.sync_screens();
        true
    }

    /// Drop view state above the navigator's depth and reload what is now on top
    fn sync_screens(&mut self) {
        self.screens.truncate(self.navigator.depth());
        self.refresh_current();
    }

    fn refresh_current(&mut self) {
        let result = match self.screens.last_mut() {
            Some(Screen::Home(home)) => self.database.task_counts().map(|counts| home.counts = counts),
            Some(Screen::TaskList(list)) => self
                .database
                .get_all_tasks()
                .map(|tasks| *list = mem::take(list).with_tasks(tasks)),
            _ => Ok(()),
        };
        if let Err(e) = result {
            warn!(error = %e, "failed to reload tasks");
            self.set_status_message(format!("Failed to load tasks: {}", e));
        }
    }

    pub fn home_event(&mut self, event: MenuEvent) {
        let target = match self.screens.last_mut() {
            Some(Screen::Home(home)) => {
                let (next, target) = mem::take(home).reduce(event);
                *home = next;
                target
            }
            _ => None,
        };
        match target {
            Some(RouteKind::CreateStep1) => self.open(Route::CreateStep1),
            Some(RouteKind::MyTasks) => self.open(Route::MyTasks),
            Some(RouteKind::ApiTasks) => self.open(Route::ApiTasks),
            _ => {}
        }
    }

    pub fn form_event(&mut self, event: FormEvent) {
        let outcome = match self.screens.last_mut() {
            Some(Screen::Details(form)) | Some(Screen::DueDate(form)) | Some(Screen::Edit { form, .. }) => {
                let (next, outcome) = mem::take(form).reduce(event);
                *form = next;
                outcome
            }
            _ => return,
        };
        if outcome == FormOutcome::Submitted {
            self.submit_form();
        }
    }

    fn submit_form(&mut self) {
        match self.screen().clone() {
            Screen::Details(form) => self.open(Route::CreateStep2 {
                title: form.title.value().trim().to_string(),
                description: form.description.value().trim().to_string(),
                priority: form.priority,
            }),
            Screen::DueDate(form) => self.create_task(form.due_date_value()),
            Screen::Edit { task, form } => {
                let updated = Task {
                    id: task.id,
                    title: form.title.value().trim().to_string(),
                    description: form.description.value().trim().to_string(),
                    priority: form.priority,
                    due_date: form.due_date_value(),
                    completed: task.completed,
                };
                self.update_task(&updated);
            }
            _ => {}
        }
    }

    fn create_task(&mut self, due_date: String) {
        let Route::CreateStep2 { title, description, priority } = self.navigator.current().clone() else {
            return;
        };
        let task = NewTask::new(title, description, priority, due_date);
        match self.database.insert_task(&task) {
            Ok(id) => {
                info!(id, "task created");
                self.navigator.reset_to_home();
                self.sync_screens();
                self.set_status_message("Task created successfully");
            }
            Err(e) => {
                warn!(error = %e, "failed to create task");
                self.set_status_message(format!("Failed to create task: {}", e));
            }
        }
    }

    fn update_task(&mut self, task: &Task) {
        match self.database.update_task(task) {
            Ok(()) => {
                info!(id = task.id, "task updated");
                self.navigator.pop_back_to(RouteKind::MyTasks);
                self.sync_screens();
                self.set_status_message("Task updated");
            }
            Err(e) if e.is_not_found() => {
                warn!(id = task.id, "task vanished before update");
                self.navigator.pop_back_to(RouteKind::MyTasks);
                self.sync_screens();
                self.set_status_message("Task not found");
            }
            Err(e) => {
                warn!(id = task.id, error = %e, "failed to update task");
                self.set_status_message(format!("Failed to update task: {}", e));
            }
        }
    }

    pub fn list_event(&mut self, event: ListEvent) {
        let intent = match self.screens.last_mut() {
            Some(Screen::TaskList(list)) => {
                let (next, intent) = mem::take(list).reduce(event);
                *list = next;
                intent
            }
            _ => None,
        };
        let Some(intent) = intent else { return };

        match intent {
            ListIntent::New => self.open(Route::CreateStep1),
            ListIntent::Edit(task_id) => self.open(Route::EditTask { task_id }),
            ListIntent::Toggle(id) => {
                if let Err(e) = self.database.toggle_task_completion(id) {
                    warn!(id, error = %e, "failed to toggle task");
                    self.set_status_message(format!("Failed to update task: {}", e));
                }
                self.refresh_current();
            }
            ListIntent::Delete(id) => {
                match self.database.delete_task(id) {
                    Ok(()) => {
                        info!(id, "task deleted");
                        self.set_status_message("Task deleted");
                    }
                    Err(e) => {
                        warn!(id, error = %e, "failed to delete task");
                        self.set_status_message(format!("Failed to delete task: {}", e));
                    }
                }
                self.refresh_current();
            }
        }
    }

    pub fn remote_event(&mut self, event: RemoteEvent) {
        let intent = match self.screens.last_mut() {
            Some(Screen::Remote(state)) => {
                let (next, intent) = mem::take(state).reduce(event);
                *state = next;
                intent
            }
            _ => None,
        };
        match intent {
            Some(RemoteIntent::Fetch) => self.start_fetch(),
            Some(RemoteIntent::Import(remote)) => self.import_remote(&remote),
            None => {}
        }
    }

    fn import_remote(&mut self, remote: &RemoteTask) {
        let Some(candidate) = remote.to_new_task(today(), self.config.import_due_in_days) else {
            warn!(remote_id = remote.id, days = self.config.import_due_in_days, "import due date out of range");
            self.set_status_message("Import due date is out of range");
            return;
        };
        match self.database.insert_task(&candidate) {
            Ok(id) => {
                info!(remote_id = remote.id, id, "imported remote task");
                self.set_status_message(format!("Imported \"{}\" (ID: {})", remote.title, id));
            }
            Err(e) => {
                warn!(remote_id = remote.id, error = %e, "failed to import remote task");
                self.set_status_message(format!("Failed to import task: {}", e));
            }
        }
    }

    fn start_fetch(&mut self) {
        let generation = self.fetch_tracker.begin();
        debug!(generation, endpoint = %self.fetcher.endpoint, "starting remote fetch");
        self.fetch_rx = Some(self.fetcher.spawn_fetch(generation));
    }

    fn cancel_fetch(&mut self) {
        self.fetch_tracker.cancel();
        self.fetch_rx = None;
    }

    /// Drain a finished background fetch, if any. Called once per tick.
    pub fn poll_fetch(&mut self) {
        let Some(rx) = &self.fetch_rx else { return };
        let outcome = match rx.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => {
                warn!("fetch worker exited without a result");
                self.cancel_fetch();
                if let Some(Screen::Remote(state)) = self.screens.last_mut() {
                    state.load = RemoteLoad::Failed("Fetch stopped unexpectedly".to_string());
                }
                return;
            }
        };
        self.fetch_rx = None;

        if let Some(result) = self.fetch_tracker.accept(outcome) {
            if let Some(Screen::Remote(state)) = self.screens.last_mut() {
                *state = mem::take(state).on_fetch(result);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;
    use crate::remote::FetchError;

    fn app() -> App {
        let mut config = Config::default();
        // nothing listens on port 9 of the loopback interface
        config.api_url = "http://127.0.0.1:9/todos".to_string();
        config.use_system_proxy = false;
        App::new(config, Database::open_in_memory().unwrap()).unwrap()
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            app.form_event(FormEvent::Char(c));
        }
    }

    fn seed(app: &App, title: &str) -> i64 {
        app.database
            .insert_task(&NewTask::new(title.to_string(), "d".to_string(), Priority::Low, "01/01/2099".to_string()))
            .unwrap()
    }

    #[test]
    fn create_flow_persists_and_returns_home() {
        let mut app = app();
        app.home_event(MenuEvent::Select);
        assert!(matches!(app.screen(), Screen::Details(_)));

        type_str(&mut app, "Buy milk");
        app.form_event(FormEvent::NextField);
        type_str(&mut app, "2%");
        app.form_event(FormEvent::NextField);
        app.form_event(FormEvent::Char('l'));
        app.form_event(FormEvent::Submit);

        assert_eq!(
            app.navigator.current(),
            &Route::CreateStep2 {
                title: "Buy milk".to_string(),
                description: "2%".to_string(),
                priority: Priority::Low,
            }
        );

        app.form_event(FormEvent::Char('w'));
        app.form_event(FormEvent::Submit);

        assert_eq!(app.navigator.current(), &Route::Home);
        assert_eq!(app.navigator.depth(), 1);
        match app.screen() {
            Screen::Home(home) => assert_eq!(home.counts.total, 1),
            other => panic!("expected home, got {:?}", other),
        }
        let tasks = app.database.get_all_tasks().unwrap();
        assert_eq!(tasks[0].title, "Buy milk");
        assert_eq!(tasks[0].priority, Priority::Low);
        assert!(!tasks[0].completed);
    }

    #[test]
    fn created_task_due_date_is_zero_padded() {
        let mut app = app();
        app.home_event(MenuEvent::Select);
        type_str(&mut app, "Pay rent");
        app.form_event(FormEvent::NextField);
        type_str(&mut app, "flat");
        app.form_event(FormEvent::Submit);
        type_str(&mut app, "1/1/2099");
        app.form_event(FormEvent::Submit);

        assert_eq!(app.navigator.current(), &Route::Home);
        let tasks = app.database.get_all_tasks().unwrap();
        assert_eq!(tasks[0].due_date, "01/01/2099");
    }

    #[test]
    fn invalid_create_submit_stays_on_form() {
        let mut app = app();
        app.open(Route::CreateStep1);
        app.form_event(FormEvent::Submit);
        assert_eq!(app.navigator.current(), &Route::CreateStep1);
        assert!(app.database.get_all_tasks().unwrap().is_empty());
    }

    #[test]
    fn back_from_step_two_keeps_step_one_input() {
        let mut app = app();
        app.open(Route::CreateStep1);
        type_str(&mut app, "a");
        app.form_event(FormEvent::NextField);
        type_str(&mut app, "b");
        app.form_event(FormEvent::Submit);
        assert!(matches!(app.screen(), Screen::DueDate(_)));

        assert!(app.go_back());
        match app.screen() {
            Screen::Details(form) => assert_eq!(form.title.value(), "a"),
            other => panic!("expected details form, got {:?}", other),
        }
    }

    #[test]
    fn missing_task_on_edit_returns_to_list() {
        let mut app = app();
        app.open(Route::MyTasks);
        app.open(Route::EditTask { task_id: 404 });
        assert_eq!(app.navigator.current(), &Route::MyTasks);
        assert!(matches!(app.screen(), Screen::TaskList(_)));
        assert_eq!(app.status_message.as_deref(), Some("Task not found"));
    }

    #[test]
    fn list_toggle_delete_and_edit() {
        let mut app = app();
        let id = seed(&app, "first");
        app.open(Route::MyTasks);

        app.list_event(ListEvent::Toggle);
        assert!(app.database.get_task(id).unwrap().completed);
        match app.screen() {
            Screen::TaskList(list) => assert!(list.tasks[0].completed),
            other => panic!("expected list, got {:?}", other),
        }

        app.list_event(ListEvent::Edit);
        assert_eq!(app.navigator.current(), &Route::EditTask { task_id: id });
        app.form_event(FormEvent::End);
        type_str(&mut app, "!");
        app.form_event(FormEvent::Submit);
        assert_eq!(app.navigator.current(), &Route::MyTasks);
        let edited = app.database.get_task(id).unwrap();
        assert_eq!(edited.title, "first!");
        assert!(edited.completed, "edit keeps completion");

        app.list_event(ListEvent::Delete);
        app.list_event(ListEvent::Confirm);
        assert!(app.database.get_all_tasks().unwrap().is_empty());
        assert_eq!(app.status_message.as_deref(), Some("Task deleted"));
    }

    #[test]
    fn leaving_remote_screen_discards_late_result() {
        let mut app = app();
        app.open(Route::ApiTasks);
        assert!(app.fetch_tracker.is_in_flight());
        assert!(app.go_back());
        assert!(!app.fetch_tracker.is_in_flight());
        assert!(app.fetch_rx.is_none());
        assert!(matches!(app.screen(), Screen::Home(_)));
    }

    #[test]
    fn fetch_outcome_fills_remote_screen() {
        let mut app = app();
        app.open(Route::ApiTasks);
        // swap the real worker for a stub channel carrying a failure
        let generation = app.fetch_tracker.begin();
        let (tx, rx) = std::sync::mpsc::channel();
        app.fetch_rx = Some(rx);
        let err = crate::remote::parse_remote_tasks("{").unwrap_err();
        tx.send(FetchOutcome { generation, result: Err::<Vec<RemoteTask>, FetchError>(err) }).unwrap();

        app.poll_fetch();
        match app.screen() {
            Screen::Remote(state) => assert!(matches!(state.load, RemoteLoad::Failed(_))),
            other => panic!("expected remote screen, got {:?}", other),
        }
    }

    #[test]
    fn import_copies_remote_task_locally() {
        let mut app = app();
        let remote = RemoteTask { owner_id: 2, id: 7, title: "quis ut nam".to_string(), completed: true };
        app.import_remote(&remote);
        let tasks = app.database.get_all_tasks().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "quis ut nam");
        assert_eq!(tasks[0].priority, Priority::Medium);
        assert!(tasks[0].completed);
    }

    #[test]
    fn import_with_out_of_range_due_date_reports_instead_of_inserting() {
        let mut app = app();
        app.config.import_due_in_days = u32::MAX;
        let remote = RemoteTask { owner_id: 2, id: 7, title: "quis ut nam".to_string(), completed: false };
        app.import_remote(&remote);
        assert!(app.database.get_all_tasks().unwrap().is_empty());
        assert_eq!(app.status_message.as_deref(), Some("Import due date is out of range"));
    }

    #[test]
    fn status_message_expires() {
        let mut app = app();
        app.set_status_message("hello");
        app.status_message_time = Some(Instant::now() - Duration::from_secs(4));
        app.check_status_message_timeout();
        assert!(app.status_message.is_none());
    }
}
