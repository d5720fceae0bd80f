//! Per-screen view state.
//!
//! Each screen owns a plain state struct and a `reduce` function taking the
//! state by value plus one event, returning the next state and, when the
//! event asks for it, an intent for the `App` to carry out against the
//! store or the fetcher. Reducers never touch the terminal, the database
//! or the network.

use chrono::{Days, NaiveDate};

use crate::models::{Priority, RemoteTask, StatusFilter, Task, TaskCounts, TaskFilter};
use crate::navigation::RouteKind;
use crate::remote::FetchError;
use crate::utils::{format_date, parse_date};
use crate::validation::{validate_description, validate_due_date, validate_title, ValidationError};

/// Single-line text buffer with a char-indexed cursor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    value: String,
    cursor: usize,
}

impl TextInput {
    pub fn with_value(value: &str) -> Self {
        Self {
            value: value.to_string(),
            cursor: value.chars().count(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn byte_index(&self) -> usize {
        self.value
            .char_indices()
            .nth(self.cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    pub fn insert(&mut self, c: char) {
        let idx = self.byte_index();
        self.value.insert(idx, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let idx = self.byte_index();
            self.value.remove(idx);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.value.chars().count() {
            let idx = self.byte_index();
            self.value.remove(idx);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.value.chars().count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.value.chars().count();
    }

    pub fn set(&mut self, value: &str) {
        *self = Self::with_value(value);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Description,
    Priority,
    DueDate,
}

impl FormField {
    pub fn label(&self) -> &'static str {
        match self {
            FormField::Title => "Title *",
            FormField::Description => "Description *",
            FormField::Priority => "Priority *",
            FormField::DueDate => "Due date (dd/mm/yyyy) *",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormEvent {
    Char(char),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
    NextField,
    PrevField,
    Submit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormOutcome {
    Editing,
    /// Every field passed validation
    Submitted,
}

/// Inline error per field, `None` when the field is fine or untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub title: Option<ValidationError>,
    pub description: Option<ValidationError>,
    pub due_date: Option<ValidationError>,
}

impl FieldErrors {
    pub fn get(&self, field: FormField) -> Option<&ValidationError> {
        match field {
            FormField::Title => self.title.as_ref(),
            FormField::Description => self.description.as_ref(),
            FormField::DueDate => self.due_date.as_ref(),
            FormField::Priority => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.due_date.is_none()
    }
}

/// Form backing create step 1 (title, description, priority), create step 2
/// (due date) and the edit screen (all four).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskForm {
    fields: Vec<FormField>,
    focus: usize,
    pub title: TextInput,
    pub description: TextInput,
    pub priority: Priority,
    pub due_date: TextInput,
    pub errors: FieldErrors,
    pub today: NaiveDate,
}

impl Default for TaskForm {
    fn default() -> Self {
        Self::details(NaiveDate::MIN)
    }
}

impl TaskForm {
    fn with_fields(fields: Vec<FormField>, today: NaiveDate) -> Self {
        Self {
            fields,
            focus: 0,
            title: TextInput::default(),
            description: TextInput::default(),
            priority: Priority::default(),
            due_date: TextInput::default(),
            errors: FieldErrors::default(),
            today,
        }
    }

    /// Create step 1
    pub fn details(today: NaiveDate) -> Self {
        Self::with_fields(vec![FormField::Title, FormField::Description, FormField::Priority], today)
    }

    /// Create step 2
    pub fn due_date(today: NaiveDate) -> Self {
        Self::with_fields(vec![FormField::DueDate], today)
    }

    pub fn edit(task: &Task, today: NaiveDate) -> Self {
        let mut form = Self::with_fields(
            vec![FormField::Title, FormField::Description, FormField::Priority, FormField::DueDate],
            today,
        );
        form.title.set(&task.title);
        form.description.set(&task.description);
        form.priority = task.priority;
        form.due_date.set(&task.due_date);
        form
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn focused(&self) -> FormField {
        self.fields[self.focus.min(self.fields.len() - 1)]
    }

    fn input_mut(&mut self, field: FormField) -> Option<&mut TextInput> {
        match field {
            FormField::Title => Some(&mut self.title),
            FormField::Description => Some(&mut self.description),
            FormField::DueDate => Some(&mut self.due_date),
            FormField::Priority => None,
        }
    }

    pub fn input(&self, field: FormField) -> Option<&TextInput> {
        match field {
            FormField::Title => Some(&self.title),
            FormField::Description => Some(&self.description),
            FormField::DueDate => Some(&self.due_date),
            FormField::Priority => None,
        }
    }

    fn check(&self, field: FormField) -> Option<ValidationError> {
        match field {
            FormField::Title => validate_title(self.title.value()).err(),
            FormField::Description => validate_description(self.description.value()).err(),
            FormField::DueDate => validate_due_date(self.due_date.value(), self.today).err(),
            FormField::Priority => None,
        }
    }

    fn set_error(&mut self, field: FormField) {
        let error = self.check(field);
        match field {
            FormField::Title => self.errors.title = error,
            FormField::Description => self.errors.description = error,
            FormField::DueDate => self.errors.due_date = error,
            FormField::Priority => {}
        }
    }

    /// Due date as stored: zero padded dd/mm/yyyy once the text parses
    pub fn due_date_value(&self) -> String {
        let text = self.due_date.value().trim();
        parse_date(text).map(format_date).unwrap_or_else(|_| text.to_string())
    }

    /// Errors of every field on this form, in field order
    pub fn validate(&self) -> Vec<ValidationError> {
        self.fields.iter().filter_map(|&f| self.check(f)).collect()
    }

    fn shift_due_date(&mut self, days: i64) {
        let base = parse_date(self.due_date.value()).unwrap_or(self.today);
        let shifted = if days >= 0 {
            base.checked_add_days(Days::new(days.unsigned_abs()))
        } else {
            base.checked_sub_days(Days::new(days.unsigned_abs()))
        };
        if let Some(date) = shifted {
            self.due_date.set(&format_date(date));
        }
    }

    fn handle_char(&mut self, field: FormField, c: char) {
        match field {
            FormField::Priority => match c.to_ascii_lowercase() {
                'h' => self.priority = Priority::High,
                'm' => self.priority = Priority::Medium,
                'l' => self.priority = Priority::Low,
                ' ' => self.priority = next_priority(self.priority),
                _ => {}
            },
            FormField::DueDate => match c {
                c if c.is_ascii_digit() || c == '/' => self.due_date.insert(c),
                't' => self.due_date.set(&format_date(self.today)),
                'w' => {
                    let week = self.today.checked_add_days(Days::new(7)).unwrap_or(self.today);
                    self.due_date.set(&format_date(week));
                }
                '+' => self.shift_due_date(1),
                '-' => self.shift_due_date(-1),
                _ => {}
            },
            FormField::Title | FormField::Description => {
                if let Some(input) = self.input_mut(field) {
                    input.insert(c);
                }
            }
        }
    }

    pub fn reduce(mut self, event: FormEvent) -> (Self, FormOutcome) {
        let field = self.focused();
        match event {
            FormEvent::Char(c) => self.handle_char(field, c),
            FormEvent::Backspace => {
                if let Some(input) = self.input_mut(field) {
                    input.backspace();
                }
            }
            FormEvent::Delete => {
                if let Some(input) = self.input_mut(field) {
                    input.delete();
                }
            }
            FormEvent::Left => match self.input_mut(field) {
                Some(input) => input.move_left(),
                None => self.priority = prev_priority(self.priority),
            },
            FormEvent::Right => match self.input_mut(field) {
                Some(input) => input.move_right(),
                None => self.priority = next_priority(self.priority),
            },
            FormEvent::Home => {
                if let Some(input) = self.input_mut(field) {
                    input.move_home();
                }
            }
            FormEvent::End => {
                if let Some(input) = self.input_mut(field) {
                    input.move_end();
                }
            }
            FormEvent::NextField => {
                self.focus = (self.focus + 1) % self.fields.len();
                return (self, FormOutcome::Editing);
            }
            FormEvent::PrevField => {
                self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
                return (self, FormOutcome::Editing);
            }
            FormEvent::Submit => {
                let fields = self.fields.clone();
                for f in fields {
                    self.set_error(f);
                }
                if self.errors.is_empty() {
                    return (self, FormOutcome::Submitted);
                }
                // land on the first broken field
                if let Some(pos) = self.fields.iter().position(|&f| self.errors.get(f).is_some()) {
                    self.focus = pos;
                }
                return (self, FormOutcome::Editing);
            }
        }
        self.set_error(field);
        (self, FormOutcome::Editing)
    }
}

fn next_priority(p: Priority) -> Priority {
    match p {
        Priority::High => Priority::Medium,
        Priority::Medium => Priority::Low,
        Priority::Low => Priority::High,
    }
}

fn prev_priority(p: Priority) -> Priority {
    match p {
        Priority::High => Priority::Low,
        Priority::Medium => Priority::High,
        Priority::Low => Priority::Medium,
    }
}

/// Entries of the home menu, in display order
pub const HOME_MENU: [(RouteKind, &str); 3] = [
    (RouteKind::CreateStep1, "Create new task"),
    (RouteKind::MyTasks, "My tasks"),
    (RouteKind::ApiTasks, "Tasks from the API"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEvent {
    Up,
    Down,
    Select,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HomeState {
    pub counts: TaskCounts,
    pub selected: usize,
}

impl HomeState {
    pub fn new(counts: TaskCounts) -> Self {
        Self { counts, selected: 0 }
    }

    pub fn reduce(mut self, event: MenuEvent) -> (Self, Option<RouteKind>) {
        match event {
            MenuEvent::Up => self.selected = self.selected.checked_sub(1).unwrap_or(HOME_MENU.len() - 1),
            MenuEvent::Down => self.selected = (self.selected + 1) % HOME_MENU.len(),
            MenuEvent::Select => {
                let target = HOME_MENU[self.selected].0;
                return (self, Some(target));
            }
        }
        (self, None)
    }
}

/// Priority choices of the filter panel; `None` is "all"
pub const PRIORITY_FILTERS: [Option<Priority>; 4] =
    [None, Some(Priority::High), Some(Priority::Medium), Some(Priority::Low)];

pub fn priority_filter_label(priority: Option<Priority>) -> &'static str {
    priority.map(|p| p.label()).unwrap_or("All")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterRow {
    Status,
    Priority,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDelete {
    pub task_id: i64,
    pub title: String,
    /// 0 = Delete, 1 = Cancel
    pub selection: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListEvent {
    Up,
    Down,
    Toggle,
    Edit,
    Delete,
    New,
    /// Open or close the filter panel
    Filter,
    Left,
    Right,
    Confirm,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListIntent {
    Toggle(i64),
    Edit(i64),
    Delete(i64),
    New,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskListState {
    pub tasks: Vec<Task>,
    pub filter: TaskFilter,
    pub selected: usize,
    /// Focused row while the filter panel is open
    pub filter_panel: Option<FilterRow>,
    pub pending_delete: Option<PendingDelete>,
}

impl TaskListState {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            ..Self::default()
        }
    }

    pub fn visible(&self) -> Vec<&Task> {
        self.filter.apply(&self.tasks)
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.visible().get(self.selected).copied()
    }

    /// Swap in a fresh list from the store, keeping filter and selection bounds
    pub fn with_tasks(mut self, tasks: Vec<Task>) -> Self {
        self.tasks = tasks;
        self.clamp_selection();
        self
    }

    fn clamp_selection(&mut self) {
        let len = self.visible().len();
        self.selected = if len == 0 { 0 } else { self.selected.min(len - 1) };
    }

    fn cycle_filter(&mut self, row: FilterRow, forward: bool) {
        match row {
            FilterRow::Status => {
                let all = StatusFilter::ALL;
                let pos = all.iter().position(|s| *s == self.filter.status).unwrap_or(0);
                let next = if forward { (pos + 1) % all.len() } else { (pos + all.len() - 1) % all.len() };
                self.filter.status = all[next];
            }
            FilterRow::Priority => {
                let all = PRIORITY_FILTERS;
                let pos = all.iter().position(|p| *p == self.filter.priority).unwrap_or(0);
                let next = if forward { (pos + 1) % all.len() } else { (pos + all.len() - 1) % all.len() };
                self.filter.priority = all[next];
            }
        }
        self.clamp_selection();
    }

    pub fn reduce(mut self, event: ListEvent) -> (Self, Option<ListIntent>) {
        if let Some(mut pending) = self.pending_delete.take() {
            match event {
                ListEvent::Up | ListEvent::Down | ListEvent::Left | ListEvent::Right => {
                    pending.selection = 1 - pending.selection.min(1);
                    self.pending_delete = Some(pending);
                }
                ListEvent::Confirm if pending.selection == 0 => {
                    return (self, Some(ListIntent::Delete(pending.task_id)));
                }
                ListEvent::Confirm | ListEvent::Cancel => {}
                _ => self.pending_delete = Some(pending),
            }
            return (self, None);
        }

        if let Some(row) = self.filter_panel {
            match event {
                ListEvent::Up | ListEvent::Down => {
                    self.filter_panel = Some(match row {
                        FilterRow::Status => FilterRow::Priority,
                        FilterRow::Priority => FilterRow::Status,
                    });
                }
                ListEvent::Left => self.cycle_filter(row, false),
                ListEvent::Right | ListEvent::Toggle => self.cycle_filter(row, true),
                ListEvent::Filter | ListEvent::Confirm | ListEvent::Cancel => self.filter_panel = None,
                _ => {}
            }
            return (self, None);
        }

        let len = self.visible().len();
        match event {
            ListEvent::Up => self.selected = self.selected.saturating_sub(1),
            ListEvent::Down => {
                if len > 0 {
                    self.selected = (self.selected + 1).min(len - 1);
                }
            }
            ListEvent::Filter => self.filter_panel = Some(FilterRow::Status),
            ListEvent::New => return (self, Some(ListIntent::New)),
            ListEvent::Toggle => {
                let intent = self.selected_task().map(|t| ListIntent::Toggle(t.id));
                return (self, intent);
            }
            ListEvent::Edit | ListEvent::Confirm => {
                let intent = self.selected_task().map(|t| ListIntent::Edit(t.id));
                return (self, intent);
            }
            ListEvent::Delete => {
                self.pending_delete = self.selected_task().map(|t| PendingDelete {
                    task_id: t.id,
                    title: t.title.clone(),
                    selection: 0,
                });
            }
            ListEvent::Left | ListEvent::Right | ListEvent::Cancel => {}
        }
        (self, None)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RemoteLoad {
    #[default]
    Loading,
    Failed(String),
    Loaded {
        tasks: Vec<RemoteTask>,
        total: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteEvent {
    Up,
    Down,
    Refresh,
    Import,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteIntent {
    Fetch,
    Import(RemoteTask),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteState {
    pub load: RemoteLoad,
    pub selected: usize,
    pub display_limit: usize,
}

impl RemoteState {
    pub fn loading(display_limit: usize) -> Self {
        Self {
            load: RemoteLoad::Loading,
            selected: 0,
            display_limit,
        }
    }

    pub fn shown(&self) -> &[RemoteTask] {
        match &self.load {
            RemoteLoad::Loaded { tasks, .. } => tasks,
            _ => &[],
        }
    }

    /// Fold a fetch result in. Only the first `display_limit` items are kept.
    pub fn on_fetch(mut self, result: Result<Vec<RemoteTask>, FetchError>) -> Self {
        self.selected = 0;
        self.load = match result {
            Ok(mut tasks) => {
                let total = tasks.len();
                tasks.truncate(self.display_limit);
                RemoteLoad::Loaded { tasks, total }
            }
            Err(e) => RemoteLoad::Failed(e.to_string()),
        };
        self
    }

    pub fn reduce(mut self, event: RemoteEvent) -> (Self, Option<RemoteIntent>) {
        let len = self.shown().len();
        match event {
            RemoteEvent::Up => self.selected = self.selected.saturating_sub(1),
            RemoteEvent::Down => {
                if len > 0 {
                    self.selected = (self.selected + 1).min(len - 1);
                }
            }
            RemoteEvent::Refresh => {
                if self.load == RemoteLoad::Loading {
                    return (self, None);
                }
                self.load = RemoteLoad::Loading;
                self.selected = 0;
                return (self, Some(RemoteIntent::Fetch));
            }
            RemoteEvent::Import => {
                let intent = self.shown().get(self.selected).cloned().map(RemoteIntent::Import);
                return (self, intent);
            }
        }
        (self, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Field;
    use pretty_assertions::assert_eq;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 14).unwrap()
    }

    fn type_str(mut form: TaskForm, text: &str) -> TaskForm {
        for c in text.chars() {
            form = form.reduce(FormEvent::Char(c)).0;
        }
        form
    }

    fn task(id: i64, priority: Priority, completed: bool) -> Task {
        Task {
            id,
            title: format!("task {}", id),
            description: "d".to_string(),
            priority,
            due_date: "01/01/2099".to_string(),
            completed,
        }
    }

    fn remote(id: i64) -> RemoteTask {
        RemoteTask { owner_id: 1, id, title: format!("remote {}", id), completed: false }
    }

    #[test]
    fn text_input_edits_at_cursor() {
        let mut input = TextInput::with_value("héllo");
        input.move_left();
        input.move_left();
        input.insert('X');
        assert_eq!(input.value(), "hélXlo");
        input.move_home();
        input.delete();
        assert_eq!(input.value(), "élXlo");
        input.move_end();
        input.backspace();
        assert_eq!(input.value(), "élXl");
    }

    #[test]
    fn details_form_defaults_to_medium_priority() {
        let form = TaskForm::details(today());
        assert_eq!(form.priority, Priority::Medium);
        assert_eq!(form.focused(), FormField::Title);
        assert!(form.errors.is_empty());
    }

    #[test]
    fn inline_error_appears_when_title_is_cleared() {
        let form = type_str(TaskForm::details(today()), "a");
        assert_eq!(form.errors.title, None);
        let (form, _) = form.reduce(FormEvent::Backspace);
        assert_eq!(form.errors.title, Some(ValidationError::RequiredField(Field::Title)));
    }

    #[test]
    fn invalid_submit_keeps_form_open_and_focuses_first_error() {
        let form = type_str(TaskForm::details(today()), "Buy milk");
        let (form, _) = form.reduce(FormEvent::NextField);
        let (form, _) = form.reduce(FormEvent::NextField);
        let (form, outcome) = form.reduce(FormEvent::Submit);
        assert_eq!(outcome, FormOutcome::Editing);
        assert_eq!(form.focused(), FormField::Description);
        assert_eq!(
            form.errors.description,
            Some(ValidationError::RequiredField(Field::Description))
        );
        assert_eq!(form.title.value(), "Buy milk");
    }

    #[test]
    fn valid_details_submit() {
        let form = type_str(TaskForm::details(today()), "Buy milk");
        let (form, _) = form.reduce(FormEvent::NextField);
        let form = type_str(form, "2%");
        let (form, _) = form.reduce(FormEvent::NextField);
        let (form, _) = form.reduce(FormEvent::Char('l'));
        assert_eq!(form.priority, Priority::Low);
        let (_, outcome) = form.reduce(FormEvent::Submit);
        assert_eq!(outcome, FormOutcome::Submitted);
    }

    #[test]
    fn priority_field_cycles_with_arrows() {
        let mut form = TaskForm::details(today());
        form = form.reduce(FormEvent::PrevField).0;
        assert_eq!(form.focused(), FormField::Priority);
        form = form.reduce(FormEvent::Right).0;
        assert_eq!(form.priority, Priority::Low);
        form = form.reduce(FormEvent::Right).0;
        assert_eq!(form.priority, Priority::High);
        form = form.reduce(FormEvent::Left).0;
        assert_eq!(form.priority, Priority::Low);
    }

    #[test]
    fn due_date_shortcuts() {
        let form = TaskForm::due_date(today());
        let (form, _) = form.reduce(FormEvent::Char('t'));
        assert_eq!(form.due_date.value(), "14/10/2026");
        let (form, _) = form.reduce(FormEvent::Char('w'));
        assert_eq!(form.due_date.value(), "21/10/2026");
        let (form, _) = form.reduce(FormEvent::Char('+'));
        assert_eq!(form.due_date.value(), "22/10/2026");
        let (form, _) = form.reduce(FormEvent::Char('-'));
        let (form, _) = form.reduce(FormEvent::Char('-'));
        assert_eq!(form.due_date.value(), "20/10/2026");
        // letters are not typed into the date
        let (form, _) = form.reduce(FormEvent::Char('x'));
        assert_eq!(form.due_date.value(), "20/10/2026");
    }

    #[test]
    fn due_date_errors() {
        let (form, outcome) = TaskForm::due_date(today()).reduce(FormEvent::Submit);
        assert_eq!(outcome, FormOutcome::Editing);
        assert_eq!(form.errors.due_date, Some(ValidationError::RequiredField(Field::DueDate)));

        let form = type_str(form, "13/10/2026");
        assert_eq!(form.errors.due_date, Some(ValidationError::PastDate));

        let form = type_str(TaskForm::due_date(today()), "99/99");
        assert_eq!(form.errors.due_date, Some(ValidationError::InvalidDate));
    }

    #[test]
    fn edit_form_rechecks_past_date_on_submit() {
        let mut old = task(3, Priority::High, false);
        old.due_date = "01/10/2026".to_string();
        let form = TaskForm::edit(&old, today());
        assert_eq!(form.title.value(), "task 3");
        assert_eq!(form.priority, Priority::High);
        let (form, outcome) = form.reduce(FormEvent::Submit);
        assert_eq!(outcome, FormOutcome::Editing);
        assert_eq!(form.focused(), FormField::DueDate);
        assert_eq!(form.validate(), vec![ValidationError::PastDate]);
    }

    #[test]
    fn typed_due_date_is_zero_padded() {
        let mut form = TaskForm::due_date(today());
        for c in "9/1/2027".chars() {
            form = form.reduce(FormEvent::Char(c)).0;
        }
        assert_eq!(form.due_date.value(), "9/1/2027");
        assert_eq!(form.due_date_value(), "09/01/2027");
        assert!(form.validate().is_empty());
    }

    #[test]
    fn home_menu_wraps_and_selects_route() {
        let home = HomeState::new(TaskCounts::default());
        let (home, _) = home.reduce(MenuEvent::Up);
        assert_eq!(home.selected, 2);
        let (home, target) = home.reduce(MenuEvent::Select);
        assert_eq!(target, Some(RouteKind::ApiTasks));
        let (_, target) = home.reduce(MenuEvent::Down).0.reduce(MenuEvent::Select);
        assert_eq!(target, Some(RouteKind::CreateStep1));
    }

    #[test]
    fn filter_panel_narrows_list_and_clamps_selection() {
        let list = TaskListState::new(vec![
            task(1, Priority::High, false),
            task(2, Priority::Low, true),
            task(3, Priority::Low, false),
        ]);
        let (list, _) = list.reduce(ListEvent::Down);
        let (list, _) = list.reduce(ListEvent::Down);
        assert_eq!(list.selected, 2);

        let (list, _) = list.reduce(ListEvent::Filter);
        assert_eq!(list.filter_panel, Some(FilterRow::Status));
        let (list, _) = list.reduce(ListEvent::Right);
        let (list, _) = list.reduce(ListEvent::Right);
        assert_eq!(list.filter.status, StatusFilter::Completed);
        assert_eq!(list.selected, 0);

        let (list, _) = list.reduce(ListEvent::Down);
        let (list, _) = list.reduce(ListEvent::Right);
        assert_eq!(list.filter.priority, Some(Priority::High));
        assert!(list.visible().is_empty());

        let (list, _) = list.reduce(ListEvent::Filter);
        assert_eq!(list.filter_panel, None);
        let (_, intent) = list.reduce(ListEvent::Toggle);
        assert_eq!(intent, None);
    }

    #[test]
    fn list_actions_target_selected_task() {
        let list = TaskListState::new(vec![task(4, Priority::Low, false), task(9, Priority::Low, false)]);
        let (list, _) = list.reduce(ListEvent::Down);
        let (list, intent) = list.reduce(ListEvent::Toggle);
        assert_eq!(intent, Some(ListIntent::Toggle(9)));
        let (list, intent) = list.reduce(ListEvent::Edit);
        assert_eq!(intent, Some(ListIntent::Edit(9)));
        let (_, intent) = list.reduce(ListEvent::New);
        assert_eq!(intent, Some(ListIntent::New));
    }

    #[test]
    fn delete_requires_confirmation() {
        let list = TaskListState::new(vec![task(4, Priority::Low, false)]);
        let (list, intent) = list.reduce(ListEvent::Delete);
        assert_eq!(intent, None);
        assert_eq!(list.pending_delete.as_ref().map(|p| p.task_id), Some(4));

        let (list, intent) = list.reduce(ListEvent::Cancel);
        assert_eq!(intent, None);
        assert!(list.pending_delete.is_none());

        let (list, _) = list.reduce(ListEvent::Delete);
        let (list, _) = list.reduce(ListEvent::Down);
        let (list, intent) = list.reduce(ListEvent::Confirm);
        assert_eq!(intent, None, "Cancel was selected");

        let (list, _) = list.reduce(ListEvent::Delete);
        let (_, intent) = list.reduce(ListEvent::Confirm);
        assert_eq!(intent, Some(ListIntent::Delete(4)));
    }

    #[test]
    fn reload_keeps_selection_in_bounds() {
        let list = TaskListState::new(vec![task(1, Priority::Low, false), task(2, Priority::Low, false)]);
        let (list, _) = list.reduce(ListEvent::Down);
        let list = list.with_tasks(vec![task(1, Priority::Low, false)]);
        assert_eq!(list.selected, 0);
        let list = list.with_tasks(vec![]);
        assert!(list.selected_task().is_none());
    }

    #[test]
    fn remote_screen_truncates_to_display_limit() {
        let state = RemoteState::loading(20).on_fetch(Ok((1..=200).map(remote).collect()));
        match &state.load {
            RemoteLoad::Loaded { tasks, total } => {
                assert_eq!(tasks.len(), 20);
                assert_eq!(*total, 200);
                assert_eq!(tasks[19].id, 20);
            }
            other => panic!("unexpected state {:?}", other),
        }
    }

    #[test]
    fn remote_failure_and_retry() {
        let err = crate::remote::parse_remote_tasks("not json").unwrap_err();
        let state = RemoteState::loading(20).on_fetch(Err(err));
        assert!(matches!(state.load, RemoteLoad::Failed(_)));

        let (state, intent) = state.reduce(RemoteEvent::Refresh);
        assert_eq!(intent, Some(RemoteIntent::Fetch));
        assert_eq!(state.load, RemoteLoad::Loading);

        // a second refresh while loading does nothing
        let (_, intent) = state.reduce(RemoteEvent::Refresh);
        assert_eq!(intent, None);
    }

    #[test]
    fn remote_import_selected_item() {
        let state = RemoteState::loading(20).on_fetch(Ok(vec![remote(1), remote(2)]));
        let (state, _) = state.reduce(RemoteEvent::Down);
        let (_, intent) = state.reduce(RemoteEvent::Import);
        assert_eq!(intent, Some(RemoteIntent::Import(remote(2))));

        let empty = RemoteState::loading(20).on_fetch(Ok(vec![]));
        let (_, intent) = empty.reduce(RemoteEvent::Import);
        assert_eq!(intent, None);
    }
}
