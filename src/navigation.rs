//! Static screen graph and back stack.
//!
//! Routes render to the same paths as before (`edit_task/{taskId}` and
//! friends) so that they can be logged and parsed back. Segment values
//! escape `%` and `/`.

use std::fmt;
use thiserror::Error;
use tracing::debug;

use crate::models::Priority;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    CreateStep1,
    CreateStep2 {
        title: String,
        description: String,
        priority: Priority,
    },
    MyTasks,
    EditTask {
        task_id: i64,
    },
    ApiTasks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    Home,
    CreateStep1,
    CreateStep2,
    MyTasks,
    EditTask,
    ApiTasks,
}

/// Edges of the screen graph. Back navigation is handled by the stack.
const EDGES: &[(RouteKind, RouteKind)] = &[
    (RouteKind::Home, RouteKind::CreateStep1),
    (RouteKind::Home, RouteKind::MyTasks),
    (RouteKind::Home, RouteKind::ApiTasks),
    (RouteKind::CreateStep1, RouteKind::CreateStep2),
    (RouteKind::CreateStep2, RouteKind::Home),
    (RouteKind::MyTasks, RouteKind::EditTask),
    (RouteKind::MyTasks, RouteKind::CreateStep1),
    (RouteKind::EditTask, RouteKind::MyTasks),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("Unknown route: {0}")]
    UnknownRoute(String),
    #[error("Invalid parameter '{name}' in route: {value}")]
    InvalidParameter { name: &'static str, value: String },
    #[error("No transition from {from:?} to {to:?}")]
    InvalidTransition { from: RouteKind, to: RouteKind },
}

impl Route {
    pub fn kind(&self) -> RouteKind {
        match self {
            Route::Home => RouteKind::Home,
            Route::CreateStep1 => RouteKind::CreateStep1,
            Route::CreateStep2 { .. } => RouteKind::CreateStep2,
            Route::MyTasks => RouteKind::MyTasks,
            Route::EditTask { .. } => RouteKind::EditTask,
            Route::ApiTasks => RouteKind::ApiTasks,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "home".to_string(),
            Route::CreateStep1 => "create_step1".to_string(),
            Route::CreateStep2 { title, description, priority } => format!(
                "create_step2/{}/{}/{}",
                escape_segment(title),
                escape_segment(description),
                priority
            ),
            Route::MyTasks => "my_tasks".to_string(),
            Route::EditTask { task_id } => format!("edit_task/{}", task_id),
            Route::ApiTasks => "api_tasks".to_string(),
        }
    }

    pub fn parse(path: &str) -> Result<Route, NavigationError> {
        let segments: Vec<&str> = path.split('/').collect();
        match segments.as_slice() {
            ["home"] => Ok(Route::Home),
            ["create_step1"] => Ok(Route::CreateStep1),
            ["create_step2", title, description, priority] => Ok(Route::CreateStep2 {
                title: unescape_segment(title),
                description: unescape_segment(description),
                priority: priority.parse().map_err(|_| NavigationError::InvalidParameter {
                    name: "priority",
                    value: priority.to_string(),
                })?,
            }),
            ["my_tasks"] => Ok(Route::MyTasks),
            ["edit_task", id] => Ok(Route::EditTask {
                task_id: id.parse().map_err(|_| NavigationError::InvalidParameter {
                    name: "taskId",
                    value: id.to_string(),
                })?,
            }),
            ["api_tasks"] => Ok(Route::ApiTasks),
            _ => Err(NavigationError::UnknownRoute(path.to_string())),
        }
    }

    pub fn can_transition(from: RouteKind, to: RouteKind) -> bool {
        EDGES.iter().any(|&(a, b)| a == from && b == to)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

fn escape_segment(value: &str) -> String {
    value.replace('%', "%25").replace('/', "%2F")
}

fn unescape_segment(value: &str) -> String {
    value.replace("%2F", "/").replace("%2f", "/").replace("%25", "%")
}

/// Back stack of visited routes; the bottom entry is always `home`
#[derive(Debug, Clone)]
pub struct Navigator {
    stack: Vec<Route>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator {
    pub fn new() -> Self {
        Self { stack: vec![Route::Home] }
    }

    pub fn current(&self) -> &Route {
        // stack is never empty
        &self.stack[self.stack.len() - 1]
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn navigate(&mut self, route: Route) -> Result<(), NavigationError> {
        let from = self.current().kind();
        let to = route.kind();
        if !Route::can_transition(from, to) {
            return Err(NavigationError::InvalidTransition { from, to });
        }
        debug!(from = %self.current(), to = %route, "navigate");
        self.stack.push(route);
        Ok(())
    }

    /// Return to the previous screen. Returns false when already at home.
    pub fn pop_back(&mut self) -> bool {
        if self.stack.len() > 1 {
            let left = self.stack.pop();
            debug!(left = ?left.map(|r| r.path()), to = %self.current(), "back");
            true
        } else {
            false
        }
    }

    /// Pop until `kind` is on top. Falls back to home when it is not on the stack.
    pub fn pop_back_to(&mut self, kind: RouteKind) {
        while self.stack.len() > 1 && self.current().kind() != kind {
            self.stack.pop();
        }
    }

    /// Drop the whole stack and show home
    pub fn reset_to_home(&mut self) {
        self.stack.truncate(1);
    }
}
