pub mod cli;
pub mod config;
pub mod database;
pub mod logging;
pub mod models;
pub mod navigation;
pub mod remote;
pub mod tui;
pub mod utils;
pub mod validation;

pub use config::Config;
pub use database::Database;
pub use models::{NewTask, Priority, RemoteTask, Task};
pub use utils::Profile;
