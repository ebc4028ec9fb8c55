//! Client side of the todo app.
//!
//! Form validation and page controllers that talk to the proxy over HTTP with
//! a cookie-carrying client. Pages never see the backend token; they only hold
//! the session cookie the proxy issued.

pub mod api;
pub mod errors;
pub mod forms;
pub mod login;
pub mod register;
pub mod todos;
pub mod types;

pub use api::ApiClient;
pub use errors::AppError;

/// Where a page controller wants the browser to go next.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Navigation {
    Stay,
    Navigate(&'static str),
}

pub const LOGIN_PATH: &str = "/login";
pub const TODOS_PATH: &str = "/todos";
