//! Todo list screen.
//!
//! The list is fetched once; mutations update the local copy after the proxy
//! confirms them and never trigger a re-fetch.

use super::{
    api::ApiClient,
    types::{Todo, TodoUpdate, UserSession},
    Navigation, LOGIN_PATH,
};
use tracing::error;

pub const FETCH_FAILED: &str = "Todo の取得に失敗しました";
pub const CREATE_FAILED: &str = "Todo の追加に失敗しました";
pub const UPDATE_FAILED: &str = "Todo の更新に失敗しました";
pub const DELETE_FAILED: &str = "Todo の削除に失敗しました";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthStatus {
    Loading,
    Authenticated(UserSession),
    Unauthenticated,
}

/// One rendered row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TodoItem {
    pub id: u64,
    pub title: String,
    pub checked: bool,
}

#[derive(Debug)]
pub struct TodoPage {
    client: ApiClient,
    status: AuthStatus,
    todos: Vec<Todo>,
    loading: bool,
    error: Option<&'static str>,
}

impl TodoPage {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            status: AuthStatus::Loading,
            todos: Vec::new(),
            loading: true,
            error: None,
        }
    }

    /// Resolve the session, then fetch the list only when authenticated.
    pub async fn load(&mut self) {
        match self.client.session().await {
            Ok(Some(session)) => self.status = AuthStatus::Authenticated(session),
            Ok(None) => {
                self.status = AuthStatus::Unauthenticated;
                return;
            }
            Err(err) => {
                error!("session lookup failed: {err}");
                self.status = AuthStatus::Unauthenticated;
                return;
            }
        }

        self.loading = true;
        self.error = None;
        match self.client.fetch_todos().await {
            Ok(todos) => self.todos = todos,
            Err(err) => {
                error!("fetching todos failed: {err}");
                self.error = Some(FETCH_FAILED);
            }
        }
        self.loading = false;
    }

    /// Blank titles are ignored. The created todo, as echoed by the backend, is
    /// appended exactly once.
    pub async fn add(&mut self, title: &str) {
        let title = title.trim();
        if title.is_empty() {
            return;
        }
        match self.client.create_todo(title).await {
            Ok(created) => self.todos.push(created),
            Err(err) => {
                error!("creating todo failed: {err}");
                self.error = Some(CREATE_FAILED);
            }
        }
    }

    /// Flip `completed` for `id` based on the local copy.
    pub async fn toggle(&mut self, id: u64) {
        let Some(current) = self.todos.iter().find(|todo| todo.id == id) else {
            return;
        };
        let completed = !current.completed;
        let update = TodoUpdate {
            completed: Some(completed),
            ..TodoUpdate::default()
        };

        match self.client.update_todo(id, &update).await {
            Ok(()) => {
                if let Some(todo) = self.todos.iter_mut().find(|todo| todo.id == id) {
                    todo.completed = completed;
                }
            }
            Err(err) => {
                error!("updating todo {id} failed: {err}");
                self.error = Some(UPDATE_FAILED);
            }
        }
    }

    pub async fn delete(&mut self, id: u64) {
        match self.client.delete_todo(id).await {
            Ok(()) => self.todos.retain(|todo| todo.id != id),
            Err(err) => {
                error!("deleting todo {id} failed: {err}");
                self.error = Some(DELETE_FAILED);
            }
        }
    }

    /// Clear the session cookie and head back to the login page.
    pub async fn sign_out(&mut self) -> Navigation {
        if let Err(err) = self.client.logout().await {
            error!("logout failed: {err}");
        }
        self.status = AuthStatus::Unauthenticated;
        self.todos.clear();
        Navigation::Navigate(LOGIN_PATH)
    }

    #[must_use]
    pub fn items(&self) -> Vec<TodoItem> {
        self.todos
            .iter()
            .map(|todo| TodoItem {
                id: todo.id,
                title: todo.title.clone(),
                checked: todo.completed,
            })
            .collect()
    }

    #[must_use]
    pub const fn status(&self) -> &AuthStatus {
        &self.status
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub const fn error(&self) -> Option<&'static str> {
        self.error
    }

    #[must_use]
    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }
}
