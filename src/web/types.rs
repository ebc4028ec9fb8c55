use serde::{Deserialize, Serialize};

/// A todo as returned by the backend through the proxy.
///
/// The backend spells timestamps `created_at`; older clients sent `createdAt`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: u64,
    pub title: String,
    pub completed: bool,
    #[serde(default, alias = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, alias = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NewTodo<'a> {
    pub title: &'a str,
}

/// Partial update; absent fields are left untouched by the backend.
#[derive(Debug, Default, Serialize)]
pub struct TodoUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
pub struct RegisterRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct UserSession {
    pub email: String,
}

/// Raw outcome of a registration attempt: the status and body are shown as-is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisterResponse {
    pub status: u16,
    pub text: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn todo_accepts_both_timestamp_spellings() {
        let snake: Todo = serde_json::from_str(
            r#"{"id":1,"title":"x","completed":false,"created_at":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        let camel: Todo = serde_json::from_str(
            r#"{"id":1,"title":"x","completed":false,"createdAt":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(snake, camel);
        assert_eq!(snake.updated_at, None);
    }

    #[test]
    fn update_omits_absent_fields() {
        let update = TodoUpdate {
            completed: Some(true),
            ..TodoUpdate::default()
        };
        assert_eq!(
            serde_json::to_string(&update).unwrap(),
            r#"{"completed":true}"#
        );
    }
}
