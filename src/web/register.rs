use super::{
    api::ApiClient,
    forms::{FieldErrors, RegisterForm},
    Navigation, LOGIN_PATH,
};
use tracing::error;

pub const REGISTER_FAILED: &str = "登録に失敗しました";
pub const SERVER_ERROR: &str = "サーバーエラーが発生しました";

#[derive(Debug)]
pub struct RegisterPage {
    client: ApiClient,
    pub form: RegisterForm,
    pub field_errors: FieldErrors,
    pub server_error: Option<String>,
}

impl RegisterPage {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            form: RegisterForm::default(),
            field_errors: FieldErrors::default(),
            server_error: None,
        }
    }

    /// Only a `201` counts as registered; any other status shows the backend's
    /// text, or a generic message when it sent none.
    pub async fn submit(&mut self) -> Navigation {
        self.server_error = None;
        self.field_errors = FieldErrors::default();

        if let Err(errors) = self.form.validate() {
            self.field_errors = errors;
            return Navigation::Stay;
        }

        let result = self
            .client
            .register(&self.form.name, &self.form.email, &self.form.password)
            .await;

        match result {
            Ok(response) if response.status == 201 => Navigation::Navigate(LOGIN_PATH),
            Ok(response) => {
                self.server_error = Some(if response.text.is_empty() {
                    REGISTER_FAILED.to_string()
                } else {
                    response.text
                });
                Navigation::Stay
            }
            Err(err) => {
                error!("registration request failed: {err}");
                self.server_error = Some(SERVER_ERROR.to_string());
                Navigation::Stay
            }
        }
    }
}
