use super::{
    api::ApiClient,
    forms::{FieldErrors, LoginForm},
    Navigation, TODOS_PATH,
};
use tracing::debug;

pub const LOGIN_FAILED: &str = "メールアドレスまたはパスワードが違います";

/// Login screen state: the form, its field errors and a form-level message.
#[derive(Debug)]
pub struct LoginPage {
    client: ApiClient,
    pub form: LoginForm,
    pub field_errors: FieldErrors,
    pub form_error: Option<&'static str>,
}

impl LoginPage {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            form: LoginForm::default(),
            field_errors: FieldErrors::default(),
            form_error: None,
        }
    }

    /// Validate, then exchange the credentials. Any rejection, whatever the
    /// cause, shows the same message and keeps the user on the page.
    pub async fn submit(&mut self) -> Navigation {
        self.form_error = None;
        self.field_errors = FieldErrors::default();

        if let Err(errors) = self.form.validate() {
            self.field_errors = errors;
            return Navigation::Stay;
        }

        match self.client.login(&self.form.email, &self.form.password).await {
            Ok(_) => Navigation::Navigate(TODOS_PATH),
            Err(err) => {
                debug!("login rejected: {err}");
                self.form_error = Some(LOGIN_FAILED);
                Navigation::Stay
            }
        }
    }
}
