//! Client-side form validation. Invalid forms never reach the network.

use regex::Regex;

pub const MIN_PASSWORD_LEN: usize = 6;

pub const LOGIN_EMAIL_INVALID: &str = "メールアドレスの形式が不正です";
pub const LOGIN_PASSWORD_TOO_SHORT: &str = "6文字以上で入力してください";

pub const REGISTER_NAME_REQUIRED: &str = "名前を入力してください";
pub const REGISTER_EMAIL_INVALID: &str = "正しいメールアドレスを入力してください";
pub const REGISTER_PASSWORD_TOO_SHORT: &str = "パスワードは6文字以上で入力してください";
pub const REGISTER_PASSWORD_MISMATCH: &str = "パスワードが一致しません";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Password,
    ConfirmPassword,
}

/// Per-field messages in the order the fields were checked.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<(Field, &'static str)>);

impl FieldErrors {
    fn push(&mut self, field: Field, message: &'static str) {
        // one message per field, first failure wins
        if self.get(field).is_none() {
            self.0.push((field, message));
        }
    }

    #[must_use]
    pub fn get(&self, field: Field) -> Option<&'static str> {
        self.0
            .iter()
            .find(|(candidate, _)| *candidate == field)
            .map(|(_, message)| *message)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

fn long_enough(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
}

#[derive(Clone, Debug, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    /// # Errors
    /// Returns the per-field messages when any field is invalid.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        if !valid_email(&self.email) {
            errors.push(Field::Email, LOGIN_EMAIL_INVALID);
        }
        if !long_enough(&self.password) {
            errors.push(Field::Password, LOGIN_PASSWORD_TOO_SHORT);
        }
        errors.into_result()
    }
}

#[derive(Clone, Debug, Default)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterForm {
    /// # Errors
    /// Returns the per-field messages when any field is invalid. A confirmation
    /// mismatch is reported on the confirmation field.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        if self.name.is_empty() {
            errors.push(Field::Name, REGISTER_NAME_REQUIRED);
        }
        if !valid_email(&self.email) {
            errors.push(Field::Email, REGISTER_EMAIL_INVALID);
        }
        if !long_enough(&self.password) {
            errors.push(Field::Password, REGISTER_PASSWORD_TOO_SHORT);
        }
        if !long_enough(&self.confirm_password) {
            errors.push(Field::ConfirmPassword, REGISTER_PASSWORD_TOO_SHORT);
        }
        if self.password != self.confirm_password {
            errors.push(Field::ConfirmPassword, REGISTER_PASSWORD_MISMATCH);
        }
        errors.into_result()
    }
}
