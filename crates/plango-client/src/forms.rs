use plango_types::{RegisterRequest, UserUpdate};

use crate::error::ApiError;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_PASSWORD_LEN: usize = 72;

#[derive(Clone, Debug, Default)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterForm {
    /// Checks the password rules before anything is sent to the server.
    pub fn validate(self) -> Result<RegisterRequest, ApiError> {
        if self.password != self.confirm_password {
            return Err(ApiError::Validation("Passwords do not match".into()));
        }
        let length = self.password.chars().count();
        if length < MIN_PASSWORD_LEN {
            return Err(ApiError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        if length > MAX_PASSWORD_LEN {
            return Err(ApiError::Validation(format!(
                "Password must be at most {MAX_PASSWORD_LEN} characters"
            )));
        }

        Ok(RegisterRequest {
            name: non_blank(self.name),
            email: self.email.trim().to_string(),
            password: self.password,
        })
    }
}

/// Profile page fields before they are folded into a [`UserUpdate`].
#[derive(Clone, Debug, Default)]
pub struct ProfileDraft {
    pub name: String,
    pub about: String,
    pub telegram: String,
    pub birthday: String,
    pub avatar_url: String,
}

impl ProfileDraft {
    /// Blank fields are dropped; telegram and birthday become extra bio lines.
    pub fn into_update(self) -> UserUpdate {
        let mut extras = Vec::new();
        if let Some(telegram) = non_blank(self.telegram) {
            extras.push(format!("Telegram: {telegram}"));
        }
        if let Some(birthday) = non_blank(self.birthday) {
            extras.push(format!("Birthday: {birthday}"));
        }

        let bio = match (non_blank(self.about), extras.is_empty()) {
            (Some(about), true) => Some(about),
            (Some(about), false) => Some(format!("{about}\n\n{}", extras.join("\n"))),
            (None, false) => Some(extras.join("\n")),
            (None, true) => None,
        };

        UserUpdate {
            name: non_blank(self.name),
            email: None,
            bio,
            avatar_url: non_blank(self.avatar_url),
        }
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(password: &str, confirm: &str) -> RegisterForm {
        RegisterForm {
            name: "  ".into(),
            email: " ana@example.com ".into(),
            password: password.into(),
            confirm_password: confirm.into(),
        }
    }

    #[test]
    fn register_password_rules() {
        let mismatch = form("secret1", "secret2").validate().unwrap_err();
        assert_eq!(mismatch.to_string(), "Passwords do not match");

        let short = form("abc", "abc").validate().unwrap_err();
        assert_eq!(short.to_string(), "Password must be at least 6 characters");

        let long = "x".repeat(73);
        let tooLong = form(&long, &long).validate().unwrap_err();
        assert_eq!(tooLong.to_string(), "Password must be at most 72 characters");

        let request = form("secret1", "secret1").validate().unwrap();
        assert_eq!(request.name, None);
        assert_eq!(request.email, "ana@example.com");
    }

    #[test]
    fn profile_extras_are_appended_to_bio() {
        let update = ProfileDraft {
            name: "Ana".into(),
            about: "Loves hiking".into(),
            telegram: "@ana".into(),
            birthday: "1990-04-01".into(),
            avatar_url: String::new(),
        }
        .into_update();

        assert_eq!(update.name.as_deref(), Some("Ana"));
        assert_eq!(
            update.bio.as_deref(),
            Some("Loves hiking\n\nTelegram: @ana\nBirthday: 1990-04-01")
        );
        assert_eq!(update.avatar_url, None);
    }

    #[test]
    fn extras_alone_form_the_bio() {
        let update = ProfileDraft {
            telegram: "@ana".into(),
            ..Default::default()
        }
        .into_update();
        assert_eq!(update.bio.as_deref(), Some("Telegram: @ana"));
        assert!(update.name.is_none());
    }
}
