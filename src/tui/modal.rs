// Modal system for TUI overlays
//
// Self-contained modal dialogs that handle their own input and return actions.
// App just holds Option<Modal>, input routing acts on returned ModalAction.

use crate::dispatch::Credentials;
use crossterm::event::KeyCode;

/// Actions returned by modal input handling
#[derive(Debug, Clone, PartialEq)]
pub enum ModalAction {
    /// Input consumed, no state change needed
    None,
    /// Close the modal
    Close,
    /// Send the login form
    SubmitLogin(Credentials),
}

/// Which login field receives typed characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Username,
    Password,
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub focus: LoginField,
    /// Last failure, shown under the fields
    pub error: Option<String>,
    /// A login request is in flight
    pub submitting: bool,
}

impl LoginForm {
    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            LoginField::Username => &mut self.username,
            LoginField::Password => &mut self.password,
        }
    }

    fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            LoginField::Username => LoginField::Password,
            LoginField::Password => LoginField::Username,
        };
    }

    fn handle_input(&mut self, key: KeyCode) -> ModalAction {
        if self.submitting {
            return match key {
                KeyCode::Esc => ModalAction::Close,
                _ => ModalAction::None,
            };
        }

        match key {
            KeyCode::Esc => ModalAction::Close,
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.toggle_focus();
                ModalAction::None
            }
            KeyCode::Backspace => {
                self.focused_mut().pop();
                ModalAction::None
            }
            KeyCode::Char(c) => {
                self.focused_mut().push(c);
                ModalAction::None
            }
            KeyCode::Enter => {
                if self.focus == LoginField::Username && self.password.is_empty() {
                    self.focus = LoginField::Password;
                    return ModalAction::None;
                }
                if self.username.is_empty() {
                    self.error = Some("username is required".to_string());
                    self.focus = LoginField::Username;
                    return ModalAction::None;
                }

                self.error = None;
                self.submitting = true;
                ModalAction::SubmitLogin(Credentials {
                    username: self.username.clone(),
                    password: self.password.clone(),
                })
            }
            _ => ModalAction::None,
        }
    }
}

/// Available modal types
#[derive(Debug, Clone)]
pub enum Modal {
    /// Help overlay - shows keyboard shortcuts
    Help,
    /// Login form
    Login(LoginForm),
}

impl Modal {
    pub fn help() -> Self {
        Modal::Help
    }

    pub fn login() -> Self {
        Modal::Login(LoginForm::default())
    }

    /// Handle keyboard input, return action for caller to execute
    pub fn handle_input(&mut self, key: KeyCode) -> ModalAction {
        match self {
            Modal::Help => match key {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('?') | KeyCode::Char('q') => {
                    ModalAction::Close
                }
                _ => ModalAction::None,
            },
            Modal::Login(form) => form.handle_input(key),
        }
    }
}
