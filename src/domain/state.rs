use serde::Serialize;
use std::fmt;

/// Lifecycle state of a mounted payment form. Exactly one is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FormState {
    Loading,
    Ready,
    Processing,
    /// Terminal for the current mount; recovery needs a full remount.
    ErroredUnrecoverable { message: String },
}

impl FormState {
    pub fn is_ready(&self) -> bool {
        matches!(self, FormState::Ready)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, FormState::ErroredUnrecoverable { .. })
    }

    /// Whether a card input may exist in this state.
    pub fn allows_widget(&self) -> bool {
        matches!(self, FormState::Ready | FormState::Processing)
    }
}

impl fmt::Display for FormState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormState::Loading => f.write_str("loading"),
            FormState::Ready => f.write_str("ready"),
            FormState::Processing => f.write_str("processing"),
            FormState::ErroredUnrecoverable { .. } => f.write_str("errored"),
        }
    }
}

/// Which affordances the host should render for the current state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormView {
    pub state: FormState,
    pub submit_enabled: bool,
    pub button_label: String,
    /// Terminal error, shown with a reload affordance.
    pub error_message: Option<String>,
    /// Last recoverable failure, shown inline while the form stays usable.
    pub inline_error: Option<String>,
    pub show_reload: bool,
}

impl FormView {
    pub fn new(
        state: &FormState,
        disabled: bool,
        inline_error: Option<String>,
        amount_label: &str,
    ) -> Self {
        let button_label = match state {
            FormState::Loading => "Loading...".to_string(),
            FormState::Processing => "Processing...".to_string(),
            FormState::Ready | FormState::ErroredUnrecoverable { .. } => {
                format!("Pay {amount_label}")
            }
        };
        let error_message = match state {
            FormState::ErroredUnrecoverable { message } => Some(message.clone()),
            _ => None,
        };

        Self {
            state: state.clone(),
            submit_enabled: state.is_ready() && !disabled,
            button_label,
            show_reload: error_message.is_some(),
            error_message,
            inline_error,
        }
    }
}
