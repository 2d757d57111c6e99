//! Text rendering of the view state.
//!
//! Pure function of the state: the action label, the error message when
//! present, and one line per populated image. No state of its own, no I/O.

use crate::ViewState;

/// Label shown on the submit action.
pub fn action_label(state: &ViewState) -> &'static str {
    if state.loading {
        "Generating..."
    } else {
        "Generate Screenshots"
    }
}

/// Render the current view state as terminal output.
pub fn render(state: &ViewState) -> String {
    let mut out = String::new();
    out.push_str(&format!("[ {} ]\n", action_label(state)));

    if let Some(error) = &state.error {
        out.push_str(&format!("error: {}\n", error));
    }
    if let Some(mobile) = &state.mobile {
        out.push_str(&format!("mobile:  {}\n", mobile.path().display()));
    }
    if let Some(desktop) = &state.desktop {
        out.push_str(&format!("desktop: {}\n", desktop.path().display()));
    }
    out
}
