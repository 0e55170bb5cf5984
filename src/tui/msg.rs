//! TEA Message Types for the TUI
//!
//! This module defines the Msg enum representing all possible user actions.
//! Following The Elm Architecture (TEA), messages are:
//! - Data describing what happened (not how to handle it)
//! - The only way to trigger state changes
//! - Processed by a single update function

use crossterm::event::{KeyCode, KeyModifiers};

/// All possible messages/actions in the TUI
#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    // === Results list ===
    /// Move selection up by one
    MoveUp,
    /// Move selection down by one
    MoveDown,
    /// Jump to first frame
    JumpToTop,
    /// Jump to last frame
    JumpToBottom,

    // === File picker ===
    /// Open the video picker
    OpenPicker,
    /// Move picker cursor up
    PickerUp,
    /// Move picker cursor down
    PickerDown,
    /// Choose the file under the cursor
    PickerConfirm,
    /// Forget the current selection
    ClearSelection,

    // === Submission ===
    /// Send the selected video
    Submit,
    /// Discard the result or error and return to idle
    Reset,
    /// Reset then submit again
    Retry,

    // === Display ===
    /// Switch between anomaly frames and all sampled frames
    ToggleChartSource,
    /// Toggle help modal
    ToggleHelp,
    /// Close any open modal
    CloseModal,

    // === Lifecycle ===
    /// Quit the application
    Quit,
    /// Tick event (for status expiry)
    Tick,
    /// Window resized
    Resize(u16, u16),

    // === Internal ===
    /// The in-flight submission settled; carries the lengths of the anomaly
    /// list and of the sampled series
    SubmissionSettled { frames: usize, sampled: usize },
    /// No operation (for unhandled keys)
    Noop,
}

/// Convert a key event to a message
///
/// This is a pure function - no side effects, just pattern matching.
pub fn key_to_msg(
    code: KeyCode,
    modifiers: KeyModifiers,
    picker_open: bool,
    help_open: bool,
) -> Msg {
    if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
        return Msg::Quit;
    }

    if help_open {
        return match code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => Msg::CloseModal,
            _ => Msg::Noop,
        };
    }

    if picker_open {
        return match code {
            KeyCode::Esc | KeyCode::Char('q') => Msg::CloseModal,
            KeyCode::Char('j') | KeyCode::Down => Msg::PickerDown,
            KeyCode::Char('k') | KeyCode::Up => Msg::PickerUp,
            KeyCode::Enter | KeyCode::Char(' ') => Msg::PickerConfirm,
            _ => Msg::Noop,
        };
    }

    match code {
        KeyCode::Char('q') => Msg::Quit,

        KeyCode::Char('j') | KeyCode::Down => Msg::MoveDown,
        KeyCode::Char('k') | KeyCode::Up => Msg::MoveUp,
        KeyCode::Char('g') | KeyCode::Home => Msg::JumpToTop,
        KeyCode::Char('G') | KeyCode::End => Msg::JumpToBottom,

        KeyCode::Char('o') => Msg::OpenPicker,
        KeyCode::Char('x') => Msg::ClearSelection,

        KeyCode::Char('s') | KeyCode::Enter => Msg::Submit,
        KeyCode::Char('r') => Msg::Reset,
        KeyCode::Char('R') => Msg::Retry,

        KeyCode::Char('c') | KeyCode::Tab => Msg::ToggleChartSource,
        KeyCode::Char('?') => Msg::ToggleHelp,
        KeyCode::Esc => Msg::CloseModal,

        _ => Msg::Noop,
    }
}
