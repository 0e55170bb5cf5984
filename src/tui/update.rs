//! TEA Update Function
//!
//! ```text
//! update : Msg -> Model -> (Model, Cmd)
//! ```
//!
//! The update function is pure: it only rearranges view state and describes
//! side effects as commands. Selecting files, talking to the submission
//! controller and scanning directories all happen in the runtime (app.rs).

use super::msg::Msg;
use super::state;
use crate::chart::ChartSource;

/// Commands that need to be executed by the runtime (imperative shell)
#[derive(Debug, Clone, PartialEq)]
pub enum Cmd {
    /// No command
    None,
    /// Multiple commands to execute, in order
    Batch(Vec<Cmd>),
    /// Quit the application
    Quit,
    /// List videos in the working directory into the picker
    ScanVideos,
    /// Select the picker entry at this position
    SelectFile(usize),
    /// Drop the current selection
    ClearSelection,
    /// Hand the selected file to the submission controller
    Submit,
    /// Ask the submission controller to return to idle
    Reset,
    /// Set status message
    SetStatus(String),
}

impl Cmd {
    /// Create a batch of commands
    pub fn batch(cmds: Vec<Cmd>) -> Cmd {
        // Filter out None commands
        let mut cmds: Vec<Cmd> = cmds
            .into_iter()
            .filter(|c| !matches!(c, Cmd::None))
            .collect();
        match cmds.len() {
            0 => Cmd::None,
            1 => cmds.pop().unwrap_or(Cmd::None), // Safe: len == 1 guarantees element
            _ => Cmd::Batch(cmds),
        }
    }

    /// Check if this is a quit command
    pub fn is_quit(&self) -> bool {
        matches!(self, Cmd::Quit)
    }
}

/// View state of the TUI
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    // Results list; `item_count` is the length of the list the chart source shows
    pub selected_index: usize,
    pub scroll_offset: usize,
    pub item_count: usize,
    pub visible_items: usize,
    pub frame_count: usize,
    pub sampled_count: usize,

    // Picker
    pub picker_open: bool,
    pub picker_cursor: usize,
    pub picker_len: usize,

    // Display
    pub chart_source: ChartSource,
    pub help_open: bool,
}

impl Default for Model {
    fn default() -> Self {
        Self {
            selected_index: 0,
            scroll_offset: 0,
            item_count: 0,
            visible_items: 20,
            frame_count: 0,
            sampled_count: 0,
            picker_open: false,
            picker_cursor: 0,
            picker_len: 0,
            chart_source: ChartSource::default(),
            help_open: false,
        }
    }
}

impl Model {
    /// Length of the list shown under the current chart source
    pub fn active_len(&self) -> usize {
        self.chart_source
            .resolve_len(self.frame_count, self.sampled_count)
            .1
    }

    fn with_selection(self, selected_index: usize) -> Self {
        let scroll_offset =
            state::calculate_scroll_offset(selected_index, self.scroll_offset, self.visible_items);
        Model {
            selected_index,
            scroll_offset,
            ..self
        }
    }
}

/// The core update function - processes a message and returns new state + commands
pub fn update(msg: Msg, model: Model) -> (Model, Cmd) {
    match msg {
        // === Lifecycle ===
        Msg::Quit => (model, Cmd::Quit),

        Msg::Tick | Msg::Noop => (model, Cmd::None),

        Msg::Resize(_, height) => {
            // Header, footer and panel borders take 8 rows
            let visible_items = (height as usize).saturating_sub(8).max(1);
            let model = Model {
                visible_items,
                ..model
            };
            let selected = model.selected_index;
            (model.with_selection(selected), Cmd::None)
        }

        // === Results list ===
        Msg::MoveUp => {
            let selected = state::move_selection_up(model.selected_index);
            (model.with_selection(selected), Cmd::None)
        }

        Msg::MoveDown => {
            let selected = state::move_selection_down(model.selected_index, model.item_count);
            (model.with_selection(selected), Cmd::None)
        }

        Msg::JumpToTop => (
            Model {
                selected_index: 0,
                scroll_offset: 0,
                ..model
            },
            Cmd::None,
        ),

        Msg::JumpToBottom => {
            let selected = model.item_count.saturating_sub(1);
            (model.with_selection(selected), Cmd::None)
        }

        // === File picker ===
        Msg::OpenPicker => (
            Model {
                picker_open: true,
                picker_cursor: 0,
                help_open: false,
                ..model
            },
            Cmd::ScanVideos,
        ),

        Msg::PickerUp => (
            Model {
                picker_cursor: state::move_selection_up(model.picker_cursor),
                ..model
            },
            Cmd::None,
        ),

        Msg::PickerDown => (
            Model {
                picker_cursor: state::move_selection_down(model.picker_cursor, model.picker_len),
                ..model
            },
            Cmd::None,
        ),

        Msg::PickerConfirm => {
            if model.picker_len == 0 {
                return (
                    Model {
                        picker_open: false,
                        ..model
                    },
                    Cmd::SetStatus("No videos found in this directory".to_string()),
                );
            }
            let cursor = state::clamp_selection(model.picker_cursor, model.picker_len);
            (
                Model {
                    picker_open: false,
                    ..model
                },
                Cmd::SelectFile(cursor),
            )
        }

        Msg::ClearSelection => (model, Cmd::ClearSelection),

        // === Submission ===
        Msg::Submit => (model, Cmd::Submit),

        Msg::Reset => (model, Cmd::Reset),

        Msg::Retry => (model, Cmd::batch(vec![Cmd::Reset, Cmd::Submit])),

        Msg::SubmissionSettled { frames, sampled } => {
            let model = Model {
                selected_index: 0,
                scroll_offset: 0,
                frame_count: frames,
                sampled_count: sampled,
                ..model
            };
            (
                Model {
                    item_count: model.active_len(),
                    ..model
                },
                Cmd::None,
            )
        }

        // === Display ===
        Msg::ToggleChartSource => {
            let model = Model {
                chart_source: model.chart_source.toggle(),
                ..model
            };
            let item_count = model.active_len();
            let selected = state::clamp_selection(model.selected_index, item_count);
            (
                Model {
                    item_count,
                    scroll_offset: 0,
                    ..model
                }
                .with_selection(selected),
                Cmd::None,
            )
        }

        Msg::ToggleHelp => (
            Model {
                help_open: !model.help_open,
                ..model
            },
            Cmd::None,
        ),

        Msg::CloseModal => (
            Model {
                help_open: false,
                picker_open: false,
                ..model
            },
            Cmd::None,
        ),
    }
}
