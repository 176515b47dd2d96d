//! Contracts of the renderer and display-mode switch
//!
//! Pixels, fonts and layout live behind [`PickerView`]. The orchestrators only
//! sequence its calls and react to the input events it reports.

use super::entry::BootEntry;
use super::session::{CursorOffset, SessionContext};
use crate::error::ViewError;

/// Console screen mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScreenMode {
    /// Text console
    #[default]
    Text,
    /// Graphics output
    Graphics,
    /// Graphics output that text writes cannot disturb
    GraphicsExclusive,
}

/// Console mode switch
pub trait DisplayControl {
    /// Switch mode, returning the previous one
    fn set_mode(&mut self, mode: ScreenMode) -> ScreenMode;
}

/// Which view a session shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    /// Boot entry list
    BootPicker {
        /// Number of entries that will be registered
        entry_count: usize,
    },
    /// Password prompt
    Password,
}

/// Input reported by one poll of the view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Input that changes nothing but counts as user activity
    Activity,
    /// Focus moved to an entry
    Focus(usize),
    /// Entry chosen
    Select(usize),
    /// Menu must be rebuilt
    Refresh,
    /// Show or hide auxiliary entries
    ToggleAuxiliary,
    /// Password character
    Char(char),
    /// Delete the last password character
    Backspace,
    /// Submit the password
    Submit,
}

/// Renderer driven by the picker sessions
pub trait PickerView {
    /// Build the drawing context at the session's cursor position
    fn construct(&mut self, session: &SessionContext) -> Result<(), ViewError>;

    /// Create the view's widgets
    fn initialize_view(&mut self, kind: ViewKind, session: &SessionContext) -> Result<(), ViewError>;

    /// Add one boot entry
    fn register_entry(&mut self, index: usize, entry: &BootEntry) -> Result<(), ViewError>;

    /// Finish setup once all entries exist, focusing the default
    fn late_initialize(&mut self, default_index: usize);

    /// Draw everything and flush to the screen
    fn redraw_and_flush(&mut self);

    /// Advance animations and draw one frame
    fn draw_frame(&mut self, session: &SessionContext);

    /// Next pending input, if any
    fn poll_input(&mut self) -> Option<InputEvent>;

    /// Fill the screen with the background colour
    fn clear_screen(&mut self);

    /// Tear down the view's widgets
    fn deinitialize_view(&mut self);

    /// Release the drawing context
    fn destruct(&mut self);

    /// Pointer position to carry into the next session
    fn cursor_position(&self) -> Option<CursorOffset> {
        None
    }
}
