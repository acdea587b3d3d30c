//! Display renderer trait for the output panel

use crate::format::Frame;

/// Errors that can occur while driving the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Bus transfer to the panel failed
    Bus,
    /// Panel not initialized
    NotReady,
}

/// Trait for the output panel
///
/// The panel shows a fixed three-line payload. `draw` prepares it
/// off-screen, `flush` commits it in one go.
pub trait DisplayRenderer {
    /// Replace the off-screen contents with `frame`
    fn draw(&mut self, frame: &Frame) -> Result<(), DisplayError>;

    /// Commit the off-screen contents to the panel
    fn flush(&mut self) -> Result<(), DisplayError>;

    /// Draw and commit in one call
    fn show(&mut self, frame: &Frame) -> Result<(), DisplayError> {
        self.draw(frame)?;
        self.flush()
    }
}
