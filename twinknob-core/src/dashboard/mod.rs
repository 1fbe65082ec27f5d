//! Encoder position dashboard
//!
//! Renders one text line per encoder into the display framebuffer:
//!
//! ```text
//! y=32   Position: 12
//! y=43   Position: -3
//! ```

use core::fmt::Write;

use heapless::String;
use twinknob_display::FrameBuffer;

/// Longest rendered line ("Position: -2147483648")
pub const MAX_LINE_LEN: usize = 24;

/// Text layout for the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Dashboard {
    /// Left edge of every line
    pub x: i32,
    /// Top of the first line
    pub y: i32,
    /// Distance between line tops
    pub line_spacing: i32,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Dashboard {
    pub const DEFAULT: Self = Self {
        x: 12,
        y: 32,
        line_spacing: 11,
    };

    /// Clear the framebuffer and draw one line per position
    pub fn render(&self, fb: &mut FrameBuffer<'_>, positions: &[i32]) {
        fb.fill(false);

        let mut y = self.y;
        for &position in positions {
            fb.draw_text(&position_line(position), self.x, y, true);
            y += self.line_spacing;
        }
    }
}

/// Text for one encoder line
pub fn position_line(position: i32) -> String<MAX_LINE_LEN> {
    let mut line = String::new();
    // Cannot overflow: the longest i32 fits in MAX_LINE_LEN
    let _ = write!(line, "Position: {}", position);
    line
}
