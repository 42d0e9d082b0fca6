//! Monochrome framebuffer.
use std::fmt;

use crate::constants::*;

/// 64x32 grid of pixels, stored row-major.
///
/// The display never wraps coordinates. Reads outside the grid are off and
/// writes outside the grid are ignored; clipping sprites is the job of the
/// draw instruction.
#[derive(Clone, PartialEq, Eq)]
pub struct Display {
    buffer: Box<[bool; DISPLAY_BUFFER_SIZE]>,
}

impl Default for Display {
    fn default() -> Self {
        Self {
            buffer: Box::new([false; DISPLAY_BUFFER_SIZE]),
        }
    }
}

impl Display {
    pub fn new() -> Self {
        Default::default()
    }

    #[inline(always)]
    fn index(x: usize, y: usize) -> Option<usize> {
        if x < DISPLAY_WIDTH && y < DISPLAY_HEIGHT {
            Some(x + y * DISPLAY_WIDTH)
        } else {
            None
        }
    }

    #[inline]
    pub fn pixel_at(&self, x: usize, y: usize) -> bool {
        Self::index(x, y).map(|i| self.buffer[i]).unwrap_or(false)
    }

    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, value: bool) {
        if let Some(i) = Self::index(x, y) {
            self.buffer[i] = value;
        }
    }

    pub fn clear(&mut self) {
        self.buffer.fill(false);
    }

    /// Flat row-major view of all 2048 pixels.
    pub fn as_slice(&self) -> &[bool; DISPLAY_BUFFER_SIZE] {
        &self.buffer
    }

    pub fn rows(&self) -> impl Iterator<Item = &[bool]> + '_ {
        self.buffer.chunks_exact(DISPLAY_WIDTH)
    }

    /// Number of pixels that are on.
    pub fn lit_count(&self) -> usize {
        self.buffer.iter().filter(|px| **px).count()
    }
}

/// Renders the buffer as ASCII art, `#` for on and `.` for off.
impl fmt::Display for Display {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for px in row {
                f.write_str(if *px { "#" } else { "." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Display {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Display")
            .field("lit", &self.lit_count())
            .finish()
    }
}
