use crate::framebuffer::{FrameBuffer, DISPLAY_HEIGHT, DISPLAY_WIDTH};
use crate::glyph::GlyphSet;

/// Typeset error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypesetError {
    /// Character outside the supported `0`-`9` and `.` alphabet.
    UnsupportedCharacter { character: char, index: usize },
}

/// Implementation of the `Display` trait for `TypesetError`.
impl core::fmt::Display for TypesetError {
    /// Format the error message.
    ///
    /// # Arguments
    /// * `f` - The formatter to write the error message to.
    ///
    /// # Returns
    /// * `core::fmt::Result` - The result of the formatting operation.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TypesetError::UnsupportedCharacter { character, index } => {
                write!(f, "Unsupported character '{character}' at index {index}")
            }
        }
    }
}

/// Implementation of the `Error` trait for `TypesetError`.
impl std::error::Error for TypesetError {}

/// Layout configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypesetConfig {
    /// Radius of the filled decimal-point dot in pixels.
    pub point_radius: i32,

    /// Horizontal gap after every character, including the last.
    pub char_gap: i32,
}

/// Implementation of the `Default` trait for `TypesetConfig`.
impl Default for TypesetConfig {
    /// A 3-pixel dot and no inter-character gap.
    fn default() -> Self {
        Self {
            point_radius: 3,
            char_gap: 0,
        }
    }
}

/// One positioned digit glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// The digit value, 0 through 9.
    pub digit: u8,

    /// The X coordinate of the glyph's left edge.
    pub x: i32,
}

/// Computed horizontal layout for one numeric string.
///
/// Purely derived from the string and the glyph geometry. A string wider
/// than the display keeps its negative leading offset; drawing clips at the
/// framebuffer edges instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Positioned digit glyphs, left to right.
    pub placements: Vec<Placement>,

    /// Center of the deferred decimal-point dot, if the string has one.
    pub point_center: Option<(i32, i32)>,

    /// The X coordinate the first character starts at.
    pub origin_x: i32,

    /// The summed width of the whole string in pixels.
    pub total_width: i32,
}

/// Centers numeric strings on the display and draws them from fixed-size
/// digit bitmaps.
pub struct Typesetter {
    glyphs: GlyphSet,
    config: TypesetConfig,
}

/// The typesetter implementation.
impl Typesetter {
    /// Create a new typesetter.
    ///
    /// # Arguments
    /// * `glyphs` - The digit glyph set, shared by every render call.
    /// * `config` - The layout configuration.
    ///
    /// # Returns
    /// * `Typesetter` - The typesetter.
    pub fn new(glyphs: GlyphSet, config: TypesetConfig) -> Self {
        Self { glyphs, config }
    }

    /// Horizontal advance of one character, including the trailing gap.
    ///
    /// # Arguments
    /// * `character` - The character to measure.
    /// * `index` - The character's index, reported on error.
    ///
    /// # Returns
    /// * `Result<i32, TypesetError>` - The advance in pixels.
    fn advance_of(&self, character: char, index: usize) -> Result<i32, TypesetError> {
        let width = match character {
            '0'..='9' => self.glyphs.width() as i32,
            '.' => 2 * self.config.point_radius,
            _ => return Err(TypesetError::UnsupportedCharacter { character, index }),
        };

        Ok(width + self.config.char_gap)
    }

    /// Sum the width of a whole string, left to right.
    ///
    /// This is also the validation pass: it rejects the string before any
    /// drawing can happen.
    ///
    /// # Arguments
    /// * `text` - The numeric string to measure.
    ///
    /// # Returns
    /// * `Result<i32, TypesetError>` - The total width in pixels.
    pub fn measure(&self, text: &str) -> Result<i32, TypesetError> {
        let mut width = 0;

        for (index, character) in text.chars().enumerate() {
            width += self.advance_of(character, index)?;
        }

        Ok(width)
    }

    /// The fixed Y coordinate glyphs are drawn at, independent of the string.
    ///
    /// # Returns
    /// * `i32` - The Y coordinate of every glyph's top edge.
    pub fn glyph_top(&self) -> i32 {
        ((DISPLAY_HEIGHT as f32 - self.glyphs.height() as f32) / 2.0).round() as i32
    }

    /// Compute the centered layout for a numeric string.
    ///
    /// # Arguments
    /// * `text` - The numeric string to lay out.
    ///
    /// # Returns
    /// * `Result<Layout, TypesetError>` - The layout, or the first rejected character.
    pub fn compose(&self, text: &str) -> Result<Layout, TypesetError> {
        let total_width = self.measure(text)?;

        let origin_x = ((DISPLAY_WIDTH as f32 - total_width as f32) / 2.0).round() as i32;

        let radius = self.config.point_radius;
        let glyph_width = self.glyphs.width() as i32;
        let glyph_height = self.glyphs.height() as i32;
        let top = self.glyph_top();

        let mut placements = Vec::with_capacity(text.len());
        let mut point_center = None;
        let mut x = origin_x;

        for character in text.chars() {
            if let Some(digit) = character.to_digit(10) {
                placements.push(Placement {
                    digit: digit as u8,
                    x,
                });
                x += glyph_width + self.config.char_gap;
            } else {
                // Only '.' survives the width pass. Its dot is recorded here
                // and drawn after every glyph, so no bitmap edge can clip it.
                point_center = Some((x + radius, top + glyph_height - 2 * radius));
                x += 2 * radius + self.config.char_gap;
            }
        }

        Ok(Layout {
            placements,
            point_center,
            origin_x,
            total_width,
        })
    }

    /// Draw a numeric string centered on the framebuffer.
    ///
    /// The whole string is validated before the first pixel is written; a
    /// rejected string leaves the framebuffer untouched. Digits are blitted
    /// left to right, then the deferred decimal-point dot is drawn last.
    ///
    /// # Arguments
    /// * `text` - The numeric string to draw.
    /// * `frame` - The framebuffer to draw onto.
    ///
    /// # Returns
    /// * `Result<(), TypesetError>` - Ok, or the first rejected character.
    pub fn render(&self, text: &str, frame: &mut FrameBuffer) -> Result<(), TypesetError> {
        let layout = self.compose(text)?;

        let top = self.glyph_top();

        for placement in &layout.placements {
            frame.blit(self.glyphs.digit(placement.digit), placement.x, top);
        }

        if let Some((cx, cy)) = layout.point_center {
            let radius = self.config.point_radius;
            frame.draw_ellipse(cx, cy, radius, radius, true, true);
        }

        Ok(())
    }

    /// Redraw the progress strip along the bottom edge.
    ///
    /// Clears the strip, then fills `round(display_width * fraction)` pixels
    /// of it. The fraction is clamped to the unit interval.
    ///
    /// # Arguments
    /// * `fraction` - How much of the strip to fill, 0.0 through 1.0.
    /// * `height` - The strip height in pixels.
    /// * `frame` - The framebuffer to draw onto.
    pub fn progress_bar(&self, fraction: f32, height: i32, frame: &mut FrameBuffer) {
        let fraction = fraction.clamp(0.0, 1.0);

        let y = DISPLAY_HEIGHT as i32 - height;
        let filled = (DISPLAY_WIDTH as f32 * fraction).round() as i32;

        frame.fill_rect(0, y, DISPLAY_WIDTH as i32, height, false, true);
        frame.fill_rect(0, y, filled, height, true, true);
    }
}
