use crate::error::AppError;
use bitglyph_core::glyph::GlyphSet;

/// Width in pixels of every digit bitmap.
pub const GLYPH_WIDTH: usize = 32;

/// Height in pixels of every digit bitmap.
pub const GLYPH_HEIGHT: usize = 32;

/// Packed digit bitmaps, row-major, most significant bit first. One 128-byte
/// asset per digit, embedded at build time.
const DIGIT_BITMAPS: [&[u8]; 10] = [
  include_bytes!("../assets/glyphs/0.bin"),
  include_bytes!("../assets/glyphs/1.bin"),
  include_bytes!("../assets/glyphs/2.bin"),
  include_bytes!("../assets/glyphs/3.bin"),
  include_bytes!("../assets/glyphs/4.bin"),
  include_bytes!("../assets/glyphs/5.bin"),
  include_bytes!("../assets/glyphs/6.bin"),
  include_bytes!("../assets/glyphs/7.bin"),
  include_bytes!("../assets/glyphs/8.bin"),
  include_bytes!("../assets/glyphs/9.bin"),
];

/// Build and validate the digit glyph set.
///
/// Runs once at startup; a malformed asset is fatal before the loop begins.
///
/// # Returns
/// The glyph set.
pub fn load_glyph_set() -> Result<GlyphSet, AppError> {
  let set = GlyphSet::from_packed(GLYPH_WIDTH, GLYPH_HEIGHT, DIGIT_BITMAPS)?;

  Ok(set)
}
