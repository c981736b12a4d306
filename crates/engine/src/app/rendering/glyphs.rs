//! 3x5 bitmap font. Each glyph packs five rows of three bits, top row in the
//! highest bits. Lowercase letters render as uppercase; characters outside the
//! table render as `?`.

pub(crate) const GLYPH_WIDTH: i32 = 3;
pub(crate) const GLYPH_HEIGHT: i32 = 5;

const UNKNOWN: u16 = 0b111_001_011_000_010;

pub(crate) fn glyph_bits(ch: char) -> u16 {
    match ch.to_ascii_uppercase() {
        ' ' => 0,
        'A' => 0b010_101_111_101_101,
        'B' => 0b110_101_110_101_110,
        'C' => 0b111_100_100_100_111,
        'D' => 0b110_101_101_101_110,
        'E' => 0b111_100_110_100_111,
        'F' => 0b111_100_110_100_100,
        'G' => 0b111_100_101_101_111,
        'H' => 0b101_101_111_101_101,
        'I' => 0b111_010_010_010_111,
        'J' => 0b111_001_001_101_111,
        'K' => 0b101_101_110_101_101,
        'L' => 0b100_100_100_100_111,
        'M' => 0b101_111_111_101_101,
        'N' => 0b110_101_101_101_101,
        'O' => 0b111_101_101_101_111,
        'P' => 0b110_101_110_100_100,
        'Q' => 0b111_101_101_111_001,
        'R' => 0b110_101_110_101_101,
        'S' => 0b111_100_111_001_111,
        'T' => 0b111_010_010_010_010,
        'U' => 0b101_101_101_101_111,
        'V' => 0b101_101_101_101_010,
        'W' => 0b101_101_111_111_101,
        'X' => 0b101_101_010_101_101,
        'Y' => 0b101_101_010_010_010,
        'Z' => 0b111_001_010_100_111,
        '0' => 0b010_101_101_101_010,
        '1' => 0b010_110_010_010_111,
        '2' => 0b111_001_111_100_111,
        '3' => 0b111_001_111_001_111,
        '4' => 0b101_101_111_001_001,
        '5' => 0b111_100_111_001_111,
        '6' => 0b111_100_111_101_111,
        '7' => 0b111_001_010_010_010,
        '8' => 0b111_101_111_101_111,
        '9' => 0b111_101_111_001_111,
        '.' => 0b000_000_000_000_010,
        ',' => 0b000_000_000_010_100,
        ':' => 0b000_010_000_010_000,
        '-' => 0b000_000_111_000_000,
        '+' => 0b000_010_111_010_000,
        '=' => 0b000_111_000_111_000,
        '/' => 0b001_001_010_100_100,
        '(' => 0b001_010_010_010_001,
        ')' => 0b100_010_010_010_100,
        '[' => 0b110_100_100_100_110,
        ']' => 0b011_001_001_001_011,
        '<' => 0b001_010_100_010_001,
        '>' => 0b100_010_001_010_100,
        '#' => 0b101_111_101_111_101,
        '%' => 0b101_001_010_100_101,
        '!' => 0b010_010_010_000_010,
        '_' => 0b000_000_000_000_111,
        '\'' => 0b010_010_000_000_000,
        '|' => 0b010_010_010_010_010,
        '*' => 0b000_101_010_101_000,
        _ => UNKNOWN,
    }
}

/// Whether the pixel at `(col, row)` of a glyph is lit.
pub(crate) fn glyph_lit(bits: u16, col: i32, row: i32) -> bool {
    if !(0..GLYPH_WIDTH).contains(&col) || !(0..GLYPH_HEIGHT).contains(&row) {
        return false;
    }
    let shift = (GLYPH_HEIGHT - 1 - row) * GLYPH_WIDTH + (GLYPH_WIDTH - 1 - col);
    bits & (1 << shift) != 0
}

pub(crate) fn glyph_advance_px(scale: i32) -> i32 {
    (GLYPH_WIDTH + 1) * scale.max(1)
}

pub(crate) fn line_advance_px(scale: i32) -> i32 {
    (GLYPH_HEIGHT + 2) * scale.max(1)
}

pub(crate) fn text_width_px(text: &str, scale: i32) -> i32 {
    let chars = text.chars().count() as i32;
    if chars == 0 {
        return 0;
    }
    chars * glyph_advance_px(scale) - scale.max(1)
}
