//! Braille cell and dot-number model.
//!
//! A cell is one byte: bit `n` set means dot `n + 1` is raised, dots numbered
//! 1–8 in the standard 2×4 layout. The numbering is universal; the physical
//! bit-to-dot wiring of a given display is not, so [`DotMapping`] provides the
//! permutation vocabulary drivers and legacy dot-order tables need.

/// Dot 1 (top left).
pub const DOT_1: u8 = 0b0000_0001;
/// Dot 2 (middle left).
pub const DOT_2: u8 = 0b0000_0010;
/// Dot 3 (lower left).
pub const DOT_3: u8 = 0b0000_0100;
/// Dot 4 (top right).
pub const DOT_4: u8 = 0b0000_1000;
/// Dot 5 (middle right).
pub const DOT_5: u8 = 0b0001_0000;
/// Dot 6 (lower right).
pub const DOT_6: u8 = 0b0010_0000;
/// Dot 7 (bottom left, 8-dot extension).
pub const DOT_7: u8 = 0b0100_0000;
/// Dot 8 (bottom right, 8-dot extension).
pub const DOT_8: u8 = 0b1000_0000;

/// All eight dots raised. Rendered for characters nothing else can represent.
pub const ALL_DOTS: u8 = 0xFF;

/// Build a cell from dot numbers (1–8). Out-of-range numbers are ignored.
///
/// Mostly a table-definition and test convenience: `dots(&[1, 2]) == DOT_1 | DOT_2`.
pub const fn dots(numbers: &[u8]) -> u8 {
    let mut cell = 0u8;
    let mut i = 0;
    while i < numbers.len() {
        let n = numbers[i];
        if n >= 1 && n <= 8 {
            cell |= 1 << (n - 1);
        }
        i += 1;
    }
    cell
}

/// First codepoint of the Unicode braille patterns block.
const BRAILLE_BLOCK_BASE: u32 = 0x2800;

/// Map a cell to its Unicode braille pattern character.
///
/// The braille block is bit-for-bit aligned with the dot numbering, so this is
/// a plain offset from U+2800. Used for logs and diagnostics, not rendering.
pub const fn to_braille_char(cell: u8) -> char {
    match char::from_u32(BRAILLE_BLOCK_BASE + cell as u32) {
        Some(c) => c,
        None => ' ', // unreachable: the whole 256-entry block is assigned
    }
}

/// Inverse of [`to_braille_char`]; `None` for characters outside the block.
pub const fn from_braille_char(c: char) -> Option<u8> {
    let v = c as u32;
    if v >= BRAILLE_BLOCK_BASE && v < BRAILLE_BLOCK_BASE + 0x100 {
        Some((v - BRAILLE_BLOCK_BASE) as u8)
    } else {
        None
    }
}

/// A permutation of the eight dot positions.
///
/// `order[i]` names the standard dot number (1–8) wired to physical bit `i`.
/// The identity mapping is the common case; binary legacy tables and a few
/// display protocols use other orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DotMapping {
    order: [u8; 8],
}

impl Default for DotMapping {
    fn default() -> Self {
        Self::identity()
    }
}

impl DotMapping {
    /// The standard order: bit `i` is dot `i + 1`.
    pub const fn identity() -> Self {
        Self {
            order: [1, 2, 3, 4, 5, 6, 7, 8],
        }
    }

    /// Validate and wrap a dot order. Each of 1–8 must appear exactly once.
    pub fn try_from_dot_order(order: [u8; 8]) -> Option<Self> {
        let mut seen = [false; 8];
        for &n in &order {
            if !(1..=8).contains(&n) || seen[(n - 1) as usize] {
                return None;
            }
            seen[(n - 1) as usize] = true;
        }
        Some(Self { order })
    }

    /// True when remapping is a no-op.
    pub fn is_identity(&self) -> bool {
        self.order == Self::identity().order
    }

    /// Translate a cell expressed in this mapping's order into standard order.
    pub fn remap(&self, cell: u8) -> u8 {
        if self.is_identity() {
            return cell;
        }
        let mut out = 0u8;
        for (bit, &dot) in self.order.iter().enumerate() {
            if cell & (1 << bit) != 0 {
                out |= 1 << (dot - 1);
            }
        }
        out
    }
}
