//! Width and alignment support for values that cannot be rendered as a
//! single `&str` without allocating.

use core::fmt::{self, Write};

/// Writes `body` padded to the formatter's width.
///
/// `chars` is the number of characters `body` emits. Alignment defaults to
/// left, like `Formatter::pad`.
pub(crate) fn pad_with(
    f: &mut fmt::Formatter<'_>,
    chars: usize,
    body: impl FnOnce(&mut fmt::Formatter<'_>) -> fmt::Result,
) -> fmt::Result {
    let padding = f.width().unwrap_or(0).saturating_sub(chars);
    let (before, after) = match f.align() {
        Some(fmt::Alignment::Right) => (padding, 0),
        Some(fmt::Alignment::Center) => (padding / 2, padding - padding / 2),
        Some(fmt::Alignment::Left) | None => (0, padding),
    };
    let fill = f.fill();
    for _ in 0..before {
        f.write_char(fill)?;
    }
    body(f)?;
    for _ in 0..after {
        f.write_char(fill)?;
    }
    Ok(())
}

/// Writes `raw` as `0x`-prefixed lowercase hex, honouring width and alignment.
pub(crate) fn pad_hex(f: &mut fmt::Formatter<'_>, raw: u32) -> fmt::Result {
    let digits = if raw == 0 {
        1
    } else {
        (u32::BITS - raw.leading_zeros()).div_ceil(4) as usize
    };
    pad_with(f, 2 + digits, |f| write!(f, "{raw:#x}"))
}
