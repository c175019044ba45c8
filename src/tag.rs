//! Four-byte table identifiers.

use std::fmt;

/// Generate a 4-byte font table tag from byte string
///
/// Example:
///
/// ```
/// use sfntsan::tag;
///
/// assert_eq!(tag!(b"EBLC"), 0x45424C43);
/// ```
#[macro_export]
macro_rules! tag {
    ($w:expr) => {
        $crate::tag::tag(*$w)
    };
}

#[derive(PartialEq, Eq, Clone, Copy)]
pub struct DisplayTag(pub u32);

#[doc(hidden)]
pub const fn tag(chars: [u8; 4]) -> u32 {
    ((chars[3] as u32) << 0)
        | ((chars[2] as u32) << 8)
        | ((chars[1] as u32) << 16)
        | ((chars[0] as u32) << 24)
}

impl fmt::Display for DisplayTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = self.0;
        let mut s = String::with_capacity(4);
        s.push(char::from((tag >> 24) as u8));
        s.push(char::from(((tag >> 16) & 255) as u8));
        s.push(char::from(((tag >> 8) & 255) as u8));
        s.push(char::from((tag & 255) as u8));
        if s.chars().any(|c| !c.is_ascii() || c.is_ascii_control()) {
            write!(f, "0x{:08x}", tag)
        } else {
            s.fmt(f)
        }
    }
}

impl fmt::Debug for DisplayTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_string().fmt(f)
    }
}

/// Color bitmap data table.
pub const CBDT: u32 = tag!(b"CBDT");
/// Color bitmap location table.
pub const CBLC: u32 = tag!(b"CBLC");
/// Embedded bitmap data table.
pub const EBDT: u32 = tag!(b"EBDT");
/// Embedded bitmap location table.
pub const EBLC: u32 = tag!(b"EBLC");
/// Metrics variations table.
pub const MVAR: u32 = tag!(b"MVAR");
