//! `EBDT`/`CBDT` Bitmap Data Table
//!
//! <https://learn.microsoft.com/en-us/typography/opentype/spec/ebdt>

use crate::binary::read::ReadScope;
use crate::bitmap::BitmapFlavour;
use crate::error::{Context, SanitizeError, Severity};
use crate::font::Font;
use crate::tables::SanitizeTable;

/// Size of the version header that precedes the glyph image data.
pub const HEADER_SIZE: usize = 4;

/// A sanitized `EBDT` or `CBDT` table.
///
/// Only the version header is checked here. The image data is addressed by offsets in the
/// location table, which is responsible for keeping them within `data`.
pub struct BitmapDataTable<'a> {
    /// Which pair of tables this belongs to.
    pub flavour: BitmapFlavour,
    /// Major version of this table.
    ///
    /// 2 for `EBDT`, 3 for `CBDT`
    pub major_version: u16,
    /// Minor version of this table.
    pub minor_version: u16,
    /// The raw data of the whole table.
    data: ReadScope<'a>,
}

impl<'a> SanitizeTable<'a> for BitmapDataTable<'a> {
    type Args = BitmapFlavour;

    const SEVERITY: Severity = Severity::Fatal;

    fn sanitize(
        scope: ReadScope<'a>,
        _font: &Font<'a>,
        flavour: BitmapFlavour,
    ) -> Result<Self, SanitizeError> {
        let tag = flavour.data_tag();
        let mut ctxt = scope.ctxt();
        let major_version = ctxt.read_u16be().context(tag, "incomplete table")?;
        let minor_version = ctxt.read_u16be().context(tag, "incomplete table")?;
        ctxt.check_version(major_version == flavour.major_version() && minor_version == 0)
            .context(tag, "bad version")?;

        Ok(BitmapDataTable {
            flavour,
            major_version,
            minor_version,
            data: scope,
        })
    }

    fn data(&self) -> ReadScope<'a> {
        self.data
    }
}

impl<'a> BitmapDataTable<'a> {
    /// Length in bytes of the whole table.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the table is empty, which a sanitized table never is.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Check that the `length` bytes of image data at `offset` lie after the header and
    /// within this table.
    pub fn contains(&self, offset: usize, length: usize) -> bool {
        offset >= HEADER_SIZE
            && offset
                .checked_add(length)
                .map_or(false, |end| end <= self.data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::write::WriteBuffer;
    use crate::error::ParseError;
    use crate::tag;

    fn sanitize(data: &[u8], flavour: BitmapFlavour) -> Result<BitmapDataTable<'_>, SanitizeError> {
        let font = Font::new();
        BitmapDataTable::sanitize(ReadScope::new(data), &font, flavour)
    }

    #[test]
    fn test_accept_version_2() {
        let data = [0x00, 0x02, 0x00, 0x00];
        let ebdt = sanitize(&data, BitmapFlavour::Embedded).unwrap();
        assert_eq!((ebdt.major_version, ebdt.minor_version), (2, 0));

        let mut buffer = WriteBuffer::new();
        ebdt.serialize(&mut buffer).unwrap();
        assert_eq!(buffer.bytes(), &data);
    }

    #[test]
    fn test_reject_major_version() {
        let data = [0x00, 0x01, 0x00, 0x00];
        let err = sanitize(&data, BitmapFlavour::Embedded).err().unwrap();
        assert_eq!(err.tag, tag::EBDT);
        assert_eq!(err.kind, ParseError::BadVersion);
    }

    #[test]
    fn test_reject_minor_version() {
        let data = [0x00, 0x02, 0x00, 0x01];
        let err = sanitize(&data, BitmapFlavour::Embedded).err().unwrap();
        assert_eq!(err.kind, ParseError::BadVersion);
    }

    #[test]
    fn test_reject_truncated() {
        let err = sanitize(&[0x00, 0x02, 0x00], BitmapFlavour::Embedded)
            .err()
            .unwrap();
        assert_eq!(err.kind, ParseError::BadEof);
    }

    #[test]
    fn test_color_flavour() {
        let data = [0x00, 0x03, 0x00, 0x00, 0xFF];
        assert!(sanitize(&data, BitmapFlavour::Color).is_ok());
        let err = sanitize(&data, BitmapFlavour::Embedded).err().unwrap();
        assert_eq!(err.kind, ParseError::BadVersion);
        let err = sanitize(&[0x00, 0x02, 0x00, 0x00], BitmapFlavour::Color)
            .err()
            .unwrap();
        assert_eq!(err.tag, tag::CBDT);
    }

    #[test]
    fn test_contains() {
        let data = [0x00, 0x02, 0x00, 0x00, 1, 2, 3, 4];
        let ebdt = sanitize(&data, BitmapFlavour::Embedded).unwrap();
        assert!(ebdt.contains(4, 4));
        assert!(ebdt.contains(8, 0));
        assert!(!ebdt.contains(0, 4));
        assert!(!ebdt.contains(5, 4));
        assert!(!ebdt.contains(4, usize::MAX));
    }
}
