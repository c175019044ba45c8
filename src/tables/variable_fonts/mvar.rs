//! `MVAR` Metrics Variations Table
//!
//! <https://learn.microsoft.com/en-us/typography/opentype/spec/mvar>

use log::warn;

use crate::binary::read::{ReadArray, ReadFrom, ReadScope, ReadUnchecked};
use crate::binary::{U16Be, U32Be};
use crate::error::{Context, ParseError, SanitizeError, Severity};
use crate::font::Font;
use crate::tables::SanitizeTable;
use crate::tag;

/// `MVAR` Metrics Variations Table
pub struct MvarTable<'a> {
    /// Major version number of the metrics variations table.
    pub major_version: u16,
    /// Minor version number of the metrics variations table.
    pub minor_version: u16,
    /// The item variation store, `None` if there are no value records.
    item_variation_store: Option<ReadScope<'a>>,
    /// Array of value records that identify target items and the associated
    /// delta-set index for each.
    ///
    /// Sorted by `value_tag`.
    value_records: ReadArray<'a, ValueRecord>,
    data: ReadScope<'a>,
}

/// Identifies target items by tag their associated delta-set index.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ValueRecord {
    /// Four-byte tag identifying a font-wide measure.
    pub value_tag: u32,
    /// A delta-set outer index.
    ///
    /// Used to select an item variation data sub-table within the item
    /// variation store.
    pub delta_set_outer_index: u16,
    /// A delta-set inner index.
    ///
    /// Used to select a delta-set row within an item variation data sub-table.
    pub delta_set_inner_index: u16,
}

struct MvarHeader {
    major_version: u16,
    minor_version: u16,
    reserved: u16,
    value_record_size: u16,
    value_record_count: u16,
    item_variation_store_offset: u16,
}

impl ReadFrom for MvarHeader {
    type ReadType = ((U16Be, U16Be, U16Be), (U16Be, U16Be, U16Be));

    fn read_from(
        (
            (major_version, minor_version, reserved),
            (value_record_size, value_record_count, item_variation_store_offset),
        ): ((u16, u16, u16), (u16, u16, u16)),
    ) -> Self {
        MvarHeader {
            major_version,
            minor_version,
            reserved,
            value_record_size,
            value_record_count,
            item_variation_store_offset,
        }
    }
}

impl ReadFrom for ValueRecord {
    type ReadType = (U32Be, U16Be, U16Be);

    fn read_from(
        (value_tag, delta_set_outer_index, delta_set_inner_index): (u32, u16, u16),
    ) -> Self {
        ValueRecord {
            value_tag,
            delta_set_outer_index,
            delta_set_inner_index,
        }
    }
}

impl<'a> SanitizeTable<'a> for MvarTable<'a> {
    type Args = ();

    const SEVERITY: Severity = Severity::Drop;

    fn sanitize(scope: ReadScope<'a>, font: &Font<'a>, (): ()) -> Result<Self, SanitizeError> {
        let tag = tag::MVAR;
        let mut ctxt = scope.ctxt();
        let MvarHeader {
            major_version,
            minor_version,
            reserved,
            value_record_size,
            value_record_count,
            item_variation_store_offset,
        } = ctxt
            .read::<MvarHeader>()
            .context(tag, "failed to read table header")?;

        ctxt.check_version(major_version == 1 && minor_version == 0)
            .context(tag, "unknown table version")?;
        if reserved != 0 {
            warn!("MVAR: expected reserved=0, got {}", reserved);
        }
        ctxt.check(usize::from(value_record_size) >= ValueRecord::SIZE)
            .context(tag, "value record size too small")?;

        let item_variation_store = if value_record_count == 0 {
            ctxt.check_offset(item_variation_store_offset == 0)
                .context(tag, "unexpected item variation store")?;
            None
        } else {
            let offset = usize::from(item_variation_store_offset);
            ctxt.check_offset(offset >= ctxt.offset() && offset <= scope.len())
                .context(tag, "invalid item variation store offset")?;
            let store = scope.offset(offset);
            font.variation_store_parser()
                .parse_item_variation_store(store)
                .context(tag, "failed to parse item variation store")?;
            Some(store)
        };

        let value_records = ctxt
            .read_array_stride::<ValueRecord>(
                usize::from(value_record_count),
                usize::from(value_record_size),
            )
            .context(tag, "failed to read value record")?;
        let mut prev_tag = 0;
        for record in value_records.iter() {
            if record.value_tag <= prev_tag {
                return Err(SanitizeError::new(
                    tag,
                    ParseError::OutOfOrder,
                    "invalid or out-of-order value tag",
                ));
            }
            prev_tag = record.value_tag;
        }

        Ok(MvarTable {
            major_version,
            minor_version,
            item_variation_store,
            value_records,
            data: scope,
        })
    }

    fn data(&self) -> ReadScope<'a> {
        self.data
    }
}

impl<'a> MvarTable<'a> {
    /// Find the value record for the supplied
    /// [value tag](https://learn.microsoft.com/en-us/typography/opentype/spec/mvar#value-tags).
    pub fn value_record(&self, value_tag: u32) -> Option<ValueRecord> {
        self.value_records
            .binary_search_by(|record| record.value_tag.cmp(&value_tag))
            .ok()
            .and_then(|index| self.value_records.get_item(index))
    }

    /// Iterator over the [ValueRecords][ValueRecord] in this `MVAR` table.
    pub fn value_records(&self) -> impl Iterator<Item = ValueRecord> + 'a {
        self.value_records.iter()
    }

    /// The number of [ValueRecords][ValueRecord] in this `MVAR` table.
    pub fn value_records_len(&self) -> usize {
        self.value_records.len()
    }

    /// The bytes from the start of the item variation store to the end of the table.
    pub fn item_variation_store(&self) -> Option<ReadScope<'a>> {
        self.item_variation_store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::builders::{item_variation_store, metrics_variations, Region};

    fn accept_store(_scope: ReadScope<'_>) -> Result<(), ParseError> {
        Ok(())
    }

    fn sanitize<'a>(data: &'a [u8], font: &Font<'a>) -> Result<MvarTable<'a>, SanitizeError> {
        MvarTable::sanitize(ReadScope::new(data), font, ())
    }

    #[test]
    fn test_empty_table() {
        let data = metrics_variations(8, &[], None);
        let mvar = sanitize(&data, &Font::new()).unwrap();
        assert_eq!(mvar.value_records_len(), 0);
        assert!(mvar.item_variation_store().is_none());
    }

    #[test]
    fn test_lookup() {
        let store = item_variation_store(&[Region::new(0, 0x4000, 0x4000)], 0, &[0], &[5]);
        let records = [
            (tag!(b"hasc"), 0, 0),
            (tag!(b"hdsc"), 0, 0),
            (tag!(b"xhgt"), 0, 0),
        ];
        let data = metrics_variations(8, &records, Some(&store[..]));
        let font = Font::new();
        let mvar = sanitize(&data, &font).unwrap();
        assert_eq!(
            mvar.value_record(tag!(b"hdsc")),
            Some(ValueRecord {
                value_tag: tag!(b"hdsc"),
                delta_set_outer_index: 0,
                delta_set_inner_index: 0,
            })
        );
        assert_eq!(mvar.value_record(tag!(b"cpht")), None);
        assert_eq!(
            mvar.item_variation_store().map(|store| store.data()),
            Some(store.as_slice())
        );
    }

    #[test]
    fn test_wide_value_records() {
        let records = [(1, 0, 0), (2, 0, 0)];
        let data = metrics_variations(12, &records, Some(&[][..]));
        let font = Font::with_variation_store_parser(accept_store);
        let mvar = sanitize(&data, &font).unwrap();
        let tags = mvar.value_records().map(|record| record.value_tag).collect::<Vec<_>>();
        assert_eq!(tags, vec![1, 2]);
    }

    #[test]
    fn test_record_size_too_small() {
        let data = metrics_variations(6, &[], None);
        let err = sanitize(&data, &Font::new()).err().unwrap();
        assert_eq!(err.kind, ParseError::BadValue);
        assert_eq!(err.detail, "value record size too small");
    }

    #[test]
    fn test_store_offset_before_records() {
        let records = [(1, 0, 0)];
        let mut data = metrics_variations(8, &records, Some(&[][..]));
        // itemVariationStoreOffset
        data[10..12].copy_from_slice(&4u16.to_be_bytes());
        let font = Font::with_variation_store_parser(accept_store);
        let err = sanitize(&data, &font).err().unwrap();
        assert_eq!(err.kind, ParseError::BadOffset);
        assert_eq!(err.detail, "invalid item variation store offset");
    }

    #[test]
    fn test_store_offset_past_end() {
        let records = [(1, 0, 0)];
        let mut data = metrics_variations(8, &records, Some(&[][..]));
        let offset = u16::try_from(data.len() + 1).unwrap();
        data[10..12].copy_from_slice(&offset.to_be_bytes());
        let font = Font::with_variation_store_parser(accept_store);
        let err = sanitize(&data, &font).err().unwrap();
        assert_eq!(err.kind, ParseError::BadOffset);
        assert_eq!(err.detail, "invalid item variation store offset");
    }

    #[test]
    fn test_store_offset_at_end() {
        let records = [(1, 0, 0)];
        let mut data = metrics_variations(8, &records, Some(&[0, 1, 0, 0][..]));
        let offset = u16::try_from(data.len()).unwrap();
        data[10..12].copy_from_slice(&offset.to_be_bytes());
        let font = Font::with_variation_store_parser(accept_store);
        let mvar = sanitize(&data, &font).unwrap();
        assert_eq!(mvar.item_variation_store().map(|store| store.len()), Some(0));
    }

    #[test]
    fn test_store_rejected() {
        let records = [(1, 0, 0)];
        let data = metrics_variations(8, &records, Some(&[0, 2][..]));
        let err = sanitize(&data, &Font::new()).err().unwrap();
        assert_eq!(err.kind, ParseError::InvalidFormat(2));
        assert_eq!(err.detail, "failed to parse item variation store");
    }

    #[test]
    fn test_zero_tag() {
        let records = [(0, 0, 0)];
        let data = metrics_variations(8, &records, Some(&[][..]));
        let font = Font::with_variation_store_parser(accept_store);
        let err = sanitize(&data, &font).err().unwrap();
        assert_eq!(err.kind, ParseError::OutOfOrder);
    }

    #[test]
    fn test_duplicate_tag() {
        let records = [(tag!(b"hasc"), 0, 0), (tag!(b"hasc"), 0, 1)];
        let data = metrics_variations(8, &records, Some(&[][..]));
        let font = Font::with_variation_store_parser(accept_store);
        let err = sanitize(&data, &font).err().unwrap();
        assert_eq!(err.kind, ParseError::OutOfOrder);
        assert_eq!(err.detail, "invalid or out-of-order value tag");
    }
}
