//! `EBLC`/`CBLC` Bitmap Location Table
//!
//! <https://learn.microsoft.com/en-us/typography/opentype/spec/eblc>
//!
//! The location table is sanitized in two passes. The first reads every `BitmapSize` record and
//! checks the fields that are self-contained. The second follows each record to its array of
//! index sub-table records and checks the sub-tables themselves, including the ranges of image
//! data they address in the data table.

use std::convert::TryFrom;

use itertools::Itertools;
use log::warn;

use crate::binary::read::{ReadBinary, ReadCtxt, ReadFrom, ReadScope};
use crate::binary::{U16Be, U32Be};
use crate::bitmap::ebdt::BitmapDataTable;
use crate::bitmap::{BitDepth, BitmapFlags, BitmapFlavour, ImageFormat};
use crate::error::{Context, ParseError, SanitizeError, Severity};
use crate::font::Font;
use crate::size;
use crate::tables::SanitizeTable;

/// Size of the table header: version and `numSizes`.
const HEADER_SIZE: usize = 8;
/// Size of a `BitmapSize` record.
const BITMAP_SIZE_RECORD_SIZE: usize = 48;
/// Size of an `SbitLineMetrics` record.
const SBIT_LINE_METRICS_SIZE: usize = 12;
/// Size of a `BigGlyphMetrics` record.
const BIG_GLYPH_METRICS_SIZE: usize = 8;

/// A sanitized `EBLC` or `CBLC` table.
pub struct BitmapLocationTable<'a> {
    /// Which pair of tables this belongs to.
    pub flavour: BitmapFlavour,
    /// Major version of this table.
    pub major_version: u16,
    /// Minor version of this table.
    pub minor_version: u16,
    strikes: Vec<Strike>,
    data: ReadScope<'a>,
}

/// Summary of an accepted `BitmapSize` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Strike {
    /// Lowest glyph index covered by this strike.
    pub start_glyph_index: u16,
    /// Highest glyph index covered by this strike.
    pub end_glyph_index: u16,
    /// Bits per pixel of the images in this strike.
    pub bit_depth: BitDepth,
    /// Direction of small glyph metrics.
    pub flags: BitmapFlags,
    /// The index sub-tables of this strike, in the order they were listed.
    pub index_sub_tables: Vec<IndexSubTableSummary>,
}

/// Summary of an accepted index sub-table.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct IndexSubTableSummary {
    /// First glyph index covered by the sub-table.
    pub first_glyph_index: u16,
    /// Last glyph index covered by the sub-table.
    pub last_glyph_index: u16,
    /// Layout of the sub-table, 1 to 5.
    pub index_format: u16,
    /// Format of the images the sub-table points to.
    pub image_format: ImageFormat,
}

/// A `BitmapSize` record as it appears in the table.
struct BitmapSizeRecord {
    index_sub_table_array_offset: u32,
    index_tables_size: u32,
    number_of_index_sub_tables: u32,
    color_ref: u32,
    start_glyph_index: u16,
    end_glyph_index: u16,
    bit_depth: u8,
    flags: u8,
}

struct IndexSubTableRecord {
    first_glyph_index: u16,
    last_glyph_index: u16,
    additional_offset_to_index_sub_table: u32,
}

struct GlyphOffsetPair {
    glyph_id: u16,
    sbit_offset: u16,
}

impl ReadBinary for BitmapSizeRecord {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let index_sub_table_array_offset = ctxt.read_u32be()?;
        let index_tables_size = ctxt.read_u32be()?;
        let number_of_index_sub_tables = ctxt.read_u32be()?;
        let color_ref = ctxt.read_u32be()?;
        // hori and vert
        ctxt.skip(2 * SBIT_LINE_METRICS_SIZE)?;
        let start_glyph_index = ctxt.read_u16be()?;
        let end_glyph_index = ctxt.read_u16be()?;
        // ppemX and ppemY
        ctxt.skip(2 * size::U8)?;
        let bit_depth = ctxt.read_u8()?;
        let flags = ctxt.read_u8()?;

        Ok(BitmapSizeRecord {
            index_sub_table_array_offset,
            index_tables_size,
            number_of_index_sub_tables,
            color_ref,
            start_glyph_index,
            end_glyph_index,
            bit_depth,
            flags,
        })
    }
}

impl ReadFrom for IndexSubTableRecord {
    type ReadType = (U16Be, U16Be, U32Be);

    fn read_from(
        (first_glyph_index, last_glyph_index, additional_offset_to_index_sub_table): (
            u16,
            u16,
            u32,
        ),
    ) -> Self {
        IndexSubTableRecord {
            first_glyph_index,
            last_glyph_index,
            additional_offset_to_index_sub_table,
        }
    }
}

impl ReadFrom for GlyphOffsetPair {
    type ReadType = (U16Be, U16Be);

    fn read_from((glyph_id, sbit_offset): (u16, u16)) -> Self {
        GlyphOffsetPair {
            glyph_id,
            sbit_offset,
        }
    }
}

impl<'a> SanitizeTable<'a> for BitmapLocationTable<'a> {
    type Args = BitmapFlavour;

    const SEVERITY: Severity = Severity::Fatal;

    fn sanitize(
        scope: ReadScope<'a>,
        font: &Font<'a>,
        flavour: BitmapFlavour,
    ) -> Result<Self, SanitizeError> {
        let tag = flavour.location_tag();
        let mut ctxt = scope.ctxt();
        let major_version = ctxt.read_u16be().context(tag, "incomplete table")?;
        let minor_version = ctxt.read_u16be().context(tag, "incomplete table")?;
        ctxt.check_version(major_version == flavour.major_version() && minor_version == 0)
            .context(tag, "bad version")?;
        let num_sizes = ctxt.read_u32be().context(tag, "incomplete table")?;
        let directory_end = usize::try_from(num_sizes)
            .ok()
            .and_then(|num_sizes| num_sizes.checked_mul(BITMAP_SIZE_RECORD_SIZE))
            .and_then(|records_size| records_size.checked_add(HEADER_SIZE))
            .ok_or(ParseError::LimitExceeded)
            .context(tag, "bitmap size records")?;

        let bitmap_data = font
            .bitmap_data(flavour)
            .ok_or(ParseError::MissingDependency(flavour.data_tag()))
            .context(tag, "bitmap data")?;

        // First pass: the size records. Each record is read as it is reached so that nothing is
        // allocated up front for a count that the data cannot back.
        let mut records = Vec::new();
        for i in 0..num_sizes {
            let record = ctxt
                .read::<BitmapSizeRecord>()
                .with_context(tag, || format!("bitmap size {}", i))?;
            check_bitmap_size(&ctxt, &record, directory_end, scope.len())
                .with_context(tag, || format!("bitmap size {}", i))?;
            records.push(record);
        }

        // Second pass: the index sub-table arrays and the sub-tables they point to.
        let strikes = records
            .iter()
            .enumerate()
            .map(|(i, record)| read_strike(scope, record, bitmap_data, flavour, tag, i))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(BitmapLocationTable {
            flavour,
            major_version,
            minor_version,
            strikes,
            data: scope,
        })
    }

    fn data(&self) -> ReadScope<'a> {
        self.data
    }
}

impl<'a> BitmapLocationTable<'a> {
    /// The strikes of this table, in the order their size records appear.
    pub fn strikes(&self) -> &[Strike] {
        &self.strikes
    }
}

fn check_bitmap_size(
    ctxt: &ReadCtxt<'_>,
    record: &BitmapSizeRecord,
    directory_end: usize,
    table_len: usize,
) -> Result<(), ParseError> {
    ctxt.check(record.end_glyph_index >= record.start_glyph_index)?;
    ctxt.check(record.color_ref == 0)?;
    let array_offset = usize::try_from(record.index_sub_table_array_offset)?;
    ctxt.check_offset(array_offset >= directory_end && array_offset < table_len)?;

    let index_tables_end = usize::try_from(record.index_tables_size)
        .ok()
        .and_then(|size| size.checked_add(array_offset));
    if index_tables_end.map_or(true, |end| end > table_len) {
        warn!(
            "index tables size {} at offset {} overruns table of {} bytes",
            record.index_tables_size, array_offset, table_len
        );
    }
    Ok(())
}

fn read_strike(
    scope: ReadScope<'_>,
    record: &BitmapSizeRecord,
    bitmap_data: &BitmapDataTable<'_>,
    flavour: BitmapFlavour,
    tag: u32,
    i: usize,
) -> Result<Strike, SanitizeError> {
    let bit_depth = flavour
        .bit_depth(record.bit_depth)
        .with_context(tag, || format!("bit depth of bitmap size {}", i))?;
    let flags = BitmapFlags::from_bits_truncate(record.flags);
    if flags.bits() != record.flags {
        warn!(
            "bitmap size {} has reserved flags set: {:#04x}",
            i, record.flags
        );
    }

    let array_offset = usize::try_from(record.index_sub_table_array_offset)
        .with_context(tag, || format!("bitmap size {}", i))?;
    let num_index_sub_tables = usize::try_from(record.number_of_index_sub_tables)
        .with_context(tag, || format!("bitmap size {}", i))?;
    let array = scope
        .offset(array_offset)
        .ctxt()
        .read_array::<IndexSubTableRecord>(num_index_sub_tables)
        .with_context(tag, || format!("index sub-table array of bitmap size {}", i))?;

    let index_sub_tables = array
        .iter()
        .enumerate()
        .map(|(j, entry)| {
            read_index_sub_table_at(scope, array_offset, &entry, bitmap_data, flavour)
                .with_context(tag, || format!("index sub-table {} of bitmap size {}", j, i))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Strike {
        start_glyph_index: record.start_glyph_index,
        end_glyph_index: record.end_glyph_index,
        bit_depth,
        flags,
        index_sub_tables,
    })
}

fn read_index_sub_table_at(
    scope: ReadScope<'_>,
    array_offset: usize,
    entry: &IndexSubTableRecord,
    bitmap_data: &BitmapDataTable<'_>,
    flavour: BitmapFlavour,
) -> Result<IndexSubTableSummary, ParseError> {
    if entry.last_glyph_index < entry.first_glyph_index {
        return Err(ParseError::BadValue);
    }
    let offset = usize::try_from(entry.additional_offset_to_index_sub_table)?
        .checked_add(array_offset)
        .ok_or(ParseError::BadOffset)?;
    if offset >= scope.len() {
        return Err(ParseError::BadOffset);
    }
    read_index_sub_table(
        &mut scope.offset(offset).ctxt(),
        entry.first_glyph_index,
        entry.last_glyph_index,
        bitmap_data,
        flavour,
    )
}

/// Check an index sub-table covering glyphs `first..=last` and the image data it addresses.
fn read_index_sub_table(
    ctxt: &mut ReadCtxt<'_>,
    first: u16,
    last: u16,
    bitmap_data: &BitmapDataTable<'_>,
    flavour: BitmapFlavour,
) -> Result<IndexSubTableSummary, ParseError> {
    let index_format = ctxt.read_u16be()?;
    let raw_image_format = ctxt.read_u16be()?;
    let image_data_offset = usize::try_from(ctxt.read_u32be()?)?;
    let num_glyphs = usize::from(last - first) + 1;

    if !(1..=5).contains(&index_format) {
        return Err(ParseError::InvalidFormat(index_format));
    }
    let image_format = flavour.image_format(raw_image_format)?;
    // Formats 2 and 5 carry the metrics for all of their glyphs. The others rely on the images
    // carrying their own.
    let shared_metrics = matches!(index_format, 2 | 5);
    if !shared_metrics && !image_format.has_glyph_metrics() {
        return Err(ParseError::InvalidFormat(raw_image_format));
    }

    match index_format {
        1 => {
            let offsets = ctxt.read_array::<U32Be>(num_glyphs + 1)?;
            check_sbit_offsets(bitmap_data, image_data_offset, offsets.iter())?;
        }
        2 => {
            let image_size = usize::try_from(ctxt.read_u32be()?)?;
            ctxt.skip(BIG_GLYPH_METRICS_SIZE)?;
            let length = num_glyphs
                .checked_mul(image_size)
                .ok_or(ParseError::BadOffset)?;
            check_image_data(bitmap_data, image_data_offset, 0, length)?;
        }
        3 => {
            let offsets = ctxt.read_array::<U16Be>(num_glyphs + 1)?;
            check_sbit_offsets(
                bitmap_data,
                image_data_offset,
                offsets.iter().map(u32::from),
            )?;
        }
        4 => {
            let num_glyphs_in_table = usize::try_from(ctxt.read_u32be()?)?;
            ctxt.check_index(num_glyphs_in_table <= num_glyphs)?;
            let pairs = ctxt.read_array::<GlyphOffsetPair>(num_glyphs_in_table + 1)?;
            check_glyph_ids(
                first,
                last,
                pairs.iter().take(num_glyphs_in_table).map(|pair| pair.glyph_id),
            )?;
            check_sbit_offsets(
                bitmap_data,
                image_data_offset,
                pairs.iter().map(|pair| u32::from(pair.sbit_offset)),
            )?;
        }
        _ => {
            let image_size = usize::try_from(ctxt.read_u32be()?)?;
            ctxt.skip(BIG_GLYPH_METRICS_SIZE)?;
            let num_glyphs_in_table = usize::try_from(ctxt.read_u32be()?)?;
            ctxt.check_index(num_glyphs_in_table <= num_glyphs)?;
            let glyph_ids = ctxt.read_array::<U16Be>(num_glyphs_in_table)?;
            check_glyph_ids(first, last, glyph_ids.iter())?;
            let length = num_glyphs_in_table
                .checked_mul(image_size)
                .ok_or(ParseError::BadOffset)?;
            check_image_data(bitmap_data, image_data_offset, 0, length)?;
        }
    }

    Ok(IndexSubTableSummary {
        first_glyph_index: first,
        last_glyph_index: last,
        index_format,
        image_format,
    })
}

/// Offsets are relative to `image_data_offset`. Each glyph's data ends where the next begins,
/// so the offsets must never decrease and the span from the first to the last must lie within
/// the data table.
fn check_sbit_offsets<I>(
    bitmap_data: &BitmapDataTable<'_>,
    image_data_offset: usize,
    offsets: I,
) -> Result<(), ParseError>
where
    I: Iterator<Item = u32> + Clone,
{
    if !offsets
        .clone()
        .tuple_windows::<(u32, u32)>()
        .all(|(start, end)| start <= end)
    {
        return Err(ParseError::OutOfOrder);
    }
    let mut offsets = offsets;
    let first = offsets.next().ok_or(ParseError::BadIndex)?;
    let last = offsets.last().unwrap_or(first);
    check_image_data(
        bitmap_data,
        image_data_offset,
        usize::try_from(first)?,
        usize::try_from(last - first)?,
    )
}

fn check_image_data(
    bitmap_data: &BitmapDataTable<'_>,
    image_data_offset: usize,
    start: usize,
    length: usize,
) -> Result<(), ParseError> {
    let offset = image_data_offset
        .checked_add(start)
        .ok_or(ParseError::BadOffset)?;
    if bitmap_data.contains(offset, length) {
        Ok(())
    } else {
        Err(ParseError::BadOffset)
    }
}

fn check_glyph_ids<I>(first: u16, last: u16, glyph_ids: I) -> Result<(), ParseError>
where
    I: Iterator<Item = u16> + Clone,
{
    if !glyph_ids
        .clone()
        .tuple_windows::<(u16, u16)>()
        .all(|(prev, next)| prev < next)
    {
        return Err(ParseError::OutOfOrder);
    }
    let mut glyph_ids = glyph_ids;
    if glyph_ids.all(|glyph_id| (first..=last).contains(&glyph_id)) {
        Ok(())
    } else {
        Err(ParseError::BadIndex)
    }
}
