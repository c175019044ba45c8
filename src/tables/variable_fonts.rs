//! Common tables pertaining to variable fonts.
//!
//! Tables that carry variation data reference an `ItemVariationStore`. How deeply a store is
//! checked is up to the [VariationStoreParser] the [Font](crate::font::Font) was created with;
//! [ItemVariationStoreValidator] is the structural check used by default.
//!
//! <https://learn.microsoft.com/en-us/typography/opentype/spec/otvarcommonformats#item-variation-store>

pub mod mvar;

use std::convert::TryFrom;

use crate::binary::read::{ReadCtxt, ReadFrom, ReadScope};
use crate::binary::{I16Be, U16Be, U32Be};
use crate::error::ParseError;

/// Flag in `wordDeltaCount` indicating that word deltas are 32-bit and the remaining deltas are
/// 16-bit.
const LONG_WORDS: u16 = 0x8000;
/// Mask for the count of word deltas in `wordDeltaCount`.
const WORD_DELTA_COUNT_MASK: u16 = 0x7FFF;
/// 1.0 in F2DOT14.
const F2DOT14_ONE: i16 = 0x4000;
/// Region indices are 15-bit.
const MAX_REGION_COUNT: u16 = 0x8000;

/// Checks an `ItemVariationStore` referenced by another table.
///
/// `scope` starts at the store and extends to the end of the referencing table.
pub trait VariationStoreParser {
    fn parse_item_variation_store(&self, scope: ReadScope<'_>) -> Result<(), ParseError>;
}

impl<F> VariationStoreParser for F
where
    F: Fn(ReadScope<'_>) -> Result<(), ParseError>,
{
    fn parse_item_variation_store(&self, scope: ReadScope<'_>) -> Result<(), ParseError> {
        self(scope)
    }
}

/// Structural validation of an `ItemVariationStore`.
///
/// Checks that the region list and every item variation data sub-table lie within the store,
/// that region coordinates are well formed, and that every delta-set row fits in its sub-table.
#[derive(Debug, Copy, Clone, Default)]
pub struct ItemVariationStoreValidator;

/// Start, peak, and end of one axis of a variation region, in F2DOT14.
struct RegionAxisCoordinates {
    start_coord: i16,
    peak_coord: i16,
    end_coord: i16,
}

impl ReadFrom for RegionAxisCoordinates {
    type ReadType = (I16Be, I16Be, I16Be);

    fn read_from((start_coord, peak_coord, end_coord): (i16, i16, i16)) -> Self {
        RegionAxisCoordinates {
            start_coord,
            peak_coord,
            end_coord,
        }
    }
}

impl RegionAxisCoordinates {
    fn is_valid(&self) -> bool {
        let RegionAxisCoordinates {
            start_coord: start,
            peak_coord: peak,
            end_coord: end,
        } = *self;
        start <= peak
            && peak <= end
            && start >= -F2DOT14_ONE
            && end <= F2DOT14_ONE
            && !(start < 0 && end > 0 && peak != 0)
    }
}

impl VariationStoreParser for ItemVariationStoreValidator {
    fn parse_item_variation_store(&self, scope: ReadScope<'_>) -> Result<(), ParseError> {
        let mut ctxt = scope.ctxt();
        let format = ctxt.read_u16be()?;
        if format != 1 {
            return Err(ParseError::InvalidFormat(format));
        }
        let variation_region_list_offset = usize::try_from(ctxt.read_u32be()?)?;
        let item_variation_data_count = ctxt.read_u16be()?;
        let item_variation_data_offsets =
            ctxt.read_array::<U32Be>(usize::from(item_variation_data_count))?;
        let header_end = ctxt.offset();

        check_sub_table_offset(&ctxt, variation_region_list_offset, header_end, scope.len())?;
        let region_count = read_variation_region_list(scope.offset(variation_region_list_offset))?;

        for offset in item_variation_data_offsets.iter() {
            let offset = usize::try_from(offset)?;
            check_sub_table_offset(&ctxt, offset, header_end, scope.len())?;
            check_item_variation_data(&mut scope.offset(offset).ctxt(), region_count)?;
        }
        Ok(())
    }
}

fn check_sub_table_offset(
    ctxt: &ReadCtxt<'_>,
    offset: usize,
    header_end: usize,
    len: usize,
) -> Result<(), ParseError> {
    ctxt.check_offset(offset >= header_end && offset < len)
}

/// Returns the number of regions in the list.
fn read_variation_region_list(scope: ReadScope<'_>) -> Result<u16, ParseError> {
    let mut ctxt = scope.ctxt();
    let axis_count = ctxt.read_u16be()?;
    let region_count = ctxt.read_u16be()?;
    ctxt.check(region_count < MAX_REGION_COUNT)?;
    let coordinates = ctxt.read_array::<RegionAxisCoordinates>(
        usize::from(region_count) * usize::from(axis_count),
    )?;
    ctxt.check(coordinates.iter().all(|axis| axis.is_valid()))?;
    Ok(region_count)
}

fn check_item_variation_data(ctxt: &mut ReadCtxt<'_>, region_count: u16) -> Result<(), ParseError> {
    let item_count = ctxt.read_u16be()?;
    let word_delta_count = ctxt.read_u16be()?;
    let region_index_count = ctxt.read_u16be()?;
    let long_words = word_delta_count & LONG_WORDS != 0;
    let word_count = word_delta_count & WORD_DELTA_COUNT_MASK;
    ctxt.check(word_count <= region_index_count)?;

    let region_indexes = ctxt.read_array::<U16Be>(usize::from(region_index_count))?;
    ctxt.check_index(region_indexes.iter().all(|index| index < region_count))?;

    let (word_size, short_size) = if long_words { (4, 2) } else { (2, 1) };
    let row_size = usize::from(word_count) * word_size
        + usize::from(region_index_count - word_count) * short_size;
    ctxt.read_slice(usize::from(item_count) * row_size)?;
    Ok(())
}
