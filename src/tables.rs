//! The table sanitization contract.
//!
//! Every supported table is sanitized from the bytes supplied by the caller and, once accepted,
//! serialized by writing those same bytes back out. Nothing is reconstructed from parsed fields,
//! so an accepted table is always byte-identical to its input.

pub mod variable_fonts;

use crate::binary::read::ReadScope;
use crate::binary::write::{WriteBinary, WriteContext};
use crate::bitmap::ebdt::BitmapDataTable;
use crate::bitmap::eblc::BitmapLocationTable;
use crate::bitmap::BitmapFlavour;
use crate::error::{ParseError, SanitizeError, Severity, WriteError};
use crate::font::Font;
use crate::tables::variable_fonts::mvar::MvarTable;
use crate::tag;

/// A table that can be validated and then passed through.
pub trait SanitizeTable<'a>: Sized {
    /// Additional arguments needed to sanitize the table.
    type Args: Copy;

    /// How a sanitization failure of this table is handled.
    const SEVERITY: Severity;

    /// Validate `scope`, which holds the complete table.
    ///
    /// `font` gives access to tables that have already been accepted.
    fn sanitize(
        scope: ReadScope<'a>,
        font: &Font<'a>,
        args: Self::Args,
    ) -> Result<Self, SanitizeError>;

    /// The validated bytes of this table.
    fn data(&self) -> ReadScope<'a>;

    /// Write the validated bytes of this table to `ctxt`.
    fn serialize<C: WriteContext>(&self, ctxt: &mut C) -> Result<(), WriteError> {
        ReadScope::write(ctxt, self.data())
    }
}

/// A sanitized table of one of the supported kinds.
pub enum Table<'a> {
    /// `EBDT` or `CBDT`.
    BitmapData(BitmapDataTable<'a>),
    /// `EBLC` or `CBLC`.
    BitmapLocation(BitmapLocationTable<'a>),
    /// `MVAR`.
    MetricsVariations(MvarTable<'a>),
}

impl<'a> Table<'a> {
    /// Sanitize the table identified by `tag`.
    pub fn sanitize(
        tag: u32,
        scope: ReadScope<'a>,
        font: &Font<'a>,
    ) -> Result<Table<'a>, SanitizeError> {
        match tag {
            tag::EBDT => BitmapDataTable::sanitize(scope, font, BitmapFlavour::Embedded)
                .map(Table::BitmapData),
            tag::CBDT => {
                BitmapDataTable::sanitize(scope, font, BitmapFlavour::Color).map(Table::BitmapData)
            }
            tag::EBLC => BitmapLocationTable::sanitize(scope, font, BitmapFlavour::Embedded)
                .map(Table::BitmapLocation),
            tag::CBLC => BitmapLocationTable::sanitize(scope, font, BitmapFlavour::Color)
                .map(Table::BitmapLocation),
            tag::MVAR => MvarTable::sanitize(scope, font, ()).map(Table::MetricsVariations),
            _ => Err(SanitizeError::new(
                tag,
                ParseError::NotImplemented,
                "unsupported table",
            )),
        }
    }

    /// How a sanitization failure of the table identified by `tag` is handled.
    pub fn severity(tag: u32) -> Severity {
        match tag {
            tag::EBDT | tag::CBDT => BitmapDataTable::SEVERITY,
            tag::EBLC | tag::CBLC => BitmapLocationTable::SEVERITY,
            tag::MVAR => MvarTable::SEVERITY,
            _ => Severity::Fatal,
        }
    }

    /// The validated bytes of this table.
    pub fn data(&self) -> ReadScope<'a> {
        match self {
            Table::BitmapData(table) => table.data(),
            Table::BitmapLocation(table) => table.data(),
            Table::MetricsVariations(table) => table.data(),
        }
    }
}

impl<'a> WriteBinary<&Self> for Table<'a> {
    type Output = ();

    fn write<C: WriteContext>(ctxt: &mut C, table: &Self) -> Result<(), WriteError> {
        match table {
            Table::BitmapData(table) => table.serialize(ctxt),
            Table::BitmapLocation(table) => table.serialize(ctxt),
            Table::MetricsVariations(table) => table.serialize(ctxt),
        }
    }
}
