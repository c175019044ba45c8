//! The table registry.
//!
//! A `Font` holds every table that has been sanitized so far, keyed by tag. Tables are only
//! published after they have been accepted, and sanitizing a table needs only a shared borrow of
//! the `Font`, so a dependent table can never observe a dependency that is still being
//! validated.

use log::{debug, warn};
use rustc_hash::FxHashMap;

use crate::binary::read::ReadScope;
use crate::binary::write::{WriteBinary, WriteContext};
use crate::bitmap::ebdt::BitmapDataTable;
use crate::bitmap::BitmapFlavour;
use crate::error::{ParseError, SanitizeError, Severity, WriteError};
use crate::tables::variable_fonts::{ItemVariationStoreValidator, VariationStoreParser};
use crate::tables::Table;
use crate::tag::DisplayTag;

/// Registry of sanitized tables belonging to one font.
pub struct Font<'a> {
    tables: FxHashMap<u32, Table<'a>>,
    /// Tags of accepted tables in the order they were accepted.
    order: Vec<u32>,
    variation_store_parser: Box<dyn VariationStoreParser>,
}

/// Result of sanitizing a table whose failure is not fatal.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The table was accepted and can be resolved and serialized.
    Accepted,
    /// The table was rejected and left out of the font.
    Dropped(SanitizeError),
}

impl<'a> Font<'a> {
    /// Create an empty registry that checks item variation stores with
    /// [ItemVariationStoreValidator].
    pub fn new() -> Font<'a> {
        Font::with_variation_store_parser(ItemVariationStoreValidator)
    }

    /// Create an empty registry that delegates item variation stores to `parser`.
    ///
    /// The parser must not borrow anything, so that table data can be declared after the `Font`
    /// that holds it.
    pub fn with_variation_store_parser(parser: impl VariationStoreParser + 'static) -> Font<'a> {
        Font {
            tables: FxHashMap::default(),
            order: Vec::new(),
            variation_store_parser: Box::new(parser),
        }
    }

    /// Sanitize `data` as the table identified by `tag` and publish it on success.
    ///
    /// Tables that others depend on must be sanitized first: `EBDT` before `EBLC` and `CBDT`
    /// before `CBLC`.
    ///
    /// Returns `Err` if the table failed and its failure is fatal to the font. A failing table
    /// that can be dropped yields `Ok(Outcome::Dropped)` instead.
    pub fn sanitize_table(&mut self, tag: u32, data: &'a [u8]) -> Result<Outcome, SanitizeError> {
        if self.tables.contains_key(&tag) {
            return Err(SanitizeError::new(
                tag,
                ParseError::BadValue,
                "duplicate table",
            ));
        }

        match Table::sanitize(tag, ReadScope::new(data), self) {
            Ok(table) => {
                debug!("accepted '{}' table ({} bytes)", DisplayTag(tag), data.len());
                self.tables.insert(tag, table);
                self.order.push(tag);
                Ok(Outcome::Accepted)
            }
            Err(err) => match Table::severity(tag) {
                Severity::Fatal => Err(err),
                Severity::Drop => {
                    warn!("dropping table: {}", err);
                    Ok(Outcome::Dropped(err))
                }
            },
        }
    }

    /// Look up an accepted table.
    pub fn resolve(&self, tag: u32) -> Option<&Table<'a>> {
        self.tables.get(&tag)
    }

    /// Look up the accepted bitmap data table of the given flavour.
    pub fn bitmap_data(&self, flavour: BitmapFlavour) -> Option<&BitmapDataTable<'a>> {
        match self.resolve(flavour.data_tag()) {
            Some(Table::BitmapData(table)) => Some(table),
            _ => None,
        }
    }

    /// The parser that item variation stores are delegated to.
    pub fn variation_store_parser(&self) -> &dyn VariationStoreParser {
        self.variation_store_parser.as_ref()
    }

    /// Tags of the accepted tables, in the order they were accepted.
    pub fn tags(&self) -> impl Iterator<Item = u32> + '_ {
        self.order.iter().copied()
    }

    /// Write the accepted table identified by `tag` to `ctxt`.
    pub fn serialize_table<C: WriteContext>(
        &self,
        tag: u32,
        ctxt: &mut C,
    ) -> Result<(), WriteError> {
        let table = self.resolve(tag).ok_or(WriteError::MissingTable(tag))?;
        Table::write(ctxt, table)
    }

    /// Write every accepted table to `ctxt`, one after the other, in the order they were
    /// accepted.
    pub fn serialize<C: WriteContext>(&self, ctxt: &mut C) -> Result<(), WriteError> {
        for tag in self.tags() {
            self.serialize_table(tag, ctxt)?;
        }
        Ok(())
    }
}

impl<'a> Default for Font<'a> {
    fn default() -> Self {
        Font::new()
    }
}
