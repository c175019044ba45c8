#![deny(missing_docs)]

//! Embedded bitmap tables.
//!
//! `EBLC`/`EBDT` hold monochrome and greyscale strikes, `CBLC`/`CBDT` are the backwards compatible
//! colour extension of the same layout. The location table describes where every glyph's image
//! lives in the data table, so all of the cross-table checking happens in [eblc].

pub mod ebdt;
pub mod eblc;

use std::convert::TryFrom;

use bitflags::bitflags;

use crate::error::ParseError;
use crate::tag;

/// Bit depth of bitmap data.
#[derive(Debug, PartialEq, Eq, Copy, Clone, PartialOrd)]
pub enum BitDepth {
    /// 1-bit per pixel.
    One = 1,
    /// 2-bits per pixel.
    Two = 2,
    /// 4-bits per pixel.
    Four = 4,
    /// 8-bits per pixel.
    Eight = 8,
    /// 32-bits per pixel (RGBA)
    ThirtyTwo = 32,
}

bitflags! {
    /// Flags of a `BitmapSize` record.
    ///
    /// <https://learn.microsoft.com/en-us/typography/opentype/spec/eblc#bitmap-flags>
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct BitmapFlags: u8 {
        /// Small glyph metrics are horizontal.
        const HORIZONTAL_METRICS = 0x01;
        /// Small glyph metrics are vertical.
        const VERTICAL_METRICS = 0x02;
        // 0xFC reserved, set to zero.
    }
}

/// Which pair of bitmap tables is being sanitized.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum BitmapFlavour {
    /// `EBLC`/`EBDT`, major version 2.
    Embedded,
    /// `CBLC`/`CBDT`, major version 3.
    Color,
}

/// Format of the glyph image data in the bitmap data table.
///
/// <https://learn.microsoft.com/en-us/typography/opentype/spec/ebdt#glyph-bitmap-data-formats>
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum ImageFormat {
    /// Small metrics, byte-aligned data.
    Format1,
    /// Small metrics, bit-aligned data.
    Format2,
    /// Metrics in the location table, bit-aligned data.
    Format5,
    /// Big metrics, byte-aligned data.
    Format6,
    /// Big metrics, bit-aligned data.
    Format7,
    /// Small metrics, component data.
    Format8,
    /// Big metrics, component data.
    Format9,
    /// Small metrics, PNG data.
    Format17,
    /// Big metrics, PNG data.
    Format18,
    /// Metrics in the location table, PNG data.
    Format19,
}

impl BitmapFlavour {
    /// The only major version accepted for tables of this flavour.
    pub fn major_version(self) -> u16 {
        match self {
            BitmapFlavour::Embedded => 2,
            BitmapFlavour::Color => 3,
        }
    }

    /// Tag of the data table.
    pub fn data_tag(self) -> u32 {
        match self {
            BitmapFlavour::Embedded => tag::EBDT,
            BitmapFlavour::Color => tag::CBDT,
        }
    }

    /// Tag of the location table.
    pub fn location_tag(self) -> u32 {
        match self {
            BitmapFlavour::Embedded => tag::EBLC,
            BitmapFlavour::Color => tag::CBLC,
        }
    }

    /// Parse a raw bit depth, accepting 32-bit colour only for colour tables.
    pub fn bit_depth(self, value: u8) -> Result<BitDepth, ParseError> {
        match BitDepth::try_from(value)? {
            BitDepth::ThirtyTwo if self == BitmapFlavour::Embedded => Err(ParseError::BadValue),
            bit_depth => Ok(bit_depth),
        }
    }

    /// Parse a raw image format, accepting the PNG formats only for colour tables.
    pub fn image_format(self, value: u16) -> Result<ImageFormat, ParseError> {
        let image_format = ImageFormat::try_from(value)?;
        if image_format.is_png() && self == BitmapFlavour::Embedded {
            return Err(ParseError::InvalidFormat(value));
        }
        Ok(image_format)
    }
}

impl ImageFormat {
    /// Returns `true` if each glyph's data in the data table starts with its own metrics.
    ///
    /// Formats 5 and 19 rely on the metrics stored in the index sub-table instead.
    pub fn has_glyph_metrics(self) -> bool {
        !matches!(self, ImageFormat::Format5 | ImageFormat::Format19)
    }

    fn is_png(self) -> bool {
        matches!(
            self,
            ImageFormat::Format17 | ImageFormat::Format18 | ImageFormat::Format19
        )
    }
}

impl TryFrom<u8> for BitDepth {
    type Error = ParseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(BitDepth::One),
            2 => Ok(BitDepth::Two),
            4 => Ok(BitDepth::Four),
            8 => Ok(BitDepth::Eight),
            32 => Ok(BitDepth::ThirtyTwo),
            _ => Err(ParseError::BadValue),
        }
    }
}

impl TryFrom<u16> for ImageFormat {
    type Error = ParseError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ImageFormat::Format1),
            2 => Ok(ImageFormat::Format2),
            5 => Ok(ImageFormat::Format5),
            6 => Ok(ImageFormat::Format6),
            7 => Ok(ImageFormat::Format7),
            8 => Ok(ImageFormat::Format8),
            9 => Ok(ImageFormat::Format9),
            17 => Ok(ImageFormat::Format17),
            18 => Ok(ImageFormat::Format18),
            19 => Ok(ImageFormat::Format19),
            _ => Err(ParseError::InvalidFormat(value)),
        }
    }
}
