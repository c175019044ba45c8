#![warn(rust_2018_idioms)]

//! Sanitize embedded bitmap and metrics variation tables of OpenType fonts.
//!
//! Each table is validated from the bytes supplied by the caller and registered with a
//! [Font](font::Font) once accepted. Accepted tables are written back out unchanged, so anything
//! that reaches a consumer has passed every structural check.
//!
//! ```
//! use sfntsan::font::{Font, Outcome};
//! use sfntsan::tag;
//!
//! let ebdt = [0, 2, 0, 0];
//! let mut font = Font::new();
//! assert_eq!(font.sanitize_table(tag::EBDT, &ebdt), Ok(Outcome::Accepted));
//! ```

/// Reading and writing of binary data.
pub mod binary;
pub mod bitmap;
pub mod error;
pub mod font;
pub mod size;
pub mod tables;
pub mod tag;
