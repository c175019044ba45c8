#![deny(missing_docs)]

//! Write binary data

use crate::binary::read::ReadScope;
use crate::error::WriteError;

/// An in-memory buffer that implements `WriteContext`.
pub struct WriteBuffer {
    data: Vec<u8>,
}

/// Trait that describes a type that can be written to a `WriteContext` in binary form.
pub trait WriteBinary<HostType = Self> {
    /// The type of the value returned by `write`.
    type Output;

    /// Write the binary representation of Self to `ctxt`.
    fn write<C: WriteContext>(ctxt: &mut C, val: HostType) -> Result<Self::Output, WriteError>;
}

/// Trait for types that can have binary data written to them.
pub trait WriteContext {
    /// Write a slice of bytes to a `WriteContext`.
    fn write_bytes(&mut self, data: &[u8]) -> Result<(), WriteError>;
}

impl WriteContext for WriteBuffer {
    fn write_bytes(&mut self, data: &[u8]) -> Result<(), WriteError> {
        self.data.extend_from_slice(data);
        Ok(())
    }
}

impl<'a> WriteBinary for ReadScope<'a> {
    type Output = ();

    fn write<C: WriteContext>(ctxt: &mut C, scope: Self) -> Result<(), WriteError> {
        ctxt.write_bytes(scope.data())
    }
}

impl WriteBuffer {
    /// Create a new, empty `WriteBuffer`
    pub fn new() -> Self {
        WriteBuffer { data: Vec::new() }
    }

    /// Retrieve a slice of the data held by this buffer
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Returns the current size of the data held by this buffer
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if nothing has been written to this buffer
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Consume `self` and return the inner buffer
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

impl Default for WriteBuffer {
    fn default() -> Self {
        WriteBuffer::new()
    }
}
