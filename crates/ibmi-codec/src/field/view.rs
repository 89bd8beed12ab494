//! Borrowed windows over caller-owned record buffers.

use super::FieldDescriptor;
use crate::error::CodecError;
use crate::Result;

fn check(buffer_len: usize, offset: usize, length: usize) -> Result<usize> {
    let end = offset.checked_add(length).ok_or(CodecError::BufferTooShort {
        required: usize::MAX,
        actual: buffer_len,
    })?;
    if end > buffer_len {
        return Err(CodecError::BufferTooShort {
            required: end,
            actual: buffer_len,
        });
    }
    Ok(end)
}

/// Read-only `(bytes, offset, length)` window.
#[derive(Debug, Clone, Copy)]
pub struct FieldView<'a> {
    bytes: &'a [u8],
    offset: usize,
    length: usize,
}

impl<'a> FieldView<'a> {
    /// Window of `length` bytes at `offset`.
    pub fn new(bytes: &'a [u8], offset: usize, length: usize) -> Result<Self> {
        check(bytes.len(), offset, length)?;
        Ok(Self {
            bytes,
            offset,
            length,
        })
    }

    /// Window covering `field` in a record buffer.
    pub fn of(field: &FieldDescriptor, record: &'a [u8]) -> Result<Self> {
        Self::new(record, field.offset, field.length)
    }

    /// The field's bytes.
    pub fn as_bytes(&self) -> &'a [u8] {
        &self.bytes[self.offset..self.offset + self.length]
    }

    /// Offset of the window in the underlying buffer.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Width of the window.
    pub fn len(&self) -> usize {
        self.length
    }

    /// Whether the window is empty.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

/// Mutable `(bytes, offset, length)` window.
#[derive(Debug)]
pub struct FieldViewMut<'a> {
    bytes: &'a mut [u8],
    offset: usize,
    length: usize,
}

impl<'a> FieldViewMut<'a> {
    /// Window of `length` bytes at `offset`.
    pub fn new(bytes: &'a mut [u8], offset: usize, length: usize) -> Result<Self> {
        check(bytes.len(), offset, length)?;
        Ok(Self {
            bytes,
            offset,
            length,
        })
    }

    /// Window covering `field` in a record buffer.
    pub fn of(field: &FieldDescriptor, record: &'a mut [u8]) -> Result<Self> {
        Self::new(record, field.offset, field.length)
    }

    /// The field's bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[self.offset..self.offset + self.length]
    }

    /// The field's bytes, writable.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes[self.offset..self.offset + self.length]
    }

    /// Width of the window.
    pub fn len(&self) -> usize {
        self.length
    }

    /// Whether the window is empty.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_window() {
        let record = [1u8, 2, 3, 4, 5];
        let view = FieldView::new(&record, 1, 3).unwrap();
        assert_eq!(view.as_bytes(), &[2, 3, 4]);
        assert_eq!((view.offset(), view.len()), (1, 3));
    }

    #[test]
    fn test_view_out_of_bounds() {
        let record = [0u8; 4];
        assert!(matches!(
            FieldView::new(&record, 2, 3),
            Err(CodecError::BufferTooShort {
                required: 5,
                actual: 4
            })
        ));
        assert!(FieldView::new(&record, usize::MAX, 2).is_err());
    }

    #[test]
    fn test_view_mut_writes_through() {
        let mut record = [0u8; 4];
        let mut view = FieldViewMut::new(&mut record, 2, 2).unwrap();
        view.as_bytes_mut().fill(0x40);
        assert_eq!(record, [0, 0, 0x40, 0x40]);
    }
}
