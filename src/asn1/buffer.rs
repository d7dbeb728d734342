//! # Reverse Buffer
//!
//! A byte arena written from its high end toward its low end. DER length
//! prefixes are only known once the content they describe has been encoded,
//! so every element is written after its children, in front of them.
//!
//! The buffer owns `capacity` bytes. The cursor splits them into the unused
//! prefix `[0, cursor)` and the written suffix `[cursor, capacity)`. Growing
//! doubles the capacity and moves the written suffix to the end of the new
//! region, so anything that needs to remember a position does so with a
//! [`Mark`], which counts written bytes and survives growth.

use crate::error::{Error, Result};

/// A write did not fit into the unused prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsufficientSpace {
    pub needed: usize,
    pub available: usize,
}

/// Number of bytes written at the time the mark was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Mark(usize);

pub struct ReverseBuffer {
    data: Vec<u8>,
    cursor: usize,
}

impl ReverseBuffer {
    /// Allocate a zeroed buffer. A capacity of zero is raised to one so that
    /// doubling always makes progress.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let capacity = capacity.max(1);
        let data = zeroed(capacity)?;
        Ok(Self {
            data,
            cursor: capacity,
        })
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.data.len() - self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of the unused prefix in front of the written bytes.
    pub fn leading_unused(&self) -> usize {
        self.cursor
    }

    pub fn written(&self) -> &[u8] {
        &self.data[self.cursor..]
    }

    pub fn mark(&self) -> Mark {
        Mark(self.len())
    }

    pub fn written_since(&self, mark: Mark) -> usize {
        self.len().saturating_sub(mark.0)
    }

    /// Place `bytes` directly in front of the written region.
    ///
    /// Either all of `bytes` is written or nothing is.
    pub fn try_prepend(&mut self, bytes: &[u8]) -> std::result::Result<(), InsufficientSpace> {
        if bytes.len() > self.cursor {
            return Err(InsufficientSpace {
                needed: bytes.len(),
                available: self.cursor,
            });
        }
        let start = self.cursor - bytes.len();
        self.data[start..self.cursor].copy_from_slice(bytes);
        self.cursor = start;
        Ok(())
    }

    /// Double the capacity, keeping the written suffix at the end.
    pub fn grow(&mut self) -> Result<()> {
        let old_capacity = self.capacity();
        let new_capacity = old_capacity.checked_mul(2).ok_or_else(|| {
            Error::AllocationFailure(format!("cannot grow buffer beyond {old_capacity} bytes"))
        })?;
        let mut data = zeroed(new_capacity)?;
        let written = self.len();
        data[new_capacity - written..].copy_from_slice(self.written());

        log::debug!(
            "Grew signed-data buffer from {old_capacity} to {new_capacity} bytes ({written} written)"
        );
        self.data = data;
        self.cursor = new_capacity - written;
        Ok(())
    }

    /// Run `write` until it succeeds, growing after every attempt that ran
    /// out of room. A failed attempt is rolled back before the retry, so the
    /// closure always starts from the same written state.
    ///
    /// Returns the number of bytes the successful attempt wrote.
    pub fn write_retrying<F>(&mut self, mut write: F) -> Result<usize>
    where
        F: FnMut(&mut Self) -> std::result::Result<(), InsufficientSpace>,
    {
        loop {
            let before = self.len();
            match write(self) {
                Ok(()) => return Ok(self.len() - before),
                Err(short) => {
                    self.rollback(before);
                    log::trace!(
                        "Write needed {} bytes with {} available, growing",
                        short.needed,
                        short.available
                    );
                    self.grow()?;
                }
            }
        }
    }

    /// Copy the written suffix into a right-sized vector, releasing the arena.
    pub fn into_trimmed(self) -> Result<Vec<u8>> {
        let written = self.len();
        let mut out = Vec::new();
        out.try_reserve_exact(written).map_err(|e| {
            Error::AllocationFailure(format!("failed to allocate {written} output bytes: {e}"))
        })?;
        out.extend_from_slice(self.written());
        Ok(out)
    }

    // Forget everything written after `len` bytes were in place and zero it again.
    fn rollback(&mut self, len: usize) {
        let cursor = self.data.len() - len;
        self.data[self.cursor..cursor].fill(0);
        self.cursor = cursor;
    }
}

fn zeroed(len: usize) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|e| Error::AllocationFailure(format!("failed to allocate {len} bytes: {e}")))?;
    data.resize(len, 0);
    Ok(data)
}
