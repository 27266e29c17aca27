// Positioned-read byte sources
//
// Every read is addressed by absolute offset so one reader can serve
// concurrent callers without a shared cursor.

use crate::core::error::{DbfError, Result};
use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::sync::{Arc, Mutex};

pub trait ByteSource {
    /// Copies bytes starting at `offset` into `buf` and returns how many were
    /// copied. A count below `buf.len()` means the source ended first.
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize>;
}

impl ByteSource for [u8] {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        let start = match usize::try_from(offset) {
            Ok(start) if start < self.len() => start,
            _ => return Ok(0),
        };
        let n = buf.len().min(self.len() - start);
        buf[..n].copy_from_slice(&self[start..start + n]);
        Ok(n)
    }
}

impl ByteSource for Vec<u8> {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        self.as_slice().read_at(offset, buf)
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &S {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        (**self).read_at(offset, buf)
    }
}

impl<S: ByteSource + ?Sized> ByteSource for Arc<S> {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        (**self).read_at(offset, buf)
    }
}

/// Adapts a cursor-based `Read + Seek` stream by holding a lock across each
/// seek-and-read pair.
#[derive(Debug)]
pub struct LockedSource<R> {
    inner: Mutex<R>,
}

pub type FileSource = LockedSource<File>;

impl<R: Read + Seek> LockedSource<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner: Mutex::new(inner),
        }
    }

    pub fn into_inner(self) -> Result<R> {
        self.inner.into_inner().map_err(|_| DbfError::LockPoisoned)
    }
}

impl<R: Read + Seek> ByteSource for LockedSource<R> {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        let mut stream = self.inner.lock().map_err(|_| DbfError::LockPoisoned)?;

        stream.seek(SeekFrom::Start(offset))?;

        let mut filled = 0;
        while filled < buf.len() {
            match stream.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Ok(filled)
    }
}

/// Reads `len` bytes at `offset`, failing with `Truncated` when the source
/// holds fewer.
pub(crate) fn read_exact_at<S: ByteSource + ?Sized>(
    source: &S,
    offset: u64,
    len: usize,
    structure: &'static str,
) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    let found = source.read_at(offset, &mut buf)?;
    if found < len {
        return Err(DbfError::Truncated {
            structure,
            offset,
            expected: len,
            found,
        });
    }
    Ok(buf)
}
