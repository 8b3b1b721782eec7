//! Positional binary encoding shared by every store file.
//!
//! Integers are little-endian and fixed width. Strings are an `i32` count of
//! UTF-16 code units followed by the units; an absent string is written with
//! a count of `-1`. Nothing is self-describing: a reader must consume fields
//! in exactly the order the writer produced them.

use crate::StoreError;
use std::io;
use std::path::Path;

const NULL_STRING_LEN: i32 = -1;

/// Builds the byte image of a store file in memory.
#[derive(Debug, Default)]
pub struct RecordWriter {
    buf: Vec<u8>,
}

impl RecordWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_i64(&mut self, v: i64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn write_bool(&mut self, v: bool) {
        self.buf.push(u8::from(v));
    }

    /// Length-checked: strings longer than `i32::MAX` UTF-16 units cannot be
    /// represented.
    pub fn write_string(&mut self, s: &str) -> Result<(), StoreError> {
        let units: Vec<u16> = s.encode_utf16().collect();
        let len = i32::try_from(units.len())
            .map_err(|_| StoreError::BadParams(format!("string of {} units", units.len())))?;
        self.write_i32(len);
        self.buf.reserve(units.len() * 2);
        for unit in units {
            self.buf.extend_from_slice(&unit.to_le_bytes());
        }
        Ok(())
    }

    pub fn write_opt_string(&mut self, s: Option<&str>) -> Result<(), StoreError> {
        match s {
            Some(s) => self.write_string(s),
            None => {
                self.write_i32(NULL_STRING_LEN);
                Ok(())
            }
        }
    }

    /// Raw byte span with an `i32` length prefix.
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<(), StoreError> {
        let len = i32::try_from(data.len())
            .map_err(|_| StoreError::BadParams(format!("byte span of {} bytes", data.len())))?;
        self.write_i32(len);
        self.buf.extend_from_slice(data);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Sequential reader over a store file image.
///
/// Running off the end yields an I/O `UnexpectedEof` error; structurally
/// impossible values (negative lengths, invalid UTF-16) are reported as
/// corruption of `file`.
pub struct RecordReader<'a> {
    data: &'a [u8],
    pos: usize,
    file: &'a Path,
}

impl<'a> RecordReader<'a> {
    pub fn new(data: &'a [u8], file: &'a Path) -> Self {
        Self { data, pos: 0, file }
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], StoreError> {
        if self.remaining() < n {
            return Err(StoreError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "{}: wanted {n} bytes at offset {}, {} left",
                    self.file.display(),
                    self.pos,
                    self.remaining()
                ),
            )));
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], StoreError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_i32(&mut self) -> Result<i32, StoreError> {
        Ok(i32::from_le_bytes(self.take_array()?))
    }

    pub fn read_i64(&mut self) -> Result<i64, StoreError> {
        Ok(i64::from_le_bytes(self.take_array()?))
    }

    pub fn read_u64(&mut self) -> Result<u64, StoreError> {
        Ok(u64::from_le_bytes(self.take_array()?))
    }

    pub fn read_u8(&mut self) -> Result<u8, StoreError> {
        let [b] = self.take_array::<1>()?;
        Ok(b)
    }

    pub fn read_bool(&mut self) -> Result<bool, StoreError> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(self.corrupted(format!("boolean byte {other}"))),
        }
    }

    /// Read a length prefix that must be non-negative.
    pub fn read_len(&mut self, what: &str) -> Result<usize, StoreError> {
        let len = self.read_i32()?;
        usize::try_from(len).map_err(|_| self.corrupted(format!("negative {what} length {len}")))
    }

    /// Read the count of a sequence whose entries take at least
    /// `min_entry_bytes` each. A count the rest of the file cannot hold is
    /// corruption.
    pub fn read_count(&mut self, what: &str, min_entry_bytes: usize) -> Result<usize, StoreError> {
        let count = self.read_len(what)?;
        let room = self.remaining() / min_entry_bytes.max(1);
        if count > room {
            return Err(self.corrupted(format!(
                "{what} count {count} exceeds the {} bytes left",
                self.remaining()
            )));
        }
        Ok(count)
    }

    pub fn read_opt_string(&mut self) -> Result<Option<String>, StoreError> {
        let len = self.read_i32()?;
        if len == NULL_STRING_LEN {
            return Ok(None);
        }
        let byte_len = usize::try_from(len)
            .ok()
            .and_then(|units| units.checked_mul(2))
            .ok_or_else(|| self.corrupted(format!("string length {len}")))?;
        let bytes = self.take(byte_len)?;
        let decoded: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16(&decoded)
            .map(Some)
            .map_err(|_| self.corrupted("invalid UTF-16 string"))
    }

    /// Read a string, treating the null encoding as empty.
    pub fn read_string(&mut self) -> Result<String, StoreError> {
        Ok(self.read_opt_string()?.unwrap_or_default())
    }

    pub fn read_bytes(&mut self) -> Result<Vec<u8>, StoreError> {
        let len = self.read_len("byte span")?;
        Ok(self.take(len)?.to_vec())
    }

    /// Reserve room for `n` decoded items without aborting on failure.
    pub fn reserve<T>(&self, n: usize, what: &str) -> Result<Vec<T>, StoreError> {
        let mut v = Vec::new();
        v.try_reserve(n)
            .map_err(|_| StoreError::OutOfMemory(format!("{what} of {n} entries")))?;
        Ok(v)
    }

    pub fn corrupted(&self, reason: impl Into<String>) -> StoreError {
        StoreError::corrupted(self.file, reason)
    }

    /// Fail if unread bytes remain.
    pub fn finish(&self) -> Result<(), StoreError> {
        if self.is_at_end() {
            Ok(())
        } else {
            Err(self.corrupted(format!("{} trailing bytes", self.remaining())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path() -> &'static Path {
        Path::new("test.dat")
    }

    #[test]
    fn string_layout_is_utf16_le_with_count() {
        let mut w = RecordWriter::new();
        w.write_string("hé").unwrap();
        assert_eq!(w.into_bytes(), vec![2, 0, 0, 0, b'h', 0, 0xe9, 0]);
    }

    #[test]
    fn null_string_is_minus_one() {
        let mut w = RecordWriter::new();
        w.write_opt_string(None).unwrap();
        let bytes = w.into_bytes();
        assert_eq!(bytes, (-1i32).to_le_bytes().to_vec());
        let mut r = RecordReader::new(&bytes, path());
        assert_eq!(r.read_opt_string().unwrap(), None);
        assert!(r.is_at_end());
    }

    #[test]
    fn mixed_fields_read_back_in_order() {
        let mut w = RecordWriter::new();
        w.write_i32(-7);
        w.write_bool(true);
        w.write_i64(1_700_000_000);
        w.write_u64(1000);
        w.write_string("𝄞 clef").unwrap();
        w.write_bytes(&[9, 8, 7]).unwrap();
        let bytes = w.into_bytes();

        let mut r = RecordReader::new(&bytes, path());
        assert_eq!(r.read_i32().unwrap(), -7);
        assert!(r.read_bool().unwrap());
        assert_eq!(r.read_i64().unwrap(), 1_700_000_000);
        assert_eq!(r.read_u64().unwrap(), 1000);
        assert_eq!(r.read_string().unwrap(), "𝄞 clef");
        assert_eq!(r.read_bytes().unwrap(), vec![9, 8, 7]);
        r.finish().unwrap();
    }

    #[test]
    fn truncated_input_is_io_error() {
        let mut w = RecordWriter::new();
        w.write_string("abcdef").unwrap();
        let mut bytes = w.into_bytes();
        bytes.truncate(6);
        let mut r = RecordReader::new(&bytes, path());
        let err = r.read_string().unwrap_err();
        assert!(matches!(err, StoreError::Io(ref e) if e.kind() == io::ErrorKind::UnexpectedEof));
        assert_eq!(err.status(), suitestore_schema::Status::IoError);
    }

    #[test]
    fn negative_string_length_is_corruption() {
        let bytes = (-5i32).to_le_bytes();
        let mut r = RecordReader::new(&bytes, path());
        assert!(matches!(
            r.read_opt_string().unwrap_err(),
            StoreError::Corrupted { .. }
        ));
    }

    #[test]
    fn unpaired_surrogate_is_corruption() {
        let mut bytes = 1i32.to_le_bytes().to_vec();
        bytes.extend_from_slice(&0xD800u16.to_le_bytes());
        let mut r = RecordReader::new(&bytes, path());
        assert!(matches!(
            r.read_string().unwrap_err(),
            StoreError::Corrupted { .. }
        ));
    }

    #[test]
    fn bad_bool_byte_is_corruption() {
        let mut r = RecordReader::new(&[2], path());
        assert!(matches!(r.read_bool().unwrap_err(), StoreError::Corrupted { .. }));
    }

    #[test]
    fn trailing_bytes_fail_finish() {
        let r = RecordReader::new(&[0, 0], path());
        assert!(r.finish().is_err());
    }

    #[test]
    fn count_larger_than_file_is_corruption() {
        let mut w = RecordWriter::new();
        w.write_i32(3);
        w.write_opt_string(None).unwrap();
        w.write_opt_string(None).unwrap();
        let bytes = w.into_bytes();
        let mut r = RecordReader::new(&bytes, path());
        assert!(matches!(
            r.read_count("auth path", 4).unwrap_err(),
            StoreError::Corrupted { .. }
        ));

        let mut w = RecordWriter::new();
        w.write_i32(2);
        w.write_opt_string(None).unwrap();
        w.write_opt_string(None).unwrap();
        let bytes = w.into_bytes();
        let mut r = RecordReader::new(&bytes, path());
        assert_eq!(r.read_count("auth path", 4).unwrap(), 2);
    }

    #[test]
    fn huge_reservation_is_out_of_memory() {
        let r = RecordReader::new(&[], path());
        let err = r.reserve::<String>(usize::MAX, "auth path").unwrap_err();
        assert!(matches!(err, StoreError::OutOfMemory(_)));
    }
}
