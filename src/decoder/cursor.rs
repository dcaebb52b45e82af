//!
//! Bounds-checked reader over an immutable account buffer.
//!
//! Every read names the field it is consuming so that a malformed buffer is reported with the
//! exact field that overflowed. Reads never index past the end of the buffer; they fail closed
//! with a [`DecodeError`] instead.

use super::DecodeError;
use solana_pubkey::Pubkey;

/// Single-pass little-endian cursor over a byte slice.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
	buf: &'a [u8],
	offset: usize,
}

impl<'a> ByteCursor<'a> {
	pub fn new(buf: &'a [u8]) -> Self {
		Self { buf, offset: 0 }
	}

	/// Bytes left after the current position.
	pub fn remaining(&self) -> usize {
		self.buf.len() - self.offset
	}

	/// Consume exactly `len` bytes.
	pub fn read_bytes(&mut self, field: &'static str, len: usize) -> Result<&'a [u8], DecodeError> {
		let end = self
			.offset
			.checked_add(len)
			.filter(|end| *end <= self.buf.len())
			.ok_or(DecodeError::FieldOutOfBounds {
				field,
				offset: self.offset,
				len,
				available: self.remaining(),
			})?;

		let bytes = &self.buf[self.offset..end];
		self.offset = end;
		Ok(bytes)
	}

	/// Consume a fixed-size array.
	pub fn read_array<const N: usize>(
		&mut self,
		field: &'static str,
	) -> Result<[u8; N], DecodeError> {
		let mut out = [0u8; N];
		out.copy_from_slice(self.read_bytes(field, N)?);
		Ok(out)
	}

	pub fn read_u8(&mut self, field: &'static str) -> Result<u8, DecodeError> {
		Ok(self.read_array::<1>(field)?[0])
	}

	pub fn read_u16(&mut self, field: &'static str) -> Result<u16, DecodeError> {
		Ok(u16::from_le_bytes(self.read_array(field)?))
	}

	pub fn read_u32(&mut self, field: &'static str) -> Result<u32, DecodeError> {
		Ok(u32::from_le_bytes(self.read_array(field)?))
	}

	pub fn read_u64(&mut self, field: &'static str) -> Result<u64, DecodeError> {
		Ok(u64::from_le_bytes(self.read_array(field)?))
	}

	pub fn read_i64(&mut self, field: &'static str) -> Result<i64, DecodeError> {
		Ok(i64::from_le_bytes(self.read_array(field)?))
	}

	/// Only a literal `1` counts as true.
	pub fn read_flag(&mut self, field: &'static str) -> Result<bool, DecodeError> {
		Ok(self.read_u8(field)? == 1)
	}

	pub fn read_pubkey(&mut self, field: &'static str) -> Result<Pubkey, DecodeError> {
		Ok(Pubkey::new_from_array(self.read_array(field)?))
	}

	/// Consume a `u32` length prefix followed by that many bytes.
	///
	/// The declared length is checked against the remaining buffer before anything is consumed.
	pub fn read_length_prefixed(&mut self, field: &'static str) -> Result<&'a [u8], DecodeError> {
		let declared = self.read_u32(field)? as usize;
		self.read_bytes(field, declared)
	}

	/// Length-prefixed string. Invalid UTF-8 is replaced rather than rejected.
	pub fn read_string(&mut self, field: &'static str) -> Result<String, DecodeError> {
		let bytes = self.read_length_prefixed(field)?;
		Ok(String::from_utf8_lossy(bytes).into_owned())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn reads_little_endian_integers_in_sequence() {
		let mut buf = Vec::new();
		buf.extend_from_slice(&0x0102u16.to_le_bytes());
		buf.extend_from_slice(&0x0304_0506u32.to_le_bytes());
		buf.extend_from_slice(&u64::MAX.to_le_bytes());
		buf.push(1);

		let mut cursor = ByteCursor::new(&buf);
		assert_eq!(cursor.read_u16("a").unwrap(), 0x0102);
		assert_eq!(cursor.read_u32("b").unwrap(), 0x0304_0506);
		assert_eq!(cursor.read_u64("c").unwrap(), u64::MAX);
		assert!(cursor.read_flag("d").unwrap());
		assert_eq!(cursor.remaining(), 0);
	}

	#[test]
	fn fixed_read_past_end_names_the_field() {
		let buf = [0u8; 3];
		let mut cursor = ByteCursor::new(&buf);

		let err = cursor.read_u32("total_supply").unwrap_err();
		assert_eq!(
			err,
			DecodeError::FieldOutOfBounds {
				field: "total_supply",
				offset: 0,
				len: 4,
				available: 3,
			}
		);
		// failed reads do not advance
		assert_eq!(cursor.remaining(), 3);
	}

	#[test]
	fn declared_length_larger_than_buffer_is_rejected() {
		let mut buf = Vec::new();
		buf.extend_from_slice(&10u32.to_le_bytes());
		buf.extend_from_slice(b"short");

		let mut cursor = ByteCursor::new(&buf);
		let err = cursor.read_string("name").unwrap_err();
		assert_eq!(
			err,
			DecodeError::FieldOutOfBounds {
				field: "name",
				offset: 4,
				len: 10,
				available: 5,
			}
		);
	}

	#[test]
	fn huge_declared_length_does_not_overflow() {
		let buf = u32::MAX.to_le_bytes();
		let mut cursor = ByteCursor::new(&buf);
		assert!(matches!(
			cursor.read_string("metadata_uri"),
			Err(DecodeError::FieldOutOfBounds { field: "metadata_uri", .. })
		));
	}

	#[test]
	fn invalid_utf8_is_replaced() {
		let mut buf = Vec::new();
		buf.extend_from_slice(&2u32.to_le_bytes());
		buf.extend_from_slice(&[0xff, b'a']);

		let mut cursor = ByteCursor::new(&buf);
		assert_eq!(cursor.read_string("symbol").unwrap(), "\u{fffd}a");
	}

	#[test]
	fn flag_is_true_only_for_one() {
		let buf = [0u8, 1, 2];
		let mut cursor = ByteCursor::new(&buf);
		assert!(!cursor.read_flag("x").unwrap());
		assert!(cursor.read_flag("x").unwrap());
		assert!(!cursor.read_flag("x").unwrap());
	}
}
