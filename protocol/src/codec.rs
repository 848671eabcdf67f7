//! Little-endian wire primitives shared by attachments, appendices and the
//! transaction assembler.
//!
//! Writing goes through [`bytes::BufMut`] directly. Reading wraps
//! [`bytes::Buf`], whose getters panic on short input, with explicit length
//! checks so a truncated buffer surfaces as [`NxtError::Truncated`].

use bytes::{Buf, BufMut};

use crate::config::TEXT_FLAG;
use crate::error::NxtError;

pub(crate) fn ensure(buf: &impl Buf, needed: usize) -> Result<(), NxtError> {
    if buf.remaining() < needed {
        return Err(NxtError::Truncated {
            needed,
            remaining: buf.remaining(),
        });
    }
    Ok(())
}

pub(crate) fn get_u8(buf: &mut impl Buf) -> Result<u8, NxtError> {
    ensure(buf, 1)?;
    Ok(buf.get_u8())
}

pub(crate) fn get_i8(buf: &mut impl Buf) -> Result<i8, NxtError> {
    ensure(buf, 1)?;
    Ok(buf.get_i8())
}

pub(crate) fn get_i16(buf: &mut impl Buf) -> Result<i16, NxtError> {
    ensure(buf, 2)?;
    Ok(buf.get_i16_le())
}

pub(crate) fn get_u16(buf: &mut impl Buf) -> Result<u16, NxtError> {
    ensure(buf, 2)?;
    Ok(buf.get_u16_le())
}

pub(crate) fn get_i32(buf: &mut impl Buf) -> Result<i32, NxtError> {
    ensure(buf, 4)?;
    Ok(buf.get_i32_le())
}

pub(crate) fn get_u32(buf: &mut impl Buf) -> Result<u32, NxtError> {
    ensure(buf, 4)?;
    Ok(buf.get_u32_le())
}

pub(crate) fn get_i64(buf: &mut impl Buf) -> Result<i64, NxtError> {
    ensure(buf, 8)?;
    Ok(buf.get_i64_le())
}

pub(crate) fn get_bytes(buf: &mut impl Buf, len: usize) -> Result<Vec<u8>, NxtError> {
    ensure(buf, len)?;
    let mut out = vec![0u8; len];
    buf.copy_to_slice(&mut out);
    Ok(out)
}

pub(crate) fn get_array<const N: usize>(buf: &mut impl Buf) -> Result<[u8; N], NxtError> {
    ensure(buf, N)?;
    let mut out = [0u8; N];
    buf.copy_to_slice(&mut out);
    Ok(out)
}

/// Optional leading version byte: present only when the caller knows the
/// version is non-zero. Appendices learn that from the flags word; primary
/// attachments of version 1+ transactions always carry one.
pub(crate) fn put_version(buf: &mut impl BufMut, version: u8) {
    if version > 0 {
        buf.put_u8(version);
    }
}

/// 4-byte length word with bit 31 marking a text payload.
pub(crate) fn put_flagged_len(buf: &mut impl BufMut, len: usize, is_text: bool) {
    let word = len as u32 | if is_text { TEXT_FLAG } else { 0 };
    buf.put_u32_le(word);
}

/// Inverse of [`put_flagged_len`]: `(length, is_text)`.
pub(crate) fn get_flagged_len(buf: &mut impl Buf) -> Result<(usize, bool), NxtError> {
    let word = get_u32(buf)?;
    Ok(((word & !TEXT_FLAG) as usize, word & TEXT_FLAG != 0))
}

/// String with a one-byte length prefix. Callers validate the length first.
pub(crate) fn put_string_u8(buf: &mut impl BufMut, value: &str) {
    buf.put_u8(value.len() as u8);
    buf.put_slice(value.as_bytes());
}

/// String with a two-byte little-endian length prefix.
pub(crate) fn put_string_u16(buf: &mut impl BufMut, value: &str) {
    buf.put_u16_le(value.len() as u16);
    buf.put_slice(value.as_bytes());
}

fn utf8(field: &str, raw: Vec<u8>) -> Result<String, NxtError> {
    String::from_utf8(raw).map_err(|e| NxtError::invalid(field, e.to_string()))
}

pub(crate) fn get_string_u8(buf: &mut impl Buf, field: &str) -> Result<String, NxtError> {
    let len = get_u8(buf)? as usize;
    utf8(field, get_bytes(buf, len)?)
}

pub(crate) fn get_string_u16(buf: &mut impl Buf, field: &str) -> Result<String, NxtError> {
    let len = get_u16(buf)? as usize;
    utf8(field, get_bytes(buf, len)?)
}

/// Reject a value longer than `max` bytes.
pub(crate) fn check_len(what: &'static str, len: usize, max: usize) -> Result<(), NxtError> {
    if len > max {
        return Err(NxtError::TooLong { what, len, max });
    }
    Ok(())
}
