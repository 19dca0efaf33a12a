//! Minimal byte codec for mapper register snapshots.
//!
//! Mappers hold only small register files; each variant writes its fields
//! in a fixed order and reads them back the same way. Readers consume a
//! `&mut &[u8]` cursor and return `None` on truncation so the caller can
//! reject the whole blob.

pub(crate) fn put_u8(out: &mut Vec<u8>, value: u8) {
    out.push(value);
}

pub(crate) fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

pub(crate) fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

pub(crate) fn put_i16(out: &mut Vec<u8>, value: i16) {
    out.extend_from_slice(&value.to_le_bytes());
}

pub(crate) fn put_i32(out: &mut Vec<u8>, value: i32) {
    out.extend_from_slice(&value.to_le_bytes());
}

pub(crate) fn put_bool(out: &mut Vec<u8>, value: bool) {
    out.push(u8::from(value));
}

pub(crate) fn take_u8(data: &mut &[u8]) -> Option<u8> {
    let (&first, rest) = data.split_first()?;
    *data = rest;
    Some(first)
}

pub(crate) fn take_u16(data: &mut &[u8]) -> Option<u16> {
    let (head, rest) = data.split_first_chunk::<2>()?;
    *data = rest;
    Some(u16::from_le_bytes(*head))
}

pub(crate) fn take_u32(data: &mut &[u8]) -> Option<u32> {
    let (head, rest) = data.split_first_chunk::<4>()?;
    *data = rest;
    Some(u32::from_le_bytes(*head))
}

pub(crate) fn take_i16(data: &mut &[u8]) -> Option<i16> {
    let (head, rest) = data.split_first_chunk::<2>()?;
    *data = rest;
    Some(i16::from_le_bytes(*head))
}

pub(crate) fn take_i32(data: &mut &[u8]) -> Option<i32> {
    let (head, rest) = data.split_first_chunk::<4>()?;
    *data = rest;
    Some(i32::from_le_bytes(*head))
}

pub(crate) fn take_bool(data: &mut &[u8]) -> Option<bool> {
    take_u8(data).map(|value| value != 0)
}
