//! Packet buffer primitives
//!
//! Matches the host's packet conventions: VarInt (7 bits per byte, low
//! group first, high bit = continuation), strings as VarInt byte length
//! followed by UTF-8, fixed-width integers big-endian.

use bytes::{Buf, BufMut};

use crate::{LinkError, Result};

/// Longest string, in characters, the host accepts on the wire
pub const MAX_STRING_CHARS: usize = 32767;

const MAX_VAR_INT_BYTES: usize = 5;

pub fn put_var_int(buf: &mut impl BufMut, value: i32) {
    let mut value = value as u32;
    loop {
        if value & !0x7F == 0 {
            buf.put_u8(value as u8);
            return;
        }
        buf.put_u8((value & 0x7F) as u8 | 0x80);
        value >>= 7;
    }
}

pub fn get_var_int(buf: &mut impl Buf, field: &str) -> Result<i32> {
    let mut value = 0u32;
    for position in 0..MAX_VAR_INT_BYTES {
        if !buf.has_remaining() {
            return Err(LinkError::decode(field, "truncated VarInt"));
        }
        let byte = buf.get_u8();
        value |= ((byte & 0x7F) as u32) << (7 * position);
        if byte & 0x80 == 0 {
            return Ok(value as i32);
        }
    }
    Err(LinkError::decode(field, "VarInt longer than 5 bytes"))
}

pub fn put_string(buf: &mut impl BufMut, value: &str, field: &str) -> Result<()> {
    let chars = value.chars().count();
    if chars > MAX_STRING_CHARS {
        return Err(LinkError::decode(
            field,
            format!("string of {} characters exceeds {}", chars, MAX_STRING_CHARS),
        ));
    }
    put_var_int(buf, value.len() as i32);
    buf.put_slice(value.as_bytes());
    Ok(())
}

pub fn get_string(buf: &mut impl Buf, field: &str) -> Result<String> {
    let len = get_var_int(buf, field)?;
    if len < 0 {
        return Err(LinkError::decode(field, format!("negative string length {}", len)));
    }
    let len = len as usize;
    if len > MAX_STRING_CHARS * 3 {
        return Err(LinkError::decode(
            field,
            format!("encoded string of {} bytes exceeds {}", len, MAX_STRING_CHARS * 3),
        ));
    }
    if buf.remaining() < len {
        return Err(LinkError::decode(
            field,
            format!("need {} string bytes, {} remain", len, buf.remaining()),
        ));
    }

    let mut bytes = vec![0; len];
    buf.copy_to_slice(&mut bytes);
    let value = String::from_utf8(bytes)
        .map_err(|e| LinkError::decode(field, format!("invalid UTF-8: {}", e)))?;

    if value.chars().count() > MAX_STRING_CHARS {
        return Err(LinkError::decode(field, "string exceeds the character limit"));
    }
    Ok(value)
}

pub fn get_i32(buf: &mut impl Buf, field: &str) -> Result<i32> {
    if buf.remaining() < 4 {
        return Err(LinkError::decode(field, "truncated int"));
    }
    Ok(buf.get_i32())
}
