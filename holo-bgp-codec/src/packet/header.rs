//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::packet::consts::AttrFlags;
use crate::packet::error::DecodeResult;

// Path attribute header.
//
// Encoding format:
//
// 0                   1                   2                   3
// 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |O|T|P|E| Unused|   Attr Type   |  Length (1 or 2 octets)       |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct AttrHeader {
    pub optional: bool,
    pub transitive: bool,
    pub partial: bool,
    pub extended_length: bool,
    pub type_code: u8,
    pub length: u16,
}

// Size of the BGP-LS style TLV header: type(2) + length(2).
pub const TLV_HDR_SIZE: usize = 4;
// Size of a short attribute header: flags(1) + type(1) + length(1).
pub const ATTR_HDR_SIZE: usize = 3;
// Size of a 1-octet-type TLV header: type(1) + length(2).
pub const SHORT_TLV_HDR_SIZE: usize = 3;

// ===== impl AttrHeader =====

impl AttrHeader {
    pub fn decode(buf: &mut Bytes) -> DecodeResult<Self> {
        let flags = buf.try_get_u8()?;
        let type_code = buf.try_get_u8()?;
        let flags = AttrFlags::from_bits_truncate(flags);
        let extended_length = flags.contains(AttrFlags::EXTENDED);

        // The width of the length field is selected by the flags only.
        let length = if extended_length {
            buf.try_get_u16()?
        } else {
            buf.try_get_u8()? as u16
        };

        Ok(AttrHeader {
            optional: flags.contains(AttrFlags::OPTIONAL),
            transitive: flags.contains(AttrFlags::TRANSITIVE),
            partial: flags.contains(AttrFlags::PARTIAL),
            extended_length,
            type_code,
            length,
        })
    }

    pub fn flags(&self) -> AttrFlags {
        let mut flags = AttrFlags::empty();
        flags.set(AttrFlags::OPTIONAL, self.optional);
        flags.set(AttrFlags::TRANSITIVE, self.transitive);
        flags.set(AttrFlags::PARTIAL, self.partial);
        flags.set(AttrFlags::EXTENDED, self.extended_length);
        flags
    }

    // Returns the number of bytes taken by the header on the wire.
    pub fn wire_len(&self) -> usize {
        if self.extended_length {
            ATTR_HDR_SIZE + 1
        } else {
            ATTR_HDR_SIZE
        }
    }

    // Returns whether the O/T/P bits are exactly the given combination.
    pub(crate) fn flags_are(
        &self,
        optional: bool,
        transitive: bool,
        partial: bool,
    ) -> bool {
        self.optional == optional
            && self.transitive == transitive
            && self.partial == partial
    }
}

// ===== global functions =====

// Starts encoding a path attribute. The length field is rewritten by
// `attr_encode_end`.
pub(crate) fn attr_encode_start(
    buf: &mut BytesMut,
    flags: AttrFlags,
    attr_type: u8,
) -> usize {
    let start_pos = buf.len();
    buf.put_u8((flags - AttrFlags::EXTENDED).bits());
    buf.put_u8(attr_type);
    // The attribute length will be rewritten later.
    buf.put_u8(0);
    start_pos
}

// Finishes encoding a path attribute, switching to the 2-byte length field
// when the value doesn't fit in one byte. Returns the total number of bytes
// written for the attribute.
pub(crate) fn attr_encode_end(buf: &mut BytesMut, start_pos: usize) -> usize {
    let value_pos = start_pos + ATTR_HDR_SIZE;
    let value_len = buf.len() - value_pos;
    if value_len > u8::MAX as usize {
        // Make room for the second length byte.
        buf.put_u8(0);
        let end = buf.len();
        buf.copy_within(value_pos..end - 1, value_pos + 1);
        buf[start_pos] |= AttrFlags::EXTENDED.bits();
        buf[start_pos + 2..start_pos + 4]
            .copy_from_slice(&(value_len as u16).to_be_bytes());
    } else {
        buf[start_pos + 2] = value_len as u8;
    }
    buf.len() - start_pos
}

// Starts encoding a BGP-LS style TLV (2-octet type and length).
pub(crate) fn tlv_encode_start(buf: &mut BytesMut, tlv_type: u16) -> usize {
    let start_pos = buf.len();
    buf.put_u16(tlv_type);
    // The TLV length will be rewritten later.
    buf.put_u16(0);
    start_pos
}

// Rewrites the TLV length. Returns the total number of bytes written.
pub(crate) fn tlv_encode_end(buf: &mut BytesMut, start_pos: usize) -> usize {
    let tlv_len = (buf.len() - start_pos - TLV_HDR_SIZE) as u16;
    buf[start_pos + 2..start_pos + 4].copy_from_slice(&tlv_len.to_be_bytes());
    buf.len() - start_pos
}

// Starts encoding a TLV with 1-octet type and 2-octet length.
pub(crate) fn short_tlv_encode_start(
    buf: &mut BytesMut,
    tlv_type: u8,
) -> usize {
    let start_pos = buf.len();
    buf.put_u8(tlv_type);
    // The TLV length will be rewritten later.
    buf.put_u16(0);
    start_pos
}

// Rewrites the TLV length. Returns the total number of bytes written.
pub(crate) fn short_tlv_encode_end(
    buf: &mut BytesMut,
    start_pos: usize,
) -> usize {
    let tlv_len = (buf.len() - start_pos - SHORT_TLV_HDR_SIZE) as u16;
    buf[start_pos + 1..start_pos + 3].copy_from_slice(&tlv_len.to_be_bytes());
    buf.len() - start_pos
}

// ===== unit tests =====
