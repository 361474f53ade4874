//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::Ipv4Addr;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use holo_utils::bytes::{BytesExt, BytesMutExt};
use holo_utils::mpls::Label;
use num_traits::FromPrimitive;
use serde::{Deserialize, Serialize};

use crate::packet::consts::{EsiType, RdType};
use crate::packet::error::DecodeResult;

//
// Route Distinguisher (RFC 4364, Section 4.2).
//
// Encoding format:
//
// 0                   1                   2                   3
// 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |             Type              |                               |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+                               +
// |                     Value (6 octets)                          |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub enum RouteDistinguisher {
    As2 { asn: u16, number: u32 },
    Ipv4 { addr: Ipv4Addr, number: u16 },
    As4 { asn: u32, number: u16 },
    Other { rd_type: u16, value: [u8; 6] },
}

//
// EVPN Ethernet Segment Identifier (RFC 7432, Section 5).
//
// Encoding format:
//
// +---+---+---+---+---+---+---+---+---+---+
// | T |          ESI Value                |
// +---+---+---+---+---+---+---+---+---+---+
//
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub struct Esi {
    pub esi_type: u8,
    pub value: [u8; 9],
}

//
// MPLS label stack entry, as carried in labeled NLRI (RFC 8277).
//
// Encoding format:
//
// 0                   1                   2
// 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                Label                  | Exp |S|
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub struct MplsLabel {
    pub label: Label,
    pub exp: u8,
    pub bos: bool,
}

// ===== impl RouteDistinguisher =====

impl RouteDistinguisher {
    pub const LENGTH: usize = 8;

    pub fn decode(buf: &mut Bytes) -> DecodeResult<Self> {
        let rd_type = buf.try_get_u16()?;
        let rd = match RdType::from_u16(rd_type) {
            Some(RdType::As2) => {
                let asn = buf.try_get_u16()?;
                let number = buf.try_get_u32()?;
                RouteDistinguisher::As2 { asn, number }
            }
            Some(RdType::Ipv4) => {
                let addr = buf.try_get_ipv4()?;
                let number = buf.try_get_u16()?;
                RouteDistinguisher::Ipv4 { addr, number }
            }
            Some(RdType::As4) => {
                let asn = buf.try_get_u32()?;
                let number = buf.try_get_u16()?;
                RouteDistinguisher::As4 { asn, number }
            }
            None => {
                let mut value = [0; 6];
                buf.try_copy_to_slice(&mut value)?;
                RouteDistinguisher::Other { rd_type, value }
            }
        };

        Ok(rd)
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        match self {
            RouteDistinguisher::As2 { asn, number } => {
                buf.put_u16(RdType::As2 as u16);
                buf.put_u16(*asn);
                buf.put_u32(*number);
            }
            RouteDistinguisher::Ipv4 { addr, number } => {
                buf.put_u16(RdType::Ipv4 as u16);
                buf.put_ipv4(addr);
                buf.put_u16(*number);
            }
            RouteDistinguisher::As4 { asn, number } => {
                buf.put_u16(RdType::As4 as u16);
                buf.put_u32(*asn);
                buf.put_u16(*number);
            }
            RouteDistinguisher::Other { rd_type, value } => {
                buf.put_u16(*rd_type);
                buf.put_slice(value);
            }
        }
    }
}

impl std::fmt::Display for RouteDistinguisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteDistinguisher::As2 { asn, number } => {
                write!(f, "{asn}:{number}")
            }
            RouteDistinguisher::Ipv4 { addr, number } => {
                write!(f, "{addr}:{number}")
            }
            RouteDistinguisher::As4 { asn, number } => {
                write!(f, "{asn}:{number}")
            }
            RouteDistinguisher::Other { rd_type, value } => {
                write!(f, "{rd_type}:")?;
                for byte in value {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
        }
    }
}

// ===== impl Esi =====

impl Esi {
    pub const LENGTH: usize = 10;

    pub fn decode(buf: &mut Bytes) -> DecodeResult<Self> {
        let esi_type = buf.try_get_u8()?;
        let mut value = [0; 9];
        buf.try_copy_to_slice(&mut value)?;
        Ok(Esi { esi_type, value })
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        buf.put_u8(self.esi_type);
        buf.put_slice(&self.value);
    }

    // Returns the ESI type, if known.
    pub fn kind(&self) -> Option<EsiType> {
        EsiType::from_u8(self.esi_type)
    }
}

// ===== impl MplsLabel =====

impl MplsLabel {
    pub const LENGTH: usize = 3;

    pub fn new(label: Label, exp: u8, bos: bool) -> Self {
        MplsLabel {
            label,
            exp: exp & 0x07,
            bos,
        }
    }

    pub fn decode(buf: &mut Bytes) -> DecodeResult<Self> {
        let entry = buf.try_get_u24()?;
        Ok(MplsLabel {
            label: Label::new(entry >> 4),
            exp: ((entry >> 1) & 0x07) as u8,
            bos: entry & 0x01 != 0,
        })
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        let entry = (self.label.get() << 4)
            | (((self.exp & 0x07) as u32) << 1)
            | self.bos as u32;
        buf.put_u24(entry);
    }
}

// ===== unit tests =====
