//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::Ipv4Addr;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use holo_utils::bytes::{BytesExt, BytesMutExt};
use num_traits::FromPrimitive;
use serde::{Deserialize, Serialize};

use crate::debug::Debug;
use crate::packet::Encodable;
use crate::packet::consts::{ExtCommType, TrafficActionFlags};
use crate::packet::error::{DecodeError, DecodeResult};

// Extended Communities attribute (RFC 4360).
#[derive(Clone, Debug, Default, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct ExtCommunities {
    pub comms: Vec<ExtCommunity>,
}

//
// Extended community.
//
// Encoding format:
//
// 0                   1                   2                   3
// 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |  Type high    |  Type low(*)  |                               |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+          Value                |
// |                                                               |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//
#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum ExtCommunity {
    RouteTarget(RouteTarget),
    // RFC 8955: traffic-rate in bytes per second.
    TrafficRate { asn: u16, rate: f32 },
    TrafficAction(TrafficActionFlags),
    Redirect { asn: u16, number: u32 },
    TrafficMarking { dscp: u8 },
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub enum RouteTarget {
    As2 { asn: u16, number: u32 },
    Ipv4 { addr: Ipv4Addr, number: u16 },
    As4 { asn: u32, number: u16 },
}

// ===== impl ExtCommunities =====

impl ExtCommunities {
    pub(crate) fn decode(buf: &mut Bytes) -> DecodeResult<Self> {
        if buf.remaining() % ExtCommunity::LENGTH != 0 {
            return Err(DecodeError::AttributeLength(buf.remaining() as u16));
        }

        let mut comms = vec![];
        while buf.remaining() >= ExtCommunity::LENGTH {
            let mut comm_buf = buf.split_to(ExtCommunity::LENGTH);
            if let Some(comm) = ExtCommunity::decode(&mut comm_buf)? {
                comms.push(comm);
            }
        }

        Ok(ExtCommunities { comms })
    }

    pub(crate) fn encode_value(&self, buf: &mut BytesMut) {
        for comm in &self.comms {
            comm.encode(buf);
        }
    }

    // Returns an iterator over the route targets in this attribute.
    pub fn route_targets(&self) -> impl Iterator<Item = &RouteTarget> {
        self.comms.iter().filter_map(|comm| match comm {
            ExtCommunity::RouteTarget(rt) => Some(rt),
            _ => None,
        })
    }
}

// ===== impl ExtCommunity =====

impl ExtCommunity {
    pub const LENGTH: usize = 8;

    // Decodes a single extended community. Communities of unknown type are
    // skipped.
    fn decode(buf: &mut Bytes) -> DecodeResult<Option<Self>> {
        let comm_type = buf.try_get_u8()?;
        let comm_subtype = buf.try_get_u8()?;
        let code = u16::from_be_bytes([comm_type, comm_subtype]);

        let comm = match ExtCommType::from_u16(code) {
            Some(ExtCommType::RouteTargetAs2) => {
                let asn = buf.try_get_u16()?;
                let number = buf.try_get_u32()?;
                ExtCommunity::RouteTarget(RouteTarget::As2 { asn, number })
            }
            Some(ExtCommType::RouteTargetIpv4) => {
                let addr = buf.try_get_ipv4()?;
                let number = buf.try_get_u16()?;
                ExtCommunity::RouteTarget(RouteTarget::Ipv4 { addr, number })
            }
            Some(ExtCommType::RouteTargetAs4) => {
                let asn = buf.try_get_u32()?;
                let number = buf.try_get_u16()?;
                ExtCommunity::RouteTarget(RouteTarget::As4 { asn, number })
            }
            Some(ExtCommType::TrafficRate) => {
                let asn = buf.try_get_u16()?;
                let rate = f32::from_bits(buf.try_get_u32()?);
                ExtCommunity::TrafficRate { asn, rate }
            }
            Some(ExtCommType::TrafficAction) => {
                buf.try_split_to(5)?;
                let flags = buf.try_get_u8()?;
                ExtCommunity::TrafficAction(
                    TrafficActionFlags::from_bits_truncate(flags),
                )
            }
            Some(ExtCommType::Redirect) => {
                let asn = buf.try_get_u16()?;
                let number = buf.try_get_u32()?;
                ExtCommunity::Redirect { asn, number }
            }
            Some(ExtCommType::TrafficMarking) => {
                buf.try_split_to(5)?;
                let dscp = buf.try_get_u8()? & 0x3f;
                ExtCommunity::TrafficMarking { dscp }
            }
            None => {
                Debug::ExtCommunitySkip(comm_type, comm_subtype).log();
                return Ok(None);
            }
        };

        Ok(Some(comm))
    }
}

impl Encodable for ExtCommunity {
    fn type_code(&self) -> u16 {
        let comm_type = match self {
            ExtCommunity::RouteTarget(RouteTarget::As2 { .. }) => {
                ExtCommType::RouteTargetAs2
            }
            ExtCommunity::RouteTarget(RouteTarget::Ipv4 { .. }) => {
                ExtCommType::RouteTargetIpv4
            }
            ExtCommunity::RouteTarget(RouteTarget::As4 { .. }) => {
                ExtCommType::RouteTargetAs4
            }
            ExtCommunity::TrafficRate { .. } => ExtCommType::TrafficRate,
            ExtCommunity::TrafficAction(..) => ExtCommType::TrafficAction,
            ExtCommunity::Redirect { .. } => ExtCommType::Redirect,
            ExtCommunity::TrafficMarking { .. } => ExtCommType::TrafficMarking,
        };
        comm_type as u16
    }

    fn encode(&self, buf: &mut BytesMut) -> usize {
        buf.put_u16(self.type_code());
        match self {
            ExtCommunity::RouteTarget(RouteTarget::As2 { asn, number }) => {
                buf.put_u16(*asn);
                buf.put_u32(*number);
            }
            ExtCommunity::RouteTarget(RouteTarget::Ipv4 { addr, number }) => {
                buf.put_ipv4(addr);
                buf.put_u16(*number);
            }
            ExtCommunity::RouteTarget(RouteTarget::As4 { asn, number }) => {
                buf.put_u32(*asn);
                buf.put_u16(*number);
            }
            ExtCommunity::TrafficRate { asn, rate } => {
                buf.put_u16(*asn);
                buf.put_u32(rate.to_bits());
            }
            ExtCommunity::TrafficAction(flags) => {
                buf.put_bytes(0, 5);
                buf.put_u8(flags.bits());
            }
            ExtCommunity::Redirect { asn, number } => {
                buf.put_u16(*asn);
                buf.put_u32(*number);
            }
            ExtCommunity::TrafficMarking { dscp } => {
                buf.put_bytes(0, 5);
                buf.put_u8(dscp & 0x3f);
            }
        }
        Self::LENGTH
    }
}

// ===== unit tests =====
