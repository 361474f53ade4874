//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::cmp::Ordering;
use std::net::{Ipv4Addr, Ipv6Addr};

use bytes::{Buf, BufMut, Bytes, BytesMut};
use holo_utils::bytes::{BytesExt, BytesMutExt};
use holo_utils::ip::{Ipv4AddrExt, Ipv4NetworkExt, Ipv6AddrExt};
use ipnetwork::Ipv4Network;
use num_traits::FromPrimitive;
use serde::{Deserialize, Serialize};

use crate::packet::Encodable;
use crate::packet::consts::{LsDescriptorType, OspfRouteType};
use crate::packet::error::{DecodeError, DecodeResult};
use crate::packet::header::{tlv_encode_end, tlv_encode_start};

// IS-IS System ID length.
pub const SYSTEM_ID_LEN: usize = 6;

// IGP Router-ID (RFC 7752, Section 3.2.1.4).
//
// The layout is selected by the TLV length.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum IgpRouterId {
    IsisNonPseudonode {
        system_id: [u8; SYSTEM_ID_LEN],
    },
    IsisPseudonode {
        system_id: [u8; SYSTEM_ID_LEN],
        psn_id: u8,
    },
    OspfNonPseudonode {
        router_id: Ipv4Addr,
    },
    OspfPseudonode {
        router_id: Ipv4Addr,
        dr_addr: Ipv4Addr,
    },
}

// Node Descriptor Sub-TLVs.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum NodeDescriptorTlv {
    AsNumber(u32),
    BgpLsIdentifier(u32),
    OspfAreaId(u32),
    IgpRouterId(IgpRouterId),
}

// Link Descriptor TLVs.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum LinkDescriptorTlv {
    LinkLocalRemoteIds { local_id: u32, remote_id: u32 },
    Ipv4InterfaceAddr(Ipv4Addr),
    Ipv4NeighborAddr(Ipv4Addr),
    Ipv6InterfaceAddr(Ipv6Addr),
    Ipv6NeighborAddr(Ipv6Addr),
    MultiTopologyId(Vec<u16>),
}

// Prefix Descriptor TLVs.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum PrefixDescriptorTlv {
    MultiTopologyId(Vec<u16>),
    OspfRouteType(OspfRouteType),
    IpReachability(Ipv4Network),
}

// ===== impl IgpRouterId =====

impl IgpRouterId {
    fn decode(buf: &mut Bytes) -> DecodeResult<Self> {
        let router_id = match buf.remaining() {
            6 => {
                let mut system_id = [0; SYSTEM_ID_LEN];
                buf.try_copy_to_slice(&mut system_id)?;
                IgpRouterId::IsisNonPseudonode { system_id }
            }
            7 => {
                let mut system_id = [0; SYSTEM_ID_LEN];
                buf.try_copy_to_slice(&mut system_id)?;
                let psn_id = buf.try_get_u8()?;
                IgpRouterId::IsisPseudonode { system_id, psn_id }
            }
            4 => {
                let router_id = buf.try_get_ipv4()?;
                IgpRouterId::OspfNonPseudonode { router_id }
            }
            8 => {
                let router_id = buf.try_get_ipv4()?;
                let dr_addr = buf.try_get_ipv4()?;
                IgpRouterId::OspfPseudonode { router_id, dr_addr }
            }
            len => return Err(DecodeError::AttributeLength(len as u16)),
        };

        Ok(router_id)
    }

    fn encode(&self, buf: &mut BytesMut) {
        match self {
            IgpRouterId::IsisNonPseudonode { system_id } => {
                buf.put_slice(system_id);
            }
            IgpRouterId::IsisPseudonode { system_id, psn_id } => {
                buf.put_slice(system_id);
                buf.put_u8(*psn_id);
            }
            IgpRouterId::OspfNonPseudonode { router_id } => {
                buf.put_ipv4(router_id);
            }
            IgpRouterId::OspfPseudonode { router_id, dr_addr } => {
                buf.put_ipv4(router_id);
                buf.put_ipv4(dr_addr);
            }
        }
    }
}

// ===== impl NodeDescriptorTlv =====

impl NodeDescriptorTlv {
    pub(crate) fn decode(tlv_type: u16, buf: &mut Bytes) -> DecodeResult<Self> {
        let tlv = match LsDescriptorType::from_u16(tlv_type) {
            Some(LsDescriptorType::AsNumber) => {
                check_len(buf, 4)?;
                NodeDescriptorTlv::AsNumber(buf.try_get_u32()?)
            }
            Some(LsDescriptorType::BgpLsIdentifier) => {
                check_len(buf, 4)?;
                NodeDescriptorTlv::BgpLsIdentifier(buf.try_get_u32()?)
            }
            Some(LsDescriptorType::OspfAreaId) => {
                check_len(buf, 4)?;
                NodeDescriptorTlv::OspfAreaId(buf.try_get_u32()?)
            }
            Some(LsDescriptorType::IgpRouterId) => {
                NodeDescriptorTlv::IgpRouterId(IgpRouterId::decode(buf)?)
            }
            _ => return Err(DecodeError::UnsupportedBgpLsNlri(tlv_type)),
        };

        Ok(tlv)
    }

    // Compares two descriptors by value.
    //
    // Only the AS number and area identifier have a meaningful order; any
    // other pair of descriptors compares as equal.
    pub fn cmp_value(&self, other: &Self) -> Ordering {
        match (self, other) {
            (
                NodeDescriptorTlv::AsNumber(a),
                NodeDescriptorTlv::AsNumber(b),
            ) => a.cmp(b),
            (
                NodeDescriptorTlv::OspfAreaId(a),
                NodeDescriptorTlv::OspfAreaId(b),
            ) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

impl Encodable for NodeDescriptorTlv {
    fn type_code(&self) -> u16 {
        let tlv_type = match self {
            NodeDescriptorTlv::AsNumber(..) => LsDescriptorType::AsNumber,
            NodeDescriptorTlv::BgpLsIdentifier(..) => {
                LsDescriptorType::BgpLsIdentifier
            }
            NodeDescriptorTlv::OspfAreaId(..) => LsDescriptorType::OspfAreaId,
            NodeDescriptorTlv::IgpRouterId(..) => {
                LsDescriptorType::IgpRouterId
            }
        };
        tlv_type as u16
    }

    fn encode(&self, buf: &mut BytesMut) -> usize {
        let start_pos = tlv_encode_start(buf, self.type_code());
        match self {
            NodeDescriptorTlv::AsNumber(value)
            | NodeDescriptorTlv::BgpLsIdentifier(value)
            | NodeDescriptorTlv::OspfAreaId(value) => {
                buf.put_u32(*value);
            }
            NodeDescriptorTlv::IgpRouterId(router_id) => {
                router_id.encode(buf);
            }
        }
        tlv_encode_end(buf, start_pos)
    }
}

// ===== impl LinkDescriptorTlv =====

impl LinkDescriptorTlv {
    pub(crate) fn decode(tlv_type: u16, buf: &mut Bytes) -> DecodeResult<Self> {
        let tlv = match LsDescriptorType::from_u16(tlv_type) {
            Some(LsDescriptorType::LinkLocalRemoteIds) => {
                check_len(buf, 8)?;
                let local_id = buf.try_get_u32()?;
                let remote_id = buf.try_get_u32()?;
                LinkDescriptorTlv::LinkLocalRemoteIds {
                    local_id,
                    remote_id,
                }
            }
            Some(LsDescriptorType::Ipv4InterfaceAddr) => {
                check_len(buf, Ipv4Addr::LENGTH)?;
                LinkDescriptorTlv::Ipv4InterfaceAddr(buf.try_get_ipv4()?)
            }
            Some(LsDescriptorType::Ipv4NeighborAddr) => {
                check_len(buf, Ipv4Addr::LENGTH)?;
                LinkDescriptorTlv::Ipv4NeighborAddr(buf.try_get_ipv4()?)
            }
            Some(LsDescriptorType::Ipv6InterfaceAddr) => {
                check_len(buf, Ipv6Addr::LENGTH)?;
                LinkDescriptorTlv::Ipv6InterfaceAddr(buf.try_get_ipv6()?)
            }
            Some(LsDescriptorType::Ipv6NeighborAddr) => {
                check_len(buf, Ipv6Addr::LENGTH)?;
                LinkDescriptorTlv::Ipv6NeighborAddr(buf.try_get_ipv6()?)
            }
            Some(LsDescriptorType::MultiTopologyId) => {
                LinkDescriptorTlv::MultiTopologyId(decode_mt_ids(buf)?)
            }
            _ => return Err(DecodeError::UnsupportedBgpLsNlri(tlv_type)),
        };

        Ok(tlv)
    }

    // Compares two descriptors by value.
    //
    // Only address descriptors of the same kind have a meaningful order; any
    // other pair of descriptors compares as equal.
    pub fn cmp_value(&self, other: &Self) -> Ordering {
        use LinkDescriptorTlv::*;
        match (self, other) {
            (Ipv4InterfaceAddr(a), Ipv4InterfaceAddr(b))
            | (Ipv4NeighborAddr(a), Ipv4NeighborAddr(b)) => a.cmp(b),
            (Ipv6InterfaceAddr(a), Ipv6InterfaceAddr(b))
            | (Ipv6NeighborAddr(a), Ipv6NeighborAddr(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

impl Encodable for LinkDescriptorTlv {
    fn type_code(&self) -> u16 {
        let tlv_type = match self {
            LinkDescriptorTlv::LinkLocalRemoteIds { .. } => {
                LsDescriptorType::LinkLocalRemoteIds
            }
            LinkDescriptorTlv::Ipv4InterfaceAddr(..) => {
                LsDescriptorType::Ipv4InterfaceAddr
            }
            LinkDescriptorTlv::Ipv4NeighborAddr(..) => {
                LsDescriptorType::Ipv4NeighborAddr
            }
            LinkDescriptorTlv::Ipv6InterfaceAddr(..) => {
                LsDescriptorType::Ipv6InterfaceAddr
            }
            LinkDescriptorTlv::Ipv6NeighborAddr(..) => {
                LsDescriptorType::Ipv6NeighborAddr
            }
            LinkDescriptorTlv::MultiTopologyId(..) => {
                LsDescriptorType::MultiTopologyId
            }
        };
        tlv_type as u16
    }

    fn encode(&self, buf: &mut BytesMut) -> usize {
        let start_pos = tlv_encode_start(buf, self.type_code());
        match self {
            LinkDescriptorTlv::LinkLocalRemoteIds {
                local_id,
                remote_id,
            } => {
                buf.put_u32(*local_id);
                buf.put_u32(*remote_id);
            }
            LinkDescriptorTlv::Ipv4InterfaceAddr(addr)
            | LinkDescriptorTlv::Ipv4NeighborAddr(addr) => {
                buf.put_ipv4(addr);
            }
            LinkDescriptorTlv::Ipv6InterfaceAddr(addr)
            | LinkDescriptorTlv::Ipv6NeighborAddr(addr) => {
                buf.put_ipv6(addr);
            }
            LinkDescriptorTlv::MultiTopologyId(mt_ids) => {
                encode_mt_ids(buf, mt_ids);
            }
        }
        tlv_encode_end(buf, start_pos)
    }
}

// ===== impl PrefixDescriptorTlv =====

impl PrefixDescriptorTlv {
    // Creates an IP reachability descriptor with the host bits cleared.
    pub fn ip_reachability(prefix: Ipv4Network) -> Self {
        PrefixDescriptorTlv::IpReachability(prefix.apply_mask())
    }

    pub(crate) fn decode(tlv_type: u16, buf: &mut Bytes) -> DecodeResult<Self> {
        let tlv = match LsDescriptorType::from_u16(tlv_type) {
            Some(LsDescriptorType::MultiTopologyId) => {
                PrefixDescriptorTlv::MultiTopologyId(decode_mt_ids(buf)?)
            }
            Some(LsDescriptorType::OspfRouteType) => {
                check_len(buf, 1)?;
                let route_type = buf.try_get_u8()?;
                let route_type = OspfRouteType::from_u8(route_type)
                    .ok_or(DecodeError::MalformedAttribute)?;
                PrefixDescriptorTlv::OspfRouteType(route_type)
            }
            Some(LsDescriptorType::IpReachability) => {
                let prefix = decode_ipv4_prefix(buf)?;
                if buf.has_remaining() {
                    return Err(DecodeError::AttributeLength(
                        buf.remaining() as u16,
                    ));
                }
                PrefixDescriptorTlv::IpReachability(prefix)
            }
            _ => return Err(DecodeError::UnsupportedBgpLsNlri(tlv_type)),
        };

        Ok(tlv)
    }

    // Compares two descriptors by value.
    //
    // Only IP reachability prefixes have a meaningful order; any other pair
    // of descriptors compares as equal.
    pub fn cmp_value(&self, other: &Self) -> Ordering {
        match (self, other) {
            (
                PrefixDescriptorTlv::IpReachability(a),
                PrefixDescriptorTlv::IpReachability(b),
            ) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

impl Encodable for PrefixDescriptorTlv {
    fn type_code(&self) -> u16 {
        let tlv_type = match self {
            PrefixDescriptorTlv::MultiTopologyId(..) => {
                LsDescriptorType::MultiTopologyId
            }
            PrefixDescriptorTlv::OspfRouteType(..) => {
                LsDescriptorType::OspfRouteType
            }
            PrefixDescriptorTlv::IpReachability(..) => {
                LsDescriptorType::IpReachability
            }
        };
        tlv_type as u16
    }

    fn encode(&self, buf: &mut BytesMut) -> usize {
        let start_pos = tlv_encode_start(buf, self.type_code());
        match self {
            PrefixDescriptorTlv::MultiTopologyId(mt_ids) => {
                encode_mt_ids(buf, mt_ids);
            }
            PrefixDescriptorTlv::OspfRouteType(route_type) => {
                buf.put_u8(*route_type as u8);
            }
            PrefixDescriptorTlv::IpReachability(prefix) => {
                encode_ipv4_prefix(buf, prefix);
            }
        }
        tlv_encode_end(buf, start_pos)
    }
}

// ===== global functions =====

// Reads the next TLV header and returns the TLV type along with its value.
pub(crate) fn tlv_decode_next(buf: &mut Bytes) -> DecodeResult<(u16, Bytes)> {
    let tlv_type = buf.try_get_u16()?;
    let tlv_len = buf.try_get_u16()?;
    let value = buf
        .try_split_to(tlv_len as usize)
        .map_err(|_| DecodeError::AttributeLength(tlv_len))?;
    Ok((tlv_type, value))
}

// Returns the number of bytes used to encode a prefix of the given length.
pub(crate) fn prefix_wire_len(plen: u8) -> usize {
    (plen as usize).div_ceil(8)
}

pub(crate) fn decode_ipv4_prefix(buf: &mut Bytes) -> DecodeResult<Ipv4Network> {
    // Parse prefix length.
    let plen = buf.try_get_u8()?;
    let plen_wire = prefix_wire_len(plen);
    if plen > Ipv4Network::MAX_PREFIXLEN {
        return Err(DecodeError::MalformedAttribute);
    }

    // Parse prefix address (variable length).
    let mut prefix_bytes = [0; Ipv4Addr::LENGTH];
    buf.try_copy_to_slice(&mut prefix_bytes[..plen_wire])?;
    let prefix = Ipv4Addr::from(prefix_bytes);
    let prefix = Ipv4Network::new(prefix, plen)
        .map(|prefix| prefix.apply_mask())
        .map_err(|_| DecodeError::MalformedAttribute)?;

    Ok(prefix)
}

pub(crate) fn encode_ipv4_prefix(buf: &mut BytesMut, prefix: &Ipv4Network) {
    // Encode prefix length.
    let plen = prefix.prefix();
    buf.put_u8(plen);

    // Encode prefix address (variable length), without host bits.
    let prefix_bytes = prefix.apply_mask().ip().octets();
    let plen_wire = prefix_wire_len(plen);
    buf.put(&prefix_bytes[0..plen_wire]);
}

// ===== helper functions =====

fn check_len(buf: &Bytes, len: usize) -> DecodeResult<()> {
    if buf.remaining() != len {
        return Err(DecodeError::AttributeLength(buf.remaining() as u16));
    }
    Ok(())
}

fn decode_mt_ids(buf: &mut Bytes) -> DecodeResult<Vec<u16>> {
    if buf.remaining() % 2 != 0 {
        return Err(DecodeError::AttributeLength(buf.remaining() as u16));
    }
    let mut mt_ids = vec![];
    while buf.remaining() >= 2 {
        mt_ids.push(buf.try_get_u16()?);
    }
    Ok(mt_ids)
}

fn encode_mt_ids(buf: &mut BytesMut, mt_ids: &[u16]) {
    for mt_id in mt_ids {
        buf.put_u16(*mt_id);
    }
}

// ===== unit tests =====
