//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use bytes::{Buf, BufMut, Bytes, BytesMut};
use holo_utils::bytes::{BytesExt, BytesMutExt};
use holo_utils::ip::{Ipv4AddrExt, Ipv6AddrExt};
use num_traits::FromPrimitive;
use serde::{Deserialize, Serialize};

use crate::packet::Encodable;
use crate::packet::consts::{
    LinkProtectionFlags, LsAttrType, MplsProtocolMask, NodeFlags,
};
use crate::packet::error::{DecodeError, DecodeResult};
use crate::packet::header::{tlv_encode_end, tlv_encode_start};
use crate::packet::tlv::tlv_decode_next;

// Number of priority levels in the Unreserved Bandwidth TLV.
pub const UNRESERVED_BW_LEVELS: usize = 8;

// BGP-LS Attribute (RFC 7752, Section 3.3).
//
// Sub-TLVs are kept in wire order. Duplicates are legal and preserved.
#[derive(Clone, Debug, Default, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct LinkStateAttrs {
    pub attrs: Vec<LinkStateAttr>,
}

// BGP-LS Node, Link and Prefix Attribute TLVs.
#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum LinkStateAttr {
    // Node attributes.
    MultiTopologyId(Vec<u16>),
    NodeFlagBits(NodeFlags),
    OpaqueNode(Bytes),
    NodeName(Bytes),
    IsisAreaId(Bytes),
    LocalRouterIdV4(Ipv4Addr),
    LocalRouterIdV6(Ipv6Addr),
    // Link attributes.
    RemoteRouterIdV4(Ipv4Addr),
    RemoteRouterIdV6(Ipv6Addr),
    AdminGroup(u32),
    MaxLinkBandwidth(f32),
    MaxReservableBandwidth(f32),
    UnreservedBandwidth([f32; UNRESERVED_BW_LEVELS]),
    TeDefaultMetric(u32),
    LinkProtectionType(LinkProtectionFlags),
    MplsProtocolMask(MplsProtocolMask),
    IgpMetric(IgpMetric),
    Srlg(Vec<u32>),
    OpaqueLink(Bytes),
    LinkName(Bytes),
    // Prefix attributes.
    IgpFlags(u8),
    RouteTag(Vec<u32>),
    ExtendedTag(Vec<u64>),
    PrefixMetric(u32),
    OspfForwardingAddr(IpAddr),
    OpaquePrefix(Bytes),
}

// IGP metric, encoded in 1, 2 or 3 octets depending on the IGP.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct IgpMetric {
    pub value: u32,
    pub width: u8,
}

// ===== impl LinkStateAttrs =====

impl LinkStateAttrs {
    pub(crate) fn decode(buf: &mut Bytes) -> DecodeResult<Self> {
        let mut attrs = vec![];
        while buf.has_remaining() {
            let (tlv_type, mut value) = tlv_decode_next(buf)?;
            let attr = LinkStateAttr::decode(tlv_type, &mut value)?;
            attrs.push(attr);
        }

        Ok(LinkStateAttrs { attrs })
    }

    pub(crate) fn encode_value(&self, buf: &mut BytesMut) {
        for attr in &self.attrs {
            attr.encode(buf);
        }
    }
}

// ===== impl LinkStateAttr =====

impl LinkStateAttr {
    fn decode(tlv_type: u16, buf: &mut Bytes) -> DecodeResult<Self> {
        let Some(attr_type) = LsAttrType::from_u16(tlv_type) else {
            return Err(DecodeError::UnsupportedBgpLsAttribute(tlv_type));
        };

        let attr = match attr_type {
            LsAttrType::MultiTopologyId => {
                LinkStateAttr::MultiTopologyId(decode_list(buf, 2, |buf| {
                    buf.try_get_u16()
                })?)
            }
            LsAttrType::NodeFlagBits => {
                check_len(buf, 1)?;
                let flags = buf.try_get_u8()?;
                LinkStateAttr::NodeFlagBits(NodeFlags::from_bits_retain(flags))
            }
            LsAttrType::OpaqueNode => LinkStateAttr::OpaqueNode(take_all(buf)),
            LsAttrType::NodeName => LinkStateAttr::NodeName(take_all(buf)),
            LsAttrType::IsisAreaId => LinkStateAttr::IsisAreaId(take_all(buf)),
            LsAttrType::LocalRouterIdV4 => {
                check_len(buf, Ipv4Addr::LENGTH)?;
                LinkStateAttr::LocalRouterIdV4(buf.try_get_ipv4()?)
            }
            LsAttrType::LocalRouterIdV6 => {
                check_len(buf, Ipv6Addr::LENGTH)?;
                LinkStateAttr::LocalRouterIdV6(buf.try_get_ipv6()?)
            }
            LsAttrType::RemoteRouterIdV4 => {
                check_len(buf, Ipv4Addr::LENGTH)?;
                LinkStateAttr::RemoteRouterIdV4(buf.try_get_ipv4()?)
            }
            LsAttrType::RemoteRouterIdV6 => {
                check_len(buf, Ipv6Addr::LENGTH)?;
                LinkStateAttr::RemoteRouterIdV6(buf.try_get_ipv6()?)
            }
            LsAttrType::AdminGroup => {
                check_len(buf, 4)?;
                LinkStateAttr::AdminGroup(buf.try_get_u32()?)
            }
            LsAttrType::MaxLinkBandwidth => {
                check_len(buf, 4)?;
                LinkStateAttr::MaxLinkBandwidth(buf.try_get_f32()?)
            }
            LsAttrType::MaxReservableBandwidth => {
                check_len(buf, 4)?;
                LinkStateAttr::MaxReservableBandwidth(buf.try_get_f32()?)
            }
            LsAttrType::UnreservedBandwidth => {
                check_len(buf, UNRESERVED_BW_LEVELS * 4)?;
                let mut bandwidth = [0.0; UNRESERVED_BW_LEVELS];
                for level in &mut bandwidth {
                    *level = buf.try_get_f32()?;
                }
                LinkStateAttr::UnreservedBandwidth(bandwidth)
            }
            LsAttrType::TeDefaultMetric => {
                check_len(buf, 4)?;
                LinkStateAttr::TeDefaultMetric(buf.try_get_u32()?)
            }
            LsAttrType::LinkProtectionType => {
                check_len(buf, 2)?;
                let flags = buf.try_get_u8()?;
                let _reserved = buf.try_get_u8()?;
                LinkStateAttr::LinkProtectionType(
                    LinkProtectionFlags::from_bits_retain(flags),
                )
            }
            LsAttrType::MplsProtocolMask => {
                check_len(buf, 1)?;
                let mask = buf.try_get_u8()?;
                LinkStateAttr::MplsProtocolMask(
                    MplsProtocolMask::from_bits_retain(mask),
                )
            }
            LsAttrType::IgpMetric => {
                LinkStateAttr::IgpMetric(IgpMetric::decode(buf)?)
            }
            LsAttrType::Srlg => {
                LinkStateAttr::Srlg(decode_list(buf, 4, |buf| {
                    buf.try_get_u32()
                })?)
            }
            LsAttrType::OpaqueLink => LinkStateAttr::OpaqueLink(take_all(buf)),
            LsAttrType::LinkName => LinkStateAttr::LinkName(take_all(buf)),
            LsAttrType::IgpFlags => {
                check_len(buf, 1)?;
                LinkStateAttr::IgpFlags(buf.try_get_u8()?)
            }
            LsAttrType::RouteTag => {
                LinkStateAttr::RouteTag(decode_list(buf, 4, |buf| {
                    buf.try_get_u32()
                })?)
            }
            LsAttrType::ExtendedTag => {
                LinkStateAttr::ExtendedTag(decode_list(buf, 8, |buf| {
                    buf.try_get_u64()
                })?)
            }
            LsAttrType::PrefixMetric => {
                check_len(buf, 4)?;
                LinkStateAttr::PrefixMetric(buf.try_get_u32()?)
            }
            LsAttrType::OspfForwardingAddr => {
                let addr = match buf.remaining() {
                    4 => IpAddr::V4(buf.try_get_ipv4()?),
                    16 => IpAddr::V6(buf.try_get_ipv6()?),
                    len => {
                        return Err(DecodeError::AttributeLength(len as u16));
                    }
                };
                LinkStateAttr::OspfForwardingAddr(addr)
            }
            LsAttrType::OpaquePrefix => {
                LinkStateAttr::OpaquePrefix(take_all(buf))
            }
        };

        Ok(attr)
    }

    pub fn attr_type(&self) -> LsAttrType {
        match self {
            LinkStateAttr::MultiTopologyId(..) => LsAttrType::MultiTopologyId,
            LinkStateAttr::NodeFlagBits(..) => LsAttrType::NodeFlagBits,
            LinkStateAttr::OpaqueNode(..) => LsAttrType::OpaqueNode,
            LinkStateAttr::NodeName(..) => LsAttrType::NodeName,
            LinkStateAttr::IsisAreaId(..) => LsAttrType::IsisAreaId,
            LinkStateAttr::LocalRouterIdV4(..) => LsAttrType::LocalRouterIdV4,
            LinkStateAttr::LocalRouterIdV6(..) => LsAttrType::LocalRouterIdV6,
            LinkStateAttr::RemoteRouterIdV4(..) => {
                LsAttrType::RemoteRouterIdV4
            }
            LinkStateAttr::RemoteRouterIdV6(..) => {
                LsAttrType::RemoteRouterIdV6
            }
            LinkStateAttr::AdminGroup(..) => LsAttrType::AdminGroup,
            LinkStateAttr::MaxLinkBandwidth(..) => {
                LsAttrType::MaxLinkBandwidth
            }
            LinkStateAttr::MaxReservableBandwidth(..) => {
                LsAttrType::MaxReservableBandwidth
            }
            LinkStateAttr::UnreservedBandwidth(..) => {
                LsAttrType::UnreservedBandwidth
            }
            LinkStateAttr::TeDefaultMetric(..) => LsAttrType::TeDefaultMetric,
            LinkStateAttr::LinkProtectionType(..) => {
                LsAttrType::LinkProtectionType
            }
            LinkStateAttr::MplsProtocolMask(..) => {
                LsAttrType::MplsProtocolMask
            }
            LinkStateAttr::IgpMetric(..) => LsAttrType::IgpMetric,
            LinkStateAttr::Srlg(..) => LsAttrType::Srlg,
            LinkStateAttr::OpaqueLink(..) => LsAttrType::OpaqueLink,
            LinkStateAttr::LinkName(..) => LsAttrType::LinkName,
            LinkStateAttr::IgpFlags(..) => LsAttrType::IgpFlags,
            LinkStateAttr::RouteTag(..) => LsAttrType::RouteTag,
            LinkStateAttr::ExtendedTag(..) => LsAttrType::ExtendedTag,
            LinkStateAttr::PrefixMetric(..) => LsAttrType::PrefixMetric,
            LinkStateAttr::OspfForwardingAddr(..) => {
                LsAttrType::OspfForwardingAddr
            }
            LinkStateAttr::OpaquePrefix(..) => LsAttrType::OpaquePrefix,
        }
    }
}

impl Encodable for LinkStateAttr {
    fn type_code(&self) -> u16 {
        self.attr_type() as u16
    }

    fn encode(&self, buf: &mut BytesMut) -> usize {
        let start_pos = tlv_encode_start(buf, self.type_code());
        match self {
            LinkStateAttr::MultiTopologyId(mt_ids) => {
                for mt_id in mt_ids {
                    buf.put_u16(*mt_id);
                }
            }
            LinkStateAttr::NodeFlagBits(flags) => buf.put_u8(flags.bits()),
            LinkStateAttr::OpaqueNode(value)
            | LinkStateAttr::NodeName(value)
            | LinkStateAttr::IsisAreaId(value)
            | LinkStateAttr::OpaqueLink(value)
            | LinkStateAttr::LinkName(value)
            | LinkStateAttr::OpaquePrefix(value) => buf.put_slice(value),
            LinkStateAttr::LocalRouterIdV4(addr)
            | LinkStateAttr::RemoteRouterIdV4(addr) => buf.put_ipv4(addr),
            LinkStateAttr::LocalRouterIdV6(addr)
            | LinkStateAttr::RemoteRouterIdV6(addr) => buf.put_ipv6(addr),
            LinkStateAttr::AdminGroup(value)
            | LinkStateAttr::TeDefaultMetric(value)
            | LinkStateAttr::PrefixMetric(value) => buf.put_u32(*value),
            LinkStateAttr::MaxLinkBandwidth(bandwidth)
            | LinkStateAttr::MaxReservableBandwidth(bandwidth) => {
                buf.put_f32(*bandwidth)
            }
            LinkStateAttr::UnreservedBandwidth(bandwidth) => {
                for level in bandwidth {
                    buf.put_f32(*level);
                }
            }
            LinkStateAttr::LinkProtectionType(flags) => {
                buf.put_u8(flags.bits());
                buf.put_u8(0);
            }
            LinkStateAttr::MplsProtocolMask(mask) => buf.put_u8(mask.bits()),
            LinkStateAttr::IgpMetric(metric) => metric.encode(buf),
            LinkStateAttr::Srlg(values) | LinkStateAttr::RouteTag(values) => {
                for value in values {
                    buf.put_u32(*value);
                }
            }
            LinkStateAttr::IgpFlags(flags) => buf.put_u8(*flags),
            LinkStateAttr::ExtendedTag(tags) => {
                for tag in tags {
                    buf.put_u64(*tag);
                }
            }
            LinkStateAttr::OspfForwardingAddr(addr) => buf.put_ip(addr),
        }
        tlv_encode_end(buf, start_pos)
    }
}

// ===== impl IgpMetric =====

impl IgpMetric {
    pub const MAX_WIDTH: u8 = 3;

    // Creates a new IGP metric using the smallest width that fits the value.
    pub fn new(value: u32) -> Self {
        let width = match value {
            0..=0xff => 1,
            0x100..=0xffff => 2,
            _ => Self::MAX_WIDTH,
        };
        IgpMetric {
            value: value & 0x00ff_ffff,
            width,
        }
    }

    fn decode(buf: &mut Bytes) -> DecodeResult<Self> {
        let width = buf.remaining();
        let value = match width {
            1 => buf.try_get_u8()? as u32,
            2 => buf.try_get_u16()? as u32,
            3 => buf.try_get_u24()?,
            _ => return Err(DecodeError::AttributeLength(width as u16)),
        };

        Ok(IgpMetric {
            value,
            width: width as u8,
        })
    }

    fn encode(&self, buf: &mut BytesMut) {
        match self.width {
            1 => buf.put_u8(self.value as u8),
            2 => buf.put_u16(self.value as u16),
            _ => buf.put_u24(self.value),
        }
    }
}

// ===== helper functions =====

fn check_len(buf: &Bytes, len: usize) -> DecodeResult<()> {
    if buf.remaining() != len {
        return Err(DecodeError::AttributeLength(buf.remaining() as u16));
    }
    Ok(())
}

fn take_all(buf: &mut Bytes) -> Bytes {
    buf.split_to(buf.remaining())
}

// Decodes a list of fixed-size elements that must fill the whole TLV.
fn decode_list<T, F>(
    buf: &mut Bytes,
    elem_len: usize,
    mut decode_fn: F,
) -> DecodeResult<Vec<T>>
where
    F: FnMut(&mut Bytes) -> Result<T, bytes::TryGetError>,
{
    if buf.remaining() % elem_len != 0 {
        return Err(DecodeError::AttributeLength(buf.remaining() as u16));
    }

    let mut list = Vec::with_capacity(buf.remaining() / elem_len);
    while buf.remaining() >= elem_len {
        list.push(decode_fn(buf)?);
    }
    Ok(list)
}

// ===== unit tests =====
