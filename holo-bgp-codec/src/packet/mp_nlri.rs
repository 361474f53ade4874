//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::IpAddr;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use holo_utils::bytes::{BytesExt, BytesMutExt};
use holo_utils::ip::IpAddrExt;
use num_traits::FromPrimitive;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::packet::Encodable;
use crate::packet::bgpls::LinkStateNlri;
use crate::packet::consts::{Afi, Safi};
use crate::packet::error::{DecodeError, DecodeResult};
use crate::packet::flowspec::{self, FlowSpecComponent};
use crate::packet::vpn::RouteDistinguisher;

// Multiprotocol Reachable NLRI (RFC 4760, Section 3).
#[skip_serializing_none]
#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct MpReachNlri {
    pub afi: u16,
    pub safi: u8,
    pub nexthop: Option<IpAddr>,
    pub nlri: MpNlri,
}

// Multiprotocol Unreachable NLRI (RFC 4760, Section 4).
#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct MpUnreachNlri {
    pub afi: u16,
    pub safi: u8,
    pub nlri: MpNlri,
}

// NLRI carried by MP_REACH_NLRI and MP_UNREACH_NLRI. A single attribute
// never mixes address families.
#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum MpNlri {
    LinkState(Vec<LinkStateNlri>),
    FlowSpec {
        rd: Option<RouteDistinguisher>,
        components: Vec<FlowSpecComponent>,
    },
}

// Supported address families.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Family {
    LinkState { vpn: bool },
    FlowSpec { vpn: bool },
}

// ===== impl MpReachNlri =====

impl MpReachNlri {
    pub const MIN_LEN: usize = 5;

    pub fn link_state(
        vpn: bool,
        nexthop: Option<IpAddr>,
        nlri: Vec<LinkStateNlri>,
    ) -> Self {
        let safi = if vpn { Safi::BgpLsVpn } else { Safi::BgpLs };
        MpReachNlri {
            afi: Afi::BgpLs as u16,
            safi: safi as u8,
            nexthop,
            nlri: MpNlri::LinkState(nlri),
        }
    }

    pub fn flowspec(
        rd: Option<RouteDistinguisher>,
        nexthop: Option<IpAddr>,
        components: Vec<FlowSpecComponent>,
    ) -> Self {
        let safi = if rd.is_some() {
            Safi::FlowSpecVpn
        } else {
            Safi::FlowSpec
        };
        MpReachNlri {
            afi: Afi::Ipv4 as u16,
            safi: safi as u8,
            nexthop,
            nlri: MpNlri::FlowSpec { rd, components },
        }
    }

    pub(crate) fn decode(buf: &mut Bytes) -> DecodeResult<Self> {
        if buf.remaining() < Self::MIN_LEN {
            return Err(DecodeError::AttributeLength(buf.remaining() as u16));
        }

        // Parse AFI/SAFI.
        let afi = buf.try_get_u16()?;
        let safi = buf.try_get_u8()?;
        let family = Family::new(afi, safi)?;

        // Parse nexthop.
        let nexthop_len = buf.try_get_u8()?;
        let nexthop = match nexthop_len {
            0 => None,
            4 => Some(IpAddr::V4(buf.try_get_ipv4()?)),
            16 => Some(IpAddr::V6(buf.try_get_ipv6()?)),
            _ => return Err(DecodeError::AttributeLength(nexthop_len as u16)),
        };
        let _reserved = buf.try_get_u8()?;

        // Parse NLRI.
        let nlri = MpNlri::decode(buf, family)?;

        Ok(MpReachNlri {
            afi,
            safi,
            nexthop,
            nlri,
        })
    }

    pub(crate) fn encode_value(&self, buf: &mut BytesMut) {
        buf.put_u16(self.afi);
        buf.put_u8(self.safi);
        match &self.nexthop {
            Some(nexthop) => {
                buf.put_u8(nexthop.length() as u8);
                buf.put_ip(nexthop);
            }
            None => buf.put_u8(0),
        }
        buf.put_u8(0);
        self.nlri.encode(buf);
    }
}

// ===== impl MpUnreachNlri =====

impl MpUnreachNlri {
    pub const MIN_LEN: usize = 3;

    pub fn link_state(vpn: bool, nlri: Vec<LinkStateNlri>) -> Self {
        let safi = if vpn { Safi::BgpLsVpn } else { Safi::BgpLs };
        MpUnreachNlri {
            afi: Afi::BgpLs as u16,
            safi: safi as u8,
            nlri: MpNlri::LinkState(nlri),
        }
    }

    pub fn flowspec(
        rd: Option<RouteDistinguisher>,
        components: Vec<FlowSpecComponent>,
    ) -> Self {
        let safi = if rd.is_some() {
            Safi::FlowSpecVpn
        } else {
            Safi::FlowSpec
        };
        MpUnreachNlri {
            afi: Afi::Ipv4 as u16,
            safi: safi as u8,
            nlri: MpNlri::FlowSpec { rd, components },
        }
    }

    pub(crate) fn decode(buf: &mut Bytes) -> DecodeResult<Self> {
        if buf.remaining() < Self::MIN_LEN {
            return Err(DecodeError::AttributeLength(buf.remaining() as u16));
        }

        // Parse AFI/SAFI.
        let afi = buf.try_get_u16()?;
        let safi = buf.try_get_u8()?;
        let family = Family::new(afi, safi)?;

        // Parse NLRI.
        let nlri = MpNlri::decode(buf, family)?;

        Ok(MpUnreachNlri { afi, safi, nlri })
    }

    pub(crate) fn encode_value(&self, buf: &mut BytesMut) {
        buf.put_u16(self.afi);
        buf.put_u8(self.safi);
        self.nlri.encode(buf);
    }
}

// ===== impl MpNlri =====

impl MpNlri {
    fn decode(buf: &mut Bytes, family: Family) -> DecodeResult<Self> {
        let nlri = match family {
            Family::LinkState { vpn } => {
                let mut nlri = vec![];
                while buf.has_remaining() {
                    nlri.push(LinkStateNlri::decode(buf, vpn)?);
                }
                MpNlri::LinkState(nlri)
            }
            Family::FlowSpec { vpn } => {
                let rd = if vpn {
                    Some(RouteDistinguisher::decode(buf)?)
                } else {
                    None
                };
                let mut components = vec![];
                while buf.has_remaining() {
                    flowspec::decode_nlri(buf, &mut components)?;
                }
                MpNlri::FlowSpec { rd, components }
            }
        };

        Ok(nlri)
    }

    fn encode(&self, buf: &mut BytesMut) {
        match self {
            MpNlri::LinkState(nlri) => {
                for nlri in nlri {
                    nlri.encode(buf);
                }
            }
            MpNlri::FlowSpec { rd, components } => {
                if let Some(rd) = rd {
                    rd.encode(buf);
                }
                flowspec::encode_nlri(buf, components);
            }
        }
    }
}

// ===== impl Family =====

impl Family {
    fn new(afi: u16, safi: u8) -> DecodeResult<Self> {
        let family = match (Afi::from_u16(afi), Safi::from_u8(safi)) {
            (Some(Afi::BgpLs), Some(Safi::BgpLs)) => {
                Family::LinkState { vpn: false }
            }
            (Some(Afi::BgpLs), Some(Safi::BgpLsVpn)) => {
                Family::LinkState { vpn: true }
            }
            (Some(Afi::Ipv4), Some(Safi::FlowSpec)) => {
                Family::FlowSpec { vpn: false }
            }
            (Some(Afi::Ipv4), Some(Safi::FlowSpecVpn)) => {
                Family::FlowSpec { vpn: true }
            }
            _ => return Err(DecodeError::UnsupportedAddressFamily(afi, safi)),
        };

        Ok(family)
    }
}

// ===== unit tests =====
