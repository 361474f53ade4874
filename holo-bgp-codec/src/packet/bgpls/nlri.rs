//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use bytes::{Buf, BufMut, Bytes, BytesMut};
use derive_new::new;
use num_traits::FromPrimitive;
use serde::{Deserialize, Serialize};

use crate::packet::Encodable;
use crate::packet::consts::{LsDescriptorType, LsNlriType, ProtocolId};
use crate::packet::error::{DecodeError, DecodeResult};
use crate::packet::header::{tlv_encode_end, tlv_encode_start};
use crate::packet::tlv::{
    LinkDescriptorTlv, NodeDescriptorTlv, PrefixDescriptorTlv, tlv_decode_next,
};
use crate::packet::vpn::RouteDistinguisher;

//
// BGP-LS NLRI (RFC 7752, Section 3.2).
//
// Encoding format:
//
// 0                   1                   2                   3
// 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |            NLRI Type          |     Total NLRI Length         |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                                                               |
// +                       Route Distinguisher                     +
// |                        (VPN SAFI only)                        |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |  Protocol-ID  |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                           Identifier                          |
// |                            (64 bits)                          |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// //                  Descriptor TLVs (variable)                 //
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum LinkStateNlri {
    Node(NodeNlri),
    Link(LinkNlri),
    Prefix(PrefixNlri),
}

#[derive(Clone, Debug, Eq, Hash, new, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct NodeNlri {
    pub protocol_id: ProtocolId,
    pub identifier: u64,
    #[new(default)]
    pub rd: Option<RouteDistinguisher>,
    pub local_node: Vec<NodeDescriptorTlv>,
}

#[derive(Clone, Debug, Eq, Hash, new, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct LinkNlri {
    pub protocol_id: ProtocolId,
    pub identifier: u64,
    #[new(default)]
    pub rd: Option<RouteDistinguisher>,
    pub local_node: Vec<NodeDescriptorTlv>,
    pub remote_node: Vec<NodeDescriptorTlv>,
    pub link: Vec<LinkDescriptorTlv>,
}

#[derive(Clone, Debug, Eq, Hash, new, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct PrefixNlri {
    pub protocol_id: ProtocolId,
    pub identifier: u64,
    #[new(default)]
    pub rd: Option<RouteDistinguisher>,
    pub local_node: Vec<NodeDescriptorTlv>,
    pub prefix: Vec<PrefixDescriptorTlv>,
}

// Fields shared by all BGP-LS NLRI types.
struct NlriCommon {
    protocol_id: ProtocolId,
    identifier: u64,
    rd: Option<RouteDistinguisher>,
}

// ===== impl LinkStateNlri =====

impl LinkStateNlri {
    // Decodes a single NLRI. When `vpn` is set, the NLRI is prefixed by a
    // Route Distinguisher.
    pub fn decode(buf: &mut Bytes, vpn: bool) -> DecodeResult<Self> {
        let (nlri_type, mut buf) = tlv_decode_next(buf)?;
        let Some(nlri_type) = LsNlriType::from_u16(nlri_type) else {
            return Err(DecodeError::UnsupportedBgpLsNlri(nlri_type));
        };
        let common = NlriCommon::decode(&mut buf, vpn)?;

        let nlri = match nlri_type {
            LsNlriType::Node => {
                let local_node = decode_local_node(&mut buf)?;
                if buf.has_remaining() {
                    let (tlv_type, _) = tlv_decode_next(&mut buf)?;
                    return Err(DecodeError::UnsupportedBgpLsNlri(tlv_type));
                }
                LinkStateNlri::Node(NodeNlri {
                    protocol_id: common.protocol_id,
                    identifier: common.identifier,
                    rd: common.rd,
                    local_node,
                })
            }
            LsNlriType::Link => {
                let local_node = decode_local_node(&mut buf)?;
                let (tlv_type, mut value) = tlv_decode_next(&mut buf)?;
                if tlv_type != LsDescriptorType::RemoteNode as u16 {
                    return Err(DecodeError::MalformedAttribute);
                }
                let remote_node = decode_node_descriptors(&mut value)?;
                let mut link = vec![];
                while buf.has_remaining() {
                    let (tlv_type, mut value) = tlv_decode_next(&mut buf)?;
                    let tlv = LinkDescriptorTlv::decode(tlv_type, &mut value)?;
                    link.push(tlv);
                }
                LinkStateNlri::Link(LinkNlri {
                    protocol_id: common.protocol_id,
                    identifier: common.identifier,
                    rd: common.rd,
                    local_node,
                    remote_node,
                    link,
                })
            }
            LsNlriType::Ipv4Prefix => {
                let local_node = decode_local_node(&mut buf)?;
                let mut prefix = vec![];
                while buf.has_remaining() {
                    let (tlv_type, mut value) = tlv_decode_next(&mut buf)?;
                    let tlv =
                        PrefixDescriptorTlv::decode(tlv_type, &mut value)?;
                    prefix.push(tlv);
                }
                LinkStateNlri::Prefix(PrefixNlri {
                    protocol_id: common.protocol_id,
                    identifier: common.identifier,
                    rd: common.rd,
                    local_node,
                    prefix,
                })
            }
        };

        Ok(nlri)
    }

    pub fn nlri_type(&self) -> LsNlriType {
        match self {
            LinkStateNlri::Node(..) => LsNlriType::Node,
            LinkStateNlri::Link(..) => LsNlriType::Link,
            LinkStateNlri::Prefix(..) => LsNlriType::Ipv4Prefix,
        }
    }

    pub fn protocol_id(&self) -> ProtocolId {
        match self {
            LinkStateNlri::Node(nlri) => nlri.protocol_id,
            LinkStateNlri::Link(nlri) => nlri.protocol_id,
            LinkStateNlri::Prefix(nlri) => nlri.protocol_id,
        }
    }

    pub fn rd(&self) -> Option<&RouteDistinguisher> {
        match self {
            LinkStateNlri::Node(nlri) => nlri.rd.as_ref(),
            LinkStateNlri::Link(nlri) => nlri.rd.as_ref(),
            LinkStateNlri::Prefix(nlri) => nlri.rd.as_ref(),
        }
    }
}

impl Encodable for LinkStateNlri {
    fn type_code(&self) -> u16 {
        self.nlri_type() as u16
    }

    fn encode(&self, buf: &mut BytesMut) -> usize {
        let start_pos = tlv_encode_start(buf, self.type_code());
        match self {
            LinkStateNlri::Node(nlri) => {
                encode_common(buf, nlri.protocol_id, nlri.identifier, &nlri.rd);
                encode_node_descriptors(
                    buf,
                    LsDescriptorType::LocalNode,
                    &nlri.local_node,
                );
            }
            LinkStateNlri::Link(nlri) => {
                encode_common(buf, nlri.protocol_id, nlri.identifier, &nlri.rd);
                encode_node_descriptors(
                    buf,
                    LsDescriptorType::LocalNode,
                    &nlri.local_node,
                );
                encode_node_descriptors(
                    buf,
                    LsDescriptorType::RemoteNode,
                    &nlri.remote_node,
                );
                for tlv in &nlri.link {
                    tlv.encode(buf);
                }
            }
            LinkStateNlri::Prefix(nlri) => {
                encode_common(buf, nlri.protocol_id, nlri.identifier, &nlri.rd);
                encode_node_descriptors(
                    buf,
                    LsDescriptorType::LocalNode,
                    &nlri.local_node,
                );
                for tlv in &nlri.prefix {
                    tlv.encode(buf);
                }
            }
        }
        tlv_encode_end(buf, start_pos)
    }
}

// ===== impl NlriCommon =====

impl NlriCommon {
    fn decode(buf: &mut Bytes, vpn: bool) -> DecodeResult<Self> {
        let rd = if vpn {
            Some(RouteDistinguisher::decode(buf)?)
        } else {
            None
        };
        let protocol_id = buf.try_get_u8()?;
        let protocol_id = ProtocolId::from_u8(protocol_id)
            .ok_or(DecodeError::MalformedAttribute)?;
        let identifier = buf.try_get_u64()?;

        Ok(NlriCommon {
            protocol_id,
            identifier,
            rd,
        })
    }
}

// ===== helper functions =====

fn encode_common(
    buf: &mut BytesMut,
    protocol_id: ProtocolId,
    identifier: u64,
    rd: &Option<RouteDistinguisher>,
) {
    if let Some(rd) = rd {
        rd.encode(buf);
    }
    buf.put_u8(protocol_id as u8);
    buf.put_u64(identifier);
}

// The Local Node Descriptors TLV must come first.
fn decode_local_node(buf: &mut Bytes) -> DecodeResult<Vec<NodeDescriptorTlv>> {
    let (tlv_type, mut value) = tlv_decode_next(buf)?;
    if tlv_type != LsDescriptorType::LocalNode as u16 {
        return Err(DecodeError::MalformedAttribute);
    }
    decode_node_descriptors(&mut value)
}

fn decode_node_descriptors(
    buf: &mut Bytes,
) -> DecodeResult<Vec<NodeDescriptorTlv>> {
    let mut tlvs = vec![];
    while buf.has_remaining() {
        let (tlv_type, mut value) = tlv_decode_next(buf)?;
        tlvs.push(NodeDescriptorTlv::decode(tlv_type, &mut value)?);
    }
    Ok(tlvs)
}

fn encode_node_descriptors(
    buf: &mut BytesMut,
    tlv_type: LsDescriptorType,
    tlvs: &[NodeDescriptorTlv],
) {
    let start_pos = tlv_encode_start(buf, tlv_type as u16);
    for tlv in tlvs {
        tlv.encode(buf);
    }
    tlv_encode_end(buf, start_pos);
}
