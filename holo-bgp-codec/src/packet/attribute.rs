//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::HashSet;
use std::net::Ipv4Addr;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use derive_new::new;
use enum_as_inner::EnumAsInner;
use holo_utils::bytes::{BytesExt, BytesMutExt, TLS_BUF};
use holo_utils::ip::Ipv4AddrExt;
use num_traits::FromPrimitive;
use serde::{Deserialize, Serialize};

use crate::debug::Debug;
use crate::packet::Encodable;
use crate::packet::bgpls::LinkStateAttrs;
use crate::packet::community::ExtCommunities;
use crate::packet::consts::{AsPathSegmentType, AttrFlags, AttrType, Origin};
use crate::packet::error::{AttrError, DecodeError, DecodeResult};
use crate::packet::header::{AttrHeader, attr_encode_end, attr_encode_start};
use crate::packet::mp_nlri::{MpReachNlri, MpUnreachNlri};
use crate::packet::wide_community::WideCommunity;

// Maximum number of ASNs in a single AS_PATH segment.
pub const AS_PATH_SEGMENT_MAX_LEN: usize = 255;

// BGP path attribute.
#[derive(Clone, Debug, EnumAsInner, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum PathAttr {
    Origin(Origin),
    AsPath(AsPath),
    As4Path(AsPath),
    Nexthop(Ipv4Addr),
    Med(u32),
    LocalPref(u32),
    MpReach(MpReachNlri),
    MpUnreach(MpUnreachNlri),
    ExtCommunities(ExtCommunities),
    LinkState(LinkStateAttrs),
    WideCommunity(WideCommunity),
    Unknown(UnknownAttr),
}

#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct AsPath {
    pub segments: Vec<AsPathSegment>,
}

#[derive(Clone, Debug, Eq, Hash, new, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct AsPathSegment {
    pub seg_type: AsPathSegmentType,
    pub members: Vec<u32>,
}

// Unrecognized optional attribute, kept for propagation.
#[derive(Clone, Debug, Eq, Hash, new, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct UnknownAttr {
    pub attr_type: u8,
    pub flags: AttrFlags,
    pub value: Bytes,
}

// ===== impl PathAttr =====

impl PathAttr {
    // Decodes a single path attribute.
    //
    // Returns `Ok(None)` when the attribute is an unrecognized optional
    // non-transitive attribute, which must be quietly ignored.
    pub fn decode(buf: &mut Bytes) -> Result<Option<Self>, AttrError> {
        let attr_start = buf.clone();

        // Parse attribute header.
        let hdr = AttrHeader::decode(buf)
            .map_err(|error| AttrError::new(None, error, attr_start.clone()))?;
        let attr_len = hdr.wire_len() + hdr.length as usize;

        // The declared length can't exceed the remaining data.
        let Ok(mut value) = buf.try_split_to(hdr.length as usize) else {
            return Err(AttrError::new(
                Some(hdr.type_code),
                DecodeError::AttributeLength(hdr.length),
                attr_start,
            ));
        };

        Self::decode_value(&hdr, &mut value).map_err(|error| {
            let error = AttrError::new(
                Some(hdr.type_code),
                error,
                attr_start.slice(..attr_len),
            );
            Debug::AttrError(&error).log();
            error
        })
    }

    fn decode_value(
        hdr: &AttrHeader,
        buf: &mut Bytes,
    ) -> DecodeResult<Option<Self>> {
        let attr = match AttrType::from_u8(hdr.type_code) {
            Some(AttrType::Origin) => {
                PathAttr::Origin(origin::decode(hdr, buf)?)
            }
            Some(AttrType::AsPath) => {
                PathAttr::AsPath(AsPath::decode(hdr, buf, false)?)
            }
            Some(AttrType::Nexthop) => {
                PathAttr::Nexthop(nexthop::decode(hdr, buf)?)
            }
            Some(AttrType::Med) => PathAttr::Med(med::decode(hdr, buf)?),
            Some(AttrType::LocalPref) => {
                PathAttr::LocalPref(local_pref::decode(hdr, buf)?)
            }
            Some(AttrType::MpReachNlri) => {
                check_optional_flags(hdr)?;
                PathAttr::MpReach(MpReachNlri::decode(buf)?)
            }
            Some(AttrType::MpUnreachNlri) => {
                check_optional_flags(hdr)?;
                PathAttr::MpUnreach(MpUnreachNlri::decode(buf)?)
            }
            Some(AttrType::ExtCommunities) => {
                check_optional_flags(hdr)?;
                PathAttr::ExtCommunities(ExtCommunities::decode(buf)?)
            }
            Some(AttrType::As4Path) => {
                PathAttr::As4Path(AsPath::decode(hdr, buf, true)?)
            }
            Some(AttrType::LinkState) => {
                check_optional_flags(hdr)?;
                PathAttr::LinkState(LinkStateAttrs::decode(buf)?)
            }
            Some(AttrType::WideCommunity) => {
                check_optional_flags(hdr)?;
                PathAttr::WideCommunity(WideCommunity::decode(buf)?)
            }
            None => {
                // RFC 4271 - Section 6.3:
                // "If any of the well-known mandatory attributes are not
                // recognized, then the Error Subcode MUST be set to
                // Unrecognized Well-known Attribute".
                if !hdr.optional {
                    return Err(DecodeError::UnrecognizedWellKnownAttribute(
                        hdr.type_code,
                    ));
                }

                // RFC 4271 - Section 9:
                // "If an optional non-transitive attribute is unrecognized,
                // it is quietly ignored".
                if !hdr.transitive {
                    Debug::AttrUnknownIgnore(hdr.type_code).log();
                    return Ok(None);
                }

                // RFC 4271 - Section 9:
                // "If an optional transitive attribute is unrecognized, the
                // Partial bit in the attribute flags octet is set to 1, and
                // the attribute is retained for propagation to other BGP
                // speakers".
                let flags = (hdr.flags() | AttrFlags::PARTIAL)
                    - AttrFlags::EXTENDED;
                let attr = UnknownAttr::new(
                    hdr.type_code,
                    flags,
                    buf.split_to(buf.remaining()),
                );
                Debug::AttrUnknownKeep(&attr).log();
                PathAttr::Unknown(attr)
            }
        };

        Ok(Some(attr))
    }

    // Decodes a complete path attribute list.
    pub fn decode_list(buf: &mut Bytes) -> Result<Vec<Self>, AttrError> {
        let mut attrs = vec![];
        let mut attr_list = HashSet::new();

        while buf.has_remaining() {
            let attr_start = buf.clone();
            let Some(attr) = Self::decode(buf)? else {
                continue;
            };

            // RFC 7606 - Section 3.g:
            // "If the MP_REACH_NLRI attribute or the MP_UNREACH_NLRI attribute
            // appears more than once in the UPDATE message, then a NOTIFICATION
            // message MUST be sent with the Error Subcode "Malformed Attribute
            // List". If any other attribute (whether recognized or
            // unrecognized) appears more than once in an UPDATE message, then
            // all the occurrences of the attribute other than the first one
            // SHALL be discarded and the UPDATE message will continue to be
            // processed".
            let attr_type = attr.type_code() as u8;
            if !attr_list.insert(attr_type) {
                if matches!(
                    attr,
                    PathAttr::MpReach(..) | PathAttr::MpUnreach(..)
                ) {
                    let attr_len = attr_start.len() - buf.len();
                    return Err(AttrError::new(
                        Some(attr_type),
                        DecodeError::MalformedAttributeList,
                        attr_start.slice(..attr_len),
                    ));
                }
                Debug::AttrDuplicate(attr_type).log();
                continue;
            }

            attrs.push(attr);
        }

        Ok(attrs)
    }

    // Encodes a path attribute list, in ascending order of attribute type.
    pub fn encode_list(attrs: &[Self], buf: &mut BytesMut) -> usize {
        let mut attrs = attrs.iter().collect::<Vec<_>>();
        attrs.sort_by_key(|attr| attr.type_code());
        attrs.into_iter().map(|attr| attr.encode(buf)).sum()
    }

    // Encodes a path attribute list into a new buffer.
    pub fn encode_list_bytes(attrs: &[Self]) -> Bytes {
        TLS_BUF.with(|buf| {
            let mut buf = buf.borrow_mut();
            buf.clear();
            Self::encode_list(attrs, &mut buf);
            buf.clone().freeze()
        })
    }

    // Returns the attribute flags used when encoding this attribute.
    pub fn flags(&self) -> AttrFlags {
        match self {
            PathAttr::Origin(..)
            | PathAttr::AsPath(..)
            | PathAttr::Nexthop(..)
            | PathAttr::LocalPref(..) => AttrFlags::TRANSITIVE,
            PathAttr::Med(..)
            | PathAttr::MpReach(..)
            | PathAttr::MpUnreach(..)
            | PathAttr::LinkState(..) => AttrFlags::OPTIONAL,
            PathAttr::As4Path(..)
            | PathAttr::ExtCommunities(..)
            | PathAttr::WideCommunity(..) => {
                AttrFlags::OPTIONAL | AttrFlags::TRANSITIVE
            }
            PathAttr::Unknown(attr) => attr.flags,
        }
    }
}

impl Encodable for PathAttr {
    fn type_code(&self) -> u16 {
        let attr_type = match self {
            PathAttr::Origin(..) => AttrType::Origin,
            PathAttr::AsPath(..) => AttrType::AsPath,
            PathAttr::As4Path(..) => AttrType::As4Path,
            PathAttr::Nexthop(..) => AttrType::Nexthop,
            PathAttr::Med(..) => AttrType::Med,
            PathAttr::LocalPref(..) => AttrType::LocalPref,
            PathAttr::MpReach(..) => AttrType::MpReachNlri,
            PathAttr::MpUnreach(..) => AttrType::MpUnreachNlri,
            PathAttr::ExtCommunities(..) => AttrType::ExtCommunities,
            PathAttr::LinkState(..) => AttrType::LinkState,
            PathAttr::WideCommunity(..) => AttrType::WideCommunity,
            PathAttr::Unknown(attr) => return attr.attr_type as u16,
        };
        attr_type as u16
    }

    fn encode(&self, buf: &mut BytesMut) -> usize {
        let start_pos =
            attr_encode_start(buf, self.flags(), self.type_code() as u8);

        // Encode attribute data.
        match self {
            PathAttr::Origin(value) => origin::encode(*value, buf),
            PathAttr::AsPath(value) => value.encode(buf, false),
            PathAttr::As4Path(value) => value.encode(buf, true),
            PathAttr::Nexthop(value) => nexthop::encode(value, buf),
            PathAttr::Med(value) => med::encode(*value, buf),
            PathAttr::LocalPref(value) => local_pref::encode(*value, buf),
            PathAttr::MpReach(value) => value.encode_value(buf),
            PathAttr::MpUnreach(value) => value.encode_value(buf),
            PathAttr::ExtCommunities(value) => value.encode_value(buf),
            PathAttr::LinkState(value) => value.encode_value(buf),
            PathAttr::WideCommunity(value) => value.encode_value(buf),
            PathAttr::Unknown(attr) => buf.put_slice(&attr.value),
        }

        attr_encode_end(buf, start_pos)
    }
}

// ===== ORIGIN attribute =====

mod origin {
    use super::*;
    const LEN: usize = 1;

    pub(super) fn encode(origin: Origin, buf: &mut BytesMut) {
        buf.put_u8(origin as u8);
    }

    pub(super) fn decode(
        hdr: &AttrHeader,
        buf: &mut Bytes,
    ) -> DecodeResult<Origin> {
        if buf.remaining() != LEN {
            return Err(DecodeError::AttributeLength(hdr.length));
        }
        if hdr.flags_are(true, false, true) {
            return Err(DecodeError::AttributeFlags(hdr.flags().bits()));
        }

        let value = buf.try_get_u8()?;
        Origin::from_u8(value).ok_or(DecodeError::InvalidOrigin(value))
    }
}

// ===== NEXT_HOP attribute =====

mod nexthop {
    use super::*;

    pub(super) fn encode(nexthop: &Ipv4Addr, buf: &mut BytesMut) {
        buf.put_ipv4(nexthop);
    }

    pub(super) fn decode(
        hdr: &AttrHeader,
        buf: &mut Bytes,
    ) -> DecodeResult<Ipv4Addr> {
        if buf.remaining() != Ipv4Addr::LENGTH {
            return Err(DecodeError::AttributeLength(hdr.length));
        }
        if hdr.flags_are(true, false, true) {
            return Err(DecodeError::AttributeFlags(hdr.flags().bits()));
        }

        let value = buf.try_get_ipv4()?;
        if value.is_multicast() {
            return Err(DecodeError::InvalidNexthop(value));
        }

        Ok(value)
    }
}

// ===== MULTI_EXIT_DISC attribute =====

mod med {
    use super::*;
    const LEN: usize = 4;

    pub(super) fn encode(metric: u32, buf: &mut BytesMut) {
        buf.put_u32(metric);
    }

    pub(super) fn decode(
        hdr: &AttrHeader,
        buf: &mut Bytes,
    ) -> DecodeResult<u32> {
        if buf.remaining() != LEN {
            return Err(DecodeError::AttributeLength(hdr.length));
        }
        if hdr.flags_are(false, true, true) {
            return Err(DecodeError::AttributeFlags(hdr.flags().bits()));
        }

        let value = buf.try_get_u32()?;
        Ok(value)
    }
}

// ===== LOCAL_PREF attribute =====

mod local_pref {
    use super::*;
    const LEN: usize = 4;

    pub(super) fn encode(local_pref: u32, buf: &mut BytesMut) {
        buf.put_u32(local_pref);
    }

    pub(super) fn decode(
        hdr: &AttrHeader,
        buf: &mut Bytes,
    ) -> DecodeResult<u32> {
        if buf.remaining() != LEN {
            return Err(DecodeError::AttributeLength(hdr.length));
        }
        if hdr.flags_are(true, false, true) {
            return Err(DecodeError::AttributeFlags(hdr.flags().bits()));
        }

        let value = buf.try_get_u32()?;
        Ok(value)
    }
}

// ===== impl AsPath =====

impl AsPath {
    // Creates an AS_PATH made of a single AS_SEQUENCE, split into as many
    // segments as needed.
    pub fn from_sequence(asns: impl IntoIterator<Item = u32>) -> Self {
        let asns = asns.into_iter().collect::<Vec<_>>();
        let segments = asns
            .chunks(AS_PATH_SEGMENT_MAX_LEN)
            .map(|members| {
                AsPathSegment::new(
                    AsPathSegmentType::Sequence,
                    members.to_vec(),
                )
            })
            .collect();
        AsPath { segments }
    }

    fn encode(&self, buf: &mut BytesMut, four_byte_asns: bool) {
        for segment in &self.segments {
            segment.encode(buf, four_byte_asns);
        }
    }

    fn decode(
        hdr: &AttrHeader,
        buf: &mut Bytes,
        four_byte_asns: bool,
    ) -> DecodeResult<Self> {
        if hdr.flags_are(false, true, true) {
            return Err(DecodeError::AttributeFlags(hdr.flags().bits()));
        }

        // Decode AS Path segments.
        let mut segments = vec![];
        while buf.remaining() > 0 {
            let segment = AsPathSegment::decode(buf, four_byte_asns)?;
            if let Some(segment) = segment {
                segments.push(segment);
            }
        }

        Ok(AsPath { segments })
    }

    // Returns the members of all AS_SEQUENCE segments, in order.
    pub fn sequence(&self) -> impl Iterator<Item = u32> + '_ {
        self.members(AsPathSegmentType::Sequence)
    }

    // Returns the members of all AS_SET segments, in order.
    pub fn set(&self) -> impl Iterator<Item = u32> + '_ {
        self.members(AsPathSegmentType::Set)
    }

    fn members(
        &self,
        seg_type: AsPathSegmentType,
    ) -> impl Iterator<Item = u32> + '_ {
        self.segments
            .iter()
            .filter(move |segment| segment.seg_type == seg_type)
            .flat_map(|segment| segment.members.iter().copied())
    }
}

// ===== impl AsPathSegment =====

impl AsPathSegment {
    fn encode(&self, buf: &mut BytesMut, four_byte_asns: bool) {
        for members in self.members.chunks(AS_PATH_SEGMENT_MAX_LEN) {
            buf.put_u8(self.seg_type as u8);
            buf.put_u8(members.len() as u8);
            for member in members {
                encode_asn(buf, *member, four_byte_asns);
            }
        }
    }

    // Decodes a segment. Segments of unknown type are consumed and skipped.
    fn decode(
        buf: &mut Bytes,
        four_byte_asns: bool,
    ) -> DecodeResult<Option<Self>> {
        let seg_type =
            buf.try_get_u8().map_err(|_| DecodeError::MalformedAsPath)?;
        let seg_len =
            buf.try_get_u8().map_err(|_| DecodeError::MalformedAsPath)?;
        let asn_len = if four_byte_asns { 4 } else { 2 };
        let mut seg_buf = buf
            .try_split_to(seg_len as usize * asn_len)
            .map_err(|_| DecodeError::MalformedAsPath)?;

        let Some(seg_type) = AsPathSegmentType::from_u8(seg_type) else {
            Debug::AsPathSegmentSkip(seg_type, seg_len).log();
            return Ok(None);
        };

        // Decode segment members.
        let members = (0..seg_len)
            .map(|_| decode_asn(&mut seg_buf, four_byte_asns))
            .collect::<DecodeResult<_>>()?;

        Ok(Some(AsPathSegment { seg_type, members }))
    }
}

// ===== helper functions =====

// Common flag check for optional attributes.
fn check_optional_flags(hdr: &AttrHeader) -> DecodeResult<()> {
    if hdr.flags_are(false, true, true) {
        return Err(DecodeError::AttributeFlags(hdr.flags().bits()));
    }
    Ok(())
}

fn encode_asn(buf: &mut BytesMut, asn: u32, four_byte_asns: bool) {
    if four_byte_asns {
        buf.put_u32(asn);
    } else {
        buf.put_u16(asn as u16);
    }
}

fn decode_asn(buf: &mut Bytes, four_byte_asns: bool) -> DecodeResult<u32> {
    let asn = if four_byte_asns {
        buf.try_get_u32()?
    } else {
        buf.try_get_u16()? as u32
    };
    Ok(asn)
}
