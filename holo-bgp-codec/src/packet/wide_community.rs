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
use serde_with::skip_serializing_none;

use crate::packet::Encodable;
use crate::packet::consts::{
    WIDE_COMMUNITY_CONTAINER_TYPE, WideCommunityAtomType,
    WideCommunitySectionType,
};
use crate::packet::error::{DecodeError, DecodeResult};
use crate::packet::header::{short_tlv_encode_end, short_tlv_encode_start};

//
// Wide Community container (type 1).
//
// Encoding format:
//
// 0                   1                   2                   3
// 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |         Container Type        |     Flags     |   Hop Count   |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |             Length            |          Community            |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |   Community (cont.)           |       Source AS Number        |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |  Source AS Number (cont.)     |       Context AS Number       |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |  Context AS Number (cont.)    |  Sections (variable)
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//
#[skip_serializing_none]
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct WideCommunity {
    pub flags: u8,
    pub hop_count: u8,
    pub community: u32,
    pub local_as: u32,
    pub context_as: u32,
    pub target: Option<WideCommunitySection>,
    pub exclude_target: Option<WideCommunitySection>,
    pub parameter: Option<WideCommunitySection>,
}

// Ordered list of atoms of a Target, Exclude Target or Parameter section.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct WideCommunitySection {
    pub atoms: Vec<WideCommunityAtom>,
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum WideCommunityAtom {
    Integer(Vec<u32>),
    Ipv4Neighbor(Vec<Ipv4Neighbor>),
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Ipv4Neighbor {
    pub local: Ipv4Addr,
    pub remote: Ipv4Addr,
}

// Assembles a wide community prior to encoding.
#[derive(Debug)]
pub struct WideCommunityBuilder {
    comm: WideCommunity,
}

// ===== impl WideCommunity =====

impl WideCommunity {
    pub(crate) fn decode(buf: &mut Bytes) -> DecodeResult<Self> {
        let container_type = buf.try_get_u16()?;
        if container_type != WIDE_COMMUNITY_CONTAINER_TYPE {
            return Err(DecodeError::MalformedAttribute);
        }
        let flags = buf.try_get_u8()?;
        let hop_count = buf.try_get_u8()?;

        // The container length is skipped: the attribute length already
        // delimits the container.
        let _length = buf.try_get_u16()?;

        let community = buf.try_get_u32()?;
        let local_as = buf.try_get_u32()?;
        let context_as = buf.try_get_u32()?;

        // Decode sections.
        let mut target = None;
        let mut exclude_target = None;
        let mut parameter = None;
        while buf.has_remaining() {
            let section_type = buf.try_get_u8()?;
            let section_len = buf.try_get_u16()?;
            let mut section_buf = buf
                .try_split_to(section_len as usize)
                .map_err(|_| DecodeError::AttributeLength(section_len))?;
            let slot = match WideCommunitySectionType::from_u8(section_type) {
                Some(WideCommunitySectionType::Target) => &mut target,
                Some(WideCommunitySectionType::ExcludeTarget) => {
                    &mut exclude_target
                }
                Some(WideCommunitySectionType::Parameter) => &mut parameter,
                None => {
                    return Err(DecodeError::UnsupportedWideCommunityAtom(
                        section_type,
                    ));
                }
            };
            if slot.is_some() {
                return Err(DecodeError::MalformedAttribute);
            }
            *slot = Some(WideCommunitySection::decode(&mut section_buf)?);
        }

        Ok(WideCommunity {
            flags,
            hop_count,
            community,
            local_as,
            context_as,
            target,
            exclude_target,
            parameter,
        })
    }

    pub(crate) fn encode_value(&self, buf: &mut BytesMut) {
        buf.put_u16(WIDE_COMMUNITY_CONTAINER_TYPE);
        buf.put_u8(self.flags);
        buf.put_u8(self.hop_count);

        // The container length will be rewritten later.
        let len_pos = buf.len();
        buf.put_u16(0);

        buf.put_u32(self.community);
        buf.put_u32(self.local_as);
        buf.put_u32(self.context_as);
        for (section_type, section) in self.sections() {
            section.encode(buf, section_type);
        }

        let length = (buf.len() - len_pos - 2) as u16;
        buf[len_pos..len_pos + 2].copy_from_slice(&length.to_be_bytes());
    }

    // Returns the sections present in this container, in encoding order.
    pub fn sections(
        &self,
    ) -> impl Iterator<Item = (WideCommunitySectionType, &WideCommunitySection)>
    {
        [
            (WideCommunitySectionType::Target, &self.target),
            (WideCommunitySectionType::ExcludeTarget, &self.exclude_target),
            (WideCommunitySectionType::Parameter, &self.parameter),
        ]
        .into_iter()
        .filter_map(|(section_type, section)| {
            section.as_ref().map(|section| (section_type, section))
        })
    }
}

// ===== impl WideCommunitySection =====

impl WideCommunitySection {
    fn decode(buf: &mut Bytes) -> DecodeResult<Self> {
        let mut atoms = vec![];
        while buf.has_remaining() {
            atoms.push(WideCommunityAtom::decode(buf)?);
        }
        Ok(WideCommunitySection { atoms })
    }

    fn encode(
        &self,
        buf: &mut BytesMut,
        section_type: WideCommunitySectionType,
    ) {
        let start_pos = short_tlv_encode_start(buf, section_type as u8);
        for atom in &self.atoms {
            atom.encode(buf);
        }
        short_tlv_encode_end(buf, start_pos);
    }
}

// ===== impl WideCommunityAtom =====

impl WideCommunityAtom {
    fn decode(buf: &mut Bytes) -> DecodeResult<Self> {
        let atom_type = buf.try_get_u8()?;
        let atom_len = buf.try_get_u16()?;
        let mut atom_buf = buf
            .try_split_to(atom_len as usize)
            .map_err(|_| DecodeError::AttributeLength(atom_len))?;

        let atom = match WideCommunityAtomType::from_u8(atom_type) {
            Some(WideCommunityAtomType::Integer) => {
                if atom_len % 4 != 0 {
                    return Err(DecodeError::AttributeLength(atom_len));
                }
                let mut values = vec![];
                while atom_buf.has_remaining() {
                    values.push(atom_buf.try_get_u32()?);
                }
                WideCommunityAtom::Integer(values)
            }
            Some(WideCommunityAtomType::Ipv4Neighbor) => {
                if atom_len % 8 != 0 {
                    return Err(DecodeError::AttributeLength(atom_len));
                }
                let mut neighbors = vec![];
                while atom_buf.has_remaining() {
                    let local = atom_buf.try_get_ipv4()?;
                    let remote = atom_buf.try_get_ipv4()?;
                    neighbors.push(Ipv4Neighbor { local, remote });
                }
                WideCommunityAtom::Ipv4Neighbor(neighbors)
            }
            None => {
                return Err(DecodeError::UnsupportedWideCommunityAtom(
                    atom_type,
                ));
            }
        };

        Ok(atom)
    }
}

impl Encodable for WideCommunityAtom {
    fn type_code(&self) -> u16 {
        let atom_type = match self {
            WideCommunityAtom::Integer(..) => WideCommunityAtomType::Integer,
            WideCommunityAtom::Ipv4Neighbor(..) => {
                WideCommunityAtomType::Ipv4Neighbor
            }
        };
        atom_type as u16
    }

    fn encode(&self, buf: &mut BytesMut) -> usize {
        let start_pos = short_tlv_encode_start(buf, self.type_code() as u8);
        match self {
            WideCommunityAtom::Integer(values) => {
                for value in values {
                    buf.put_u32(*value);
                }
            }
            WideCommunityAtom::Ipv4Neighbor(neighbors) => {
                for neighbor in neighbors {
                    buf.put_ipv4(&neighbor.local);
                    buf.put_ipv4(&neighbor.remote);
                }
            }
        }
        short_tlv_encode_end(buf, start_pos)
    }
}

// ===== impl WideCommunityBuilder =====

impl WideCommunityBuilder {
    pub fn new(community: u32) -> Self {
        WideCommunityBuilder {
            comm: WideCommunity {
                flags: 0,
                hop_count: 0,
                community,
                local_as: 0,
                context_as: 0,
                target: None,
                exclude_target: None,
                parameter: None,
            },
        }
    }

    pub fn flags(mut self, flags: u8) -> Self {
        self.comm.flags = flags;
        self
    }

    pub fn hop_count(mut self, hop_count: u8) -> Self {
        self.comm.hop_count = hop_count;
        self
    }

    pub fn local_as(mut self, local_as: u32) -> Self {
        self.comm.local_as = local_as;
        self
    }

    pub fn context_as(mut self, context_as: u32) -> Self {
        self.comm.context_as = context_as;
        self
    }

    pub fn target(mut self, atom: WideCommunityAtom) -> Self {
        self.comm.target.get_or_insert_default().atoms.push(atom);
        self
    }

    pub fn exclude_target(mut self, atom: WideCommunityAtom) -> Self {
        self.comm
            .exclude_target
            .get_or_insert_default()
            .atoms
            .push(atom);
        self
    }

    pub fn parameter(mut self, atom: WideCommunityAtom) -> Self {
        self.comm.parameter.get_or_insert_default().atoms.push(atom);
        self
    }

    pub fn build(self) -> WideCommunity {
        self.comm
    }
}

// ===== unit tests =====
