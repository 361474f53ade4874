//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use bytes::{Buf, BufMut, Bytes, BytesMut};
use holo_utils::bytes::BytesExt;
use holo_utils::ip::Ipv4NetworkExt;
use ipnetwork::Ipv4Network;
use itertools::Itertools;
use num_traits::FromPrimitive;
use serde::{Deserialize, Serialize};

use crate::debug::Debug;
use crate::packet::Encodable;
use crate::packet::consts::{
    FLOWSPEC_NLRI_EXT_LEN, FLOWSPEC_NLRI_MAX_LEN, FLOWSPEC_OP_END_OF_LIST,
    FLOWSPEC_OP_LEN_MASK, FLOWSPEC_OP_LEN_SHIFT, FlowSpecType, OpFlags,
};
use crate::packet::error::{DecodeError, DecodeResult};
use crate::packet::tlv::{decode_ipv4_prefix, encode_ipv4_prefix};

// Width of a flow-spec operator value.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub enum ValueWidth {
    One = 1,
    Two = 2,
    Four = 4,
}

//
// Flow-spec operator-value pair.
//
// Encoding format (operator byte):
//
//    0   1   2   3   4   5   6   7
//  +---+---+---+---+---+---+---+---+
//  | e | a |  len  | 0 |lt |gt |eq |
//  +---+---+---+---+---+---+---+---+
//
// The end-of-list bit isn't stored: it's derived from the position of the
// pair in its component. The reserved bit is kept as received.
//
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct OperatorValue {
    pub op: OpFlags,
    pub width: ValueWidth,
    pub value: u32,
}

// Flow-spec NLRI component (RFC 8955, IPv4 only).
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum FlowSpecComponent {
    DestinationPrefix(Ipv4Network),
    SourcePrefix(Ipv4Network),
    IpProtocol(Vec<OperatorValue>),
    Port(Vec<OperatorValue>),
    DestinationPort(Vec<OperatorValue>),
    SourcePort(Vec<OperatorValue>),
    IcmpType(Vec<OperatorValue>),
    IcmpCode(Vec<OperatorValue>),
    TcpFlags(Vec<OperatorValue>),
    PacketLength(Vec<OperatorValue>),
    Dscp(Vec<OperatorValue>),
    Fragment(Vec<OperatorValue>),
}

// ===== impl ValueWidth =====

impl ValueWidth {
    // Returns the smallest width able to hold the given value.
    pub fn for_value(value: u32) -> Self {
        if value <= u8::MAX as u32 {
            ValueWidth::One
        } else if value <= u16::MAX as u32 {
            ValueWidth::Two
        } else {
            ValueWidth::Four
        }
    }

    fn decode(op: u8) -> DecodeResult<Self> {
        match (op & FLOWSPEC_OP_LEN_MASK) >> FLOWSPEC_OP_LEN_SHIFT {
            0 => Ok(ValueWidth::One),
            1 => Ok(ValueWidth::Two),
            2 => Ok(ValueWidth::Four),
            _ => Err(DecodeError::InvalidFlowSpecOperator(op)),
        }
    }

    fn encode(&self) -> u8 {
        let code = match self {
            ValueWidth::One => 0,
            ValueWidth::Two => 1,
            ValueWidth::Four => 2,
        };
        code << FLOWSPEC_OP_LEN_SHIFT
    }
}

// ===== impl OperatorValue =====

impl OperatorValue {
    // Creates a new operator-value pair using the smallest width able to hold
    // the value.
    pub fn new(op: OpFlags, value: u32) -> Self {
        OperatorValue {
            op,
            width: ValueWidth::for_value(value),
            value,
        }
    }

    // Creates a new operator-value pair with an explicit width. The value is
    // truncated to the given width.
    pub fn with_width(op: OpFlags, width: ValueWidth, value: u32) -> Self {
        let value = match width {
            ValueWidth::One => value & 0xff,
            ValueWidth::Two => value & 0xffff,
            ValueWidth::Four => value,
        };
        OperatorValue { op, width, value }
    }

    fn encode(&self, buf: &mut BytesMut, end_of_list: bool) {
        let mut op = (self.op.bits() & OP_FLAGS_MASK) | self.width.encode();
        if end_of_list {
            op |= FLOWSPEC_OP_END_OF_LIST;
        }
        buf.put_u8(op);
        match self.width {
            ValueWidth::One => buf.put_u8(self.value as u8),
            ValueWidth::Two => buf.put_u16(self.value as u16),
            ValueWidth::Four => buf.put_u32(self.value),
        }
    }

    // Decodes one pair, returning it along with its end-of-list bit.
    fn decode(buf: &mut Bytes) -> DecodeResult<(Self, bool)> {
        let op = buf.try_get_u8()?;
        let width = ValueWidth::decode(op)?;
        let value = match width {
            ValueWidth::One => buf.try_get_u8()? as u32,
            ValueWidth::Two => buf.try_get_u16()? as u32,
            ValueWidth::Four => buf.try_get_u32()?,
        };
        let pair = OperatorValue {
            op: OpFlags::from_bits_retain(op & OP_FLAGS_MASK),
            width,
            value,
        };
        Ok((pair, op & FLOWSPEC_OP_END_OF_LIST != 0))
    }
}

// ===== impl FlowSpecComponent =====

impl FlowSpecComponent {
    // Creates a numeric or bitmask component.
    //
    // Returns `None` if the operator list is empty, if it doesn't fit in a
    // single NLRI, or if the component type holds a prefix instead of
    // operators.
    pub fn with_ops(
        comp_type: FlowSpecType,
        ops: Vec<OperatorValue>,
    ) -> Option<Self> {
        if ops.is_empty() || 1 + ops_length(&ops) > FLOWSPEC_NLRI_MAX_LEN {
            return None;
        }
        let comp = match comp_type {
            FlowSpecType::DestinationPrefix | FlowSpecType::SourcePrefix => {
                return None;
            }
            FlowSpecType::IpProtocol => FlowSpecComponent::IpProtocol(ops),
            FlowSpecType::Port => FlowSpecComponent::Port(ops),
            FlowSpecType::DestinationPort => {
                FlowSpecComponent::DestinationPort(ops)
            }
            FlowSpecType::SourcePort => FlowSpecComponent::SourcePort(ops),
            FlowSpecType::IcmpType => FlowSpecComponent::IcmpType(ops),
            FlowSpecType::IcmpCode => FlowSpecComponent::IcmpCode(ops),
            FlowSpecType::TcpFlags => FlowSpecComponent::TcpFlags(ops),
            FlowSpecType::PacketLength => FlowSpecComponent::PacketLength(ops),
            FlowSpecType::Dscp => FlowSpecComponent::Dscp(ops),
            FlowSpecType::Fragment => FlowSpecComponent::Fragment(ops),
        };
        Some(comp)
    }

    // Creates a destination prefix component with the host bits cleared.
    pub fn destination_prefix(prefix: Ipv4Network) -> Self {
        FlowSpecComponent::DestinationPrefix(prefix.apply_mask())
    }

    // Creates a source prefix component with the host bits cleared.
    pub fn source_prefix(prefix: Ipv4Network) -> Self {
        FlowSpecComponent::SourcePrefix(prefix.apply_mask())
    }

    pub fn comp_type(&self) -> FlowSpecType {
        match self {
            FlowSpecComponent::DestinationPrefix(..) => {
                FlowSpecType::DestinationPrefix
            }
            FlowSpecComponent::SourcePrefix(..) => FlowSpecType::SourcePrefix,
            FlowSpecComponent::IpProtocol(..) => FlowSpecType::IpProtocol,
            FlowSpecComponent::Port(..) => FlowSpecType::Port,
            FlowSpecComponent::DestinationPort(..) => {
                FlowSpecType::DestinationPort
            }
            FlowSpecComponent::SourcePort(..) => FlowSpecType::SourcePort,
            FlowSpecComponent::IcmpType(..) => FlowSpecType::IcmpType,
            FlowSpecComponent::IcmpCode(..) => FlowSpecType::IcmpCode,
            FlowSpecComponent::TcpFlags(..) => FlowSpecType::TcpFlags,
            FlowSpecComponent::PacketLength(..) => FlowSpecType::PacketLength,
            FlowSpecComponent::Dscp(..) => FlowSpecType::Dscp,
            FlowSpecComponent::Fragment(..) => FlowSpecType::Fragment,
        }
    }

    // Returns the operator list of numeric and bitmask components.
    pub fn ops(&self) -> Option<&[OperatorValue]> {
        match self {
            FlowSpecComponent::DestinationPrefix(..)
            | FlowSpecComponent::SourcePrefix(..) => None,
            FlowSpecComponent::IpProtocol(ops)
            | FlowSpecComponent::Port(ops)
            | FlowSpecComponent::DestinationPort(ops)
            | FlowSpecComponent::SourcePort(ops)
            | FlowSpecComponent::IcmpType(ops)
            | FlowSpecComponent::IcmpCode(ops)
            | FlowSpecComponent::TcpFlags(ops)
            | FlowSpecComponent::PacketLength(ops)
            | FlowSpecComponent::Dscp(ops)
            | FlowSpecComponent::Fragment(ops) => Some(ops),
        }
    }

    // Returns the encoded length of the component.
    pub fn length(&self) -> usize {
        match self {
            FlowSpecComponent::DestinationPrefix(prefix)
            | FlowSpecComponent::SourcePrefix(prefix) => {
                2 + (prefix.prefix() as usize).div_ceil(8)
            }
            _ => match self.ops() {
                Some(ops) if !ops.is_empty() => 1 + ops_length(ops),
                _ => 0,
            },
        }
    }

    pub fn decode(buf: &mut Bytes) -> DecodeResult<Self> {
        let comp_type = buf.try_get_u8()?;
        let Some(comp_type) = FlowSpecType::from_u8(comp_type) else {
            return Err(DecodeError::UnsupportedFlowSpecComponent(comp_type));
        };

        let comp = match comp_type {
            FlowSpecType::DestinationPrefix => {
                FlowSpecComponent::DestinationPrefix(decode_ipv4_prefix(buf)?)
            }
            FlowSpecType::SourcePrefix => {
                FlowSpecComponent::SourcePrefix(decode_ipv4_prefix(buf)?)
            }
            _ => {
                let ops = decode_ops(buf)?;
                FlowSpecComponent::with_ops(comp_type, ops)
                    .ok_or(DecodeError::MalformedAttribute)?
            }
        };

        Ok(comp)
    }
}

impl Encodable for FlowSpecComponent {
    fn type_code(&self) -> u16 {
        self.comp_type() as u16
    }

    // Components without operators are invalid and aren't encoded.
    fn encode(&self, buf: &mut BytesMut) -> usize {
        let start_pos = buf.len();
        match self {
            FlowSpecComponent::DestinationPrefix(prefix)
            | FlowSpecComponent::SourcePrefix(prefix) => {
                buf.put_u8(self.comp_type() as u8);
                encode_ipv4_prefix(buf, prefix);
            }
            _ => {
                if let Some(ops) = self.ops()
                    && !ops.is_empty()
                {
                    buf.put_u8(self.comp_type() as u8);
                    encode_ops(buf, ops);
                }
            }
        }
        buf.len() - start_pos
    }
}

// ===== global functions =====

// Decodes one flow-spec NLRI, appending its components to the given list.
pub(crate) fn decode_nlri(
    buf: &mut Bytes,
    components: &mut Vec<FlowSpecComponent>,
) -> DecodeResult<()> {
    // Parse NLRI length (1 or 2 octets).
    let len = buf.try_get_u8()? as u16;
    let len = if len >= FLOWSPEC_NLRI_EXT_LEN {
        ((len & 0x0f) << 8) | buf.try_get_u8()? as u16
    } else {
        len
    };
    let mut buf = buf
        .try_split_to(len as usize)
        .map_err(|_| DecodeError::AttributeLength(len))?;

    // Parse NLRI components.
    while buf.has_remaining() {
        let comp = FlowSpecComponent::decode(&mut buf)?;
        components.push(comp);
    }

    Ok(())
}

// Encodes a list of flow-spec components.
//
// When all components share the same type, each one is written as its own
// NLRI. Otherwise they are packed into as few NLRIs as the 12-bit NLRI length
// allows. Empty components and components larger than an NLRI are skipped.
pub(crate) fn encode_nlri(
    buf: &mut BytesMut,
    components: &[FlowSpecComponent],
) -> usize {
    let start_pos = buf.len();
    let same_type = components.iter().map(|comp| comp.comp_type()).all_equal();

    // Position and length of the NLRI being filled.
    let mut nlri: Option<(usize, usize)> = None;
    for comp in components {
        let comp_len = comp.length();
        if comp_len == 0 {
            continue;
        }
        if comp_len > FLOWSPEC_NLRI_MAX_LEN {
            Debug::FlowSpecComponentSkip(comp.comp_type() as u8, comp_len)
                .log();
            continue;
        }

        if let Some((nlri_pos, nlri_len)) = nlri
            && (same_type || nlri_len + comp_len > FLOWSPEC_NLRI_MAX_LEN)
        {
            nlri_encode_end(buf, nlri_pos);
            nlri = None;
        }
        let (nlri_pos, nlri_len) =
            nlri.unwrap_or_else(|| (nlri_encode_start(buf), 0));
        comp.encode(buf);
        nlri = Some((nlri_pos, nlri_len + comp_len));
    }
    if let Some((nlri_pos, _)) = nlri {
        nlri_encode_end(buf, nlri_pos);
    }

    buf.len() - start_pos
}

// ===== helper functions =====

// Operator bits stored in `OpFlags`, including the reserved bit.
const OP_FLAGS_MASK: u8 = !(FLOWSPEC_OP_END_OF_LIST | FLOWSPEC_OP_LEN_MASK);

fn decode_ops(buf: &mut Bytes) -> DecodeResult<Vec<OperatorValue>> {
    let mut ops = vec![];
    loop {
        let (pair, end_of_list) = OperatorValue::decode(buf)?;
        ops.push(pair);
        if end_of_list {
            break;
        }
    }
    Ok(ops)
}

fn ops_length(ops: &[OperatorValue]) -> usize {
    ops.iter().map(|pair| 1 + pair.width as usize).sum()
}

fn encode_ops(buf: &mut BytesMut, ops: &[OperatorValue]) {
    let last = ops.len().saturating_sub(1);
    for (idx, pair) in ops.iter().enumerate() {
        pair.encode(buf, idx == last);
    }
}

fn nlri_encode_start(buf: &mut BytesMut) -> usize {
    let start_pos = buf.len();
    // The NLRI length will be rewritten later.
    buf.put_u8(0);
    start_pos
}

fn nlri_encode_end(buf: &mut BytesMut, start_pos: usize) {
    let value_pos = start_pos + 1;
    let len = (buf.len() - value_pos) as u16;
    if len >= FLOWSPEC_NLRI_EXT_LEN {
        // Make room for the second length byte.
        buf.put_u8(0);
        let end = buf.len();
        buf.copy_within(value_pos..end - 1, value_pos + 1);
        let len = 0xf000 | len;
        buf[start_pos..start_pos + 2].copy_from_slice(&len.to_be_bytes());
    } else {
        buf[start_pos] = len as u8;
    }
}

// ===== unit tests =====
