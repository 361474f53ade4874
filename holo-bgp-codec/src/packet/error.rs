//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::Ipv4Addr;

use bytes::{Bytes, TryGetError};
use serde::{Deserialize, Serialize};

use crate::packet::consts::{ErrorCode, UpdateMessageErrorSubcode};

pub type DecodeResult<T> = Result<T, DecodeError>;

// Path attribute decoding errors.
//
// Each variant maps to an UPDATE Message Error subcode (RFC 4271) when
// reported back to the peer.
#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum DecodeError {
    MalformedAttribute,
    MalformedAttributeList,
    MalformedAsPath,
    AttributeLength(u16),
    AttributeFlags(u8),
    InvalidOrigin(u8),
    InvalidNexthop(Ipv4Addr),
    UnrecognizedWellKnownAttribute(u8),
    UnsupportedAddressFamily(u16, u8),
    UnsupportedBgpLsAttribute(u16),
    UnsupportedBgpLsNlri(u16),
    UnsupportedFlowSpecComponent(u8),
    InvalidFlowSpecOperator(u8),
    UnsupportedWideCommunityAtom(u8),
}

// Error raised while decoding a single path attribute.
//
// Carries the raw bytes of the offending attribute (header included) so they
// can be echoed back in the NOTIFICATION message.
#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct AttrError {
    pub attr_type: Option<u8>,
    pub error: DecodeError,
    pub data: Bytes,
}

//
// NOTIFICATION Message.
//
// Encoding format (message body):
//
// 0                   1                   2                   3
// 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// | Error code    | Error subcode |   Data (variable)             |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub struct NotificationMsg {
    pub error_code: u8,
    pub error_subcode: u8,
    pub data: Vec<u8>,
}

// ===== impl DecodeError =====

impl DecodeError {
    // Returns the UPDATE Message Error subcode corresponding to this error.
    pub fn subcode(&self) -> UpdateMessageErrorSubcode {
        match self {
            DecodeError::MalformedAttribute
            | DecodeError::MalformedAttributeList => {
                UpdateMessageErrorSubcode::MalformedAttributeList
            }
            DecodeError::MalformedAsPath => {
                UpdateMessageErrorSubcode::MalformedAsPath
            }
            DecodeError::AttributeLength(..) => {
                UpdateMessageErrorSubcode::AttributeLengthError
            }
            DecodeError::AttributeFlags(..) => {
                UpdateMessageErrorSubcode::AttributeFlagsError
            }
            DecodeError::InvalidOrigin(..) => {
                UpdateMessageErrorSubcode::InvalidOriginAttribute
            }
            DecodeError::InvalidNexthop(..) => {
                UpdateMessageErrorSubcode::InvalidNexthopAttribute
            }
            DecodeError::UnrecognizedWellKnownAttribute(..) => {
                UpdateMessageErrorSubcode::UnrecognizedWellKnownAttribute
            }
            DecodeError::UnsupportedAddressFamily(..)
            | DecodeError::UnsupportedBgpLsAttribute(..)
            | DecodeError::UnsupportedBgpLsNlri(..)
            | DecodeError::UnsupportedFlowSpecComponent(..)
            | DecodeError::InvalidFlowSpecOperator(..)
            | DecodeError::UnsupportedWideCommunityAtom(..) => {
                UpdateMessageErrorSubcode::OptionalAttributeError
            }
        }
    }
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::MalformedAttribute => {
                write!(f, "malformed attribute")
            }
            DecodeError::MalformedAttributeList => {
                write!(f, "malformed attribute list")
            }
            DecodeError::MalformedAsPath => {
                write!(f, "malformed AS_PATH")
            }
            DecodeError::AttributeLength(len) => {
                write!(f, "invalid attribute length: {len}")
            }
            DecodeError::AttributeFlags(flags) => {
                write!(f, "invalid attribute flags: {flags:#04x}")
            }
            DecodeError::InvalidOrigin(origin) => {
                write!(f, "invalid ORIGIN attribute: {origin}")
            }
            DecodeError::InvalidNexthop(nexthop) => {
                write!(f, "invalid NEXT_HOP attribute: {nexthop}")
            }
            DecodeError::UnrecognizedWellKnownAttribute(attr_type) => {
                write!(f, "unrecognized well-known attribute: {attr_type}")
            }
            DecodeError::UnsupportedAddressFamily(afi, safi) => {
                write!(f, "unsupported address family: afi {afi} safi {safi}")
            }
            DecodeError::UnsupportedBgpLsAttribute(tlv_type) => {
                write!(f, "unsupported BGP-LS attribute TLV: {tlv_type}")
            }
            DecodeError::UnsupportedBgpLsNlri(tlv_type) => {
                write!(f, "unsupported BGP-LS NLRI type: {tlv_type}")
            }
            DecodeError::UnsupportedFlowSpecComponent(comp_type) => {
                write!(f, "unsupported flow-spec component: {comp_type}")
            }
            DecodeError::InvalidFlowSpecOperator(op) => {
                write!(f, "invalid flow-spec operator: {op:#04x}")
            }
            DecodeError::UnsupportedWideCommunityAtom(atom_type) => {
                write!(f, "unsupported wide community atom: {atom_type}")
            }
        }
    }
}

impl std::error::Error for DecodeError {}

impl From<TryGetError> for DecodeError {
    fn from(_error: TryGetError) -> DecodeError {
        DecodeError::MalformedAttribute
    }
}

// ===== impl AttrError =====

impl AttrError {
    pub(crate) fn new(
        attr_type: Option<u8>,
        error: DecodeError,
        data: Bytes,
    ) -> AttrError {
        AttrError {
            attr_type,
            error,
            data,
        }
    }
}

impl std::fmt::Display for AttrError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.attr_type {
            Some(attr_type) => {
                write!(f, "attribute {attr_type}: {}", self.error)
            }
            None => self.error.fmt(f),
        }
    }
}

impl std::error::Error for AttrError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

// ===== impl NotificationMsg =====

impl From<AttrError> for NotificationMsg {
    fn from(error: AttrError) -> NotificationMsg {
        NotificationMsg {
            error_code: ErrorCode::UpdateMessageError as u8,
            error_subcode: error.error.subcode() as u8,
            data: error.data.to_vec(),
        }
    }
}
