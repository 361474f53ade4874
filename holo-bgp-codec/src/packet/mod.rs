//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

pub mod attribute;
pub mod bgpls;
pub mod community;
pub mod consts;
pub mod error;
pub mod flowspec;
pub mod header;
pub mod mp_nlri;
pub mod tlv;
pub mod vpn;
pub mod wide_community;

use bytes::BytesMut;

// Trait for all self-describing wire values (path attributes, TLVs, flow-spec
// components, wide community atoms and extended communities).
pub trait Encodable {
    // Returns the numeric type code of the value.
    fn type_code(&self) -> u16;

    // Appends the value, type and length included, to the given buffer.
    // Returns the number of bytes written.
    fn encode(&self, buf: &mut BytesMut) -> usize;
}
