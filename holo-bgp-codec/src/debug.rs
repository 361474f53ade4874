//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use tracing::{debug, debug_span};

use crate::packet::attribute::UnknownAttr;
use crate::packet::error::AttrError;

// BGP codec debug messages.
#[derive(Debug)]
pub enum Debug<'a> {
    AttrError(&'a AttrError),
    AttrDuplicate(u8),
    AttrUnknownIgnore(u8),
    AttrUnknownKeep(&'a UnknownAttr),
    AsPathSegmentSkip(u8, u8),
    ExtCommunitySkip(u8, u8),
    FlowSpecComponentSkip(u8, usize),
}

// ===== impl Debug =====

impl Debug<'_> {
    // Log debug message using the tracing API.
    pub(crate) fn log(&self) {
        match self {
            Debug::AttrError(error) => {
                debug_span!("attribute").in_scope(|| {
                    let data = serde_json::to_string(&error.data)
                        .unwrap_or_default();
                    debug!(
                        attr_type = ?error.attr_type,
                        error = %error.error,
                        %data,
                        "{}",
                        self
                    );
                })
            }
            Debug::AttrDuplicate(attr_type)
            | Debug::AttrUnknownIgnore(attr_type) => {
                debug_span!("attribute").in_scope(|| {
                    debug!(%attr_type, "{}", self);
                })
            }
            Debug::AttrUnknownKeep(attr) => {
                debug_span!("attribute").in_scope(|| {
                    let data = serde_json::to_string(attr).unwrap_or_default();
                    debug!(attr_type = %attr.attr_type, %data, "{}", self);
                })
            }
            Debug::AsPathSegmentSkip(seg_type, seg_len) => {
                debug_span!("attribute").in_scope(|| {
                    debug_span!("as-path").in_scope(|| {
                        debug!(%seg_type, %seg_len, "{}", self);
                    })
                })
            }
            Debug::ExtCommunitySkip(comm_type, comm_subtype) => {
                debug_span!("attribute").in_scope(|| {
                    debug_span!("ext-communities").in_scope(|| {
                        debug!(%comm_type, %comm_subtype, "{}", self);
                    })
                })
            }
            Debug::FlowSpecComponentSkip(comp_type, comp_len) => {
                debug_span!("flowspec").in_scope(|| {
                    debug!(%comp_type, %comp_len, "{}", self);
                })
            }
        }
    }
}

impl std::fmt::Display for Debug<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Debug::AttrError(..) => {
                write!(f, "malformed attribute")
            }
            Debug::AttrDuplicate(..) => {
                write!(f, "duplicate attribute discarded")
            }
            Debug::AttrUnknownIgnore(..) => {
                write!(f, "unrecognized optional non-transitive attribute")
            }
            Debug::AttrUnknownKeep(..) => {
                write!(f, "unrecognized optional transitive attribute")
            }
            Debug::AsPathSegmentSkip(..) => {
                write!(f, "skipping segment of unknown type")
            }
            Debug::ExtCommunitySkip(..) => {
                write!(f, "skipping extended community of unknown type")
            }
            Debug::FlowSpecComponentSkip(..) => {
                write!(f, "skipping flow-spec component larger than an NLRI")
            }
        }
    }
}
