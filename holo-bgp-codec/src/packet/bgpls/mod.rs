//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

pub mod attr;
pub mod nlri;

pub use attr::{IgpMetric, LinkStateAttr, LinkStateAttrs};
pub use nlri::{LinkNlri, LinkStateNlri, NodeNlri, PrefixNlri};
