//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use serde::{Deserialize, Serialize};

// 20-bit MPLS label value.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub struct Label(u32);

// ===== impl Label =====

impl Label {
    pub const VALUE_MASK: u32 = 0x000FFFFF;

    // Creates a label from the 20 least significant bits of `label`.
    pub const fn new(label: u32) -> Label {
        Label(label & Self::VALUE_MASK)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

// ===== unit tests =====
