// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Prowl Contributors

//! Time-prefixed unique identifiers
//!
//! Good enough for correlating log records and telling sessions apart; not a
//! security token.

use std::time::{SystemTime, UNIX_EPOCH};

const RANDOM_BITS: u32 = 22;
const RANDOM_MASK: u64 = (1 << RANDOM_BITS) - 1;

/// A 64-bit id: millisecond UNIX timestamp in the high bits, 22 random bits
/// in the low bits. Ids generated later sort higher.
pub fn unique_u64() -> u64 {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64;
    let low = u64::from(rand::random::<u32>()) & RANDOM_MASK;

    (millis << RANDOM_BITS) | low
}

/// [`unique_u64`] rendered as a fixed-width hex string.
pub fn unique_hex() -> String {
    format!("{:016x}", unique_u64())
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
