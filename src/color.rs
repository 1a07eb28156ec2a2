// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Deterministic color assignment for team timers.
//!
//! The same name always maps to the same palette entry, across processes and
//! across the web client that wrote the existing documents.

/// Fixed palette of distinct colors (hex).
pub const PALETTE: [&str; 15] = [
    "#4299E1", // Blue
    "#48BB78", // Green
    "#ED8936", // Orange
    "#9F7AEA", // Purple
    "#F56565", // Red
    "#38B2AC", // Teal
    "#ED64A6", // Pink
    "#ECC94B", // Yellow
    "#667EEA", // Indigo
    "#FC8181", // Light Red
    "#68D391", // Light Green
    "#63B3ED", // Light Blue
    "#B794F4", // Light Purple
    "#F6AD55", // Light Orange
    "#4FD1C5", // Light Teal
];

/// Rolling multiply-by-31 hash over the UTF-16 code units of `name`.
///
/// The left shift operates on the running value truncated to 32 bits while
/// the subtraction does not, which is how the browser client evaluates
/// `hash = c + ((hash << 5) - hash)`. The running value grows by at most
/// 2^32 per code unit, so it stays exact in an `i64`.
pub fn name_hash(name: &str) -> i64 {
    name.encode_utf16().fold(0i64, |hash, unit| {
        let shifted = (hash as i32).wrapping_shl(5) as i64;
        (unit as i64).wrapping_add(shifted.wrapping_sub(hash))
    })
}

/// Pick the palette color for a timer name.
pub fn color_for(name: &str) -> &'static str {
    let index = name_hash(name).unsigned_abs() % PALETTE.len() as u64;
    PALETTE[index as usize]
}
