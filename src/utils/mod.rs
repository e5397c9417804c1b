//! Shared helpers

pub mod constants;

use alloy_primitives::{Address, B256};

/// Lower-case 0x-prefixed rendering for findings and labels.
/// Internal comparisons stay on typed addresses; only output strings
/// go through here.
pub fn lower_hex(addr: &Address) -> String {
    format!("{addr:#x}")
}

/// Lower-case 0x-prefixed transaction hash
pub fn lower_hex_hash(hash: &B256) -> String {
    format!("{hash:#x}")
}

/// Pick the pool-side symbol to headline in a description: prefer the
/// token that is not a wrapped-native or stablecoin, fall back to the
/// first one.
pub fn headline_symbol<'a>(symbol0: &'a str, symbol1: &'a str) -> &'a str {
    let major0 = constants::MAJOR_TOKEN_SYMBOLS.contains(&symbol0);
    let major1 = constants::MAJOR_TOKEN_SYMBOLS.contains(&symbol1);
    match (major0, major1) {
        (true, false) => symbol1,
        _ => symbol0,
    }
}
