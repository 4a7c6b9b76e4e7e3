// Copyright (c) 2023 The Sia Foundation

//! Key derivation and address helpers

mod address;
pub use address::{unlock_hash, Address, ADDRESS_LEN, CHECKSUM_LEN};

/// SLIP-0044 coin type for Sia
pub const SIA_COIN_TYPE: u32 = 93;

/// Change index indicating no change output should be suppressed
pub const NO_CHANGE_INDEX: u32 = u32::MAX;

/// Hardened derivation flag
const HARDENED: u32 = 1 << 31;

/// Compute the SLIP-0010 derivation path for a key index,
/// `m/44'/93'/index'/0'/0'`
pub const fn key_path(index: u32) -> [u32; 5] {
    [
        44 | HARDENED,
        SIA_COIN_TYPE | HARDENED,
        index | HARDENED,
        HARDENED,
        HARDENED,
    ]
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn derivation_paths() {
        assert_eq!(
            key_path(0),
            [0x8000_002c, 0x8000_005d, 0x8000_0000, 0x8000_0000, 0x8000_0000]
        );
        assert_eq!(key_path(7)[2], 0x8000_0007);
    }
}
