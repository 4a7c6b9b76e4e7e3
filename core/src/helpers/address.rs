// Copyright (c) 2023 The Sia Foundation

use core::fmt::{self, Display};

use heapless::String;

use crate::txn::{Blake2b256, Hasher};

pub use ledger_sia_apdu::public_key::ADDRESS_LEN;

/// Length of the address checksum in bytes
pub const CHECKSUM_LEN: usize = 6;

/// Public key algorithm specifier for standard unlock conditions
const ED25519_SPECIFIER: [u8; 16] = *b"ed25519\0\0\0\0\0\0\0\0\0";

const LEAF_PREFIX: u8 = 0x00;
const NODE_PREFIX: u8 = 0x01;

/// Sia address (unlock hash).
///
/// Displayed as 64 hex characters of unlock hash followed by
/// 12 hex characters of checksum.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct Address(pub [u8; 32]);

impl Address {
    /// Compute the standard address for an ed25519 public key
    pub fn from_public_key(public_key: &[u8; 32]) -> Self {
        Self(unlock_hash(public_key))
    }

    /// Fetch raw address bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Compute the address checksum
    pub fn checksum(&self) -> [u8; CHECKSUM_LEN] {
        let h = Blake2b256::digest(&self.0);

        let mut c = [0u8; CHECKSUM_LEN];
        c.copy_from_slice(&h[..CHECKSUM_LEN]);
        c
    }

    /// Encode address and checksum as lower-case hex
    pub fn to_hex(&self) -> [u8; ADDRESS_LEN] {
        let mut s = [0u8; ADDRESS_LEN];

        // Output lengths are fixed so encoding can not fail
        let _ = hex::encode_to_slice(self.0, &mut s[..64]);
        let _ = hex::encode_to_slice(self.checksum(), &mut s[64..]);

        s
    }

    /// Encode address to a fixed capacity string
    pub fn to_str(&self) -> String<ADDRESS_LEN> {
        let h = self.to_hex();

        let mut s = String::new();
        if let Ok(v) = core::str::from_utf8(&h) {
            let _ = s.push_str(v);
        }
        s
    }
}

impl From<[u8; 32]> for Address {
    fn from(h: [u8; 32]) -> Self {
        Self(h)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_str())
    }
}

fn leaf(parts: &[&[u8]]) -> [u8; 32] {
    let mut h = Blake2b256::default();
    h.update(&[LEAF_PREFIX]);
    for p in parts {
        h.update(p);
    }
    h.finalize()
}

fn node(l: &[u8; 32], r: &[u8; 32]) -> [u8; 32] {
    let mut h = Blake2b256::default();
    h.update(&[NODE_PREFIX]);
    h.update(l);
    h.update(r);
    h.finalize()
}

/// Compute the unlock hash for single-signature unlock conditions
/// with no timelock, being the merkle root of the timelock,
/// public key, and signatures required leaves.
pub fn unlock_hash(public_key: &[u8; 32]) -> [u8; 32] {
    let timelock = leaf(&[&0u64.to_le_bytes()]);
    let key = leaf(&[&ED25519_SPECIFIER, &32u64.to_le_bytes(), public_key]);
    let sigs_required = leaf(&[&1u64.to_le_bytes()]);

    node(&node(&timelock, &key), &sigs_required)
}
