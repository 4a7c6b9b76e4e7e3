// Copyright (c) 2023 The Sia Foundation

//! Public key APDUs, for fetching ed25519 keys and their Sia addresses

use encdec::{Decode, Encode};

use super::{ApduError, ApduStatic, Instruction, SIA_APDU_CLA};
use crate::helpers::arr;

/// Length of a hex encoded address (32-byte hash + 6-byte checksum)
pub const ADDRESS_LEN: usize = 76;

/// P2 value requesting the address be shown for comparison
pub const P2_DISPLAY_ADDRESS: u8 = 0x00;

/// P2 value requesting the public key be shown for comparison
pub const P2_DISPLAY_PUBKEY: u8 = 0x01;

/// Public key request APDU.
///
/// Requests the ed25519 public key and address for a key index,
/// derived at `44'/93'/KEY_INDEX'/0'/0'`.
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                           KEY_INDEX                           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Debug, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct PublicKeyReq {
    /// Key index
    pub key_index: u32,
}

impl PublicKeyReq {
    /// Create a new [PublicKeyReq] APDU
    pub fn new(key_index: u32) -> Self {
        Self { key_index }
    }
}

impl ApduStatic for PublicKeyReq {
    const CLA: u8 = SIA_APDU_CLA;
    const INS: u8 = Instruction::GetPublicKey as u8;
}

/// Public key response APDU
///
/// Contains the ed25519 public key and the hex encoded standard address
/// (unlock hash and checksum) for this key.
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// /                          PUBLIC_KEY                           /
/// /                   (32-byte ed25519 public key)                /
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// /                            ADDRESS                            /
/// /                       (76-byte ASCII hex)                     /
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Debug, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct PublicKeyResp {
    /// ed25519 public key
    #[encdec(with = "arr")]
    pub public_key: [u8; 32],

    /// Hex encoded address
    #[encdec(with = "arr")]
    pub address: [u8; ADDRESS_LEN],
}

impl PublicKeyResp {
    /// Create a new [PublicKeyResp] APDU
    pub fn new(public_key: [u8; 32], address: [u8; ADDRESS_LEN]) -> Self {
        Self {
            public_key,
            address,
        }
    }

    /// Fetch address as a string
    pub fn address_str(&self) -> Result<&str, ApduError> {
        core::str::from_utf8(&self.address).map_err(|_| ApduError::InvalidEncoding)
    }
}
