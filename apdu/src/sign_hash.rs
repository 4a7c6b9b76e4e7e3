// Copyright (c) 2023 The Sia Foundation

//! Blind hash signing APDUs

use encdec::{Decode, Encode};

use super::{ApduError, ApduStatic, Instruction, SIA_APDU_CLA};
use crate::helpers::arr;

/// Request an ed25519 signature over a caller-provided 32-byte hash.
///
/// The hash is displayed for comparison and only signed following
/// user approval, returning a [SignatureResp].
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                           KEY_INDEX                           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// /                              HASH                             /
/// /                           (32-byte)                           /
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Debug, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct SignHashReq {
    /// Key index used for signing
    pub key_index: u32,

    /// Hash to be signed
    #[encdec(with = "arr")]
    pub hash: [u8; 32],
}

impl SignHashReq {
    /// Create a new [SignHashReq] APDU
    pub fn new(key_index: u32, hash: [u8; 32]) -> Self {
        Self { key_index, hash }
    }
}

impl ApduStatic for SignHashReq {
    const CLA: u8 = SIA_APDU_CLA;
    const INS: u8 = Instruction::SignHash as u8;
}

/// Signature response APDU, returned for approved [SignHashReq] and
/// signed transaction hash requests.
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// /                           SIGNATURE                           /
/// /                   (64-byte ed25519 signature)                 /
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Debug, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct SignatureResp {
    #[encdec(with = "arr")]
    pub signature: [u8; 64],
}

impl SignatureResp {
    /// Create a new [SignatureResp] APDU
    pub fn new(signature: [u8; 64]) -> Self {
        Self { signature }
    }
}
