// Copyright (c) 2023 The Sia Foundation

//! Protocol / APDU definitions for Sia app communication
//!
//! This module provides a protocol specification and reference implementation for communication
//! with Sia hardware wallets.
//!
//! APDUs use a primitive binary encoding to simplify implementation on constrained platforms.
//! Header fields are little-endian, transaction payloads are forwarded verbatim in the Sia
//! binary encoding and are split across as many [`P1_MORE`] chunks as required.
//!

#![no_std]

use core::fmt::Debug;

use num_enum::TryFromPrimitive;
use strum::{Display, EnumIter, EnumString, EnumVariantNames};

pub use ledger_proto::{ApduError, ApduReq, ApduStatic};

pub mod prelude;
pub mod public_key;
pub mod sign_hash;
pub mod state;
pub mod txn;
pub mod version;

mod helpers;

/// Sia APDU Class
pub const SIA_APDU_CLA: u8 = 0xe0;

/// Maximum payload carried by a single APDU
pub const MAX_APDU_DATA: usize = 255;

/// First chunk of a multi-chunk transfer
pub const P1_FIRST: u8 = 0x00;

/// Subsequent chunks of a multi-chunk transfer
pub const P1_MORE: u8 = 0x80;

/// Sia APDU instruction codes
#[derive(Copy, Clone, Debug, PartialEq, TryFromPrimitive)]
#[repr(u8)]
pub enum Instruction {
    /// Fetch application version
    GetVersion = 0x01,

    /// Fetch a public key / address for a key index
    GetPublicKey = 0x02,

    /// Sign a caller-provided 32-byte hash
    SignHash = 0x04,

    /// Stream a transaction to compute (and optionally sign) its signature hash
    CalcTxnHash = 0x08,
}

/// Status words returned with each response APDU
#[derive(
    Copy, Clone, PartialEq, Debug, EnumString, Display, EnumVariantNames, EnumIter, TryFromPrimitive,
)]
#[repr(u16)]
pub enum StatusWord {
    /// Command completed
    Ok = 0x9000,
    /// Host violated the transport contract
    DeveloperErr = 0x6B00,
    /// Invalid parameter or malformed transaction
    InvalidParam = 0x6B01,
    /// Transaction context initialised out of order
    ImproperInit = 0x6B02,
    /// User rejected the request
    UserRejected = 0x6985,
    /// Unknown instruction
    InsNotSupported = 0x6D00,
}

impl StatusWord {
    /// Encode status word as transmitted (big-endian)
    pub fn to_bytes(&self) -> [u8; 2] {
        (*self as u16).to_be_bytes()
    }
}

/// Helper macro for encoding `bitflags` types
#[macro_export]
macro_rules! encdec_bitflags {
    ($b:ty) => {
        impl encdec::Encode for $b {
            type Error = ApduError;

            fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
                let bits: u8 = self.bits();
                encdec::Encode::encode(&bits, buff).map_err(|e| e.into())
            }

            fn encode_len(&self) -> Result<usize, Self::Error> {
                let bits: u8 = self.bits();
                encdec::Encode::encode_len(&bits).map_err(|e| e.into())
            }
        }

        impl encdec::DecodeOwned for $b {
            type Output = $b;
            type Error = ApduError;

            fn decode_owned(buff: &[u8]) -> Result<(Self, usize), Self::Error> {
                if buff.is_empty() {
                    return Err(ApduError::InvalidLength);
                }
                let v = <$b>::from_bits_truncate(buff[0]);
                Ok((v, 1))
            }
        }
    };
}
