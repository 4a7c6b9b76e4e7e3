// Copyright (c) 2023 The Sia Foundation

//! Transaction hash APDUs
//!
//! Transactions are streamed in the Sia binary encoding, prefixed on the
//! first chunk by a [TxnHashInit] header, with following data sent via
//! [TxnHashChunk]s. The device decodes the transaction incrementally and
//! responds with a [TxnInfo] until the transaction is complete, at which
//! point the signature hash is returned (via [TxnHashResp]) or signed
//! (via [SignatureResp][crate::sign_hash::SignatureResp]) following user
//! approval.

use encdec::{Decode, DecodeOwned, Encode};

use super::{ApduError, ApduStatic, Instruction, P1_FIRST, P1_MORE, SIA_APDU_CLA};
use crate::{encdec_bitflags, helpers::arr, state::TxnState};

bitflags::bitflags! {
    /// Transaction hash flags, transmitted via P2
    pub struct TxnFlags: u8 {
        /// Sign the computed hash with the provided key index
        const SIGN = 1 << 0;

        /// Decode transaction using the v2 encoding
        const V2 = 1 << 1;
    }
}

encdec_bitflags!(TxnFlags);

/// Length of the [TxnHashInit] header
pub const TXN_INIT_HEADER_LEN: usize = 10;

/// Start a transaction hash operation, carrying the first chunk of
/// transaction data.
///
/// Flags are transmitted via P2 and are not part of the payload.
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                           KEY_INDEX                           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |           SIG_INDEX           |       CHANGE_INDEX (0..2)     |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |       CHANGE_INDEX (2..4)     |                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+                               +
/// /                        TRANSACTION_DATA                       /
/// /                       (variable length)                       /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Debug)]
pub struct TxnHashInit<'a> {
    /// Operation flags (P2)
    pub flags: TxnFlags,
    /// Key index used for signing (ignored unless [TxnFlags::SIGN] is set)
    pub key_index: u32,
    /// Index of the transaction signature being computed
    pub sig_index: u16,
    /// Key index of the change address, outputs to which are not displayed
    pub change_index: u32,
    /// Transaction data
    pub data: &'a [u8],
}

impl<'a> TxnHashInit<'a> {
    /// Create a new [TxnHashInit] APDU
    pub fn new(
        flags: TxnFlags,
        key_index: u32,
        sig_index: u16,
        change_index: u32,
        data: &'a [u8],
    ) -> Self {
        Self {
            flags,
            key_index,
            sig_index,
            change_index,
            data,
        }
    }

    /// Set flags, used when decoding as these are transmitted via P2
    pub fn with_flags(mut self, flags: TxnFlags) -> Self {
        self.flags = flags;
        self
    }
}

impl<'a> ApduStatic for TxnHashInit<'a> {
    const CLA: u8 = SIA_APDU_CLA;
    const INS: u8 = Instruction::CalcTxnHash as u8;

    fn p1(&self) -> u8 {
        P1_FIRST
    }

    fn p2(&self) -> u8 {
        self.flags.bits()
    }
}

impl<'a> Encode for TxnHashInit<'a> {
    type Error = ApduError;

    /// Encode a [`TxnHashInit`] APDU into the provided buffer
    #[inline]
    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        let mut index = 0;

        // Check buffer length is valid
        if buff.len() < TXN_INIT_HEADER_LEN + self.data.len() {
            return Err(ApduError::InvalidLength);
        }

        // Write header
        index += self.key_index.encode(&mut buff[index..])?;
        index += self.sig_index.encode(&mut buff[index..])?;
        index += self.change_index.encode(&mut buff[index..])?;

        // Write transaction data
        buff[index..][..self.data.len()].copy_from_slice(self.data);
        index += self.data.len();

        Ok(index)
    }

    #[inline]
    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(TXN_INIT_HEADER_LEN + self.data.len())
    }
}

impl<'a> Decode<'a> for TxnHashInit<'a> {
    type Output = Self;
    type Error = ApduError;

    /// Decode a [`TxnHashInit`] APDU from the provided buffer
    #[inline]
    fn decode(buff: &'a [u8]) -> Result<(Self, usize), ApduError> {
        let mut index = 0;

        // Check header length
        if buff.len() < TXN_INIT_HEADER_LEN {
            return Err(ApduError::InvalidLength);
        }

        let (key_index, n) = u32::decode(&buff[index..])?;
        index += n;

        let (sig_index, n) = u16::decode(&buff[index..])?;
        index += n;

        let (change_index, n) = u32::decode(&buff[index..])?;
        index += n;

        // Remainder is transaction data
        let data = &buff[index..];
        index += data.len();

        Ok((
            Self {
                flags: TxnFlags::empty(),
                key_index,
                sig_index,
                change_index,
                data,
            },
            index,
        ))
    }
}

/// Continue a transaction hash operation with the next chunk of
/// transaction data.
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                        TRANSACTION_DATA                       /
/// /                       (variable length)                       /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Debug)]
pub struct TxnHashChunk<'a> {
    /// Operation flags (P2), must match those provided on init
    pub flags: TxnFlags,
    /// Transaction data
    pub data: &'a [u8],
}

impl<'a> TxnHashChunk<'a> {
    /// Create a new [TxnHashChunk] APDU
    pub fn new(flags: TxnFlags, data: &'a [u8]) -> Self {
        Self { flags, data }
    }

    /// Set flags, used when decoding as these are transmitted via P2
    pub fn with_flags(mut self, flags: TxnFlags) -> Self {
        self.flags = flags;
        self
    }
}

impl<'a> ApduStatic for TxnHashChunk<'a> {
    const CLA: u8 = SIA_APDU_CLA;
    const INS: u8 = Instruction::CalcTxnHash as u8;

    fn p1(&self) -> u8 {
        P1_MORE
    }

    fn p2(&self) -> u8 {
        self.flags.bits()
    }
}

impl<'a> Encode for TxnHashChunk<'a> {
    type Error = ApduError;

    #[inline]
    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        if buff.len() < self.data.len() {
            return Err(ApduError::InvalidLength);
        }

        buff[..self.data.len()].copy_from_slice(self.data);

        Ok(self.data.len())
    }

    #[inline]
    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(self.data.len())
    }
}

impl<'a> Decode<'a> for TxnHashChunk<'a> {
    type Output = Self;
    type Error = ApduError;

    #[inline]
    fn decode(buff: &'a [u8]) -> Result<(Self, usize), ApduError> {
        Ok((
            Self {
                flags: TxnFlags::empty(),
                data: buff,
            },
            buff.len(),
        ))
    }
}

/// Transaction hash response, returned on approval of an unsigned
/// transaction hash request.
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// /                            SIGHASH                            /
/// /                        (32-byte blake2b)                      /
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Debug, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct TxnHashResp {
    #[encdec(with = "arr")]
    pub hash: [u8; 32],
}

impl TxnHashResp {
    /// Create a new [TxnHashResp] APDU
    pub fn new(hash: [u8; 32]) -> Self {
        Self { hash }
    }
}

/// Transaction progress response, returned for each chunk while a
/// transaction is being decoded.
///
/// ## Encoding:
/// ```text
///  0                   1                   2
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     STATE     |           ELEMENTS            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Debug)]
pub struct TxnInfo {
    /// Engine state
    pub state: TxnState,
    /// Number of elements decoded for display
    pub elements: u16,
}

impl TxnInfo {
    /// Create a new [TxnInfo] APDU
    pub fn new(state: TxnState, elements: u16) -> Self {
        Self { state, elements }
    }
}

impl Encode for TxnInfo {
    type Error = ApduError;

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        let mut index = 0;

        index += self.state.encode(&mut buff[index..])?;
        index += self.elements.encode(&mut buff[index..])?;

        Ok(index)
    }

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(3)
    }
}

impl DecodeOwned for TxnInfo {
    type Output = Self;
    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self, usize), ApduError> {
        let mut index = 0;

        let (state, n) = TxnState::decode_owned(&buff[index..])?;
        index += n;

        let (elements, n) = u16::decode(&buff[index..])?;
        index += n;

        Ok((Self { state, elements }, index))
    }
}
