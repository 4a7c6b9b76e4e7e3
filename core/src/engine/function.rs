// Copyright (c) 2023 The Sia Foundation

use heapless::Vec;

use ledger_sia_apdu::txn::TxnFlags;

use super::{Error, MAX_ELEMENTS};
use crate::{
    helpers::Address,
    txn::{Decoder, Element, Format, Status, TxnDecoder},
};

/// Active engine operation
pub struct Function {
    inner: FunctionType,
}

impl Default for Function {
    fn default() -> Self {
        Self::new()
    }
}

/// Enum for internal state machines to allow storage to be shared between functions
#[allow(clippy::large_enum_variant)]
enum FunctionType {
    None,

    /// Transaction decoding / hashing
    Txn(TxnContext),

    /// Signing a provided hash
    SignHash { key_index: u32, hash: [u8; 32] },
}

/// Transaction hashing context
pub struct TxnContext {
    decoder: TxnDecoder,
    elements: Vec<Element, MAX_ELEMENTS>,
    key_index: u32,
    flags: TxnFlags,
    hash: Option<[u8; 32]>,
}

/// Hash awaiting user approval
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct PendingHash {
    /// Key index for signing
    pub key_index: u32,
    /// Hash to be returned or signed
    pub hash: [u8; 32],
    /// Whether the hash should be signed
    pub sign: bool,
}

impl Function {
    /// Create a new / empty function context
    pub const fn new() -> Self {
        Self {
            inner: FunctionType::None,
        }
    }

    /// Clear the active function
    pub fn clear(&mut self) {
        self.inner = FunctionType::None;
    }

    /// Setup transaction context, replacing any existing function
    pub fn txn_init(
        &mut self,
        key_index: u32,
        sig_index: u16,
        change: Option<Address>,
        flags: TxnFlags,
    ) {
        let format = match flags.contains(TxnFlags::V2) {
            true => Format::V2,
            false => Format::V1,
        };

        self.inner = FunctionType::Txn(TxnContext {
            decoder: TxnDecoder::new(format, sig_index, change),
            elements: Vec::new(),
            key_index,
            flags,
            hash: None,
        });
    }

    /// Fetch transaction context
    pub fn txn(&mut self) -> Option<&mut TxnContext> {
        match &mut self.inner {
            FunctionType::Txn(t) => Some(t),
            _ => None,
        }
    }

    /// Fetch transaction context
    pub fn txn_ref(&self) -> Option<&TxnContext> {
        match &self.inner {
            FunctionType::Txn(t) => Some(t),
            _ => None,
        }
    }

    /// Setup hash signing context
    pub fn sign_hash_init(&mut self, key_index: u32, hash: [u8; 32]) {
        self.inner = FunctionType::SignHash { key_index, hash };
    }

    /// Fetch the hash awaiting approval, if available
    pub fn pending(&self) -> Option<PendingHash> {
        match &self.inner {
            FunctionType::Txn(t) => t.hash.map(|hash| PendingHash {
                key_index: t.key_index,
                hash,
                sign: t.flags.contains(TxnFlags::SIGN),
            }),
            FunctionType::SignHash { key_index, hash } => Some(PendingHash {
                key_index: *key_index,
                hash: *hash,
                sign: true,
            }),
            FunctionType::None => None,
        }
    }
}

impl TxnContext {
    /// Push a chunk of transaction data and decode available elements,
    /// returning `true` once the transaction is complete
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn update(&mut self, data: &[u8]) -> Result<bool, Error> {
        self.decoder.update(data)?;

        loop {
            match self.decoder.next_element()? {
                Status::NeedMoreData => return Ok(false),
                Status::Element(e) => {
                    #[cfg(feature = "log")]
                    log::debug!("{}: {}", e.label(), e.formatted_value());

                    self.elements
                        .push(e)
                        .map_err(|_| Error::TooManyElements)?;
                }
                Status::Finished(h) => {
                    self.hash = Some(h);
                    return Ok(true);
                }
            }
        }
    }

    /// Fetch decoded elements
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Fetch transaction flags
    pub fn flags(&self) -> TxnFlags {
        self.flags
    }

    /// Fetch the signature hash, available once decoding completes
    pub fn hash(&self) -> Option<&[u8; 32]> {
        self.hash.as_ref()
    }
}
