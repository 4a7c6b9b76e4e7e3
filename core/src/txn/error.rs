// Copyright (c) 2023 The Sia Foundation

/// Transaction decoder errors.
///
/// All variants are fatal to the transaction being decoded, running
/// out of input is reported via [Status::NeedMoreData][super::Status]
/// rather than as an error.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "thiserror", derive(thiserror::Error))]
#[repr(u8)]
pub enum Error {
    /// Currency length exceeds the maximum encodable value
    #[cfg_attr(feature = "thiserror", error("currency length exceeds maximum"))]
    CurrencyTooLarge = 0x00,

    /// Covered fields do not cover the whole transaction
    #[cfg_attr(feature = "thiserror", error("unsupported covered fields"))]
    CoveredFields = 0x01,

    /// A section that must be absent was present
    #[cfg_attr(feature = "thiserror", error("unexpected non-empty section"))]
    NonEmptySection = 0x02,

    /// Signature index exceeds the number of transaction signatures
    #[cfg_attr(feature = "thiserror", error("signature index out of range"))]
    SignatureIndex = 0x03,

    /// Buffer filled without completing an element
    #[cfg_attr(feature = "thiserror", error("buffer exhausted mid-element"))]
    BufferExhausted = 0x04,

    /// Chunk exceeds remaining buffer capacity
    #[cfg_attr(feature = "thiserror", error("chunk exceeds buffer capacity"))]
    Capacity = 0x05,

    /// Signature hash already finalized
    #[cfg_attr(feature = "thiserror", error("hash already finalized"))]
    Finalized = 0x06,

    /// Value cannot be rendered within the display buffer
    #[cfg_attr(feature = "thiserror", error("value exceeds display capacity"))]
    Format = 0x07,
}

impl Error {
    /// Check whether an error results from malformed transaction data
    /// (as opposed to a host contract violation)
    pub fn is_structural(&self) -> bool {
        !matches!(self, Error::Capacity | Error::Finalized | Error::Format)
    }
}

/// Interrupted decode step, either awaiting input or failed
#[derive(Copy, Clone, PartialEq, Debug)]
pub(crate) enum Interrupt {
    /// Insufficient buffered data to complete the current element
    Partial,
    /// Decoding failed
    Invalid(Error),
}

impl From<Error> for Interrupt {
    fn from(e: Error) -> Self {
        Interrupt::Invalid(e)
    }
}
