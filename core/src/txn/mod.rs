// Copyright (c) 2023 The Sia Foundation

//! Streaming Sia transaction decoder.
//!
//! Transactions are pushed in chunks of up to [CHUNK_MAX] bytes via
//! [Decoder::update], then [Decoder::next_element] is polled until
//! [Status::NeedMoreData] (push the next chunk) or [Status::Finished]
//! (signature hash available). Displayable elements are returned as
//! they are decoded, while every covered byte is absorbed into the
//! signature hash exactly once, in wire order.
//!
//! ```text
//!   chunk -> Cursor -> V1Decoder / V2Decoder -> Element
//!                             |
//!                             +-> SigHash -> [u8; 32]
//! ```

use static_assertions::const_assert;

mod error;
pub use error::Error;
pub(crate) use error::Interrupt;

mod cursor;
pub use cursor::Cursor;

pub mod currency;

mod sighash;
pub use sighash::{
    Blake2b256, Cover, Hasher, SigHash, V1_REPLAY_PREFIX, V2_REPLAY_PREFIX, V2_SIG_DISTINGUISHER,
};

mod fields;

mod element;
pub use element::{Element, ElementKind, MAX_LABEL_LEN};

mod v1;
pub use v1::{V1Decoder, V1Section};

mod v2;
pub use v2::{V2Decoder, V2Section};

use crate::helpers::Address;

/// Decoder staging buffer length
pub const BUFF_LEN: usize = 510;

/// Maximum chunk length accepted per [Decoder::update]
pub const CHUNK_MAX: usize = 255;

// Elements up to CHUNK_MAX bytes must decode when streamed in maximum chunks.
// Longer elements decode while the host keeps chunks within [Decoder::available].
const_assert!(BUFF_LEN >= 2 * CHUNK_MAX);

/// Decoder status, returned by [Decoder::next_element]
#[derive(Clone, PartialEq, Debug)]
pub enum Status {
    /// Insufficient data buffered, push the next chunk
    NeedMoreData,
    /// Displayable element decoded
    Element(Element),
    /// Transaction fully decoded, containing the signature hash
    Finished([u8; 32]),
}

/// Transaction encoding format
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Format {
    V1,
    V2,
}

/// Streaming transaction decoder
pub trait Decoder {
    /// Append a chunk of transaction data
    fn update(&mut self, data: &[u8]) -> Result<(), Error>;

    /// Maximum length of the next [Decoder::update] chunk
    fn available(&self) -> usize;

    /// Decode until the next displayable element, the end of
    /// buffered data, or the end of the transaction
    fn next_element(&mut self) -> Result<Status, Error>;
}

/// Transaction decoder dispatching on [Format]
pub enum TxnDecoder<H: Hasher = Blake2b256> {
    V1(V1Decoder<H>),
    V2(V2Decoder<H>),
}

impl<H: Hasher> TxnDecoder<H> {
    /// Create a decoder for the provided format, computing the signature
    /// hash for `sig_index` and suppressing outputs to `change`
    pub fn new(format: Format, sig_index: u16, change: Option<Address>) -> Self {
        match format {
            Format::V1 => Self::V1(V1Decoder::new(sig_index, change)),
            Format::V2 => Self::V2(V2Decoder::new(sig_index, change)),
        }
    }

    /// Fetch the decoder format
    pub fn format(&self) -> Format {
        match self {
            Self::V1(_) => Format::V1,
            Self::V2(_) => Format::V2,
        }
    }
}

impl<H: Hasher> Decoder for TxnDecoder<H> {
    fn update(&mut self, data: &[u8]) -> Result<(), Error> {
        match self {
            Self::V1(d) => d.update(data),
            Self::V2(d) => d.update(data),
        }
    }

    fn available(&self) -> usize {
        match self {
            Self::V1(d) => d.available(),
            Self::V2(d) => d.available(),
        }
    }

    fn next_element(&mut self) -> Result<Status, Error> {
        match self {
            Self::V1(d) => d.next_element(),
            Self::V2(d) => d.next_element(),
        }
    }
}

/// Buffered input and signature hash shared by decoder formats,
/// tracking the terminal outcome once decoding completes or fails.
pub(crate) struct Stream<H: Hasher> {
    pub cursor: Cursor,
    pub hash: SigHash<H>,
    outcome: Option<Result<[u8; 32], Error>>,
}

impl<H: Hasher> Stream<H> {
    pub fn new(hash: SigHash<H>) -> Self {
        Self {
            cursor: Cursor::new(),
            hash,
            outcome: None,
        }
    }

    /// Push a chunk, rejected once decoding has completed or failed
    pub fn push(&mut self, data: &[u8]) -> Result<(), Error> {
        match self.outcome {
            Some(Err(e)) => Err(e),
            Some(Ok(_)) => Err(Error::Finalized),
            None => self.cursor.push(data),
        }
    }

    /// Terminal status if decoding has completed or failed
    pub fn outcome(&self) -> Option<Result<Status, Error>> {
        self.outcome.map(|r| r.map(Status::Finished))
    }

    /// Absorb the consumed element per `cover` and drop it from the buffer
    pub fn advance(&mut self, cover: Cover) -> Result<(), Interrupt> {
        self.hash.absorb(self.cursor.consumed(), cover)?;
        self.cursor.compact();
        Ok(())
    }

    /// Finalize the signature hash
    pub fn finish(&mut self) -> Result<Option<Status>, Interrupt> {
        let h = self.hash.finalize()?;
        Ok(Some(Status::Finished(h)))
    }

    /// Resolve the result of a decode step.
    ///
    /// `Ok(None)` indicates decoding should continue, partial reads rewind
    /// the cursor and request more data unless the buffer is full.
    pub fn resolve(
        &mut self,
        r: Result<Option<Status>, Interrupt>,
    ) -> Result<Option<Status>, Error> {
        match r {
            Ok(Some(Status::Finished(h))) => {
                self.outcome = Some(Ok(h));
                Ok(Some(Status::Finished(h)))
            }
            Ok(s) => Ok(s),
            Err(Interrupt::Partial) => {
                self.cursor.rewind();

                if self.cursor.is_exhausted() {
                    return Err(self.fail(Error::BufferExhausted));
                }

                Ok(Some(Status::NeedMoreData))
            }
            Err(Interrupt::Invalid(e)) => Err(self.fail(e)),
        }
    }

    fn fail(&mut self, e: Error) -> Error {
        #[cfg(feature = "log")]
        log::warn!("transaction decode failed: {:?}", e);

        self.outcome = Some(Err(e));
        e
    }
}
