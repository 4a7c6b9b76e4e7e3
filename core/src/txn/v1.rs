// Copyright (c) 2023 The Sia Foundation

//! Decoder for v1 (legacy) Sia transactions.
//!
//! Transactions are encoded as a sequence of length-prefixed sections,
//! with the signature hash covering every section except the transaction
//! signatures, of which only the 48-byte prefix of the selected slot is
//! covered.

use strum::{Display, EnumIter};

use super::{
    currency::Digits, Blake2b256, Cover, Decoder, Element, ElementKind, Error, Hasher, Interrupt,
    SigHash, Status, Stream, V1_REPLAY_PREFIX,
};
use crate::helpers::Address;

/// Covered prefix of the selected transaction signature
/// (parent id, public key index, timelock)
pub const SIG_COVERED_LEN: usize = 48;

/// v1 transaction sections, in wire order
#[derive(Copy, Clone, PartialEq, Debug, Display, EnumIter)]
pub enum V1Section {
    Start,
    SiacoinInputs,
    SiacoinOutputs,
    FileContracts,
    FileContractRevisions,
    StorageProofs,
    SiafundInputs,
    SiafundOutputs,
    MinerFees,
    ArbitraryData,
    Signatures,
}

impl V1Section {
    /// Fetch the following section, `None` after signatures
    pub fn next(&self) -> Option<Self> {
        use V1Section::*;

        let s = match self {
            Start => SiacoinInputs,
            SiacoinInputs => SiacoinOutputs,
            SiacoinOutputs => FileContracts,
            FileContracts => FileContractRevisions,
            FileContractRevisions => StorageProofs,
            StorageProofs => SiafundInputs,
            SiafundInputs => SiafundOutputs,
            SiafundOutputs => MinerFees,
            MinerFees => ArbitraryData,
            ArbitraryData => Signatures,
            Signatures => return None,
        };

        Some(s)
    }

    /// Check whether a section is unsupported and must be empty
    pub fn must_be_empty(&self) -> bool {
        matches!(
            self,
            V1Section::FileContracts
                | V1Section::FileContractRevisions
                | V1Section::StorageProofs
                | V1Section::ArbitraryData
        )
    }
}

/// Streaming v1 transaction decoder
pub struct V1Decoder<H: Hasher = Blake2b256> {
    stream: Stream<H>,
    section: V1Section,
    slice_len: u64,
    slice_index: u64,
    display_index: u16,
    sig_index: u16,
    change: Option<Address>,
}

impl<H: Hasher> V1Decoder<H> {
    /// Create a new v1 decoder
    pub fn new(sig_index: u16, change: Option<Address>) -> Self {
        Self {
            stream: Stream::new(SigHash::v1()),
            section: V1Section::Start,
            slice_len: 0,
            slice_index: 0,
            display_index: 0,
            sig_index,
            change,
        }
    }

    /// Fetch the section currently being decoded
    pub fn section(&self) -> V1Section {
        self.section
    }

    fn step(&mut self) -> Result<Option<Status>, Interrupt> {
        if self.slice_index == self.slice_len {
            return self.next_section();
        }

        let c = &mut self.stream.cursor;

        match self.section {
            V1Section::SiacoinInputs => {
                c.read_hash()?;
                c.skip_unlock_conditions()?;
                self.input()
            }
            V1Section::SiafundInputs => {
                c.read_hash()?;
                c.skip_unlock_conditions()?;
                c.read_hash()?;
                self.input()
            }
            V1Section::SiacoinOutputs => {
                let value = c.read_currency()?;
                let address = c.read_address()?;
                self.output(ElementKind::SiacoinOutput, value, Some(address))
            }
            V1Section::SiafundOutputs => {
                let value = c.read_currency()?;
                let address = c.read_address()?;
                c.skip_currency()?;
                self.output(ElementKind::SiafundOutput, value, Some(address))
            }
            V1Section::MinerFees => {
                let value = c.read_currency()?;
                self.output(ElementKind::MinerFee, value, None)
            }
            V1Section::Signatures => {
                c.read_hash()?;
                c.read_u64()?;
                c.read_u64()?;
                c.read_covered_fields()?;
                c.skip_prefixed()?;

                let cover = match self.slice_index == self.sig_index as u64 {
                    true => Cover::Prefix(SIG_COVERED_LEN),
                    false => Cover::Skip,
                };
                self.stream.advance(cover)?;
                self.slice_index += 1;

                Ok(None)
            }
            // Empty sections are rejected on entry
            V1Section::Start
            | V1Section::FileContracts
            | V1Section::FileContractRevisions
            | V1Section::StorageProofs
            | V1Section::ArbitraryData => Err(Error::NonEmptySection.into()),
        }
    }

    /// Read the next section length prefix, finalizing after signatures
    fn next_section(&mut self) -> Result<Option<Status>, Interrupt> {
        let next = match self.section.next() {
            Some(v) => v,
            None => return self.stream.finish(),
        };

        let len = self.stream.cursor.read_u64()?;

        if next.must_be_empty() && len != 0 {
            return Err(Error::NonEmptySection.into());
        }
        if next == V1Section::Signatures && self.sig_index as u64 >= len {
            return Err(Error::SignatureIndex.into());
        }

        // Signature count is not covered
        let cover = match next {
            V1Section::Signatures => Cover::Skip,
            _ => Cover::Full,
        };
        self.stream.advance(cover)?;

        #[cfg(feature = "log")]
        log::debug!("v1 section: {} ({} elements)", next, len);

        self.section = next;
        self.slice_len = len;
        self.slice_index = 0;
        self.display_index = 0;

        Ok(None)
    }

    fn input(&mut self) -> Result<Option<Status>, Interrupt> {
        self.stream.hash.update(&[V1_REPLAY_PREFIX])?;
        self.stream.advance(Cover::Full)?;
        self.slice_index += 1;

        Ok(None)
    }

    fn output(
        &mut self,
        kind: ElementKind,
        value: Digits,
        address: Option<Address>,
    ) -> Result<Option<Status>, Interrupt> {
        self.stream.advance(Cover::Full)?;
        self.slice_index += 1;

        // Change outputs are hashed but not displayed
        if address.is_some() && address == self.change {
            return Ok(None);
        }

        self.display_index = self.display_index.saturating_add(1);

        Ok(Some(Status::Element(Element {
            kind,
            index: self.display_index,
            value,
            address,
        })))
    }
}

impl<H: Hasher> Decoder for V1Decoder<H> {
    fn update(&mut self, data: &[u8]) -> Result<(), Error> {
        self.stream.push(data)
    }

    fn available(&self) -> usize {
        self.stream.cursor.available()
    }

    fn next_element(&mut self) -> Result<Status, Error> {
        loop {
            if let Some(r) = self.stream.outcome() {
                return r;
            }

            let r = self.step();
            if let Some(s) = self.stream.resolve(r)? {
                return Ok(s);
            }
        }
    }
}
