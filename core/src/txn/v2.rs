// Copyright (c) 2023 The Sia Foundation

//! Decoder for v2 Sia transactions.
//!
//! The v2 signature hash is primed with a domain separator and replay
//! prefix, then covers the full encoding of every section. Sections
//! following attestations are not length-prefixed: arbitrary data and
//! the foundation address update must be absent, and a single miner fee
//! terminates the transaction.

use strum::{Display, EnumIter};

use super::{
    currency::Digits, Blake2b256, Cover, Decoder, Element, ElementKind, Error, Hasher, Interrupt,
    SigHash, Status, Stream,
};
use crate::helpers::Address;

/// Length of an attestation public key
const ATTESTATION_KEY_LEN: u64 = 32;

/// Length of an attestation signature
const ATTESTATION_SIG_LEN: u64 = 64;

/// v2 transaction sections, in wire order
#[derive(Copy, Clone, PartialEq, Debug, Display, EnumIter)]
pub enum V2Section {
    Start,
    SiacoinInputs,
    SiacoinOutputs,
    SiafundInputs,
    SiafundOutputs,
    FileContracts,
    FileContractRevisions,
    FileContractResolutions,
    Attestations,
    ArbitraryData,
    FoundationAddress,
    MinerFee,
}

impl V2Section {
    /// Fetch the following section, `None` after the miner fee
    pub fn next(&self) -> Option<Self> {
        use V2Section::*;

        let s = match self {
            Start => SiacoinInputs,
            SiacoinInputs => SiacoinOutputs,
            SiacoinOutputs => SiafundInputs,
            SiafundInputs => SiafundOutputs,
            SiafundOutputs => FileContracts,
            FileContracts => FileContractRevisions,
            FileContractRevisions => FileContractResolutions,
            FileContractResolutions => Attestations,
            Attestations => ArbitraryData,
            ArbitraryData => FoundationAddress,
            FoundationAddress => MinerFee,
            MinerFee => return None,
        };

        Some(s)
    }

    /// Check whether a section is unsupported and must be empty
    pub fn must_be_empty(&self) -> bool {
        matches!(
            self,
            V2Section::FileContracts
                | V2Section::FileContractRevisions
                | V2Section::FileContractResolutions
        )
    }
}

/// Streaming v2 transaction decoder
pub struct V2Decoder<H: Hasher = Blake2b256> {
    stream: Stream<H>,
    section: V2Section,
    slice_len: u64,
    slice_index: u64,
    display_index: u16,
    change: Option<Address>,
}

impl<H: Hasher> V2Decoder<H> {
    /// Create a new v2 decoder.
    ///
    /// The v2 signature hash covers the whole transaction independent of
    /// signature slots, `_sig_index` is accepted for parity with v1.
    pub fn new(_sig_index: u16, change: Option<Address>) -> Self {
        Self {
            stream: Stream::new(SigHash::v2()),
            section: V2Section::Start,
            slice_len: 0,
            slice_index: 0,
            display_index: 0,
            change,
        }
    }

    /// Fetch the section currently being decoded
    pub fn section(&self) -> V2Section {
        self.section
    }

    fn step(&mut self) -> Result<Option<Status>, Interrupt> {
        if self.slice_index == self.slice_len {
            return self.next_section();
        }

        let c = &mut self.stream.cursor;

        match self.section {
            V2Section::SiacoinInputs | V2Section::SiafundInputs => {
                c.read_hash()?;
                self.skip()
            }
            V2Section::SiacoinOutputs => {
                let value = c.read_currency()?;
                let address = c.read_address()?;
                self.output(ElementKind::SiacoinOutput, value, Some(address))
            }
            V2Section::SiafundOutputs => {
                let value = c.read_currency()?;
                let address = c.read_address()?;
                c.skip_currency()?;
                self.output(ElementKind::SiafundOutput, value, Some(address))
            }
            V2Section::Attestations => {
                c.seek(ATTESTATION_KEY_LEN)?;
                c.skip_prefixed()?;
                c.skip_prefixed()?;
                c.seek(ATTESTATION_SIG_LEN)?;
                self.skip()
            }
            V2Section::MinerFee => {
                let value = c.read_currency()?;
                self.output(ElementKind::MinerFee, value, None)
            }
            // Sections without elements are rejected on entry
            V2Section::Start
            | V2Section::FileContracts
            | V2Section::FileContractRevisions
            | V2Section::FileContractResolutions
            | V2Section::ArbitraryData
            | V2Section::FoundationAddress => Err(Error::NonEmptySection.into()),
        }
    }

    /// Enter the next section, finalizing after the miner fee
    fn next_section(&mut self) -> Result<Option<Status>, Interrupt> {
        let next = match self.section.next() {
            Some(v) => v,
            None => return self.stream.finish(),
        };

        let c = &mut self.stream.cursor;

        let len = match next {
            // Arbitrary data length must be zero
            V2Section::ArbitraryData => {
                if c.read_u64()? != 0 {
                    return Err(Error::NonEmptySection.into());
                }
                0
            }
            // Foundation address update must be absent
            V2Section::FoundationAddress => {
                if c.read_u8()? != 0 {
                    return Err(Error::NonEmptySection.into());
                }
                0
            }
            // Single implicit miner fee
            V2Section::MinerFee => 1,
            _ => {
                let len = c.read_u64()?;
                if next.must_be_empty() && len != 0 {
                    return Err(Error::NonEmptySection.into());
                }
                len
            }
        };

        self.stream.advance(Cover::Full)?;

        #[cfg(feature = "log")]
        log::debug!("v2 section: {} ({} elements)", next, len);

        self.section = next;
        self.slice_len = len;
        self.slice_index = 0;
        self.display_index = 0;

        Ok(None)
    }

    fn skip(&mut self) -> Result<Option<Status>, Interrupt> {
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

impl<H: Hasher> Decoder for V2Decoder<H> {
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

#[cfg(test)]
mod test {
    extern crate std;

    use std::vec::Vec;

    use super::*;
    use crate::txn::V2_SIG_DISTINGUISHER;

    fn u64le(b: &mut Vec<u8>, v: u64) {
        b.extend_from_slice(&v.to_le_bytes());
    }

    fn currency(b: &mut Vec<u8>, v: u64) {
        let raw = v.to_be_bytes();
        let start = raw.iter().position(|b| *b != 0).unwrap_or(raw.len());
        u64le(b, (raw.len() - start) as u64);
        b.extend_from_slice(&raw[start..]);
    }

    /// Build a v2 transaction with one siacoin input, the provided
    /// siacoin outputs, `attestations` attestations and a miner fee
    fn build(outputs: &[(u64, [u8; 32])], attestations: usize) -> Vec<u8> {
        let mut b = Vec::new();

        u64le(&mut b, 1);
        b.extend_from_slice(&[0x11; 32]);

        u64le(&mut b, outputs.len() as u64);
        for (v, a) in outputs {
            currency(&mut b, *v);
            b.extend_from_slice(a);
        }

        // Siafund inputs and outputs, file contracts, revisions, resolutions
        for _ in 0..5 {
            u64le(&mut b, 0);
        }

        u64le(&mut b, attestations as u64);
        for _ in 0..attestations {
            b.extend_from_slice(&[0x33; 32]);
            u64le(&mut b, 3);
            b.extend_from_slice(b"key");
            u64le(&mut b, 5);
            b.extend_from_slice(b"value");
            b.extend_from_slice(&[0x44; 64]);
        }

        // Arbitrary data, foundation address
        u64le(&mut b, 0);
        b.push(0);

        currency(&mut b, 1000);

        b
    }

    fn expected(b: &[u8]) -> [u8; 32] {
        let mut d = V2_SIG_DISTINGUISHER.to_vec();
        d.push(2);
        d.extend_from_slice(b);

        Blake2b256::digest(&d)
    }

    fn decode(d: &mut V2Decoder, data: &[u8]) -> Result<(Vec<Element>, [u8; 32]), Error> {
        let mut elements = Vec::new();

        for c in data.chunks(100) {
            d.update(c)?;

            loop {
                match d.next_element()? {
                    Status::NeedMoreData => break,
                    Status::Element(e) => elements.push(e),
                    Status::Finished(h) => return Ok((elements, h)),
                }
            }
        }

        panic!("transaction not finished");
    }

    #[test]
    fn decode_outputs() {
        let b = build(&[(10, [0xaa; 32]), (20, [0xbb; 32])], 0);

        let mut d: V2Decoder = V2Decoder::new(0, None);
        let (elements, hash) = decode(&mut d, &b).unwrap();

        assert_eq!(elements.len(), 3);
        assert_eq!(elements[0].kind, ElementKind::SiacoinOutput);
        assert_eq!(elements[0].value.as_str(), "10");
        assert_eq!(elements[1].index, 2);
        assert_eq!(elements[1].address, Some(Address([0xbb; 32])));
        assert_eq!(elements[2].kind, ElementKind::MinerFee);
        assert_eq!(elements[2].index, 1);
        assert_eq!(elements[2].value.as_str(), "1000");

        assert_eq!(hash, expected(&b));
        assert_eq!(d.section(), V2Section::MinerFee);
        assert_eq!(d.next_element(), Ok(Status::Finished(hash)));
    }

    #[test]
    fn attestations() {
        let b = build(&[(10, [0xaa; 32])], 2);

        let mut d: V2Decoder = V2Decoder::new(0, None);
        let (elements, hash) = decode(&mut d, &b).unwrap();

        assert_eq!(elements.len(), 2);
        assert_eq!(hash, expected(&b));
    }

    #[test]
    fn change_suppressed() {
        let b = build(&[(10, [0xaa; 32]), (20, [0xbb; 32])], 0);

        let mut d: V2Decoder = V2Decoder::new(0, Some(Address([0xaa; 32])));
        let (elements, hash) = decode(&mut d, &b).unwrap();

        assert_eq!(hash, expected(&b));
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].value.as_str(), "20");
        assert_eq!(elements[0].index, 1);
    }

    #[test]
    fn file_contracts_rejected() {
        let mut b = Vec::new();
        for _ in 0..4 {
            u64le(&mut b, 0);
        }
        u64le(&mut b, 1);

        let mut d: V2Decoder = V2Decoder::new(0, None);
        d.update(&b).unwrap();
        assert_eq!(d.next_element(), Err(Error::NonEmptySection));
    }

    #[test]
    fn arbitrary_data_rejected() {
        let mut b = build(&[], 0);

        // Arbitrary data length follows the input id and 8 section lengths
        b[8 * 8 + 32] = 1;

        let mut d: V2Decoder = V2Decoder::new(0, None);
        assert_eq!(decode(&mut d, &b).err(), Some(Error::NonEmptySection));
    }

    #[test]
    fn foundation_address_rejected() {
        let mut b = build(&[], 0);

        // Foundation address flag follows arbitrary data
        b[9 * 8 + 32] = 1;

        let mut d: V2Decoder = V2Decoder::new(0, None);
        assert_eq!(decode(&mut d, &b).err(), Some(Error::NonEmptySection));
    }

    #[test]
    fn chunk_independence() {
        let b = build(&[(10, [0xaa; 32]), (20, [0xbb; 32])], 1);

        let mut d: V2Decoder = V2Decoder::new(0, None);
        let (e1, h1) = decode(&mut d, &b).unwrap();

        let mut d: V2Decoder = V2Decoder::new(0, None);
        let mut e2 = Vec::new();
        let mut h2 = None;
        for c in b.chunks(1) {
            d.update(c).unwrap();
            loop {
                match d.next_element().unwrap() {
                    Status::NeedMoreData => break,
                    Status::Element(e) => e2.push(e),
                    Status::Finished(h) => h2 = Some(h),
                }
                if h2.is_some() {
                    break;
                }
            }
        }

        assert_eq!(e1, e2);
        assert_eq!(Some(h1), h2);
    }
}
