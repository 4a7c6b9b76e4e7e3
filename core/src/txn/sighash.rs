// Copyright (c) 2023 The Sia Foundation

//! Signature hash accumulation

use blake2b_simd::{Params, State};

use super::error::Error;

/// Digest length for Sia hashes
pub const HASH_LEN: usize = 32;

/// Domain separator for v2 input signature hashes
pub const V2_SIG_DISTINGUISHER: &[u8] = b"sia/sig/input|";

/// Replay protection prefix for v1 transaction inputs
pub const V1_REPLAY_PREFIX: u8 = 1;

/// Replay protection prefix for v2 transactions
pub const V2_REPLAY_PREFIX: u8 = 2;

/// Incremental hash providing the signature hash digest
pub trait Hasher: Default {
    /// Absorb data into the hash
    fn update(&mut self, data: &[u8]);

    /// Finalize the hash, consuming the hasher
    fn finalize(self) -> [u8; 32];
}

/// BLAKE2b with a 256-bit output, as used for Sia signature hashes
/// and addresses
#[derive(Clone, Debug)]
pub struct Blake2b256(State);

impl Blake2b256 {
    fn params() -> Params {
        let mut p = Params::new();
        p.hash_length(HASH_LEN);
        p
    }

    /// One-shot digest of `data`
    pub fn digest(data: &[u8]) -> [u8; HASH_LEN] {
        let mut h = [0u8; HASH_LEN];
        h.copy_from_slice(Self::params().hash(data).as_bytes());
        h
    }
}

impl Default for Blake2b256 {
    fn default() -> Self {
        Self(Self::params().to_state())
    }
}

impl Hasher for Blake2b256 {
    fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    fn finalize(self) -> [u8; 32] {
        let mut h = [0u8; HASH_LEN];
        h.copy_from_slice(self.0.finalize().as_bytes());
        h
    }
}

/// Coverage of an element's encoding by the signature hash
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Cover {
    /// Hash the whole element
    Full,
    /// Hash a fixed-size prefix of the element
    Prefix(usize),
    /// Element is not covered
    Skip,
}

/// Signature hash accumulator.
///
/// Each covered element is absorbed exactly once, in wire order,
/// the accumulator is released on [SigHash::finalize] after which
/// no further data may be absorbed.
pub struct SigHash<H: Hasher = Blake2b256> {
    hasher: Option<H>,
}

impl<H: Hasher> SigHash<H> {
    /// Create a signature hash for v1 transactions
    pub fn v1() -> Self {
        Self {
            hasher: Some(H::default()),
        }
    }

    /// Create a signature hash for v2 transactions,
    /// primed with the domain separator and replay prefix
    pub fn v2() -> Self {
        let mut h = H::default();
        h.update(V2_SIG_DISTINGUISHER);
        h.update(&[V2_REPLAY_PREFIX]);

        Self { hasher: Some(h) }
    }

    /// Absorb raw data
    pub fn update(&mut self, data: &[u8]) -> Result<(), Error> {
        match &mut self.hasher {
            Some(h) => {
                h.update(data);
                Ok(())
            }
            None => Err(Error::Finalized),
        }
    }

    /// Absorb an element's encoding according to its coverage
    pub fn absorb(&mut self, element: &[u8], cover: Cover) -> Result<(), Error> {
        match cover {
            Cover::Full => self.update(element),
            Cover::Prefix(n) => self.update(&element[..n.min(element.len())]),
            Cover::Skip => Ok(()),
        }
    }

    /// Finalize the signature hash
    pub fn finalize(&mut self) -> Result<[u8; 32], Error> {
        match self.hasher.take() {
            Some(h) => Ok(h.finalize()),
            None => Err(Error::Finalized),
        }
    }

    /// Check whether the hash has been finalized
    pub fn is_finalized(&self) -> bool {
        self.hasher.is_none()
    }
}

#[cfg(test)]
mod test {
    use heapless::Vec;

    use super::*;

    /// Hasher recording absorbed bytes, for checking coverage
    #[derive(Default)]
    pub struct Recorder(pub Vec<u8, 4096>);

    impl Hasher for Recorder {
        fn update(&mut self, data: &[u8]) {
            self.0.extend_from_slice(data).unwrap();
        }

        fn finalize(self) -> [u8; 32] {
            Blake2b256::digest(&self.0)
        }
    }

    #[test]
    fn v2_priming() {
        let mut s = SigHash::<Recorder>::v2();
        s.update(&[0xaa]).unwrap();

        let h = s.hasher.as_ref().unwrap();
        assert_eq!(&h.0[..], b"sia/sig/input|\x02\xaa");
    }

    #[test]
    fn absorb_cover() {
        let mut s = SigHash::<Recorder>::v1();

        s.absorb(&[1, 2, 3], Cover::Full).unwrap();
        s.absorb(&[4, 5, 6], Cover::Prefix(2)).unwrap();
        s.absorb(&[7, 8, 9], Cover::Skip).unwrap();

        let h = s.hasher.as_ref().unwrap();
        assert_eq!(&h.0[..], &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn blake2b_256_vector() {
        assert_eq!(
            hex::encode(Blake2b256::digest(b"")),
            "0e5751c026e543b2e8ab2eb06099daa1d1e5df47778f7787faab45cdf12fe3a8"
        );

        // Incremental and one-shot digests match
        let mut h = Blake2b256::default();
        h.update(b"sia/");
        h.update(b"sig");
        assert_eq!(h.finalize(), Blake2b256::digest(b"sia/sig"));
    }

    #[test]
    fn finalize_once() {
        let mut s = SigHash::<Blake2b256>::v1();
        s.update(b"abc").unwrap();

        let h = s.finalize().unwrap();
        assert_eq!(h, Blake2b256::digest(b"abc"));

        assert!(s.is_finalized());
        assert_eq!(s.update(b"more"), Err(Error::Finalized));
        assert_eq!(s.finalize(), Err(Error::Finalized));
    }
}
