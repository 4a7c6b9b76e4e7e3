#![allow(unused)]

use std::sync::{Arc, Mutex};

use bip39::{Language, Mnemonic, Seed};
use encdec::{Decode, Encode};
use lazy_static::lazy_static;
use log::{debug, trace};
use zeroize::Zeroizing;

use ledger_proto::{ApduError, ApduStatic};
use ledger_sia_core::{
    engine::{Driver, Engine, Error, Event, Output},
    txn::{Decoder, Element, Status, V2_SIG_DISTINGUISHER},
};

pub const MNEMONIC: &str = "duck deal pretty pen thunder economy wide common goose fit engine main aisle curtain choose cube claim snake enroll detect brief history float unit";

/// Real v1 transaction: one siacoin input, one siacoin output,
/// one miner fee and a whole-transaction signature
pub const TXN_V1: &str = "01000000000000001ac932c4066849910b71cea45d41bd369c5a0ec0d1fb402b581760926747220300000000000000000100000000000000656432353531390000000000000000002000000000000000bae7e5e40ede0c646f9995ddff4052e201adc1cbda237458a46e88de9bbe3035010000000000000001000000000000000d000000000000001c82d5baf014236c48f88e5793fc8caec1fc8fd727fe5107bd949009dafbf330515ab4ad29e6e36d62f17982ac0000000000000000000000000000000000000000000000000000000000000000000000000000000001000000000000000a0000000000000004c3ba39c5e411100000000000000000000001000000000000001ac932c4066849910b71cea45d41bd369c5a0ec0d1fb402b581760926747220300000000000000000000000000000000010000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000400000000000000016e2463848abc2b9ad088485dfaf1226b935d1c1a61c222c836f012b1aed001a2311a00eecb9932b5a39705fa9f29172e5502cd2f0d43d7ef1edd5e4ea30cb0f";

/// Signature hash of [TXN_V1] for signature index 0
pub const TXN_V1_SIGHASH: &str = "003853828895b4c961a7c944dcfc6f6e4ffd292d193dcf858f5ae446b5f5fe64";

/// Independent reference BLAKE2b-256
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    let mut h = [0u8; 32];
    h.copy_from_slice(blake2b_simd::Params::new().hash_length(32).hash(data).as_bytes());
    h
}

lazy_static! {
    /// Decoded [TXN_V1]
    pub static ref TXN_V1_BYTES: Vec<u8> = hex::decode(TXN_V1).unwrap();
}

pub fn init_logging() {
    let _ = simplelog::SimpleLogger::init(log::LevelFilter::Debug, Default::default());
}

#[derive(Clone)]
pub struct TestEngine {
    pub engine: Arc<Mutex<Engine<TestDriver>>>,
}

impl TestEngine {
    pub fn new(engine: Engine<TestDriver>) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
        }
    }

    /// Create an engine using the test mnemonic
    pub fn from_mnemonic() -> Self {
        let mnemonic = Mnemonic::from_phrase(MNEMONIC, Language::English).unwrap();
        let seed = Seed::new(&mnemonic, "");

        Self::new(Engine::new(TestDriver::new(seed)))
    }

    pub fn unlock(&self) {
        let mut e = self.engine.lock().unwrap();
        e.unlock();
    }

    pub fn approve(&self) -> Result<Output, Error> {
        let mut e = self.engine.lock().unwrap();
        e.approve()
    }

    pub fn deny(&self) {
        let mut e = self.engine.lock().unwrap();
        e.deny();
    }

    pub fn public_key(&self, key_index: u32) -> [u8; 32] {
        let e = self.engine.lock().unwrap();
        e.public_key(key_index)
    }

    pub fn elements(&self) -> Vec<Element> {
        let e = self.engine.lock().unwrap();
        e.elements().to_vec()
    }

    /// Encode a request APDU, handle it via the engine and decode the response
    pub fn exchange<REQ, RESP>(&self, req: &REQ) -> Result<RESP, Error>
    where
        REQ: ApduStatic + Encode<Error = ApduError> + std::fmt::Debug,
        RESP: for<'b> Decode<'b, Output = RESP, Error = ApduError> + std::fmt::Debug,
    {
        let mut buff = [0u8; 256];

        debug!("cmd: {:?}", req);

        // Encode command to APDU (skipping header)
        let n = req.encode(&mut buff).unwrap();
        trace!("encoded: {:02x?}", &buff[..n]);

        // Decode APDU to event
        let evt = Event::parse(REQ::INS, req.p1(), req.p2(), &buff[..n])?;

        // Handle event
        let r = {
            let mut engine = self.engine.lock().unwrap();
            engine.update(&evt)?
        };

        // Encode output to response APDU and decode
        let n = r.encode(&mut buff).unwrap();
        let (a, _) = RESP::decode(&buff[..n]).unwrap();

        debug!("resp: {:?}", a);

        Ok(a)
    }
}

/// Driver implementation for test use
pub struct TestDriver {
    /// BIP39 Mnemonic derived seed
    pub seed: [u8; 64],
}

impl TestDriver {
    pub fn new(seed: Seed) -> Self {
        let mut b = [0u8; 64];
        b.copy_from_slice(seed.as_bytes());
        Self { seed: b }
    }
}

impl Driver for TestDriver {
    fn slip10_derive_ed25519(&self, path: &[u32]) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(slip10_ed25519::derive_ed25519_private_key(
            &self.seed, path,
        ))
    }
}

/// Decode a transaction in fixed size chunks, collecting elements
pub fn decode_chunked<D: Decoder>(
    d: &mut D,
    data: &[u8],
    chunk: usize,
) -> Result<(Vec<Element>, [u8; 32]), ledger_sia_core::txn::Error> {
    let mut elements = Vec::new();

    for c in data.chunks(chunk) {
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

fn u64le(b: &mut Vec<u8>, v: u64) {
    b.extend_from_slice(&v.to_le_bytes());
}

/// Encode a currency value (length-prefixed big-endian, no leading zeros)
pub fn currency(b: &mut Vec<u8>, v: u128) {
    let raw = v.to_be_bytes();
    let start = raw.iter().position(|b| *b != 0).unwrap_or(raw.len());
    u64le(b, (raw.len() - start) as u64);
    b.extend_from_slice(&raw[start..]);
}

/// v1 transaction builder, recording the expected signature hash input
/// alongside the encoded transaction
#[derive(Default)]
pub struct TxnV1 {
    pub inputs: Vec<[u8; 32]>,
    pub outputs: Vec<(u128, [u8; 32])>,
    pub sf_outputs: Vec<(u128, [u8; 32])>,
    pub fees: Vec<u128>,
    pub signatures: Vec<[u8; 32]>,
    /// Additional public keys in each input's unlock conditions
    pub extra_keys: usize,
}

impl TxnV1 {
    fn input(b: &mut Vec<u8>, parent: &[u8; 32], keys: usize) {
        b.extend_from_slice(parent);
        u64le(b, 0);
        u64le(b, keys as u64);
        for i in 0..keys {
            b.extend_from_slice(b"ed25519\0\0\0\0\0\0\0\0\0");
            u64le(b, 32);
            b.extend_from_slice(&[0x22 + i as u8; 32]);
        }
        u64le(b, 1);
    }

    fn signature(b: &mut Vec<u8>, parent: &[u8; 32], index: u64) {
        b.extend_from_slice(parent);
        u64le(b, index);
        u64le(b, 0);
        b.push(1);
        for _ in 0..10 {
            u64le(b, 0);
        }
        u64le(b, 64);
        b.extend_from_slice(&[0x55; 64]);
    }

    /// Encode the transaction and compute the expected signature hash
    pub fn build(&self, sig_index: usize) -> (Vec<u8>, [u8; 32]) {
        let mut b = Vec::new();
        let mut h = Vec::new();

        u64le(&mut b, self.inputs.len() as u64);
        u64le(&mut h, self.inputs.len() as u64);
        for i in &self.inputs {
            let mut e = Vec::new();
            Self::input(&mut e, i, 1 + self.extra_keys);

            b.extend_from_slice(&e);
            h.push(1);
            h.extend_from_slice(&e);
        }

        let mut body = Vec::new();

        u64le(&mut body, self.outputs.len() as u64);
        for (v, a) in &self.outputs {
            currency(&mut body, *v);
            body.extend_from_slice(a);
        }

        // File contracts, revisions, storage proofs, siafund inputs
        for _ in 0..4 {
            u64le(&mut body, 0);
        }

        u64le(&mut body, self.sf_outputs.len() as u64);
        for (v, a) in &self.sf_outputs {
            currency(&mut body, *v);
            body.extend_from_slice(a);
            currency(&mut body, 0);
        }

        u64le(&mut body, self.fees.len() as u64);
        for v in &self.fees {
            currency(&mut body, *v);
        }

        // Arbitrary data
        u64le(&mut body, 0);

        b.extend_from_slice(&body);
        h.extend_from_slice(&body);

        u64le(&mut b, self.signatures.len() as u64);
        for (i, s) in self.signatures.iter().enumerate() {
            let mut e = Vec::new();
            Self::signature(&mut e, s, i as u64);

            if i == sig_index {
                h.extend_from_slice(&e[..48]);
            }
            b.extend_from_slice(&e);
        }

        (b, blake2b_256(&h))
    }
}

/// Build a v2 transaction with one siacoin input, the provided siacoin
/// outputs and a miner fee, returning the expected signature hash
pub fn txn_v2(outputs: &[(u128, [u8; 32])], fee: u128) -> (Vec<u8>, [u8; 32]) {
    let mut b = Vec::new();

    u64le(&mut b, 1);
    b.extend_from_slice(&[0x11; 32]);

    u64le(&mut b, outputs.len() as u64);
    for (v, a) in outputs {
        currency(&mut b, *v);
        b.extend_from_slice(a);
    }

    // Siafund inputs and outputs, file contracts, revisions, resolutions,
    // attestations and arbitrary data
    for _ in 0..7 {
        u64le(&mut b, 0);
    }

    // Foundation address
    b.push(0);

    currency(&mut b, fee);

    let mut h = V2_SIG_DISTINGUISHER.to_vec();
    h.push(2);
    h.extend_from_slice(&b);

    (b, blake2b_256(&h))
}
