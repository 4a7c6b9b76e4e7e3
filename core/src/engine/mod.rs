// Copyright (c) 2023 The Sia Foundation

//! The [Engine] provides functionality required by hardware wallets.
//!
//! This handles [Event] inputs and returns [Output] responses to the caller,
//! see [apdu][crate::apdu] for APDU protocol / encoding specifications.

use ed25519_dalek::{Signer, SigningKey};
use strum::{Display, EnumIter, EnumString, EnumVariantNames};
use zeroize::Zeroizing;

use ledger_sia_apdu::{txn::TxnFlags, version::VersionResp};

use crate::{
    helpers::{key_path, Address, NO_CHANGE_INDEX},
    txn::{Element, CHUNK_MAX},
};

mod function;
pub use function::{Function, PendingHash, TxnContext};

mod event;
pub use event::{Event, KeyDisplay};

mod output;
pub use output::Output;

mod error;
pub use error::Error;

/// Maximum number of displayable elements per transaction
pub const MAX_ELEMENTS: usize = 64;

/// Engine internal state enumeration
#[derive(Copy, Clone, PartialEq, Debug, EnumString, Display, EnumVariantNames, EnumIter)]
pub enum State {
    /// Idle state, no operation running
    Init,
    /// Transaction streaming / decoding
    Decoding,
    /// Transaction or hash pending user approval
    Pending,
    /// Operation complete
    Complete,
    /// Operation denied / aborted
    Deny,
    /// Operation failed
    Error,
}

/// [Engine] provides hardware-independent support for Sia wallet operations
pub struct Engine<DRV: Driver> {
    state: State,
    unlocked: bool,

    function: Function,

    drv: DRV,
}

/// [`Driver`] trait provides platform support for [`Engine`] instances
pub trait Driver {
    /// SLIP-0010 derivation for ed25519 keys
    fn slip10_derive_ed25519(&self, path: &[u32]) -> Zeroizing<[u8; 32]>;
}

impl<T: Driver> Driver for &mut T {
    fn slip10_derive_ed25519(&self, path: &[u32]) -> Zeroizing<[u8; 32]> {
        T::slip10_derive_ed25519(self, path)
    }
}

impl<DRV: Driver> Engine<DRV> {
    /// Create a new engine instance with the provided driver
    pub const fn new(drv: DRV) -> Self {
        Self {
            state: State::Init,
            unlocked: false,
            function: Function::new(),
            drv,
        }
    }

    /// Handle incoming events
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn update(&mut self, evt: &Event) -> Result<Output, Error> {
        #[cfg(feature = "log")]
        log::debug!("event: {:02x?}", evt);

        match (self.state, evt) {
            // Empty event, do nothing
            (_, Event::None) => (),

            // Fetch application version
            (_, Event::GetVersion) => {
                return VersionResp::parse(env!("CARGO_PKG_VERSION"))
                    .map(Output::Version)
                    .ok_or(Error::EncodingFailed);
            }

            // Fetch public key and address
            (_, Event::GetPublicKey { key_index, display }) => {
                // Check for unlock state
                if !self.unlocked {
                    return Err(Error::ApprovalPending);
                }

                let public_key = self.public_key(*key_index);

                return Ok(Output::PublicKey {
                    public_key,
                    address: Address::from_public_key(&public_key),
                    display: *display,
                });
            }

            // Hash signing is not permitted while streaming a transaction
            (State::Decoding, Event::SignHash { .. }) => {
                #[cfg(feature = "log")]
                log::error!("Unexpected event in state {:?}: {:02x?}", self.state, evt);

                return Err(Error::UnexpectedEvent);
            }

            // Sign a provided hash following approval
            (_, Event::SignHash { key_index, hash }) => {
                self.function.sign_hash_init(*key_index, *hash);
                self.state = State::Pending;
            }

            // Transaction restarted while in progress
            (State::Decoding | State::Pending, Event::TxnInit { .. })
                if self.function.txn_ref().is_some() =>
            {
                #[cfg(feature = "log")]
                log::error!("Transaction init while in progress");

                self.function.clear();
                self.state = State::Error;

                return Err(Error::ImproperInit);
            }

            // Start a new transaction
            (
                _,
                Event::TxnInit {
                    key_index,
                    sig_index,
                    change_index,
                    flags,
                    data,
                },
            ) => {
                let change = match *change_index {
                    NO_CHANGE_INDEX => None,
                    i => Some(Address::from_public_key(&self.public_key(i))),
                };

                self.function
                    .txn_init(*key_index, *sig_index, change, *flags);
                self.state = State::Decoding;

                self.txn_update(*flags, data)?;
            }

            // Continue the current transaction
            (State::Decoding, Event::TxnData { flags, data }) => {
                self.txn_update(*flags, data)?;
            }

            // Transaction data without a transaction in progress
            (_, Event::TxnData { .. }) => {
                #[cfg(feature = "log")]
                log::error!("Transaction data in state {:?}", self.state);

                return Err(Error::ImproperInit);
            }
        }

        // Default to returning updated state
        Ok(Output::State {
            state: self.state,
            elements: self.elements().len() as u16,
        })
    }

    /// Push transaction data to the active decoder
    fn txn_update(&mut self, flags: TxnFlags, data: &[u8]) -> Result<(), Error> {
        let ctx = match self.function.txn() {
            Some(c) => c,
            None => return Err(Error::InvalidState),
        };

        if ctx.flags() != flags {
            return Err(Error::InvalidParam);
        }
        if data.len() > CHUNK_MAX {
            return Err(Error::InvalidLength);
        }

        match ctx.update(data) {
            Ok(true) => {
                #[cfg(feature = "log")]
                log::info!("Transaction decoded, {} elements", ctx.elements().len());

                self.state = State::Pending;
            }
            Ok(false) => (),
            Err(e) => {
                #[cfg(feature = "log")]
                log::error!("Transaction failed: {:?}", e);

                self.function.clear();
                self.state = State::Error;

                return Err(e);
            }
        }

        Ok(())
    }

    /// Fetch current engine state
    pub fn state(&self) -> State {
        self.state
    }

    /// Fetch elements decoded from the current transaction
    pub fn elements(&self) -> &[Element] {
        match self.function.txn_ref() {
            Some(t) => t.elements(),
            None => &[],
        }
    }

    /// Fetch the hash awaiting user approval
    pub fn pending(&self) -> Option<PendingHash> {
        match self.state {
            State::Pending => self.function.pending(),
            _ => None,
        }
    }

    /// Compute the ed25519 public key for a key index
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn public_key(&self, key_index: u32) -> [u8; 32] {
        let seed = self.drv.slip10_derive_ed25519(&key_path(key_index));
        SigningKey::from_bytes(&seed).verifying_key().to_bytes()
    }

    /// Sign a message with the key for the provided index
    #[cfg_attr(feature = "noinline", inline(never))]
    fn sign(&self, key_index: u32, message: &[u8]) -> [u8; 64] {
        let seed = self.drv.slip10_derive_ed25519(&key_path(key_index));
        SigningKey::from_bytes(&seed).sign(message).to_bytes()
    }

    /// Check whether engine is unlocked (ie. key requests have been approved)
    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Unlock the engine (allowing key requests)
    pub fn unlock(&mut self) {
        self.unlocked = true;
    }

    /// Lock the engine (requires approval for key requests)
    pub fn lock(&mut self) {
        self.unlocked = false;
    }

    /// Approve a pending transaction or hash, returning the signature hash
    /// or a signature over it when signing was requested
    pub fn approve(&mut self) -> Result<Output, Error> {
        let p = match self.pending() {
            Some(p) => p,
            None => return Err(Error::InvalidState),
        };

        let r = match p.sign {
            true => Output::Signature {
                signature: self.sign(p.key_index, &p.hash),
            },
            false => Output::TxnHash { hash: p.hash },
        };

        self.function.clear();
        self.state = State::Complete;

        Ok(r)
    }

    /// Deny a pending transaction or hash
    pub fn deny(&mut self) {
        self.function.clear();
        self.state = State::Deny;
    }

    /// Reset engine state
    pub fn reset(&mut self) {
        self.function.clear();
        self.state = State::Init;
    }
}

#[cfg(test)]
mod test {
    extern crate std;

    use ed25519_dalek::{Signature, Verifier, VerifyingKey};
    use encdec::Encode;

    use ledger_proto::ApduStatic;
    use ledger_sia_apdu::{
        txn::{TxnHashChunk, TxnHashInit},
        P1_FIRST, P1_MORE,
    };

    use super::*;

    /// Driver implementation for test use
    pub struct TestDriver {
        pub seed: [u8; 32],
    }

    impl TestDriver {
        /// Create a new test driver with a random seed
        pub fn new() -> Self {
            Self {
                seed: rand::random(),
            }
        }
    }

    impl Driver for TestDriver {
        fn slip10_derive_ed25519(&self, path: &[u32]) -> Zeroizing<[u8; 32]> {
            Zeroizing::new(slip10_ed25519::derive_ed25519_private_key(
                &self.seed, path,
            ))
        }
    }

    /// Minimal v2 transaction: one input, no outputs, 1 H miner fee
    fn txn_v2() -> std::vec::Vec<u8> {
        let mut b = std::vec::Vec::new();
        b.extend_from_slice(&1u64.to_le_bytes());
        b.extend_from_slice(&[0x11; 32]);
        // Remaining sections and arbitrary data are empty
        for _ in 0..8 {
            b.extend_from_slice(&0u64.to_le_bytes());
        }
        b.push(0);
        b.extend_from_slice(&1u64.to_le_bytes());
        b.push(1);
        b
    }

    #[test]
    fn get_version() {
        let mut e = Engine::new(TestDriver::new());

        let r = e.update(&Event::GetVersion).unwrap();
        let mut buff = [0u8; 8];
        assert_eq!(r.encode(&mut buff).ok(), Some(3));
    }

    #[test]
    fn public_key_requires_unlock() {
        let mut e = Engine::new(TestDriver::new());
        let evt = Event::GetPublicKey {
            key_index: 0,
            display: KeyDisplay::Address,
        };

        assert_eq!(e.update(&evt), Err(Error::ApprovalPending));

        e.unlock();
        match e.update(&evt) {
            Ok(Output::PublicKey {
                public_key,
                address,
                display,
            }) => {
                assert_eq!(address, Address::from_public_key(&public_key));
                assert_eq!(display, KeyDisplay::Address);
            }
            r => panic!("unexpected response: {r:?}"),
        }

        // Display mode follows the request
        let evt = Event::GetPublicKey {
            key_index: 0,
            display: KeyDisplay::PublicKey,
        };
        match e.update(&evt) {
            Ok(Output::PublicKey { display, .. }) => assert_eq!(display, KeyDisplay::PublicKey),
            r => panic!("unexpected response: {r:?}"),
        }
    }

    #[test]
    fn sign_hash() {
        let mut e = Engine::new(TestDriver::new());
        let hash = [0x5a; 32];

        let r = e.update(&Event::SignHash { key_index: 2, hash }).unwrap();
        assert_eq!(r, State::Pending);

        let signature = match e.approve() {
            Ok(Output::Signature { signature }) => signature,
            r => panic!("unexpected response: {r:?}"),
        };

        let public_key = VerifyingKey::from_bytes(&e.public_key(2)).unwrap();
        public_key
            .verify(&hash, &Signature::from_bytes(&signature))
            .unwrap();

        assert_eq!(e.state(), State::Complete);
        assert_eq!(e.approve(), Err(Error::InvalidState));
    }

    #[test]
    fn txn_hash() {
        let mut e = Engine::new(TestDriver::new());
        let t = txn_v2();

        let r = e
            .update(&Event::TxnInit {
                key_index: 0,
                sig_index: 0,
                change_index: NO_CHANGE_INDEX,
                flags: TxnFlags::V2,
                data: &t[..40],
            })
            .unwrap();
        assert_eq!(r, State::Decoding);

        let r = e
            .update(&Event::TxnData {
                flags: TxnFlags::V2,
                data: &t[40..],
            })
            .unwrap();
        assert_eq!(r, State::Pending);
        assert_eq!(e.elements().len(), 1);
        assert_eq!(e.elements()[0].label().as_str(), "Miner Fee #1");

        let hash = e.pending().unwrap().hash;
        assert_eq!(e.approve(), Ok(Output::TxnHash { hash }));
    }

    #[test]
    fn txn_flag_mismatch() {
        let mut e = Engine::new(TestDriver::new());
        let t = txn_v2();

        e.update(&Event::TxnInit {
            key_index: 0,
            sig_index: 0,
            change_index: NO_CHANGE_INDEX,
            flags: TxnFlags::V2,
            data: &t[..40],
        })
        .unwrap();

        let r = e.update(&Event::TxnData {
            flags: TxnFlags::V2 | TxnFlags::SIGN,
            data: &t[40..],
        });
        assert_eq!(r, Err(Error::InvalidParam));
    }

    #[test]
    fn improper_init() {
        let mut e = Engine::new(TestDriver::new());
        let t = txn_v2();

        // Data without init
        let r = e.update(&Event::TxnData {
            flags: TxnFlags::V2,
            data: &t,
        });
        assert_eq!(r, Err(Error::ImproperInit));

        // Init while in progress
        let init = Event::TxnInit {
            key_index: 0,
            sig_index: 0,
            change_index: NO_CHANGE_INDEX,
            flags: TxnFlags::V2,
            data: &t[..10],
        };
        e.update(&init).unwrap();
        assert_eq!(e.update(&init), Err(Error::ImproperInit));
        assert_eq!(e.state(), State::Error);

        // Subsequent init succeeds
        assert_eq!(
            e.update(&init),
            Ok(Output::State {
                state: State::Decoding,
                elements: 0
            })
        );
    }

    #[test]
    fn decode_error_clears() {
        let mut e = Engine::new(TestDriver::new());

        // v2 transaction with a file contract
        let mut t = std::vec::Vec::new();
        for _ in 0..4 {
            t.extend_from_slice(&0u64.to_le_bytes());
        }
        t.extend_from_slice(&1u64.to_le_bytes());

        let r = e.update(&Event::TxnInit {
            key_index: 0,
            sig_index: 0,
            change_index: NO_CHANGE_INDEX,
            flags: TxnFlags::V2,
            data: &t,
        });
        assert_eq!(
            r,
            Err(Error::Decode(crate::txn::Error::NonEmptySection))
        );
        assert_eq!(e.state(), State::Error);
        assert!(e.elements().is_empty());
    }

    #[test]
    fn deny() {
        let mut e = Engine::new(TestDriver::new());

        e.update(&Event::SignHash {
            key_index: 0,
            hash: [0u8; 32],
        })
        .unwrap();
        e.deny();

        assert_eq!(e.state(), State::Deny);
        assert_eq!(e.approve(), Err(Error::InvalidState));
    }

    #[test]
    fn apdu_events() {
        let mut e = Engine::new(TestDriver::new());
        let t = txn_v2();

        let mut buff = [0u8; 256];
        let a = TxnHashInit::new(TxnFlags::V2, 0, 0, NO_CHANGE_INDEX, &t[..20]);
        let n = a.encode(&mut buff).unwrap();

        let evt = Event::parse(TxnHashInit::INS, P1_FIRST, a.p2(), &buff[..n]).unwrap();
        assert_eq!(e.update(&evt).unwrap(), State::Decoding);

        let a = TxnHashChunk::new(TxnFlags::V2, &t[20..]);
        let n = a.encode(&mut buff).unwrap();

        let evt = Event::parse(TxnHashChunk::INS, P1_MORE, a.p2(), &buff[..n]).unwrap();
        assert_eq!(e.update(&evt).unwrap(), State::Pending);
    }
}
