// Copyright (c) 2023 The Sia Foundation

//! Sia hardware wallet core
//!
//! This provides a common [Engine][engine] supporting transaction hashing and signing
//! for execution on hardware wallets, along with the streaming [transaction decoder][txn]
//! used to compute signature hashes over transactions far larger than device memory.
//!
//! Interactions with the [Engine][engine] are performed via [Event][engine::Event]s and [Output][engine::Output]s,
//! see [ledger_sia_apdu] for APDU objects and wire encodings.
//!
//! ## Operations
//!
//! ### Fetching the application version
//!
//! [`VersionReq`][ledger_sia_apdu::version::VersionReq] returns a
//! [`VersionResp`][ledger_sia_apdu::version::VersionResp] containing the application version.
//!
//! ### Requesting public keys
//!
//! [`PublicKeyReq`][ledger_sia_apdu::public_key::PublicKeyReq] returns a
//! [`PublicKeyResp`][ledger_sia_apdu::public_key::PublicKeyResp] containing the ed25519
//! public key and standard address for a key index. Key requests require the engine
//! to be unlocked.
//!
//! ### Signing a hash
//!
//! [`SignHashReq`][ledger_sia_apdu::sign_hash::SignHashReq] moves the engine to the
//! pending state, on approval a [`SignatureResp`][ledger_sia_apdu::sign_hash::SignatureResp]
//! is returned.
//!
//! ### Hashing and signing a transaction
//!
//! 1. Issue [`TxnHashInit`][ledger_sia_apdu::txn::TxnHashInit] with the key, signature and
//!    change indices and the first chunk of the encoded transaction
//! 2. Issue [`TxnHashChunk`][ledger_sia_apdu::txn::TxnHashChunk]s with the remaining
//!    transaction data, each returning a [`TxnInfo`][ledger_sia_apdu::txn::TxnInfo]
//! 3. Once the transaction is fully decoded the engine enters the pending state and
//!    decoded [elements][txn::Element] are available for review
//! 4. On approval the signature hash (or a signature over it) is returned
//!

#![cfg_attr(not(feature = "std"), no_std)]

pub use ledger_sia_apdu::{self as apdu};

pub mod engine;

pub mod helpers;

pub mod txn;
