//! Prelude to simplify downstream use of APDU objects
//!

pub use crate::{
    public_key::{PublicKeyReq, PublicKeyResp},
    sign_hash::{SignHashReq, SignatureResp},
    state::TxnState,
    txn::{TxnFlags, TxnHashChunk, TxnHashInit, TxnHashResp, TxnInfo},
    version::{VersionReq, VersionResp},
    Instruction, StatusWord,
};
