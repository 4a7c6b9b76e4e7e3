// Copyright (c) 2023 The Sia Foundation

use encdec::Encode;

use ledger_proto::ApduError;

use super::{KeyDisplay, State};
use crate::{apdu, helpers::Address};

/// [`Engine`][super::Engine] outputs (in response to events), typically encoded to response [APDUs][crate::apdu]
#[derive(Clone, PartialEq, Debug)]
pub enum Output {
    None,

    /// Engine state and number of decoded elements
    State { state: State, elements: u16 },

    /// Application version
    Version(apdu::version::VersionResp),

    /// Public key and address, with the value to show for comparison
    PublicKey {
        public_key: [u8; 32],
        address: Address,
        display: KeyDisplay,
    },

    /// Transaction signature hash
    TxnHash { hash: [u8; 32] },

    /// Signature over a transaction or provided hash
    Signature { signature: [u8; 64] },
}

impl Output {
    /// Encode an [`Output`] object to a response [APDU]
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        match self {
            Output::None => Ok(0),
            Output::State { state, elements } => {
                apdu::txn::TxnInfo::new(state.txn_state(), *elements).encode(buff)
            }
            Output::Version(v) => v.encode(buff),
            Output::PublicKey {
                public_key,
                address,
                ..
            } => apdu::public_key::PublicKeyResp::new(*public_key, address.to_hex()).encode(buff),
            Output::TxnHash { hash } => apdu::txn::TxnHashResp::new(*hash).encode(buff),
            Output::Signature { signature } => {
                apdu::sign_hash::SignatureResp::new(*signature).encode(buff)
            }
        }
    }

    /// Fetch state for outputs containing this
    pub fn state(&self) -> Option<State> {
        match &self {
            Output::State { state, .. } => Some(*state),
            _ => None,
        }
    }
}

impl PartialEq<State> for Output {
    fn eq(&self, other: &State) -> bool {
        match self {
            Output::State { state, .. } => state == other,
            _ => false,
        }
    }
}

impl State {
    /// Map [engine](crate::engine) states to [apdu][apdu::state::TxnState] states for transmission
    pub fn txn_state(&self) -> apdu::state::TxnState {
        use apdu::state::TxnState;

        match self {
            State::Init => TxnState::Init,
            State::Decoding => TxnState::Decoding,
            State::Pending => TxnState::Pending,
            State::Complete => TxnState::Complete,
            State::Deny => TxnState::Denied,
            State::Error => TxnState::Error,
        }
    }
}
