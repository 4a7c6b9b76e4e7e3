// Copyright (c) 2023 The Sia Foundation

use ledger_sia_apdu::StatusWord;

use crate::txn;

/// [Engine][super::Engine] errors
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "thiserror", derive(thiserror::Error))]
pub enum Error {
    /// Invalid argument length
    #[cfg_attr(feature = "thiserror", error("Invalid argument length"))]
    InvalidLength,

    /// Unexpected event
    #[cfg_attr(feature = "thiserror", error("Unexpected event"))]
    UnexpectedEvent,

    /// Transaction chunk received out of order
    #[cfg_attr(feature = "thiserror", error("improper transaction initialisation"))]
    ImproperInit,

    /// Invalid request parameter (P1/P2)
    #[cfg_attr(feature = "thiserror", error("invalid parameter"))]
    InvalidParam,

    /// Unsupported instruction
    #[cfg_attr(feature = "thiserror", error("instruction not supported"))]
    InsNotSupported,

    /// Transaction contains more displayable elements than can be reviewed
    #[cfg_attr(feature = "thiserror", error("too many transaction elements"))]
    TooManyElements,

    /// Pending user approval
    #[cfg_attr(feature = "thiserror", error("pending user approval"))]
    ApprovalPending,

    /// Invalid engine state
    #[cfg_attr(feature = "thiserror", error("invalid engine state"))]
    InvalidState,

    /// Message encoding failed
    #[cfg_attr(feature = "thiserror", error("message encoding failed"))]
    EncodingFailed,

    /// Transaction decoding failed
    #[cfg_attr(feature = "thiserror", error("transaction decode failed: {0:?}"))]
    Decode(txn::Error),
}

impl From<txn::Error> for Error {
    fn from(e: txn::Error) -> Self {
        Error::Decode(e)
    }
}

impl Error {
    /// Map an error to the status word returned to the host
    pub fn status(&self) -> StatusWord {
        match self {
            Error::ImproperInit => StatusWord::ImproperInit,
            Error::InsNotSupported => StatusWord::InsNotSupported,
            Error::Decode(e) if !e.is_structural() => StatusWord::DeveloperErr,
            Error::InvalidLength | Error::EncodingFailed => StatusWord::DeveloperErr,
            Error::UnexpectedEvent
            | Error::InvalidParam
            | Error::TooManyElements
            | Error::ApprovalPending
            | Error::InvalidState
            | Error::Decode(_) => StatusWord::InvalidParam,
        }
    }
}
