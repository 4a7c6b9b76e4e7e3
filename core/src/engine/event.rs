// Copyright (c) 2023 The Sia Foundation

use encdec::Decode;

use ledger_proto::ApduError;
use ledger_sia_apdu::{
    prelude::*,
    public_key::{P2_DISPLAY_ADDRESS, P2_DISPLAY_PUBKEY},
    P1_FIRST, P1_MORE,
};

use super::Error;

/// Value displayed for comparison on public key requests
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum KeyDisplay {
    Address,
    PublicKey,
}

/// [`Engine`][super::Engine] input events, typically decoded from request [APDUs][crate::apdu]
#[derive(Clone, PartialEq, Debug)]
pub enum Event<'a> {
    None,

    /// Fetch application version
    GetVersion,

    /// Fetch public key and address for a key index
    GetPublicKey { key_index: u32, display: KeyDisplay },

    /// Sign a provided hash
    SignHash { key_index: u32, hash: [u8; 32] },

    /// Start a transaction hash, with the first chunk of transaction data
    TxnInit {
        key_index: u32,
        sig_index: u16,
        change_index: u32,
        flags: TxnFlags,
        data: &'a [u8],
    },

    /// Continue a transaction hash with the next chunk of transaction data
    TxnData { flags: TxnFlags, data: &'a [u8] },
}

/// Helper for decoding APDU payloads
fn decode_apdu<'a, T>(buff: &'a [u8]) -> Result<T::Output, Error>
where
    T: Decode<'a, Error = ApduError>,
{
    T::decode(buff)
        .map(|(v, _n)| v)
        .map_err(|_| Error::InvalidLength)
}

impl<'a> Event<'a> {
    /// Parse an incoming APDU to engine event
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn parse(ins: u8, p1: u8, p2: u8, buff: &'a [u8]) -> Result<Self, Error> {
        let ins = Instruction::try_from(ins).map_err(|_| Error::InsNotSupported)?;

        match ins {
            Instruction::GetVersion => {
                decode_apdu::<VersionReq>(buff)?;
                Ok(Event::GetVersion)
            }
            Instruction::GetPublicKey => {
                let display = match p2 {
                    P2_DISPLAY_ADDRESS => KeyDisplay::Address,
                    P2_DISPLAY_PUBKEY => KeyDisplay::PublicKey,
                    _ => return Err(Error::InvalidParam),
                };
                let r = decode_apdu::<PublicKeyReq>(buff)?;

                Ok(Event::GetPublicKey {
                    key_index: r.key_index,
                    display,
                })
            }
            Instruction::SignHash => decode_apdu::<SignHashReq>(buff).map(Event::from),
            Instruction::CalcTxnHash => {
                let flags = TxnFlags::from_bits(p2).ok_or(Error::InvalidParam)?;

                match p1 {
                    P1_FIRST => decode_apdu::<TxnHashInit>(buff)
                        .map(|a| Event::from(a.with_flags(flags))),
                    P1_MORE => decode_apdu::<TxnHashChunk>(buff)
                        .map(|a| Event::from(a.with_flags(flags))),
                    _ => Err(Error::InvalidParam),
                }
            }
        }
    }
}

impl<'a> From<SignHashReq> for Event<'a> {
    fn from(a: SignHashReq) -> Self {
        Event::SignHash {
            key_index: a.key_index,
            hash: a.hash,
        }
    }
}

impl<'a> From<TxnHashInit<'a>> for Event<'a> {
    fn from(a: TxnHashInit<'a>) -> Self {
        Event::TxnInit {
            key_index: a.key_index,
            sig_index: a.sig_index,
            change_index: a.change_index,
            flags: a.flags,
            data: a.data,
        }
    }
}

impl<'a> From<TxnHashChunk<'a>> for Event<'a> {
    fn from(a: TxnHashChunk<'a>) -> Self {
        Event::TxnData {
            flags: a.flags,
            data: a.data,
        }
    }
}
