// Copyright (c) 2023 The Sia Foundation

//! Field readers for Sia-encoded transaction elements

use super::{
    currency::{decode_currency, Digits, MAX_CURRENCY_LEN},
    cursor::Cursor,
    error::{Error, Interrupt},
};
use crate::helpers::Address;

/// Length of an ed25519 specifier in unlock conditions
const SPECIFIER_LEN: u64 = 16;

/// Number of covered field slices following the whole transaction flag
const COVERED_FIELD_SLICES: usize = 10;

impl Cursor {
    /// Read a length-prefixed currency value, returning its decimal digits
    pub(crate) fn read_currency(&mut self) -> Result<Digits, Interrupt> {
        let len = self.read_currency_len()?;
        let r = self.read_range(len)?;
        Ok(decode_currency(self.bytes(r))?)
    }

    /// Skip a length-prefixed currency value
    pub(crate) fn skip_currency(&mut self) -> Result<(), Interrupt> {
        let len = self.read_currency_len()?;
        self.seek(len)
    }

    fn read_currency_len(&mut self) -> Result<u64, Interrupt> {
        let len = self.read_u64()?;
        if len > MAX_CURRENCY_LEN as u64 {
            return Err(Error::CurrencyTooLarge.into());
        }
        Ok(len)
    }

    /// Read a 32-byte hash
    pub(crate) fn read_hash(&mut self) -> Result<[u8; 32], Interrupt> {
        self.read_array::<32>()
    }

    /// Read a 32-byte address
    pub(crate) fn read_address(&mut self) -> Result<Address, Interrupt> {
        self.read_hash().map(Address::from)
    }

    /// Skip length-prefixed bytes
    pub(crate) fn skip_prefixed(&mut self) -> Result<(), Interrupt> {
        let len = self.read_u64()?;
        self.seek(len)
    }

    /// Skip v1 unlock conditions (timelock, public keys, signatures required)
    pub(crate) fn skip_unlock_conditions(&mut self) -> Result<(), Interrupt> {
        // Timelock
        self.seek(8)?;

        // Public keys, each an algorithm specifier and prefixed key
        let keys = self.read_u64()?;
        for _ in 0..keys {
            self.seek(SPECIFIER_LEN)?;
            self.skip_prefixed()?;
        }

        // Signatures required
        self.seek(8)
    }

    /// Read covered fields, which must cover the whole transaction
    pub(crate) fn read_covered_fields(&mut self) -> Result<(), Interrupt> {
        if self.read_u8()? != 1 {
            return Err(Error::CoveredFields.into());
        }

        for _ in 0..COVERED_FIELD_SLICES {
            if self.read_u64()? != 0 {
                return Err(Error::CoveredFields.into());
            }
        }

        Ok(())
    }
}
