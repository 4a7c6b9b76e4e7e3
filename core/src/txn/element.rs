// Copyright (c) 2023 The Sia Foundation

use core::str::from_utf8;

use emstr::EncodeStr;
use heapless::String;
use strum::{Display, EnumIter, IntoStaticStr};

use super::currency::{format_sc, format_sf, Digits, Formatted};
use crate::helpers::Address;

/// Maximum length of an element label
pub const MAX_LABEL_LEN: usize = 24;

/// Kinds of displayed transaction elements
#[derive(Copy, Clone, PartialEq, Debug, Display, EnumIter, IntoStaticStr)]
pub enum ElementKind {
    #[strum(serialize = "SC Output")]
    SiacoinOutput,
    #[strum(serialize = "SF Output")]
    SiafundOutput,
    #[strum(serialize = "Miner Fee")]
    MinerFee,
}

/// Decoded transaction element for user review
#[derive(Clone, PartialEq, Debug)]
pub struct Element {
    /// Element kind
    pub kind: ElementKind,
    /// Display index, 1-based and counted per kind
    pub index: u16,
    /// Decimal value (hastings for siacoins)
    pub value: Digits,
    /// Destination address, where applicable
    pub address: Option<Address>,
}

impl Element {
    /// Build a label for display, eg. `SC Output #1`
    pub fn label(&self) -> String<MAX_LABEL_LEN> {
        let mut buff = [0u8; MAX_LABEL_LEN];
        let name: &'static str = self.kind.into();

        let mut s = String::new();
        if let Ok(n) = emstr::write!(&mut buff[..], name, " #", self.index as usize) {
            if let Ok(v) = from_utf8(&buff[..n]) {
                let _ = s.push_str(v);
            }
        }
        s
    }

    /// Format the element value with units
    pub fn formatted_value(&self) -> Formatted {
        match self.kind {
            ElementKind::SiafundOutput => format_sf(&self.value),
            ElementKind::SiacoinOutput | ElementKind::MinerFee => format_sc(&self.value),
        }
    }
}
