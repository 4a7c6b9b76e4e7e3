// Copyright (c) 2023 The Sia Foundation

/// `encdec(with)` helpers for fixed-length byte fields (keys, hashes, signatures)
pub(crate) mod arr {
    use encdec::Error;

    pub fn enc<const N: usize>(d: &[u8; N], buff: &mut [u8]) -> Result<usize, Error> {
        let out = buff.get_mut(..N).ok_or(Error::Length)?;
        out.copy_from_slice(d);
        Ok(N)
    }

    pub fn enc_len<const N: usize>(_d: &[u8; N]) -> Result<usize, Error> {
        Ok(N)
    }

    pub fn dec<const N: usize>(buff: &[u8]) -> Result<([u8; N], usize), Error> {
        let d = buff
            .get(..N)
            .and_then(|b| <[u8; N]>::try_from(b).ok())
            .ok_or(Error::Length)?;
        Ok((d, N))
    }
}
