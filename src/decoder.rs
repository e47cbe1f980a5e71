// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/decoder.rs - Decoder library for South African driving license barcodes.
 *  Copyright (C) 2026  Forest Crossman <cyrozap@gmail.com>
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use std::fs::File;
use std::io::BufReader;
use std::io::prelude::*;
use std::iter;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use log::debug;

use crate::barcode::BarcodeReader;
use crate::crypto::{KeyScheme, KeySet, raw_transform};
use crate::error::{FormatError, LicenseError, Result};

/// Length of an encrypted barcode payload.
pub const ENCRYPTED_LEN: usize = 720;

/// Length of the header in front of the cipher blocks.
pub const HEADER_LEN: usize = 6;

const WIDE_BLOCKS: usize = 5;

/// Length of a decrypted payload: five 128-byte blocks and one 74-byte block.
pub const PLAINTEXT_LEN: usize = 5 * 128 + 74;

/// Applies the raw RSA transform to every cipher block of `data`.
///
/// `data` must be exactly [ENCRYPTED_LEN] bytes: the 6-byte header, followed by five
/// blocks for the wide key and one block for the narrow key. The header itself is
/// not used here.
pub fn decrypt_with_keys(data: &[u8], keys: &KeySet) -> Result<Vec<u8>> {
    check_encrypted_len(data)?;

    let mut result =
        Vec::with_capacity(WIDE_BLOCKS * keys.wide.block_width + keys.narrow.block_width);

    let mut start = HEADER_LEN;
    let blocks = iter::repeat_n(&keys.wide, WIDE_BLOCKS).chain(iter::once(&keys.narrow));
    for key in blocks {
        let block = data
            .get(start..start + key.block_width)
            .ok_or(FormatError::TruncatedInput {
                context: "cipher block",
                offset: start,
                needed: key.block_width,
            })?;
        result.extend(raw_transform(block, key, start)?);
        start += key.block_width;
    }

    Ok(result)
}

/// Selects the keys from the header of `data` and decrypts it.
pub fn decrypt(data: &[u8]) -> Result<Vec<u8>> {
    let scheme = KeyScheme::from_header(data);
    debug!("Decrypting {} bytes with scheme {:?} keys", data.len(), scheme);
    decrypt_with_keys(data, scheme.keys())
}

fn check_encrypted_len(data: &[u8]) -> Result<()> {
    if data.len() != ENCRYPTED_LEN {
        return Err(LicenseError::InputLength {
            expected: ENCRYPTED_LEN,
            found: data.len(),
        });
    }
    Ok(())
}

/// A decrypted license payload, ready for parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPayload {
    pub content: Vec<u8>,
}

impl DecodedPayload {
    /// Decrypts a 720-byte barcode payload with the built-in keys.
    pub fn from_encrypted(data: &[u8]) -> Result<Self> {
        Ok(Self {
            content: decrypt(data)?,
        })
    }

    /// Decrypts a 720-byte barcode payload with caller-supplied keys.
    pub fn from_encrypted_with_keys(data: &[u8], keys: &KeySet) -> Result<Self> {
        Ok(Self {
            content: decrypt_with_keys(data, keys)?,
        })
    }

    /// Wraps an already decrypted payload. Its length is not checked.
    pub fn from_plaintext(data: Vec<u8>) -> Self {
        Self { content: data }
    }

    /// Decrypts `data` if `encrypted` is set, otherwise takes it as plaintext.
    pub fn from_bytes(data: &[u8], encrypted: bool) -> Result<Self> {
        if encrypted {
            Self::from_encrypted(data)
        } else {
            Ok(Self::from_plaintext(data.to_vec()))
        }
    }

    /// Decodes base64 text, ignoring surrounding whitespace.
    pub fn from_base64(text: &str, encrypted: bool) -> Result<Self> {
        let data = STANDARD.decode(text.trim())?;
        Self::from_bytes(&data, encrypted)
    }

    /// Reads a raw payload from a file.
    pub fn from_filename(filename: &str, encrypted: bool) -> Result<Self> {
        let file = File::open(filename)?;
        let mut reader = BufReader::new(file);

        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;

        Self::from_bytes(&buffer, encrypted)
    }

    /// Reads the barcode in `image` with `reader` and decodes its payload.
    ///
    /// The barcode must hold exactly [ENCRYPTED_LEN] bytes, even when `encrypted` is
    /// not set.
    pub fn from_barcode<R: BarcodeReader + ?Sized>(
        reader: &R,
        image: &[u8],
        license_key: &str,
        encrypted: bool,
    ) -> Result<Self> {
        let data = reader
            .decode(image, license_key)?
            .ok_or(LicenseError::BarcodeNotFound)?;
        check_encrypted_len(&data)?;
        Self::from_bytes(&data, encrypted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{RsaKeyPair, SCHEME_A_KEYS, SCHEME_A_MAGIC, SCHEME_B_MAGIC};
    use crate::error::CryptoError;

    fn zero_buffer() -> Vec<u8> {
        let mut data = vec![0u8; ENCRYPTED_LEN];
        data[..4].copy_from_slice(&SCHEME_A_MAGIC);
        data
    }

    fn assert_input_length(result: Result<Vec<u8>>, len: usize) {
        assert!(matches!(
            result,
            Err(LicenseError::InputLength {
                expected: 720,
                found
            }) if found == len
        ));
    }

    #[test]
    fn test_decrypt_zero_blocks() {
        let decoded = DecodedPayload::from_encrypted(&zero_buffer()).unwrap();
        assert_eq!(decoded.content, vec![0u8; PLAINTEXT_LEN]);
    }

    #[test]
    fn test_decrypt_is_deterministic() {
        let mut data = zero_buffer();
        for (i, byte) in data.iter_mut().enumerate().skip(HEADER_LEN) {
            // Keep every block well below its modulus
            *byte = if (i - HEADER_LEN) % 128 == 0 { 0 } else { i as u8 };
        }

        let first = decrypt(&data).unwrap();
        let second = decrypt(&data).unwrap();
        assert_eq!(first.len(), PLAINTEXT_LEN);
        assert_eq!(first, second);
    }

    #[test]
    fn test_block_too_large() {
        let mut data = zero_buffer();
        let offset = HEADER_LEN + 2 * 128;
        data[offset..offset + 128].fill(0xff);
        assert!(matches!(
            DecodedPayload::from_encrypted(&data),
            Err(LicenseError::Crypto(CryptoError::BlockTooLarge {
                offset: 262,
                width: 128
            }))
        ));
    }

    #[test]
    fn test_decrypt_rejects_wrong_length() {
        for len in [0, 700, 719, 721, 800] {
            let mut data = vec![0u8; len];
            let header = len.min(4);
            data[..header].copy_from_slice(&SCHEME_A_MAGIC[..header]);

            assert_input_length(decrypt(&data), len);
            assert_input_length(decrypt_with_keys(&data, &SCHEME_A_KEYS), len);
        }
    }

    #[test]
    fn test_scheme_b_header_uses_scheme_b_keys() {
        // Between the two wide moduli: too large for scheme B, fine for scheme A
        let mut data = zero_buffer();
        data[HEADER_LEN] = 0xcb;
        assert_eq!(decrypt(&data).unwrap().len(), PLAINTEXT_LEN);

        data[..4].copy_from_slice(&SCHEME_B_MAGIC);
        assert!(matches!(
            decrypt(&data),
            Err(LicenseError::Crypto(CryptoError::BlockTooLarge {
                offset: 6,
                width: 128
            }))
        ));
    }

    #[test]
    fn test_truncating_key_set_rejected() {
        const WIDE_MODULUS: [u8; 129] = [0x01; 129];
        let keys = KeySet {
            wide: RsaKeyPair {
                modulus: &WIDE_MODULUS,
                public_exponent: &[0x03],
                block_width: 128,
            },
            narrow: SCHEME_A_KEYS.narrow,
        };
        assert!(matches!(
            decrypt_with_keys(&zero_buffer(), &keys),
            Err(LicenseError::Crypto(CryptoError::ModulusTooWide {
                block_width: 128,
                ..
            }))
        ));
    }

    #[test]
    fn test_wrong_length_rejected() {
        for len in [0, 714, 719, 721] {
            let data = vec![0u8; len];
            assert!(matches!(
                DecodedPayload::from_encrypted(&data),
                Err(LicenseError::InputLength {
                    expected: 720,
                    found
                }) if found == len
            ));
        }
    }

    #[test]
    fn test_plaintext_length_not_checked() {
        let decoded = DecodedPayload::from_bytes(&[1, 2, 3], false).unwrap();
        assert_eq!(decoded.content, vec![1, 2, 3]);
    }

    #[test]
    fn test_from_base64() {
        let text = format!("{}\n", STANDARD.encode(zero_buffer()));
        let decoded = DecodedPayload::from_base64(&text, true).unwrap();
        assert_eq!(decoded.content.len(), PLAINTEXT_LEN);

        let plain = DecodedPayload::from_base64("AQID", false).unwrap();
        assert_eq!(plain.content, vec![1, 2, 3]);

        assert!(matches!(
            DecodedPayload::from_base64("not base64!", true),
            Err(LicenseError::Base64(_))
        ));
    }

    #[test]
    fn test_from_barcode() {
        let found = |_: &[u8], _: &str| -> Option<Vec<u8>> { Some(zero_buffer()) };
        let decoded = DecodedPayload::from_barcode(&found, b"image", "key", true).unwrap();
        assert_eq!(decoded.content.len(), PLAINTEXT_LEN);

        let missing = |_: &[u8], _: &str| -> Option<Vec<u8>> { None };
        assert!(matches!(
            DecodedPayload::from_barcode(&missing, b"image", "key", true),
            Err(LicenseError::BarcodeNotFound)
        ));

        // Short payloads are rejected even when they are not encrypted
        let short = |_: &[u8], _: &str| -> Option<Vec<u8>> { Some(vec![0u8; 714]) };
        assert!(matches!(
            DecodedPayload::from_barcode(&short, b"image", "key", false),
            Err(LicenseError::InputLength { found: 714, .. })
        ));
    }
}
