// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/crypto.rs - Key selection and raw RSA block transform
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

use log::{trace, warn};
use num::BigUint;

use crate::error::CryptoError;

/// Header magic of version 1 barcodes.
pub const SCHEME_A_MAGIC: [u8; 4] = [0x01, 0xe1, 0x02, 0x45];
/// Header magic of version 2 barcodes.
pub const SCHEME_B_MAGIC: [u8; 4] = [0x01, 0x9b, 0x09, 0x45];

const SCHEME_A_MODULUS_128: [u8; 128] = [
    0xfe, 0xd2, 0xe1, 0xc2, 0x7e, 0x33, 0x63, 0x31, 0x6e, 0x77, 0x31, 0x7a, 0x7a, 0x52, 0xc5, 0x49,
    0x81, 0x39, 0x51, 0x86, 0xbe, 0x49, 0x74, 0x76, 0x0c, 0x72, 0x51, 0x8d, 0x63, 0xe0, 0x54, 0x4a,
    0x48, 0xd0, 0x88, 0xb3, 0x32, 0xc5, 0xb0, 0xc3, 0x70, 0xc7, 0x65, 0xd6, 0x5d, 0x98, 0x3c, 0x1f,
    0x9d, 0xe0, 0xa4, 0x2b, 0x31, 0x0c, 0xcc, 0x07, 0xae, 0x77, 0x0b, 0xd2, 0xb6, 0x1d, 0x6a, 0x4d,
    0xcc, 0xea, 0xc7, 0x57, 0x68, 0x9b, 0xdc, 0xbf, 0x60, 0x84, 0x78, 0xfa, 0xf3, 0x12, 0xf6, 0x08,
    0x7c, 0xc4, 0x96, 0xc3, 0x76, 0x2c, 0xf5, 0xc4, 0x65, 0x1c, 0xae, 0xcd, 0xa3, 0x49, 0x9f, 0xae,
    0x7e, 0xdb, 0x7e, 0xb4, 0x0e, 0x3e, 0x18, 0xeb, 0x30, 0x41, 0x70, 0xe9, 0x1e, 0xd5, 0xb1, 0x56,
    0xaa, 0xce, 0x6f, 0x43, 0x2d, 0x6e, 0xca, 0x6c, 0xc3, 0x58, 0x51, 0xde, 0x8c, 0x67, 0x8f, 0x67,
];

const SCHEME_A_EXPONENT_128: [u8; 16] = [
    0xbb, 0x79, 0x7f, 0xfd, 0xec, 0x7f, 0x9e, 0x42, 0xc9, 0xd6, 0xf7, 0x9b, 0x13, 0x70, 0x59, 0xdb,
];

const SCHEME_A_MODULUS_74: [u8; 74] = [
    0xff, 0x3c, 0xec, 0x6b, 0x5f, 0x40, 0xe3, 0xc3, 0x66, 0x14, 0x51, 0xb9, 0xfc, 0xfa, 0xef, 0x3a,
    0xeb, 0x06, 0xdc, 0x23, 0x29, 0xc0, 0xe6, 0xf4, 0xdc, 0xcc, 0x92, 0x79, 0x72, 0x67, 0x16, 0xce,
    0x15, 0xbb, 0xe0, 0x5e, 0xed, 0x2c, 0x57, 0x11, 0xbc, 0xf8, 0xf5, 0xb6, 0xc8, 0xf7, 0x27, 0x6d,
    0xb5, 0xc4, 0x3b, 0xfa, 0xa3, 0x04, 0x0d, 0xc0, 0x1a, 0xb1, 0x4b, 0x9c, 0x4d, 0x16, 0xf7, 0x1c,
    0x0c, 0xe5, 0xea, 0x95, 0x3f, 0x0c, 0x75, 0x4c, 0x6b, 0x17,
];

const SCHEME_A_EXPONENT_74: [u8; 16] = [
    0xdb, 0x05, 0xba, 0x82, 0x2d, 0x9a, 0xcc, 0x33, 0xfa, 0xb7, 0xd8, 0xf4, 0x27, 0xf9, 0xce, 0x65,
];

const SCHEME_B_MODULUS_128: [u8; 128] = [
    0xca, 0x9f, 0x18, 0xef, 0x6c, 0x3f, 0x3f, 0xa4, 0xc5, 0xa4, 0x61, 0xfe, 0xa5, 0x4a, 0xb1, 0x94,
    0x06, 0xba, 0x5e, 0xcd, 0x74, 0x6d, 0x60, 0xa2, 0x74, 0x92, 0xdc, 0xa3, 0xd7, 0x4e, 0x3b, 0x5c,
    0x1d, 0x31, 0x5f, 0x7b, 0x10, 0x38, 0x32, 0x41, 0x80, 0x9b, 0x02, 0x9e, 0xbb, 0xd5, 0xde, 0x4d,
    0x11, 0x60, 0x30, 0xcc, 0x57, 0xf7, 0xd5, 0xa6, 0xc9, 0xa1, 0x6f, 0x37, 0x3b, 0xb1, 0x4a, 0x50,
    0x85, 0x23, 0xf7, 0xe8, 0x0a, 0x4c, 0x74, 0x4d, 0x90, 0x85, 0x66, 0x3a, 0x4a, 0x14, 0x72, 0xd7,
    0xaf, 0x2c, 0x56, 0xae, 0x41, 0xb5, 0x06, 0x5f, 0x7e, 0xfa, 0x02, 0x93, 0xbd, 0x32, 0x78, 0xad,
    0x69, 0x35, 0x46, 0xf9, 0xf1, 0x62, 0x19, 0xb7, 0x9f, 0xf4, 0x71, 0xa3, 0x63, 0x68, 0x24, 0xcf,
    0xfc, 0xdb, 0x63, 0xa8, 0xed, 0x80, 0x59, 0xe6, 0xb9, 0xa4, 0xf0, 0xdb, 0x89, 0x53, 0x81, 0xcb,
];

const SCHEME_B_EXPONENT_128: [u8; 16] = [
    0x18, 0x70, 0x92, 0xda, 0x64, 0x54, 0xce, 0xb1, 0x85, 0x3e, 0x69, 0x15, 0xf8, 0x46, 0x6a, 0x05,
];

const SCHEME_B_MODULUS_74: [u8; 74] = [
    0xb4, 0x04, 0xa0, 0xdf, 0x11, 0xd1, 0xca, 0xcf, 0xf1, 0xa1, 0xa0, 0x48, 0xd4, 0xd5, 0x73, 0xf9,
    0x53, 0xa6, 0x2c, 0x58, 0x3d, 0x74, 0x92, 0x59, 0x27, 0x56, 0x1a, 0x6d, 0x7a, 0x1e, 0x2b, 0x14,
    0x04, 0x25, 0x26, 0xaf, 0x70, 0xb5, 0x50, 0x54, 0x73, 0x90, 0xea, 0x6e, 0xc7, 0x48, 0xd3, 0x0f,
    0xdb, 0x81, 0xad, 0xb4, 0x90, 0xe0, 0xc3, 0x6a, 0x19, 0x86, 0xb4, 0x04, 0xb2, 0xf5, 0xf6, 0x9e,
    0xf5, 0xda, 0x1b, 0x66, 0x3e, 0x59, 0x50, 0x91, 0x30, 0xe7,
];

const SCHEME_B_EXPONENT_74: [u8; 16] = [
    0x30, 0x9c, 0xfe, 0xd9, 0x71, 0x9f, 0xe2, 0xa5, 0xe2, 0x0c, 0x9b, 0xb4, 0x47, 0x65, 0x38, 0x2b,
];

/// A public RSA key and the fixed width of the blocks it transforms.
#[derive(Debug, Clone, Copy)]
pub struct RsaKeyPair {
    /// Big-endian modulus.
    pub modulus: &'static [u8],
    /// Big-endian public exponent.
    pub public_exponent: &'static [u8],
    /// Width of both the input and the output block, in bytes.
    pub block_width: usize,
}

/// The two keys needed to unlock one barcode payload.
#[derive(Debug, Clone, Copy)]
pub struct KeySet {
    /// Key for the five leading 128-byte blocks.
    pub wide: RsaKeyPair,
    /// Key for the trailing 74-byte block.
    pub narrow: RsaKeyPair,
}

pub const SCHEME_A_KEYS: KeySet = KeySet {
    wide: RsaKeyPair {
        modulus: &SCHEME_A_MODULUS_128,
        public_exponent: &SCHEME_A_EXPONENT_128,
        block_width: 128,
    },
    narrow: RsaKeyPair {
        modulus: &SCHEME_A_MODULUS_74,
        public_exponent: &SCHEME_A_EXPONENT_74,
        block_width: 74,
    },
};

pub const SCHEME_B_KEYS: KeySet = KeySet {
    wide: RsaKeyPair {
        modulus: &SCHEME_B_MODULUS_128,
        public_exponent: &SCHEME_B_EXPONENT_128,
        block_width: 128,
    },
    narrow: RsaKeyPair {
        modulus: &SCHEME_B_MODULUS_74,
        public_exponent: &SCHEME_B_EXPONENT_74,
        block_width: 74,
    },
};

/// The key scheme a barcode was signed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyScheme {
    /// Version 1 barcodes, header `01 E1 02 45`.
    A,
    /// Version 2 barcodes, header `01 9B 09 45`.
    B,
}

impl KeyScheme {
    /// Selects the key scheme from the first four bytes of an encrypted buffer.
    ///
    /// Headers that match neither magic fall back to scheme A.
    pub fn from_header(header: &[u8]) -> Self {
        if header.starts_with(&SCHEME_A_MAGIC) {
            KeyScheme::A
        } else if header.starts_with(&SCHEME_B_MAGIC) {
            KeyScheme::B
        } else {
            // FIXME: Possibly an accidental default. Confirm against real unknown-version
            // barcodes whether this should be an error instead.
            warn!(
                "Unknown header magic {:02x?}, falling back to scheme A keys",
                &header[..header.len().min(4)]
            );
            KeyScheme::A
        }
    }

    pub fn keys(self) -> &'static KeySet {
        match self {
            KeyScheme::A => &SCHEME_A_KEYS,
            KeyScheme::B => &SCHEME_B_KEYS,
        }
    }
}

/// Applies `m^e mod n` to one big-endian block without any padding scheme.
///
/// The result is zero-padded on the left to `key.block_width` bytes. `offset` is only
/// used to report where a rejected block came from.
pub fn raw_transform(
    block: &[u8],
    key: &RsaKeyPair,
    offset: usize,
) -> Result<Vec<u8>, CryptoError> {
    let modulus = BigUint::from_bytes_be(key.modulus);
    let exponent = BigUint::from_bytes_be(key.public_exponent);

    if modulus.bits() > (key.block_width as u64) * 8 {
        return Err(CryptoError::ModulusTooWide {
            modulus_bits: modulus.bits(),
            block_width: key.block_width,
        });
    }

    let input = BigUint::from_bytes_be(block);
    if input >= modulus {
        return Err(CryptoError::BlockTooLarge {
            offset,
            width: block.len(),
        });
    }

    let output = input.modpow(&exponent, &modulus).to_bytes_be();
    trace!("Transformed {}-byte block at offset {}", block.len(), offset);

    // `output < modulus`, which fits in the block width
    let mut result = vec![0u8; key.block_width.saturating_sub(output.len())];
    result.extend(output);

    Ok(result)
}
