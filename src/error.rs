// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/error.rs - Error types for South African driving license decoding.
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

use thiserror::Error;

/// Failures of the raw RSA block transform.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// The big-endian value of a cipher block is not smaller than the key's modulus.
    #[error("Cipher block at offset {offset} ({width} bytes) is not smaller than the modulus")]
    BlockTooLarge { offset: usize, width: usize },

    /// The key's modulus does not fit in its declared block width.
    #[error("Modulus of {modulus_bits} bits does not fit in {block_width}-byte blocks")]
    ModulusTooWide {
        modulus_bits: u64,
        block_width: usize,
    },
}

/// Structural errors found while walking a plaintext payload.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    /// The `0x82` section marker does not occur anywhere in the payload.
    #[error("Section marker 0x82 not found in payload")]
    MarkerNotFound,

    /// The `0x57` byte closing the nibble section was never reached.
    #[error("Nibble section starting at offset {start} is not terminated by 0x57")]
    MissingSentinel { start: usize },

    /// A date or flag needed more nibbles than the queue still holds.
    #[error("Nibble queue underflow: needed {needed}, but only {remaining} remain")]
    QueueUnderflow { needed: usize, remaining: usize },

    /// A read ran past the end of the buffer.
    #[error("Truncated input while reading {context}: needed {needed} bytes at offset {offset}")]
    TruncatedInput {
        context: &'static str,
        offset: usize,
        needed: usize,
    },
}

/// The error type for every decoding entry point in this crate.
#[derive(Debug, Error)]
pub enum LicenseError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid base64 input: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The input is not exactly as long as an encrypted barcode payload.
    #[error("Invalid input length: expected {expected} bytes, but found {found} bytes")]
    InputLength { expected: usize, found: usize },

    /// The barcode reader did not find a PDF417 symbol in the image.
    #[error("No PDF417 barcode found in image")]
    BarcodeNotFound,

    #[error("Decryption failed: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Invalid payload format: {0}")]
    Format(#[from] FormatError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, LicenseError>;
