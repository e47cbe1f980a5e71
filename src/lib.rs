// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/lib.rs - Decoder and parser library for South African driving licenses.
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

/*!
 * # `sadl` Crate
 *
 * A library for decrypting and parsing the PDF417 barcode on the back of a
 * South African driving license card.
 *
 * This crate provides a full pipeline for working with the barcode payload:
 *
 * 1. [decoder]: Unlocks the 720-byte payload with the issuer's RSA public keys.
 * 2. [parser]: Walks the decrypted bytes and builds a [DrivingLicense].
 *
 * Reading the barcode from an image is left to an external [BarcodeReader].
 *
 * ## Usage Example
 *
 * ```no_run
 * use sadl::decoder::DecodedPayload;
 * use sadl::license::DrivingLicense;
 *
 * fn main() -> Result<(), Box<dyn std::error::Error>> {
 *     // Read and decrypt the raw barcode bytes
 *     let decoded = DecodedPayload::from_filename("license.bin", true)?;
 *
 *     // Parse the decrypted payload
 *     let license = DrivingLicense::from_decoded(&decoded)?;
 *
 *     println!("{}", license);
 *
 *     Ok(())
 * }
 * ```
 */

pub mod barcode;
pub mod crypto;
pub mod decoder;
pub mod error;
pub mod license;
pub mod nibble;
pub mod parser;

use std::fs;

pub use barcode::BarcodeReader;
pub use error::{CryptoError, FormatError, LicenseError, Result};
pub use license::{DrivingLicense, Gender};

use decoder::DecodedPayload;

/// How a license payload is stored in a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Base64 text.
    Base64,
    /// Raw bytes.
    Raw,
}

/// Parses raw barcode bytes, decrypting them first if `encrypted` is set.
pub fn parse_bytes(data: &[u8], encrypted: bool) -> Result<DrivingLicense> {
    DrivingLicense::from_decoded(&DecodedPayload::from_bytes(data, encrypted)?)
}

/// Parses base64-encoded barcode bytes.
pub fn parse_base64(text: &str, encrypted: bool) -> Result<DrivingLicense> {
    DrivingLicense::from_decoded(&DecodedPayload::from_base64(text, encrypted)?)
}

/// Parses a file holding barcode bytes in the given form.
pub fn parse_file(filename: &str, kind: SourceKind, encrypted: bool) -> Result<DrivingLicense> {
    let decoded = match kind {
        SourceKind::Base64 => {
            DecodedPayload::from_base64(&fs::read_to_string(filename)?, encrypted)?
        }
        SourceKind::Raw => DecodedPayload::from_filename(filename, encrypted)?,
    };
    DrivingLicense::from_decoded(&decoded)
}

/// Reads the barcode in `image` with `reader` and parses its payload.
pub fn parse_image<R: BarcodeReader + ?Sized>(
    reader: &R,
    image: &[u8],
    license_key: &str,
    encrypted: bool,
) -> Result<DrivingLicense> {
    DrivingLicense::from_decoded(&DecodedPayload::from_barcode(
        reader,
        image,
        license_key,
        encrypted,
    )?)
}
