// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/barcode.rs - Interface to an external PDF417 barcode reader.
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

use crate::error::Result;

/// Something that can find a PDF417 symbol in an image and return its raw bytes.
///
/// Reading the symbol from the license card is left to a third-party SDK, which
/// usually needs a license key of its own.
pub trait BarcodeReader {
    /// Decodes the first PDF417 symbol found in `image`.
    ///
    /// # Returns
    ///
    /// `Ok(None)` if the image holds no readable symbol.
    fn decode(&self, image: &[u8], license_key: &str) -> Result<Option<Vec<u8>>>;
}

impl<F> BarcodeReader for F
where
    F: Fn(&[u8], &str) -> Option<Vec<u8>>,
{
    fn decode(&self, image: &[u8], license_key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self(image, license_key))
    }
}
