// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/nibble.rs - Nibble-packed section reader for driving license payloads.
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

use log::trace;

use crate::error::FormatError;

/// Raw byte that closes the nibble section.
pub const SECTION_END: u8 = 0x57;

/// Leading nibble of a date that is not present.
const DATE_ABSENT: u8 = 10;

/// A front-to-back queue of 4-bit values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NibbleQueue {
    nibbles: Vec<u8>,
    position: usize,
}

impl NibbleQueue {
    pub fn new(nibbles: Vec<u8>) -> Self {
        Self {
            nibbles,
            position: 0,
        }
    }

    /// Splits every byte from `pos` up to the [SECTION_END] byte into its high and low
    /// nibbles.
    ///
    /// # Returns
    ///
    /// The queue and the position just past the [SECTION_END] byte.
    pub fn fill(data: &[u8], pos: usize) -> Result<(Self, usize), FormatError> {
        let section = data.get(pos..).unwrap_or_default();
        let len = section
            .iter()
            .position(|&b| b == SECTION_END)
            .ok_or(FormatError::MissingSentinel { start: pos })?;

        let nibbles = section[..len]
            .iter()
            .flat_map(|&b| [b >> 4, b & 0x0f])
            .collect::<Vec<_>>();
        trace!("Nibble section at offset {}: {} bytes", pos, len);

        Ok((Self::new(nibbles), pos + len + 1))
    }

    /// Number of nibbles not yet consumed.
    pub fn remaining(&self) -> usize {
        self.nibbles.len() - self.position
    }

    fn take(&mut self, count: usize) -> Result<&[u8], FormatError> {
        if self.remaining() < count {
            return Err(FormatError::QueueUnderflow {
                needed: count,
                remaining: self.remaining(),
            });
        }
        let taken = &self.nibbles[self.position..self.position + count];
        self.position += count;
        Ok(taken)
    }

    pub fn pop(&mut self) -> Result<u8, FormatError> {
        Ok(self.take(1)?[0])
    }

    /// Reads two nibbles and renders them as their decimal values, concatenated.
    pub fn read_pair(&mut self) -> Result<String, FormatError> {
        Ok(digits(self.take(2)?))
    }

    /// Reads one date as `YYYY/MM/DD`.
    ///
    /// A leading nibble of 10 marks the date as absent: only that nibble is consumed
    /// and an empty string is returned. Otherwise eight nibbles are consumed.
    pub fn read_date(&mut self) -> Result<String, FormatError> {
        let first = self.pop()?;
        if first == DATE_ABSENT {
            return Ok(String::new());
        }

        let rest = self.take(7)?;
        Ok(format!(
            "{}{}/{}/{}",
            first,
            digits(&rest[0..3]),
            digits(&rest[3..5]),
            digits(&rest[5..7])
        ))
    }

    /// Reads exactly `count` dates and keeps the ones that are present, in order.
    pub fn read_date_list(&mut self, count: usize) -> Result<Vec<String>, FormatError> {
        let mut dates = Vec::with_capacity(count);
        for _ in 0..count {
            let date = self.read_date()?;
            if !date.is_empty() {
                dates.push(date);
            }
        }
        Ok(dates)
    }
}

fn digits(nibbles: &[u8]) -> String {
    nibbles.iter().map(|n| n.to_string()).collect()
}
