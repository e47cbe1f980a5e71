// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/parser.rs - Parser library for South African driving license payloads.
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
 * # `parser` Module
 *
 * This module walks a decrypted license payload and assembles a
 * [DrivingLicense] from it.
 *
 * The payload has three sections:
 *
 * 1. Text fields, each terminated by `0xE0` or `0xE1`, starting two bytes after
 *    the first `0x82` marker.
 * 2. A binary section of nibble-packed dates and codes, closed by `0x57`.
 * 3. Image metadata, of which only the width and height are read.
 *
 * ## Usage Example
 *
 * ```no_run
 * use sadl::decoder::DecodedPayload;
 * use sadl::parser::parse_payload;
 *
 * fn main() -> Result<(), Box<dyn std::error::Error>> {
 *     let decoded = DecodedPayload::from_filename("license.bin", true)?;
 *     let license = parse_payload(&decoded.content)?;
 *     println!("{}", license.surname);
 *     Ok(())
 * }
 * ```
 */

use log::{debug, trace};

use crate::error::FormatError;
use crate::license::{DrivingLicense, Gender};
use crate::nibble::NibbleQueue;

/// Marks the start of the text section.
const SECTION_MARKER: u8 = 0x82;

const ID_NUMBER_LEN: usize = 13;

/// The byte that ended a delimited text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminator {
    /// `0xE0`, a plain field end.
    End,
    /// `0xE1`, a field end that also closes the surrounding field group when the
    /// field has content.
    EndSkip,
}

impl Terminator {
    fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0xe0 => Some(Terminator::End),
            0xe1 => Some(Terminator::EndSkip),
            _ => None,
        }
    }
}

/// A forward-only reader over a plaintext payload.
#[derive(Debug)]
pub struct PayloadReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> PayloadReader<'a> {
    pub fn new(data: &'a [u8], pos: usize) -> Self {
        Self { data, pos }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Reads one text field up to and including its terminator byte.
    ///
    /// Bytes are taken as Latin-1 characters. The terminator is consumed but not
    /// included in the returned text.
    pub fn read_field(&mut self) -> Result<(String, Terminator), FormatError> {
        let start = self.pos;
        let rest = self.data.get(start..).unwrap_or_default();
        for (i, &byte) in rest.iter().enumerate() {
            if let Some(terminator) = Terminator::from_byte(byte) {
                self.pos = start + i + 1;
                let text = rest[..i].iter().map(|&b| char::from(b)).collect::<String>();
                return Ok((text, terminator));
            }
        }

        // Out of data before a terminator byte was found
        Err(FormatError::TruncatedInput {
            context: "delimited field",
            offset: start + rest.len(),
            needed: 1,
        })
    }

    /// Reads up to `max_slots` fields, keeping the non-empty ones.
    ///
    /// A non-empty field ended by [Terminator::EndSkip] is the last field of the
    /// group, and the remaining slots are left unread. An empty field ended by
    /// [Terminator::EndSkip] only uses up its own slot, like [Terminator::End].
    pub fn read_field_group(&mut self, max_slots: usize) -> Result<Vec<String>, FormatError> {
        let mut fields = Vec::with_capacity(max_slots);
        for _ in 0..max_slots {
            let (text, terminator) = self.read_field()?;
            if text.is_empty() {
                continue;
            }

            fields.push(text);
            if terminator == Terminator::EndSkip {
                break;
            }
        }
        Ok(fields)
    }

    pub fn read_bytes(
        &mut self,
        len: usize,
        context: &'static str,
    ) -> Result<&'a [u8], FormatError> {
        let data = self.data;
        let bytes = data
            .get(self.pos..)
            .and_then(|rest| rest.get(..len))
            .ok_or(FormatError::TruncatedInput {
                context,
                offset: self.pos,
                needed: len,
            })?;
        self.pos += len;
        Ok(bytes)
    }

    pub fn read_u8(&mut self, context: &'static str) -> Result<u8, FormatError> {
        Ok(self.read_bytes(1, context)?[0])
    }

    pub fn skip(&mut self, len: usize, context: &'static str) -> Result<(), FormatError> {
        self.read_bytes(len, context).map(|_| ())
    }

    /// Consumes the nibble section, including its closing `0x57` byte.
    pub fn read_nibbles(&mut self) -> Result<NibbleQueue, FormatError> {
        let (queue, pos) = NibbleQueue::fill(self.data, self.pos)?;
        self.pos = pos;
        Ok(queue)
    }
}

/// Parses a decrypted payload into a [DrivingLicense].
///
/// Any structural problem aborts the whole parse. No partial record is returned.
pub fn parse_payload(data: &[u8]) -> Result<DrivingLicense, FormatError> {
    let marker = data
        .iter()
        .position(|&b| b == SECTION_MARKER)
        .ok_or(FormatError::MarkerNotFound)?;
    trace!("Section marker at offset {}", marker);

    // Section 1: Strings
    let mut reader = PayloadReader::new(data, marker + 2);

    let vehicle_codes = reader.read_field_group(4)?;
    let (surname, _) = reader.read_field()?;
    let (initials, terminator) = reader.read_field()?;

    // The PrDP code is only present when the initials end with a plain terminator
    let prdp_code = match terminator {
        Terminator::End => reader.read_field()?.0,
        Terminator::EndSkip => String::new(),
    };

    let (id_country_of_issue, _) = reader.read_field()?;
    let (license_country_of_issue, _) = reader.read_field()?;
    let vehicle_restrictions = reader.read_field_group(4)?;
    let (license_number, _) = reader.read_field()?;

    let id_number = reader
        .read_bytes(ID_NUMBER_LEN, "ID number")?
        .iter()
        .map(|&b| char::from(b))
        .collect::<String>();

    // Section 2: Binary data
    let id_number_type = format!("{:02}", reader.read_u8("ID number type")?);

    let mut nibbles = reader.read_nibbles()?;
    trace!("Nibble section holds {} nibbles", nibbles.remaining());

    let license_code_issue_dates = nibbles.read_date_list(4)?;
    let driver_restriction_codes = nibbles.read_pair()?;
    let prdp_permit_expiry_date = nibbles.read_date()?;
    let license_issue_number = nibbles.read_pair()?;
    let birthdate = nibbles.read_date()?;
    let license_issue_date = nibbles.read_date()?;
    let license_expiry_date = nibbles.read_date()?;
    let gender = Gender::from_code(&nibbles.read_pair()?);

    // Section 3: Image metadata
    reader.skip(3, "image header")?;
    let image_width = reader.read_u8("image width")?;
    reader.skip(1, "image header")?;
    let image_height = reader.read_u8("image height")?;

    debug!(
        "Parsed license {:?} ({} vehicle codes, {} code issue dates)",
        license_number,
        vehicle_codes.len(),
        license_code_issue_dates.len()
    );

    Ok(DrivingLicense {
        vehicle_codes,
        surname,
        initials,
        prdp_code,
        id_country_of_issue,
        license_country_of_issue,
        vehicle_restrictions,
        license_number,
        id_number,
        id_number_type,
        license_code_issue_dates,
        driver_restriction_codes,
        prdp_permit_expiry_date,
        license_issue_number,
        birthdate,
        license_issue_date,
        license_expiry_date,
        gender,
        image_width,
        image_height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds the text section of a payload, with the marker at offset 2.
    fn text_section(fields: &[(&str, u8)]) -> Vec<u8> {
        let mut data = vec![0x01, 0x9b, SECTION_MARKER, 0x00];
        for (text, terminator) in fields {
            data.extend(text.as_bytes());
            data.push(*terminator);
        }
        data
    }

    fn binary_section(data: &mut Vec<u8>, nibbles: &[u8]) {
        assert_eq!(nibbles.len() % 2, 0);
        for pair in nibbles.chunks(2) {
            data.push(pair[0] << 4 | pair[1]);
        }
        data.push(0x57);
    }

    fn sample_payload(with_prdp: bool) -> Vec<u8> {
        let mut fields = vec![
            ("A1", 0xe0),
            ("B", 0xe0),
            ("", 0xe0),
            ("", 0xe1),
            ("SMITH", 0xe0),
        ];
        if with_prdp {
            fields.push(("JA", 0xe0));
            fields.push(("G", 0xe0));
        } else {
            fields.push(("JA", 0xe1));
        }
        fields.extend([
            ("ZA", 0xe0),
            ("ZA", 0xe0),
            ("", 0xe0),
            ("", 0xe0),
            ("", 0xe0),
            ("", 0xe0),
            ("40310000ABCD", 0xe0),
        ]);

        let mut data = text_section(&fields);
        data.extend(b"8407235000080");
        data.push(0x02);

        #[rustfmt::skip]
        let nibbles = [
            // License code issue dates
            2, 0, 0, 5, 0, 1, 1, 0,
            2, 0, 1, 1, 0, 6, 3, 0,
            10,
            10,
            // Driver restriction codes
            1, 0,
            // PrDP permit expiry date
            10,
            // License issue number
            0, 2,
            // Birthdate
            1, 9, 8, 4, 0, 7, 2, 3,
            // License issue date
            2, 0, 1, 9, 0, 1, 1, 5,
            // License expiry date
            2, 0, 2, 4, 0, 1, 1, 4,
            // Gender
            0, 1,
            // Padding
            0,
        ];
        binary_section(&mut data, &nibbles);

        data.extend([0x00, 0x00, 0x00, 250, 0x00, 200, 0xff, 0xff]);
        data
    }

    #[test]
    fn test_read_field() {
        let data = [0x41, 0x42, 0xe0];
        let mut reader = PayloadReader::new(&data, 0);
        assert_eq!(
            reader.read_field().unwrap(),
            ("AB".to_string(), Terminator::End)
        );
        assert_eq!(reader.position(), 3);
    }

    #[test]
    fn test_read_field_latin1() {
        let data = [0x4d, 0xc9, 0xe1];
        let mut reader = PayloadReader::new(&data, 0);
        assert_eq!(
            reader.read_field().unwrap(),
            ("MÉ".to_string(), Terminator::EndSkip)
        );
    }

    #[test]
    fn test_read_field_unterminated() {
        let data = [0x41, 0x42];
        let mut reader = PayloadReader::new(&data, 0);
        assert_eq!(
            reader.read_field(),
            Err(FormatError::TruncatedInput {
                context: "delimited field",
                offset: 2,
                needed: 1
            })
        );
    }

    #[test]
    fn test_field_group_stops_after_non_empty_end_skip() {
        let data = [0x41, 0xe1, 0x42, 0xe0];
        let mut reader = PayloadReader::new(&data, 0);
        assert_eq!(reader.read_field_group(4).unwrap(), vec!["A"]);
        assert_eq!(reader.position(), 2);
    }

    #[test]
    fn test_field_group_empty_end_skip_uses_one_slot() {
        let data = [0xe1, 0x41, 0xe0, 0xe0, 0x42, 0xe0, 0x43, 0xe0];
        let mut reader = PayloadReader::new(&data, 0);
        assert_eq!(reader.read_field_group(4).unwrap(), vec!["A", "B"]);
        assert_eq!(reader.position(), 6);
    }

    #[test]
    fn test_field_group_drops_empty_fields() {
        let data = [0xe0, 0x41, 0xe0, 0xe0, 0xe0, 0x42, 0xe0];
        let mut reader = PayloadReader::new(&data, 0);
        assert_eq!(reader.read_field_group(4).unwrap(), vec!["A"]);
        assert_eq!(reader.position(), 5);
    }

    #[test]
    fn test_read_bytes_truncated() {
        let data = [0x01, 0x02];
        let mut reader = PayloadReader::new(&data, 1);
        assert_eq!(
            reader.read_bytes(13, "ID number"),
            Err(FormatError::TruncatedInput {
                context: "ID number",
                offset: 1,
                needed: 13
            })
        );
        assert_eq!(reader.position(), 1);
    }

    #[test]
    fn test_parse_payload() {
        let license = parse_payload(&sample_payload(false)).unwrap();

        assert_eq!(license.vehicle_codes, vec!["A1", "B"]);
        assert_eq!(license.surname, "SMITH");
        assert_eq!(license.initials, "JA");
        assert_eq!(license.prdp_code, "");
        assert_eq!(license.id_country_of_issue, "ZA");
        assert_eq!(license.license_country_of_issue, "ZA");
        assert!(license.vehicle_restrictions.is_empty());
        assert_eq!(license.license_number, "40310000ABCD");
        assert_eq!(license.id_number, "8407235000080");
        assert_eq!(license.id_number_type, "02");
        assert_eq!(
            license.license_code_issue_dates,
            vec!["2005/01/10", "2011/06/30"]
        );
        assert_eq!(license.driver_restriction_codes, "10");
        assert_eq!(license.prdp_permit_expiry_date, "");
        assert_eq!(license.license_issue_number, "02");
        assert_eq!(license.birthdate, "1984/07/23");
        assert_eq!(license.license_issue_date, "2019/01/15");
        assert_eq!(license.license_expiry_date, "2024/01/14");
        assert_eq!(license.gender, Gender::Male);
        assert_eq!(license.image_width, 250);
        assert_eq!(license.image_height, 200);
    }

    #[test]
    fn test_parse_payload_with_prdp_code() {
        let license = parse_payload(&sample_payload(true)).unwrap();
        assert_eq!(license.initials, "JA");
        assert_eq!(license.prdp_code, "G");
        assert_eq!(license.id_country_of_issue, "ZA");
        assert_eq!(license.license_number, "40310000ABCD");
    }

    #[test]
    fn test_parse_payload_missing_marker() {
        let mut data = sample_payload(false);
        data.retain(|&b| b != SECTION_MARKER);
        assert_eq!(parse_payload(&data), Err(FormatError::MarkerNotFound));
    }

    #[test]
    fn test_parse_payload_missing_nibble_sentinel() {
        let mut data = sample_payload(false);
        let end = data.iter().rposition(|&b| b == 0x57).unwrap();
        data.truncate(end);
        assert!(matches!(
            parse_payload(&data),
            Err(FormatError::MissingSentinel { .. })
        ));
    }

    #[test]
    fn test_parse_payload_truncated_image_metadata() {
        let mut data = sample_payload(false);
        data.truncate(data.len() - 3);
        assert_eq!(
            parse_payload(&data),
            Err(FormatError::TruncatedInput {
                context: "image height",
                offset: data.len(),
                needed: 1
            })
        );
    }

    #[test]
    fn test_parse_payload_short_nibble_section() {
        let mut data = text_section(&[
            ("", 0xe1),
            ("", 0xe1),
            ("", 0xe1),
            ("", 0xe1),
            ("DOE", 0xe0),
            ("J", 0xe1),
            ("ZA", 0xe0),
            ("ZA", 0xe0),
            ("", 0xe0),
            ("", 0xe0),
            ("", 0xe0),
            ("", 0xe0),
            ("1", 0xe0),
        ]);
        data.extend(b"0000000000000");
        data.push(0x02);
        binary_section(&mut data, &[10, 10, 10, 10, 0, 0]);
        assert_eq!(
            parse_payload(&data),
            Err(FormatError::QueueUnderflow {
                needed: 1,
                remaining: 0
            })
        );
    }
}
