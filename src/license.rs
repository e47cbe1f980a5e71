// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/license.rs - Driving license record and its text renderings.
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

use std::fmt;
use std::io::Write;

use crate::decoder::DecodedPayload;
use crate::error::Result;
use crate::parser::parse_payload;

/// The license holder's gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Maps the two-digit gender code. Only `"01"` is male.
    pub fn from_code(code: &str) -> Self {
        if code == "01" {
            Gender::Male
        } else {
            Gender::Female
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "male"),
            Gender::Female => write!(f, "female"),
        }
    }
}

/// One of the two driver restrictions encoded in
/// [DrivingLicense::driver_restriction_codes].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverRestriction {
    None,
    CorrectiveLenses,
    ArtificialLimb,
    /// A code outside the documented range, kept as-is.
    Unknown(char),
}

impl From<char> for DriverRestriction {
    fn from(code: char) -> Self {
        match code {
            '0' => DriverRestriction::None,
            '1' => DriverRestriction::CorrectiveLenses,
            '2' => DriverRestriction::ArtificialLimb,
            c => DriverRestriction::Unknown(c),
        }
    }
}

/// A decoded South African driving license.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrivingLicense {
    /// Up to four vehicle class codes, e.g. `"EB"`.
    pub vehicle_codes: Vec<String>,
    pub surname: String,
    pub initials: String,
    /// Professional Driving Permit code, empty if the holder has none.
    pub prdp_code: String,
    pub id_country_of_issue: String,
    pub license_country_of_issue: String,
    /// Up to four vehicle restrictions.
    pub vehicle_restrictions: Vec<String>,
    pub license_number: String,
    /// The 13-character ID number.
    pub id_number: String,
    /// Two-digit ID number type. `"02"` is a South African ID.
    pub id_number_type: String,
    /// Issue dates of the vehicle codes, as `YYYY/MM/DD`.
    pub license_code_issue_dates: Vec<String>,
    /// Two driver restriction digits, see [DriverRestriction].
    pub driver_restriction_codes: String,
    /// PrDP expiry date as `YYYY/MM/DD`, empty if absent.
    pub prdp_permit_expiry_date: String,
    pub license_issue_number: String,
    pub birthdate: String,
    /// Start of the license validity period.
    pub license_issue_date: String,
    /// End of the license validity period.
    pub license_expiry_date: String,
    pub gender: Gender,
    /// Width of the embedded photo.
    pub image_width: u8,
    /// Height of the embedded photo.
    pub image_height: u8,
}

/// Column names used by [write_csv], in field order.
pub const CSV_HEADER: [&str; 20] = [
    "vehicle_codes",
    "surname",
    "initials",
    "prdp_code",
    "id_country_of_issue",
    "license_country_of_issue",
    "vehicle_restrictions",
    "license_number",
    "id_number",
    "id_number_type",
    "license_code_issue_dates",
    "driver_restriction_codes",
    "prdp_permit_expiry_date",
    "license_issue_number",
    "birthdate",
    "license_issue_date",
    "license_expiry_date",
    "gender",
    "image_width",
    "image_height",
];

impl DrivingLicense {
    /// Parses a decoded payload into a license.
    ///
    /// # Arguments
    ///
    /// * `decoded` - The decrypted barcode payload.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `DrivingLicense` or an error.
    pub fn from_decoded(decoded: &DecodedPayload) -> Result<Self> {
        Ok(parse_payload(&decoded.content)?)
    }

    /// Whether the ID number is a South African national ID number.
    pub fn has_national_id(&self) -> bool {
        self.id_number_type == "02"
    }

    /// Interprets [DrivingLicense::driver_restriction_codes].
    pub fn driver_restrictions(&self) -> Vec<DriverRestriction> {
        self.driver_restriction_codes
            .chars()
            .map(DriverRestriction::from)
            .collect()
    }

    fn csv_record(&self) -> [String; 20] {
        [
            self.vehicle_codes.join(";"),
            self.surname.clone(),
            self.initials.clone(),
            self.prdp_code.clone(),
            self.id_country_of_issue.clone(),
            self.license_country_of_issue.clone(),
            self.vehicle_restrictions.join(";"),
            self.license_number.clone(),
            self.id_number.clone(),
            self.id_number_type.clone(),
            self.license_code_issue_dates.join(";"),
            self.driver_restriction_codes.clone(),
            self.prdp_permit_expiry_date.clone(),
            self.license_issue_number.clone(),
            self.birthdate.clone(),
            self.license_issue_date.clone(),
            self.license_expiry_date.clone(),
            self.gender.to_string(),
            self.image_width.to_string(),
            self.image_height.to_string(),
        ]
    }
}

impl fmt::Display for DrivingLicense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Vehicle codes: {:?}", self.vehicle_codes)?;
        writeln!(f, "Surname: {}", self.surname)?;
        writeln!(f, "Initials: {}", self.initials)?;
        writeln!(f, "PrDP Code: {}", self.prdp_code)?;
        writeln!(f, "ID Country of Issue: {}", self.id_country_of_issue)?;
        writeln!(f, "License Country of Issue: {}", self.license_country_of_issue)?;
        writeln!(f, "Vehicle Restriction: {:?}", self.vehicle_restrictions)?;
        writeln!(f, "License Number: {}", self.license_number)?;
        writeln!(f, "ID Number: {}", self.id_number)?;
        writeln!(f, "ID number type: {}", self.id_number_type)?;
        writeln!(f, "License code issue date: {:?}", self.license_code_issue_dates)?;
        writeln!(f, "Driver restriction codes: {}", self.driver_restriction_codes)?;
        writeln!(f, "PrDP permit expiry date: {}", self.prdp_permit_expiry_date)?;
        writeln!(f, "License issue number: {}", self.license_issue_number)?;
        writeln!(f, "Birthdate: {}", self.birthdate)?;
        writeln!(f, "License Valid From: {}", self.license_issue_date)?;
        writeln!(f, "License Valid To: {}", self.license_expiry_date)?;
        writeln!(f, "Gender: {}", self.gender)?;
        writeln!(f, "Image width: {}", self.image_width)?;
        write!(f, "Image height: {}", self.image_height)
    }
}

/// Writes a header row and one row per license.
///
/// List fields are joined with `;`.
pub fn write_csv<W: Write>(writer: W, licenses: &[DrivingLicense]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(CSV_HEADER)?;
    for license in licenses {
        csv_writer.write_record(license.csv_record())?;
    }
    csv_writer.flush()?;
    Ok(())
}
