// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  parse.rs - Parser demo for South African driving license barcodes.
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

use std::io;

use clap::{Parser, ValueEnum};

use sadl::SourceKind;
use sadl::license::write_csv;

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Kind {
    /// A text file holding the barcode bytes as base64.
    Base64,
    /// A binary file holding the barcode bytes.
    Raw,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The file to read.
    file: String,

    /// How the barcode bytes are stored in the file.
    #[arg(short, long, value_enum, default_value_t = Kind::Raw)]
    kind: Kind,

    /// Whether the barcode bytes still need to be decrypted.
    #[arg(short, long, default_value_t = true, action = clap::ArgAction::Set)]
    encrypted: bool,

    /// Print the license as CSV instead of a field list.
    #[arg(long)]
    csv: bool,
}

fn main() {
    let args = Args::parse();

    let kind = match args.kind {
        Kind::Base64 => SourceKind::Base64,
        Kind::Raw => SourceKind::Raw,
    };

    let license = match sadl::parse_file(&args.file, kind, args.encrypted) {
        Ok(license) => license,
        Err(error) => {
            eprintln!("Error parsing file {:?}: {}", &args.file, error);
            std::process::exit(1);
        }
    };

    if args.csv {
        if let Err(error) = write_csv(io::stdout(), &[license]) {
            eprintln!("Error writing CSV: {}", error);
            std::process::exit(1);
        }
    } else {
        println!("{}", license);
    }
}
