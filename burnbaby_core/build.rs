/*!
# Burn Baby Burn: Build

This pre-computes the lookup tables used to build raw sectors: the
Galois field helpers for the Reed-Solomon P/Q parity, the EDC checksum, and
the CRC-16 protecting the Q sub-channel.
*/

use std::{
	fs::File,
	io::Write,
	path::PathBuf,
};



/// # EDC Polynomial (Reversed).
const EDC_POLY: u32 = 0xD801_8001;

/// # CRC-16 Polynomial (CCITT).
const CRC16_POLY: u16 = 0x1021;

/// # GF(2^8) Reduction Polynomial.
const GF_POLY: u16 = 0x11D;



/// # Main.
fn main() {
	println!("cargo:rerun-if-env-changed=CARGO_PKG_VERSION");

	let (ecc_f, ecc_b) = ecc_tables();
	let data = [
		nice_table("ECC_F", "u8", &ecc_f),
		nice_table("ECC_B", "u8", &ecc_b),
		nice_table("EDC", "u32", &edc_table()),
		nice_table("CRC16", "u16", &crc16_table()),
	].concat();

	File::create(out_path("sector_tables.rs"))
		.and_then(|mut f| f.write_all(data.as_bytes()).and_then(|()| f.flush()))
		.expect("Unable to save sector tables.");
}



/// # CRC-16 Table.
fn crc16_table() -> Vec<u16> {
	(0..=255_u16).map(|i| {
		let mut crc = i << 8;
		for _ in 0..8 {
			crc =
				if 0 == crc & 0x8000 { crc << 1 }
				else { (crc << 1) ^ CRC16_POLY };
		}
		crc
	})
		.collect()
}

/// # ECC Tables.
///
/// The forward table multiplies by two in GF(2^8); the backward table
/// divides by three.
fn ecc_tables() -> (Vec<u8>, Vec<u8>) {
	let mut f = vec![0_u8; 256];
	let mut b = vec![0_u8; 256];
	for i in 0..=255_u8 {
		let j = u16::from(i) << 1;
		let j = if 0 == i & 0x80 { j } else { j ^ GF_POLY };
		let j = u8::try_from(j).expect("GF overflow.");
		f[usize::from(i)] = j;
		b[usize::from(i ^ j)] = i;
	}
	(f, b)
}

/// # EDC Table.
fn edc_table() -> Vec<u32> {
	(0..=255_u32).map(|i| {
		let mut edc = i;
		for _ in 0..8 {
			edc =
				if 0 == edc & 1 { edc >> 1 }
				else { (edc >> 1) ^ EDC_POLY };
		}
		edc
	})
		.collect()
}

/// # Nice Table.
///
/// Reformat the values as a constant array that can be included directly
/// in a library script.
fn nice_table<T: std::fmt::Display>(name: &str, kind: &str, values: &[T]) -> String {
	let nice = values.iter()
		.map(|v| format!("{v}_{kind},"))
		.collect::<Vec<String>>();

	format!(
		r#"
/// # {name} Table.
const {name}: [{kind}; {}] = [
	{}
];
"#,
		nice.len(),
		nice.join(" "),
	)
}

/// # Output Path.
///
/// Append the sub-path to OUT_DIR and return it.
fn out_path(stub: &str) -> PathBuf {
	std::fs::canonicalize(std::env::var("OUT_DIR").expect("Missing OUT_DIR."))
		.expect("Missing OUT_DIR.")
		.join(stub)
}
