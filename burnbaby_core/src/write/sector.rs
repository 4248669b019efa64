/*!
# Burn Baby Burn: Raw Sectors

Raw writing leaves the whole sector to the host: sync pattern, header, and
error correction for data, plus the P/Q sub-channel riding alongside.
*/

use crate::{
	bcd,
	bcd_msf,
	lba_to_msf,
	sectors_to_msf,
	Subcode,
	TocEntry,
};

include!(concat!(env!("OUT_DIR"), "/sector_tables.rs"));



/// # Sync Pattern.
const SYNC: [u8; 12] = [0, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 0];

/// # EDC Position.
const EDC_START: usize = 2064;

/// # P Parity Position.
const ECC_P_START: usize = 2076;

/// # Q Parity Position.
const ECC_Q_START: usize = 2248;

/// # Lead-out P Blink Period (Frames).
///
/// The P channel flashes at 2 Hz in the lead-out.
const BLINK: u32 = 75;



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Sector Position.
///
/// Where a sector falls on the disc, for the purposes of its Q sub-channel.
pub(crate) enum Position {
	/// # Lead-in, Carrying a TOC Entry.
	LeadIn {
		entry: TocEntry,
		rel: u32,
	},

	/// # Program Area.
	///
	/// Relative times count down through a pregap and up from index one.
	Track {
		control: u8,
		tno: u8,
		index: u8,
		rel: u32,
		pause: bool,
	},

	/// # Lead-out.
	LeadOut {
		control: u8,
		rel: u32,
	},
}

impl Position {
	#[allow(clippy::cast_possible_wrap)] // Relative times are bound by the disc size.
	/// # Q Sub-channel.
	///
	/// Build the twelve-byte mode-1 Q for a sector at the given address.
	pub(crate) fn q(&self, lba: i32) -> [u8; 12] {
		let mut out = [0_u8; 12];
		match *self {
			Self::LeadIn { entry, rel } => {
				out[0] = (entry.control << 4) | 1;
				out[2] = if entry.point <= 99 { bcd(entry.point) } else { entry.point };
				out[3..6].copy_from_slice(&bcd_msf(sectors_to_msf(rel as i32)));
				out[7] = bcd(entry.pmin);
				out[8] = if entry.point == 0xA0 { entry.psec } else { bcd(entry.psec) };
				out[9] = bcd(entry.pframe);
			},
			Self::Track { control, tno, index, rel, .. } => {
				out[0] = (control << 4) | 1;
				out[1] = bcd(tno);
				out[2] = bcd(index);
				out[3..6].copy_from_slice(&bcd_msf(sectors_to_msf(rel as i32)));
				out[7..10].copy_from_slice(&bcd_msf(lba_to_msf(lba)));
			},
			Self::LeadOut { control, rel } => {
				out[0] = (control << 4) | 1;
				out[1] = 0xAA;
				out[2] = 1;
				out[3..6].copy_from_slice(&bcd_msf(sectors_to_msf(rel as i32)));
				out[7..10].copy_from_slice(&bcd_msf(lba_to_msf(lba)));
			},
		}

		let crc = ! crc16(&out[..10]);
		out[10..].copy_from_slice(&crc.to_be_bytes());
		out
	}

	/// # P Flag.
	pub(crate) const fn p(&self) -> bool {
		match *self {
			Self::LeadIn { .. } => false,
			Self::Track { pause, .. } => pause,
			Self::LeadOut { rel, .. } => (rel * 2) % BLINK < BLINK / 2,
		}
	}
}



/// # CRC-16.
///
/// This is the CCITT variant, without the final inversion the Q
/// sub-channel applies.
pub(crate) fn crc16(src: &[u8]) -> u16 {
	src.iter().fold(0_u16, |crc, &b|
		(crc << 8) ^ CRC16[usize::from((crc >> 8) as u8 ^ b)]
	)
}

/// # EDC.
pub(crate) fn edc(src: &[u8]) -> u32 {
	src.iter().fold(0_u32, |edc, &b|
		(edc >> 8) ^ EDC[usize::from((edc as u8) ^ b)]
	)
}

/// # Mode 1 Sector.
///
/// Turn a 2352-byte buffer holding user data at `16..2064` into a complete
/// mode 1 sector for the given address.
pub(crate) fn mode1(sector: &mut [u8], lba: i32) {
	sector[..12].copy_from_slice(&SYNC);
	sector[12..15].copy_from_slice(&bcd_msf(lba_to_msf(lba)));
	sector[15] = 1;

	let edc = edc(&sector[..EDC_START]);
	sector[EDC_START..EDC_START + 4].copy_from_slice(&edc.to_le_bytes());
	sector[EDC_START + 4..ECC_P_START].fill(0);

	ecc_block(sector, 86, 24, 2, 86, ECC_P_START);
	ecc_block(sector, 52, 43, 86, 88, ECC_Q_START);
}

/// # Reed-Solomon Parity.
///
/// Compute one set of parity bytes over the sector (minus its sync
/// pattern), writing them at `dst`.
fn ecc_block(
	sector: &mut [u8],
	major_count: usize,
	minor_count: usize,
	major_mult: usize,
	minor_inc: usize,
	dst: usize,
) {
	let (src, dst) = sector.split_at_mut(dst);
	let src = &src[12..];
	let size = major_count * minor_count;

	for major in 0..major_count {
		let mut idx = (major >> 1) * major_mult + (major & 1);
		let mut a = 0_u8;
		let mut b = 0_u8;
		for _ in 0..minor_count {
			let v = src[idx];
			idx += minor_inc;
			if size <= idx { idx -= size; }
			a ^= v;
			b ^= v;
			a = ECC_F[usize::from(a)];
		}
		a = ECC_B[usize::from(ECC_F[usize::from(a)] ^ b)];
		dst[major] = a;
		dst[major + major_count] = a ^ b;
	}
}

/// # Sub-channel.
///
/// Write the P/Q sub-channel in the requested layout. Packed R-W carries
/// nothing of ours, so it is left blank for the drive.
pub(crate) fn subcode(dst: &mut [u8], kind: Subcode, q: &[u8; 12], p: bool) {
	let p = if p { 0x80 } else { 0 };
	match kind {
		Subcode::None => {},
		Subcode::P16 => {
			dst[..12].copy_from_slice(q);
			dst[12..15].fill(0);
			dst[15] = p;
		},
		Subcode::P96 => for (idx, v) in dst.iter_mut().take(96).enumerate() {
			let bit = (q[idx >> 3] >> (7 - (idx & 7))) & 1;
			*v = p | (bit << 6);
		},
		Subcode::R96 => { dst[..96].fill(0); },
	}
}
