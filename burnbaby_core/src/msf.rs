/*!
# Burn Baby Burn: MSF/LBA
*/

use crate::CD_LEADIN;



/// # Frames Per Second.
const FRAMES_PER_SECOND: i32 = 75;

/// # Frames Per Minute.
const FRAMES_PER_MINUTE: i32 = FRAMES_PER_SECOND * 60;

/// # Maximum Sectors.
///
/// A minute:second:frame timecode tops out at 99:59:74.
pub const MAX_SECTORS: i32 = FRAMES_PER_MINUTE * 100;



#[must_use]
/// # MSF to Sectors.
///
/// Convert a minute:second:frame timecode to a sector count.
pub const fn msf_to_sectors(m: u8, s: u8, f: u8) -> i32 {
	(m as i32 * 60 + s as i32) * FRAMES_PER_SECOND + f as i32
}

#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // Bound by the modulo.
/// # Sectors to MSF.
///
/// Convert a sector count to a minute:second:frame timecode.
///
/// Values outside `0..MAX_SECTORS` wrap, the way lead-in timecodes do: the
/// last sector before zero is `99:59:74`.
pub const fn sectors_to_msf(sectors: i32) -> (u8, u8, u8) {
	let sectors = sectors.rem_euclid(MAX_SECTORS);
	(
		(sectors / FRAMES_PER_MINUTE) as u8,
		((sectors / FRAMES_PER_SECOND) % 60) as u8,
		(sectors % FRAMES_PER_SECOND) as u8,
	)
}

#[must_use]
/// # LBA to MSF.
///
/// Absolute timecodes are offset by the two-second pregap.
pub const fn lba_to_msf(lba: i32) -> (u8, u8, u8) {
	sectors_to_msf(lba + CD_LEADIN)
}

#[must_use]
/// # MSF to LBA.
///
/// Timecodes from 90 minutes up are read as negative addresses; that is
/// how drives report the start of the lead-in.
pub const fn msf_to_lba(m: u8, s: u8, f: u8) -> i32 {
	let sectors = msf_to_sectors(m, s, f);
	if m < 90 { sectors - CD_LEADIN }
	else { sectors - MAX_SECTORS - CD_LEADIN }
}

#[must_use]
/// # Binary to BCD.
pub(crate) const fn bcd(v: u8) -> u8 { ((v / 10) << 4) | (v % 10) }

#[must_use]
/// # BCD MSF.
pub(crate) const fn bcd_msf(msf: (u8, u8, u8)) -> [u8; 3] {
	[bcd(msf.0), bcd(msf.1), bcd(msf.2)]
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_msf() {
		assert_eq!(msf_to_sectors(0, 2, 0), 150);
		assert_eq!(sectors_to_msf(150), (0, 2, 0));
		assert_eq!(lba_to_msf(0), (0, 2, 0));
		assert_eq!(msf_to_lba(0, 2, 0), 0);
		assert_eq!(lba_to_msf(-150), (0, 0, 0));

		// Lead-in timecodes wrap around.
		assert_eq!(sectors_to_msf(-1), (99, 59, 74));
		assert_eq!(lba_to_msf(-11_634), (97, 26, 66));
		assert_eq!(msf_to_lba(97, 26, 66), -11_634);
		assert_eq!(msf_to_lba(99, 59, 74), -151);
	}

	#[test]
	fn t_lba_roundtrip() {
		for lba in (-45_150..404_850).step_by(13) {
			let (m, s, f) = lba_to_msf(lba);
			assert_eq!(msf_to_lba(m, s, f), lba, "LBA {lba} did not survive the round trip.");
		}
	}

	#[test]
	fn t_msf_roundtrip() {
		for m in 0..100 {
			for s in 0..60 {
				for f in 0..75 {
					let sectors = msf_to_sectors(m, s, f);
					assert_eq!(
						sectors_to_msf(sectors),
						(m, s, f),
						"MSF {m:02}:{s:02}:{f:02} did not survive the round trip."
					);
				}
			}
		}

		for sectors in (0..MAX_SECTORS).step_by(7) {
			let (m, s, f) = sectors_to_msf(sectors);
			assert_eq!(msf_to_sectors(m, s, f), sectors);
		}
	}

	#[test]
	fn t_bcd() {
		assert_eq!(bcd(0), 0);
		assert_eq!(bcd(9), 0x09);
		assert_eq!(bcd(10), 0x10);
		assert_eq!(bcd(99), 0x99);
		assert_eq!(bcd_msf((12, 34, 56)), [0x12, 0x34, 0x56]);
	}
}
