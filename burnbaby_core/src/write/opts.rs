/*!
# Burn Baby Burn: Write Options
*/

use crate::{
	BlockType,
	BurnError,
	DiscFormat,
	WriteType,
};



/// # FLAG: Simulate.
const FLAG_SIMULATE: u8 =       0b0000_0001;

/// # FLAG: Buffer Underrun Protection.
const FLAG_UNDERRUN_PROOF: u8 = 0b0000_0010;

/// # FLAG: Optimum Power Calibration.
const FLAG_OPC: u8 =            0b0000_0100;

/// # FLAG: Leave Disc Appendable.
const FLAG_MULTI: u8 =          0b0000_1000;

/// # FLAG: Fill Up the Media.
const FLAG_FILL: u8 =           0b0001_0000;

/// # FLAG: Pad Short TAO Tracks.
const FLAG_PAD: u8 =            0b0010_0000;

/// # FLAG: Default.
const FLAG_DEFAULT: u8 = FLAG_UNDERRUN_PROOF | FLAG_OPC | FLAG_PAD;



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Write Options.
///
/// This struct holds the settings for a burn: how it is written, which
/// block layout the drive should expect, and a handful of behavioral
/// toggles.
///
/// Options are set using builder-style methods, like:
///
/// ```
/// use burnbaby_core::{BlockType, WriteOptions, WriteType};
///
/// let opts = WriteOptions::default()
///     .with_write_type(WriteType::Raw, BlockType::Raw96R)
///     .with_simulate(true)
///     .with_speed(1764);
///
/// assert_eq!(opts.write_type(), WriteType::Raw);
/// assert!(opts.simulate());
/// assert!(opts.opc());
/// ```
pub struct WriteOptions {
	write_type: WriteType,
	block_type: BlockType,
	format: DiscFormat,
	control: u8,
	mcn: Option<[u8; 13]>,
	speed: u16,
	flags: u8,
}

impl Default for WriteOptions {
	fn default() -> Self {
		Self {
			write_type: WriteType::Tao,
			block_type: BlockType::Mode1,
			format: DiscFormat::CdRom,
			control: 0,
			mcn: None,
			speed: 0,
			flags: FLAG_DEFAULT,
		}
	}
}

macro_rules! with_flag {
	($fn:ident, $flag:ident, $($doc:literal),+ $(,)?) => (
		#[must_use]
		$(
			#[doc = $doc]
		)+
		pub const fn $fn(self, v: bool) -> Self {
			let flags =
				if v { self.flags | $flag }
				else { self.flags & ! $flag };

			Self {
				flags,
				..self
			}
		}
	)
}

/// ## Setters.
impl WriteOptions {
	#[must_use]
	/// # Write Type.
	///
	/// Set the write type along with the block type the drive should expect.
	///
	/// For TAO, the block type of each track is derived from its mode, so
	/// the value passed here only matters for RAW, where it must be one of
	/// the raw types. SAO always uses `BlockType::Sao`.
	pub const fn with_write_type(self, write_type: WriteType, block_type: BlockType) -> Self {
		let block_type = match write_type {
			WriteType::Sao => BlockType::Sao,
			_ => block_type,
		};
		Self {
			write_type,
			block_type,
			..self
		}
	}

	#[must_use]
	/// # Disc Format.
	///
	/// The default is `DiscFormat::CdRom`.
	pub const fn with_format(self, format: DiscFormat) -> Self {
		Self {
			format,
			..self
		}
	}

	#[must_use]
	/// # Control Nibble.
	///
	/// This is sent with the write parameters for session-wide writes. TAO
	/// uses each track's own control nibble instead.
	pub const fn with_control(self, control: u8) -> Self {
		Self {
			control: control & 0x0F,
			..self
		}
	}

	/// # Media Catalog Number.
	///
	/// Set (or with `None`, clear) the thirteen-digit catalog number
	/// recorded with the disc.
	///
	/// ## Errors
	///
	/// Returns an error if the number is not exactly thirteen ASCII digits,
	/// leaving the options unchanged.
	pub fn with_mcn(self, mcn: Option<&str>) -> Result<Self, BurnError> {
		let mcn = match mcn {
			Some(s) => Some(
				<[u8; 13]>::try_from(s.as_bytes())
					.ok()
					.filter(|b| b.iter().all(u8::is_ascii_digit))
					.ok_or(BurnError::MediaCatalog)?
			),
			None => None,
		};
		Ok(Self { mcn, ..self })
	}

	#[must_use]
	/// # Write Speed.
	///
	/// The speed to request, in kB/s. Zero, the default, asks for the
	/// fastest the drive will go.
	pub const fn with_speed(self, speed: u16) -> Self {
		Self {
			speed,
			..self
		}
	}

	with_flag!(
		with_simulate,
		FLAG_SIMULATE,
		"# Simulate.",
		"",
		"When `true`, the drive goes through all the motions with the laser",
		"off.",
		"",
		"The default is `false`.",
	);

	with_flag!(
		with_underrun_proof,
		FLAG_UNDERRUN_PROOF,
		"# Buffer Underrun Protection.",
		"",
		"The default is `true`.",
	);

	with_flag!(
		with_opc,
		FLAG_OPC,
		"# Optimum Power Calibration.",
		"",
		"When `true`, the drive is asked to calibrate its laser before",
		"writing. This is skipped for simulated writes regardless.",
		"",
		"The default is `true`.",
	);

	with_flag!(
		with_multi,
		FLAG_MULTI,
		"# Multi-Session.",
		"",
		"When `true`, the disc is left open for further sessions.",
		"",
		"The default is `false`.",
	);

	with_flag!(
		with_fill,
		FLAG_FILL,
		"# Fill Up the Media.",
		"",
		"When `true`, the last track is padded with zeroes until the disc",
		"is full.",
		"",
		"The default is `false`.",
	);

	with_flag!(
		with_pad,
		FLAG_PAD,
		"# Pad Short Tracks.",
		"",
		"When `true`, TAO tracks shorter than 300 sectors are padded up to",
		"that minimum.",
		"",
		"The default is `true`.",
	);
}

/// ## Getters.
impl WriteOptions {
	#[must_use]
	/// # Write Type.
	pub const fn write_type(&self) -> WriteType { self.write_type }

	#[must_use]
	/// # Block Type.
	pub const fn block_type(&self) -> BlockType { self.block_type }

	#[must_use]
	/// # Disc Format.
	pub const fn format(&self) -> DiscFormat { self.format }

	#[must_use]
	/// # Control Nibble.
	pub const fn control(&self) -> u8 { self.control }

	#[must_use]
	/// # Media Catalog Number.
	pub const fn mcn(&self) -> Option<[u8; 13]> { self.mcn }

	#[must_use]
	/// # Write Speed.
	pub const fn speed(&self) -> u16 { self.speed }

	#[must_use]
	/// # Simulate?
	pub const fn simulate(&self) -> bool { FLAG_SIMULATE == self.flags & FLAG_SIMULATE }

	#[must_use]
	/// # Underrun Protection?
	pub const fn underrun_proof(&self) -> bool {
		FLAG_UNDERRUN_PROOF == self.flags & FLAG_UNDERRUN_PROOF
	}

	#[must_use]
	/// # Calibrate?
	pub const fn opc(&self) -> bool { FLAG_OPC == self.flags & FLAG_OPC }

	#[must_use]
	/// # Multi-Session?
	pub const fn multi(&self) -> bool { FLAG_MULTI == self.flags & FLAG_MULTI }

	#[must_use]
	/// # Fill?
	pub const fn fill(&self) -> bool { FLAG_FILL == self.flags & FLAG_FILL }

	#[must_use]
	/// # Pad Short Tracks?
	pub const fn pad(&self) -> bool { FLAG_PAD == self.flags & FLAG_PAD }
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_flags() {
		let opts = WriteOptions::default();
		assert!(! opts.simulate());
		assert!(opts.underrun_proof());
		assert!(opts.opc());
		assert!(! opts.multi());
		assert!(! opts.fill());
		assert!(opts.pad());

		let opts = opts.with_simulate(true)
			.with_opc(false)
			.with_multi(true)
			.with_pad(false);
		assert!(opts.simulate());
		assert!(opts.underrun_proof(), "Unrelated flags should be untouched.");
		assert!(! opts.opc());
		assert!(opts.multi());
		assert!(! opts.pad());

		let opts = opts.with_simulate(false);
		assert!(! opts.simulate());
		assert!(opts.multi());
	}

	#[test]
	fn t_write_type() {
		let opts = WriteOptions::default();
		assert_eq!(opts.write_type(), WriteType::Tao);

		let opts = opts.with_write_type(WriteType::Sao, BlockType::Raw16);
		assert_eq!(opts.block_type(), BlockType::Sao, "SAO always uses the SAO block type.");

		let opts = opts.with_write_type(WriteType::Raw, BlockType::Raw16);
		assert_eq!(opts.block_type(), BlockType::Raw16);
	}

	#[test]
	fn t_mcn() {
		let opts = WriteOptions::default();
		let opts = opts.with_mcn(Some("0123456789012")).expect("MCN failed.");
		assert_eq!(opts.mcn(), Some(*b"0123456789012"));

		for bad in ["012345678901", "01234567890123", "012345678901A"] {
			assert_eq!(opts.with_mcn(Some(bad)), Err(BurnError::MediaCatalog), "{bad}");
		}

		let opts = opts.with_mcn(None).expect("MCN failed.");
		assert!(opts.mcn().is_none());

		assert_eq!(opts.with_control(0xFF).control(), 0x0F);
	}
}
