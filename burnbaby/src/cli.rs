/*!
# Burn Baby Burn: CLI
*/

use argyle::Argument;
use burnbaby_core::{
	BlockType,
	BurnError,
	Capabilities,
	WriteOptions,
	WriteType,
};
use dactyl::traits::BytesToUnsigned;
use std::path::PathBuf;
use trimothy::TrimSlice;



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Erase Mode.
pub(super) enum Blank {
	/// # Full.
	Full,

	/// # Minimal.
	Fast,
}

impl Blank {
	/// # Fast?
	pub(super) const fn fast(self) -> bool { matches!(self, Self::Fast) }
}



#[derive(Debug)]
/// # Parsed Settings.
pub(super) struct Settings {
	/// # Write Options.
	pub(super) opts: WriteOptions,

	/// # Track Files.
	///
	/// A path of "-" means STDIN.
	pub(super) paths: Vec<PathBuf>,

	/// # Device.
	pub(super) dev: Option<String>,

	/// # Erase First?
	pub(super) blank: Option<Blank>,

	/// # Audio Tracks?
	pub(super) audio: bool,

	/// # Eject When Done?
	pub(super) eject: bool,

	/// # Just List Drives?
	pub(super) scan: bool,

	/// # Print Everything?
	pub(super) verbose: bool,
}

impl Settings {
	/// # Raw Block Type.
	///
	/// Raw writes need the drive to take one of the raw block types; pick
	/// the richest it supports.
	pub(super) fn raw_block(caps: &Capabilities) -> Option<BlockType> {
		[BlockType::Raw96R, BlockType::Raw96P, BlockType::Raw16]
			.into_iter()
			.find(|b| caps.supports(WriteType::Raw, *b))
	}

	/// # Has STDIN?
	pub(super) fn stdin(&self) -> bool {
		self.paths.iter().any(|p| p.as_os_str() == "-")
	}
}



/// # Parse Options.
pub(super) fn parse() -> Result<Settings, BurnError> {
	let args = argyle::args()
		.with_keywords(include!(concat!(env!("OUT_DIR"), "/argyle.rs")));

	let mut out = Settings {
		opts: WriteOptions::default(),
		paths: Vec::new(),
		dev: None,
		blank: None,
		audio: false,
		eject: false,
		scan: false,
		verbose: false,
	};
	let mut write_type = WriteType::Tao;

	for arg in args {
		match arg {
			Argument::Key("--audio") => { out.audio = true; },
			Argument::Key("--blank") => { out.blank.replace(Blank::Full); },
			Argument::Key("--blank-fast") => { out.blank.replace(Blank::Fast); },
			Argument::Key("--dummy") => { out.opts = out.opts.with_simulate(true); },
			Argument::Key("--eject") => { out.eject = true; },
			Argument::Key("--fill") => { out.opts = out.opts.with_fill(true); },
			Argument::Key("-h" | "--help") => return Err(BurnError::PrintHelp),
			Argument::Key("--multi") => { out.opts = out.opts.with_multi(true); },
			Argument::Key("--no-opc") => { out.opts = out.opts.with_opc(false); },
			Argument::Key("--no-pad") => { out.opts = out.opts.with_pad(false); },
			Argument::Key("--raw") => { write_type = WriteType::Raw; },
			Argument::Key("--sao") => { write_type = WriteType::Sao; },
			Argument::Key("--scan") => { out.scan = true; },
			Argument::Key("--tao") => { write_type = WriteType::Tao; },
			Argument::Key("-v" | "--verbose") => { out.verbose = true; },
			Argument::Key("-V" | "--version") => return Err(BurnError::PrintVersion),

			Argument::KeyWithValue("-d" | "--dev", s) => { out.dev.replace(s); },
			Argument::KeyWithValue("-s" | "--speed", s) => {
				let s = u16::btou(s.as_bytes().trim())
					.ok_or(BurnError::CliParse("-s/--speed"))?;
				out.opts = out.opts.with_speed(s);
			},

			Argument::Other(s) =>
				if s.len() > 1 && s.starts_with('-') { return Err(BurnError::CliArg(s)); }
				else { out.paths.push(PathBuf::from(s)); },
			Argument::InvalidUtf8(s) => { out.paths.push(PathBuf::from(s)); },
			Argument::End(rest) => {
				out.paths.extend(rest.into_iter().map(PathBuf::from));
			},

			_ => {},
		}
	}

	// STDIN can only be read once.
	if 1 < out.paths.iter().filter(|p| p.as_os_str() == "-").count() {
		return Err(BurnError::CliArg("- (STDIN can only be used once)".to_owned()));
	}

	// The raw block type depends on the drive, so is settled later; this is
	// just a placeholder.
	out.opts = out.opts.with_write_type(write_type, BlockType::Raw96R);
	Ok(out)
}

