/*!
# Burn Baby Burn: Errors
*/

use cdtoc::TocError;
use crate::{
	DiscStatus,
	Sense,
};
use fyi_msg::Msg;
use std::{
	error::Error,
	fmt,
};



#[cfg(feature = "bin")]
/// # Help Text.
const HELP: &str = concat!(r#"
      (    )
     ) \  ( (      Burn Baby Burn! v"#, env!("CARGO_PKG_VERSION"), r#"
    ( ) )  ) \     Data and audio CD burning
   __\(_(__/_(__    for the command line.
  |             |
  |   ( o o )   |
  |_____________|

USAGE:
    burnbaby [OPTIONS] <FILE(S)>…

WRITE SETTINGS:
        --audio       Treat the track files as raw 16-bit stereo PCM (CD-DA)
                      rather than 2048-byte data sectors.
        --dummy       Simulate the burn. The laser stays off, but everything
                      else happens.
        --fill        Pad the last track with zeroes until the disc is full.
        --multi       Leave the disc appendable so that further sessions can
                      be added later.
        --no-opc      Skip the optimum power calibration step.
        --no-pad      Do not pad short TAO tracks up to the 300-sector
                      minimum.
        --raw         Write the session in raw mode, generating lead-in,
                      lead-out, and sub-channel data on the host.
        --sao         Write the session at once, sending a cue sheet first.
        --tao         Write track at once. [default]
    -s, --speed <KB/s>
                      The write speed to request, in kilobytes per second.
                      [default: max]

DRIVE SETTINGS:
        --blank       Fully blank the rewritable disc in the drive, then exit
                      (unless tracks were also given).
        --blank-fast  Minimally blank the rewritable disc in the drive, then
                      exit (unless tracks were also given).
    -d, --dev <PATH>  The device path for the burner, like /dev/sr0.
                      [default: the first drive found]
        --eject       Eject the disc when finished.
        --scan        List the available optical drives and exit.

MISCELLANEOUS:
    -h, --help        Print help information to STDOUT and exit.
    -v, --verbose     Print all library messages, including debug chatter,
                      to STDERR.
    -V, --version     Print version information to STDOUT and exit.

ARGUMENTS:
    <FILE(S)>…        One or more files to burn, one track apiece. Use - to
                      read a single track from STDIN.

EARLY EXIT:
    Press CTRL+C to stop a burn early. The drive will finish its current
    command first, so it might take a moment.
"#);



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Errors.
pub enum BurnError {
	/// # Bug!
	Bug(&'static str),

	/// # CDTOC passthrough.
	Cdtoc(TocError),

	/// # Invalid device.
	Device(String),

	/// # Unable to open device.
	DeviceOpen(Option<String>),

	/// # Disc status is wrong for the operation.
	DiscStatus(DiscStatus),

	/// # Drive is busy.
	DriveBusy,

	/// # Drive is already grabbed.
	DriveGrabbed,

	/// # Drive is not grabbed.
	DriveReleased,

	/// # A drive operation is already outstanding.
	DuplicateOperation,

	/// # The disc cannot be erased.
	Erasable,

	/// # Invalid ISRC.
	Isrc,

	/// # User Abort.
	Killed,

	/// # Invalid media catalog number.
	MediaCatalog,

	/// # No drives.
	NoDrive,

	/// # Noop.
	Noop,

	/// # Open-ended track where a size is required.
	OpenEnded(u8),

	/// # Bad insert position.
	Position(usize),

	/// # A scan is outstanding.
	ScanOutstanding,

	/// # Hardware error (after classification).
	Sense(&'static str, Sense),

	/// # Data source failure.
	Source(String),

	/// # Thread spawn failure.
	Spawn,

	/// # Too few/many tracks.
	TrackCount,

	/// # Unsuitable track mode.
	TrackMode(u16),

	/// # Transport failure.
	Transport(&'static str),

	/// # Unsuitable write type/block type.
	WriteType,

	#[cfg(feature = "bin")]
	/// # Invalid CLI arg.
	CliArg(String),

	#[cfg(feature = "bin")]
	/// # CLI Parsing failure.
	CliParse(&'static str),

	#[cfg(feature = "bin")]
	/// # Print Help (Not an Error).
	PrintHelp,

	#[cfg(feature = "bin")]
	/// # Print Version (Not an Error).
	PrintVersion,
}

impl Error for BurnError {}

impl From<TocError> for BurnError {
	#[inline]
	fn from(err: TocError) -> Self { Self::Cdtoc(err) }
}

impl From<BurnError> for Msg {
	#[inline]
	fn from(src: BurnError) -> Self { Self::error(src.to_string()) }
}

impl fmt::Display for BurnError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Bug(s) => write!(f, "Bug: {s}."),
			Self::Cdtoc(s) => write!(f, "{s}"),
			Self::Device(s) => write!(f, "Invalid device path {s}."),
			Self::DeviceOpen(s) =>
				if let Some(s) = s { write!(f, "Unable to open connection with {s}.") }
				else {
					f.write_str("Unable to open connection with default optical drive.")
				},
			Self::DiscStatus(s) => write!(f, "The disc is unsuitable for this operation ({}).", s.as_str()),
			Self::DriveBusy => f.write_str("The drive is busy."),
			Self::DriveGrabbed => f.write_str("The drive is already grabbed."),
			Self::DriveReleased => f.write_str("The drive has not been grabbed."),
			Self::DuplicateOperation => f.write_str("A drive operation is still going on."),
			Self::Erasable => f.write_str("The disc is not erasable."),
			Self::Isrc => f.write_str("Invalid ISRC."),
			Self::Killed => f.write_str("User abort."),
			Self::MediaCatalog => f.write_str("Invalid media catalog number."),
			Self::NoDrive => f.write_str("No optical drives were found."),
			Self::Noop => f.write_str("There's nothing to do!"),
			Self::OpenEnded(n) => write!(f, "Track #{n} has no fixed size; only TAO can write it."),
			Self::Position(n) => write!(f, "Invalid insert position ({n})."),
			Self::ScanOutstanding => f.write_str("A drive scan is still going on."),
			Self::Sense(cmd, s) => write!(f, "{cmd} failed: {}.", s.describe()),
			Self::Source(s) => write!(f, "Unable to read track data: {s}."),
			Self::Spawn => f.write_str("Unable to spawn a worker thread."),
			Self::TrackCount => f.write_str("A disc needs between 1 and 99 tracks."),
			Self::TrackMode(n) => write!(f, "Unsuitable track mode ({n:#06x})."),
			Self::Transport(cmd) => write!(f, "Failed to transfer {cmd} to drive."),
			Self::WriteType => f.write_str("Bad combination of write type and block type."),

			#[cfg(feature = "bin")]
			Self::CliArg(s) => write!(f, "Invalid CLI option: {s}"),

			#[cfg(feature = "bin")]
			Self::CliParse(s) => write!(f, "Unable to parse {s}."),

			#[cfg(feature = "bin")]
			Self::PrintHelp => f.write_str(HELP),

			#[cfg(feature = "bin")]
			Self::PrintVersion => f.write_str(concat!("Burn Baby Burn! v", env!("CARGO_PKG_VERSION"))),
		}
	}
}
