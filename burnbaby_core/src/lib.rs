/*!
# Burn Baby Burn: Library
*/

#![deny(unsafe_code)]

#![warn(
	clippy::filetype_is_file,
	clippy::integer_division,
	clippy::needless_borrow,
	clippy::nursery,
	clippy::pedantic,
	clippy::perf,
	clippy::suboptimal_flops,
	clippy::unneeded_field_pattern,
	macro_use_extern_crate,
	missing_copy_implementations,
	missing_debug_implementations,
	missing_docs,
	non_ascii_idents,
	trivial_casts,
	trivial_numeric_casts,
	unreachable_pub,
	unused_crate_dependencies,
	unused_extern_crates,
	unused_import_braces,
)]

#![allow(
	clippy::doc_markdown,
	clippy::module_name_repetitions,
	clippy::redundant_pub_crate,
)]

mod abort;
mod cdio;
mod channel;
mod command;
mod drive;
mod error;
mod executor;
mod mock;
mod mode;
mod msf;
mod msg;
mod source;
mod structure;
mod toc;
mod transport;
mod write;

pub use abort::KillSwitch;
pub use cdio::{
	CdioEnumerator,
	CdioTransport,
};
pub(crate) use channel::Link;
pub use command::{
	Cdb,
	Command,
};
pub use drive::{
	Capabilities,
	CommandTiming,
	DiscStatus,
	Drive,
	DriveInfo,
	DriveStatus,
	Progress,
};
pub use error::BurnError;
pub use executor::{
	Executor,
	Operation,
	Outcome,
	Ticket,
};
pub use mock::{
	MockCall,
	MockEnumerator,
	MockMedia,
	MockTransport,
};
pub use mode::{
	BlockType,
	DiscFormat,
	TrackMode,
	WriteType,
};
pub(crate) use mode::Subcode;
pub use msf::{
	lba_to_msf,
	MAX_SECTORS,
	msf_to_lba,
	msf_to_sectors,
	sectors_to_msf,
};
pub(crate) use msf::{
	bcd,
	bcd_msf,
};
pub use msg::{
	MSG_BURN_FAILED,
	MSG_CLOSING,
	MSG_DEBUG,
	MSG_ISRC,
	MSG_PADDING,
	MSG_SCSI,
	MSG_TRACK_DONE,
	MSG_TRACK_MODE,
	MSG_TRANSPORT,
	MsgEntry,
	MsgLog,
	MsgSink,
	PrintSink,
	Severity,
};
pub use source::{
	BufferSource,
	FileSource,
	Source,
	ZeroSource,
};
pub use structure::{
	Disc,
	Isrc,
	MAX_TRACKS,
	Session,
	SessionId,
	Track,
	TrackId,
};
pub use toc::{
	CueEntry,
	CueSheet,
	SessionLayout,
	TocBuilder,
	TocEntry,
	TrackPlan,
};
pub use transport::{
	Direction,
	Enumerator,
	Payload,
	Sense,
	Transport,
	Verdict,
};
pub use write::{
	burn,
	opts::WriteOptions,
	precheck,
};



/// # Fixed-Seed Hasher.
pub(crate) const AHASHER: ahash::RandomState = ahash::RandomState::with_seeds(13, 19, 23, 71);

/// # Number of lead-in sectors.
///
/// All discs have a 2-second region at the start before any data. Different
/// contexts include or exclude this amount, so it's good to keep it handy.
pub const CD_LEADIN: i32 = 150;

/// # Bytes Per Raw Sector.
///
/// This is the size of an audio sector, or a data sector with its sync,
/// header, and error correction included.
pub const SECTOR_RAW: u16 = 2352;

/// # Bytes Per Mode 1 Sector.
pub const SECTOR_MODE1: u16 = 2048;

/// # Append Position.
///
/// Pass this as the position to `Disc::add_session` or `Session::add_track`
/// to append rather than insert.
pub const POS_END: usize = 100;

/// # Transfer Buffer Size.
///
/// Sectors are queued until the next one would overflow this many bytes,
/// then sent to the drive with a single WRITE.
pub const BUFFER_SIZE: usize = 32_768;
