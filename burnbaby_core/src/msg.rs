/*!
# Burn Baby Burn: Messages
*/

use fyi_msg::Msg;
use std::sync::{
	Mutex,
	PoisonError,
};
use utc2k::FmtUtc2k;



/// # Code: Generic Debug Chatter.
pub const MSG_DEBUG: u32 =            0x0000_0002;

/// # Code: Unsuitable Track Mode.
pub const MSG_TRACK_MODE: u32 =       0x0002_010a;

/// # Code: Burn Run Failed.
pub const MSG_BURN_FAILED: u32 =      0x0002_010b;

/// # Code: Transport Failure.
pub const MSG_TRANSPORT: u32 =        0x0002_010c;

/// # Code: Classified SCSI Failure.
pub const MSG_SCSI: u32 =             0x0002_010f;

/// # Code: Bad ISRC.
pub const MSG_ISRC: u32 =             0x0002_0114;

/// # Code: Closing Track/Session.
pub const MSG_CLOSING: u32 =          0x0002_0119;

/// # Code: Track Padded Up.
pub const MSG_PADDING: u32 =          0x0002_011a;

/// # Code: Track Summary.
pub const MSG_TRACK_DONE: u32 =       0x0002_0120;



#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq, Ord, PartialOrd)]
/// # Message Severity.
///
/// Variants are ordered from least to most severe, so thresholds can be
/// expressed with the usual comparison operators.
pub enum Severity {
	/// # Debug.
	Debug,

	/// # Update.
	Update,

	/// # Note.
	Note,

	/// # Hint.
	Hint,

	/// # Warning.
	Warning,

	/// # Sorry (the requested thing did not happen).
	Sorry,

	/// # Failure.
	Failure,

	/// # Fatal (the whole run is over).
	Fatal,
}

impl Severity {
	#[must_use]
	/// # As Str.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Debug => "DEBUG",
			Self::Update => "UPDATE",
			Self::Note => "NOTE",
			Self::Hint => "HINT",
			Self::Warning => "WARNING",
			Self::Sorry => "SORRY",
			Self::Failure => "FAILURE",
			Self::Fatal => "FATAL",
		}
	}
}



/// # Message Sink.
///
/// Drives report classified failures, notable events, and debug chatter
/// here. Implementations must return quickly; the write path calls this
/// between sectors.
pub trait MsgSink: Send + Sync {
	/// # Submit a Message.
	///
	/// The drive index is `None` for messages not tied to a particular drive.
	fn submit(&self, drive: Option<usize>, code: u32, severity: Severity, text: &str);
}

impl std::fmt::Debug for dyn MsgSink {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MsgSink").finish_non_exhaustive()
	}
}



#[derive(Debug, Clone, Copy)]
/// # Print Sink.
///
/// Print messages at or above the threshold to STDERR.
pub struct PrintSink(Severity);

impl Default for PrintSink {
	#[inline]
	fn default() -> Self { Self(Severity::Sorry) }
}

impl From<Severity> for PrintSink {
	#[inline]
	fn from(src: Severity) -> Self { Self(src) }
}

impl MsgSink for PrintSink {
	fn submit(&self, drive: Option<usize>, _code: u32, severity: Severity, text: &str) {
		if severity < self.0 { return; }

		let text = drive.map_or_else(
			|| text.to_owned(),
			|n| format!("[drive {n}] {text}"),
		);
		match severity {
			Severity::Fatal | Severity::Failure | Severity::Sorry => Msg::error(text),
			Severity::Warning => Msg::warning(text),
			Severity::Hint | Severity::Note => Msg::info(text),
			Severity::Update | Severity::Debug => Msg::custom(severity.as_str(), 8, &text),
		}.eprint();
	}
}



#[derive(Debug, Clone)]
/// # Logged Message.
pub struct MsgEntry {
	when: FmtUtc2k,
	drive: Option<usize>,
	code: u32,
	severity: Severity,
	text: String,
}

impl MsgEntry {
	#[must_use]
	/// # Timestamp.
	pub const fn when(&self) -> &FmtUtc2k { &self.when }

	#[must_use]
	/// # Drive Index.
	pub const fn drive(&self) -> Option<usize> { self.drive }

	#[must_use]
	/// # Code.
	pub const fn code(&self) -> u32 { self.code }

	#[must_use]
	/// # Severity.
	pub const fn severity(&self) -> Severity { self.severity }

	#[must_use]
	/// # Text.
	pub fn text(&self) -> &str { &self.text }
}



#[derive(Debug, Default)]
/// # Message Log.
///
/// This queues every message it receives so they can be reviewed later.
pub struct MsgLog(Mutex<Vec<MsgEntry>>);

impl MsgSink for MsgLog {
	fn submit(&self, drive: Option<usize>, code: u32, severity: Severity, text: &str) {
		self.0.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.push(MsgEntry {
				when: FmtUtc2k::now(),
				drive,
				code,
				severity,
				text: text.to_owned(),
			});
	}
}

impl MsgLog {
	#[must_use]
	/// # Drain.
	///
	/// Remove and return everything logged so far.
	pub fn drain(&self) -> Vec<MsgEntry> {
		std::mem::take(&mut *self.0.lock().unwrap_or_else(PoisonError::into_inner))
	}

	#[must_use]
	/// # Contains Code?
	pub fn contains(&self, code: u32) -> bool {
		self.0.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.iter()
			.any(|m| m.code == code)
	}

	#[must_use]
	/// # Length.
	pub fn len(&self) -> usize {
		self.0.lock().unwrap_or_else(PoisonError::into_inner).len()
	}

	#[must_use]
	/// # Is Empty?
	pub fn is_empty(&self) -> bool { self.len() == 0 }
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_severity_order() {
		assert!(Severity::Fatal > Severity::Sorry);
		assert!(Severity::Sorry > Severity::Warning);
		assert!(Severity::Note > Severity::Debug);
	}

	#[test]
	fn t_log() {
		let log = MsgLog::default();
		assert!(log.is_empty());

		log.submit(Some(0), MSG_PADDING, Severity::Note, "Padding.");
		log.submit(None, MSG_BURN_FAILED, Severity::Fatal, "Burn run failed");
		assert_eq!(log.len(), 2);
		assert!(log.contains(MSG_PADDING));
		assert!(! log.contains(MSG_SCSI));

		let all = log.drain();
		assert!(log.is_empty(), "Drain should empty the log.");
		assert_eq!(all[0].drive(), Some(0));
		assert_eq!(all[1].severity(), Severity::Fatal);
		assert_eq!(all[1].text(), "Burn run failed");
	}
}
