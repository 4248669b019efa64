/*!
# Burn Baby Burn: Mock Transport
*/

use crate::{
	BurnError,
	DiscStatus,
	Enumerator,
	KillSwitch,
	lba_to_msf,
	Payload,
	Sense,
	TocEntry,
	Transport,
};
use std::{
	sync::{
		Arc,
		Mutex,
		MutexGuard,
		PoisonError,
	},
	time::Duration,
};



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Mock Media.
///
/// The disc sitting in a mock drive.
pub struct MockMedia {
	status: DiscStatus,
	erasable: bool,
	start_lba: i32,
	end_lba: i32,
}

impl Default for MockMedia {
	/// # Default.
	///
	/// A blank 80-minute CD-RW.
	fn default() -> Self {
		Self {
			status: DiscStatus::Blank,
			erasable: true,
			start_lba: -11_634,
			end_lba: 359_849,
		}
	}
}

impl MockMedia {
	#[must_use]
	/// # New.
	pub const fn new(status: DiscStatus, erasable: bool, start_lba: i32, end_lba: i32) -> Self {
		Self { status, erasable, start_lba, end_lba }
	}

	#[must_use]
	/// # Status.
	pub const fn status(&self) -> DiscStatus { self.status }
}



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Mock Call.
///
/// A record of one command received by a mock drive.
pub struct MockCall {
	/// # Command Descriptor Block.
	pub cdb: Vec<u8>,

	/// # Data Sent to the Drive.
	pub data: Vec<u8>,

	/// # Did the Mock Refuse It?
	pub failed: bool,
}

impl MockCall {
	#[must_use]
	/// # Opcode.
	pub fn opcode(&self) -> u8 { self.cdb.first().copied().unwrap_or(0xFF) }

	#[must_use]
	/// # Write Details.
	///
	/// Return the LBA and sector count if this was a WRITE.
	pub fn write(&self) -> Option<(i32, u16)> {
		if self.opcode() == 0x2A && 9 <= self.cdb.len() {
			let lba = i32::from_be_bytes([self.cdb[2], self.cdb[3], self.cdb[4], self.cdb[5]]);
			let len = u16::from_be_bytes([self.cdb[7], self.cdb[8]]);
			Some((lba, len))
		}
		else { None }
	}
}



#[derive(Debug, Clone, Copy)]
/// # Scripted Fault.
enum Fault {
	/// # Sense Data.
	Sense(Sense),

	/// # Transport Failure.
	Transport,
}

#[derive(Debug, Default)]
/// # Mock State.
struct MockState {
	media: MockMedia,
	toc: Vec<TocEntry>,
	nwa: i32,
	multi: bool,
	calls: Vec<MockCall>,
	faults: Vec<(u8, Fault, usize)>,
	busy: u8,
	kill: Option<(usize, KillSwitch)>,
	writes: usize,
}



#[derive(Debug, Clone)]
/// # Mock Transport.
///
/// An in-memory stand-in for an optical drive. It answers the usual
/// queries with plausible data, records every command it receives, and can
/// be told to misbehave: fail a given opcode with sense data or a transport
/// error some number of times, or trip a kill switch partway through a
/// burn.
///
/// Clones share state, so one copy can be handed to a `Drive` while
/// another is kept for inspection.
///
/// ```
/// use burnbaby_core::{CommandTiming, Drive, MockTransport, PrintSink};
/// use std::sync::Arc;
///
/// let mock = MockTransport::default();
/// let drive = Drive::open(
///     0,
///     Box::new(mock.clone()),
///     Arc::new(PrintSink::default()),
///     CommandTiming::default(),
/// ).unwrap();
///
/// assert_eq!(drive.info().vendor(), "BURNBABY");
/// assert!(! mock.calls().is_empty());
/// ```
pub struct MockTransport {
	address: String,
	state: Arc<Mutex<MockState>>,
}

impl Default for MockTransport {
	fn default() -> Self { Self::new("/dev/mock0") }
}

impl MockTransport {
	#[must_use]
	/// # New.
	pub fn new(address: &str) -> Self {
		Self {
			address: address.to_owned(),
			state: Arc::default(),
		}
	}

	#[must_use]
	/// # With Media.
	pub fn with_media(self, media: MockMedia) -> Self {
		self.state().media = media;
		self
	}

	/// # Set TOC.
	///
	/// Set the entries returned by READ TOC.
	pub fn set_toc(&self, toc: Vec<TocEntry>) { self.state().toc = toc; }

	/// # Fail With Sense.
	///
	/// Answer the next `times` commands with this opcode with the given
	/// sense data.
	pub fn fail_sense(&self, opcode: u8, sense: Sense, times: usize) {
		self.state().faults.push((opcode, Fault::Sense(sense), times));
	}

	/// # Fail Transport.
	///
	/// Refuse to deliver the next `times` commands with this opcode.
	pub fn fail_transport(&self, opcode: u8, times: usize) {
		self.state().faults.push((opcode, Fault::Transport, times));
	}

	/// # Kill on Write.
	///
	/// Trip the switch once the `n`th WRITE command has been accepted.
	pub fn kill_on_write(&self, n: usize, switch: KillSwitch) {
		let mut state = self.state();
		state.writes = 0;
		state.kill.replace((n, switch));
	}

	#[must_use]
	/// # Calls.
	pub fn calls(&self) -> Vec<MockCall> { self.state().calls.clone() }

	#[must_use]
	/// # Opcodes.
	pub fn opcodes(&self) -> Vec<u8> {
		self.state().calls.iter().map(MockCall::opcode).collect()
	}

	#[must_use]
	/// # Writes.
	///
	/// Return the LBA, sector count, and byte count of each WRITE received.
	pub fn writes(&self) -> Vec<(i32, u16, usize)> {
		self.state().calls.iter()
			.filter_map(|c| c.write().map(|(lba, len)| (lba, len, c.data.len())))
			.collect()
	}

	#[must_use]
	/// # Media.
	pub fn media(&self) -> MockMedia { self.state().media }

	/// # Clear.
	///
	/// Forget the recorded calls.
	pub fn clear(&self) { self.state().calls.clear(); }

	/// # State.
	fn state(&self) -> MutexGuard<'_, MockState> {
		self.state.lock().unwrap_or_else(PoisonError::into_inner)
	}
}

impl Transport for MockTransport {
	fn address(&self) -> &str { &self.address }

	fn transmit(&mut self, cdb: &[u8], payload: Payload<'_>, _timeout: Duration)
	-> Result<Option<Sense>, BurnError> {
		let mut state = self.state();
		let opcode = cdb.first().copied().unwrap_or(0xFF);
		let data = match &payload {
			Payload::Out(b) => b.to_vec(),
			_ => Vec::new(),
		};
		let mut call = MockCall { cdb: cdb.to_vec(), data, failed: true };

		// Scripted trouble comes first.
		if let Some(pos) = state.faults.iter().position(|(op, _, n)| *op == opcode && 0 < *n) {
			let fault = state.faults[pos].1;
			state.faults[pos].2 -= 1;
			state.calls.push(call);
			return match fault {
				Fault::Sense(s) => Ok(Some(s)),
				Fault::Transport => Err(BurnError::Transport("mock")),
			};
		}

		let res = state.answer(cdb, payload);
		call.failed = res.is_some();
		state.calls.push(call);
		Ok(res)
	}
}

impl MockState {
	/// # Answer a Command.
	fn answer(&mut self, cdb: &[u8], payload: Payload<'_>) -> Option<Sense> {
		let opcode = cdb.first().copied().unwrap_or(0xFF);
		let empty = self.media.status == DiscStatus::Empty;
		if empty && matches!(opcode, 0x00 | 0x2A | 0x43 | 0x51 | 0x52 | 0x5B | 0xA1) {
			return Some(Sense::new(2, 0x3A, 0));
		}

		let mut reply = Vec::new();
		match opcode {
			// Test Unit Ready.
			0x00 => if 0 < self.busy {
				self.busy -= 1;
				return Some(Sense::new(2, 4, 7).with_progress(0x8000));
			},
			// Request Sense.
			0x03 => {
				let sense =
					if 0 < self.busy { Sense::new(2, 4, 7).with_progress(0x8000) }
					else { Sense::new(0, 0, 0) };
				reply.extend_from_slice(&sense.to_bytes());
			},
			// Inquiry.
			0x12 => {
				reply.resize(36, 0);
				reply[0] = 5;
				reply[8..16].copy_from_slice(b"BURNBABY");
				reply[16..32].copy_from_slice(b"MOCK WRITER     ");
				reply[32..36].copy_from_slice(b"1.00");
			},
			// Mode Sense.
			0x5A => match cdb.get(2).map(|p| p & 0x3F) {
				Some(0x2A) => {
					reply.resize(8 + 30, 0);
					reply[1] = 36;
					let page = &mut reply[8..];
					page[0] = 0x2A;
					page[1] = 28;
					page[2] = 0b0000_0011;
					page[3] = 0b0000_0111;
					page[4] = 0x80;
					page[5] = 0x10;
					page[8..10].copy_from_slice(&7056_u16.to_be_bytes());
					page[12..14].copy_from_slice(&2048_u16.to_be_bytes());
					page[14..16].copy_from_slice(&7056_u16.to_be_bytes());
					page[18..20].copy_from_slice(&7056_u16.to_be_bytes());
					page[20..22].copy_from_slice(&7056_u16.to_be_bytes());
				},
				Some(0x05) => {
					reply.resize(8 + 2 + 0x32, 0);
					reply[1] = 8 + 0x32;
					reply[8] = 0x05;
					reply[9] = 0x32;
				},
				_ => return Some(Sense::new(5, 0x24, 0)),
			},
			// Mode Select.
			0x55 => if let Payload::Out(b) = &payload {
				if 11 < b.len() && b[8] & 0x3F == 5 {
					self.multi = 0 != b[11] & 0xC0;
				}
			},
			// Read Disc Information.
			0x51 => {
				reply.resize(34, 0);
				reply[1] = 32;
				reply[2] = match self.media.status {
					DiscStatus::Appendable => 1,
					DiscStatus::Full => 2,
					_ => 0,
				};
				if self.media.erasable { reply[2] |= 16; }
				let (m, s, f) = lba_to_msf(self.media.start_lba);
				reply[17..20].copy_from_slice(&[m, s, f]);
				let (m, s, f) = lba_to_msf(self.media.end_lba);
				reply[21..24].copy_from_slice(&[m, s, f]);
			},
			// Read TOC.
			0x43 => {
				let len = u16::try_from(2 + self.toc.len() * 11).unwrap_or(u16::MAX);
				reply.extend_from_slice(&len.to_be_bytes());
				reply.extend_from_slice(&[1, 1]);
				for &e in &self.toc { reply.extend_from_slice(&<[u8; 11]>::from(e)); }
			},
			// Read Track Information.
			0x52 => {
				reply.resize(28, 0);
				reply[1] = 26;
				reply[12..16].copy_from_slice(&self.nwa.to_be_bytes());
			},
			// Read Buffer Capacity.
			0x5C => {
				reply.resize(12, 0);
				reply[4..8].copy_from_slice(&2_097_152_u32.to_be_bytes());
				reply[8..12].copy_from_slice(&1_048_576_u32.to_be_bytes());
			},
			// Write.
			0x2A => {
				if cdb.len() < 9 { return Some(Sense::new(5, 0x24, 0)); }
				let lba = i32::from_be_bytes([cdb[2], cdb[3], cdb[4], cdb[5]]);
				let len = i32::from(u16::from_be_bytes([cdb[7], cdb[8]]));
				self.nwa = self.nwa.max(lba + len);
				self.writes += 1;
				if let Some((n, switch)) = &self.kill {
					if *n == self.writes { switch.kill(); }
				}
			},
			// Close Track/Session.
			0x5B => if cdb.get(2) == Some(&2) {
				self.media.status =
					if self.multi { DiscStatus::Appendable }
					else { DiscStatus::Full };
			},
			// Blank.
			0xA1 => {
				if ! self.media.erasable { return Some(Sense::new(5, 0x30, 0)); }
				self.media.status = DiscStatus::Blank;
				self.toc.clear();
				self.nwa = 0;
				self.busy = 2;
			},
			_ => {},
		}

		if let Payload::In(buf) = payload {
			let len = buf.len().min(reply.len());
			buf[..len].copy_from_slice(&reply[..len]);
			buf[len..].fill(0);
		}

		None
	}
}



#[derive(Debug, Clone, Default)]
/// # Mock Enumerator.
///
/// A list of mock drives, for testing scans.
pub struct MockEnumerator(Vec<MockTransport>);

impl From<Vec<MockTransport>> for MockEnumerator {
	fn from(src: Vec<MockTransport>) -> Self { Self(src) }
}

impl Enumerator for MockEnumerator {
	fn addresses(&mut self) -> Vec<String> {
		self.0.iter().map(|m| m.address.clone()).collect()
	}

	fn open(&mut self, address: &str) -> Result<Box<dyn Transport>, BurnError> {
		self.0.iter()
			.find(|m| m.address == address)
			.map(|m| Box::new(m.clone()) as Box<dyn Transport>)
			.ok_or_else(|| BurnError::DeviceOpen(Some(address.to_owned())))
	}
}



#[cfg(test)]
mod test {
	use super::*;
	use crate::Command;

	#[test]
	fn t_mock_answers() {
		let mut mock = MockTransport::default();
		let mut buf = [0_u8; 255];
		let cdb = Command::Inquiry.cdb(buf.len());
		assert_eq!(mock.transmit(&cdb, Payload::In(&mut buf), Duration::from_secs(1)), Ok(None));
		assert_eq!(&buf[8..16], b"BURNBABY");

		let cdb = Command::ModeSense(0x11).cdb(64);
		let mut buf = [0_u8; 64];
		assert_eq!(
			mock.transmit(&cdb, Payload::In(&mut buf), Duration::from_secs(1)),
			Ok(Some(Sense::new(5, 0x24, 0))),
			"Unknown pages should be refused.",
		);

		let cdb = Command::Write { lba: 10, sectors: 2 }.cdb(4096);
		assert_eq!(mock.transmit(&cdb, Payload::Out(&[0; 4096]), Duration::from_secs(1)), Ok(None));
		assert_eq!(mock.writes(), vec![(10, 2, 4096)]);

		let mut buf = [0_u8; 28];
		let cdb = Command::TrackInfo.cdb(buf.len());
		assert_eq!(mock.transmit(&cdb, Payload::In(&mut buf), Duration::from_secs(1)), Ok(None));
		assert_eq!(i32::from_be_bytes([buf[12], buf[13], buf[14], buf[15]]), 12, "NWA should follow writes.");
	}

	#[test]
	fn t_mock_faults() {
		let mut mock = MockTransport::default();
		mock.fail_sense(0x35, Sense::new(3, 0x0C, 0), 1);
		mock.fail_transport(0x35, 1);

		let cdb = Command::SyncCache.cdb(0);
		let t = Duration::from_secs(1);
		assert_eq!(mock.transmit(&cdb, Payload::None, t), Ok(Some(Sense::new(3, 0x0C, 0))));
		assert_eq!(mock.transmit(&cdb, Payload::None, t), Err(BurnError::Transport("mock")));
		assert_eq!(mock.transmit(&cdb, Payload::None, t), Ok(None), "Faults should run out.");
		assert_eq!(mock.calls().iter().filter(|c| c.failed).count(), 2);
	}

	#[test]
	fn t_mock_empty() {
		let mut mock = MockTransport::default()
			.with_media(MockMedia::new(DiscStatus::Empty, false, 0, 0));
		let cdb = Command::TestUnitReady.cdb(0);
		assert_eq!(
			mock.transmit(&cdb, Payload::None, Duration::from_secs(1)),
			Ok(Some(Sense::new(2, 0x3A, 0))),
		);
	}

	#[test]
	fn t_mock_enumerator() {
		let mut e = MockEnumerator::from(vec![
			MockTransport::new("/dev/a"),
			MockTransport::new("/dev/b"),
		]);
		assert_eq!(e.addresses(), vec!["/dev/a".to_owned(), "/dev/b".to_owned()]);
		assert!(e.open("/dev/b").is_ok());
		assert!(e.open("/dev/c").is_err());
	}
}
