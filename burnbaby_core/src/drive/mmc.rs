/*!
# Burn Baby Burn: MMC Helpers
*/

use crate::{
	BlockType,
	BurnError,
	Capabilities,
	Command,
	DiscFormat,
	DiscStatus,
	DriveInfo,
	Link,
	msf_to_lba,
	Payload,
	Sense,
	TocEntry,
	WriteType,
};



/// # Mode Page Header Size.
const MODE_HEADER: usize = 8;

/// # Default Write Parameters Page Length.
const WRITE_PAGE_LEN: u8 = 0x32;

/// # Audio Pause Length (Sectors).
const AUDIO_PAUSE: u8 = 150;



#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
/// # Write Parameters.
///
/// The settings pushed to the drive with MODE SELECT page 0x05.
pub(crate) struct WriteParams {
	pub(crate) write_type: WriteType,
	pub(crate) block: u8,
	pub(crate) simulate: bool,
	pub(crate) underrun_proof: bool,
	pub(crate) multi: bool,
	pub(crate) control: u8,
	pub(crate) format: DiscFormat,
	pub(crate) mcn: Option<[u8; 13]>,
	pub(crate) isrc: Option<[u8; 12]>,
}

impl WriteParams {
	/// # Probe.
	///
	/// Bare parameters for testing whether a write/block type combination
	/// is accepted.
	const fn probe(write_type: WriteType, block: u8) -> Self {
		Self {
			write_type,
			block,
			simulate: false,
			underrun_proof: false,
			multi: false,
			control: if 4 < block { 4 } else { 0 },
			format: DiscFormat::CdRom,
			mcn: None,
			isrc: None,
		}
	}

	/// # To Page.
	///
	/// Build the full MODE SELECT parameter list for a page of the given
	/// length.
	fn to_page(self, page_len: u8) -> Vec<u8> {
		let mut out = vec![0_u8; MODE_HEADER + 2 + usize::from(page_len)];
		out[8] = 0x05;
		out[9] = page_len;
		out[10] = (u8::from(self.underrun_proof) << 6) |
			(u8::from(self.simulate) << 4) |
			self.write_type.code();
		out[11] = (if self.multi { 0xC0 } else { 0 }) | (self.control & 0x0F);
		out[12] = self.block;
		if let Some(v) = out.get_mut(16) { *v = self.format.code(); }
		if let Some(v) = out.get_mut(23) { *v = AUDIO_PAUSE; }

		if let Some(mcn) = self.mcn {
			if let Some(dst) = out.get_mut(24..38) {
				dst[0] = 0x80;
				dst[1..].copy_from_slice(&mcn);
			}
		}
		if let Some(isrc) = self.isrc {
			if let Some(dst) = out.get_mut(40..53) {
				dst[0] = 0x80;
				dst[1..].copy_from_slice(&isrc);
			}
		}

		out
	}
}



/// # Identification and Capabilities.
impl Link<'_> {
	/// # Inquiry.
	///
	/// ## Errors
	///
	/// Returns an error if the drive does not answer.
	pub(crate) fn inquiry(&mut self) -> Result<DriveInfo, BurnError> {
		let mut buf = [0_u8; 36];
		self.issue(Command::Inquiry, Payload::In(&mut buf))?;
		Ok(DriveInfo::from_inquiry(&buf))
	}

	/// # Mode Sense.
	///
	/// Return the requested page, minus the mode header and any block
	/// descriptors.
	fn mode_sense(&mut self, page: u8) -> Option<Vec<u8>> {
		let mut buf = vec![0_u8; 256];
		self.issue_quiet(Command::ModeSense(page), Payload::In(&mut buf)).ok()?;
		let desc = usize::from(u16::from_be_bytes([buf[6], buf[7]]));
		let start = MODE_HEADER + desc;
		if buf.len() <= start + 2 || buf[start] & 0x3F != page { return None; }
		buf.drain(..start);
		Some(buf)
	}

	/// # Capabilities.
	///
	/// Drives that will not share their capabilities page are treated as
	/// read-only.
	pub(crate) fn capabilities(&mut self) -> Capabilities {
		self.mode_sense(0x2A)
			.map(|page| Capabilities::from_page(&page))
			.unwrap_or_default()
	}

	/// # Write Parameters Page Length.
	///
	/// Learn the length of the drive's write parameters page, falling back
	/// to the usual size.
	pub(crate) fn write_page_len(&mut self) {
		let len = self.mode_sense(0x05)
			.map(|page| page[1])
			.filter(|len| 0 != *len)
			.unwrap_or(WRITE_PAGE_LEN);
		self.io().write_page_len = len;
	}

	/// # Probe Block Types.
	///
	/// Find out which block types the drive will accept for a given write
	/// type, returning them as a bit set.
	pub(crate) fn probe_block_types(&mut self, write_type: WriteType) -> u16 {
		let page_len = self.io().write_page_len;
		let mut out = 0;
		for block in BlockType::ALL {
			if block == BlockType::Sao { continue; }
			let page = WriteParams::probe(write_type, block.code()).to_page(page_len);
			if self.issue_quiet(Command::ModeSelect, Payload::Out(&page)).is_ok() {
				out |= block.bit();
			}
		}
		out
	}

	/// # Send Write Parameters.
	///
	/// ## Errors
	///
	/// Returns an error if the drive refuses them.
	pub(crate) fn write_params(&mut self, params: WriteParams) -> Result<(), BurnError> {
		let page = params.to_page(self.io().write_page_len);
		self.issue(Command::ModeSelect, Payload::Out(&page))
	}
}



/// # Disc State.
impl Link<'_> {
	/// # Probe Disc.
	///
	/// Work out what is in the drive. Writers are asked for the disc
	/// information (and the TOC, if there's something on it); readers only
	/// have the TOC to go on.
	///
	/// Errors are not fatal here: the status is simply left unready, or
	/// empty if the drive said so.
	pub(crate) fn probe_disc(&mut self) {
		let drive = self.drive();
		drive.forget_disc();
		drive.set_disc_status(DiscStatus::Unready);

		let res =
			if drive.info().caps().writer() {
				self.disc_info().and_then(|status| {
					if matches!(status, DiscStatus::Full | DiscStatus::Appendable) {
						let toc = self.read_toc()?;
						drive.set_toc(toc);
					}
					Ok(status)
				})
			}
			else {
				self.read_toc().map(|toc| {
					let status =
						if toc.is_empty() { DiscStatus::Blank }
						else { DiscStatus::Full };
					drive.set_toc(toc);
					status
				})
			};

		if let Ok(status) = res { drive.set_disc_status(status); }
	}

	/// # Read Disc Information.
	///
	/// Return the disc status, noting the erasability and the usable LBA
	/// range along the way.
	///
	/// ## Errors
	///
	/// Returns an error if the drive does not answer.
	pub(crate) fn disc_info(&mut self) -> Result<DiscStatus, BurnError> {
		let mut buf = [0_u8; 34];
		self.issue(Command::DiscInfo, Payload::In(&mut buf))?;

		let status = match buf[2] & 3 {
			0 => DiscStatus::Blank,
			1 => DiscStatus::Appendable,
			_ => DiscStatus::Full,
		};
		let erasable = 0 != buf[2] & 0x10;
		let start = msf_to_lba(buf[17], buf[18], buf[19]);
		let end = msf_to_lba(buf[21], buf[22], buf[23]);
		self.drive().set_media(start, end, erasable);

		Ok(status)
	}

	/// # Read Full TOC.
	///
	/// ## Errors
	///
	/// Returns an error if the drive does not answer.
	pub(crate) fn read_toc(&mut self) -> Result<Vec<TocEntry>, BurnError> {
		let mut buf = vec![0_u8; 4096];
		self.issue(Command::ReadToc, Payload::In(&mut buf))?;
		Ok(TocEntry::parse_full(&buf))
	}

	/// # Next Writable Address.
	///
	/// ## Errors
	///
	/// Returns an error if the drive does not answer.
	pub(crate) fn next_writable(&mut self) -> Result<i32, BurnError> {
		let mut buf = [0_u8; 28];
		self.issue(Command::TrackInfo, Payload::In(&mut buf))?;
		Ok(i32::from_be_bytes([buf[12], buf[13], buf[14], buf[15]]))
	}

	/// # Buffer Capacity.
	///
	/// Ask the drive how big its buffer is and how much of it is free,
	/// recording both in the progress. Not every drive answers, so failures
	/// are only worth a debug message.
	///
	/// ## Errors
	///
	/// Returns an error if the drive does not answer.
	pub(crate) fn buffer_capacity(&mut self) -> Result<(), BurnError> {
		let mut buf = [0_u8; 12];
		self.issue_quiet(Command::BufferCapacity, Payload::In(&mut buf))?;
		let capacity = u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]);
		let available = u32::from_be_bytes([buf[8], buf[9], buf[10], buf[11]]);
		self.drive().progress(|p| {
			p.buffer_capacity = capacity;
			p.buffer_available = available;
		});
		Ok(())
	}
}



/// # Tray.
impl Link<'_> {
	/// # Load.
	pub(crate) fn load(&mut self) -> Result<(), BurnError> {
		self.issue(Command::Load, Payload::None)
	}

	/// # Eject.
	pub(crate) fn eject(&mut self) -> Result<(), BurnError> {
		self.issue(Command::Eject, Payload::None)
	}

	/// # Lock Tray.
	pub(crate) fn prevent(&mut self) -> Result<(), BurnError> {
		self.issue(Command::Prevent, Payload::None)
	}

	/// # Unlock Tray.
	pub(crate) fn allow(&mut self) -> Result<(), BurnError> {
		self.issue(Command::Allow, Payload::None)
	}
}



/// # Writing.
impl Link<'_> {
	/// # Optimum Power Calibration.
	pub(crate) fn send_opc(&mut self) -> Result<(), BurnError> {
		self.issue(Command::SendOpc, Payload::None)
	}

	/// # Set Speed.
	///
	/// Speeds are in kB/s; zero asks for the maximum.
	pub(crate) fn set_speed(&mut self, write: u16) -> Result<(), BurnError> {
		let write = if write == 0 { u16::MAX } else { write };
		self.issue(Command::SetSpeed { read: u16::MAX, write }, Payload::None)
	}

	/// # Send Cue Sheet.
	pub(crate) fn send_cue_sheet(&mut self, cue: &[u8]) -> Result<(), BurnError> {
		self.issue(Command::SendCueSheet, Payload::Out(cue))
	}

	/// # Write Sectors.
	pub(crate) fn write(&mut self, lba: i32, sectors: u16, data: &[u8]) -> Result<(), BurnError> {
		self.issue(Command::Write { lba, sectors }, Payload::Out(data))
	}

	/// # Synchronize Cache.
	pub(crate) fn sync_cache(&mut self) -> Result<(), BurnError> {
		self.issue(Command::SyncCache, Payload::None)
	}

	/// # Close Track.
	pub(crate) fn close_track(&mut self, track: u16) -> Result<(), BurnError> {
		self.issue(Command::CloseTrack(track), Payload::None)
	}

	/// # Close Session.
	pub(crate) fn close_session(&mut self) -> Result<(), BurnError> {
		self.issue(Command::CloseSession, Payload::None)
	}
}



/// # Blanking.
impl Link<'_> {
	/// # Blank.
	///
	/// This returns as soon as the drive accepts the command; use
	/// `wait_ready` to wait for it to finish.
	pub(crate) fn blank(&mut self, fast: bool) -> Result<(), BurnError> {
		self.issue(Command::Blank { fast }, Payload::None)
	}

	/// # Request Sense.
	fn request_sense(&mut self) -> Result<Option<Sense>, BurnError> {
		let mut buf = [0_u8; 18];
		self.issue_quiet(Command::RequestSense, Payload::In(&mut buf))?;
		Ok(Sense::from_bytes(&buf))
	}

	/// # Wait Until Ready.
	///
	/// Poll the drive until it reports ready, recording any progress it
	/// shares along the way.
	///
	/// ## Errors
	///
	/// Returns an error if the wait is cancelled, or the drive reports
	/// anything other than "not ready".
	pub(crate) fn wait_ready(&mut self) -> Result<(), BurnError> {
		let drive = self.drive();
		let poll = drive.timing().poll();
		loop {
			if drive.killed() { return Err(BurnError::Killed); }
			std::thread::sleep(poll);

			match self.issue_quiet(Command::TestUnitReady, Payload::None) {
				Ok(()) => {
					drive.progress(|p| { p.sector = p.sectors; });
					return Ok(());
				},
				Err(BurnError::Sense(_, s)) if s.key() == 2 && s.asc() == 4 => {
					if let Some(v) = self.request_sense()?.and_then(|s| s.progress()) {
						drive.progress(|p| { p.sector = u32::from(v); });
					}
				},
				Err(e) => return Err(e),
			}
		}
	}
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_write_page() {
		let params = WriteParams {
			write_type: WriteType::Sao,
			block: 8,
			simulate: true,
			underrun_proof: true,
			multi: true,
			control: 4,
			format: DiscFormat::CdXa,
			mcn: Some(*b"0123456789012"),
			isrc: Some(*b"USABC9912345"),
		};
		let page = params.to_page(0x32);
		assert_eq!(page.len(), 60);
		assert_eq!(page[8], 5);
		assert_eq!(page[9], 0x32);
		assert_eq!(page[10], 0x40 | 0x10 | 2, "Expected BUFE, test, and SAO.");
		assert_eq!(page[11], 0xC4, "Expected multi-session and data control.");
		assert_eq!(page[12], 8);
		assert_eq!(page[16], 0x20);
		assert_eq!(page[23], 150);
		assert_eq!(page[24], 0x80);
		assert_eq!(&page[25..38], b"0123456789012");
		assert_eq!(page[40], 0x80);
		assert_eq!(&page[41..53], b"USABC9912345");

		// A 0x1E page has room for the catalog, but not the ISRC.
		let page = params.to_page(0x1E);
		assert_eq!(page.len(), 40);
		assert_eq!(page[24], 0x80, "The catalog should fit.");
		assert_eq!(&page[25..38], b"0123456789012");
		assert!(page[38..].iter().all(|b| 0 == *b), "The ISRC should be dropped.");

		// Pages too short for either leave both out.
		let page = params.to_page(0x0E);
		assert_eq!(page.len(), 24);
		assert_eq!(page[23], 150);
	}

	#[test]
	fn t_probe_page() {
		let page = WriteParams::probe(WriteType::Tao, 8).to_page(0x32);
		assert_eq!(page[10], 1);
		assert_eq!(page[11], 4, "Data blocks need the data control bit.");
		assert_eq!(page[12], 8);
		assert!(page[24..].iter().all(|b| 0 == *b));

		let page = WriteParams::probe(WriteType::Raw, 3).to_page(0x32);
		assert_eq!(page[10], 3);
		assert_eq!(page[11], 0);
		assert_eq!(page[12], 3);
	}
}
