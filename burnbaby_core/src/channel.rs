/*!
# Burn Baby Burn: Command Channel
*/

use crate::{
	BurnError,
	Command,
	DiscStatus,
	Drive,
	DriveStatus,
	MSG_SCSI,
	MSG_TRANSPORT,
	Payload,
	Severity,
	Verdict,
};
use crate::drive::DriveIo;
use std::{
	sync::{
		MutexGuard,
		PoisonError,
	},
	time::Instant,
};



#[derive(Debug)]
/// # Drive Link.
///
/// This is an exclusive line to a drive's transport. Everything that talks
/// to the hardware goes through one of these, and only one can exist per
/// drive at a time.
pub(crate) struct Link<'a> {
	drive: &'a Drive,
	io: MutexGuard<'a, DriveIo>,
}

impl<'a> Link<'a> {
	/// # New.
	///
	/// This blocks until any other link to the drive is dropped.
	pub(crate) fn new(drive: &'a Drive) -> Self {
		let io = drive.io().lock().unwrap_or_else(PoisonError::into_inner);
		Self { drive, io }
	}

	/// # Drive.
	pub(crate) const fn drive(&self) -> &'a Drive { self.drive }

	/// # I/O State.
	pub(crate) fn io(&mut self) -> &mut DriveIo { &mut self.io }
}

impl Link<'_> {
	/// # Issue Command.
	///
	/// Send the command to the drive, retrying transient failures with an
	/// increasing back-off until the per-command time limit is reached.
	///
	/// Failures are reported to the drive's message sink before being
	/// returned.
	///
	/// ## Errors
	///
	/// Returns an error if the command could not be delivered or the drive
	/// rejected it.
	pub(crate) fn issue(&mut self, cmd: Command, payload: Payload<'_>) -> Result<(), BurnError> {
		self.exec(cmd, payload, cmd.retry(), Severity::Sorry)
	}

	/// # Issue Command (Quietly).
	///
	/// Like `issue`, but with no retries, and failures are only worth a
	/// debug message. This is for probing and polling, where rejection is
	/// an answer rather than a problem.
	///
	/// ## Errors
	///
	/// Same as `issue`.
	pub(crate) fn issue_quiet(&mut self, cmd: Command, payload: Payload<'_>) -> Result<(), BurnError> {
		self.exec(cmd, payload, false, Severity::Debug)
	}

	/// # Execute.
	fn exec(&mut self, cmd: Command, mut payload: Payload<'_>, retry: bool, severity: Severity)
	-> Result<(), BurnError> {
		let timing = self.drive.timing();
		let start = Instant::now();
		let mut tries = 0_u32;

		loop {
			let cdb = cmd.cdb(payload.len());
			let res = self.io.transport.transmit(&cdb, payload.reborrow(), timing.timeout());

			let sense = match res {
				Ok(None) => return Ok(()),
				Ok(Some(sense)) => sense,
				Err(_) => {
					// Without a working transport, there is no drive.
					self.drive.msg(
						MSG_TRANSPORT,
						Severity::Fatal,
						&format!("Failed to transfer command to drive ({}).", cmd.name()),
					);
					self.drive.set_released(true);
					self.drive.set_state(DriveStatus::Idle);
					return Err(BurnError::Transport(cmd.name()));
				},
			};

			let verdict = sense.verdict();
			if verdict == Verdict::FailEmpty {
				self.drive.set_disc_status(DiscStatus::Empty);
			}
			else if verdict == Verdict::Retry && retry {
				let sleep = timing.backoff(tries);
				if start.elapsed() + sleep <= timing.timeout() {
					std::thread::sleep(sleep);
					tries += 1;
					continue;
				}
			}

			self.drive.msg(
				MSG_SCSI,
				severity,
				&format!("{} failed: {}.", cmd.name(), sense.describe()),
			);
			return Err(BurnError::Sense(cmd.name(), sense));
		}
	}
}



#[cfg(test)]
mod test {
	use super::*;
	use crate::{
		CommandTiming,
		MockTransport,
		MsgLog,
		MSG_SCSI,
		Sense,
	};
	use std::{
		sync::Arc,
		time::Duration,
	};

	/// # Test Drive.
	fn drive(mock: &MockTransport, timing: CommandTiming) -> (Drive, Arc<MsgLog>) {
		let log = Arc::new(MsgLog::default());
		let drive = Drive::open(0, Box::new(mock.clone()), log.clone(), timing)
			.expect("Open failed.");
		assert!(log.drain().iter().all(|m| m.severity() == Severity::Debug));
		mock.clear();
		(drive, log)
	}

	/// # Fast Timing.
	const fn fast() -> CommandTiming {
		CommandTiming::new()
			.with_timeout(Duration::from_millis(200))
			.with_backoff(Duration::from_millis(1), Duration::from_millis(1))
	}

	#[test]
	fn t_retry() {
		let mock = MockTransport::default();
		let (drive, log) = drive(&mock, fast());

		// Not ready twice, then fine.
		mock.fail_sense(0x35, Sense::new(2, 4, 1), 2);
		let mut link = Link::new(&drive);
		assert_eq!(link.issue(Command::SyncCache, Payload::None), Ok(()));
		assert_eq!(mock.opcodes(), vec![0x35, 0x35, 0x35], "Expected two retries.");
		assert!(log.is_empty(), "Retries should not be reported.");
	}

	#[test]
	fn t_retry_timeout() {
		let mock = MockTransport::default();
		let (drive, log) = drive(&mock, fast());

		// Not ready forever.
		mock.fail_sense(0x35, Sense::new(2, 4, 0), usize::MAX);
		let mut link = Link::new(&drive);
		let res = link.issue(Command::SyncCache, Payload::None);
		assert_eq!(res, Err(BurnError::Sense("SYNCHRONIZE CACHE", Sense::new(2, 4, 0))));
		assert!(1 < mock.opcodes().len(), "The command should have been retried.");
		assert!(log.contains(MSG_SCSI), "The failure should be reported.");
	}

	#[test]
	fn t_fail() {
		let mock = MockTransport::default();
		let (drive, log) = drive(&mock, fast());

		// Invalid field; no retry.
		mock.fail_sense(0x35, Sense::new(5, 0x24, 0), 1);
		let mut link = Link::new(&drive);
		assert!(link.issue(Command::SyncCache, Payload::None).is_err());
		assert_eq!(mock.opcodes(), vec![0x35]);
		let msgs = log.drain();
		assert_eq!(msgs.len(), 1);
		assert_eq!(msgs[0].code(), MSG_SCSI);
		assert_eq!(msgs[0].severity(), Severity::Sorry);
		assert_eq!(msgs[0].text(), "SYNCHRONIZE CACHE failed: invalid field in CDB.");

		// Not ready, but the command does not allow retries.
		mock.clear();
		mock.fail_sense(0x00, Sense::new(2, 4, 0), 5);
		assert!(link.issue(Command::TestUnitReady, Payload::None).is_err());
		assert_eq!(mock.opcodes(), vec![0x00]);
	}

	#[test]
	fn t_no_medium() {
		let mock = MockTransport::default();
		let (drive, _log) = drive(&mock, fast());
		drive.set_disc_status(DiscStatus::Blank);

		mock.fail_sense(0x35, Sense::new(2, 0x3A, 0), 1);
		let mut link = Link::new(&drive);
		assert!(link.issue_quiet(Command::SyncCache, Payload::None).is_err());
		drop(link);
		assert_eq!(drive.disc_status(), DiscStatus::Empty, "No medium should mark the disc empty.");
	}

	#[test]
	fn t_transport() {
		let mock = MockTransport::default();
		let (drive, log) = drive(&mock, fast());
		assert!(drive.grab(false).is_ok());
		assert!(! drive.released());

		mock.fail_transport(0x35, 1);
		let mut link = Link::new(&drive);
		assert_eq!(
			link.issue(Command::SyncCache, Payload::None),
			Err(BurnError::Transport("SYNCHRONIZE CACHE")),
		);
		drop(link);
		assert!(drive.released(), "Transport failure should release the drive.");
		assert_eq!(drive.status().0, DriveStatus::Idle);
		assert!(log.contains(MSG_TRANSPORT));
	}
}
