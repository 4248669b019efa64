/*!
# Burn Baby Burn: `libcdio` Transport
*/

use crate::{
	BurnError,
	Enumerator,
	Payload,
	Sense,
	Transport,
};
use libcdio_sys::{
	driver_id_t_DRIVER_DEVICE, // The equivalent of "use whatever's best".
	driver_return_code_t_DRIVER_OP_SUCCESS,
	mmc_cdb_t,
};
use std::{
	ffi::{
		CStr,
		CString,
	},
	os::{
		raw::c_char,
		unix::ffi::OsStrExt,
	},
	path::Path,
	sync::Once,
	time::Duration,
};



static LIBCDIO_INIT: Once = Once::new();

/// # Access Mode.
///
/// Burning needs read-write access, and nobody else poking at the drive
/// while we do it.
const ACCESS_MODE: &[u8] = b"MMC_RDWR_EXCL\0";

/// # Longest CDB.
const MAX_CDB: usize = 12;



#[derive(Debug)]
/// # `libcdio` Transport.
///
/// This passes commands straight through to the device with
/// `mmc_run_cmd`. The handle is closed on drop.
pub struct CdioTransport {
	address: String,
	ptr: *mut libcdio_sys::CdIo_t,
}

#[allow(unsafe_code)]
// The handle is only ever used by whoever holds the transport.
unsafe impl Send for CdioTransport {}

impl Drop for CdioTransport {
	#[allow(unsafe_code)]
	fn drop(&mut self) {
		if ! self.ptr.is_null() {
			unsafe { libcdio_sys::cdio_destroy(self.ptr); }
		}
	}
}

impl CdioTransport {
	#[allow(unsafe_code)]
	/// # New.
	///
	/// Open the device at `address` for exclusive read-write access.
	///
	/// ## Errors
	///
	/// Returns an error if the path is obviously wrong, or the device cannot
	/// be opened.
	pub fn new<P>(address: P) -> Result<Self, BurnError>
	where P: AsRef<Path> {
		init();

		let path = address.as_ref();
		let original: String = path.to_string_lossy().into_owned();
		if ! path.exists() { return Err(BurnError::Device(original)); }
		let dev = CString::new(path.as_os_str().as_bytes())
			.map_err(|_| BurnError::Device(original.clone()))?;

		let ptr = unsafe {
			libcdio_sys::cdio_open_am(
				dev.as_ptr(),
				driver_id_t_DRIVER_DEVICE,
				ACCESS_MODE.as_ptr().cast(),
			)
		};

		if ptr.is_null() { Err(BurnError::DeviceOpen(Some(original))) }
		else { Ok(Self { address: original, ptr }) }
	}

	#[allow(unsafe_code)]
	/// # Last Sense.
	///
	/// Fetch the sense data from the most recent failed command, if the
	/// driver kept any.
	fn last_sense(&self) -> Option<Sense> {
		let mut raw: *mut libcdio_sys::cdio_mmc_request_sense_t = std::ptr::null_mut();
		let len = unsafe { libcdio_sys::mmc_last_cmd_sense(self.ptr, &mut raw) };
		if raw.is_null() { return None; }

		let out = usize::try_from(len).ok()
			.filter(|l| 0 < *l)
			.and_then(|l| {
				let bytes = unsafe { std::slice::from_raw_parts(raw.cast::<u8>(), l.min(18)) };
				Sense::from_bytes(bytes)
			});

		unsafe { libcdio_sys::cdio_free(raw.cast()); }
		out
	}
}

impl Transport for CdioTransport {
	fn address(&self) -> &str { &self.address }

	#[allow(unsafe_code)]
	fn transmit(&mut self, cdb: &[u8], payload: Payload<'_>, timeout: Duration)
	-> Result<Option<Sense>, BurnError> {
		if cdb.is_empty() || MAX_CDB < cdb.len() {
			return Err(BurnError::Transport("Invalid CDB length."));
		}

		let mut raw: mmc_cdb_t = unsafe { std::mem::zeroed() };
		raw.field[..cdb.len()].copy_from_slice(cdb);

		let timeout = u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX);
		let len = u32::try_from(payload.len())
			.map_err(|_| BurnError::Transport("Oversized payload."))?;

		// Directions: 0 for reads, 1 for writes, 2 for nothing.
		let res = match payload {
			Payload::None => unsafe {
				libcdio_sys::mmc_run_cmd(self.ptr, timeout, &raw, 2, 0, std::ptr::null_mut())
			},
			Payload::In(buf) => unsafe {
				libcdio_sys::mmc_run_cmd(self.ptr, timeout, &raw, 0, len, buf.as_mut_ptr().cast())
			},
			Payload::Out(buf) => unsafe {
				// The buffer is only read for writes.
				libcdio_sys::mmc_run_cmd(
					self.ptr,
					timeout,
					&raw,
					1,
					len,
					buf.as_ptr().cast_mut().cast(),
				)
			},
		};

		if res == driver_return_code_t_DRIVER_OP_SUCCESS { Ok(None) }
		else {
			self.last_sense()
				.map(Some)
				.ok_or(BurnError::Transport("The command failed without sense data."))
		}
	}
}



#[derive(Debug, Clone, Copy, Default)]
/// # `libcdio` Enumerator.
///
/// This lists and opens the system's optical drives through `libcdio`.
pub struct CdioEnumerator;

impl Enumerator for CdioEnumerator {
	#[allow(unsafe_code)]
	fn addresses(&mut self) -> Vec<String> {
		init();

		let list = unsafe { libcdio_sys::cdio_get_devices(driver_id_t_DRIVER_DEVICE) };
		if list.is_null() { return Vec::new(); }

		let mut out = Vec::new();
		let mut idx = 0;
		loop {
			let ptr: *const c_char = unsafe { *list.add(idx) };
			if ptr.is_null() { break; }
			if let Ok(s) = unsafe { CStr::from_ptr(ptr) }.to_str() {
				let s = s.trim();
				if ! s.is_empty() { out.push(s.to_owned()); }
			}
			idx += 1;
		}

		unsafe { libcdio_sys::cdio_free_device_list(list); }
		out
	}

	fn open(&mut self, address: &str) -> Result<Box<dyn Transport>, BurnError> {
		CdioTransport::new(address).map(|t| Box::new(t) as Box<dyn Transport>)
	}
}



#[allow(unsafe_code)]
/// # Initialize `libcdio`.
fn init() {
	LIBCDIO_INIT.call_once(|| unsafe { libcdio_sys::cdio_init(); });
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_missing() {
		assert!(matches!(
			CdioTransport::new("/no/such/burner"),
			Err(BurnError::Device(_)),
		));
	}
}
