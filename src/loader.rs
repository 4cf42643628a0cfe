/*!
# `Webpix` - Loader

The two decode entry points. [`load`] and [`load_path`] handle complete
sources in one call; [`WebpLoader`] is the progressive state machine,
accepting compressed bytes chunk by chunk and surfacing decoded rows through
caller-supplied [`LoaderHooks`] as they arrive.
*/

use crate::{
	Colorspace,
	Pixbuf,
	SharedPixbuf,
	webp::{
		self,
		HeaderScan,
		Idec,
		ImageHeader,
	},
	WebpixError,
};
use dactyl::traits::SaturatingFrom;
use std::{
	fmt,
	fs::File,
	io::Read,
	path::Path,
	sync::Arc,
};



/// # Header Scan Ceiling.
///
/// Real headers resolve within the first few dozen bytes; a stream that
/// cannot produce one inside this many is not going to.
const MAX_HEADER: usize = 512;



/// # One-Shot Load.
///
/// Read `src` to the end and decode the whole thing at once, returning a
/// fully-populated raster with a tight `3 * width` stride.
///
/// ## Errors
///
/// Returns an error if the source cannot be read, the bytes do not decode,
/// or the raster cannot be built around them.
pub fn load<R: Read>(mut src: R) -> Result<SharedPixbuf, WebpixError> {
	let mut raw: Vec<u8> = Vec::new();
	src.read_to_end(&mut raw).map_err(|_| WebpixError::Read)?;

	let (pixels, width, height) = webp::decode_rgb(&raw)?;
	let rowstride = (width as usize).checked_mul(3)
		.ok_or(WebpixError::Overflow)?;

	Pixbuf::from_vec(pixels, Colorspace::Rgb, false, 8, width, height, rowstride)
		.map(Arc::new)
}

/// # One-Shot Load (File).
///
/// Open `path` and hand it to [`load`].
///
/// ## Errors
///
/// Returns an error if the file cannot be opened or read, or if decoding
/// fails.
pub fn load_path<P: AsRef<Path>>(path: P) -> Result<SharedPixbuf, WebpixError> {
	File::open(path)
		.map_err(|_| WebpixError::Read)
		.and_then(load)
}



/// # Size Hook.
///
/// Invoked once, as soon as the header resolves; may rewrite the dimensions,
/// which are then authoritative for the raster and decode buffer both.
/// Enlarged rasters keep the decoded frame top-left with zeroed padding;
/// shrinking below the real frame makes the decoder reject its buffer
/// mid-stream.
pub type SizeHook = Box<dyn FnMut(&mut u32, &mut u32) + Send>;

/// # Prepared Hook.
///
/// Invoked once, right after the output raster is allocated. The caller may
/// clone and hold the handle from here on.
pub type PreparedHook = Box<dyn FnMut(&SharedPixbuf) + Send>;

/// # Updated Hook.
///
/// Invoked after each feed that produced an output region, with the
/// now-valid rectangle as `(x, y, width, height)`.
pub type UpdatedHook = Box<dyn FnMut(&SharedPixbuf, u32, u32, u32, u32) + Send>;

#[derive(Default)]
/// # Loader Hooks.
///
/// The progress callbacks driving a [`WebpLoader`]. All three are optional;
/// an empty set simply decodes silently.
pub struct LoaderHooks {
	/// # Size-Resolution Hook.
	size: Option<SizeHook>,

	/// # Prepared-Notification Hook.
	prepared: Option<PreparedHook>,

	/// # Region-Updated Hook.
	updated: Option<UpdatedHook>,
}

impl fmt::Debug for LoaderHooks {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("LoaderHooks")
			.field("size", &self.size.is_some())
			.field("prepared", &self.prepared.is_some())
			.field("updated", &self.updated.is_some())
			.finish()
	}
}

impl LoaderHooks {
	#[must_use]
	/// # New (Empty).
	pub fn new() -> Self { Self::default() }

	#[must_use]
	/// # With Size Hook.
	pub fn with_size<F>(mut self, cb: F) -> Self
	where F: FnMut(&mut u32, &mut u32) + Send + 'static {
		self.size.replace(Box::new(cb));
		self
	}

	#[must_use]
	/// # With Prepared Hook.
	pub fn with_prepared<F>(mut self, cb: F) -> Self
	where F: FnMut(&SharedPixbuf) + Send + 'static {
		self.prepared.replace(Box::new(cb));
		self
	}

	#[must_use]
	/// # With Updated Hook.
	pub fn with_updated<F>(mut self, cb: F) -> Self
	where F: FnMut(&SharedPixbuf, u32, u32, u32, u32) + Send + 'static {
		self.updated.replace(Box::new(cb));
		self
	}
}



/// # Post-Header Decode State.
///
/// Everything allocated the moment the header resolves, torn down together
/// when the loader goes.
struct DecodeState {
	/// # Raster Width (Hook-Adjusted).
	width: u32,

	/// # Raster Height (Hook-Adjusted).
	height: u32,

	// Field order matters: `idec` holds a raw pointer into `decbuf` and must
	// drop first.

	/// # Incremental Decoder.
	idec: Idec,

	/// # Decode Buffer (`3 * width * height`, Tight Stride).
	decbuf: Box<[u8]>,

	/// # Output Raster (Shared With the Caller).
	pixbuf: SharedPixbuf,

	/// # Fully-Decoded Rows (Exclusive Bound).
	last_y: usize,
}

/// # Progressive Loader.
///
/// The incremental decode state machine. Feed compressed bytes with
/// [`WebpLoader::load_increment`] until the source runs dry, then collect
/// the raster with [`WebpLoader::stop_load`].
///
/// Dimensions are discovered lazily: leading bytes are buffered until the
/// header resolves, at which point the raster, decode buffer, and underlying
/// decoder are allocated exactly once and the `prepared` hook fires. Each
/// subsequent feed copies whatever rows are newly complete into the raster
/// and fires the `updated` hook with the valid region.
///
/// Any error is terminal for the loader; [`WebpLoader::stop_load`] (or a
/// plain drop) releases everything either way.
pub struct WebpLoader {
	/// # Progress Callbacks.
	hooks: LoaderHooks,

	/// # Leading Bytes (Pre-Header Only).
	pending: Vec<u8>,

	/// # Decode State (Post-Header Only).
	state: Option<DecodeState>,
}

impl fmt::Debug for WebpLoader {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("WebpLoader")
			.field("hooks", &self.hooks)
			.field("pending", &self.pending.len())
			.field("header_seen", &self.state.is_some())
			.finish()
	}
}

impl WebpLoader {
	#[must_use]
	/// # Begin Load.
	///
	/// Allocate an empty loader around the supplied hooks. No I/O, no decode
	/// work; this cannot fail.
	pub fn begin_load(hooks: LoaderHooks) -> Self {
		Self {
			hooks,
			pending: Vec::new(),
			state: None,
		}
	}

	/// # Load Increment.
	///
	/// Feed the next chunk of the compressed stream. Empty chunks are a
	/// no-op.
	///
	/// ## Errors
	///
	/// Returns an error if the leading bytes cannot be a `WebP` header (or
	/// one fails to resolve within the first [`MAX_HEADER`] bytes), if any
	/// allocation fails, or if the underlying decoder rejects the stream.
	/// Errors are terminal; the caller should stop feeding and tear down.
	pub fn load_increment(&mut self, chunk: &[u8]) -> Result<(), WebpixError> {
		if chunk.is_empty() { return Ok(()); }

		// Still hunting for the header: buffer and (re)scan.
		if self.state.is_none() {
			self.pending.extend_from_slice(chunk);
			let header = match webp::scan_header(&self.pending) {
				HeaderScan::Ready(h) => h,
				HeaderScan::Incomplete =>
					return if self.pending.len() < MAX_HEADER { Ok(()) }
						else { Err(WebpixError::Header) },
				HeaderScan::Invalid => return Err(WebpixError::Header),
			};

			let state = self.state.insert(start(&mut self.hooks, &header)?);

			// Everything buffered so far is fresh input for the decoder.
			let pending = std::mem::take(&mut self.pending);
			return feed(state, &mut self.hooks, &pending);
		}

		if let Some(state) = self.state.as_mut() {
			feed(state, &mut self.hooks, chunk)
		}
		else { Ok(()) }
	}

	#[must_use]
	/// # Stop Load.
	///
	/// Tear the loader down, releasing the decoder and decode buffer, and
	/// return the output raster if the header ever resolved. Teardown itself
	/// cannot fail.
	pub fn stop_load(self) -> Option<SharedPixbuf> {
		self.state.map(|s| s.pixbuf)
	}

	#[must_use]
	/// # Output Raster.
	///
	/// The shared raster handle, if the header has resolved yet.
	pub fn image(&self) -> Option<SharedPixbuf> {
		self.state.as_ref().map(|s| Arc::clone(&s.pixbuf))
	}
}

/// # Start Decoding.
///
/// The header just resolved: run the size hook, allocate the raster, decode
/// buffer, and decoder, and announce the raster. Called at most once per
/// loader.
fn start(hooks: &mut LoaderHooks, header: &ImageHeader)
-> Result<DecodeState, WebpixError> {
	let mut width = header.width;
	let mut height = header.height;

	if let Some(cb) = hooks.size.as_mut() {
		cb(&mut width, &mut height);
		if width != header.width || height != header.height {
			log::debug!(
				"webp size hook rewrote {}x{} to {}x{}",
				header.width, header.height,
				width, height,
			);
		}
	}

	let pixbuf: SharedPixbuf = Arc::new(Pixbuf::new(
		Colorspace::Rgb,
		false,
		8,
		width,
		height,
	)?);

	let stride = (width as usize).checked_mul(3)
		.ok_or(WebpixError::Overflow)?;
	let size = stride.checked_mul(height as usize)
		.ok_or(WebpixError::Overflow)?;

	let mut decbuf: Vec<u8> = Vec::new();
	decbuf.try_reserve_exact(size).map_err(|_| WebpixError::DecodeBuffer)?;
	decbuf.resize(size, 0);
	let mut decbuf = decbuf.into_boxed_slice();

	let idec = Idec::new_rgb(&mut decbuf, stride)?;

	if let Some(cb) = hooks.prepared.as_mut() { cb(&pixbuf); }

	Ok(DecodeState {
		width,
		height,
		idec,
		decbuf,
		pixbuf,
		last_y: 0,
	})
}

/// # Feed the Decoder.
///
/// Append fresh bytes, then copy whatever rows are now complete into the
/// raster and report the valid region.
fn feed(state: &mut DecodeState, hooks: &mut LoaderHooks, bytes: &[u8])
-> Result<(), WebpixError> {
	let status = state.idec.append(bytes);
	if ! status.keeps_going() { return Err(WebpixError::Decode(status)); }

	let Some(area) = state.idec.available() else {
		// No output region at all is only okay while suspended.
		return if status.is_suspended() { Ok(()) }
			else { Err(WebpixError::NoOutput) };
	};

	// Copy rows [0, rows), each side indexed by its own stride. The bounds
	// are clamped in case a size hook lied about the frame.
	let rows = area.rows.min(state.height as usize);
	{
		let mut pixels = state.pixbuf.pixels();
		let dst_stride = state.pixbuf.rowstride();
		let row_len = (area.width as usize * 3)
			.min(area.stride)
			.min(dst_stride);

		for y in 0..rows {
			let src = y * area.stride;
			let dst = y * dst_stride;
			pixels[dst..dst + row_len]
				.copy_from_slice(&state.decbuf[src..src + row_len]);
		}
	}

	if state.last_y < rows { state.last_y = rows; }
	log::trace!(
		"webp decode: {} of {} rows ready",
		state.last_y,
		state.height,
	);

	if let Some(cb) = hooks.updated.as_mut() {
		cb(
			&state.pixbuf,
			0,
			0,
			state.width,
			u32::saturating_from(state.last_y),
		);
	}

	Ok(())
}
