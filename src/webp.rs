/*!
# `Webpix` - `WebP` FFI

This uses [`libwebp-sys2`](https://crates.io/crates/libwebp-sys2) bindings to
Google's `libwebp`. Everything here is a thin, RAII-guarded wrapper; the
bitstream heavy lifting happens inside the library.
*/

use crate::WebpixError;
use dactyl::traits::SaturatingFrom;
use libwebp_sys::{
	VP8StatusCode,
	WebPBitstreamFeatures,
	WebPGetFeatures,
	WebPIAppend,
	WebPIDecGetRGB,
	WebPIDecoder,
	WebPIDelete,
	WebPINewRGB,
	WEBP_CSP_MODE,
};
use std::os::raw::c_int;



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Decode Status.
///
/// A Rust-side mirror of `libwebp`'s `VP8StatusCode`. [`DecodeStatus::Ok`]
/// and [`DecodeStatus::Suspended`] are "keep feeding" states; everything else
/// is terminal for the stream.
pub enum DecodeStatus {
	/// # All good.
	Ok,

	/// # Allocation failure inside the decoder.
	OutOfMemory,

	/// # Invalid parameter.
	InvalidParam,

	/// # Bitstream error.
	BitstreamError,

	/// # Unsupported feature.
	UnsupportedFeature,

	/// # Waiting on more input.
	Suspended,

	/// # Aborted by the user.
	UserAbort,

	/// # Not enough data (yet).
	NotEnoughData,
}

impl From<VP8StatusCode> for DecodeStatus {
	fn from(status: VP8StatusCode) -> Self {
		match status {
			VP8StatusCode::VP8_STATUS_OK => Self::Ok,
			VP8StatusCode::VP8_STATUS_OUT_OF_MEMORY => Self::OutOfMemory,
			VP8StatusCode::VP8_STATUS_INVALID_PARAM => Self::InvalidParam,
			VP8StatusCode::VP8_STATUS_BITSTREAM_ERROR => Self::BitstreamError,
			VP8StatusCode::VP8_STATUS_UNSUPPORTED_FEATURE => Self::UnsupportedFeature,
			VP8StatusCode::VP8_STATUS_SUSPENDED => Self::Suspended,
			VP8StatusCode::VP8_STATUS_USER_ABORT => Self::UserAbort,
			VP8StatusCode::VP8_STATUS_NOT_ENOUGH_DATA => Self::NotEnoughData,
		}
	}
}

impl DecodeStatus {
	#[inline]
	#[must_use]
	/// # Keeps Going?
	///
	/// Returns `true` for the two statuses that leave the stream healthy.
	pub const fn keeps_going(self) -> bool {
		matches!(self, Self::Ok | Self::Suspended)
	}

	#[inline]
	#[must_use]
	/// # Is Suspended?
	pub const fn is_suspended(self) -> bool { matches!(self, Self::Suspended) }
}



#[derive(Debug, Clone, Copy)]
/// # Parsed Header.
pub(crate) struct ImageHeader {
	/// # Image Width.
	pub(crate) width: u32,

	/// # Image Height.
	pub(crate) height: u32,

	/// # Has an Alpha Channel?
	pub(crate) alpha: bool,

	/// # Is Animated?
	pub(crate) animation: bool,
}

#[derive(Debug, Clone, Copy)]
/// # Header Scan Outcome.
pub(crate) enum HeaderScan {
	/// # Header fully parsed.
	Ready(ImageHeader),

	/// # Plausible so far; more bytes needed.
	Incomplete,

	/// # Cannot be a `WebP`.
	Invalid,
}

/// # Scan Header.
///
/// Try to pull dimensions and feature bits out of the leading bytes of a
/// `WebP` stream. Unlike the older `WebPGetInfo`, `WebPGetFeatures`' status
/// code distinguishes "feed me more" from "give it up".
pub(crate) fn scan_header(src: &[u8]) -> HeaderScan {
	if src.is_empty() { return HeaderScan::Incomplete; }

	let mut features: WebPBitstreamFeatures = unsafe { std::mem::zeroed() };
	let status = unsafe {
		WebPGetFeatures(src.as_ptr(), src.len(), &mut features)
	};
	match status {
		VP8StatusCode::VP8_STATUS_OK => {
			log::debug!(
				"webp header: {}x{} (alpha: {}, animation: {})",
				features.width,
				features.height,
				features.has_alpha != 0,
				features.has_animation != 0,
			);
			HeaderScan::Ready(ImageHeader {
				width: u32::saturating_from(features.width),
				height: u32::saturating_from(features.height),
				alpha: features.has_alpha != 0,
				animation: features.has_animation != 0,
			})
		},
		VP8StatusCode::VP8_STATUS_NOT_ENOUGH_DATA => HeaderScan::Incomplete,
		_ => HeaderScan::Invalid,
	}
}



/// # Decode Wrapper.
///
/// This exists solely to help with garbage cleanup.
struct LibWebpDecode {
	/// # Image Width.
	width: c_int,

	/// # Image Height.
	height: c_int,

	/// # Decoded (Library-Owned) Pixels.
	ptr: *mut u8,
}

impl TryFrom<&[u8]> for LibWebpDecode {
	type Error = WebpixError;

	fn try_from(src: &[u8]) -> Result<Self, Self::Error> {
		use libwebp_sys::WebPDecodeRGB;

		let mut width: c_int = 0;
		let mut height: c_int = 0;
		let result = unsafe {
			WebPDecodeRGB(src.as_ptr(), src.len(), &mut width, &mut height)
		};

		if result.is_null() { Err(WebpixError::Image) }
		else {
			Ok(Self {
				width,
				height,
				ptr: result,
			})
		}
	}
}

impl Drop for LibWebpDecode {
	#[inline]
	fn drop(&mut self) { unsafe { libwebp_sys::WebPFree(self.ptr.cast()); } }
}

/// # Decode RGB (One-Shot).
///
/// Decode a complete `WebP` blob into a tightly-packed RGB byte vector,
/// returning it along with the discovered width and height.
pub(crate) fn decode_rgb(src: &[u8]) -> Result<(Vec<u8>, u32, u32), WebpixError> {
	let d = LibWebpDecode::try_from(src)?;

	let width = usize::try_from(d.width).map_err(|_| WebpixError::Overflow)?;
	let height = usize::try_from(d.height).map_err(|_| WebpixError::Overflow)?;
	let size = width.checked_mul(height)
		.and_then(|x| x.checked_mul(3))
		.ok_or(WebpixError::Overflow)?;
	if size == 0 { return Err(WebpixError::Image); }

	let buf: Vec<u8> = unsafe { std::slice::from_raw_parts(d.ptr, size) }
		.to_vec();

	if buf.len() == size {
		Ok((buf, u32::saturating_from(d.width), u32::saturating_from(d.height)))
	}
	else { Err(WebpixError::Image) }
}



#[derive(Debug, Clone, Copy)]
/// # Available Decoded Area.
///
/// A snapshot of incremental-decoder progress: how many rows have landed in
/// the bound output buffer, and how they are laid out.
pub(crate) struct DecodedArea {
	/// # Fully-Decoded Rows (Exclusive Bound).
	pub(crate) rows: usize,

	/// # Decoded Frame Width.
	pub(crate) width: u32,

	/// # Row Stride (Bytes).
	pub(crate) stride: usize,
}

/// # Incremental Decoder.
///
/// An RAII handle around `libwebp`'s `WebPIDecoder`, configured for RGB
/// output into a caller-owned buffer. The buffer must outlive the handle and
/// must not move while it lives.
pub(crate) struct Idec(*mut WebPIDecoder);

// SAFETY: the decoder holds no thread-affine state; it is merely not safe for
// *shared* access, which `&mut self` methods already preclude.
unsafe impl Send for Idec {}

impl Idec {
	/// # New RGB Decoder.
	///
	/// Bind a fresh incremental decoder to `buf`, writing rows `stride` bytes
	/// apart.
	pub(crate) fn new_rgb(buf: &mut [u8], stride: usize) -> Result<Self, WebpixError> {
		let ptr = unsafe {
			WebPINewRGB(
				WEBP_CSP_MODE::MODE_RGB,
				buf.as_mut_ptr(),
				buf.len(),
				i32::saturating_from(stride),
			)
		};

		if ptr.is_null() { Err(WebpixError::DecoderInit) }
		else { Ok(Self(ptr)) }
	}

	/// # Append Bytes.
	///
	/// Feed the next chunk of the compressed stream — new bytes only, never
	/// bytes already appended — and report the resulting status.
	pub(crate) fn append(&mut self, data: &[u8]) -> DecodeStatus {
		DecodeStatus::from(unsafe {
			WebPIAppend(self.0, data.as_ptr(), data.len())
		})
	}

	/// # Available Rows.
	///
	/// Ask the decoder what has landed in the bound buffer so far. `None`
	/// means no output region exists yet, which is only okay while the
	/// decoder is suspended.
	pub(crate) fn available(&self) -> Option<DecodedArea> {
		let mut last_y: c_int = 0;
		let mut width: c_int = 0;
		let mut height: c_int = 0;
		let mut stride: c_int = 0;

		let ptr = unsafe {
			WebPIDecGetRGB(self.0, &mut last_y, &mut width, &mut height, &mut stride)
		};

		if ptr.is_null() { None }
		else {
			Some(DecodedArea {
				rows: usize::saturating_from(last_y),
				width: u32::saturating_from(width),
				stride: usize::saturating_from(stride),
			})
		}
	}
}

impl Drop for Idec {
	#[inline]
	fn drop(&mut self) { unsafe { WebPIDelete(self.0); } }
}



#[cfg(test)]
/// # Encode Fixture.
///
/// Losslessly encode a deterministic RGB gradient so tests can compare
/// decoded output byte-for-byte. Returns the compressed blob and the raw
/// pixels that went in.
pub(crate) fn lossless_fixture(width: u32, height: u32) -> (Vec<u8>, Vec<u8>) {
	use libwebp_sys::WebPEncodeLosslessRGB;

	let w = width as usize;
	let h = height as usize;
	let mut rgb: Vec<u8> = Vec::with_capacity(w * h * 3);
	for y in 0..h {
		for x in 0..w {
			rgb.push((x * 17 % 256) as u8);
			rgb.push((y * 29 % 256) as u8);
			rgb.push(((x + y) * 7 % 256) as u8);
		}
	}

	let mut out: *mut u8 = std::ptr::null_mut();
	let size = unsafe {
		WebPEncodeLosslessRGB(
			rgb.as_ptr(),
			width as c_int,
			height as c_int,
			(w * 3) as c_int,
			&mut out,
		)
	};
	assert!(size != 0 && ! out.is_null(), "fixture encode failed");

	let blob = unsafe { std::slice::from_raw_parts(out, size) }.to_vec();
	unsafe { libwebp_sys::WebPFree(out.cast()); }

	(blob, rgb)
}



#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn t_scan() {
		let (blob, _) = lossless_fixture(5, 4);

		// The whole thing parses.
		assert!(matches!(
			scan_header(&blob),
			HeaderScan::Ready(ImageHeader { width: 5, height: 4, .. }),
		));

		// A RIFF-only prefix is plausible but incomplete.
		assert!(matches!(scan_header(&blob[..8]), HeaderScan::Incomplete));
		assert!(matches!(scan_header(&[]), HeaderScan::Incomplete));

		// Garbage is garbage.
		assert!(matches!(scan_header(&[0xAB_u8; 64]), HeaderScan::Invalid));
	}

	#[test]
	fn t_decode_rgb() {
		let (blob, rgb) = lossless_fixture(7, 3);
		let (buf, width, height) = decode_rgb(&blob).expect("decode failed");
		assert_eq!(width, 7);
		assert_eq!(height, 3);
		assert_eq!(buf, rgb);

		assert!(decode_rgb(b"not a webp at all").is_err());
	}

	#[test]
	fn t_status() {
		assert_eq!(
			DecodeStatus::from(VP8StatusCode::VP8_STATUS_OK),
			DecodeStatus::Ok,
		);
		assert_eq!(
			DecodeStatus::from(VP8StatusCode::VP8_STATUS_SUSPENDED),
			DecodeStatus::Suspended,
		);
		assert!(DecodeStatus::Ok.keeps_going());
		assert!(DecodeStatus::Suspended.keeps_going());
		assert!(DecodeStatus::Suspended.is_suspended());
		assert!(! DecodeStatus::BitstreamError.keeps_going());
		assert!(! DecodeStatus::Ok.is_suspended());
	}

	#[test]
	fn t_incremental() {
		let (blob, rgb) = lossless_fixture(4, 4);
		let mut buf = vec![0_u8; 4 * 4 * 3];

		let mut idec = Idec::new_rgb(&mut buf, 12).expect("decoder init failed");
		let status = idec.append(&blob);
		assert!(status.keeps_going());

		let area = idec.available().expect("no decoded area");
		assert_eq!(area.rows, 4);
		assert_eq!(area.width, 4);
		assert_eq!(area.stride, 12);
		drop(idec);

		assert_eq!(buf, rgb);
	}
}
