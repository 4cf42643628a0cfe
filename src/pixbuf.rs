/*!
# `Webpix` - Pixbuf

A minimal raster-image container: dimensions, layout metadata, and a
lock-guarded pixel buffer. The loader shares rasters with its caller via
[`SharedPixbuf`]; the lock keeps in-progress row writes from being observed
mid-copy.
*/

use crate::WebpixError;
use parking_lot::{
	MappedMutexGuard,
	Mutex,
	MutexGuard,
};
use std::{
	fmt,
	sync::Arc,
};



/// # Shared Raster.
///
/// Reference-counted handle to a [`Pixbuf`]; the last holder frees the
/// storage.
pub type SharedPixbuf = Arc<Pixbuf>;



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Colorspace.
pub enum Colorspace {
	/// # Red, Green, Blue.
	Rgb,
}

impl Colorspace {
	#[inline]
	#[must_use]
	/// # As Str.
	pub const fn as_str(self) -> &'static str {
		match self { Self::Rgb => "RGB" }
	}

	#[inline]
	#[must_use]
	/// # Channel Count.
	pub const fn channels(self, has_alpha: bool) -> usize {
		match self {
			Self::Rgb => if has_alpha { 4 } else { 3 },
		}
	}
}



/// # Raster Image.
///
/// Decoded pixels plus the layout details needed to read them back:
/// colorspace, bit depth, dimensions, and per-row byte stride.
///
/// Rasters allocated through [`Pixbuf::new`] pad each row out to a four-byte
/// boundary; [`Pixbuf::from_vec`] keeps whatever stride the caller declares.
pub struct Pixbuf {
	/// # Pixel Storage.
	pixels: Mutex<Box<[u8]>>,

	/// # Image Width.
	width: u32,

	/// # Image Height.
	height: u32,

	/// # Row Stride (Bytes).
	rowstride: usize,

	/// # Colorspace.
	colorspace: Colorspace,

	/// # Has an Alpha Channel?
	has_alpha: bool,

	/// # Bits Per Sample.
	bits_per_sample: u8,
}

impl fmt::Debug for Pixbuf {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Pixbuf")
			.field("width", &self.width)
			.field("height", &self.height)
			.field("rowstride", &self.rowstride)
			.field("colorspace", &self.colorspace)
			.field("has_alpha", &self.has_alpha)
			.field("bits_per_sample", &self.bits_per_sample)
			.finish_non_exhaustive()
	}
}

/// ## Instantiation.
impl Pixbuf {
	/// # New (Zeroed).
	///
	/// Allocate a zeroed raster with rows padded to a four-byte boundary.
	///
	/// ## Errors
	///
	/// Returns an error if the dimensions are zero, the bit depth is
	/// unsupported, the byte math overflows, or the allocation itself fails.
	pub fn new(
		colorspace: Colorspace,
		has_alpha: bool,
		bits_per_sample: u8,
		width: u32,
		height: u32,
	) -> Result<Self, WebpixError> {
		if width == 0 || height == 0 || bits_per_sample != 8 {
			return Err(WebpixError::PixbufArgs);
		}

		let row = (width as usize).checked_mul(colorspace.channels(has_alpha))
			.ok_or(WebpixError::Overflow)?;
		let rowstride = row.checked_add(3).ok_or(WebpixError::Overflow)? & ! 3;
		let size = rowstride.checked_mul(height as usize)
			.ok_or(WebpixError::Overflow)?;

		let mut pixels: Vec<u8> = Vec::new();
		pixels.try_reserve_exact(size).map_err(|_| WebpixError::PixbufAlloc)?;
		pixels.resize(size, 0);

		Ok(Self {
			pixels: Mutex::new(pixels.into_boxed_slice()),
			width,
			height,
			rowstride,
			colorspace,
			has_alpha,
			bits_per_sample,
		})
	}

	/// # From Existing Pixels.
	///
	/// Wrap an already-decoded pixel buffer, taking ownership of it. The
	/// declared `rowstride` is kept as-is.
	///
	/// ## Errors
	///
	/// Returns an error if the dimensions are zero, the bit depth is
	/// unsupported, the stride is too small for a row, or the buffer cannot
	/// hold `height` rows at that stride.
	pub fn from_vec(
		pixels: Vec<u8>,
		colorspace: Colorspace,
		has_alpha: bool,
		bits_per_sample: u8,
		width: u32,
		height: u32,
		rowstride: usize,
	) -> Result<Self, WebpixError> {
		if width == 0 || height == 0 || bits_per_sample != 8 {
			return Err(WebpixError::PixbufArgs);
		}

		let row = (width as usize).checked_mul(colorspace.channels(has_alpha))
			.ok_or(WebpixError::Overflow)?;
		if rowstride < row { return Err(WebpixError::PixbufArgs); }

		// The last row may stop at the pixels; earlier ones need the full
		// stride.
		let size = rowstride.checked_mul(height as usize - 1)
			.and_then(|x| x.checked_add(row))
			.ok_or(WebpixError::Overflow)?;
		if pixels.len() < size { return Err(WebpixError::PixbufArgs); }

		Ok(Self {
			pixels: Mutex::new(pixels.into_boxed_slice()),
			width,
			height,
			rowstride,
			colorspace,
			has_alpha,
			bits_per_sample,
		})
	}
}

/// ## Getters.
impl Pixbuf {
	#[inline]
	#[must_use]
	/// # Bits Per Sample.
	pub const fn bits_per_sample(&self) -> u8 { self.bits_per_sample }

	#[inline]
	#[must_use]
	/// # Channel Count.
	pub const fn channels(&self) -> usize {
		self.colorspace.channels(self.has_alpha)
	}

	#[inline]
	#[must_use]
	/// # Colorspace.
	pub const fn colorspace(&self) -> Colorspace { self.colorspace }

	#[inline]
	#[must_use]
	/// # Has Alpha?
	pub const fn has_alpha(&self) -> bool { self.has_alpha }

	#[inline]
	#[must_use]
	/// # Height.
	pub const fn height(&self) -> u32 { self.height }

	#[must_use]
	/// # Pixel Storage.
	///
	/// Lock and return the raw pixel bytes, row-strided. The guard blocks
	/// other access (including the loader's own row writes) until dropped.
	pub fn pixels(&self) -> MappedMutexGuard<'_, [u8]> {
		MutexGuard::map(self.pixels.lock(), |p| &mut **p)
	}

	#[inline]
	#[must_use]
	/// # Row Stride (Bytes).
	pub const fn rowstride(&self) -> usize { self.rowstride }

	#[inline]
	#[must_use]
	/// # Width.
	pub const fn width(&self) -> u32 { self.width }
}



#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn t_new() {
		// 5 * 3 = 15, padded to 16.
		let pix = Pixbuf::new(Colorspace::Rgb, false, 8, 5, 3)
			.expect("alloc failed");
		assert_eq!(pix.width(), 5);
		assert_eq!(pix.height(), 3);
		assert_eq!(pix.rowstride(), 16);
		assert_eq!(pix.channels(), 3);
		assert_eq!(pix.pixels().len(), 48);
		assert!(pix.pixels().iter().all(|&b| b == 0));

		// 4 * 3 = 12 is already aligned.
		let pix = Pixbuf::new(Colorspace::Rgb, false, 8, 4, 4)
			.expect("alloc failed");
		assert_eq!(pix.rowstride(), 12);
		assert_eq!(pix.pixels().len(), 48);
	}

	#[test]
	fn t_new_bad() {
		assert!(matches!(
			Pixbuf::new(Colorspace::Rgb, false, 8, 0, 3),
			Err(WebpixError::PixbufArgs),
		));
		assert!(matches!(
			Pixbuf::new(Colorspace::Rgb, false, 8, 3, 0),
			Err(WebpixError::PixbufArgs),
		));
		assert!(matches!(
			Pixbuf::new(Colorspace::Rgb, false, 16, 3, 3),
			Err(WebpixError::PixbufArgs),
		));
	}

	#[test]
	fn t_from_vec() {
		let raw = vec![7_u8; 45]; // 5x3, tight stride.
		let pix = Pixbuf::from_vec(raw, Colorspace::Rgb, false, 8, 5, 3, 15)
			.expect("wrap failed");
		assert_eq!(pix.rowstride(), 15);
		assert_eq!(pix.pixels().len(), 45);

		// Stride smaller than a row.
		assert!(Pixbuf::from_vec(vec![0; 45], Colorspace::Rgb, false, 8, 5, 3, 12).is_err());

		// Buffer too short for the declared layout.
		assert!(Pixbuf::from_vec(vec![0; 30], Colorspace::Rgb, false, 8, 5, 3, 15).is_err());

		// Zero dimensions.
		assert!(Pixbuf::from_vec(vec![0; 45], Colorspace::Rgb, false, 8, 5, 0, 15).is_err());
	}
}
