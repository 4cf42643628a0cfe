/*!
# `Webpix` - Error
*/

use crate::DecodeStatus;
use std::{
	error::Error,
	fmt,
};



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Error Kind.
///
/// A coarse, four-way grouping of [`WebpixError`] variants, mirroring the
/// error codes a pixbuf-loading host distinguishes between.
pub enum ErrorKind {
	/// # Nonsensical arguments.
	BadOption,

	/// # The bytes are not a (valid) `WebP`.
	CorruptImage,

	/// # Something else went wrong.
	Failed,

	/// # An allocation failed.
	InsufficientMemory,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Errors.
pub enum WebpixError {
	/// # Incremental decoding failed.
	Decode(DecodeStatus),

	/// # Decode buffer allocation failed.
	DecodeBuffer,

	/// # Decoder instantiation failed.
	DecoderInit,

	/// # Unreadable header.
	Header,

	/// # One-shot decoding failed.
	Image,

	/// # No decoder output outside suspension.
	NoOutput,

	/// # Image dimensions are out of range.
	Overflow,

	/// # Raster allocation failed.
	PixbufAlloc,

	/// # Invalid raster arguments.
	PixbufArgs,

	/// # I/O read error.
	Read,
}

impl Error for WebpixError {}

impl AsRef<str> for WebpixError {
	#[inline]
	fn as_ref(&self) -> &str { self.as_str() }
}

impl fmt::Display for WebpixError {
	#[inline]
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl WebpixError {
	#[must_use]
	/// # As Str.
	///
	/// Return the error as an English string slice.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Decode(s) => match s {
				DecodeStatus::Ok => "WebP decoder failed. (This shouldn't happen!)",
				DecodeStatus::OutOfMemory => "WebP decoder failed: out of memory.",
				DecodeStatus::InvalidParam => "WebP decoder failed: invalid parameter.",
				DecodeStatus::BitstreamError => "WebP decoder failed: bitstream error.",
				DecodeStatus::UnsupportedFeature => "WebP decoder failed: unsupported feature.",
				DecodeStatus::Suspended => "WebP decoder failed: suspended.",
				DecodeStatus::UserAbort => "WebP decoder failed: aborted.",
				DecodeStatus::NotEnoughData => "WebP decoder failed: not enough data.",
			},
			Self::DecodeBuffer => "Cannot allocate memory for decoded image data.",
			Self::DecoderInit => "Cannot create WebP decoder.",
			Self::Header => "Cannot read WebP image header.",
			Self::Image => "The image could not be decoded.",
			Self::NoOutput => "Bad inputs to WebP decoder.",
			Self::Overflow => "The image dimensions are out of range.",
			Self::PixbufAlloc => "Cannot allocate memory for the output image.",
			Self::PixbufArgs => "Invalid raster dimensions or stride.",
			Self::Read => "Unable to read the source.",
		}
	}

	#[must_use]
	/// # Kind.
	///
	/// Project the variant onto the host-facing [`ErrorKind`] taxonomy.
	pub const fn kind(self) -> ErrorKind {
		match self {
			Self::Decode(_) | Self::Header | Self::Image => ErrorKind::CorruptImage,
			Self::DecodeBuffer | Self::Overflow | Self::PixbufAlloc => ErrorKind::InsufficientMemory,
			Self::DecoderInit | Self::Read => ErrorKind::Failed,
			Self::NoOutput | Self::PixbufArgs => ErrorKind::BadOption,
		}
	}
}



#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn t_kind() {
		assert_eq!(WebpixError::Header.kind(), ErrorKind::CorruptImage);
		assert_eq!(
			WebpixError::Decode(DecodeStatus::BitstreamError).kind(),
			ErrorKind::CorruptImage,
		);
		assert_eq!(WebpixError::DecodeBuffer.kind(), ErrorKind::InsufficientMemory);
		assert_eq!(WebpixError::DecoderInit.kind(), ErrorKind::Failed);
		assert_eq!(WebpixError::Read.kind(), ErrorKind::Failed);
		assert_eq!(WebpixError::NoOutput.kind(), ErrorKind::BadOption);
	}

	#[test]
	fn t_str() {
		// Every message should say something.
		for e in [
			WebpixError::Decode(DecodeStatus::BitstreamError),
			WebpixError::DecodeBuffer,
			WebpixError::DecoderInit,
			WebpixError::Header,
			WebpixError::Image,
			WebpixError::NoOutput,
			WebpixError::Overflow,
			WebpixError::PixbufAlloc,
			WebpixError::PixbufArgs,
			WebpixError::Read,
		] {
			assert!(! e.as_str().is_empty());
			assert_eq!(e.as_str(), e.as_ref());
		}
	}
}
