/*!
# `Webpix` - Format Descriptor

Static capability metadata in the shape a pixbuf-loading host consumes:
name, magic signature, MIME types, extensions, and behavior flags.
*/

use crate::FORMAT_THREADSAFE;



#[derive(Debug, Clone, Copy)]
/// # Magic Pattern.
///
/// A leading-byte signature with a match confidence out of 100.
pub struct MagicPattern {
	/// # Expected Prefix.
	prefix: &'static [u8],

	/// # Match Confidence (0-100).
	confidence: u8,
}

impl MagicPattern {
	#[must_use]
	/// # New.
	pub const fn new(prefix: &'static [u8], confidence: u8) -> Self {
		Self { prefix, confidence }
	}

	#[inline]
	#[must_use]
	/// # Confidence.
	pub const fn confidence(&self) -> u8 { self.confidence }

	#[inline]
	#[must_use]
	/// # Matches?
	pub fn matches(&self, src: &[u8]) -> bool {
		src.starts_with(self.prefix)
	}

	#[inline]
	#[must_use]
	/// # Prefix.
	pub const fn prefix(&self) -> &'static [u8] { self.prefix }
}



#[derive(Debug, Clone, Copy)]
/// # Format Descriptor.
///
/// Everything a host needs to route image bytes to this loader.
pub struct PixbufFormat {
	/// # Short Name.
	name: &'static str,

	/// # Human Description.
	description: &'static str,

	/// # Magic Signature(s).
	signature: &'static [MagicPattern],

	/// # MIME Types.
	mime_types: &'static [&'static str],

	/// # File Extensions.
	extensions: &'static [&'static str],

	/// # Behavior Flags.
	flags: u8,

	/// # License Tag.
	license: &'static str,
}

/// # The `WebP` Format.
///
/// The signature stops at `RIFF`; other RIFF-based containers share the
/// prefix, so a match is necessary but not sufficient. The decode path sorts
/// out impostors.
pub const WEBP_FORMAT: PixbufFormat = PixbufFormat {
	name: "webp",
	description: "The WebP image format",
	signature: &[MagicPattern::new(b"RIFF", 100)],
	mime_types: &["image/webp"],
	extensions: &["webp"],
	flags: FORMAT_THREADSAFE,
	license: "LGPL",
};

impl PixbufFormat {
	#[inline]
	#[must_use]
	/// # Description.
	pub const fn description(&self) -> &'static str { self.description }

	#[inline]
	#[must_use]
	/// # File Extensions.
	pub const fn extensions(&self) -> &'static [&'static str] { self.extensions }

	#[inline]
	#[must_use]
	/// # Behavior Flags.
	pub const fn flags(&self) -> u8 { self.flags }

	#[inline]
	#[must_use]
	/// # Thread-Safe?
	///
	/// Distinct loader instances may be driven concurrently; a single
	/// instance still belongs to one thread at a time.
	pub const fn is_threadsafe(&self) -> bool {
		self.flags & FORMAT_THREADSAFE != 0
	}

	#[inline]
	#[must_use]
	/// # License Tag.
	pub const fn license(&self) -> &'static str { self.license }

	#[inline]
	#[must_use]
	/// # MIME Types.
	pub const fn mime_types(&self) -> &'static [&'static str] { self.mime_types }

	#[inline]
	#[must_use]
	/// # Short Name.
	pub const fn name(&self) -> &'static str { self.name }

	#[inline]
	#[must_use]
	/// # Magic Signature(s).
	pub const fn signature(&self) -> &'static [MagicPattern] { self.signature }

	#[must_use]
	/// # Sniff.
	///
	/// Rank `src` against the signature patterns, returning the best match
	/// confidence, if any.
	pub fn sniff(&self, src: &[u8]) -> Option<u8> {
		self.signature.iter()
			.filter(|p| p.matches(src))
			.map(MagicPattern::confidence)
			.max()
	}
}



#[cfg(test)]
mod tests {
	use super::*;
	use crate::webp::lossless_fixture;

	#[test]
	fn t_descriptor() {
		assert_eq!(WEBP_FORMAT.name(), "webp");
		assert_eq!(WEBP_FORMAT.description(), "The WebP image format");
		assert_eq!(WEBP_FORMAT.mime_types(), ["image/webp"]);
		assert_eq!(WEBP_FORMAT.extensions(), ["webp"]);
		assert_eq!(WEBP_FORMAT.license(), "LGPL");
		assert!(WEBP_FORMAT.is_threadsafe());
		assert_eq!(WEBP_FORMAT.signature().len(), 1);
		assert_eq!(WEBP_FORMAT.signature()[0].prefix(), b"RIFF");
		assert_eq!(WEBP_FORMAT.signature()[0].confidence(), 100);
	}

	#[test]
	fn t_sniff() {
		// Real output carries the prefix.
		let (blob, _) = lossless_fixture(3, 3);
		assert_eq!(WEBP_FORMAT.sniff(&blob), Some(100));

		// PNG magic and short prefixes do not.
		assert_eq!(
			WEBP_FORMAT.sniff(&[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n']),
			None,
		);
		assert_eq!(WEBP_FORMAT.sniff(b"RIF"), None);
		assert_eq!(WEBP_FORMAT.sniff(&[]), None);
	}
}
