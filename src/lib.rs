/*!
# `Webpix` - Library

A `WebP` pixbuf loader built on [`libwebp-sys2`](https://crates.io/crates/libwebp-sys2)
bindings to Google's `libwebp`.

Two entry points share one decode pipeline:
* [`load`] / [`load_path`] decode a complete blob in one go;
* [`WebpLoader`] decodes progressively, surfacing rows to caller-supplied
  hooks as compressed bytes trickle in.

Output is always an opaque 8-bit RGB [`Pixbuf`]; alpha channels are flattened
by the decoder.
*/

#![warn(clippy::filetype_is_file)]
#![warn(clippy::integer_division)]
#![warn(clippy::needless_borrow)]
#![warn(clippy::nursery)]
#![warn(clippy::pedantic)]
#![warn(clippy::perf)]
#![warn(clippy::suboptimal_flops)]
#![warn(clippy::unneeded_field_pattern)]
#![warn(macro_use_extern_crate)]
#![warn(missing_copy_implementations)]
#![warn(missing_debug_implementations)]
#![warn(missing_docs)]
#![warn(non_ascii_idents)]
#![warn(trivial_casts)]
#![warn(trivial_numeric_casts)]
#![warn(unreachable_pub)]
#![warn(unused_crate_dependencies)]
#![warn(unused_extern_crates)]
#![warn(unused_import_braces)]

#![allow(clippy::module_name_repetitions)]



mod error;
mod format;
mod loader;
mod pixbuf;
mod webp;


pub use error::{
	ErrorKind,
	WebpixError,
};
pub use format::{
	MagicPattern,
	PixbufFormat,
	WEBP_FORMAT,
};
pub use loader::{
	load,
	load_path,
	LoaderHooks,
	PreparedHook,
	SizeHook,
	UpdatedHook,
	WebpLoader,
};
pub use pixbuf::{
	Colorspace,
	Pixbuf,
	SharedPixbuf,
};
pub use webp::DecodeStatus;



/// # Flag: Writable Format.
///
/// The loader can also save images of this format. (Not this one.)
pub const FORMAT_WRITABLE: u8   = 0b0000_0001;

/// # Flag: Scalable Format.
///
/// The format is vector-based and can be rendered at any size. (Not this
/// one.)
pub const FORMAT_SCALABLE: u8   = 0b0000_0010;

/// # Flag: Thread-Safe Format.
///
/// Distinct loader instances may be driven from different threads.
pub const FORMAT_THREADSAFE: u8 = 0b0000_0100;
