//! ORB binary output format.
//!
//! A self-describing packed vertex/index file: the header carries the
//! component list (attribute, format, scale, bias) and the index width, so
//! [`OrbFile`] can reconstruct attribute values without outside knowledge.

pub mod format;
mod reader;
mod stream;
mod writer;

pub use reader::OrbFile;
pub use stream::OStream;
pub use writer::OrbWriter;
