//! The byte transport the protocol engine is built on.

/// A blocking, bidirectional byte transport.
///
/// This is the synchronous counterpart of the `embedded-io-async` traits a polled fieldbus
/// master would build on: IEC 103 dialog over a serial line is inherently a blocking
/// request/response exchange, never a concurrently-polled cycle, so the core only needs
/// `embedded-io`'s blocking `Read`/`Write` traits rather than their async siblings.
pub trait ByteChannel: embedded_io::Read + embedded_io::Write {}

impl<T> ByteChannel for T where T: embedded_io::Read + embedded_io::Write {}
