//! Block storage collaborator.
//!
//! Mirrors the FAT-style open / read / close API of SD-card file systems: the
//! storage object owns the volume and performs reads on behalf of an opaque
//! file handle.

/// File access used by the streamer.
pub trait Storage {
    /// Open-file handle.
    type File;
    /// Error type for storage operations.
    type Error: core::fmt::Debug;

    /// Open `name` for reading from its first byte.
    fn open(&mut self, name: &str) -> Result<Self::File, Self::Error>;

    /// Read up to `buf.len()` bytes at the current position.
    ///
    /// Returns the number of bytes read; fewer than requested (possibly zero)
    /// at end of file.
    fn read(&mut self, file: &mut Self::File, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Close a handle returned by [`open`](Self::open).
    fn close(&mut self, file: Self::File) -> Result<(), Self::Error>;
}

/// Read until `buf` is full or the file ends.
///
/// Returns the number of bytes read, which is less than `buf.len()` only at
/// end of file.
pub fn read_full<S: Storage + ?Sized>(
    storage: &mut S,
    file: &mut S::File,
    buf: &mut [u8],
) -> Result<usize, S::Error> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = storage.read(file, &mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n.min(buf.len() - filled);
    }
    Ok(filled)
}
