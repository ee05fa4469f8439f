//! Splitting a byte stream into terminator-delimited fragments.

use std::io::{self, Read};

use memchr::memchr2;

const READ_CHUNK: usize = 8 * 1024;

/// Yields each `\r`- or `\n`-terminated fragment of a stream, terminator kept.
///
/// Bytes are decoded as UTF-8, replacing invalid sequences. A trailing
/// remainder without terminator is yielded as-is once the stream ends.
///
/// # Example
///
/// ```
/// use runner::FragmentReader;
///
/// let stream = &b"file\n  1 100%  1.00kB/s    0:00:01\rtail"[..];
/// let fragments: Vec<String> = FragmentReader::new(stream)
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(fragments, ["file\n", "  1 100%  1.00kB/s    0:00:01\r", "tail"]);
/// ```
#[derive(Debug)]
pub struct FragmentReader<R> {
    inner: R,
    buffer: Vec<u8>,
    scanned: usize,
    exhausted: bool,
}

impl<R: Read> FragmentReader<R> {
    /// Wraps `inner`.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buffer: Vec::with_capacity(READ_CHUNK),
            scanned: 0,
            exhausted: false,
        }
    }

    /// Returns the wrapped reader.
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn take_fragment(&mut self, end: usize) -> String {
        let rest = self.buffer.split_off(end);
        let fragment = std::mem::replace(&mut self.buffer, rest);
        self.scanned = 0;
        decode(fragment)
    }
}

impl<R: Read> Iterator for FragmentReader<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(offset) = memchr2(b'\r', b'\n', &self.buffer[self.scanned..]) {
                let end = self.scanned + offset + 1;
                return Some(Ok(self.take_fragment(end)));
            }
            self.scanned = self.buffer.len();

            if self.exhausted {
                if self.buffer.is_empty() {
                    return None;
                }
                let end = self.buffer.len();
                return Some(Ok(self.take_fragment(end)));
            }

            let filled = self.buffer.len();
            self.buffer.resize(filled + READ_CHUNK, 0);
            let result = self.inner.read(&mut self.buffer[filled..]);
            self.buffer
                .truncate(filled + result.as_ref().map_or(0, |read| *read));

            match result {
                Ok(0) => self.exhausted = true,
                Ok(_) => {}
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => {
                    self.exhausted = true;
                    self.buffer.clear();
                    self.scanned = 0;
                    return Some(Err(err));
                }
            }
        }
    }
}

fn decode(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes)
        .unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned())
}
