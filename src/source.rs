//! Character sources the tokenizer reads from.
//!
//! A source hands out already decoded characters one at a time. Sources
//! that can start over from the beginning implement [`CharSource::rewind`],
//! which [`replace`](crate::replace) needs for its second scan.

use std::io::{ErrorKind, Read, Seek, SeekFrom};

use encoding_rs::{CoderResult, Decoder, UTF_8};

use crate::error::Error;

const READ_CHUNK: usize = 8 * 1024;

/// A stream of characters.
pub trait CharSource {
    /// The next character, or `None` at the end of input.
    fn next_char(&mut self) -> Result<Option<char>, Error>;

    /// Go back to the first character.
    ///
    /// The default implementation fails with
    /// [`Error::UnsupportedOperation`].
    fn rewind(&mut self) -> Result<(), Error> {
        Err(Error::UnsupportedOperation(
            "source cannot be rewound".to_string(),
        ))
    }
}

impl<T: CharSource + ?Sized> CharSource for &mut T {
    fn next_char(&mut self) -> Result<Option<char>, Error> {
        (**self).next_char()
    }

    fn rewind(&mut self) -> Result<(), Error> {
        (**self).rewind()
    }
}

/// Characters of an in-memory string. Rewindable.
#[derive(Debug, Clone)]
pub struct StrSource<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> StrSource<'a> {
    pub fn new(text: &'a str) -> Self {
        StrSource { text, pos: 0 }
    }
}

impl<'a> From<&'a str> for StrSource<'a> {
    fn from(text: &'a str) -> Self {
        StrSource::new(text)
    }
}

impl CharSource for StrSource<'_> {
    #[inline]
    fn next_char(&mut self) -> Result<Option<char>, Error> {
        let c = self.text[self.pos..].chars().next();
        if let Some(c) = c {
            self.pos += c.len_utf8();
        }
        Ok(c)
    }

    fn rewind(&mut self) -> Result<(), Error> {
        self.pos = 0;
        Ok(())
    }
}

/// Characters decoded from a UTF-8 byte stream. Not rewindable.
///
/// Malformed byte sequences decode to U+FFFD; a leading byte order mark
/// is dropped.
pub struct ReaderSource<R> {
    reader: R,
    decoder: Decoder,
    bytes: Box<[u8]>,
    decoded: String,
    pos: usize,
    finished: bool,
}

impl<R: Read> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        ReaderSource {
            reader,
            decoder: UTF_8.new_decoder(),
            bytes: vec![0; READ_CHUNK].into_boxed_slice(),
            decoded: String::new(),
            pos: 0,
            finished: false,
        }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    fn reset(&mut self) {
        self.decoder = UTF_8.new_decoder();
        self.decoded.clear();
        self.pos = 0;
        self.finished = false;
    }

    /// Decode the next chunk. Returns false once the input is exhausted.
    fn fill(&mut self) -> Result<bool, Error> {
        self.decoded.clear();
        self.pos = 0;
        while !self.finished {
            let n = match self.reader.read(&mut self.bytes) {
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            let last = n == 0;
            let mut input = &self.bytes[..n];
            loop {
                let needed = self
                    .decoder
                    .max_utf8_buffer_length(input.len())
                    .unwrap_or(input.len() * 3 + 4);
                self.decoded.reserve(needed);
                let (result, read, _) = self
                    .decoder
                    .decode_to_string(input, &mut self.decoded, last);
                input = &input[read..];
                match result {
                    CoderResult::InputEmpty => break,
                    CoderResult::OutputFull => {}
                }
            }
            self.finished = last;
            if !self.decoded.is_empty() {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl<R: Read> CharSource for ReaderSource<R> {
    fn next_char(&mut self) -> Result<Option<char>, Error> {
        if self.pos >= self.decoded.len() && !self.fill()? {
            return Ok(None);
        }
        let c = self.decoded[self.pos..].chars().next();
        if let Some(c) = c {
            self.pos += c.len_utf8();
        }
        Ok(c)
    }
}

/// Characters decoded from a seekable UTF-8 byte stream. Rewindable.
pub struct SeekReaderSource<R> {
    inner: ReaderSource<R>,
}

impl<R: Read + Seek> SeekReaderSource<R> {
    pub fn new(reader: R) -> Self {
        SeekReaderSource {
            inner: ReaderSource::new(reader),
        }
    }

    pub fn into_inner(self) -> R {
        self.inner.into_inner()
    }
}

impl<R: Read + Seek> CharSource for SeekReaderSource<R> {
    fn next_char(&mut self) -> Result<Option<char>, Error> {
        self.inner.next_char()
    }

    fn rewind(&mut self) -> Result<(), Error> {
        self.inner.reader.seek(SeekFrom::Start(0))?;
        self.inner.reset();
        Ok(())
    }
}
