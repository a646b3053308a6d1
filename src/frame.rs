use crate::DemoCommand;

/// A single outer demo frame: a command, the tick it applies to and its
/// (possibly snappy-compressed) payload.
pub struct Frame<'b> {
    pub cmd: DemoCommand,
    pub tick: i32,
    pub compressed: bool,
    pub inner: std::borrow::Cow<'b, [u8]>,
}

#[derive(Debug)]
pub enum FrameParseError {
    ParseVarint(()),
    NotEnoughBytes,
    ParseDemoCommand(i32),
}

#[derive(Debug)]
pub enum FrameDecompressError {
    GettingDecompressedLength(snap::Error),
    Decompressing(snap::Error),
}

impl<'b> Frame<'b> {
    pub fn parse<'ib>(input: &'ib [u8]) -> Result<(&'ib [u8], Self), FrameParseError>
    where
        'ib: 'b,
    {
        let (input, raw_cmd) =
            crate::varint::parse_varint(input).map_err(FrameParseError::ParseVarint)?;
        let (input, tick) =
            crate::varint::parse_varint(input).map_err(FrameParseError::ParseVarint)?;
        let (input, size) =
            crate::varint::parse_varint(input).map_err(FrameParseError::ParseVarint)?;

        if input.len() < size as usize {
            return Err(FrameParseError::NotEnoughBytes);
        }

        let (cmd, compressed) =
            DemoCommand::from_raw(raw_cmd).map_err(FrameParseError::ParseDemoCommand)?;

        Ok((
            &input[size as usize..],
            Self {
                tick: tick as i32,
                cmd,
                compressed,
                inner: std::borrow::Cow::Borrowed(&input[..size as usize]),
            },
        ))
    }

    /// Returns the payload, decompressing into `buf` when needed.
    pub fn decompress_with_buf<'s, 'buf>(
        &'s self,
        buf: &'b mut Vec<u8>,
    ) -> Result<&'buf [u8], FrameDecompressError>
    where
        's: 'buf,
    {
        if !self.compressed {
            return Ok(&self.inner);
        }

        let uncompressed_len = snap::raw::decompress_len(&self.inner)
            .map_err(FrameDecompressError::GettingDecompressedLength)?;
        buf.resize(uncompressed_len, 0);

        snap::raw::Decoder::new()
            .decompress(&self.inner, buf.as_mut_slice())
            .map_err(FrameDecompressError::Decompressing)?;

        Ok(buf.as_slice())
    }
}

pub struct FrameIterator<'b> {
    remaining: &'b [u8],
}

impl<'b> FrameIterator<'b> {
    pub fn parse<'ib>(input: &'ib [u8]) -> Self
    where
        'ib: 'b,
    {
        Self { remaining: input }
    }
}

impl<'b> Iterator for FrameIterator<'b> {
    type Item = Frame<'b>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining.is_empty() {
            return None;
        }

        match Frame::parse(self.remaining) {
            Ok((rem, frame)) => {
                self.remaining = rem;
                Some(frame)
            }
            Err(_e) => {
                // A malformed frame header desyncs the stream, nothing after
                // it can be trusted.
                self.remaining = &[];
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_bytes(cmd: u8, tick: u8, payload: &[u8]) -> Vec<u8> {
        let mut out = vec![cmd, tick, payload.len() as u8];
        out.extend_from_slice(payload);
        out
    }

    #[test]
    fn parses_frame_sequence() {
        let mut input = frame_bytes(1, 0, b"abc");
        input.extend_from_slice(&frame_bytes(7, 5, b"de"));

        let mut frames = FrameIterator::parse(&input);

        let first = frames.next().unwrap();
        assert_eq!(DemoCommand::FileHeader, first.cmd);
        assert_eq!(0, first.tick);
        assert_eq!(b"abc", first.inner.as_ref());

        let second = frames.next().unwrap();
        assert_eq!(DemoCommand::Packet, second.cmd);
        assert_eq!(5, second.tick);
        assert_eq!(b"de", second.inner.as_ref());

        assert!(frames.next().is_none());
    }

    #[test]
    fn compression_flag_is_masked() {
        let input = frame_bytes(7 | 64, 0, b"xx");
        let (_, frame) = Frame::parse(&input).unwrap();
        assert_eq!(DemoCommand::Packet, frame.cmd);
        assert!(frame.compressed);
    }

    #[test]
    fn decompresses_snappy_payload() {
        let compressed = snap::raw::Encoder::new().compress_vec(b"hello demo").unwrap();
        let input = frame_bytes(7 | 64, 0, &compressed);
        let (_, frame) = Frame::parse(&input).unwrap();

        let mut buf = Vec::new();
        let data = frame.decompress_with_buf(&mut buf).unwrap();
        assert_eq!(b"hello demo", data);
    }
}
