//! Outer layer of a demo recording.

/// Engine generation of a recording, identified by the container magic.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DemoSource {
    /// `HL2DEMO` recordings (CS:GO and earlier).
    Source1,
    /// `PBDEMS2` recordings (CS2).
    Source2,
}

#[derive(Debug)]
pub enum ParseContainerError {
    MissingHeader,
    UnknownMagic([u8; 8]),
    /// Source 1 recordings use an entirely different outer layout; only
    /// their payload formats (legacy string tables, user-info records) are
    /// handled, not the container itself.
    UnsupportedSource(DemoSource),
    MismatchedLength {
        buffer_len: usize,
        expected_len: usize,
    },
}

const SOURCE2_MAGIC: [u8; 8] = *b"PBDEMS2\0";
const SOURCE1_MAGIC: [u8; 8] = *b"HL2DEMO\0";

/// Header: 8 byte magic, little-endian frame-data length, 4 reserved bytes.
const HEADER_LEN: usize = 16;

/// A validated recording: the engine variant plus the raw frame bytes.
#[derive(Debug)]
pub struct Container<'b> {
    pub source: DemoSource,
    pub inner: &'b [u8],
}

impl<'b> Container<'b> {
    pub fn parse(input: &'b [u8]) -> Result<Self, ParseContainerError> {
        if input.len() < HEADER_LEN {
            return Err(ParseContainerError::MissingHeader);
        }

        let mut magic = [0u8; 8];
        magic.copy_from_slice(&input[..8]);
        let source = match magic {
            SOURCE2_MAGIC => DemoSource::Source2,
            SOURCE1_MAGIC => {
                return Err(ParseContainerError::UnsupportedSource(DemoSource::Source1))
            }
            other => return Err(ParseContainerError::UnknownMagic(other)),
        };

        let mut raw_len = [0u8; 4];
        raw_len.copy_from_slice(&input[8..12]);
        // The recorded length excludes the two trailing bytes.
        let expected_len = u32::from_le_bytes(raw_len) as usize + 2;

        let inner = &input[HEADER_LEN..];
        if inner.len() != expected_len {
            return Err(ParseContainerError::MismatchedLength {
                buffer_len: inner.len(),
                expected_len,
            });
        }

        Ok(Self { source, inner })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_magic(magic: &[u8; 8], frame_bytes: &[u8]) -> Vec<u8> {
        let mut input = Vec::new();
        input.extend_from_slice(magic);
        input.extend_from_slice(&(frame_bytes.len() as u32).to_le_bytes());
        input.extend_from_slice(&[0u8; 4]);
        input.extend_from_slice(frame_bytes);
        input.extend_from_slice(&[0u8; 2]);
        input
    }

    #[test]
    fn rejects_short_input() {
        assert!(matches!(
            Container::parse(&[0u8; 8]),
            Err(ParseContainerError::MissingHeader)
        ));
    }

    #[test]
    fn rejects_unknown_magic() {
        let input = with_magic(b"NOTADEMO", &[1, 2, 3]);
        assert!(matches!(
            Container::parse(&input),
            Err(ParseContainerError::UnknownMagic(_))
        ));
    }

    #[test]
    fn source1_recordings_are_recognized_but_unsupported() {
        let input = with_magic(b"HL2DEMO\0", &[1, 2, 3]);
        assert!(matches!(
            Container::parse(&input),
            Err(ParseContainerError::UnsupportedSource(DemoSource::Source1))
        ));
    }

    #[test]
    fn rejects_mismatched_length() {
        let mut input = with_magic(b"PBDEMS2\0", &[1, 2, 3]);
        input.pop();

        assert!(matches!(
            Container::parse(&input),
            Err(ParseContainerError::MismatchedLength { .. })
        ));
    }

    #[test]
    fn accepts_wellformed_container() {
        let input = with_magic(b"PBDEMS2\0", &[1, 2, 3, 4]);

        let container = Container::parse(&input).unwrap();
        assert_eq!(DemoSource::Source2, container.source);
        assert_eq!(&[1, 2, 3, 4, 0, 0], container.inner);
    }
}
