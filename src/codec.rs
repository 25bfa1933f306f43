//! Value codecs.
//!
//! A codec sits between the bytes a caller hands to a [`Store`](crate::Store)
//! and the bytes the backend persists. Both directions are typed as byte
//! slices, so a codec never has to inspect the shape of its input.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors raised while encoding or decoding a value.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("cannot encode value with codec '{codec}': {reason}")]
    Encode { codec: &'static str, reason: String },

    #[error("cannot decode value with codec '{codec}': {reason}")]
    Decode { codec: &'static str, reason: String },
}

/// Transform between application bytes and backend bytes.
pub trait Codec {
    /// Turn a value into the bytes the backend stores.
    fn encode(&self, value: &[u8]) -> Result<Vec<u8>, CodecError>;

    /// Turn stored bytes back into the value.
    fn decode(&self, data: &[u8]) -> Result<Vec<u8>, CodecError>;
}

/// Identity codec: bytes in, bytes out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoCodec;

impl Codec for NoCodec {
    fn encode(&self, value: &[u8]) -> Result<Vec<u8>, CodecError> {
        Ok(value.to_vec())
    }

    fn decode(&self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        Ok(data.to_vec())
    }
}

/// The codecs selectable by name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CodecKind {
    /// Store values verbatim.
    #[default]
    None,
}

impl CodecKind {
    /// Every selectable codec, in the order they are listed to users.
    pub const ALL: &'static [CodecKind] = &[CodecKind::None];

    /// Comma-separated list of every codec name.
    pub fn names() -> String {
        known_names(Self::ALL.iter().map(|c| c.name()))
    }

    /// The name used on the command line and in config files.
    pub fn name(self) -> &'static str {
        match self {
            CodecKind::None => "none",
        }
    }
}

impl Codec for CodecKind {
    fn encode(&self, value: &[u8]) -> Result<Vec<u8>, CodecError> {
        match self {
            CodecKind::None => NoCodec.encode(value),
        }
    }

    fn decode(&self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        match self {
            CodecKind::None => NoCodec.decode(data),
        }
    }
}

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An unrecognized codec name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown codec '{0}' (expected one of: {list})", list = CodecKind::names())]
pub struct UnknownCodec(pub String);

impl FromStr for CodecKind {
    type Err = UnknownCodec;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CodecKind::ALL
            .iter()
            .copied()
            .find(|c| c.name() == s)
            .ok_or_else(|| UnknownCodec(s.to_string()))
    }
}

/// Join selector names for an error message.
pub(crate) fn known_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_codec_is_identity() -> Result<(), CodecError> {
        let data = vec![0u8, 159, 146, 150, b'\n'];
        assert_eq!(NoCodec.encode(&data)?, data);
        assert_eq!(NoCodec.decode(&data)?, data);
        assert!(NoCodec.encode(&[])?.is_empty());
        Ok(())
    }

    #[test]
    fn test_codec_kind_parse() {
        assert_eq!("none".parse::<CodecKind>(), Ok(CodecKind::None));
        assert_eq!(CodecKind::default(), CodecKind::None);
        assert_eq!(CodecKind::None.to_string(), "none");
    }

    #[test]
    fn test_unknown_codec_names_value() {
        let err = "gob".parse::<CodecKind>().err();
        assert_eq!(err, Some(UnknownCodec("gob".to_string())));
        let msg = UnknownCodec("gob".to_string()).to_string();
        assert!(msg.contains("'gob'"));
        assert!(msg.contains("none"));
    }

    #[test]
    fn test_codec_kind_parse_is_case_sensitive() {
        assert!("NONE".parse::<CodecKind>().is_err());
    }
}
