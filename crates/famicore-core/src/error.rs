use std::fmt;

use crate::cartridge::header::INES_HEADER_LEN;

/// Errors raised while validating and inserting a cartridge image.
#[derive(Debug)]
pub enum CartridgeError {
    /// Provided buffer is shorter than the 16-byte header.
    TooShort { actual: usize },
    /// Magic number ("NES<EOF>") is missing.
    InvalidMagic,
    /// A ROM section is shorter than the header advertises.
    SectionTooShort {
        section: &'static str,
        expected: usize,
        actual: usize,
    },
    /// A bank image is not a multiple of the hardware bank size.
    BadBankSize {
        section: &'static str,
        bank_size: usize,
        actual: usize,
    },
    /// No mapper implementation is registered for this id.
    UnsupportedMapper { mapper_id: u16 },
}

impl fmt::Display for CartridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort { actual } => {
                write!(f, "header expected {INES_HEADER_LEN} bytes, got {actual}")
            }
            Self::InvalidMagic => write!(f, "missing NES magic bytes"),
            Self::SectionTooShort {
                section,
                expected,
                actual,
            } => write!(
                f,
                "{section} section expected {expected} bytes, got {actual}"
            ),
            Self::BadBankSize {
                section,
                bank_size,
                actual,
            } => write!(
                f,
                "{section} image of {actual} bytes is not a multiple of the {bank_size}-byte bank"
            ),
            Self::UnsupportedMapper { mapper_id } => {
                write!(f, "no mapper implementation registered for id {mapper_id}")
            }
        }
    }
}

impl std::error::Error for CartridgeError {}

/// Errors raised while restoring a serialized console state.
///
/// Restore is atomic: when any of these is returned the console keeps the
/// state it had before the call.
#[derive(Debug)]
pub enum StateError {
    /// Snapshot does not start with the expected magic bytes.
    BadMagic,
    /// Snapshot was produced by an incompatible format version.
    UnsupportedVersion { version: u8 },
    /// Snapshot payload failed to decode (truncated or corrupt).
    Corrupt(postcard::Error),
    /// Snapshot was captured with no cartridge but one is required here,
    /// or vice versa.
    CartridgeMismatch,
    /// Snapshot was captured against a different mapper.
    MapperMismatch { expected: u16, actual: u16 },
    /// A memory section in the snapshot has the wrong length.
    BadLength { section: &'static str },
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadMagic => write!(f, "missing snapshot magic bytes"),
            Self::UnsupportedVersion { version } => {
                write!(f, "unsupported snapshot version {version}")
            }
            Self::Corrupt(err) => write!(f, "snapshot payload failed to decode: {err}"),
            Self::CartridgeMismatch => {
                write!(f, "snapshot cartridge presence does not match the console")
            }
            Self::MapperMismatch { expected, actual } => {
                write!(
                    f,
                    "snapshot captured for mapper {actual}, console has mapper {expected}"
                )
            }
            Self::BadLength { section } => {
                write!(f, "snapshot {section} section has the wrong length")
            }
        }
    }
}

impl std::error::Error for StateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Corrupt(err) => Some(err),
            _ => None,
        }
    }
}

impl From<postcard::Error> for StateError {
    fn from(value: postcard::Error) -> Self {
        Self::Corrupt(value)
    }
}
