// Mon Oct 12 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    #[error("unable to parse number `{0}`")]
    BadNumber(String),
    #[error("bad range `{0}`, expected <low>..<high> with low <= high")]
    BadRange(String),
    #[error("bad byte `{0}` in byte array, expected two hex digits or ??")]
    BadByte(String),
    #[error("empty byte array")]
    EmptyByteArray,
    #[error("please specify a string")]
    EmptyString,
    #[error("value is {0} bytes long, the limit is 65535")]
    TooLong(usize),
    #[error("value does not fit any width of the match")]
    NoCommonWidth,
}
