use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtoError {
    #[error("buffer too short")]
    TooShort,

    #[error("payload size {0} exceeds max {1}")]
    PayloadTooLarge(usize, usize),

    #[error("declared frame size {0} exceeds max payload {1}")]
    SizeTooLarge(usize, usize),

    #[error("unknown command byte: {0:#04x}")]
    UnknownCmd(u8),

    #[error("string field is not valid nul-padded ASCII")]
    BadString,
}
