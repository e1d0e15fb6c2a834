use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    #[error("malformed header: non-zero opcode")]
    ErrMalformedHeader,
    #[error("malformed name: label length exceeds 63 bytes")]
    ErrMalformedName,
    #[error("question type is not a supported DNS type")]
    ErrInvalidQuestionType,
    #[error("question class is not class IN")]
    ErrInvalidQuestionClass,
    #[error("read or write past end of buffer")]
    ErrBufferOverrun,
    #[error("encoded name exceeds 255 bytes")]
    ErrNameTooLong,
    #[error("character string exceeds 255 bytes")]
    ErrCharacterStringTooLong,
    #[error("too many questions")]
    ErrTooManyQuestions,
    #[error("too many answers")]
    ErrTooManyAnswers,
    #[error("responder is closed")]
    ErrResponderClosed,
}
