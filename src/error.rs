use std::fmt;
use std::io;
use thiserror::Error;

/// Category of a decode failure.
///
/// Every [`DecodeError`] maps onto exactly one kind; the decoder's terminal
/// `Failed` state carries it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnexpectedEof,
    MalformedField,
    LayoutError,
    TruncatedRecord,
    CalibrationError,
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::UnexpectedEof => "unexpected end of input",
            ErrorKind::MalformedField => "malformed field",
            ErrorKind::LayoutError => "invalid record layout",
            ErrorKind::TruncatedRecord => "truncated data record",
            ErrorKind::CalibrationError => "invalid calibration",
            ErrorKind::Io => "I/O error",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Unexpected end of input while reading {context}: need {needed} bytes, have {available}")]
    UnexpectedEof {
        context: &'static str,
        needed: usize,
        available: usize,
    },

    #[error("Malformed {field}{}: {value:?}", channel_suffix(.channel))]
    MalformedField {
        field: &'static str,
        channel: Option<usize>,
        value: String,
    },

    #[error("Invalid record layout: {0}")]
    LayoutError(String),

    #[error("Truncated data record{}: expected {expected} bytes, found {actual}", record_suffix(.record))]
    TruncatedRecord {
        record: Option<usize>,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid calibration for channel {channel}: {reason}")]
    CalibrationError { channel: usize, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl DecodeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DecodeError::UnexpectedEof { .. } => ErrorKind::UnexpectedEof,
            DecodeError::MalformedField { .. } => ErrorKind::MalformedField,
            DecodeError::LayoutError(_) => ErrorKind::LayoutError,
            DecodeError::TruncatedRecord { .. } => ErrorKind::TruncatedRecord,
            DecodeError::CalibrationError { .. } => ErrorKind::CalibrationError,
            DecodeError::Io(_) => ErrorKind::Io,
        }
    }

    /// 给截断错误补上记录序号，其它错误原样返回
    pub(crate) fn at_record(self, index: usize) -> Self {
        match self {
            DecodeError::TruncatedRecord { expected, actual, .. } => DecodeError::TruncatedRecord {
                record: Some(index),
                expected,
                actual,
            },
            other => other,
        }
    }

    pub(crate) fn malformed(field: &'static str, channel: Option<usize>, value: &str) -> Self {
        DecodeError::MalformedField {
            field,
            channel,
            value: value.to_string(),
        }
    }
}

fn channel_suffix(channel: &Option<usize>) -> String {
    channel.map(|c| format!(" (channel {})", c)).unwrap_or_default()
}

fn record_suffix(record: &Option<usize>) -> String {
    record.map(|r| format!(" {}", r)).unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, DecodeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_location() {
        let err = DecodeError::malformed("digital minimum", Some(3), "abc");
        assert_eq!(err.to_string(), "Malformed digital minimum (channel 3): \"abc\"");

        let err = DecodeError::TruncatedRecord { record: None, expected: 10, actual: 4 }.at_record(7);
        assert_eq!(err.kind(), ErrorKind::TruncatedRecord);
        assert_eq!(err.to_string(), "Truncated data record 7: expected 10 bytes, found 4");
    }

    #[test]
    fn test_at_record_leaves_other_errors_alone() {
        let err = DecodeError::LayoutError("empty".to_string()).at_record(2);
        assert_eq!(err.kind(), ErrorKind::LayoutError);
    }
}
