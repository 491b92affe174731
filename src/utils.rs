use std::str::FromStr;

use crate::error::{DecodeError, Result};

/// Sequential reader over fixed-width header fields.
///
/// Every `take` is bounds-checked; running past the end yields
/// `UnexpectedEof` tagged with `context`.
pub(crate) struct FieldReader<'a> {
    bytes: &'a [u8],
    pos: usize,
    context: &'static str,
}

impl<'a> FieldReader<'a> {
    pub fn new(bytes: &'a [u8], context: &'static str) -> Self {
        FieldReader {
            bytes,
            pos: 0,
            context,
        }
    }

    pub fn take(&mut self, width: usize) -> Result<&'a [u8]> {
        let end = self.pos + width;
        let field = self.bytes.get(self.pos..end).ok_or(DecodeError::UnexpectedEof {
            context: self.context,
            needed: end,
            available: self.bytes.len(),
        })?;
        self.pos = end;
        Ok(field)
    }

    pub fn text(&mut self, width: usize) -> Result<String> {
        self.take(width).map(field_text)
    }

    /// 列式读取：连续 `count` 个同宽字段
    pub fn column(&mut self, count: usize, width: usize) -> Result<Vec<&'a [u8]>> {
        (0..count).map(|_| self.take(width)).collect()
    }
}

/// 去掉尾部空格（以及 NUL 填充）后的字段文本，前导空格保留
pub(crate) fn field_text(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .trim_end_matches(|c: char| c == ' ' || c == '\0')
        .to_string()
}

/// Parses a space-padded ASCII integer field.
///
/// Unlike C's `atoi`, blanks and trailing garbage are errors rather than 0.
pub(crate) fn parse_int_field<T: FromStr>(
    raw: &[u8],
    field: &'static str,
    channel: Option<usize>,
) -> Result<T> {
    let text = field_text(raw);
    text.trim_start().parse::<T>()
        .map_err(|_| DecodeError::malformed(field, channel, &text))
}

/// Parses a space-padded ASCII decimal field; only finite values pass.
pub(crate) fn parse_float_field(
    raw: &[u8],
    field: &'static str,
    channel: Option<usize>,
) -> Result<f64> {
    let text = field_text(raw);
    match text.trim_start().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(DecodeError::malformed(field, channel, &text)),
    }
}
