// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Line-oriented record codec shared by the WAL and the replication payload
//!
//! A record is `KIND \t KEY \t VALUE` on a single line. Fields are escaped
//! character by character so that one logical record is always exactly one
//! physical line:
//!
//! | char | escaped |
//! |------|---------|
//! | `\`  | `\\`    |
//! | LF   | `\n`    |
//! | CR   | `\r`    |
//! | TAB  | `\t`    |

use crate::operation::{Operation, OperationKind};
use thiserror::Error;

/// Field delimiter within a record
pub const DELIMITER: char = '\t';

/// Errors decoding a single record line
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("expected 3 fields, found {0}")]
    Arity(usize),
    #[error("unknown operation kind: {0}")]
    UnknownKind(String),
    #[error("invalid escape sequence: \\{0}")]
    BadEscape(char),
    #[error("dangling escape at end of field")]
    DanglingEscape,
}

/// Escape a field so it contains no delimiter or line terminator
pub fn escape(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    for c in field.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

/// Reverse [`escape`]
pub fn unescape(field: &str) -> Result<String, DecodeError> {
    let mut out = String::with_capacity(field.len());
    let mut chars = field.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => return Err(DecodeError::BadEscape(other)),
            None => return Err(DecodeError::DanglingEscape),
        }
    }
    Ok(out)
}

/// Encode an operation as one record line (without the trailing newline)
pub fn encode_record(op: &Operation) -> String {
    let kind = op.kind().tag();
    match op {
        Operation::Put { key, value } => {
            format!("{kind}{DELIMITER}{}{DELIMITER}{}", escape(key), escape(value))
        }
        Operation::Delete { key } => format!("{kind}{DELIMITER}{}{DELIMITER}", escape(key)),
    }
}

/// Decode one record line (trailing newline already stripped)
pub fn decode_record(line: &str) -> Result<Operation, DecodeError> {
    let fields: Vec<&str> = line.split(DELIMITER).collect();
    let [kind, key, value] = fields.as_slice() else {
        return Err(DecodeError::Arity(fields.len()));
    };

    let kind =
        OperationKind::from_tag(kind).ok_or_else(|| DecodeError::UnknownKind(kind.to_string()))?;
    let key = unescape(key)?;

    Ok(match kind {
        OperationKind::Put => Operation::Put {
            key,
            value: unescape(value)?,
        },
        // Whatever a delete record carries in its value field is ignored
        OperationKind::Delete => Operation::Delete { key },
    })
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
