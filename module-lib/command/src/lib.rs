//! Text commands accepted by the IDR registry's proc file.
//!
//! ```text
//! new <token>
//! rm <id>
//! rep <id> <token>
//! ```
//!
//! Fields are separated by ASCII whitespace, newlines included. Only the first token after the
//! keyword is taken, anything after it is ignored. Input ends at the first `NUL` byte.
#![no_std]

use core::fmt;

/// Size of the buffer a write is copied into, terminator included.
pub const COMMAND_BUF_SIZE: usize = 512;
/// Longest payload that is parsed; the rest of a write is dropped.
pub const MAX_COMMAND_LEN: usize = COMMAND_BUF_SIZE - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    New(NewCommand<'a>),
    Remove(RemoveCommand),
    Replace(ReplaceCommand<'a>),
}

/// Command to store a new entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewCommand<'a> {
    pub token: &'a str,
}

/// Command to remove an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveCommand {
    pub id: u32,
}

/// Command to swap the value of an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaceCommand<'a> {
    pub id: u32,
    pub token: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// Empty input or an unknown keyword.
    Unrecognized,
    /// `new` or `rep` without a token.
    MissingToken,
    /// `rm` or `rep` without an id.
    MissingId,
    /// The id is not a non-negative decimal number.
    InvalidId,
    InvalidUtf8,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ParseError::Unrecognized => "unrecognized command",
            ParseError::MissingToken => "missing token",
            ParseError::MissingId => "missing id",
            ParseError::InvalidId => "invalid id",
            ParseError::InvalidUtf8 => "command is not valid UTF-8",
        };
        f.write_str(msg)
    }
}

impl Command<'_> {
    /// Parses the first [`MAX_COMMAND_LEN`] bytes of a write payload.
    pub fn parse_bounded(data: &[u8]) -> Result<Command<'_>, ParseError> {
        Self::parse(&data[..data.len().min(MAX_COMMAND_LEN)])
    }

    /// Parses one write payload.
    pub fn parse(data: &[u8]) -> Result<Command<'_>, ParseError> {
        let data = match data.iter().position(|&b| b == 0) {
            Some(nul) => &data[..nul],
            None => data,
        };
        // The payload may be cut in the middle of a character by the length limit.
        let text = match core::str::from_utf8(data) {
            Ok(text) => text,
            Err(e) if e.error_len().is_none() => core::str::from_utf8(&data[..e.valid_up_to()])
                .map_err(|_| ParseError::InvalidUtf8)?,
            Err(_) => return Err(ParseError::InvalidUtf8),
        };
        let mut fields = text.split_ascii_whitespace();
        let command = match fields.next() {
            Some("new") => Command::New(NewCommand {
                token: fields.next().ok_or(ParseError::MissingToken)?,
            }),
            Some("rm") => Command::Remove(RemoveCommand {
                id: Self::parse_id(fields.next())?,
            }),
            Some("rep") => {
                let id = Self::parse_id(fields.next())?;
                let token = fields.next().ok_or(ParseError::MissingToken)?;
                Command::Replace(ReplaceCommand { id, token })
            }
            _ => return Err(ParseError::Unrecognized),
        };
        log::trace!("parsed {:?}", command);
        Ok(command)
    }

    fn parse_id(field: Option<&str>) -> Result<u32, ParseError> {
        let field = field.ok_or(ParseError::MissingId)?;
        // `u32::from_str` accepts a leading `+`, ids are plain digits only.
        if !field.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseError::InvalidId);
        }
        field.parse::<u32>().map_err(|_| ParseError::InvalidId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_new_with_first_token_only() {
        assert_eq!(
            Command::parse(b"new hello world\n"),
            Ok(Command::New(NewCommand { token: "hello" }))
        );
    }

    #[test]
    fn parses_remove() {
        assert_eq!(
            Command::parse(b"rm 0"),
            Ok(Command::Remove(RemoveCommand { id: 0 }))
        );
        assert_eq!(
            Command::parse(b"rm   0042\n"),
            Ok(Command::Remove(RemoveCommand { id: 42 }))
        );
    }

    #[test]
    fn parses_replace() {
        assert_eq!(
            Command::parse(b"rep 3 x"),
            Ok(Command::Replace(ReplaceCommand { id: 3, token: "x" }))
        );
    }

    #[test]
    fn tokens_may_be_separated_by_newlines_and_tabs() {
        assert_eq!(
            Command::parse(b"rep\t7\nvalue\n"),
            Ok(Command::Replace(ReplaceCommand {
                id: 7,
                token: "value"
            }))
        );
    }

    #[test]
    fn unknown_or_empty_input_is_unrecognized() {
        assert_eq!(Command::parse(b""), Err(ParseError::Unrecognized));
        assert_eq!(Command::parse(b"  \n"), Err(ParseError::Unrecognized));
        assert_eq!(Command::parse(b"add foo"), Err(ParseError::Unrecognized));
        assert_eq!(Command::parse(b"newfoo"), Err(ParseError::Unrecognized));
    }

    #[test]
    fn new_without_token_is_an_error() {
        assert_eq!(Command::parse(b"new"), Err(ParseError::MissingToken));
        assert_eq!(Command::parse(b"new   \n"), Err(ParseError::MissingToken));
        assert_eq!(Command::parse(b"rep 1"), Err(ParseError::MissingToken));
    }

    #[test]
    fn bad_ids_are_rejected() {
        assert_eq!(Command::parse(b"rm"), Err(ParseError::MissingId));
        assert_eq!(Command::parse(b"rm -1"), Err(ParseError::InvalidId));
        assert_eq!(Command::parse(b"rm +1"), Err(ParseError::InvalidId));
        assert_eq!(Command::parse(b"rm 12abc"), Err(ParseError::InvalidId));
        assert_eq!(Command::parse(b"rm 99999999999"), Err(ParseError::InvalidId));
        assert_eq!(Command::parse(b"rep x y"), Err(ParseError::InvalidId));
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        assert_eq!(
            Command::parse(b"new \xff\xfe"),
            Err(ParseError::InvalidUtf8)
        );
    }

    #[test]
    fn input_ends_at_nul() {
        assert_eq!(
            Command::parse(b"new foo\0bar\n"),
            Ok(Command::New(NewCommand { token: "foo" }))
        );
        assert_eq!(Command::parse(b"\0new foo"), Err(ParseError::Unrecognized));
        assert_eq!(Command::parse(b"new\0 foo"), Err(ParseError::MissingToken));
    }

    #[test]
    fn bounded_parse_keeps_command_buffer_prefix() {
        let mut data = [b'a'; 604];
        data[..4].copy_from_slice(b"new ");
        let Ok(Command::New(new)) = Command::parse_bounded(&data) else {
            panic!("expected a new command");
        };
        assert_eq!(new.token.len(), MAX_COMMAND_LEN - 4);
        assert_eq!(new.token.len(), 507);
        assert!(new.token.bytes().all(|b| b == b'a'));
    }

    #[test]
    fn bounded_parse_leaves_short_input_alone() {
        assert_eq!(
            Command::parse_bounded(b"rep 2 short\n"),
            Ok(Command::Replace(ReplaceCommand {
                id: 2,
                token: "short"
            }))
        );
    }

    #[test]
    fn truncated_multibyte_character_is_dropped() {
        // "é" is 0xc3 0xa9; the payload was cut after its first byte.
        assert_eq!(
            Command::parse(b"new caf\xc3"),
            Ok(Command::New(NewCommand { token: "caf" }))
        );
    }
}
