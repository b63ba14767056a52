//! Dispatch text parsing.
//!
//! Dispatch messages arrive as one line of semi-structured text, e.g.
//!
//! ```text
//! 01029747002☏9_9549 00:00기장군.정관로350 이지더원3차아파트 309동 102호♡고객방문요청
//! ```
//!
//! The phone number is the 10–11 digit run directly in front of `☏`, the
//! customer code is the token glued to the other side of it, and the address
//! is whatever sits between that token and the trailing `♡` notes. The parser
//! is purely positional; it does not try to understand the address.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Glyph separating the phone number from the customer code.
pub const PHONE_DELIMITER: char = '☏';
/// Glyph separating the address from trailing notes.
pub const NOTES_DELIMITER: char = '♡';

static PHONE_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]{10,11})☏(\S+)").expect("phone pattern is valid"));
static TIME_OF_DAY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]{2}:[0-9]{2}").expect("time pattern is valid"));

/// Fields extracted from one dispatch message.
///
/// Date and status are not part of the message; they are assigned when the
/// record is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSchedule {
    pub phone_number: String,
    pub customer_code: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("schedule text is empty")]
    Empty,

    #[error("schedule text is not in a recognized format")]
    UnrecognizedFormat,
}

/// Parses a pasted dispatch message.
pub fn parse_schedule_text(text: &str) -> Result<ParsedSchedule, ParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ParseError::Empty);
    }

    let caps = PHONE_CODE_RE
        .captures(text)
        .ok_or(ParseError::UnrecognizedFormat)?;
    let (Some(phone), Some(code)) = (caps.get(1), caps.get(2)) else {
        return Err(ParseError::UnrecognizedFormat);
    };

    let address_start = code.end();
    let address_end = text[address_start..]
        .find(NOTES_DELIMITER)
        .map(|offset| address_start + offset)
        .unwrap_or(text.len());

    let address = strip_time_of_day(text[address_start..address_end].trim());

    Ok(ParsedSchedule {
        phone_number: phone.as_str().to_string(),
        customer_code: code.as_str().to_string(),
        address,
    })
}

/// Removes the first `HH:MM` occurrence and re-trims.
fn strip_time_of_day(address: &str) -> String {
    TIME_OF_DAY_RE.replace(address, "").trim().to_string()
}
