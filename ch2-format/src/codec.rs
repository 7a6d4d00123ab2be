//! Codec for rendering and encoding `.ch2` documents.
//!
//! Layout:
//! ```text
//! <HEADER_TITLE>
//! <HEADER_COLUMNS>
//! ;#SPACE(<index>,<label>)
//! <name>,<space>,<channel>,<remote>,<type>,<sid>,<nid>,<tsid>,<enabled>
//! ...
//! ```
//! Lines are joined with CRLF; there is no separator after the last line.

use encoding_rs::SHIFT_JIS;

use crate::error::Ch2Error;
use crate::types::*;

/// Collect every line of the document in output order.
fn document_lines(document: &Ch2Document) -> Vec<String> {
    let mut lines = Vec::with_capacity(2 + document.spaces.len() + document.channel_count());
    lines.push(HEADER_TITLE.to_string());
    lines.push(HEADER_COLUMNS.to_string());

    for space in &document.spaces {
        lines.push(space.comment());
        lines.extend(space.channels.iter().map(|channel| channel.to_string()));
    }

    lines
}

/// Render a document as UTF-8 text.
pub fn render_document(document: &Ch2Document) -> String {
    document_lines(document).join(LINE_SEPARATOR)
}

/// Encode a document as Shift_JIS bytes, ready to be written to disk.
///
/// Fails on the first line containing a character that Shift_JIS cannot
/// represent instead of silently substituting it.
pub fn encode_document(document: &Ch2Document) -> Result<Vec<u8>, Ch2Error> {
    let lines = document_lines(document);
    let mut encoded = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            encoded.extend_from_slice(LINE_SEPARATOR.as_bytes());
        }
        encoded.extend_from_slice(&encode_line(line)?);
    }

    Ok(encoded)
}

fn encode_line(line: &str) -> Result<Vec<u8>, Ch2Error> {
    let (bytes, _, had_errors) = SHIFT_JIS.encode(line);
    if !had_errors {
        return Ok(bytes.into_owned());
    }

    // Locate the offending character for the error message.
    let mut buf = [0u8; 4];
    let character = line
        .chars()
        .find(|c| SHIFT_JIS.encode(c.encode_utf8(&mut buf)).2)
        .unwrap_or(char::REPLACEMENT_CHARACTER);

    Err(Ch2Error::Unencodable {
        character,
        code: character as u32,
        line: line.to_string(),
    })
}
