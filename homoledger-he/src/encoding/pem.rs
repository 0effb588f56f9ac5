//! Textual envelope for structured key bytes, so keys can be embedded in files, JSON and command
//! line arguments. The envelope is pure framing and knows nothing about the bytes it carries.

use base64::{engine::general_purpose, Engine as _};
use homoledger_traits::{Error, Result};

/// Label of a public key envelope.
pub const PUBLIC_KEY_LABEL: &str = "public key";

/// Label of a private key envelope.
pub const PRIVATE_KEY_LABEL: &str = "private key";

const LINE_WIDTH: usize = 64;

/// Wraps `contents` in a `-----BEGIN <label>-----` / `-----END <label>-----` envelope, with the
/// body in base64 lines of 64 characters.
pub fn encode(label: &str, contents: &[u8]) -> String {
    let body = general_purpose::STANDARD.encode(contents);

    let mut out = format!("-----BEGIN {}-----\n", label);
    // base64 output is ASCII, so splitting on byte boundaries is safe
    for line in body.as_bytes().chunks(LINE_WIDTH) {
        out.push_str(&String::from_utf8_lossy(line));
        out.push('\n');
    }
    out.push_str(&format!("-----END {}-----\n", label));
    out
}

/// Extracts the bytes from an envelope that must carry `label`. Surrounding whitespace is
/// ignored; anything else outside the envelope is rejected.
pub fn decode(label: &str, text: &str) -> Result<Vec<u8>> {
    let begin = format!("-----BEGIN {}-----", label);
    let end = format!("-----END {}-----", label);

    let mut lines = text.trim().lines().map(str::trim);

    match lines.next() {
        Some(line) if line == begin => {}
        Some(line) if line.starts_with("-----BEGIN ") => {
            return Err(Error::MalformedKey(format!(
                "expected a '{}' envelope, found '{}'",
                label, line
            )))
        }
        _ => return Err(Error::MalformedKey("missing envelope header".to_string())),
    }

    let mut body = String::new();
    let mut closed = false;
    for line in lines.by_ref() {
        if line == end {
            closed = true;
            break;
        }
        body.push_str(line);
    }

    if !closed {
        return Err(Error::MalformedKey("missing envelope footer".to_string()));
    }
    if lines.next().is_some() {
        return Err(Error::MalformedKey(
            "unexpected text after envelope footer".to_string(),
        ));
    }

    general_purpose::STANDARD
        .decode(body)
        .map_err(|e| Error::MalformedKey(format!("invalid envelope body: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::{decode, encode, PRIVATE_KEY_LABEL, PUBLIC_KEY_LABEL};
    use homoledger_traits::Error;

    #[test]
    fn test_encode_layout() {
        let contents: Vec<u8> = (0..100).collect();
        let encoded = encode(PUBLIC_KEY_LABEL, &contents);
        let lines: Vec<&str> = encoded.lines().collect();

        assert_eq!("-----BEGIN public key-----", lines[0]);
        assert_eq!(64, lines[1].len());
        assert_eq!("-----END public key-----", lines[lines.len() - 1]);
        assert!(encoded.ends_with('\n'));
    }

    #[test]
    fn test_decode_encoded() {
        let contents = b"\x30\x06\x02\x01\x05\x02\x01\x06".to_vec();
        let encoded = encode(PRIVATE_KEY_LABEL, &contents);

        assert_eq!(contents, decode(PRIVATE_KEY_LABEL, &encoded).unwrap());
    }

    #[test]
    fn test_decode_tolerates_crlf_and_padding() {
        let text = "\n  -----BEGIN public key-----\r\nAQID\r\n-----END public key-----\r\n\n";

        assert_eq!(vec![1, 2, 3], decode(PUBLIC_KEY_LABEL, text).unwrap());
    }

    #[test]
    fn test_decode_wrong_label() {
        let encoded = encode(PRIVATE_KEY_LABEL, &[1, 2, 3]);

        assert!(matches!(
            decode(PUBLIC_KEY_LABEL, &encoded),
            Err(Error::MalformedKey(_))
        ));
    }

    #[test]
    fn test_decode_rejects_broken_envelopes() {
        let cases = [
            "",
            "AQID",
            "-----BEGIN public key-----\nAQID\n",
            "-----BEGIN public key-----\nA?ID\n-----END public key-----\n",
            "-----BEGIN public key-----\nAQID\n-----END public key-----\nextra\n",
        ];

        for case in cases.iter() {
            assert!(
                matches!(decode(PUBLIC_KEY_LABEL, case), Err(Error::MalformedKey(_))),
                "accepted {:?}",
                case
            );
        }
    }
}
