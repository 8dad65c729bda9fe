//! Sheet document format
//!
//! A document is `<HEAD>checksum</HEAD>` followed by a body. The body is
//! `<EMPTY>` for a sheet without cells, otherwise one
//! `<ID>position</ID><VAL>contents</VAL>` entry per cell. Inside entries
//! `&`, `<` and `>` are written as `&amp;`, `&lt;` and `&gt;`.

use crate::error::{SheetError, SheetResult};
use crate::options::ChecksumAlgorithm;

const HEAD_OPEN: &str = "<HEAD>";
const HEAD_CLOSE: &str = "</HEAD>";
const EMPTY_BODY: &str = "<EMPTY>";
const ID_OPEN: &str = "<ID>";
const ID_CLOSE: &str = "</ID>";
const VAL_OPEN: &str = "<VAL>";
const VAL_CLOSE: &str = "</VAL>";

/// Build a complete document from `(id, contents)` entries
pub(crate) fn encode<'a, I>(entries: I, checksum: ChecksumAlgorithm) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut body = String::new();
    for (id, contents) in entries {
        body.push_str(ID_OPEN);
        body.push_str(&escape(id));
        body.push_str(ID_CLOSE);
        body.push_str(VAL_OPEN);
        body.push_str(&escape(contents));
        body.push_str(VAL_CLOSE);
    }
    if body.is_empty() {
        body.push_str(EMPTY_BODY);
    }

    let digest = checksum.digest(body.as_bytes());
    format!("{HEAD_OPEN}{digest}{HEAD_CLOSE}{body}")
}

/// Split off the header and check the body against it
pub(crate) fn verified_body(document: &str, checksum: ChecksumAlgorithm) -> SheetResult<&str> {
    let (stored, body) = document
        .strip_prefix(HEAD_OPEN)
        .and_then(|rest| rest.split_once(HEAD_CLOSE))
        .ok_or(SheetError::MissingHeader)?;

    let computed = checksum.digest(body.as_bytes());
    if stored != computed {
        return Err(SheetError::ChecksumMismatch {
            stored: stored.to_string(),
            computed,
        });
    }

    Ok(body)
}

/// Iterate over the `(id, contents)` entries of a body
pub(crate) fn entries(body: &str) -> Entries<'_> {
    Entries {
        rest: if body == EMPTY_BODY { "" } else { body },
        failed: body.is_empty(),
    }
}

/// Iterator over body entries, see [`entries`]
pub(crate) struct Entries<'a> {
    rest: &'a str,
    failed: bool,
}

impl<'a> Entries<'a> {
    fn tagged(&mut self, open: &str, close: &str) -> SheetResult<String> {
        let inner = self
            .rest
            .strip_prefix(open)
            .ok_or_else(|| SheetError::MalformedBody(format!("expected {}", open)))?;
        let (value, rest) = inner
            .split_once(close)
            .ok_or_else(|| SheetError::MalformedBody(format!("missing {}", close)))?;
        self.rest = rest;
        Ok(unescape(value))
    }

    fn next_entry(&mut self) -> SheetResult<(String, String)> {
        let id = self.tagged(ID_OPEN, ID_CLOSE)?;
        let contents = self.tagged(VAL_OPEN, VAL_CLOSE)?;
        Ok((id, contents))
    }
}

impl<'a> Iterator for Entries<'a> {
    type Item = SheetResult<(String, String)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            self.failed = false;
            self.rest = "";
            return Some(Err(SheetError::MalformedBody("empty body".into())));
        }
        if self.rest.is_empty() {
            return None;
        }

        let entry = self.next_entry();
        if entry.is_err() {
            self.rest = "";
        }
        Some(entry)
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SHA: ChecksumAlgorithm = ChecksumAlgorithm::Sha256;

    #[test]
    fn test_encode_empty() {
        let document = encode(std::iter::empty(), SHA);
        assert_eq!(
            document,
            format!("<HEAD>{}</HEAD><EMPTY>", SHA.digest(b"<EMPTY>"))
        );
        let body = verified_body(&document, SHA).unwrap();
        assert_eq!(entries(body).count(), 0);
    }

    #[test]
    fn test_encode_entries() {
        let document = encode([("A1", "10"), ("B1", "=A1<2")], SHA);
        let body = verified_body(&document, SHA).unwrap();
        assert_eq!(body, "<ID>A1</ID><VAL>10</VAL><ID>B1</ID><VAL>=A1&lt;2</VAL>");

        let parsed: Vec<_> = entries(body).map(Result::unwrap).collect();
        assert_eq!(
            parsed,
            vec![
                ("A1".to_string(), "10".to_string()),
                ("B1".to_string(), "=A1<2".to_string())
            ]
        );
    }

    #[test]
    fn test_escaping_round_trips() {
        let tricky = "</VAL>&lt;<ID>&amp;";
        let document = encode([("C3", tricky)], SHA);
        let body = verified_body(&document, SHA).unwrap();
        let (_, contents) = entries(body).next().unwrap().unwrap();
        assert_eq!(contents, tricky);
    }

    #[test]
    fn test_header_errors() {
        assert!(matches!(verified_body("", SHA), Err(SheetError::MissingHeader)));
        assert!(matches!(
            verified_body("<HEAD>abc<EMPTY>", SHA),
            Err(SheetError::MissingHeader)
        ));
        assert!(matches!(
            verified_body(" <HEAD>abc</HEAD><EMPTY>", SHA),
            Err(SheetError::MissingHeader)
        ));

        let document = encode(std::iter::empty(), SHA).to_uppercase();
        assert!(matches!(
            verified_body(&document, SHA),
            Err(SheetError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_malformed_bodies() {
        for body in [
            "",
            "<ID>A1</ID>",
            "<ID>A1</ID><VAL>1",
            "<VAL>1</VAL>",
            "<ID>A1</ID><VAL>1</VAL>junk",
        ] {
            assert!(
                entries(body).any(|entry| matches!(entry, Err(SheetError::MalformedBody(_)))),
                "{:?} should be malformed",
                body
            );
        }
    }
}
