//! Minimal N-Triples codec.
//!
//! Parses the line-based N-Triples syntax into [`Triple`]s and writes triples
//! back out one statement per line, in sorted order.

use cairn_core::{CairnError, CairnResult, Term, Triple};
use std::collections::BTreeSet;
use std::iter::Peekable;
use std::str::Chars;

/// Media type of N-Triples documents.
pub const CONTENT_TYPE: &str = "application/n-triples";

/// Parses an N-Triples document.
///
/// # Errors
///
/// `Validation` on the first malformed line, naming its line number.
pub fn parse(document: &str) -> CairnResult<BTreeSet<Triple>> {
    let mut triples = BTreeSet::new();
    for (index, line) in document.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let triple = parse_line(line)
            .map_err(|message| CairnError::validation(format!("line {}: {message}", index + 1)))?;
        triple.validate()?;
        triples.insert(triple);
    }
    Ok(triples)
}

/// Serializes triples, one statement per line, in sorted order.
#[must_use]
pub fn serialize<'a>(triples: impl IntoIterator<Item = &'a Triple>) -> String {
    let sorted: BTreeSet<&Triple> = triples.into_iter().collect();
    let mut document = String::new();
    for triple in sorted {
        document.push_str(&triple.to_string());
        document.push('\n');
    }
    document
}

fn parse_line(line: &str) -> Result<Triple, String> {
    let mut chars = line.chars().peekable();
    let subject = parse_term(&mut chars)?;
    let predicate = parse_term(&mut chars)?;
    let object = parse_term(&mut chars)?;

    skip_whitespace(&mut chars);
    if chars.next() != Some('.') {
        return Err("expected '.' after object".to_string());
    }
    skip_whitespace(&mut chars);
    match chars.next() {
        None | Some('#') => Ok(Triple::new(subject, predicate, object)),
        Some(other) => Err(format!("unexpected '{other}' after '.'")),
    }
}

fn skip_whitespace(chars: &mut Peekable<Chars<'_>>) {
    while chars.next_if(|c| c.is_whitespace()).is_some() {}
}

fn parse_term(chars: &mut Peekable<Chars<'_>>) -> Result<Term, String> {
    skip_whitespace(chars);
    match chars.next() {
        Some('<') => parse_iri(chars).map(Term::NamedNode),
        Some('_') => {
            if chars.next() != Some(':') {
                return Err("expected ':' in blank node".to_string());
            }
            let mut label = String::new();
            while let Some(c) = chars.next_if(|c| !c.is_whitespace() && *c != '.') {
                label.push(c);
            }
            Ok(Term::BlankNode(label))
        }
        Some('"') => parse_literal(chars),
        Some(other) => Err(format!("unexpected '{other}' at start of term")),
        None => Err("unexpected end of line".to_string()),
    }
}

fn parse_iri(chars: &mut Peekable<Chars<'_>>) -> Result<String, String> {
    let mut iri = String::new();
    for c in chars.by_ref() {
        match c {
            '>' => return Ok(iri),
            c if c.is_whitespace() => return Err("whitespace in IRI".to_string()),
            c => iri.push(c),
        }
    }
    Err("unterminated IRI".to_string())
}

fn parse_literal(chars: &mut Peekable<Chars<'_>>) -> Result<Term, String> {
    let mut value = String::new();
    loop {
        match chars.next() {
            Some('"') => break,
            Some('\\') => match chars.next() {
                Some('"') => value.push('"'),
                Some('\\') => value.push('\\'),
                Some('n') => value.push('\n'),
                Some('r') => value.push('\r'),
                Some('t') => value.push('\t'),
                Some(other) => return Err(format!("unsupported escape '\\{other}'")),
                None => return Err("unterminated escape".to_string()),
            },
            Some(c) => value.push(c),
            None => return Err("unterminated literal".to_string()),
        }
    }

    let mut language = None;
    let mut datatype = None;
    if chars.next_if_eq(&'@').is_some() {
        let mut tag = String::new();
        while let Some(c) = chars.next_if(|c| c.is_ascii_alphanumeric() || *c == '-') {
            tag.push(c);
        }
        if tag.is_empty() {
            return Err("empty language tag".to_string());
        }
        language = Some(tag);
    } else if chars.next_if_eq(&'^').is_some() {
        if chars.next() != Some('^') || chars.next() != Some('<') {
            return Err("expected '^^<' before datatype".to_string());
        }
        datatype = Some(parse_iri(chars)?);
    }

    Ok(Term::Literal {
        value,
        datatype,
        language,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_term_kinds() {
        let document = r#"
# comment
<http://ex/s> <http://ex/p> <http://ex/o> .
_:b0 <http://ex/p> "plain" .
<http://ex/s> <http://ex/p> "chat"@fr .
<http://ex/s> <http://ex/p> "1"^^<http://www.w3.org/2001/XMLSchema#integer> .
<http://ex/s> <http://ex/p> "say \"hi\"\n" .
"#;
        let triples = parse(document).unwrap();
        assert_eq!(triples.len(), 5);
        assert!(triples.contains(&Triple::new(
            Term::blank("b0"),
            Term::named("http://ex/p"),
            Term::literal("plain"),
        )));
        assert!(triples.contains(&Triple::new(
            Term::named("http://ex/s"),
            Term::named("http://ex/p"),
            Term::literal("say \"hi\"\n"),
        )));
    }

    #[test]
    fn test_serialize_then_parse_is_stable() {
        let document = "<http://ex/b> <http://ex/p> \"x\"@en .\n<http://ex/a> <http://ex/p> _:n .\n";
        let triples = parse(document).unwrap();
        let written = serialize(&triples);
        assert!(written.starts_with("<http://ex/a>"));
        assert_eq!(parse(&written).unwrap(), triples);
    }

    #[test]
    fn test_errors_name_the_line() {
        let err = parse("<http://ex/s> <http://ex/p> <http://ex/o> .\n<http://ex/s> <http://ex/p> .")
            .unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_missing_dot() {
        assert!(parse("<http://ex/s> <http://ex/p> <http://ex/o>").is_err());
    }

    #[test]
    fn test_literal_subject_rejected() {
        assert!(parse("\"s\" <http://ex/p> <http://ex/o> .").is_err());
    }
}
