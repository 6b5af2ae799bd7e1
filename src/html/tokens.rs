use std::ops::Range;

/// Elements whose body is not markup: everything up to the matching end tag
/// is kept as one raw token.
const RAW_TEXT: &[&str] = &["script", "style", "textarea", "title"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    /// Lowercased attribute name.
    pub name: String,
    /// Raw value as written (entities not decoded), `None` for `<input disabled>`.
    pub value: Option<String>,
    /// The whole `name="value"` text.
    pub span: Range<usize>,
    /// Value bytes only, inside the quotes when quoted.
    pub value_span: Option<Range<usize>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Text(Range<usize>),
    RawText(Range<usize>),
    Comment {
        body: Range<usize>,
        span: Range<usize>,
    },
    StartTag {
        name: String,
        attrs: Vec<Attr>,
        self_closing: bool,
        span: Range<usize>,
    },
    EndTag {
        name: String,
        span: Range<usize>,
    },
    Declaration(Range<usize>),
}

impl Token {
    pub fn span(&self) -> Range<usize> {
        match self {
            Token::Text(r) | Token::RawText(r) | Token::Declaration(r) => r.clone(),
            Token::Comment { span, .. }
            | Token::StartTag { span, .. }
            | Token::EndTag { span, .. } => span.clone(),
        }
    }
}

/// Split an HTML document into spanned tokens. Never fails: anything that
/// does not parse as a tag stays text.
pub fn tokenize(src: &str) -> Vec<Token> {
    let bytes = src.as_bytes();
    let mut tokens = Vec::new();
    let mut text_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'<' {
            i += 1;
            continue;
        }

        let rest = &src[i..];
        let parsed = if rest.starts_with("<!--") {
            Some(comment(src, i))
        } else if rest.starts_with("</") {
            end_tag(src, i)
        } else if rest.starts_with("<!") || rest.starts_with("<?") {
            Some(declaration(src, i))
        } else if bytes.get(i + 1).is_some_and(u8::is_ascii_alphabetic) {
            start_tag(src, i)
        } else {
            None
        };

        let Some((token, end)) = parsed else {
            i += 1;
            continue;
        };

        if text_start < i {
            tokens.push(Token::Text(text_start..i));
        }

        let raw_name = match &token {
            Token::StartTag { name, .. } if RAW_TEXT.contains(&name.as_str()) => Some(name.clone()),
            _ => None,
        };
        tokens.push(token);
        i = end;
        text_start = end;

        // ── Raw text body: runs to the matching end tag ──
        if let Some(name) = raw_name {
            let needle = format!("</{}", name);
            let stop = src[end..]
                .to_ascii_lowercase()
                .find(&needle)
                .map(|p| end + p)
                .unwrap_or(src.len());
            if end < stop {
                tokens.push(Token::RawText(end..stop));
            }
            i = stop;
            text_start = stop;
        }
    }

    if text_start < bytes.len() {
        tokens.push(Token::Text(text_start..bytes.len()));
    }

    tokens
}

fn comment(src: &str, start: usize) -> (Token, usize) {
    let body_start = start + 4;
    match src[body_start..].find("-->") {
        Some(p) => {
            let end = body_start + p + 3;
            (
                Token::Comment {
                    body: body_start..body_start + p,
                    span: start..end,
                },
                end,
            )
        }
        // Unterminated comment swallows the rest of the document, as browsers do.
        None => (
            Token::Comment {
                body: body_start..src.len(),
                span: start..src.len(),
            },
            src.len(),
        ),
    }
}

fn declaration(src: &str, start: usize) -> (Token, usize) {
    let end = src[start..]
        .find('>')
        .map(|p| start + p + 1)
        .unwrap_or(src.len());
    (Token::Declaration(start..end), end)
}

fn end_tag(src: &str, start: usize) -> Option<(Token, usize)> {
    let bytes = src.as_bytes();
    let name_start = start + 2;
    let name_end = scan_name(bytes, name_start);
    if name_end == name_start {
        return None;
    }
    let gt = src[name_end..].find('>')? + name_end;
    Some((
        Token::EndTag {
            name: src[name_start..name_end].to_ascii_lowercase(),
            span: start..gt + 1,
        },
        gt + 1,
    ))
}

fn start_tag(src: &str, start: usize) -> Option<(Token, usize)> {
    let bytes = src.as_bytes();
    let name_end = scan_name(bytes, start + 1);
    let name = src[start + 1..name_end].to_ascii_lowercase();
    let mut attrs = Vec::new();
    let mut pos = name_end;

    loop {
        pos = skip_ws(bytes, pos);
        match bytes.get(pos)? {
            b'>' => {
                return Some((
                    Token::StartTag {
                        name,
                        attrs,
                        self_closing: false,
                        span: start..pos + 1,
                    },
                    pos + 1,
                ));
            }
            b'/' if bytes.get(pos + 1) == Some(&b'>') => {
                return Some((
                    Token::StartTag {
                        name,
                        attrs,
                        self_closing: true,
                        span: start..pos + 2,
                    },
                    pos + 2,
                ));
            }
            b'/' | b'=' => {
                pos += 1;
                continue;
            }
            _ => {}
        }

        let (attr, next) = attribute(src, pos)?;
        attrs.push(attr);
        pos = next;
    }
}

/// Parse one attribute starting at `start`. Returns `None` on an unterminated
/// quoted value, which makes the whole tag fall back to text.
fn attribute(src: &str, start: usize) -> Option<(Attr, usize)> {
    let bytes = src.as_bytes();
    let mut pos = start;
    while pos < bytes.len()
        && !bytes[pos].is_ascii_whitespace()
        && !matches!(bytes[pos], b'=' | b'>' | b'/')
    {
        pos += 1;
    }
    let name = src[start..pos].to_ascii_lowercase();
    let name_end = pos;

    let after = skip_ws(bytes, pos);
    if bytes.get(after) != Some(&b'=') {
        return Some((
            Attr {
                name,
                value: None,
                span: start..name_end,
                value_span: None,
            },
            name_end,
        ));
    }

    let vpos = skip_ws(bytes, after + 1);
    let (value_span, end) = match *bytes.get(vpos)? {
        q @ (b'"' | b'\'') => {
            let close = src[vpos + 1..].find(q as char)? + vpos + 1;
            (vpos + 1..close, close + 1)
        }
        _ => {
            let mut p = vpos;
            while p < bytes.len() && !bytes[p].is_ascii_whitespace() && bytes[p] != b'>' {
                p += 1;
            }
            (vpos..p, p)
        }
    };

    Some((
        Attr {
            name,
            value: Some(src[value_span.clone()].to_string()),
            span: start..end,
            value_span: Some(value_span),
        },
        end,
    ))
}

fn scan_name(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && (bytes[pos].is_ascii_alphanumeric() || matches!(bytes[pos], b'-' | b':' | b'_')) {
        pos += 1;
    }
    pos
}

fn skip_ws(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
        pos += 1;
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start_tags(src: &str) -> Vec<(String, Vec<Attr>)> {
        tokenize(src)
            .into_iter()
            .filter_map(|t| match t {
                Token::StartTag { name, attrs, .. } => Some((name, attrs)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn spans_cover_the_document() {
        let src = "<!DOCTYPE html><p class=\"a\">Hi <b>there</b></p><!-- Hero -->tail";
        let tokens = tokenize(src);
        let mut pos = 0;
        for t in &tokens {
            assert_eq!(t.span().start, pos, "gap before {:?}", t);
            pos = t.span().end;
        }
        assert_eq!(pos, src.len());
    }

    #[test]
    fn attributes_any_order_and_quoting() {
        let src = r#"<img alt='Team photo' data-x=1 src="/images/team.jpg" hidden>"#;
        let tags = start_tags(src);
        let (name, attrs) = &tags[0];
        assert_eq!(name, "img");
        let names: Vec<&str> = attrs.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["alt", "data-x", "src", "hidden"]);
        assert_eq!(attrs[0].value.as_deref(), Some("Team photo"));
        assert_eq!(attrs[1].value.as_deref(), Some("1"));
        assert_eq!(attrs[3].value, None);
        let src_attr = &attrs[2];
        assert_eq!(&src[src_attr.value_span.clone().unwrap()], "/images/team.jpg");
    }

    #[test]
    fn comment_body() {
        let src = "a<!--  Hero Section -->b";
        let tokens = tokenize(src);
        match &tokens[1] {
            Token::Comment { body, span } => {
                assert_eq!(&src[body.clone()], "  Hero Section ");
                assert_eq!(&src[span.clone()], "<!--  Hero Section -->");
            }
            other => panic!("expected comment, got {:?}", other),
        }
    }

    #[test]
    fn script_body_is_raw() {
        let src = "<script>if (a < b) { x = '<p class=\"q\">'; }</script><p>ok</p>";
        let tokens = tokenize(src);
        assert!(matches!(&tokens[1], Token::RawText(r) if src[r.clone()].contains("<p class")));
        let ps = start_tags(src).into_iter().filter(|(n, _)| n == "p").count();
        assert_eq!(ps, 1);
    }

    #[test]
    fn stray_angle_bracket_is_text() {
        let src = "<p>1 < 2 and 3 <= 4</p>";
        let tokens = tokenize(src);
        assert_eq!(tokens.len(), 3);
        assert!(matches!(&tokens[1], Token::Text(r) if &src[r.clone()] == "1 < 2 and 3 <= 4"));
    }

    #[test]
    fn self_closing_and_uppercase() {
        let tags = start_tags("<BR/><Img SRC=\"a.png\" ALT=\"\"/>");
        assert_eq!(tags[0].0, "br");
        assert_eq!(tags[1].0, "img");
        assert_eq!(tags[1].1[0].name, "src");
        assert_eq!(tags[1].1[1].value.as_deref(), Some(""));
        assert!(matches!(tokenize("<div/>")[0], Token::StartTag { self_closing: true, .. }));
    }

    #[test]
    fn unterminated_tag_falls_back_to_text() {
        let src = "<p class=\"open>never closed";
        let tokens = tokenize(src);
        assert_eq!(tokens, vec![Token::Text(0..src.len())]);
    }
}
