//! Pattern compilation.
//!
//! # Responsibilities
//! - Normalize the leading slash
//! - Substitute named expressions
//! - Parse segments: literals, `:name`, `:name-(regex)`, `:name-(a|b)`, trailing `seg*`
//! - Expand enumerations into one concrete route per alternative
//! - Assemble an anchored regex, or an exact path when nothing is captured
//!
//! # Design Decisions
//! - Enumerations are detected before generic parameters (their syntax is a superset)
//! - Parameters use named groups, so groups inside user regexes never shift captures
//! - The wildcard is always bound to `*` and never restricted to one segment
//! - A shape collapses parameters to placeholders; it drives conflict detection

use std::fmt::Write as _;

use regex::Regex;

use crate::error::RouteError;
use crate::routing::expressions::NamedExpressions;
use crate::routing::router::RouterOptions;

/// Name every wildcard capture is bound to.
pub const WILDCARD: &str = "*";

const SEGMENT: &str = "[^/]+";

/// Parameter values known at registration time (from enum expansion).
pub type Bindings = Vec<(String, String)>;

/// One segment of a route shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeSegment {
    /// Fully literal segment, compared by text.
    Literal(String),
    /// Segment holding at least one capture.
    Dynamic(Vec<ShapePiece>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapePiece {
    Text(String),
    Param,
    Wildcard,
}

/// Pattern structure with parameter names and constraints erased.
///
/// `/a/:x/b` and `/a/:y-(\d+)/b` share a shape; `/a/b` and `/x/y` do not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    rooted: bool,
    segments: Vec<ShapeSegment>,
}

impl Shape {
    pub fn segments(&self) -> &[ShapeSegment] {
        &self.segments
    }
}

/// How a compiled route is matched against a request path.
#[derive(Debug, Clone)]
pub enum Matchable {
    /// Literal string equality.
    Exact(String),
    /// Anchored regex; `params` names the captures in order.
    Pattern { regex: Regex, params: Vec<String> },
}

impl Matchable {
    pub fn as_str(&self) -> &str {
        match self {
            Matchable::Exact(path) => path,
            Matchable::Pattern { regex, .. } => regex.as_str(),
        }
    }
}

/// One concrete route produced from a raw pattern.
#[derive(Debug, Clone)]
pub struct CompiledRoute {
    /// Concrete pattern after substitution and expansion, e.g. `/img/png`.
    pub source: String,
    pub shape: Shape,
    pub fixed: Bindings,
    pub form: Matchable,
}

impl CompiledRoute {
    pub fn is_exact(&self) -> bool {
        matches!(self.form, Matchable::Exact(_))
    }
}

/// Parsed but not yet expanded pattern element.
#[derive(Debug, Clone)]
enum Token {
    Literal(String),
    Param { name: String, regex: Option<String> },
    Enum { name: String, values: Vec<String> },
    Wildcard { prefix: String },
}

/// Pattern element after enum expansion.
#[derive(Debug, Clone)]
enum Piece {
    Literal(String),
    Param { name: String, regex: Option<String> },
    Wildcard { prefix: String },
}

impl Token {
    fn into_piece(self) -> Option<Piece> {
        match self {
            Token::Literal(text) => Some(Piece::Literal(text)),
            Token::Param { name, regex } => Some(Piece::Param { name, regex }),
            Token::Wildcard { prefix } => Some(Piece::Wildcard { prefix }),
            Token::Enum { .. } => None,
        }
    }
}

struct Expansion {
    segments: Vec<Vec<Piece>>,
    fixed: Bindings,
}

/// Compile a raw pattern into its concrete routes.
///
/// Returns one route per enum alternative combination, in declaration order.
pub fn compile(
    pattern: &str,
    options: &RouterOptions,
    expressions: &NamedExpressions,
) -> Result<Vec<CompiledRoute>, RouteError> {
    let normalized = if options.ignore_leading_slash && !pattern.starts_with('/') {
        format!("/{pattern}")
    } else {
        pattern.to_string()
    };
    let substituted = expressions.substitute(&normalized)?;

    let (rooted, body) = match substituted.strip_prefix('/') {
        Some(body) => (true, body),
        None => (false, substituted.as_str()),
    };

    let raw_segments = split_segments(body).map_err(|reason| invalid(&substituted, reason))?;
    let last = raw_segments.len() - 1;
    let tokens = raw_segments
        .iter()
        .enumerate()
        .map(|(i, seg)| parse_segment(seg, i == last, &substituted))
        .collect::<Result<Vec<_>, _>>()?;

    let mut expansions = Vec::new();
    expand(tokens, Vec::new(), &mut expansions);

    expansions
        .into_iter()
        .map(|expansion| assemble(rooted, expansion, options))
        .collect()
}

fn invalid(pattern: &str, reason: impl Into<String>) -> RouteError {
    RouteError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: reason.into(),
    }
}

fn is_ident(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// What one byte did to the group nesting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Open,
    Close,
    Plain,
    /// Escaped, or inside a character class.
    Quoted,
}

/// Group and character-class nesting of a pattern, fed one byte at a time.
///
/// Escapes and classes only count inside parentheses; outside them every
/// byte is literal path text.
#[derive(Debug, Default)]
struct Nesting {
    depth: usize,
    class: usize,
    class_start: usize,
    escaped: bool,
}

impl Nesting {
    fn step(&mut self, bytes: &[u8], i: usize) -> Result<Step, &'static str> {
        if self.escaped {
            self.escaped = false;
            return Ok(Step::Quoted);
        }
        let b = bytes[i];
        if self.depth == 0 {
            return match b {
                b'(' => {
                    self.depth = 1;
                    Ok(Step::Open)
                }
                b')' => Err("unbalanced ')'"),
                _ => Ok(Step::Plain),
            };
        }
        if b == b'\\' {
            self.escaped = true;
            return Ok(Step::Quoted);
        }
        if self.class > 0 {
            match b {
                b'[' => {
                    self.class += 1;
                    self.class_start = i + 1;
                }
                // `]` right after `[` or `[^` is a member, not the end
                b']' if !self.leading_bracket(bytes, i) => self.class -= 1,
                _ => {}
            }
            return Ok(Step::Quoted);
        }
        match b {
            b'[' => {
                self.class = 1;
                self.class_start = i + 1;
                Ok(Step::Quoted)
            }
            b'(' => {
                self.depth += 1;
                Ok(Step::Open)
            }
            b')' => {
                self.depth -= 1;
                Ok(Step::Close)
            }
            _ => Ok(Step::Plain),
        }
    }

    fn leading_bracket(&self, bytes: &[u8], i: usize) -> bool {
        i == self.class_start || (i == self.class_start + 1 && bytes[self.class_start] == b'^')
    }

    fn finish(&self) -> Result<(), &'static str> {
        if self.class > 0 {
            Err("unclosed '['")
        } else if self.depth > 0 {
            Err("unbalanced '('")
        } else {
            Ok(())
        }
    }
}

/// Split on `/` outside parentheses.
fn split_segments(body: &str) -> Result<Vec<&str>, &'static str> {
    let bytes = body.as_bytes();
    let mut segments = Vec::new();
    let mut nesting = Nesting::default();
    let mut start = 0;

    for i in 0..bytes.len() {
        let step = nesting.step(bytes, i)?;
        if step == Step::Plain && nesting.depth == 0 && bytes[i] == b'/' {
            segments.push(&body[start..i]);
            start = i + 1;
        }
    }
    nesting.finish()?;
    segments.push(&body[start..]);
    Ok(segments)
}

/// Index of the `)` closing the `(` at `open`.
fn closing_paren(seg: &str, open: usize) -> Option<usize> {
    let bytes = seg.as_bytes();
    let mut nesting = Nesting::default();
    for i in open..bytes.len() {
        if nesting.step(bytes, i).ok()? == Step::Close && nesting.depth == 0 {
            return Some(i);
        }
    }
    None
}

fn parse_segment(seg: &str, last: bool, pattern: &str) -> Result<Vec<Token>, RouteError> {
    if let Some(prefix) = seg.strip_suffix('*') {
        if !prefix.contains([':', '(', ')']) {
            if !last {
                return Err(invalid(pattern, "wildcard must be the last segment"));
            }
            return Ok(vec![Token::Wildcard {
                prefix: prefix.to_string(),
            }]);
        }
    }

    let bytes = seg.as_bytes();
    let mut tokens = Vec::new();
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b':' {
            i += 1;
            continue;
        }
        if literal_start < i {
            tokens.push(Token::Literal(seg[literal_start..i].to_string()));
        }

        let name_start = i + 1;
        let mut name_end = name_start;
        while name_end < bytes.len() && is_ident(bytes[name_end]) {
            name_end += 1;
        }
        if name_end == name_start {
            return Err(invalid(pattern, "missing parameter name after ':'"));
        }
        let name = seg[name_start..name_end].to_string();

        let mut open = name_end;
        if bytes.get(open) == Some(&b'-') && bytes.get(open + 1) == Some(&b'(') {
            open += 1;
        }

        if bytes.get(open) == Some(&b'(') {
            let close = closing_paren(seg, open)
                .ok_or_else(|| invalid(pattern, format!("unclosed constraint for :{name}")))?;
            tokens.push(constraint_token(name, &seg[open + 1..close], pattern)?);
            i = close + 1;
        } else {
            tokens.push(Token::Param { name, regex: None });
            i = name_end;
        }
        literal_start = i;
    }

    if literal_start < bytes.len() || tokens.is_empty() {
        tokens.push(Token::Literal(seg[literal_start..].to_string()));
    }
    Ok(tokens)
}

/// `(a|b|c)` of plain word characters is an enumeration; anything else is a regex.
fn constraint_token(name: String, body: &str, pattern: &str) -> Result<Token, RouteError> {
    if body.is_empty() {
        return Err(invalid(pattern, format!("empty constraint for :{name}")));
    }
    if !body.bytes().all(|b| is_ident(b) || b == b'|') {
        return Ok(Token::Param {
            name,
            regex: Some(body.to_string()),
        });
    }

    let values: Vec<String> = body.split('|').map(str::to_string).collect();
    if values.iter().any(String::is_empty) {
        return Err(invalid(pattern, format!("empty alternative in :{name}")));
    }
    Ok(Token::Enum { name, values })
}

fn first_enum(segments: &[Vec<Token>]) -> Option<(usize, usize, String, Vec<String>)> {
    segments.iter().enumerate().find_map(|(s, tokens)| {
        tokens.iter().enumerate().find_map(|(t, token)| match token {
            Token::Enum { name, values } => Some((s, t, name.clone(), values.clone())),
            _ => None,
        })
    })
}

/// Depth-first expansion of every enumeration, alternatives in declared order.
fn expand(segments: Vec<Vec<Token>>, fixed: Bindings, out: &mut Vec<Expansion>) {
    let Some((s, t, name, values)) = first_enum(&segments) else {
        let segments = segments
            .into_iter()
            .map(|tokens| tokens.into_iter().filter_map(Token::into_piece).collect())
            .collect();
        out.push(Expansion { segments, fixed });
        return;
    };

    for value in values {
        let mut next = segments.clone();
        next[s][t] = Token::Literal(value.clone());

        let mut bindings = fixed.clone();
        match bindings.iter_mut().find(|(n, _)| *n == name) {
            Some(binding) => binding.1 = value,
            None => bindings.push((name.clone(), value)),
        }
        expand(next, bindings, out);
    }
}

fn render(rooted: bool, segments: &[Vec<Piece>]) -> String {
    let mut out = String::new();
    if rooted {
        out.push('/');
    }
    for (i, pieces) in segments.iter().enumerate() {
        if i > 0 {
            out.push('/');
        }
        for piece in pieces {
            match piece {
                Piece::Literal(text) => out.push_str(text),
                Piece::Param { name, regex: None } => {
                    let _ = write!(out, ":{name}");
                }
                Piece::Param {
                    name,
                    regex: Some(regex),
                } => {
                    let _ = write!(out, ":{name}-({regex})");
                }
                Piece::Wildcard { prefix } => {
                    let _ = write!(out, "{prefix}*");
                }
            }
        }
    }
    out
}

fn shape_of(rooted: bool, segments: &[Vec<Piece>], ignore_trailing_slash: bool) -> Shape {
    let mut shape: Vec<ShapeSegment> = segments
        .iter()
        .map(|pieces| {
            let mut out: Vec<ShapePiece> = Vec::new();
            for piece in pieces {
                match piece {
                    Piece::Literal(text) => match out.last_mut() {
                        Some(ShapePiece::Text(prev)) => prev.push_str(text),
                        _ => out.push(ShapePiece::Text(text.clone())),
                    },
                    Piece::Param { .. } => out.push(ShapePiece::Param),
                    Piece::Wildcard { prefix } => {
                        if !prefix.is_empty() {
                            out.push(ShapePiece::Text(prefix.clone()));
                        }
                        out.push(ShapePiece::Wildcard);
                    }
                }
            }
            match out.as_slice() {
                [] => ShapeSegment::Literal(String::new()),
                [ShapePiece::Text(text)] => ShapeSegment::Literal(text.clone()),
                _ => ShapeSegment::Dynamic(out),
            }
        })
        .collect();

    if ignore_trailing_slash
        && shape.len() > 1
        && matches!(shape.last(), Some(ShapeSegment::Literal(text)) if text.is_empty())
    {
        shape.pop();
    }
    Shape {
        rooted,
        segments: shape,
    }
}

fn assemble(
    rooted: bool,
    expansion: Expansion,
    options: &RouterOptions,
) -> Result<CompiledRoute, RouteError> {
    let Expansion { segments, fixed } = expansion;
    let source = render(rooted, &segments);
    let shape = shape_of(rooted, &segments, options.ignore_trailing_slash);

    let dynamic = segments
        .iter()
        .flatten()
        .any(|piece| !matches!(piece, Piece::Literal(_)));
    if !dynamic {
        return Ok(CompiledRoute {
            form: Matchable::Exact(source.clone()),
            source,
            shape,
            fixed,
        });
    }

    let mut expr = String::from("^");
    if rooted {
        expr.push('/');
    }
    let mut params = Vec::new();
    for (i, pieces) in segments.iter().enumerate() {
        if i > 0 {
            expr.push('/');
        }
        for piece in pieces {
            let group = params.len();
            match piece {
                Piece::Literal(text) => expr.push_str(&regex::escape(text)),
                Piece::Param { name, regex } => {
                    params.push(name.clone());
                    let inner = regex.as_deref().unwrap_or(SEGMENT);
                    let _ = write!(expr, "(?P<p{group}>{inner})");
                }
                Piece::Wildcard { prefix } => {
                    params.push(WILDCARD.to_string());
                    expr.push_str(&regex::escape(prefix));
                    let _ = write!(expr, "(?P<p{group}>.*)");
                }
            }
        }
    }

    if options.ignore_trailing_slash {
        if expr.ends_with('/') {
            expr.push('?');
        } else {
            expr.push_str("/?");
        }
    }
    expr.push('$');

    let regex = Regex::new(&expr).map_err(|e| RouteError::InvalidRegex {
        pattern: source.clone(),
        reason: e.to_string(),
    })?;

    Ok(CompiledRoute {
        source,
        shape,
        fixed,
        form: Matchable::Pattern { regex, params },
    })
}
