//! Reply framing.
//!
//! Every reply line the modem sends is framed as
//!
//! ```text
//! [<node-id>] <text>\n
//! ```
//!
//! where `<node-id>` is the replying modem's own address. Operator tools
//! key on this exact shape; [`ReplyLine::parse`] reads it back.

use std::fmt::{self, Write};

/// Literal success reply.
pub const OK: &str = "OK";

/// Literal failure reply.
pub const ERROR: &str = "ERROR";

/// Writes framed reply lines for one node.
pub struct Responder<'a> {
    out: &'a mut dyn Write,
    node_id: u16,
}

impl<'a> Responder<'a> {
    /// Reply on `out` as node `node_id`.
    pub fn new(out: &'a mut dyn Write, node_id: u16) -> Self {
        Responder { out, node_id }
    }

    /// `[n] OK`
    pub fn ok(&mut self) {
        self.line(format_args!("{}", OK));
    }

    /// `[n] ERROR`
    pub fn error(&mut self) {
        self.line(format_args!("{}", ERROR));
    }

    /// `[n] <text>`
    pub fn line(&mut self, text: fmt::Arguments<'_>) {
        let _ = writeln!(self.out, "[{}] {}", self.node_id, text);
    }

    /// The node id replies are framed with.
    pub fn node_id(&self) -> u16 {
        self.node_id
    }

    /// Unframed access for collaborators that frame their own lines.
    pub fn raw(&mut self) -> &mut dyn Write {
        &mut *self.out
    }
}

/// Body of a reply line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyBody {
    /// `OK`
    Ok,
    /// `ERROR`
    Error,
    /// Anything else (a queried value, a report line...).
    Data(String),
}

/// A parsed reply line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyLine {
    /// Node that produced the reply.
    pub node_id: u16,
    /// What it said.
    pub body: ReplyBody,
}

impl ReplyLine {
    /// Parse one line (without the trailing newline).
    ///
    /// Returns `None` for lines that are not framed replies, such as
    /// echoed input.
    pub fn parse(line: &str) -> Option<ReplyLine> {
        let rest = line.trim_end_matches(['\r', '\n']).strip_prefix('[')?;
        let (id, body) = rest.split_once("] ")?;
        let node_id = id.parse().ok()?;
        let body = match body {
            OK => ReplyBody::Ok,
            ERROR => ReplyBody::Error,
            other => ReplyBody::Data(other.to_string()),
        };
        Some(ReplyLine { node_id, body })
    }

    /// True for `OK`.
    pub fn is_ok(&self) -> bool {
        self.body == ReplyBody::Ok
    }

    /// True for `ERROR`.
    pub fn is_error(&self) -> bool {
        self.body == ReplyBody::Error
    }

    /// The data text, if this is a data reply.
    pub fn as_data(&self) -> Option<&str> {
        match &self.body {
            ReplyBody::Data(s) => Some(s),
            _ => None,
        }
    }
}
