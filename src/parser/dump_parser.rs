use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::events::attributes::AttrError;
use quick_xml::Reader;
use tracing::{debug, warn};

use crate::parser::bounds::parse_bounds_or_default;
use crate::tree::{
    snapshot::{Snapshot, SnapshotBuilder},
    tree_model::{NodeFlags, NodeId, NodeInfo},
};

/// Element name of a widget in the dump. Every other element is structural.
pub const NODE_ELEMENT: &str = "node";

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("malformed dump: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed attribute: {0}")]
    Attribute(#[from] AttrError),

    #[error("widget element without a valid index attribute: {0:?}")]
    InvalidIndex(Option<String>),

    #[error("dump ended with {0} unclosed element(s)")]
    Unbalanced(usize),

    #[error("dump contains no widget elements")]
    NoWidgets,

    #[error("failed to read dump file: {0}")]
    Io(#[from] std::io::Error),
}

/// Parse a dump payload. Any failure is logged and yields `None`.
pub fn parse(payload: &str) -> Option<Snapshot> {
    match try_parse(payload) {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            warn!(error = %e, "discarding unparseable hierarchy dump");
            None
        }
    }
}

/// Parse a dump stored on disk. Read and parse failures yield `None`.
pub fn parse_file(path: impl AsRef<Path>) -> Option<Snapshot> {
    let path = path.as_ref();
    match try_parse_file(path) {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not load hierarchy dump");
            None
        }
    }
}

pub fn try_parse_file(path: impl AsRef<Path>) -> Result<Snapshot, ParseError> {
    let payload = std::fs::read_to_string(path)?;
    try_parse(&payload)
}

/// What an open element on the traversal stack stands for.
#[derive(Debug, Clone, Copy)]
enum Frame {
    Widget(NodeId),
    Structural,
    /// A second top-level widget or anything beneath one.
    Skipped,
}

pub fn try_parse(payload: &str) -> Result<Snapshot, ParseError> {
    let mut reader = Reader::from_str(payload);
    reader.config_mut().trim_text(true);

    let mut builder = SnapshotBuilder::new();
    let mut stack: Vec<Frame> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let frame = open_element(&e, &stack, &mut builder)?;
                stack.push(frame);
            }
            Event::Empty(e) => {
                open_element(&e, &stack, &mut builder)?;
            }
            Event::End(_) => {
                stack.pop();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(ParseError::Unbalanced(stack.len()));
    }

    builder.build().ok_or(ParseError::NoWidgets)
}

fn open_element(
    e: &BytesStart<'_>,
    stack: &[Frame],
    builder: &mut SnapshotBuilder,
) -> Result<Frame, ParseError> {
    if matches!(stack.last(), Some(Frame::Skipped)) {
        return Ok(Frame::Skipped);
    }

    if e.name().as_ref() != NODE_ELEMENT.as_bytes() {
        return Ok(Frame::Structural);
    }

    let info = read_node_info(e)?;
    let parent = stack.iter().rev().find_map(|f| match f {
        Frame::Widget(id) => Some(*id),
        _ => None,
    });

    let id = match parent {
        Some(parent) => builder.add_child(parent, info),
        None => builder.add_root(info),
    };

    Ok(match id {
        Some(id) => Frame::Widget(id),
        None => {
            debug!("ignoring additional top-level widget subtree");
            Frame::Skipped
        }
    })
}

fn read_node_info(e: &BytesStart<'_>) -> Result<NodeInfo, ParseError> {
    let mut info = NodeInfo::default();
    let mut flags = NodeFlags::default();
    let mut index: Option<String> = None;

    for attr in e.attributes() {
        let attr = attr?;
        let value = attr.unescape_value()?.into_owned();
        match attr.key.as_ref() {
            b"NAF" => flags.not_accessibility_friendly = parse_flag(&value),
            b"index" => index = Some(value),
            b"text" => info.text = value,
            b"class" => info.class_name = value,
            b"package" => info.package = value,
            b"content-desc" => info.content_desc = value,
            b"checkable" => flags.checkable = parse_flag(&value),
            b"checked" => flags.checked = parse_flag(&value),
            b"clickable" => flags.clickable = parse_flag(&value),
            b"enabled" => flags.enabled = parse_flag(&value),
            b"focusable" => flags.focusable = parse_flag(&value),
            b"focused" => flags.focused = parse_flag(&value),
            b"scrollable" => flags.scrollable = parse_flag(&value),
            b"long-clickable" => flags.long_clickable = parse_flag(&value),
            b"password" => flags.password = parse_flag(&value),
            b"selected" => flags.selected = parse_flag(&value),
            b"bounds" => info.bounds = parse_bounds_or_default(&value),
            _ => {}
        }
    }

    info.index = match index.as_deref().map(|v| v.trim().parse::<u32>()) {
        Some(Ok(i)) => i,
        _ => return Err(ParseError::InvalidIndex(index)),
    };
    info.flags = flags;
    Ok(info)
}

fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}
