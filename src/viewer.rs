//! Parser for the document tree a filing's main page embeds as script.
//!
//! The page declares one object per tree node and then assigns its
//! fields, one statement per line:
//!
//! ```text
//! var node3 = {};
//! node3['text'] = "3. 연결재무제표 주석";
//! node3['rcpNo'] = "20230515000123";
//! node3['dcmNo'] = "9198765";
//! ```
//!
//! Only field assignments of the form `IDENT['KEY'] = "VALUE";` are read.
//! Nodes are returned in the order their first assignment appears.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static ASSIGNMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*(node\d+)\s*\[\s*'([A-Za-z]+)'\s*\]\s*=\s*"((?:[^"\\]|\\.)*)"\s*;"#)
        .expect("valid assignment regex")
});

const FOOTNOTE_MARKER: &str = "주석";
const CONSOLIDATED_MARKER: &str = "연결";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewerNode {
    pub text: String,
    pub rcp_no: String,
    pub dcm_no: String,
    pub ele_id: String,
    pub offset: String,
    pub length: String,
    pub dtd: String,
}

impl ViewerNode {
    fn set(&mut self, key: &str, value: String) {
        match key {
            "text" => self.text = value,
            "rcpNo" => self.rcp_no = value,
            "dcmNo" => self.dcm_no = value,
            "eleId" => self.ele_id = value,
            "offset" => self.offset = value,
            "length" => self.length = value,
            "dtd" => self.dtd = value,
            _ => {}
        }
    }

    /// Query string parameters of the viewer page that renders this node.
    pub fn viewer_query(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("rcpNo", self.rcp_no.as_str()),
            ("dcmNo", self.dcm_no.as_str()),
            ("eleId", self.ele_id.as_str()),
            ("offset", self.offset.as_str()),
            ("length", self.length.as_str()),
            ("dtd", self.dtd.as_str()),
        ]
    }
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => {}
            }
        } else {
            out.push(c);
        }
    }
    out
}

pub fn parse_viewer_tree(script: &str) -> Vec<ViewerNode> {
    let mut order: Vec<&str> = Vec::new();
    let mut nodes: Vec<ViewerNode> = Vec::new();

    for caps in ASSIGNMENT_RE.captures_iter(script) {
        let (Some(ident), Some(key), Some(value)) = (caps.get(1), caps.get(2), caps.get(3)) else {
            continue;
        };

        let index = match order.iter().position(|name| *name == ident.as_str()) {
            Some(index) => index,
            None => {
                order.push(ident.as_str());
                nodes.push(ViewerNode::default());
                nodes.len() - 1
            }
        };

        nodes[index].set(key.as_str(), unescape(value.as_str()));
    }

    nodes
}

/// The notes node for the requested statement scope: consolidated notes
/// mention "연결", separate notes do not.
pub fn select_footnote_node(nodes: &[ViewerNode], consolidated: bool) -> Option<&ViewerNode> {
    nodes.iter().find(|node| {
        node.text.contains(FOOTNOTE_MARKER) && node.text.contains(CONSOLIDATED_MARKER) == consolidated
    })
}
