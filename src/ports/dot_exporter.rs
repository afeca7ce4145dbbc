//! Tree DOT Exporter
//!
//! Exports an `AstGraphDto` as Graphviz DOT, one node per tree node.

use std::io::Result;
use std::path::Path;

use crate::api::dto::{AstGraphDto, NodeFamily};

pub struct DotExporter;

impl DotExporter {
    /// Write the DOT rendering of `graph` to `path`.
    pub fn export(graph: &AstGraphDto, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, Self::to_dot(graph))
    }

    pub fn to_dot(graph: &AstGraphDto) -> String {
        let mut lines = Vec::new();

        lines.push("digraph Ast {".to_string());
        lines.push("    rankdir=TB;".to_string());
        lines.push("    node [fontname=\"Helvetica\", fontsize=12];".to_string());
        lines.push("    edge [fontname=\"Helvetica\", fontsize=10];".to_string());
        lines.push(String::new());

        for node in &graph.nodes {
            let (shape, color, style) = Self::node_style(node.family);
            lines.push(format!(
                "    \"{}\" [label=\"{}\\n{}\", shape={}, style=\"{}\", fillcolor=\"{}\", color=\"{}\"];",
                node.id,
                Self::escape_label(&node.kind),
                Self::escape_label(&node.label),
                shape,
                style,
                color,
                Self::border_color(node.family)
            ));
        }

        lines.push(String::new());

        for edge in &graph.edges {
            lines.push(format!(
                "    \"{}\" -> \"{}\" [label=\"{}\"];",
                edge.from,
                edge.to,
                Self::escape_label(&edge.label)
            ));
        }

        lines.push("}".to_string());
        lines.join("\n")
    }

    fn node_style(family: NodeFamily) -> (&'static str, &'static str, &'static str) {
        match family {
            NodeFamily::Statement => ("box", "#89b4fa", "filled,rounded"),
            NodeFamily::Expression => ("ellipse", "#a6e3a1", "filled"),
            NodeFamily::Missing => ("box", "#f38ba8", "filled,dashed"),
        }
    }

    fn border_color(family: NodeFamily) -> &'static str {
        match family {
            NodeFamily::Statement => "#1e66f5",
            NodeFamily::Expression => "#40a02b",
            NodeFamily::Missing => "#d20f39",
        }
    }

    fn escape_label(label: &str) -> String {
        label
            .replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('\n', "\\n")
    }
}
