//! SVG rendering of the relationship graph.
//!
//! The subject is drawn in the middle with the leaves spread evenly on a
//! circle around it. Output depends only on the graph, so two renders of the
//! same record are identical.

use super::RelationGraph;
use crate::report::escape_html;
use base64::Engine;
use std::f64::consts::PI;

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 600.0;
const RADIUS: f64 = 220.0;
const NODE_RADIUS: f64 = 14.0;

/// Render the graph as a standalone SVG document.
pub fn render_svg(graph: &RelationGraph, title: &str) -> String {
    let (cx, cy) = (WIDTH / 2.0, HEIGHT / 2.0 + 15.0);
    let leaves: Vec<_> = graph.leaves().collect();
    let count = leaves.len().max(1) as f64;

    let positions: Vec<(f64, f64)> = (0..leaves.len())
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / count - PI / 2.0;
            (cx + RADIUS * angle.cos(), cy + RADIUS * angle.sin())
        })
        .collect();

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" font-family=\"sans-serif\">\n",
        w = WIDTH,
        h = HEIGHT
    ));
    svg.push_str(&format!(
        "<text x=\"{:.1}\" y=\"24\" text-anchor=\"middle\" font-size=\"16\">{}</text>\n",
        cx,
        escape_html(title)
    ));

    for (x, y) in &positions {
        svg.push_str(&format!(
            "<line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"#999\" stroke-opacity=\"0.5\"/>\n",
            cx, cy, x, y
        ));
    }

    let center = graph.center();
    svg.push_str(&format!(
        "<circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"{:.1}\" fill=\"{}\"/>\n",
        cx,
        cy,
        NODE_RADIUS * 1.5,
        center.kind.color()
    ));
    svg.push_str(&format!(
        "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"12\">{}</text>\n",
        cx,
        cy + NODE_RADIUS * 1.5 + 14.0,
        escape_html(&center.label)
    ));

    for (node, (x, y)) in leaves.iter().zip(&positions) {
        svg.push_str(&format!(
            "<circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"{:.1}\" fill=\"{}\" fill-opacity=\"0.8\"><title>{}</title></circle>\n",
            x,
            y,
            NODE_RADIUS,
            node.kind.color(),
            node.kind
        ));
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"10\">{}</text>\n",
            x,
            y + NODE_RADIUS + 12.0,
            escape_html(&node.label)
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

/// Encode an SVG document as a `data:` URI for `<img src>`.
pub fn svg_data_uri(svg: &str) -> String {
    format!(
        "data:image/svg+xml;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(svg.as_bytes())
    )
}
