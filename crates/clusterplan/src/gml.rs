//! GML dump of a clustered planar copy, for inspecting the result in a graph viewer.

use crate::ClusterPlanRep;
use clusterplan_graph::{EdgeType, NodeId, NodeType};
use rustc_hash::FxHashMap;
use std::fmt::Write as _;

/// Optional node positions and labels for the GML output. Nodes without a position are drawn at
/// the origin.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    positions: FxHashMap<NodeId, (f64, f64)>,
    labels: FxHashMap<NodeId, String>,
}

impl Layout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_position(&mut self, v: NodeId, x: f64, y: f64) {
        self.positions.insert(v, (x, y));
    }

    pub fn set_label(&mut self, v: NodeId, label: impl Into<String>) {
        self.labels.insert(v, label.into());
    }

    pub fn position(&self, v: NodeId) -> (f64, f64) {
        self.positions.get(&v).copied().unwrap_or((0.0, 0.0))
    }

    pub fn label(&self, v: NodeId) -> Option<&str> {
        self.labels.get(&v).map(String::as_str)
    }
}

const EXPANDER_FILL: &str = "#FFFF00";
const HIGH_DEGREE_FILL: &str = "#FFFF00";
const VERTEX_FILL: &str = "#000000";
const BOUNDARY_FILL: &str = "#FF0000";
const EXPANSION_FILL: &str = "#F0F000";
const EDGE_FILL: &str = "#00000F";

fn cluster_fill(index: usize) -> String {
    let rgb = index
        .wrapping_mul(65536)
        .wrapping_add(index.wrapping_mul(256))
        .wrapping_add(index.wrapping_mul(4))
        & 0xFF_FFFF;
    format!("#{rgb:06x}")
}

fn escape_label(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

impl ClusterPlanRep<'_> {
    /// GML text for the current copy. Node ids are the copy's node indices.
    pub fn to_gml_string(&self, layout: &Layout) -> String {
        let g = self.graph();
        let clusters = self.cluster_graph();
        let mut out = String::new();

        let _ = writeln!(out, "Creator \"clusterplan\"");
        let _ = writeln!(out, "graph [");
        let _ = writeln!(out, "  directed 1");

        for v in g.nodes() {
            let (x, y) = layout.position(v);
            let _ = writeln!(out, "  node [");
            let _ = writeln!(out, "    id {}", v.index());
            if let Some(label) = layout.label(v) {
                let _ = writeln!(out, "    label \"{}\"", escape_label(label));
            }
            let _ = writeln!(out, "    graphics [");
            let _ = writeln!(out, "      x {x:.4}");
            let _ = writeln!(out, "      y {y:.4}");
            let _ = writeln!(out, "      w 10.0");
            let _ = writeln!(out, "      h 10.0");

            let fill = match self.plan_rep.node_type(v) {
                NodeType::Expander => Some(EXPANDER_FILL.to_string()),
                NodeType::Dummy => None,
                NodeType::Vertex => {
                    let in_cluster = self
                        .plan_rep
                        .original(v)
                        .map(|o| clusters.cluster_of(o))
                        .filter(|&c| !clusters.is_root(c));
                    Some(match in_cluster {
                        Some(c) => cluster_fill(clusters.index(c)),
                        None if g.degree(v) > 4 => HIGH_DEGREE_FILL.to_string(),
                        None => VERTEX_FILL.to_string(),
                    })
                }
            };
            match fill {
                Some(fill) => {
                    let _ = writeln!(out, "      type \"rectangle\"");
                    let _ = writeln!(out, "      width 1.0");
                    let _ = writeln!(out, "      fill \"{fill}\"");
                }
                None => {
                    let _ = writeln!(out, "      type \"oval\"");
                    let _ = writeln!(out, "      width 1.0");
                }
            }
            let _ = writeln!(out, "    ]");
            let _ = writeln!(out, "  ]");
        }

        for e in g.edges() {
            let fill = if self.is_cluster_boundary(e) {
                BOUNDARY_FILL
            } else if self.plan_rep.edge_type(e) == EdgeType::Expansion {
                EXPANSION_FILL
            } else {
                EDGE_FILL
            };
            let _ = writeln!(out, "  edge [");
            let _ = writeln!(out, "    source {}", g.source(e).index());
            let _ = writeln!(out, "    target {}", g.target(e).index());
            let _ = writeln!(out, "    graphics [");
            let _ = writeln!(out, "      type \"line\"");
            let _ = writeln!(out, "      arrow \"none\"");
            let _ = writeln!(out, "      fill \"{fill}\"");
            let _ = writeln!(out, "      width 1.0");
            let _ = writeln!(out, "    ]");
            let _ = writeln!(out, "  ]");
        }

        let _ = writeln!(out, "]");
        out
    }

    pub fn write_gml<W: std::io::Write>(&self, out: &mut W, layout: &Layout) -> std::io::Result<()> {
        out.write_all(self.to_gml_string(layout).as_bytes())
    }
}
