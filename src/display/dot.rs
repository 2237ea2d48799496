//! Graphviz DOT rendering of a [`Graph`], built only from its public queries.

use crate::graph::{Graph, GraphError};
use crate::store::TensorId;
use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error("failed to write {}: {source}", .path.display())]
    Io { path: PathBuf, source: std::io::Error },
}

/// (fill, border) per tensor classification.
fn tensor_colors(is_input: bool, is_output: bool) -> (&'static str, &'static str) {
    match (is_input, is_output) {
        (true, true) => ("#fde68a", "#b45309"),
        (true, false) => ("#bbf7d0", "#15803d"),
        (false, true) => ("#bfdbfe", "#1d4ed8"),
        (false, false) => ("#f3f4f6", "#6b7280"),
    }
}

/// Escapes a free-form string for use inside a quoted DOT label.
fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 16);
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

/// First occurrence of each tensor, in listed order.
fn distinct(ids: &[TensorId]) -> Vec<TensorId> {
    let mut seen = Vec::with_capacity(ids.len());
    for &id in ids {
        if !seen.contains(&id) {
            seen.push(id);
        }
    }
    seen
}

pub fn build_dot(graph: &Graph<'_>) -> Result<String, GraphError> {
    let mut out = String::new();

    let _ = writeln!(out, "digraph MLSysGraph {{");
    let _ = writeln!(out, "  rankdir=LR;");
    let _ = writeln!(out, "  graph [fontname=\"Helvetica\", splines=true, overlap=false];");
    let _ = writeln!(out, "  node [fontname=\"Helvetica\", fontsize=10];");
    let _ = writeln!(out, "  edge [fontname=\"Helvetica\", fontsize=9];");
    let _ = writeln!(out);

    for t in graph.tensor_ids() {
        let tensor = graph.tensor(t)?;
        let is_input = graph.is_graph_input(t)?;
        let is_output = graph.is_graph_output(t)?;
        let (fill, border) = tensor_colors(is_input, is_output);

        let mut label = format!("Tensor[{}]\\n{}x{}", t.0, tensor.height, tensor.width);
        if is_input {
            label.push_str("\\ninput");
        }
        if is_output {
            label.push_str("\\noutput");
        }

        let _ = writeln!(
            out,
            "  t{} [shape=ellipse, style=filled, fillcolor=\"{}\", color=\"{}\", label=\"{}\"];",
            t.0, fill, border, label
        );
    }

    let _ = writeln!(out);
    for o in graph.op_ids() {
        let op = graph.op(o)?;
        let label = format!(
            "Op[{}]\\n{}\\ncost={}\\npreds={}\\nsuccs={}",
            o.0,
            escape(&op.op_type),
            op.base_cost,
            graph.predecessors(o)?.len(),
            graph.successors(o)?.len()
        );
        let _ = writeln!(
            out,
            "  o{} [shape=box, style=\"rounded,filled\", fillcolor=\"#fee2e2\", color=\"#991b1b\", label=\"{}\"];",
            o.0, label
        );
    }

    let _ = writeln!(out);
    for o in graph.op_ids() {
        let op = graph.op(o)?;
        for t in distinct(&op.inputs) {
            let _ = writeln!(out, "  t{} -> o{};", t.0, o.0);
        }
        for t in distinct(&op.outputs) {
            let _ = writeln!(out, "  o{} -> t{};", o.0, t.0);
        }
    }

    let _ = writeln!(out, "}}");
    Ok(out)
}

pub fn write_dot_file(graph: &Graph<'_>, path: impl AsRef<Path>) -> Result<(), RenderError> {
    let path = path.as_ref();
    let dot = build_dot(graph)?;
    fs::write(path, dot).map_err(|source| RenderError::Io { path: path.to_path_buf(), source })?;
    log::info!("wrote DOT graph to {}", path.display());
    Ok(())
}
