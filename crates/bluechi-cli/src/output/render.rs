//! Human-readable rendering of command outcomes.

use std::io::{self, Write};

use bluechi_client::{Node, Unit, UnitFileChanges};
use unicode_width::UnicodeWidthStr;

use crate::command::CommandOutcome;

const COLUMN_GAP: usize = 2;
const NOT_REPORTED: &str = "-";

pub(crate) fn render_human<W: Write>(outcome: &CommandOutcome, out: &mut W) -> io::Result<()> {
    match outcome {
        CommandOutcome::Nodes(nodes) => render_nodes(nodes, out),
        CommandOutcome::Units(units) => render_units(units, out),
        CommandOutcome::Node(node) => render_node(node, out),
        CommandOutcome::Unit(unit) => render_unit(unit, out),
        CommandOutcome::Job {
            action,
            unit,
            node,
            job,
        } => writeln!(out, "{action} {unit} on {node}: queued job {}", job.object_path),
        CommandOutcome::UnitFiles(changes) => render_changes(changes, out),
        CommandOutcome::Done { action, target } => writeln!(out, "{action} {target}: done"),
    }
}

fn render_nodes<W: Write>(nodes: &[Node], out: &mut W) -> io::Result<()> {
    if nodes.is_empty() {
        return writeln!(out, "no nodes");
    }
    let rows: Vec<Vec<String>> = nodes
        .iter()
        .map(|node| {
            vec![
                node.name.clone(),
                node.status.to_string(),
                or_dash(node.peer_address.as_deref()),
            ]
        })
        .collect();
    write_table(&["NODE", "STATUS", "PEER"], &rows, out)
}

fn render_units<W: Write>(units: &[Unit], out: &mut W) -> io::Result<()> {
    if units.is_empty() {
        return writeln!(out, "no units");
    }
    let rows: Vec<Vec<String>> = units
        .iter()
        .map(|unit| {
            vec![
                unit.node.clone(),
                unit.name.clone(),
                unit.active_state.to_string(),
                unit.load_state.to_string(),
                or_dash(unit.sub_state.as_deref()),
            ]
        })
        .collect();
    write_table(&["NODE", "UNIT", "ACTIVE", "LOAD", "SUB"], &rows, out)
}

fn render_node<W: Write>(node: &Node, out: &mut W) -> io::Result<()> {
    writeln!(out, "Node:   {}", node.name)?;
    writeln!(out, "Status: {}", node.status)?;
    writeln!(out, "Peer:   {}", or_dash(node.peer_address.as_deref()))?;
    match &node.object_path {
        Some(path) => writeln!(out, "Object: {path}"),
        None => Ok(()),
    }
}

fn render_unit<W: Write>(unit: &Unit, out: &mut W) -> io::Result<()> {
    writeln!(out, "Unit:        {}", unit.name)?;
    writeln!(out, "Node:        {}", unit.node)?;
    writeln!(out, "Description: {}", or_dash(unit.description.as_deref()))?;
    writeln!(
        out,
        "State:       {} ({}), {}",
        unit.active_state,
        or_dash(unit.sub_state.as_deref()),
        unit.load_state
    )
}

fn render_changes<W: Write>(changes: &UnitFileChanges, out: &mut W) -> io::Result<()> {
    if changes.changes.is_empty() {
        writeln!(out, "no changes")?;
    }
    for change in &changes.changes {
        if change.destination.is_empty() {
            writeln!(out, "{} {}", change.kind, change.file)?;
        } else {
            writeln!(out, "{} {} -> {}", change.kind, change.file, change.destination)?;
        }
    }
    if changes.carries_install_info == Some(false) {
        writeln!(out, "note: unit files have no [Install] section")?;
    }
    Ok(())
}

fn or_dash(value: Option<&str>) -> String {
    value.unwrap_or(NOT_REPORTED).to_owned()
}

fn write_table<W: Write>(headers: &[&str], rows: &[Vec<String>], out: &mut W) -> io::Result<()> {
    let mut widths: Vec<usize> = headers.iter().map(|header| header.width()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.width());
        }
    }

    let header_cells: Vec<&str> = headers.to_vec();
    write_row(&header_cells, &widths, out)?;
    for row in rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        write_row(&cells, &widths, out)?;
    }
    Ok(())
}

fn write_row<W: Write>(cells: &[&str], widths: &[usize], out: &mut W) -> io::Result<()> {
    let mut line = String::new();
    let last = cells.len().saturating_sub(1);
    for (index, (cell, width)) in cells.iter().zip(widths).enumerate() {
        line.push_str(cell);
        if index < last {
            let padding = width.saturating_sub(cell.width()) + COLUMN_GAP;
            line.extend(std::iter::repeat_n(' ', padding));
        }
    }
    writeln!(out, "{line}")
}
