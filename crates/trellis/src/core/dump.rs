use std::io::Write;

use termcolor::{Buffer, Color, ColorSpec, WriteColor};

use crate::{
    NodeId,
    core::{Core, node::Visibility, update::LayoutState},
    error::{Error, Result},
    geom::Rect,
    layout::{Anchor, Layout, SizeMode},
};

/// Render a subtree as indented, colored text showing each node's
/// constraints, layout frame and committed frame. This is a debug function.
pub fn dump(core: &Core, root: NodeId) -> Result<String> {
    let mut buffer = Buffer::ansi();
    dump_node(&mut buffer, core, root, 0)?;
    Ok(String::from_utf8_lossy(buffer.as_slice()).into_owned())
}

/// Like [`dump`], without color codes.
pub fn dump_plain(core: &Core, root: NodeId) -> Result<String> {
    let mut buffer = Buffer::no_color();
    dump_node(&mut buffer, core, root, 0)?;
    Ok(String::from_utf8_lossy(buffer.as_slice()).into_owned())
}

/// Write an indented, colored label followed by a value.
fn write_field(buffer: &mut Buffer, indent: &str, label: &str, value: &str) -> Result<()> {
    write!(buffer, "{indent}  ")?;
    buffer.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
    write!(buffer, "{label}")?;
    buffer.reset()?;
    writeln!(buffer, " {value}")?;
    Ok(())
}

/// Short form of a rectangle.
fn rect(r: Rect) -> String {
    format!("({}, {}) {}x{}", r.tl.x, r.tl.y, r.w, r.h)
}

/// Short form of a size mode.
fn mode(m: SizeMode) -> &'static str {
    match m {
        SizeMode::Fixed => "fixed",
        SizeMode::Wrapping => "wrap",
        SizeMode::Filling => "fill",
        SizeMode::Weighted => "weight",
    }
}

/// Short form of an anchor.
fn anchor(a: Anchor) -> String {
    match a {
        Anchor::Free => "-".into(),
        Anchor::ParentEdge => "parent".into(),
        Anchor::ToStart(id) => format!("start({id:?})"),
        Anchor::ToEnd(id) => format!("end({id:?})"),
        Anchor::CenterInParent => "center".into(),
        Anchor::CenterIn(id) => format!("center({id:?})"),
    }
}

/// One-line summary of a constraint record.
fn constraints(l: &Layout) -> String {
    let (hs, he) = l.horizontal.anchors();
    let (vs, ve) = l.vertical.anchors();
    format!(
        "w: {} [{} .. {}], h: {} [{} .. {}]",
        mode(l.horizontal.mode),
        anchor(hs),
        anchor(he),
        mode(l.vertical.mode),
        anchor(vs),
        anchor(ve),
    )
}

/// Walk a node subtree and emit formatted debug output.
fn dump_node(buffer: &mut Buffer, core: &Core, node_id: NodeId, level: usize) -> Result<()> {
    let node = core.nodes.get(node_id).ok_or(Error::NodeNotFound(node_id))?;
    let indent = "    ".repeat(level);

    write!(buffer, "{indent}")?;
    buffer.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))?;
    write!(buffer, "{node_id:?}")?;
    buffer.reset()?;

    let mut indicators = Vec::new();
    match node.state {
        LayoutState::Valid => {}
        LayoutState::Dirty => indicators.push(("dirty", Color::Yellow)),
        LayoutState::Computing => indicators.push(("computing", Color::Red)),
    }
    match node.visibility {
        Visibility::Visible => {}
        Visibility::Hidden => indicators.push(("hidden", Color::Magenta)),
        Visibility::Gone => indicators.push(("gone", Color::Magenta)),
    }
    if node.hook.is_some() {
        indicators.push(("hook", Color::Blue));
    }
    for (i, (label, color)) in indicators.iter().enumerate() {
        write!(buffer, "{}", if i == 0 { " " } else { ", " })?;
        buffer.set_color(ColorSpec::new().set_fg(Some(*color)))?;
        write!(buffer, "{label}")?;
        buffer.reset()?;
    }
    writeln!(buffer)?;

    write_field(buffer, &indent, "frame:", &rect(node.frame))?;
    if let Some(layout) = node.layout.as_deref() {
        write_field(buffer, &indent, "layout:", &rect(layout.layout_frame))?;
        write_field(buffer, &indent, "constraints:", &constraints(layout))?;
    }
    if let Some(padding) = node.padding.as_deref() {
        let p = padding.applied;
        write_field(
            buffer,
            &indent,
            "padding:",
            &format!("{} {} {} {}", p.left, p.top, p.right, p.bottom),
        )?;
    }

    for child in &node.children {
        dump_node(buffer, core, *child, level + 1)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UpdateMode;

    #[test]
    fn dump_lists_subtree() -> Result<()> {
        let mut core = Core::new();
        let root = core.root();
        core.set_frame(root, Rect::new(0, 0, 100, 50), UpdateMode::Layout)?;
        let child = core.add_child(root)?;
        core.set_size(child, 10, 10, UpdateMode::Init)?;
        core.constrain(child)?
            .width(SizeMode::Filling)
            .align_parent_top()
            .apply(UpdateMode::Layout)?;

        let out = dump_plain(&core, root)?;
        assert!(out.contains("frame: (0, 0) 100x50"));
        assert!(out.contains("frame: (0, 0) 100x10"));
        assert!(out.contains("w: fill [parent .. parent], h: fixed [parent .. -]"));
        assert!(!out.contains("dirty"));

        let colored = dump(&core, root)?;
        assert!(colored.contains("\x1b["));
        Ok(())
    }
}
