//! Action-line output

use std::io::Write;

use crate::core::error::Result;
use crate::world::Action;

/// `MOVE x y` or `SHOOT id`, with the label appended when `with_label` is set
pub fn format_action(action: &Action, with_label: bool) -> String {
    let mut line = match action {
        Action::Move { to, .. } => format!("MOVE {} {}", to.x, to.y),
        Action::Attack { hostile, .. } => format!("SHOOT {}", hostile),
    };
    if with_label && !action.label().is_empty() {
        line.push(' ');
        line.push_str(action.label());
    }
    line
}

/// Write one action line and flush so the reader sees it immediately
pub fn write_action<W: Write>(out: &mut W, action: &Action, with_label: bool) -> Result<()> {
    writeln!(out, "{}", format_action(action, with_label))?;
    out.flush()?;
    Ok(())
}
