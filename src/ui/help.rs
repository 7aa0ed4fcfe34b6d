//! Help view: keybinding table grouped by section.
//!
//! Replaces the whole reading frame while shown. Reflects any user
//! overrides from config.

use crate::keybindings::KeybindingRegistry;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Row, Table},
    Frame,
};

/// Section display order.
const GROUP_ORDER: [&str; 3] = ["Navigation", "Scrolling", "General"];

/// Table rows: a bold header per section, one row per action.
pub fn rows(keybindings: &KeybindingRegistry) -> Vec<Row<'static>> {
    let bindings = keybindings.help_rows();
    let mut rows: Vec<Row> = Vec::new();

    for group in GROUP_ORDER {
        let in_group: Vec<_> = bindings.iter().filter(|(g, _, _)| *g == group).collect();
        if in_group.is_empty() {
            continue;
        }

        rows.push(Row::new(vec![Line::from(Span::styled(
            format!("-- {} --", group),
            Style::default().add_modifier(Modifier::BOLD),
        ))]));

        for (_, keys, description) in in_group {
            rows.push(Row::new(vec![format!("  {}", keys), description.to_string()]));
        }

        // Blank separator between groups
        rows.push(Row::new(vec![String::new(), String::new()]));
    }

    rows.pop();
    rows
}

pub fn render(f: &mut Frame, keybindings: &KeybindingRegistry, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let widths = [Constraint::Length(24), Constraint::Min(10)];
    let table = Table::new(rows(keybindings), widths).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Help (? or Esc to close) "),
    );

    f.render_widget(table, area);
}
