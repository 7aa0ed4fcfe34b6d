//! Frame drawing.
//!
//! Picks the view from navigation state: loading text before the first
//! resize, the help table while help is shown, the composed reading frame
//! otherwise.

use crate::app::App;
use crate::ui::{help, layout::LOADING_TEXT};
use ratatui::{widgets::Paragraph, Frame};

pub fn render(f: &mut Frame, app: &App) {
    let area = f.area();

    // Guard against zero-width/height during extreme resizes
    if area.width < 1 || area.height < 1 {
        return;
    }

    if !app.nav.ready {
        f.render_widget(Paragraph::new(LOADING_TEXT), area);
        return;
    }

    if app.nav.help_visible {
        help::render(f, &app.keybindings, area);
        return;
    }

    f.render_widget(Paragraph::new(app.frame_lines()), area);
}
