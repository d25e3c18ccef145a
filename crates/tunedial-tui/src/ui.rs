//! Row rendering: depth-indented four-column list plus a status line.
//!
//! Column budget follows the original layout: the title gets ~60% of
//! the width (minus its indent), the secondary text ~40%, then a 4-char
//! and a 5-char data column on the right edge.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthChar;

use tunedial_opml::nav::Navigator;
use tunedial_opml::node::RowText;

use crate::theme;

/// A flattened row with its display text already resolved, so drawing
/// (including progress redraws mid-activation) needs no tree access.
#[derive(Debug, Clone)]
pub struct RenderedRow {
    pub depth: usize,
    pub text: RowText,
}

/// Rows the list area can hold once the status line is subtracted.
pub fn list_height(terminal_height: u16) -> usize {
    usize::from(terminal_height.saturating_sub(1))
}

pub fn draw(frame: &mut Frame, rows: &[RenderedRow], nav: &Navigator, status: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(frame.area());

    draw_rows(frame, chunks[0], rows, nav);
    frame.render_widget(Paragraph::new(status).style(theme::style_status()), chunks[1]);
}

fn draw_rows(frame: &mut Frame, area: Rect, rows: &[RenderedRow], nav: &Navigator) {
    let total = usize::from(area.width);
    let width0 = 6 * total.saturating_sub(10) / 10;
    let width1 = 4 * total.saturating_sub(10) / 10;

    let end = (nav.top + usize::from(area.height)).min(rows.len());
    let lines: Vec<Line> = rows[nav.top..end]
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let indent = row.depth * 2;
            let title_style = if i == nav.cursor {
                theme::style_selected()
            } else {
                theme::style_default()
            };
            Line::from(vec![
                Span::raw(" ".repeat(indent)),
                Span::styled(fit(&row.text.title, width0.saturating_sub(indent)), title_style),
                Span::raw("  "),
                Span::styled(
                    fit(&row.text.secondary, width1.saturating_sub(4)),
                    theme::style_secondary(),
                ),
                Span::styled(fit(&row.text.data0, 4), theme::style_data()),
                Span::raw(" "),
                Span::styled(fit(&row.text.data1, 5), theme::style_data()),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), area);
}

/// Truncate to `width` display columns and pad with spaces to exactly
/// `width`, so the columns to the right stay aligned.
fn fit(s: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.extend(std::iter::repeat(' ').take(width - used));
    out
}
