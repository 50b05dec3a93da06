// Table and pagination drawing. Depends only on the projection in
// `ui::renderer`, never on session or app internals.

use crate::ui::renderer::{PageLink, RowDescriptor, TableView};
use crate::utils::logging::LogEntry;
use ratatui::{
    layout::Constraint,
    prelude::*,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
};

/// Everything needed to draw the results area
pub struct TableRenderContext<'a> {
    pub view: &'a TableView,
    pub page_links: &'a [PageLink],
    pub total_count: u64,
    pub use_glyphs: bool,
    pub show_flag_urls: bool,
    pub focused: bool,
}

/// Text for the country column
pub fn country_cell_text(row: &RowDescriptor, use_glyphs: bool, show_flag_urls: bool) -> String {
    let flag = match (&row.flag_glyph, use_glyphs) {
        (Some(glyph), true) => format!("{} {}", glyph, row.country_code),
        _ => format!("[{}]", row.country_code),
    };
    if show_flag_urls {
        format!("{}  {}", flag, row.flag_image_ref)
    } else {
        flag
    }
}

pub fn render_table(f: &mut Frame, area: Rect, ctx: &TableRenderContext, state: &mut TableState) {
    let border = if ctx.focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let rows = match ctx.view {
        TableView::NoResults => {
            let empty = Paragraph::new("No result found")
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title("Results")
                        .border_style(border),
                )
                .style(Style::default().fg(Color::Yellow));
            f.render_widget(empty, area);
            return;
        }
        TableView::Rows(rows) => rows,
    };

    let header = Row::new(["#", "Place Name", "Country"].map(|h| {
        Cell::from(h).style(
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        )
    }));

    let data_rows: Vec<Row> = rows
        .iter()
        .map(|row| {
            Row::new(vec![
                Cell::from(row.index.to_string()).style(Style::default().fg(Color::DarkGray)),
                Cell::from(row.name.clone()),
                Cell::from(country_cell_text(row, ctx.use_glyphs, ctx.show_flag_urls)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Percentage(50),
        Constraint::Fill(1),
    ];

    let table = Table::new(data_rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Results ({} cities)", ctx.total_count))
                .border_style(border),
        )
        .column_spacing(1)
        .row_highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        );

    f.render_stateful_widget(table, area, state);
}

pub fn render_page_links(f: &mut Frame, area: Rect, links: &[PageLink], focused: bool) {
    let mut spans = Vec::with_capacity(links.len());
    for link in links {
        let label = format!(" {} ", link.number);
        spans.push(if link.active {
            Span::styled(
                label,
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            Span::raw(label)
        });
    }

    let border = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let widget = Paragraph::new(Line::from(spans))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Pages")
                .border_style(border),
        );
    f.render_widget(widget, area);
}

pub fn render_log_pane(f: &mut Frame, area: Rect, entries: &[LogEntry]) {
    let lines: Vec<Line> = entries
        .iter()
        .map(|entry| {
            let color = match entry.level.as_str() {
                "ERROR" => Color::Red,
                "WARN" => Color::Yellow,
                "INFO" => Color::Green,
                _ => Color::DarkGray,
            };
            Line::from(Span::styled(
                entry.format_for_display(),
                Style::default().fg(color),
            ))
        })
        .collect();

    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Log (F5)"));
    f.render_widget(widget, area);
}
