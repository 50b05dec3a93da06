use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use crossterm::style::Stylize;

use crate::query_state::{ResultPage, SearchQuery};
use crate::ui::renderer::{page_links, project_rows, TableView};
use crate::ui::table_renderer::country_cell_text;

/// Build the plain-terminal table for one result page
pub fn build_table(page: &ResultPage, flag_url_template: &str, use_glyphs: bool) -> Option<Table> {
    let rows = match project_rows(page, flag_url_template) {
        TableView::NoResults => return None,
        TableView::Rows(rows) => rows,
    };

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        ["#", "Place Name", "Country", "Flag"]
            .iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
    );

    for row in &rows {
        table.add_row(vec![
            row.index.to_string(),
            row.name.clone(),
            country_cell_text(row, use_glyphs, false),
            row.flag_image_ref.clone(),
        ]);
    }

    Some(table)
}

/// Page navigator as text, active page in brackets: "[1] 2 3"
pub fn page_summary(page: &ResultPage, query: &SearchQuery) -> String {
    page_links(page.total_count, query.page_size, query.page)
        .iter()
        .map(|link| {
            if link.active {
                format!("[{}]", link.number)
            } else {
                link.number.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn display_results(page: &ResultPage, query: &SearchQuery, flag_url_template: &str, use_glyphs: bool) {
    match build_table(page, flag_url_template, use_glyphs) {
        Some(table) => println!("{table}"),
        None => {
            println!("{}", "No result found".yellow());
            return;
        }
    }

    println!(
        "\n{}",
        format!(
            "{} cities · {} per page · pages: {}",
            page.total_count,
            query.page_size,
            page_summary(page, query)
        )
        .green()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query_state::{CityRecord, PageSize};
    use crate::ui::renderer::DEFAULT_FLAG_URL_TEMPLATE;

    #[test]
    fn test_page_summary_marks_active_page() {
        let page = ResultPage {
            records: vec![CityRecord {
                name: "Delhi".to_string(),
                country_code: "IN".to_string(),
            }],
            total_count: 13,
        };
        let query = SearchQuery {
            text: "del".to_string(),
            page: 2,
            page_size: PageSize::default(),
        };
        assert_eq!(page_summary(&page, &query), "1 [2] 3");

        let table = build_table(&page, DEFAULT_FLAG_URL_TEMPLATE, false).unwrap();
        let rendered = table.to_string();
        assert!(rendered.contains("Delhi"));
        assert!(rendered.contains("https://flagsapi.com/IN/shiny/64.png"));
    }

    #[test]
    fn test_empty_page_has_no_table() {
        assert!(build_table(&ResultPage::default(), DEFAULT_FLAG_URL_TEMPLATE, true).is_none());
    }
}
