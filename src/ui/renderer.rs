//! Pure projection of a result page into display descriptors.
//!
//! Nothing here touches the terminal; the ratatui and comfy-table
//! front ends both draw from these descriptors.

use crate::query_state::{PageSize, ResultPage};

/// Default flag image location, keyed by two-letter country code
pub const DEFAULT_FLAG_URL_TEMPLATE: &str = "https://flagsapi.com/{code}/shiny/64.png";

/// One table row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowDescriptor {
    /// 1-based position within the page
    pub index: usize,
    pub name: String,
    pub country_code: String,
    pub flag_image_ref: String,
    pub flag_glyph: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableView {
    Rows(Vec<RowDescriptor>),
    NoResults,
}

impl TableView {
    pub fn rows(&self) -> &[RowDescriptor] {
        match self {
            TableView::Rows(rows) => rows,
            TableView::NoResults => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, TableView::NoResults)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLink {
    pub number: u64,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSizeOption {
    pub size: PageSize,
    pub selected: bool,
}

/// Substitute the country code into a flag URL template
pub fn flag_image_ref(country_code: &str, template: &str) -> String {
    template.replace("{code}", country_code)
}

/// Regional-indicator pair for a two-letter code, e.g. "IN" -> 🇮🇳
pub fn flag_glyph(country_code: &str) -> Option<String> {
    let mut chars = country_code.chars();
    let (first, second) = (chars.next()?, chars.next()?);
    if chars.next().is_some() {
        return None;
    }

    [first, second]
        .iter()
        .map(|c| {
            if !c.is_ascii_alphabetic() {
                return None;
            }
            let offset = c.to_ascii_uppercase() as u32 - 'A' as u32;
            char::from_u32(0x1F1E6 + offset)
        })
        .collect()
}

pub fn project_rows(page: &ResultPage, flag_url_template: &str) -> TableView {
    if page.records.is_empty() {
        return TableView::NoResults;
    }

    TableView::Rows(
        page.records
            .iter()
            .enumerate()
            .map(|(i, record)| RowDescriptor {
                index: i + 1,
                name: record.name.clone(),
                country_code: record.country_code.clone(),
                flag_image_ref: flag_image_ref(&record.country_code, flag_url_template),
                flag_glyph: flag_glyph(&record.country_code),
            })
            .collect(),
    )
}

/// ceil(total / page_size)
pub fn page_count(total_count: u64, page_size: PageSize) -> u64 {
    total_count.div_ceil(u64::from(page_size.get()))
}

pub fn page_links(total_count: u64, page_size: PageSize, current_page: u32) -> Vec<PageLink> {
    (1..=page_count(total_count, page_size))
        .map(|number| PageLink {
            number,
            active: number == u64::from(current_page),
        })
        .collect()
}

pub fn page_size_options(current: PageSize) -> Vec<PageSizeOption> {
    PageSize::ALL
        .iter()
        .map(|&size| PageSizeOption {
            size,
            selected: size == current,
        })
        .collect()
}
