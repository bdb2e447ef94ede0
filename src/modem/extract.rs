//! Table extraction from modem management pages.
//!
//! Two markup shapes are supported:
//!
//! - **HTML tables**: located by DOM id, each data row yielded as trimmed
//!   cell text. Row 0 of the body is the header and is always skipped.
//! - **XML islands**: the event log page embeds an XML table inside an HTML
//!   payload. The fragment is cut out by a plain substring search on its
//!   opening and closing tags and then deserialized against a fixed schema.
//!   The surrounding page is not well-formed, so it is never handed to a
//!   document parser as a whole. A fragment that contains a nested element
//!   with the same tag name is not supported.

use std::marker::PhantomData;

use scraper::{ElementRef, Html, Selector};
use serde::de::DeserializeOwned;

use crate::error::ParseError;

/// Extracts the rows of one table from a page body.
pub trait TableExtractor {
    /// The type of one extracted row
    type Row;

    /// Extract all data rows in document order.
    fn extract(&self, body: &str) -> Result<Vec<Self::Row>, ParseError>;
}

/// Creates a CSS selector, mapping syntax errors into [`ParseError`].
pub fn html_selector(selector: &str) -> Result<Selector, ParseError> {
    Selector::parse(selector).map_err(|e| ParseError::invalid_selector(selector, e))
}

fn cell_text(cell: ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}

/// Extracts `<td>` texts from the body of the table with the given id.
#[derive(Debug, Clone)]
pub struct HtmlTableExtractor {
    table_id: &'static str,
}

impl HtmlTableExtractor {
    pub fn new(table_id: &'static str) -> Self {
        Self { table_id }
    }

    pub fn table_id(&self) -> &'static str {
        self.table_id
    }

    fn body_selector(&self) -> String {
        format!("#{} tbody", self.table_id)
    }
}

impl TableExtractor for HtmlTableExtractor {
    type Row = Vec<String>;

    /// Returns [`ParseError::MarkupNotFound`] when the table is absent.
    fn extract(&self, body: &str) -> Result<Vec<Self::Row>, ParseError> {
        let document = Html::parse_document(body);
        let body_selector = self.body_selector();
        let tbody = document
            .select(&html_selector(&body_selector)?)
            .next()
            .ok_or_else(|| ParseError::markup_not_found(&body_selector))?;

        let row_selector = html_selector("tr")?;
        let cell_selector = html_selector("td")?;

        Ok(tbody
            .select(&row_selector)
            .skip(1)
            .map(|row| row.select(&cell_selector).map(cell_text).collect())
            .collect())
    }
}

/// Returns the substring from the first `<tag>` through the first `</tag>`,
/// or an empty string when either delimiter is missing.
pub fn xml_island<'a>(body: &'a str, tag: &str) -> &'a str {
    let open = format!("<{}>", tag);
    let close = format!("</{}>", tag);

    let Some(start) = body.find(&open) else {
        return "";
    };
    let Some(end) = body.find(&close) else {
        return "";
    };
    let end = end + close.len();
    if end < start {
        return "";
    }
    &body[start..end]
}

/// A fixed-schema XML table that can be cut out of a page.
pub trait XmlTable: DeserializeOwned {
    /// The element of one table row
    type Row;

    /// Root element name of the fragment, used as its delimiter.
    const ROOT_TAG: &'static str;

    fn into_rows(self) -> Vec<Self::Row>;
}

/// Extracts an [`XmlTable`] embedded in a larger HTML payload.
pub struct XmlIslandExtractor<T> {
    _table: PhantomData<T>,
}

impl<T> XmlIslandExtractor<T> {
    pub fn new() -> Self {
        Self {
            _table: PhantomData,
        }
    }
}

impl<T> Default for XmlIslandExtractor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: XmlTable> TableExtractor for XmlIslandExtractor<T> {
    type Row = T::Row;

    /// A missing fragment yields no rows; a malformed one is a schema error.
    fn extract(&self, body: &str) -> Result<Vec<Self::Row>, ParseError> {
        let fragment = xml_island(body, T::ROOT_TAG);
        if fragment.is_empty() {
            return Ok(Vec::new());
        }

        quick_xml::de::from_str::<T>(fragment)
            .map(XmlTable::into_rows)
            .map_err(|e| ParseError::schema(T::ROOT_TAG, e))
    }
}
