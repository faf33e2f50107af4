//! Typed field cells: render one field value of a record as an HTML
//! fragment for the index or show page.

mod index;
mod show;
mod value;

use std::collections::HashMap;
use std::fmt;

use anyhow::{bail, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub use index::{CidrHtml, DecimalHtml, EmailHtml, UnsignedBigintHtml, UnsignedFloatHtml};
pub use show::{DaterangeHtml, JsonbHtml};
pub use value::FieldValue;

/// Rendered for missing values.
pub const NULL_HTML: &str = r#"<i class="text-muted">&lt;null&gt;</i>"#;

pub trait Cell: Send + Sync {
    fn render(&self, value: Option<&FieldValue>) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    Index,
    Show,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Index => f.write_str("index"),
            View::Show => f.write_str("show"),
        }
    }
}

/// Cells by view and field type.
pub struct CellRegistry {
    cells: HashMap<(View, String), Box<dyn Cell>>,
}

impl CellRegistry {
    /// A registry with the built-in cells.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(View::Index, "decimal", DecimalHtml);
        registry.register(View::Index, "unsigned_bigint", UnsignedBigintHtml);
        registry.register(View::Index, "unsigned_float", UnsignedFloatHtml);
        registry.register(View::Index, "email", EmailHtml);
        registry.register(View::Index, "cidr", CidrHtml);
        registry.register(View::Show, "daterange", DaterangeHtml);
        registry.register(View::Show, "jsonb", JsonbHtml);
        registry
    }

    pub fn empty() -> Self {
        Self {
            cells: HashMap::new(),
        }
    }

    /// Adds or replaces the cell of `field_type` in `view`.
    pub fn register<C: Cell + 'static>(&mut self, view: View, field_type: &str, cell: C) {
        self.cells
            .insert((view, field_type.to_string()), Box::new(cell));
    }

    pub fn get(&self, view: View, field_type: &str) -> Option<&dyn Cell> {
        self.cells
            .get(&(view, field_type.to_string()))
            .map(|cell| cell.as_ref())
    }

    pub fn render(
        &self,
        view: View,
        field_type: &str,
        value: Option<&FieldValue>,
    ) -> Result<String> {
        match self.get(view, field_type) {
            Some(cell) => Ok(cell.render(value)),
            None => bail!("no {view} cell for field type '{field_type}'"),
        }
    }

    pub fn types(&self, view: View) -> Vec<&str> {
        let mut types: Vec<_> = self
            .cells
            .keys()
            .filter(|(v, _)| *v == view)
            .map(|(_, t)| t.as_str())
            .collect();
        types.sort();
        types
    }
}

impl Default for CellRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Escapes text for use in HTML content and attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("plain"), "plain");
        assert_eq!(
            escape_html(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
    }

    #[test]
    fn test_registry() {
        let registry = CellRegistry::new();
        assert_eq!(
            registry.types(View::Index),
            vec!["cidr", "decimal", "email", "unsigned_bigint", "unsigned_float"]
        );
        assert_eq!(registry.types(View::Show), vec!["daterange", "jsonb"]);

        assert_eq!(
            registry.render(View::Index, "decimal", None).unwrap(),
            NULL_HTML
        );
        let err = registry.render(View::Show, "decimal", None).unwrap_err();
        assert_eq!(err.to_string(), "no show cell for field type 'decimal'");
    }

    struct Upper;

    impl Cell for Upper {
        fn render(&self, value: Option<&FieldValue>) -> String {
            match value {
                Some(value) => escape_html(&value.to_string().to_uppercase()),
                None => NULL_HTML.to_string(),
            }
        }
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = CellRegistry::new();
        registry.register(View::Index, "email", Upper);
        let value = FieldValue::Text("tian@example.com".to_string());
        assert_eq!(
            registry.render(View::Index, "email", Some(&value)).unwrap(),
            "TIAN@EXAMPLE.COM"
        );
    }
}
