use super::{escape_html, Cell, FieldValue, NULL_HTML};

pub struct DaterangeHtml;

impl Cell for DaterangeHtml {
    fn render(&self, value: Option<&FieldValue>) -> String {
        match value {
            Some(FieldValue::DateRange(from, to)) => format!(
                "<span class=\"from\">{from}</span>\n  ...\n  <span class=\"to\">{to}</span>"
            ),
            Some(other) => escape_html(&other.to_string()),
            None => NULL_HTML.to_string(),
        }
    }
}

/// JSON document, shown compact inside `<pre>`.
pub struct JsonbHtml;

impl Cell for JsonbHtml {
    fn render(&self, value: Option<&FieldValue>) -> String {
        match value {
            Some(value) => format!("<pre>{}</pre>", escape_html(&value.to_string())),
            None => NULL_HTML.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_daterange() {
        let value = FieldValue::DateRange(
            NaiveDate::from_ymd_opt(2014, 2, 11).unwrap(),
            NaiveDate::from_ymd_opt(2014, 2, 12).unwrap(),
        );
        assert_eq!(
            DaterangeHtml.render(Some(&value)),
            "<span class=\"from\">2014-02-11</span>\n  ...\n  <span class=\"to\">2014-02-12</span>"
        );
        assert_eq!(DaterangeHtml.render(None), NULL_HTML);
    }

    #[test]
    fn test_jsonb() {
        let value = FieldValue::Json(json!({
            "change": ["jack", "john"],
            "kind": "user_renamed",
        }));
        assert_eq!(
            JsonbHtml.render(Some(&value)),
            "<pre>{&quot;change&quot;:[&quot;jack&quot;,&quot;john&quot;],&quot;kind&quot;:&quot;user_renamed&quot;}</pre>"
        );
        assert_eq!(JsonbHtml.render(None), NULL_HTML);
    }
}
