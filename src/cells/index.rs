use super::{escape_html, Cell, FieldValue, NULL_HTML};

/// Decimal column, the value as it is.
pub struct DecimalHtml;

impl Cell for DecimalHtml {
    fn render(&self, value: Option<&FieldValue>) -> String {
        match value {
            Some(value) => escape_html(&value.to_string()),
            None => NULL_HTML.to_string(),
        }
    }
}

/// Unsigned bigint column, the value as it is.
pub struct UnsignedBigintHtml;

impl Cell for UnsignedBigintHtml {
    fn render(&self, value: Option<&FieldValue>) -> String {
        match value {
            Some(value) => escape_html(&value.to_string()),
            None => NULL_HTML.to_string(),
        }
    }
}

/// Unsigned float column, numbers are shown as floats.
pub struct UnsignedFloatHtml;

impl Cell for UnsignedFloatHtml {
    fn render(&self, value: Option<&FieldValue>) -> String {
        match value.and_then(FieldValue::to_f64) {
            Some(f) => format!("{f:?}"),
            None => NULL_HTML.to_string(),
        }
    }
}

pub struct EmailHtml;

impl Cell for EmailHtml {
    fn render(&self, value: Option<&FieldValue>) -> String {
        let Some(value) = value else {
            return NULL_HTML.to_string();
        };
        let email = escape_html(&value.to_string());
        format!(r#"<a href="mailto:{email}">{email}</a>"#)
    }
}

/// Network column with a link to look the network up.
pub struct CidrHtml;

impl CidrHtml {
    const LOOKUP_URL: &'static str = "http://ip-api.com/#";
}

impl Cell for CidrHtml {
    fn render(&self, value: Option<&FieldValue>) -> String {
        let Some(value) = value else {
            return NULL_HTML.to_string();
        };
        let cidr = escape_html(&value.to_string());
        format!(
            r#"<code>{cidr}</code> <a href="{url}{cidr}" target="_blank">lookup</a>"#,
            url = Self::LOOKUP_URL
        )
    }
}
