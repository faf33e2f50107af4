use std::collections::HashMap;

/// Looks up user facing messages by key, e.g. `errors.required`.
pub trait Translate: Send + Sync {
    /// Renders the message for `key`, replacing `%{name}` placeholders with
    /// the matching `args`. Unknown keys render as the key itself.
    fn translate(&self, key: &str, args: &[(&str, &str)]) -> String;
}

/// Built-in English messages with optional overrides.
#[derive(Debug, Clone)]
pub struct Messages {
    templates: HashMap<String, String>,
}

impl Messages {
    pub const REQUIRED: &'static str = "errors.required";
    pub const DEPRECATION_AUTHORIZER: &'static str = "deprecation.authorizer";

    pub fn new() -> Self {
        let templates = [
            (Self::REQUIRED, "%{subject} is required"),
            (
                Self::DEPRECATION_AUTHORIZER,
                "`authorizer` is deprecated and will be removed from 5.3.*, \
                 please use `current_authorizer` instead",
            ),
        ];
        Self {
            templates: templates
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Replaces built-in templates by the given ones, new keys are added.
    pub fn with_overrides(mut self, overrides: &HashMap<String, String>) -> Self {
        for (key, template) in overrides {
            self.templates.insert(key.clone(), template.clone());
        }
        self
    }
}

impl Default for Messages {
    fn default() -> Self {
        Self::new()
    }
}

impl Translate for Messages {
    fn translate(&self, key: &str, args: &[(&str, &str)]) -> String {
        let Some(template) = self.templates.get(key) else {
            return key.to_string();
        };
        interpolate(template, args)
    }
}

fn interpolate(template: &str, args: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("%{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };

        let name = &after[..end];
        match args.iter().find(|(arg, _)| *arg == name) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + 2 + end + 1]),
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    out
}
