use anyhow::Result;
use clap::Args;

use wallaby_authz::cells::{CellRegistry, FieldValue, View};

use super::RunCommand;

/// Render a field value with the cell of its type.
#[derive(Args)]
pub struct RenderArgs {
    /// The page the cell belongs to.
    #[arg(long, value_enum, default_value = "index")]
    pub view: View,

    /// The field type, e.g. `decimal`, `cidr`, `daterange`.
    #[arg(short = 't', long = "type")]
    pub field_type: String,

    /// The value, omit it to render a missing value.
    pub value: Option<String>,
}

impl RunCommand for RenderArgs {
    fn run(&self) -> Result<()> {
        let registry = CellRegistry::new();
        let value = match self.value.as_deref() {
            Some(raw) => Some(FieldValue::parse(&self.field_type, raw)?),
            None => None,
        };

        let html = registry.render(self.view, &self.field_type, value.as_ref())?;
        println!("{html}");
        Ok(())
    }
}
