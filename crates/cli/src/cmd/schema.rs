use anyhow::Result;

use slsrust_lib::plugin::function_schema;

use crate::output::print_json;

/// Print the schema of the function-level `rust` block.
pub fn cmd_schema() -> Result<()> {
  print_json(&function_schema())
}
