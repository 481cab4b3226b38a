use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(target), Some(Value::Object(extra))) = (response.as_object_mut(), data) {
                target.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Print each line of a list under a heading, text mode only
pub fn output_list(output_format: &OutputFormat, heading: &str, lines: &[String]) {
    if matches!(output_format, OutputFormat::Text) && !lines.is_empty() {
        println!("{}:", heading);
        for line in lines {
            println!("  {}", line);
        }
    }
}
