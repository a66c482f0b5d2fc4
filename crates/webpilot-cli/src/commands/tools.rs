use anyhow::Result;
use console::style;
use serde_json::Value;
use webpilot::models::tool::Tool;
use webpilot::registry;

/// Print the tools offered to the model
pub fn execute() -> Result<()> {
    for tool in registry::tools() {
        println!("{}", describe(tool));
    }
    Ok(())
}

fn describe(tool: &Tool) -> String {
    let required = tool.required();
    let params: Vec<String> = tool
        .input_schema
        .get("properties")
        .and_then(Value::as_object)
        .map(|props| {
            props
                .keys()
                .map(|name| {
                    if required.contains(&name.as_str()) {
                        name.clone()
                    } else {
                        format!("{}?", name)
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    format!(
        "{}({})\n  {}",
        style(&tool.name).bold().green(),
        params.join(", "),
        style(&tool.description).dim()
    )
}
