//! Flowchart and execution plan output

use anyhow::Result;

use super::output::Output;
use super::workspace::Workspace;
use crate::state::LabelStyle;

/// Prints the Mermaid flowchart rooted at `entry`
pub fn chart(workspace: &Workspace, output: &Output, entry: &str, detailed: bool) -> Result<()> {
    let detailed = detailed || workspace.config.project.chart.detailed;
    let style = if detailed {
        LabelStyle::Detailed
    } else {
        LabelStyle::Plain
    };

    output.verbose_ctx("chart", &format!("entry={}, style={:?}", entry, style));
    let chart = workspace.load()?.flow_chart(entry, style)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "entry": entry,
            "chart": chart,
        }));
    } else {
        print!("{}", chart);
    }

    Ok(())
}

/// Prints the stages of leaf commands `name` runs
pub fn plan(workspace: &Workspace, output: &Output, name: &str) -> Result<()> {
    let stages = workspace.load()?.execution_plan(name)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "command": name,
            "stages": stages,
        }));
        return Ok(());
    }

    println!("Execution plan for {}:", name);
    for (i, stage) in stages.iter().enumerate() {
        println!("  {}. {}", i + 1, stage.join(" | "));
    }

    Ok(())
}
