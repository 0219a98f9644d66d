use anyhow::Result;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use platewise_core::analytics::WeightRange;
use platewise_core::calculations::{format_date, weight_unit};
use platewise_core::service::PlatewiseService;

use super::helpers::print_json;

pub(crate) fn cmd_weight_history(svc: &PlatewiseService, range: WeightRange, json: bool) -> Result<()> {
    let user = svc.current_user()?;
    let logs = svc.weight_history(range)?;
    let progress = svc.weight_progress(range)?;

    if json {
        return print_json(&serde_json::json!({
            "range": range.to_string(),
            "unit": weight_unit(user.unit_system),
            "target_weight": user.target_weight,
            "progress": progress,
            "logs": logs,
        }));
    }

    if logs.is_empty() {
        eprintln!("No weight logs in the {range}. Use `platewise profile weight` to record one.");
        std::process::exit(2);
    }

    #[derive(Tabled)]
    struct WeightRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Weight")]
        weight: String,
        #[tabled(rename = "Change")]
        change: String,
    }

    let unit = weight_unit(user.unit_system);
    let rows: Vec<WeightRow> = logs
        .iter()
        .enumerate()
        .map(|(i, l)| WeightRow {
            date: format_date(l.date),
            weight: format!("{:.1} {unit}", l.weight),
            change: match i.checked_sub(1).map(|p| l.weight - logs[p].weight) {
                Some(d) if d.abs() >= 0.05 => format!("{d:+.1}"),
                Some(_) => "0.0".to_string(),
                None => "-".to_string(),
            },
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{table}");
    println!(
        "\n  Target: {:.1} {unit}  Progress ({range}): {:.0}%",
        user.target_weight,
        displayed_progress(progress)
    );
    Ok(())
}

/// Progress as shown on screen, held to 0-100. `--json` keeps the raw value.
fn displayed_progress(progress: f64) -> f64 {
    progress.clamp(0.0, 100.0)
}
