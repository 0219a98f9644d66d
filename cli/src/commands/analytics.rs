use anyhow::Result;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use platewise_core::analytics::{NutritionRange, nutrition_averages};
use platewise_core::calculations::format_date_for_display;
use platewise_core::service::PlatewiseService;

use super::helpers::{no_neg_zero, print_json};

pub(crate) fn cmd_analytics(svc: &PlatewiseService, range: NutritionRange, json: bool) -> Result<()> {
    let user = svc.current_user()?;
    let series = svc.nutrition_series(range);
    let averages = nutrition_averages(&series);
    let target_protein = svc.profile().effective_protein_target();

    if json {
        return print_json(&serde_json::json!({
            "days": range.days(),
            "averages": averages,
            "target_calories": user.target_calories,
            "target_protein": target_protein,
            "series": series,
        }));
    }

    #[derive(Tabled)]
    struct DayRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Calories")]
        calories: String,
        #[tabled(rename = "Protein")]
        protein: String,
        #[tabled(rename = "Carbs")]
        carbs: String,
        #[tabled(rename = "Fats")]
        fats: String,
    }

    let rows: Vec<DayRow> = series
        .iter()
        .map(|d| DayRow {
            date: format_date_for_display(d.date),
            calories: format!("{:.0}", no_neg_zero(d.calories)),
            protein: format!("{:.0}g", no_neg_zero(d.protein)),
            carbs: format!("{:.0}g", no_neg_zero(d.carbs)),
            fats: format!("{:.0}g", no_neg_zero(d.fats)),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    let days = range.days();
    println!(
        "\n  {days}-day average: {} kcal (target {}) | {} g protein",
        averages.calories, user.target_calories, averages.protein
    );
    if let Some(p) = target_protein {
        println!("  Protein target: {p} g");
    }
    Ok(())
}
