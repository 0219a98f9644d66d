use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use platewise_core::analysis::{FoodImageAnalyzer, OfflineAnalyzer};
use platewise_core::calculations::{
    calculate_progress, days_in_month, format_date, format_date_for_display, last_n_days, today,
};
use platewise_core::ledger::{FREE_DAILY_ENTRY_LIMIT, PinOutcome};
use platewise_core::models::{DailyStats, FoodEntry, NewFoodEntry};
use platewise_core::service::PlatewiseService;

use super::helpers::{
    exit_nothing_done, no_neg_zero, parse_date, print_entries_table, print_json, short_id,
};
use crate::analyzer::LlmAnalyzerClient;

fn limit_message() -> String {
    format!(
        "Free plan allows {FREE_DAILY_ENTRY_LIMIT} entries per day. \
         Run `platewise pro subscribe` to log more."
    )
}

fn report_added(entry: &FoodEntry, json: bool) -> Result<()> {
    if json {
        return print_json(entry);
    }
    println!(
        "Logged [{}] {} ({:.0} kcal, {:.1}g protein)",
        short_id(&entry.id),
        entry.name,
        no_neg_zero(entry.calories),
        no_neg_zero(entry.protein)
    );
    Ok(())
}

pub(crate) fn cmd_add(svc: &mut PlatewiseService, draft: NewFoodEntry, json: bool) -> Result<()> {
    match svc.add_entry(draft)? {
        Some(entry) => report_added(&entry, json),
        None => exit_nothing_done(&limit_message(), json),
    }
}

/// Estimate nutrition from a photo and log it unless `dry_run` is set.
pub(crate) fn cmd_scan(
    svc: &mut PlatewiseService,
    analyzer_url: &str,
    image: &Path,
    offline: bool,
    dry_run: bool,
    json: bool,
) -> Result<()> {
    svc.current_user()?;
    let bytes = std::fs::read(image)
        .with_context(|| format!("Failed to read image: {}", image.display()))?;

    let analysis = if offline {
        svc.analyze_food_image(&OfflineAnalyzer, &bytes)?
    } else {
        let client = LlmAnalyzerClient::new(analyzer_url)?;
        let analyzer: &dyn FoodImageAnalyzer = &client;
        tokio::task::block_in_place(|| svc.analyze_food_image(analyzer, &bytes)).inspect_err(
            |e| tracing::error!(error = %format!("{e:#}"), "food image analysis failed"),
        )?
    };

    if dry_run {
        if json {
            return print_json(&analysis);
        }
        println!("{}", analysis.name);
        println!(
            "  {:.0} kcal | P:{:.1}g C:{:.1}g F:{:.1}g",
            analysis.calories,
            analysis.protein,
            analysis.carbs.unwrap_or(0.0),
            analysis.fats.unwrap_or(0.0)
        );
        return Ok(());
    }

    let image_uri = std::fs::canonicalize(image)
        .unwrap_or_else(|_| image.to_path_buf())
        .display()
        .to_string();
    match svc.add_entry(analysis.into_new_entry(Some(image_uri)))? {
        Some(entry) => report_added(&entry, json),
        None => exit_nothing_done(&limit_message(), json),
    }
}

#[derive(Serialize)]
struct DayView<'a> {
    date: String,
    totals: DailyStats,
    target_calories: i64,
    target_protein: Option<i64>,
    calorie_progress: f64,
    protein_progress: f64,
    entries: Vec<&'a FoodEntry>,
}

#[allow(clippy::cast_precision_loss)]
pub(crate) fn cmd_today(svc: &PlatewiseService, date: Option<String>, json: bool) -> Result<()> {
    let user = svc.current_user()?;
    let date = parse_date(date)?;
    let entries = svc.ledger().entries_on(date);
    let totals = svc.ledger().stats_on(date);
    let target_protein = svc.profile().effective_protein_target();

    let view = DayView {
        date: format_date(date),
        totals,
        target_calories: user.target_calories,
        target_protein,
        calorie_progress: calculate_progress(totals.calories, user.target_calories as f64),
        protein_progress: target_protein
            .map_or(0.0, |p| calculate_progress(totals.protein, p as f64)),
        entries,
    };

    if json {
        return print_json(&view);
    }

    println!("=== {} ===\n", format_date_for_display(date));
    let cal = no_neg_zero(totals.calories);
    println!(
        "  Calories: {cal:.0} / {} kcal ({:.0}%)",
        user.target_calories, view.calorie_progress
    );
    if let Some(p) = target_protein {
        let prot = no_neg_zero(totals.protein);
        println!("  Protein:  {prot:.0} / {p} g ({:.0}%)", view.protein_progress);
    }
    println!(
        "  Carbs: {:.0}g  Fats: {:.0}g\n",
        no_neg_zero(totals.carbs),
        no_neg_zero(totals.fats)
    );

    if view.entries.is_empty() {
        eprintln!("No entries for {}", view.date);
        std::process::exit(2);
    }
    print_entries_table(&view.entries, |id| svc.ledger().is_pinned(id));
    Ok(())
}

pub(crate) fn cmd_history(
    svc: &PlatewiseService,
    days: u32,
    month: Option<(i32, u32)>,
    json: bool,
) -> Result<()> {
    #[derive(Tabled)]
    struct HistoryRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Entries")]
        entries: usize,
        #[tabled(rename = "Calories")]
        calories: String,
        #[tabled(rename = "Protein")]
        protein: String,
        #[tabled(rename = "Carbs")]
        carbs: String,
        #[tabled(rename = "Fats")]
        fats: String,
    }

    let dates: Vec<NaiveDate> = match month {
        Some((year, m)) => {
            let n = days_in_month(year, m);
            (1..=n)
                .filter_map(|d| NaiveDate::from_ymd_opt(year, m, d))
                .collect()
        }
        None => last_n_days(days, today()),
    };

    let logs: Vec<_> = dates
        .iter()
        .rev()
        .filter_map(|d| svc.daily_log(*d))
        .collect();

    if json {
        return print_json(&logs);
    }
    if logs.is_empty() {
        eprintln!("No entries in this period");
        std::process::exit(2);
    }

    let rows: Vec<HistoryRow> = logs
        .iter()
        .map(|l| HistoryRow {
            date: format_date_for_display(l.date),
            entries: l.entries.len(),
            calories: format!("{:.0}", no_neg_zero(l.total_calories)),
            protein: format!("{:.0}g", no_neg_zero(l.total_protein)),
            carbs: format!("{:.0}g", no_neg_zero(l.total_carbs)),
            fats: format!("{:.0}g", no_neg_zero(l.total_fats)),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{table}");
    Ok(())
}

pub(crate) fn cmd_delete(svc: &mut PlatewiseService, id: &str, json: bool) -> Result<()> {
    let id = svc.resolve_entry_id(id)?;
    let Some(entry) = svc.remove_entry(&id)? else {
        exit_nothing_done(&format!("No entry with id '{id}'"), json);
    };

    if json {
        println!("{}", serde_json::json!({ "deleted": entry.id }));
    } else {
        println!("Deleted [{}] {}", short_id(&entry.id), entry.name);
    }
    Ok(())
}

pub(crate) fn cmd_pin(svc: &mut PlatewiseService, id: &str, json: bool) -> Result<()> {
    let id = svc.resolve_entry_id(id)?;
    let outcome = svc.toggle_pin_entry(&id)?;

    let message = match outcome {
        PinOutcome::Pinned => format!("Pinned [{}]", short_id(&id)),
        PinOutcome::Unpinned => format!("Unpinned [{}]", short_id(&id)),
        PinOutcome::Rejected => {
            exit_nothing_done("Pinning meals is a Pro feature. Run `platewise pro subscribe`.", json)
        }
        PinOutcome::NotFound => exit_nothing_done(&format!("No entry with id '{id}'"), json),
    };

    if json {
        println!("{}", serde_json::json!({ "id": id, "outcome": outcome }));
    } else {
        println!("{message}");
    }
    Ok(())
}

pub(crate) fn cmd_pinned(svc: &PlatewiseService, json: bool) -> Result<()> {
    let pinned = svc.ledger().pinned_entries();
    if json {
        return print_json(&pinned);
    }
    if pinned.is_empty() {
        eprintln!("No pinned meals. Use `platewise pin <id>` to pin one.");
        std::process::exit(2);
    }
    print_entries_table(&pinned, |_| true);
    Ok(())
}
