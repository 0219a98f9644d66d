use anyhow::Result;
use serde::Serialize;

use platewise_core::calculations::{convert_weight, weight_unit};
use platewise_core::models::{Goal, UnitSystem, User};
use platewise_core::service::PlatewiseService;

use super::helpers::print_json;

#[derive(Serialize)]
struct ProfileView<'a> {
    username: &'a str,
    name: &'a str,
    age: u32,
    gender: String,
    unit_system: UnitSystem,
    weight: f64,
    target_weight: f64,
    goal: Goal,
    target_calories: i64,
    target_protein: Option<i64>,
    weight_logs: usize,
}

impl<'a> ProfileView<'a> {
    fn new(user: &'a User, target_protein: Option<i64>) -> Self {
        Self {
            username: &user.username,
            name: &user.name,
            age: user.age,
            gender: user.gender.to_string(),
            unit_system: user.unit_system,
            weight: user.weight,
            target_weight: user.target_weight,
            goal: user.goal,
            target_calories: user.target_calories,
            target_protein,
            weight_logs: user.weight_logs.len(),
        }
    }
}

pub(crate) fn cmd_profile_show(svc: &PlatewiseService, json: bool) -> Result<()> {
    let user = svc.current_user()?;
    let protein = svc.profile().effective_protein_target();

    if json {
        return print_json(&ProfileView::new(user, protein));
    }

    let unit = weight_unit(user.unit_system);
    let other = match user.unit_system {
        UnitSystem::Metric => UnitSystem::Imperial,
        UnitSystem::Imperial => UnitSystem::Metric,
    };
    let other_unit = weight_unit(other);

    println!("{} (@{})", user.name, user.username);
    println!("  Age: {}  Gender: {}", user.age, user.gender);
    println!(
        "  Weight: {:.1} {unit} ({:.1} {other_unit})",
        user.weight,
        convert_weight(user.weight, user.unit_system, other)
    );
    println!(
        "  Target weight: {:.1} {unit} ({:.1} {other_unit})",
        user.target_weight,
        convert_weight(user.target_weight, user.unit_system, other)
    );
    println!("  Goal: {}", user.goal.describe());
    println!("  Daily calories: {} kcal", user.target_calories);
    if let Some(p) = protein {
        println!("  Daily protein: {p} g");
    }
    Ok(())
}

pub(crate) fn cmd_profile_weight(svc: &mut PlatewiseService, weight: f64, json: bool) -> Result<()> {
    let user = svc.update_weight(weight)?;
    if json {
        return print_json(&user.weight_logs);
    }
    let unit = weight_unit(user.unit_system);
    println!("Logged {:.1} {unit} for today", user.weight);
    Ok(())
}

pub(crate) fn cmd_profile_target_weight(
    svc: &mut PlatewiseService,
    weight: f64,
    json: bool,
) -> Result<()> {
    let user = svc.update_target_weight(weight)?;
    if json {
        println!("{}", serde_json::json!({ "target_weight": user.target_weight }));
    } else {
        let unit = weight_unit(user.unit_system);
        println!("Target weight set to {:.1} {unit}", user.target_weight);
    }
    Ok(())
}

pub(crate) fn cmd_profile_goal(svc: &mut PlatewiseService, goal: Goal, json: bool) -> Result<()> {
    let user = svc.update_goal(goal)?;
    if json {
        println!(
            "{}",
            serde_json::json!({ "goal": user.goal, "target_calories": user.target_calories })
        );
    } else {
        println!("Goal set to {}", user.goal.describe());
        println!("  Daily calories recalculated: {} kcal", user.target_calories);
    }
    Ok(())
}

pub(crate) fn cmd_profile_calories(
    svc: &mut PlatewiseService,
    calories: i64,
    json: bool,
) -> Result<()> {
    let user = svc.update_target_calories(calories)?;
    if json {
        println!("{}", serde_json::json!({ "target_calories": user.target_calories }));
    } else {
        println!("Daily calorie target set to {} kcal", user.target_calories);
    }
    Ok(())
}

pub(crate) fn cmd_profile_protein(
    svc: &mut PlatewiseService,
    protein: i64,
    json: bool,
) -> Result<()> {
    let user = svc.update_target_protein(protein)?;
    if json {
        println!("{}", serde_json::json!({ "target_protein": user.target_protein }));
    } else {
        println!("Daily protein target set to {protein} g");
    }
    Ok(())
}
