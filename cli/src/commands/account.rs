use anyhow::{Result, bail};

use platewise_core::calculations::weight_unit;
use platewise_core::models::NewUser;
use platewise_core::service::PlatewiseService;

use super::helpers::print_json;

pub(crate) fn cmd_onboard(svc: &mut PlatewiseService, new_user: NewUser, json: bool) -> Result<()> {
    let user = svc.onboard(new_user)?;

    if json {
        return print_json(user);
    }

    let unit = weight_unit(user.unit_system);
    println!("Welcome, {}!", user.name);
    println!(
        "  Goal: {} ({:.1} {unit} → {:.1} {unit})",
        user.goal.describe(),
        user.weight,
        user.target_weight
    );
    println!("  Daily calories: {} kcal", user.target_calories);
    if let Some(p) = user.target_protein {
        println!("  Daily protein: {p} g");
    }
    Ok(())
}

pub(crate) fn cmd_login(
    svc: &mut PlatewiseService,
    username: &str,
    password: &str,
    json: bool,
) -> Result<()> {
    if !svc.login(username, password)? {
        bail!("Invalid username or password");
    }
    if json {
        println!("{}", serde_json::json!({ "logged_in": true, "username": username }));
    } else {
        println!("Logged in as {username}");
    }
    Ok(())
}

pub(crate) fn cmd_logout(svc: &mut PlatewiseService, json: bool) -> Result<()> {
    svc.logout()?;
    if json {
        println!("{}", serde_json::json!({ "logged_in": false }));
    } else {
        println!("Logged out");
    }
    Ok(())
}

/// Clear the food log, and with `account` also the profile and subscription.
pub(crate) fn cmd_reset(
    svc: &mut PlatewiseService,
    account: bool,
    yes: bool,
    json: bool,
) -> Result<()> {
    if !yes {
        bail!("This permanently deletes your data. Re-run with --yes to confirm.");
    }

    if account {
        svc.delete_account()?;
    } else {
        svc.clear_all_data()?;
    }

    if json {
        println!(
            "{}",
            serde_json::json!({ "cleared_food_log": true, "deleted_account": account })
        );
    } else if account {
        println!("Deleted your account and all food data");
    } else {
        println!("Cleared all food data");
    }
    Ok(())
}
