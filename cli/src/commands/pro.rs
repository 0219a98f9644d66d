use anyhow::Result;

use platewise_core::ledger::FREE_DAILY_ENTRY_LIMIT;
use platewise_core::service::PlatewiseService;

use super::helpers::print_json;

pub(crate) fn cmd_pro_subscribe(svc: &mut PlatewiseService, json: bool) -> Result<()> {
    if svc.subscription().is_pro() {
        eprintln!("Already subscribed to Pro");
    } else {
        svc.set_pro_status(true)?;
        if !json {
            println!("Welcome to Pro! Unlimited entries and meal pinning are now unlocked.");
        }
    }
    if json {
        return print_json(&svc.subscription().state());
    }
    Ok(())
}

pub(crate) fn cmd_pro_cancel(svc: &mut PlatewiseService, json: bool) -> Result<()> {
    svc.cancel_subscription()?;
    if json {
        return print_json(&svc.subscription().state());
    }
    println!("Pro subscription cancelled. Back to {FREE_DAILY_ENTRY_LIMIT} entries per day.");
    Ok(())
}

pub(crate) fn cmd_pro_status(svc: &PlatewiseService, json: bool) -> Result<()> {
    let state = svc.subscription().state();
    if json {
        return print_json(&state);
    }
    match (state.is_pro, state.subscription_date) {
        (true, Some(since)) => println!("Plan: Pro (since {})", since.format("%Y-%m-%d")),
        (true, None) => println!("Plan: Pro"),
        (false, _) => println!("Plan: Free ({FREE_DAILY_ENTRY_LIMIT} entries per day, no pinning)"),
    }
    Ok(())
}
