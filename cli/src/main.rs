mod analyzer;
mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::{
    cmd_add, cmd_analytics, cmd_delete, cmd_history, cmd_login, cmd_logout, cmd_onboard, cmd_pin,
    cmd_pinned, cmd_pro_cancel, cmd_pro_status, cmd_pro_subscribe, cmd_profile_calories,
    cmd_profile_goal, cmd_profile_protein, cmd_profile_show, cmd_profile_target_weight,
    cmd_profile_weight, cmd_reset, cmd_scan, cmd_today, cmd_weight_history, parse_month,
};
use crate::config::Config;
use platewise_core::analytics::{NutritionRange, WeightRange};
use platewise_core::models::{Gender, Goal, NewFoodEntry, NewUser, UnitSystem};
use platewise_core::service::PlatewiseService;

const MAX_HISTORY_DAYS: i64 = 3650;

#[derive(Parser)]
#[command(
    name = "platewise",
    version,
    about = "A local-first calorie and protein tracker",
    long_about = "Track meals, weight and daily calorie/protein targets.\n\
                  Photos can be scanned for a nutrition estimate."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create your profile and compute daily targets
    Onboard {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        /// Display name
        #[arg(long)]
        name: String,
        #[arg(long)]
        age: u32,
        /// Current weight, in the chosen unit system
        #[arg(long)]
        weight: f64,
        #[arg(long)]
        target_weight: f64,
        /// bulking, cutting, or maintaining
        #[arg(long, default_value = "maintaining")]
        goal: Goal,
        /// metric (kg) or imperial (lb)
        #[arg(long, default_value = "metric")]
        units: UnitSystem,
        /// male or female
        #[arg(long, default_value = "male")]
        gender: Gender,
        #[arg(long)]
        json: bool,
    },
    /// Log in with your username and password
    Login {
        username: String,
        password: String,
        #[arg(long)]
        json: bool,
    },
    /// Log out
    Logout {
        #[arg(long)]
        json: bool,
    },
    /// Show or update your profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    /// Log a food entry for today
    Add {
        /// Food name
        name: String,
        #[arg(short, long)]
        calories: f64,
        /// Protein in grams
        #[arg(short, long, default_value = "0")]
        protein: f64,
        /// Carbs in grams
        #[arg(long)]
        carbs: Option<f64>,
        /// Fats in grams
        #[arg(long)]
        fats: Option<f64>,
        /// Free-text ingredient list
        #[arg(long)]
        ingredients: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Estimate nutrition from a food photo and log it
    Scan {
        /// Path to the image file
        image: PathBuf,
        /// Use a fixed sample estimate instead of the analysis service
        #[arg(long)]
        offline: bool,
        /// Show the estimate without logging it
        #[arg(long)]
        dry_run: bool,
        #[arg(long)]
        json: bool,
    },
    /// Show today's totals, targets and entries
    Today {
        /// Another day to show (YYYY-MM-DD, today, yesterday)
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Show daily totals for recent days
    History {
        /// Number of days to show (1-3650)
        #[arg(
            short,
            long,
            default_value = "7",
            value_parser = clap::value_parser!(u32).range(1..=MAX_HISTORY_DAYS)
        )]
        days: u32,
        /// Show a whole calendar month instead (YYYY-MM)
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Delete a food entry by id (or unique id prefix)
    Delete {
        id: String,
        #[arg(long)]
        json: bool,
    },
    /// Pin or unpin a food entry (Pro)
    Pin {
        id: String,
        #[arg(long)]
        json: bool,
    },
    /// List pinned entries
    Pinned {
        #[arg(long)]
        json: bool,
    },
    /// Weight tracking
    Weight {
        #[command(subcommand)]
        command: WeightCommands,
    },
    /// Daily nutrition over a range, with averages
    Analytics {
        /// 7d, 14d, or 30d
        #[arg(short, long, default_value = "7d")]
        range: NutritionRange,
        #[arg(long)]
        json: bool,
    },
    /// Manage the Pro subscription
    Pro {
        #[command(subcommand)]
        command: ProCommands,
    },
    /// Delete all logged food, or with --account everything
    Reset {
        /// Also delete the profile and subscription
        #[arg(long)]
        account: bool,
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Show your profile and targets
    Show {
        #[arg(long)]
        json: bool,
    },
    /// Record today's weight
    Weight {
        value: f64,
        #[arg(long)]
        json: bool,
    },
    /// Set the target weight
    TargetWeight {
        value: f64,
        #[arg(long)]
        json: bool,
    },
    /// Change goal and recalculate the calorie target
    Goal {
        goal: Goal,
        #[arg(long)]
        json: bool,
    },
    /// Override the daily calorie target
    Calories {
        value: i64,
        #[arg(long)]
        json: bool,
    },
    /// Override the daily protein target (grams)
    Protein {
        value: i64,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum WeightCommands {
    /// Show logged weights and progress toward the target
    History {
        /// 7d, 30d, 90d, or all
        #[arg(short, long, default_value = "30d")]
        range: WeightRange,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ProCommands {
    /// Upgrade to Pro
    Subscribe {
        #[arg(long)]
        json: bool,
    },
    /// Cancel Pro
    Cancel {
        #[arg(long)]
        json: bool,
    },
    /// Show the current plan
    Status {
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

#[allow(clippy::too_many_lines)]
fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    tracing::debug!(db = %config.db_path.display(), "opening database");
    let mut svc = PlatewiseService::new(&config.db_path)?;

    match cli.command {
        Commands::Onboard {
            username,
            password,
            name,
            age,
            weight,
            target_weight,
            goal,
            units,
            gender,
            json,
        } => {
            let new_user = NewUser {
                username,
                password,
                name,
                age,
                weight,
                target_weight,
                goal,
                unit_system: units,
                gender,
            };
            cmd_onboard(&mut svc, new_user, json)
        }
        Commands::Login {
            username,
            password,
            json,
        } => cmd_login(&mut svc, &username, &password, json),
        Commands::Logout { json } => cmd_logout(&mut svc, json),
        Commands::Profile { command } => match command {
            ProfileCommands::Show { json } => cmd_profile_show(&svc, json),
            ProfileCommands::Weight { value, json } => cmd_profile_weight(&mut svc, value, json),
            ProfileCommands::TargetWeight { value, json } => {
                cmd_profile_target_weight(&mut svc, value, json)
            }
            ProfileCommands::Goal { goal, json } => cmd_profile_goal(&mut svc, goal, json),
            ProfileCommands::Calories { value, json } => {
                cmd_profile_calories(&mut svc, value, json)
            }
            ProfileCommands::Protein { value, json } => cmd_profile_protein(&mut svc, value, json),
        },
        Commands::Add {
            name,
            calories,
            protein,
            carbs,
            fats,
            ingredients,
            json,
        } => {
            let draft = NewFoodEntry {
                name,
                ingredients,
                calories,
                protein,
                carbs,
                fats,
                image_uri: None,
            };
            cmd_add(&mut svc, draft, json)
        }
        Commands::Scan {
            image,
            offline,
            dry_run,
            json,
        } => cmd_scan(
            &mut svc,
            &config.analyzer_url,
            &image,
            offline,
            dry_run,
            json,
        ),
        Commands::Today { date, json } => cmd_today(&svc, date, json),
        Commands::History { days, month, json } => {
            let month = month.as_deref().map(parse_month).transpose()?;
            cmd_history(&svc, days, month, json)
        }
        Commands::Delete { id, json } => cmd_delete(&mut svc, &id, json),
        Commands::Pin { id, json } => cmd_pin(&mut svc, &id, json),
        Commands::Pinned { json } => cmd_pinned(&svc, json),
        Commands::Weight { command } => match command {
            WeightCommands::History { range, json } => cmd_weight_history(&svc, range, json),
        },
        Commands::Analytics { range, json } => cmd_analytics(&svc, range, json),
        Commands::Pro { command } => match command {
            ProCommands::Subscribe { json } => cmd_pro_subscribe(&mut svc, json),
            ProCommands::Cancel { json } => cmd_pro_cancel(&mut svc, json),
            ProCommands::Status { json } => cmd_pro_status(&svc, json),
        },
        Commands::Reset { account, yes, json } => cmd_reset(&mut svc, account, yes, json),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("platewise").chain(args.iter().copied()))
    }

    #[test]
    fn test_history_days_bounds() {
        assert!(parse(&["history", "--days", "30"]).is_ok());
        assert!(parse(&["history", "--days", "3650"]).is_ok());
        assert!(parse(&["history", "--days", "3651"]).is_err());
        assert!(parse(&["history", "--days", "100000000"]).is_err());
        assert!(parse(&["history", "--days", "0"]).is_err());
    }

    #[test]
    fn test_history_days_default() {
        let Commands::History { days, .. } = parse(&["history"]).unwrap().command else {
            panic!("expected history command");
        };
        assert_eq!(days, 7);
    }

    #[test]
    fn test_ranges_parse_from_args() {
        assert!(parse(&["analytics", "--range", "14d"]).is_ok());
        assert!(parse(&["analytics", "--range", "90d"]).is_err());
        assert!(parse(&["weight", "history", "--range", "all"]).is_ok());
    }
}
