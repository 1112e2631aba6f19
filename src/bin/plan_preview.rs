//! Weekly plan preview: prints a generated 7-day workout plan for the
//! profile configured in coach.toml, with today's entry marked.

use anyhow::{anyhow, Result};
use chrono::Datelike;
use rand::thread_rng;
use tracing_subscriber::EnvFilter;

use kamae_coach::config::Config;
use kamae_coach::plan::{category_of, rep_guideline, weekly_plan, PlanProfile};

const CONFIG_PATH: &str = "coach.toml";

fn main() -> Result<()> {
    // load_or_default reports a malformed config file via tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load_or_default(CONFIG_PATH);
    let profile = PlanProfile::parse(&config.plan.profile)
        .ok_or_else(|| anyhow!("unknown plan profile: {}", config.plan.profile))?;

    let plan = weekly_plan(profile, &mut thread_rng());
    let today = chrono::Local::now().weekday();

    println!("=== {} ===", profile.title());
    println!();
    for day in &plan {
        let label = day.weekday.to_string().to_uppercase();
        let marker = if day.weekday == today { "  <- today" } else { "" };
        println!("{}: {}{}", label, day.title, marker);
        for exercise in &day.exercises {
            println!("- {}", exercise);
            println!("  - Beginner: {}", rep_guideline(category_of(exercise)));
        }
        println!();
    }
    Ok(())
}
