//! Leavedesk report runner.
//!
//! Usage:
//!   reporter daily <team_id> [date]              - Daily shrinkage (defaults to today)
//!   reporter monthly <team_id> <year> <month>    - Monthly shrinkage
//!   reporter carry-forward <team_id> <year> <month>
//!   reporter forecast <user_id>                  - Rolling forecast for a user's team
//!   reporter pending <manager_id>                - Pending approvals of direct reports
//!   reporter balances <user_id>                  - Balances and monthly quota
//!
//! Every report is printed to stdout as JSON.

use anyhow::{Context, bail};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use leavedesk_core::{ReportService, ShrinkageCalculator};
use leavedesk_shared::AppConfig;
use leavedesk_shared::types::{TeamId, UserId};

const USAGE: &str = "usage: reporter <daily|monthly|carry-forward|forecast|pending|balances> <args...>";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "leavedesk=info,sea_orm=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        bail!(USAGE);
    };

    let config = AppConfig::load().context("Failed to load configuration")?;
    let db = leavedesk_db::connect(&config.database)
        .await
        .context("Failed to connect to database")?;
    info!("Connected to database");

    let stores = leavedesk_db::stores(&db);
    let calculator = ShrinkageCalculator::new(stores.clone(), config.policy.clone());
    let reports = ReportService::new(stores, config.policy.clone());
    let today = Utc::now().date_naive();

    match command.as_str() {
        "daily" => {
            let team_id: TeamId = parse(&args, 1, "team_id")?;
            let date = match args.get(2) {
                Some(raw) => raw.parse::<NaiveDate>().context("date must be YYYY-MM-DD")?,
                None => today,
            };
            print(&calculator.dashboard_shrinkage(team_id, date).await)
        }
        "monthly" => {
            let team_id: TeamId = parse(&args, 1, "team_id")?;
            let (year, month) = (parse(&args, 2, "year")?, parse(&args, 3, "month")?);
            let shrinkage = calculator.monthly_shrinkage(team_id, year, month).await?;
            print(&serde_json::json!({
                "team_id": team_id,
                "year": year,
                "month": month,
                "shrinkage": shrinkage,
            }))
        }
        "carry-forward" => {
            let team_id: TeamId = parse(&args, 1, "team_id")?;
            let (year, month) = (parse(&args, 2, "year")?, parse(&args, 3, "month")?);
            print(&calculator.weekly_carry_forward(team_id, year, month).await?)
        }
        "forecast" => {
            let user_id: UserId = parse(&args, 1, "user_id")?;
            print(&calculator.forecast(user_id).await?)
        }
        "pending" => {
            let manager_id: UserId = parse(&args, 1, "manager_id")?;
            print(&reports.pending_approvals(manager_id, today).await?)
        }
        "balances" => {
            let user_id: UserId = parse(&args, 1, "user_id")?;
            print(&reports.balance_summary(user_id).await?)
        }
        other => bail!("unknown report '{other}'\n{USAGE}"),
    }
}

fn parse<T>(args: &[String], index: usize, name: &str) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = args.get(index).with_context(|| format!("missing <{name}>\n{USAGE}"))?;
    raw.parse::<T>()
        .map_err(|e| anyhow::anyhow!("invalid {name} '{raw}': {e}"))
}

fn print<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
