//! redress CLI: operator interface to the complaint triage core.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use secrecy::{ExposeSecret, SecretString};

use redress::analytics::{self, FilterSpec, Granularity, TimeRange};
use redress::classify::{Classify, HttpClassifier, KeywordClassifier};
use redress::config::Config;
use redress::export;
use redress::extract::ExtractionProfile;
use redress::ledger::{NotificationLedger, Tab};
use redress::model::{Scope, category_label};
use redress::source::{ComplaintSource, JsonFileSource, NotificationSource};
use redress::storage::LedgerStore;
use redress::telemetry::init_tracing;
use redress::triage::TriageEngine;

#[derive(Parser)]
#[command(name = "redress", about = "Complaint triage and analytics core")]
struct Cli {
    /// JSON snapshot exported from the upstream store
    #[arg(long, global = true, default_value = "snapshot.json")]
    data: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a triage pass and print the urgent queue
    Triage {
        /// Viewer role; omit for the admin (unscoped) view
        #[arg(long)]
        role: Option<String>,
        /// Viewer identity (e.g. email), compared case-insensitively
        #[arg(long, default_value = "")]
        identity: String,
        /// TOML file overriding the text-extraction field order
        #[arg(long)]
        profile: Option<PathBuf>,
    },
    /// Aggregate complaints into the four analytics views
    Analytics {
        /// One of: 7d, 30d, 90d, 1y, all
        #[arg(long, default_value = "30d")]
        time_range: String,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        urgency: Option<String>,
        /// One of: daily, weekly, monthly, yearly
        #[arg(long, default_value = "monthly")]
        granularity: String,
        /// Also write the filtered set as CSV to this path
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Notification ledger operations
    Notifications {
        #[command(subcommand)]
        action: NotificationAction,
    },
    /// Write a small sample snapshot for local runs
    Seed {
        #[arg(long, default_value = "snapshot.json")]
        out: PathBuf,
    },
}

#[derive(Subcommand)]
enum NotificationAction {
    /// List visible notifications
    List {
        /// all | unread
        #[arg(long, default_value = "all")]
        tab: String,
    },
    /// Dismiss the given notification ids
    Dismiss { ids: Vec<String> },
    /// Dismiss every currently visible notification
    DismissAll,
    /// Reverse the most recent delete action (within its undo window)
    Undo,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::from_env();
    init_tracing(&config.log_level)?;

    match cli.command {
        Command::Triage {
            role,
            identity,
            profile,
        } => cmd_triage(&config, cli.data, role, identity, profile).await,
        Command::Analytics {
            time_range,
            category,
            status,
            urgency,
            granularity,
            csv,
        } => {
            cmd_analytics(
                cli.data,
                time_range,
                category,
                status,
                urgency,
                granularity,
                csv,
            )
            .await
        }
        Command::Notifications { action } => cmd_notifications(&config, cli.data, action).await,
        Command::Seed { out } => cmd_seed(out),
    }
}

fn classifier_from(config: &Config) -> anyhow::Result<Arc<dyn Classify>> {
    match config.classifier_url {
        Some(ref url) => {
            let key: Option<SecretString> = config
                .classifier_api_key
                .as_ref()
                .map(|k| SecretString::from(k.expose_secret().to_owned()));
            Ok(Arc::new(HttpClassifier::new(url.clone(), key)?))
        }
        None => Ok(Arc::new(KeywordClassifier)),
    }
}

async fn cmd_triage(
    config: &Config,
    data: PathBuf,
    role: Option<String>,
    identity: String,
    profile: Option<PathBuf>,
) -> anyhow::Result<()> {
    let scope = match role {
        Some(role) => Scope::scoped(role, identity),
        None => Scope::Unscoped,
    };

    let source = Arc::new(JsonFileSource::new(data));
    let mut engine = TriageEngine::new(source, classifier_from(config)?);
    if let Some(path) = profile {
        engine = engine.with_profile(ExtractionProfile::from_toml_file(&path)?);
    }

    let queue = engine.run(&scope).await?;

    if queue.is_empty() {
        println!("All quiet: no urgent complaints in scope.");
        return Ok(());
    }

    println!("{:<12}  {:<10}  {:<24}  SNIPPET", "ID", "URGENCY", "CATEGORY");
    println!("{}", "-".repeat(100));
    for entry in &queue {
        let category = entry
            .category
            .as_deref()
            .map(category_label)
            .unwrap_or("-");
        let snippet: String = entry.snippet.chars().take(48).collect();
        println!(
            "{:<12}  {:<10}  {:<24}  {}",
            entry.complaint_id, entry.urgency, category, snippet
        );
    }
    println!("\n{} urgent complaint(s)", queue.len());
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn cmd_analytics(
    data: PathBuf,
    time_range: String,
    category: Option<String>,
    status: Option<String>,
    urgency: Option<String>,
    granularity: String,
    csv: Option<PathBuf>,
) -> anyhow::Result<()> {
    let filters = FilterSpec {
        time_range: time_range
            .parse::<TimeRange>()
            .map_err(|e| anyhow::anyhow!(e))?,
        category,
        status: status
            .map(|s| s.parse().map_err(|e: String| anyhow::anyhow!(e)))
            .transpose()?,
        urgency: urgency
            .map(|s| s.parse().map_err(|e: String| anyhow::anyhow!(e)))
            .transpose()?,
    };
    let granularity: Granularity = granularity.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let source = JsonFileSource::new(data);
    let complaints = source.list_complaints().await?;
    let report = analytics::aggregate(&complaints, &filters, granularity);

    println!("Records analyzed: {}", report.total());

    println!("\nBy category:");
    for (name, count) in &report.by_category {
        println!("  {:<36} {count}", category_label(name));
    }

    println!("\nBy status:");
    for (name, count) in &report.by_status {
        println!("  {name:<36} {count}");
    }

    println!("\nBy urgency:");
    for (name, count) in &report.by_urgency {
        println!("  {name:<36} {count}");
    }

    println!("\nTimeline ({}):", report.granularity);
    for bucket in &report.by_timeline {
        println!("  {:<36} {}", bucket.label, bucket.count);
    }

    if let Some(path) = csv {
        let mut file = std::fs::File::create(&path)?;
        export::write_csv(&report.filtered, &mut file)?;
        println!("\nCSV written to {}.", path.display());
    }

    Ok(())
}

async fn cmd_notifications(
    config: &Config,
    data: PathBuf,
    action: NotificationAction,
) -> anyhow::Result<()> {
    let store = LedgerStore::open(&config.ledger_db)?;
    let mut ledger = NotificationLedger::new(store)?;
    let source = JsonFileSource::new(data);

    match action {
        NotificationAction::List { tab } => {
            let tab = match tab.as_str() {
                "all" => Tab::All,
                "unread" => Tab::Unread,
                other => anyhow::bail!("unknown tab: {other}"),
            };
            let notifications = source.list_notifications().await?;
            let visible = ledger.visible(&notifications, tab);

            if visible.is_empty() {
                println!("No notifications found.");
                return Ok(());
            }
            for n in &visible {
                let category = n.category.as_deref().map(category_label).unwrap_or("-");
                println!(
                    "{:<12}  {}  [{}]  {}",
                    n.id,
                    n.date.format("%Y-%m-%d %H:%M"),
                    category,
                    n.message
                );
            }
            println!("\n{} notification(s)", visible.len());
        }
        NotificationAction::Dismiss { ids } => {
            anyhow::ensure!(!ids.is_empty(), "no notification ids given");
            if ids.len() == 1 {
                ledger.dismiss(&ids[0])?;
            } else {
                ledger.dismiss_all(ids.clone())?;
            }
            println!("Dismissed {} notification(s).", ids.len());
        }
        NotificationAction::DismissAll => {
            let notifications = source.list_notifications().await?;
            let ids: Vec<String> = ledger
                .visible(&notifications, Tab::All)
                .into_iter()
                .map(|n| n.id)
                .collect();
            let count = ids.len();
            ledger.dismiss_all(ids)?;
            println!("Dismissed {count} notification(s).");
        }
        NotificationAction::Undo => {
            let restored = ledger.undo()?;
            if restored.is_empty() {
                println!("Nothing to undo; the undo window is session-scoped.");
            } else {
                println!("Restored {} notification(s).", restored.len());
            }
        }
    }

    Ok(())
}

fn cmd_seed(out: PathBuf) -> anyhow::Result<()> {
    use chrono::{Duration, Utc};

    let now = Utc::now();
    let snapshot = serde_json::json!({
        "complaints": [
            {
                "id": "C-1001",
                "category": "facilities",
                "status": "pending",
                "urgency": "high",
                "submissionDate": now - Duration::days(2),
                "college": "Engineering",
                "facilityDescription": "Exposed wiring near the stairwell, this is unsafe",
            },
            {
                "id": "C-1002",
                "category": "academic",
                "status": "resolved",
                "urgency": "low",
                "submissionDate": now - Duration::days(40),
                "college": "Sciences",
                "concernDescription": "Grading rubric was unclear for the midterm",
            },
            {
                "id": "C-1003",
                "category": "faculty-conduct",
                "status": "in-progress",
                "urgency": "high",
                "submissionDate": now - Duration::days(5),
                "assignedRole": "kasama",
                "assignedTo": "dana@school.edu",
                "incidentDescription": "Repeated harassment during consultation hours",
            },
        ],
        "notifications": [
            {
                "id": uuid::Uuid::new_v4().to_string(),
                "date": now - Duration::hours(3),
                "type": "status",
                "message": "Your complaint status changed to in-progress",
                "category": "faculty-conduct",
                "complaintId": "C-1003",
            },
            {
                "id": uuid::Uuid::new_v4().to_string(),
                "date": now - Duration::days(1),
                "type": "feedback",
                "message": "New feedback on your complaint",
                "category": "facilities",
                "complaintId": "C-1001",
            },
        ],
    });

    std::fs::write(&out, serde_json::to_string_pretty(&snapshot)?)?;
    println!("Sample snapshot written to {}.", out.display());
    Ok(())
}
