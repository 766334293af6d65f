use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::time::Duration;

use crate::advice::{AdviceDesk, GeminiClient, NO_TIPS_MESSAGE, RequestOutcome};
use crate::application::{Dashboard, LedgerStore};
use crate::config::{
    AdviceConfig, DEFAULT_ADVICE_ENDPOINT, DEFAULT_ADVICE_MODEL, DEFAULT_ADVICE_TIMEOUT_SECS,
    DEFAULT_DATABASE,
};
use crate::domain::{Category, Cents, NewTransaction, Transaction, format_brl};
use crate::storage::Repository;

/// Domus - household cash-flow ledger
#[derive(Parser)]
#[command(name = "domus")]
#[command(about = "Record income and expenses, chart them, and ask for budgeting tips")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "DOMUS_DATABASE", default_value = DEFAULT_DATABASE)]
    pub database: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record an income or an expense
    Add {
        /// What the money was for (e.g., "Aluguel", "Supermercado")
        description: String,

        /// Amount (e.g., "50.00" or "50")
        amount: String,

        /// Type: income or expense
        #[arg(short = 't', long = "type", default_value = "expense")]
        kind: String,

        /// Category key or label (see `domus categories`)
        #[arg(short, long, default_value = "housing")]
        category: String,

        /// Date of the transaction (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Delete a transaction by id
    Delete {
        /// Transaction ID
        id: String,
    },

    /// Show transaction history, newest first
    List {
        /// Maximum number of transactions to show
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Show total income, total expenses and balance
    Summary {
        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Chart data
    #[command(subcommand)]
    Chart(ChartCommands),

    /// Print summary, daily flow and category shares as one JSON document
    Dashboard,

    /// Ask the AI for budgeting tips
    Advice(AdviceArgs),

    /// Export data to CSV or JSON
    Export {
        /// What to export: transactions, daily, categories, json
        export_type: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// List the available categories
    Categories,
}

#[derive(Subcommand)]
pub enum ChartCommands {
    /// Income and expenses per day
    Daily {
        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Expenses per category
    Categories {
        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },
}

#[derive(Args)]
pub struct AdviceArgs {
    /// Generative Language API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model identifier
    #[arg(long, env = "DOMUS_ADVICE_MODEL", default_value = DEFAULT_ADVICE_MODEL)]
    pub model: String,

    /// API base URL
    #[arg(long, env = "DOMUS_ADVICE_ENDPOINT", default_value = DEFAULT_ADVICE_ENDPOINT)]
    pub endpoint: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_ADVICE_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

impl AdviceArgs {
    pub fn to_config(&self) -> AdviceConfig {
        let config = AdviceConfig::default()
            .with_model(self.model.clone())
            .with_endpoint(self.endpoint.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs));

        match &self.api_key {
            Some(key) => config.with_api_key(key.clone()),
            None => config,
        }
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let repo = Repository::open(&self.database)
            .await
            .with_context(|| format!("Failed to open database: {}", self.database))?;
        let mut store = LedgerStore::open(repo).await;

        match self.command {
            Commands::Add {
                description,
                amount,
                kind,
                category,
                date,
            } => {
                let draft =
                    NewTransaction::parse(&description, &amount, &kind, &category, date.as_deref())?;
                let tx = store.add(draft).await?;

                println!(
                    "Recorded {}: {} {} [{}] ({})",
                    tx.transaction_type.as_str().to_lowercase(),
                    tx.description,
                    format_brl(tx.amount),
                    tx.category,
                    tx.id
                );
            }

            Commands::Delete { id } => match store.delete(&id).await? {
                Some(tx) => println!("Deleted: {} {}", tx.description, format_brl(tx.amount)),
                None => println!("No transaction with id {}, nothing to delete.", id),
            },

            Commands::List { limit, format } => {
                let shown = limit.unwrap_or(usize::MAX).min(store.len());
                print_history(&store.transactions()[..shown], &format)?;
            }

            Commands::Summary { format } => {
                let summary = store.summary();
                match format.as_str() {
                    "json" => println!("{}", serde_json::to_string_pretty(&summary)?),
                    _ => {
                        println!("Income:    {:>18}", format_brl(summary.total_income));
                        println!("Expenses:  {:>18}", format_brl(summary.total_expenses));
                        println!("{}", "-".repeat(29));
                        println!("Balance:   {:>18}", format_brl(summary.balance));
                    }
                }
            }

            Commands::Chart(chart_cmd) => run_chart_command(&store.dashboard(), chart_cmd)?,

            Commands::Dashboard => {
                println!("{}", serde_json::to_string_pretty(&store.dashboard())?);
            }

            Commands::Advice(args) => {
                let client = GeminiClient::new(&args.to_config())
                    .context("Failed to build advice client")?;
                let mut desk = AdviceDesk::new(client);

                if desk.request(store.snapshot()) == RequestOutcome::Started {
                    eprintln!("Analyzing {} transaction(s)...", store.len());
                }
                let slot = desk.wait().await;

                println!("{}", slot.advice.as_deref().unwrap_or(NO_TIPS_MESSAGE));
            }

            Commands::Export {
                export_type,
                output,
            } => run_export_command(store.transactions(), &export_type, output.as_deref())?,

            Commands::Categories => {
                println!("{:<12} {}", "KEY", "LABEL");
                println!("{}", "-".repeat(26));
                for category in Category::ALL {
                    println!("{:<12} {}", category.key(), category.label());
                }
            }
        }

        Ok(())
    }
}

fn print_history(transactions: &[Transaction], format: &str) -> Result<()> {
    if format == "json" {
        println!("{}", serde_json::to_string_pretty(transactions)?);
        return Ok(());
    }

    if transactions.is_empty() {
        println!("No transactions recorded.");
        println!("Start by adding your income and expenses.");
        return Ok(());
    }

    println!(
        "{:<36}  {:<10}  {:<24}  {:<14}  {:>16}",
        "ID", "DATE", "DESCRIPTION", "CATEGORY", "AMOUNT"
    );
    println!("{}", "-".repeat(108));
    for tx in transactions {
        let sign = if tx.is_income() { '+' } else { '-' };
        println!(
            "{:<36}  {:<10}  {:<24}  {:<14}  {:>16}",
            truncate(&tx.id, 36),
            tx.date.format("%d/%m/%Y"),
            truncate(&tx.description, 24),
            tx.category.label(),
            format!("{} {}", sign, format_brl(tx.amount))
        );
    }

    Ok(())
}

fn run_chart_command(dashboard: &Dashboard, cmd: ChartCommands) -> Result<()> {
    const BAR_WIDTH: usize = 30;

    match cmd {
        ChartCommands::Daily { format } => {
            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&dashboard.daily_flow)?);
                return Ok(());
            }
            if dashboard.daily_flow.is_empty() {
                println!("No data to chart.");
                return Ok(());
            }

            let max = dashboard
                .daily_flow
                .iter()
                .map(|d| d.income.max(d.expense))
                .max()
                .unwrap_or(0);

            println!("Daily Flow");
            println!();
            for day in &dashboard.daily_flow {
                println!(
                    "{}  + {:<width$} {}",
                    day.date.format("%Y-%m-%d"),
                    bar(day.income, max, BAR_WIDTH),
                    format_brl(day.income),
                    width = BAR_WIDTH
                );
                println!(
                    "{:10}  - {:<width$} {}",
                    "",
                    bar(day.expense, max, BAR_WIDTH),
                    format_brl(day.expense),
                    width = BAR_WIDTH
                );
            }
        }

        ChartCommands::Categories { format } => {
            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&dashboard.categories)?);
                return Ok(());
            }
            if dashboard.categories.is_empty() {
                println!("No expenses to chart.");
                return Ok(());
            }

            let max = dashboard
                .categories
                .iter()
                .map(|c| c.total)
                .max()
                .unwrap_or(0);

            println!("Spending by Category");
            println!();
            for share in &dashboard.categories {
                println!(
                    "{:<14} {:<width$} {:>16} ({:.1}%)",
                    share.category.label(),
                    bar(share.total, max, BAR_WIDTH),
                    format_brl(share.total),
                    share.percentage,
                    width = BAR_WIDTH
                );
            }
        }
    }

    Ok(())
}

fn run_export_command(
    transactions: &[Transaction],
    export_type: &str,
    output: Option<&str>,
) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::{Write, stdout};

    let exporter = Exporter::new(transactions);

    // Determine output writer
    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    let (count, noun) = match export_type {
        "transactions" => (exporter.export_transactions_csv(writer)?, "transactions"),
        "daily" => (exporter.export_daily_flow_csv(writer)?, "days"),
        "categories" => (exporter.export_categories_csv(writer)?, "categories"),
        "json" => (exporter.export_json(writer)?, "transactions"),
        _ => {
            anyhow::bail!(
                "Invalid export type '{}'. Valid types: transactions, daily, categories, json",
                export_type
            );
        }
    };

    if output.is_some() {
        eprintln!("Exported {} {}", count, noun);
    }

    Ok(())
}

/// Horizontal bar proportional to `value / max`.
fn bar(value: Cents, max: Cents, width: usize) -> String {
    if max <= 0 || value <= 0 {
        return String::new();
    }
    let len = ((value as f64 / max as f64) * width as f64).round() as usize;
    "#".repeat(len.clamp(1, width))
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
