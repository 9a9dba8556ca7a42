mod api;
mod config;
mod db;
mod models;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use csv::Writer;
use dotenvy::dotenv;
use std::{env, path::Path, path::PathBuf};

use api::PolygonClient;
use models::{Candle, CandlesResult, Unit};

#[derive(Parser)]
#[command(name = "polygon-candles")]
#[command(about = "Fetch OHLCV candles from Polygon.io and load them into SQLite")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch candles for one symbol and load them into the database
    Fetch {
        /// Ticker symbol, e.g. AAPL
        #[arg(long)]
        symbol: String,
        /// Bar interval, combined with --unit (e.g. 1 minute)
        #[arg(long, default_value_t = 1)]
        interval: u32,
        /// Bar unit: day, hour or minute
        #[arg(long)]
        unit: String,
        /// Range start date (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,
        /// Range end date (YYYY-MM-DD)
        #[arg(long)]
        end: NaiveDate,
        /// Maximum number of bars to request (single page, no pagination)
        #[arg(long, default_value_t = api::DEFAULT_LIMIT)]
        limit: u32,
        /// Request split-adjusted prices
        #[arg(long)]
        adjusted: bool,
        /// Target table name; defaults to {symbol}_klines
        #[arg(long)]
        table: Option<String>,
        /// Also export the candles to a CSV file under output/
        #[arg(long)]
        csv: bool,
    },
    /// List tickers (first page of the reference endpoint)
    Symbols,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let cli = Cli::parse();
    let api_key = env::var("POLYGON_API_KEY").expect("POLYGON_API_KEY must be set");
    let client = PolygonClient::new(api_key);

    match cli.command {
        Command::Fetch {
            symbol,
            interval,
            unit,
            start,
            end,
            limit,
            adjusted,
            table,
            csv,
        } => {
            fetch_candles(
                &client, &symbol, interval, &unit, start, end, limit, adjusted, table, csv,
            )
            .await?
        }
        Command::Symbols => list_symbols(&client).await?,
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn fetch_candles(
    client: &PolygonClient,
    symbol: &str,
    interval: u32,
    unit: &str,
    start: NaiveDate,
    end: NaiveDate,
    limit: u32,
    adjusted: bool,
    table: Option<String>,
    csv: bool,
) -> Result<()> {
    let mut extra = Vec::new();
    if adjusted {
        extra.push(("adjusted".to_string(), "true".to_string()));
    }

    println!(
        "Fetching {} {}/{} candles from {} to {} ⌛️",
        symbol, interval, unit, start, end
    );
    let candles = match client
        .get_candles(symbol, interval, unit, start, end, limit, &extra)
        .await?
    {
        CandlesResult::Candles(candles) => candles,
        CandlesResult::InvalidUnit(given) => {
            eprintln!(
                "Invalid unit '{}'. Use one of: {}",
                given,
                Unit::valid_units()
            );
            std::process::exit(2);
        }
    };
    println!("✅ {} candles received", candles.len());

    let config = config::Config::default();
    let db_url = env::var("DATABASE_URL").unwrap_or(config.database_url);
    let table = table.unwrap_or_else(|| format!("{}_klines", symbol.to_lowercase()));

    let pool = db::create_db_pool(&db_url).await?;
    db::replace_candles(&pool, &table, &candles).await?;
    println!(
        "✅ {} rows loaded into {}",
        db::count_candles(&pool, &table).await?,
        table
    );

    if csv {
        let csv_path = export_candles_csv(symbol, &candles)?;
        println!("✅ CSV file created at: {}", csv_path.display());
    }

    Ok(())
}

async fn list_symbols(client: &PolygonClient) -> Result<()> {
    let tickers = client.get_symbols().await?;

    println!("{} tickers (first page):", tickers.len());
    for ticker in &tickers {
        println!("{}  {}", ticker.ticker, ticker.name.as_deref().unwrap_or(""));
    }

    Ok(())
}

fn export_candles_csv(symbol: &str, candles: &[Candle]) -> Result<PathBuf> {
    // Create output directory if it doesn't exist
    let output_dir = PathBuf::from("output");
    std::fs::create_dir_all(&output_dir)?;

    // Create CSV file with timestamp
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let csv_path = output_dir.join(format!("{}_candles_{}.csv", symbol.to_lowercase(), timestamp));
    write_candles_csv(&csv_path, candles)?;

    Ok(csv_path)
}

fn write_candles_csv(path: &Path, candles: &[Candle]) -> Result<()> {
    let mut writer = Writer::from_path(path)?;

    writer.write_record(["time", "open", "high", "low", "close", "volume"])?;
    for candle in candles {
        writer.write_record(&[
            candle.time.format("%Y-%m-%d %H:%M:%S").to_string(),
            candle.open.to_string(),
            candle.high.to_string(),
            candle.low.to_string(),
            candle.close.to_string(),
            candle.volume.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
