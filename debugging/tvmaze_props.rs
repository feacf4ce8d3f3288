//! Fetch shows from TVMaze and print the mapped records and card text.
//! Usage:
//!   cargo run --bin tvmaze_props -- search <key>
//!   cargo run --bin tvmaze_props -- show <tvmaze_id>
//! Honours TVMAZE_BASE_URL and SHOWSHELF_HTTP_TIMEOUT_SECS (.env supported).

use anyhow::{Context, Result};
use dotenvy::dotenv;
use showshelf::config::Config;
use showshelf::models::ShowRecord;
use showshelf::render::{build_card, Card, CardImage, CardOrigin};
use showshelf::tvmaze::{ShowLookup, TvMazeClient};
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    Search,
    Show,
}

impl FromStr for Mode {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "search" => Ok(Mode::Search),
            "show" => Ok(Mode::Show),
            _ => Err(anyhow::anyhow!("mode must be 'search' or 'show'")),
        }
    }
}

fn print_card(card: &Card) {
    let image = match &card.image {
        CardImage::Thumbnail(url) | CardImage::Preview(url) => url,
    };
    println!("  title   : {}", card.title);
    println!("  image   : {}", image);
    if let Some(cast) = &card.cast_line {
        println!("  cast    : {}", cast);
    }
    println!("  summary : {}", card.summary.replace('\n', " / "));
    println!();
}

fn dump(record: &ShowRecord, detailed: bool) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(record).context("serializing record")?
    );
    print_card(&build_card(record, detailed, CardOrigin::SearchResult, false));
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenv();
    let mut args = env::args().skip(1);
    let mode: Mode = args
        .next()
        .context("usage: tvmaze_props <search|show> <key|id>")?
        .parse()?;
    let target = args.next().context("missing search key or show id")?;

    let config = Config::from_env()?;
    let client = TvMazeClient::new(config.tvmaze_base_url, config.http_timeout)?;

    match mode {
        Mode::Search => {
            let records = client.search_shows(&target).await?;
            println!("{} results for '{}'\n", records.len(), target);
            for record in &records {
                dump(record, false)?;
            }
        }
        Mode::Show => {
            let id: u32 = target
                .parse()
                .with_context(|| format!("show id must be numeric: {target}"))?;
            let record = client.fetch_show(id).await?;
            dump(&record, true)?;
        }
    }
    Ok(())
}
