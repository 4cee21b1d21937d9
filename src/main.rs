use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use std::path::PathBuf;
use tracing::{debug, warn};

mod config;
mod model;
mod store;
mod topics;
mod youtube;

use crate::config::Config;
use crate::model::{Priority, Status};
use crate::store::Library;
use crate::topics::TopicExtractor;
use crate::youtube::{VideoProvider, YtDlpProvider};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("yt_tracker=info,warn")
        .init();

    let matches = Command::new("YouTube Learning Tracker")
        .version("0.1.0")
        .about("Track YouTube videos to watch, with duration buckets and transcript topics")
        .arg(
            Arg::new("data-dir")
                .short('d')
                .long("data-dir")
                .value_name("DIR")
                .help("Directory holding the workbook and sidecar stores")
                .global(true),
        )
        .subcommand(
            Command::new("add")
                .about("Fetch a video's details and add it to the tracker")
                .arg(Arg::new("url").value_name("URL").required(true))
                .arg(
                    Arg::new("priority")
                        .short('p')
                        .long("priority")
                        .value_name("PRIORITY")
                        .help("High, Medium, or Low")
                        .default_value("Medium"),
                ),
        )
        .subcommand(Command::new("list").about("List tracked videos by priority"))
        .subcommand(
            Command::new("toggle")
                .about("Flip a video's completion status")
                .arg(Arg::new("url").value_name("URL").required(true)),
        )
        .subcommand(
            Command::new("topics")
                .about("Show a video's topics, computing them if needed")
                .arg(Arg::new("url").value_name("URL").required(true)),
        )
        .subcommand(
            Command::new("transcript")
                .about("Show a video's transcript and topics")
                .arg(Arg::new("url").value_name("URL").required(true)),
        )
        .subcommand_required(true)
        .get_matches();

    // Load configuration
    let mut config = Config::load().unwrap_or_else(|e| {
        warn!("Failed to load config, using defaults: {}", e);
        Config::default()
    });
    if let Some(dir) = matches.get_one::<String>("data-dir") {
        config.storage.data_dir = PathBuf::from(dir);
    }
    config.validate()?;
    debug!("{}", config.summary());

    let extractor = match &config.topics.stop_words_file {
        Some(path) => TopicExtractor::from_file(path).await?,
        None => TopicExtractor::new(),
    };
    let provider = YtDlpProvider::new(config.provider.clone())?;
    let mut library = Library::open(
        config.storage.workbook_path(),
        config.storage.sidecar_path(),
    )
    .await?;

    match matches.subcommand() {
        Some(("add", sub)) => cmd_add(&mut library, &provider, &extractor, &config, sub).await,
        Some(("list", _)) => cmd_list(&library),
        Some(("toggle", sub)) => cmd_toggle(&mut library, sub).await,
        Some(("topics", sub)) => cmd_topics(&mut library, &provider, &extractor, &config, sub).await,
        Some(("transcript", sub)) => {
            cmd_transcript(&mut library, &provider, &extractor, &config, sub).await
        }
        _ => unreachable!("subcommand required"),
    }
}

async fn cmd_add(
    library: &mut Library,
    provider: &YtDlpProvider,
    extractor: &TopicExtractor,
    config: &Config,
    sub: &ArgMatches,
) -> Result<()> {
    let url = sub.get_one::<String>("url").expect("required arg");
    let priority: Priority = sub
        .get_one::<String>("priority")
        .expect("has default")
        .parse()?;

    // Reject URLs with no recognizable video identifier before touching
    // anything
    let video_id = provider.video_id(url)?;

    let details = provider.fetch_details(url).await?;
    let bucket = library.record_video(
        url,
        &details.title,
        &details.author,
        details.duration_hours,
        priority,
    )?;

    // A missing transcript is not fatal for adding; the video just starts
    // with no topics
    let topics = match provider.fetch_transcript(&video_id).await {
        Ok(text) => extractor.extract_keywords(&text, config.topics.keyword_count),
        Err(e) => {
            warn!("No topics for {}: {}", url, e);
            Vec::new()
        }
    };
    library.update_derived(url, topics.clone(), Status::NotStarted).await?;

    println!(
        "Added '{}' by {} ({}) to '{}'",
        details.title,
        details.author,
        model::format_duration_hours(details.duration_hours),
        bucket.sheet_name()
    );
    if !topics.is_empty() {
        println!("Topics: {}", topics.join(", "));
    }
    Ok(())
}

fn cmd_list(library: &Library) -> Result<()> {
    let records = library.records_by_priority();
    if records.is_empty() {
        println!("No videos tracked yet.");
        return Ok(());
    }

    for record in records {
        println!(
            "[{:6}] {:11}  {:>12}  {} — {}  ({})",
            record.priority.to_string(),
            record.status.to_string(),
            record.duration_cell(),
            record.title,
            record.author,
            record.bucket().sheet_name(),
        );
        if !record.topics.is_empty() {
            println!("         topics: {}", record.topics.join(", "));
        }
        println!("         {}", record.url);
    }
    Ok(())
}

async fn cmd_toggle(library: &mut Library, sub: &ArgMatches) -> Result<()> {
    let url = sub.get_one::<String>("url").expect("required arg");
    let status = library.toggle_status(url).await?;
    println!("{} is now: {}", url, status);
    Ok(())
}

async fn cmd_topics(
    library: &mut Library,
    provider: &YtDlpProvider,
    extractor: &TopicExtractor,
    config: &Config,
    sub: &ArgMatches,
) -> Result<()> {
    let url = sub.get_one::<String>("url").expect("required arg");
    let topics = library
        .ensure_topics(url, provider, extractor, config.topics.keyword_count)
        .await?;

    if topics.is_empty() {
        println!("No topics could be extracted for {}", url);
    } else {
        for topic in topics {
            println!("• {}", topic);
        }
    }
    Ok(())
}

async fn cmd_transcript(
    library: &mut Library,
    provider: &YtDlpProvider,
    extractor: &TopicExtractor,
    config: &Config,
    sub: &ArgMatches,
) -> Result<()> {
    let url = sub.get_one::<String>("url").expect("required arg");
    let video_id = provider.video_id(url)?;
    let transcript = provider.fetch_transcript(&video_id).await?;
    let topics = library
        .ensure_topics_from(url, &transcript, extractor, config.topics.keyword_count)
        .await?;

    println!("{}", transcript);
    if !topics.is_empty() {
        println!("\nTopics: {}", topics.join(", "));
    }
    Ok(())
}
