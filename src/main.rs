//! Binary entry point for memeboard.
//!
//! This binary provides the CLI for browsing, liking, commenting on and
//! uploading memes.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use memeboard::config::MemeboardConfig;
use memeboard::models::paginate;
use memeboard::observability;
use memeboard::services::leaderboard::DEFAULT_LEADERBOARD_SIZE;
use memeboard::services::upload::{
    ImageFile, MAX_MEME_IMAGE_BYTES, UploadRequest, profile_picture_from_file, suggest_caption,
};
use memeboard::storage::KeyValueStore;
use memeboard::{
    CategoryFilter, ImgflipFetcher, Meme, MemeId, ProfileUpdate, Session, SortKey,
    StorageBackendType,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Memeboard - browse, like and share memes from the terminal.
#[derive(Parser)]
#[command(name = "memeboard")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding persisted state.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Storage backend: filesystem, sqlite, or memory.
    #[arg(long, global = true)]
    backend: Option<String>,

    /// Catalog endpoint.
    #[arg(long, global = true)]
    catalog_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Show the trending memes.
    Trending,

    /// Search, filter and sort the catalog.
    Explore {
        /// Case-insensitive name search.
        query: Option<String>,

        /// Category: trending, new, classic, random, or all.
        #[arg(long, default_value = "all")]
        category: String,

        /// Sort order: likes or date.
        #[arg(short, long)]
        sort: Option<String>,

        /// Page number, starting at 1.
        #[arg(short, long, default_value = "1")]
        page: usize,
    },

    /// Show one meme with its comments.
    Show {
        /// Meme ID.
        id: String,
    },

    /// Like or unlike a meme.
    Like {
        /// Meme ID.
        id: String,
    },

    /// Comment on a meme.
    Comment {
        /// Meme ID.
        id: String,

        /// Comment text.
        text: String,
    },

    /// Upload an image as a new meme.
    Upload {
        /// Image file.
        file: PathBuf,

        /// Title; derived from the file name when omitted.
        #[arg(short, long)]
        title: Option<String>,

        /// Caption.
        #[arg(long)]
        caption: Option<String>,

        /// Pick a suggested caption when none is given.
        #[arg(long)]
        suggest_caption: bool,
    },

    /// Show or edit the profile.
    Profile {
        /// Profile subcommand.
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// List liked memes.
    Liked,

    /// List uploaded memes.
    Uploads,

    /// Show the top memes and users.
    Leaderboard {
        /// Entries per table.
        #[arg(short, long, default_value_t = DEFAULT_LEADERBOARD_SIZE)]
        limit: usize,
    },

    /// Print the effective configuration.
    Config,
}

/// Profile subcommands.
#[derive(Subcommand)]
enum ProfileAction {
    /// Show the profile.
    Show,

    /// Edit the profile.
    Edit {
        /// Display name.
        #[arg(short, long)]
        name: Option<String>,

        /// Bio.
        #[arg(short, long)]
        bio: Option<String>,

        /// Profile picture file.
        #[arg(short, long)]
        picture: Option<PathBuf>,
    },
}

/// Main entry point.
#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e:#}");
            return ExitCode::FAILURE;
        },
    };

    if let Err(e) = observability::init_from_settings(&config.logging, cli.verbose) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }
    for warning in config.warnings() {
        tracing::warn!(%warning, "Configuration value ignored");
    }

    match run_command(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        },
    }
}

/// Loads configuration: file, then environment, then flags.
fn load_config(cli: &Cli) -> Result<MemeboardConfig> {
    let config = match &cli.config {
        Some(path) => MemeboardConfig::load_from_file(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => MemeboardConfig::load_default(),
    };
    let mut config = config.with_env_overrides();

    if let Some(dir) = &cli.data_dir {
        config = config.with_data_dir(dir);
    }
    if let Some(backend) = &cli.backend {
        config = config.with_backend(StorageBackendType::parse(backend)?);
    }
    if let Some(url) = &cli.catalog_url {
        config = config.with_catalog_url(url);
    }
    Ok(config)
}

/// Runs the selected command.
async fn run_command(command: Commands, config: MemeboardConfig) -> Result<()> {
    if let Commands::Config = command {
        cmd_config(&config);
        return Ok(());
    }

    let mut session = Session::open(&config).context("opening storage")?;
    for error in session.hydrate().recovered() {
        eprintln!("Warning: {error}; using defaults");
    }

    match command {
        Commands::Trending => {
            ensure_catalog(&mut session, &config).await?;
            cmd_trending(&session);
        },
        Commands::Explore {
            query,
            category,
            sort,
            page,
        } => {
            ensure_catalog(&mut session, &config).await?;
            cmd_explore(&mut session, &config, query, &category, sort, page)?;
        },
        Commands::Show { id } => {
            ensure_catalog(&mut session, &config).await?;
            cmd_show(&mut session, &MemeId::new(id))?;
        },
        Commands::Like { id } => {
            ensure_catalog(&mut session, &config).await?;
            cmd_like(&mut session, &MemeId::new(id))?;
        },
        Commands::Comment { id, text } => {
            ensure_catalog(&mut session, &config).await?;
            cmd_comment(&mut session, &MemeId::new(id), &text)?;
        },
        Commands::Upload {
            file,
            title,
            caption,
            suggest_caption,
        } => cmd_upload(&mut session, &file, title, caption, suggest_caption)?,
        Commands::Profile { action } => cmd_profile(&mut session, action)?,
        Commands::Liked => {
            ensure_catalog(&mut session, &config).await?;
            print_memes("Liked memes", &session.memes().liked_memes(), &session);
        },
        Commands::Uploads => {
            let uploads: Vec<&Meme> = session.memes().user_memes().iter().collect();
            print_memes("Your uploads", &uploads, &session);
        },
        Commands::Leaderboard { limit } => {
            ensure_catalog(&mut session, &config).await?;
            cmd_leaderboard(&session, limit);
        },
        Commands::Config => {},
    }

    Ok(())
}

/// Fetches the catalog from the configured endpoint.
async fn ensure_catalog(
    session: &mut Session<dyn KeyValueStore>,
    config: &MemeboardConfig,
) -> Result<()> {
    let fetcher = ImgflipFetcher::new().with_endpoint(&config.catalog_url);
    session
        .ensure_catalog(&fetcher)
        .await
        .with_context(|| format!("fetching catalog from {}", config.catalog_url))
}

/// Trending command.
fn cmd_trending(session: &Session<dyn KeyValueStore>) {
    print_memes("Trending memes", &session.memes().trending(), session);
}

/// Explore command.
fn cmd_explore(
    session: &mut Session<dyn KeyValueStore>,
    config: &MemeboardConfig,
    query: Option<String>,
    category: &str,
    sort: Option<String>,
    page: usize,
) -> Result<()> {
    let filter = CategoryFilter::parse(category)?;
    let sort = sort.as_deref().map(SortKey::parse).transpose()?;

    let store = session.memes_mut();
    match (filter, query.as_deref()) {
        (CategoryFilter::Only(_), Some(_)) => {
            bail!("--category cannot be combined with a search query");
        },
        (CategoryFilter::Only(_), None) => store.filter_by_category(filter),
        (CategoryFilter::All, query) => store.search(query.unwrap_or_default()),
    }
    if let Some(key) = sort {
        store.sort_results(key);
    }

    let ids: Vec<MemeId> = store
        .search_results()
        .iter()
        .map(|meme| meme.id.clone())
        .collect();
    print_page(session, config, &ids, page);
    Ok(())
}

fn print_page(
    session: &Session<dyn KeyValueStore>,
    config: &MemeboardConfig,
    ids: &[MemeId],
    page: usize,
) {
    let page = paginate(ids, page, config.page_size);
    println!(
        "Page {} of {} ({} memes)",
        page.number, page.total_pages, page.total_items
    );
    println!();
    for id in page.items {
        if let Some(meme) = session.memes().find(id) {
            print_meme_line(meme, session);
        }
    }
}

/// Show command.
fn cmd_show(session: &mut Session<dyn KeyValueStore>, id: &MemeId) -> Result<()> {
    session.memes_mut().select_meme(id);
    let store = session.memes();
    let Some(meme) = store.current_meme().or_else(|| store.find(id)) else {
        bail!("no meme with id {id}");
    };

    println!("{}", meme.name);
    println!("  ID: {}", meme.id);
    println!("  Image: {}", display_url(&meme.url));
    println!("  Size: {}x{}", meme.width, meme.height);
    if let Some(category) = meme.category {
        println!("  Category: {category}");
    }
    if let Some(date) = meme.date {
        println!("  Date: {}", date.format("%Y-%m-%d"));
    }
    if let Some(user) = &meme.user {
        println!("  By: {user}");
    }
    let liked = if store.is_liked(id) { " (liked)" } else { "" };
    println!("  Likes: {}{liked}", meme.likes);
    println!();

    if meme.comments.is_empty() {
        println!("No comments yet.");
    } else {
        println!("Comments ({}):", meme.comments.len());
        for comment in &meme.comments {
            println!(
                "  {} [{}]: {}",
                comment.user,
                comment.date.format("%Y-%m-%d %H:%M"),
                comment.text
            );
        }
    }
    Ok(())
}

/// Like command.
fn cmd_like(session: &mut Session<dyn KeyValueStore>, id: &MemeId) -> Result<()> {
    let liked = session.memes_mut().toggle_like(id)?;
    let likes = session.memes().find(id).map(|meme| meme.likes);
    let action = if liked { "Liked" } else { "Unliked" };
    match likes {
        Some(likes) => println!("{action} {id} ({likes} likes)"),
        None => println!("{action} {id}"),
    }
    Ok(())
}

/// Comment command.
fn cmd_comment(session: &mut Session<dyn KeyValueStore>, id: &MemeId, text: &str) -> Result<()> {
    if !session.comment(id, text)? {
        bail!("no catalog meme with id {id}");
    }
    println!("Comment added to {id}");
    Ok(())
}

/// Upload command.
fn cmd_upload(
    session: &mut Session<dyn KeyValueStore>,
    file: &Path,
    title: Option<String>,
    caption: Option<String>,
    suggest: bool,
) -> Result<()> {
    let image = ImageFile::from_path(file, MAX_MEME_IMAGE_BYTES)?;
    let caption = match caption {
        Some(caption) => Some(caption),
        None if suggest => {
            let suggestion = suggest_caption(&mut rand::rng()).to_string();
            println!("Suggested caption: {suggestion}");
            Some(suggestion)
        },
        None => None,
    };

    let id = session.upload(UploadRequest::new(title, caption, image))?;
    println!("Meme uploaded: {id}");
    Ok(())
}

/// Profile command.
fn cmd_profile(session: &mut Session<dyn KeyValueStore>, action: ProfileAction) -> Result<()> {
    if let ProfileAction::Edit { name, bio, picture } = action {
        let mut update = ProfileUpdate::default();
        if let Some(name) = name {
            update = update.with_name(name);
        }
        if let Some(bio) = bio {
            update = update.with_bio(bio);
        }
        if let Some(path) = picture {
            update = update.with_profile_picture(profile_picture_from_file(&path)?);
        }
        if update.is_empty() {
            bail!("nothing to update; pass --name, --bio or --picture");
        }
        session.edit_profile(update)?;
        println!("Profile updated");
        println!();
    }

    let profile = session.profile().profile();
    println!("{}", profile.name);
    println!("  {}", profile.bio);
    println!("  Picture: {}", display_url(&profile.profile_picture));
    println!(
        "  Liked: {}  Uploads: {}",
        session.memes().liked_ids().len(),
        session.memes().user_memes().len()
    );
    Ok(())
}

/// Leaderboard command.
fn cmd_leaderboard(session: &Session<dyn KeyValueStore>, limit: usize) {
    let board = session.leaderboard(limit);
    println!("Top memes");
    println!("=========");
    for (rank, meme) in board.top_memes.iter().enumerate() {
        println!("{:>3}. {} ({} likes)", rank + 1, meme.name, meme.likes);
    }
    println!();
    println!("Top creators");
    println!("============");
    if board.top_users.is_empty() {
        println!("No uploads yet.");
    }
    for (rank, score) in board.top_users.iter().enumerate() {
        println!(
            "{:>3}. {} ({} likes over {} memes)",
            rank + 1,
            score.user,
            score.likes,
            score.memes
        );
    }
}

/// Config command.
fn cmd_config(config: &MemeboardConfig) {
    println!("Memeboard Configuration");
    println!("=======================");
    println!();
    println!("Data Directory: {}", config.data_dir.display());
    println!("Backend: {}", config.backend.as_str());
    println!("Catalog URL: {}", config.catalog_url);
    println!("Page Size: {}", config.page_size);
    println!("Trending Limit: {}", config.trending_limit);
    println!(
        "Log Format: {}",
        config.logging.format.as_deref().unwrap_or("pretty")
    );
    if let Some(file) = &config.logging.file {
        println!("Log File: {}", file.display());
    }
}

fn print_memes(title: &str, memes: &[&Meme], session: &Session<dyn KeyValueStore>) {
    println!("{title} ({})", memes.len());
    println!();
    for meme in memes {
        print_meme_line(meme, session);
    }
}

fn print_meme_line(meme: &Meme, session: &Session<dyn KeyValueStore>) {
    let heart = if session.memes().is_liked(&meme.id) { "*" } else { " " };
    let category = meme.category.map(|c| c.as_str()).unwrap_or("-");
    println!(
        "{heart} {:<12} {:>5} likes  {:<8} {}",
        meme.id.as_str(),
        meme.likes,
        category,
        meme.name
    );
}

/// Shortens embedded `data:` URLs for display.
fn display_url(url: &str) -> String {
    if url.starts_with("data:") {
        format!("(embedded image, {} bytes)", url.len())
    } else {
        url.to_string()
    }
}
