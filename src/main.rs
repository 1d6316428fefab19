mod cli;
mod config;
mod render;

use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use cli::{Args, Commands, OutputFormat};
use config::Config;
use heartbridge::core::{nickname, seed};
use heartbridge::{CommunityAnalyzer, NewPost, PostStore};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("❌ {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = Config::new(args.data_dir)?;
    let mut rng = config.rng(args.seed);

    debug!(db = %config.db_path().display(), "starting");

    match args.command {
        Commands::Nickname { role } => {
            println!("{}", nickname::generate(role, &mut rng));
        }
        Commands::Score { text, format } => {
            let analyzer = analyzer(&config)?;
            let explanation = analyzer.scorer().explain(&text, &mut rng);
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&explanation)?),
                OutputFormat::Table => render::print_explanation(&text, &explanation),
            }
        }
        Commands::Post {
            role,
            nickname: alias,
            title,
            content,
            hidden,
        } => {
            let store = PostStore::new(config.db_path())?;
            let alias = alias.unwrap_or_else(|| nickname::generate(role, &mut rng));
            let post = NewPost::new(role, &alias, &title, &content).hidden(hidden);
            let id = store.create(&post)?;
            println!("✅ Posted #{} as {}", id, alias);
        }
        Commands::List { role } => {
            let store = PostStore::new(config.db_path())?;
            let posts = match role {
                Some(role) => store.list_by_role(role)?,
                None => store.list()?,
            };
            render::print_posts(&posts);
        }
        Commands::Like { id } => {
            let store = PostStore::new(config.db_path())?;
            store.like(id)?;
            println!("👍 #{} now has {} likes", id, store.get(id)?.likes);
        }
        Commands::Unlike { id } => {
            let store = PostStore::new(config.db_path())?;
            store.unlike(id)?;
            println!("↩️  #{} now has {} likes", id, store.get(id)?.likes);
        }
        Commands::Seed => {
            let store = PostStore::new(config.db_path())?;
            let inserted = seed::seed(&store, &mut rng)?;
            println!("🌱 Inserted {} demo posts ({} total)", inserted, store.count()?);
        }
        Commands::Report { role, format } => {
            let (analyzer, store) = open_for_analysis(&config)?;
            let report = analyzer.report(&store, role, &mut rng)?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
                OutputFormat::Table => {
                    let title = match role {
                        Some(role) => format!("Cohort: {}", role),
                        None => "Community".to_string(),
                    };
                    render::print_report(&title, &report);
                }
            }
        }
        Commands::Compare { format } => {
            let (analyzer, store) = open_for_analysis(&config)?;
            let comparison = analyzer.compare_source(&store, &mut rng)?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&comparison)?),
                OutputFormat::Table => render::print_comparison(&comparison),
            }
        }
    }

    Ok(())
}

fn analyzer(config: &Config) -> Result<CommunityAnalyzer> {
    Ok(CommunityAnalyzer::from_lexicon(config.load_lexicon()?).with_top_words(config.top_words))
}

/// Lexicon first, so a broken one fails before the database is touched
fn open_for_analysis(config: &Config) -> Result<(CommunityAnalyzer, PostStore)> {
    let analyzer = analyzer(config)?;
    let store = PostStore::new(config.db_path())?;
    Ok((analyzer, store))
}
