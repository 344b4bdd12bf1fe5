mod cli;

use reelname::{
    config::{self, Config},
    format::format,
    metadata::Resolver,
    rename::{apply_rename, plan_rename},
};
use reelname_common::{MetadataRecord, ProviderKind};
use reelname_parser::{build_query, AnimeClassifier, ParsedFilename};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "reelname=trace,reelname_parser=debug".to_string()
        } else {
            "reelname=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Resolve {
            files,
            provider,
            json,
        } => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(resolve_files(&config, &files, provider, json))
        }
        Commands::Rename {
            files,
            provider,
            pattern,
            dry_run,
        } => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(rename_files(
                &config,
                &files,
                provider,
                pattern.as_deref(),
                dry_run,
            ))
        }
        Commands::Parse { files, json } => parse_files(&files, json),
        Commands::Providers => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            list_providers(&config)
        }
        Commands::RefreshTitles => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(refresh_titles(&config))
        }
        Commands::Init { path, force } => init_config(&path, force),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("reelname {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// The name handed to the parser: the final path component.
fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn pattern_for<'a>(record: &MetadataRecord, config: &'a Config) -> &'a str {
    match record {
        MetadataRecord::Movie(_) => &config.format.movie_pattern,
        MetadataRecord::Episode(_) => &config.format.tv_pattern,
    }
}

async fn resolve_files(
    config: &Config,
    files: &[PathBuf],
    provider: Option<ProviderKind>,
    json: bool,
) -> Result<()> {
    let resolver = Resolver::from_config(config)?;
    let mut results = Vec::new();

    for file in files {
        let name = file_label(file);
        let record = resolver.resolve(&name, provider).await;

        if json {
            results.push(serde_json::json!({ "file": name, "record": record }));
            continue;
        }

        match record {
            Some(record) => {
                println!("{} -> {}", name, format(&record, pattern_for(&record, config)));
                println!("  Source: {}", record.source());
                if let Some(year) = record.year() {
                    println!("  Year: {}", year);
                }
                if let (Some(season), Some(episode)) = (record.season(), record.episode()) {
                    println!("  Episode: S{:02}E{:02}", season, episode);
                }
                if let Some(rating) = record.rating() {
                    println!("  Rating: {:.1}", rating);
                }
            }
            None => println!("no metadata found for {}", name),
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    }

    Ok(())
}

async fn rename_files(
    config: &Config,
    files: &[PathBuf],
    provider: Option<ProviderKind>,
    pattern: Option<&str>,
    dry_run: bool,
) -> Result<()> {
    let resolver = Resolver::from_config(config)?;
    let mut failed = 0usize;

    for file in files {
        let name = file_label(file);
        let Some(record) = resolver.resolve(&name, provider).await else {
            println!("no metadata found for {}", name);
            continue;
        };

        let pattern = pattern.unwrap_or_else(|| pattern_for(&record, config));
        let plan = plan_rename(file, &record, pattern)
            .with_context(|| format!("Failed to plan rename for {:?}", file))?;

        if plan.is_noop() {
            println!("{} is already named correctly", name);
            continue;
        }

        if dry_run {
            println!(
                "[DRY RUN] {} -> {}",
                plan.from.display(),
                plan.to.display()
            );
            continue;
        }

        match apply_rename(&plan) {
            Ok(to) => println!("{} -> {}", plan.from.display(), to.display()),
            Err(e) => {
                eprintln!("Failed to rename {}: {}", plan.from.display(), e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} file(s) could not be renamed", failed);
    }

    Ok(())
}

fn parse_files(files: &[PathBuf], json: bool) -> Result<()> {
    let mut results = Vec::new();

    for file in files {
        let name = file_label(file);
        let query = build_query(&name);
        let classifier = match query.parsed() {
            ParsedFilename::Tv(_) => AnimeClassifier::TV,
            ParsedFilename::Movie(_) => AnimeClassifier::MOVIE,
        };
        let anime = classifier.is_anime(query.title());

        if json {
            results.push(serde_json::json!({
                "file": name,
                "media_type": query.media_type(),
                "parsed": query.parsed(),
                "anime": anime,
            }));
            continue;
        }

        println!("File: {}", name);
        println!("  Detected: {}", query.media_type());
        match query.parsed() {
            ParsedFilename::Tv(tv) => {
                println!("  Title: {}", tv.title);
                println!("  Season: {}", tv.season);
                println!("  Episode: {}", tv.episode);
                if let Some(year) = tv.year {
                    println!("  Year: {}", year);
                }
            }
            ParsedFilename::Movie(movie) => {
                println!("  Title: {}", movie.title);
                match movie.year {
                    Some(year) => println!("  Year: {}", year),
                    None => println!("  Year: -"),
                }
            }
        }
        println!("  Anime: {}", if anime { "yes" } else { "no" });
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    }

    Ok(())
}

fn list_providers(config: &Config) -> Result<()> {
    let resolver = Resolver::from_config(config)?;

    println!(
        "{:<8} {:<10} {:<6} {:<4} {:<8}",
        "NAME", "STATUS", "MOVIE", "TV", "KEY"
    );
    for descriptor in resolver.registry().descriptors() {
        let status = if descriptor.is_available() {
            "available"
        } else {
            "no key"
        };
        let key = match (descriptor.requires_key, descriptor.key_present) {
            (false, _) => "-",
            (true, true) => "set",
            (true, false) => "missing",
        };
        println!(
            "{:<8} {:<10} {:<6} {:<4} {:<8}",
            descriptor.name,
            status,
            yes_no(descriptor.capabilities.movie),
            yes_no(descriptor.capabilities.tv),
            key
        );
    }

    Ok(())
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

async fn refresh_titles(config: &Config) -> Result<()> {
    let resolver = Resolver::from_config(config)?;
    let cache = resolver
        .registry()
        .title_cache()
        .context("AniDB title cache is not configured")?;

    println!("Downloading AniDB titles to {}", cache.path().display());
    let index = cache.refresh().await?;
    println!("✓ Loaded {} anime", index.len());

    Ok(())
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    config::persist::save_config(path, &Config::default(), force)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            print_config_summary(&config);
        }
        None => {
            println!("No config file specified, using defaults");
            let config = Config::default();
            println!("Default config:");
            print_config_summary(&config);
        }
    }

    Ok(())
}

fn print_config_summary(config: &Config) {
    let configured = ProviderKind::ALL
        .iter()
        .filter(|kind| config.providers.credential(**kind).is_some())
        .count();
    println!("  Credentials set: {}", configured);
    println!("  Language: {}", config.providers.language);
    println!(
        "  Rate limit: {}ms (AniDB {}ms)",
        config.rate_limit.default_interval_ms, config.rate_limit.anidb_interval_ms
    );
    println!("  Title cache: {}", config.cache.resolved_dir().display());
    println!("  Movie pattern: {}", config.format.movie_pattern);
    println!("  TV pattern: {}", config.format.tv_pattern);
}
