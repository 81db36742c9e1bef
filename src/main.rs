use anyhow::{Context, Result};
use appdex::config::load_config;
use appdex::sources::xdg;
use appdex::{ApplicationIndex, Filter, IndexCache, build_or_load_index, launch, rebuild_index, resolve_launch_command};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Only list applications matching this text
    #[arg(short, long)]
    query: Option<String>,

    /// Launch the application with this exact name
    #[arg(short, long, conflicts_with = "query")]
    launch: Option<String>,

    /// Ignore the cache, rescan and rewrite it
    #[arg(long)]
    rebuild: bool,

    /// Delete the cache file and exit
    #[arg(long)]
    clear_cache: bool,

    /// Print resolved icon paths next to names
    #[arg(long)]
    icons: bool,

    /// Alternative config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<ExitCode> {
    env_logger::init();
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    let data_dirs = xdg::data_dirs(&config.paths);
    let cache = IndexCache::from_config(&config.cache, &data_dirs);

    if args.clear_cache {
        if let Some(cache) = &cache {
            cache.clear().context("clearing cache")?;
        }
        return Ok(ExitCode::SUCCESS);
    }

    let index = if args.rebuild {
        rebuild_index(&config, &data_dirs, cache.as_ref())
    } else {
        build_or_load_index(&config, cache.as_ref())
    };

    if let Some(name) = &args.launch {
        return Ok(launch_by_name(&index, name));
    }

    let mut filter = Filter::new(&config.filter);
    let query = args.query.as_deref().unwrap_or("");
    for name in filter.apply(&index, query) {
        match index.get(name).and_then(|r| r.icon.as_ref()) {
            Some(icon) if args.icons => println!("{}\t{}", name, icon.display()),
            _ if args.icons => println!("{}\t-", name),
            _ => println!("{}", name),
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn launch_by_name(index: &ApplicationIndex, name: &str) -> ExitCode {
    let Some(record) = index.get(name) else {
        eprintln!("No application named {:?}", name);
        return ExitCode::FAILURE;
    };

    let argv = resolve_launch_command(record);
    match launch(&argv) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
