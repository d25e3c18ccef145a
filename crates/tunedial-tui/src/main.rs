mod app;
mod keymap;
mod player;
mod theme;
mod ui;

use anyhow::Context;

use tunedial_opml::config::Config;
use tunedial_opml::favourites::Favourites;
use tunedial_opml::fetch::{Fetch, HttpFetcher, Source};
use tunedial_opml::{codec, platform, tree::Tree};

fn main() -> anyhow::Result<()> {
    let data_dir = platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;

    let log_path = data_dir.join("tunedial.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // Allow RUST_LOG override; default to debug for app code but suppress
    // noisy connection-level DEBUG from HTTP client internals.
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    tracing::info!("tunedial starting…");

    let config = Config::load().unwrap_or_default();
    let fetcher = HttpFetcher::new();

    // The root directory must load before there is anything to browse;
    // a failure here is fatal and reported before the TUI starts.
    let root_source = Source::parse(&config.opml.root);
    let bytes = fetcher
        .fetch(&root_source)
        .with_context(|| format!("could not fetch directory root {}", config.opml.root))?;

    let mut tree = Tree::new();
    let top = codec::parse_document(&mut tree, &bytes)
        .with_context(|| format!("could not parse directory root {}", config.opml.root))?;
    let root = tree.root();
    for id in top {
        tree.push_child(root, id);
    }
    tracing::info!("directory root loaded: {} top-level entries", tree.node(root).children.len());

    // Favourites always sit first in the list.
    let favourites = Favourites::load(&mut tree);
    tree.insert_child_front(root, favourites.id());

    app::App::new(&config, tree, favourites, fetcher).run()
}
