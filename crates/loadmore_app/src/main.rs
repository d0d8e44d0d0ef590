mod cli;
mod config;
mod driver;
mod effects;
mod snapshot;

use std::fs;

use anyhow::Context;
use clap::Parser;
use loadmore_engine::{bind_instances, EngineHandle};
use loadmore_logging::{loadmore_info, loadmore_warn, LogDestination};
use log::LevelFilter;
use url::Url;

use cli::Cli;
use driver::Driver;
use effects::EffectRunner;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let mut config = config::load_config(cli.config.as_deref())?;
    if let Some(budget) = cli.retry_budget {
        config.retry_budget = budget;
    }
    let base_url = cli
        .base_url
        .as_deref()
        .map(Url::parse)
        .transpose()
        .context("invalid --base-url")?;

    let html = fs::read_to_string(&cli.page)
        .with_context(|| format!("failed to read page {}", cli.page.display()))?;
    let lists = bind_instances(&html, &config.binder_settings())?;
    loadmore_info!("found {} list instance(s) in {:?}", lists.len(), cli.page);

    let engine = EngineHandle::new(config.fetch_settings(base_url))?;
    let mut driver = Driver::new(
        config.retry_budget,
        EffectRunner::new(engine),
        config.settle_timeout(),
    );
    let ids = driver.bind(lists);

    let targets: Vec<_> = if cli.instances.is_empty() {
        ids
    } else {
        for unknown in cli.instances.iter().filter(|id| !ids.contains(id)) {
            loadmore_warn!("instance {} does not exist on this page", unknown);
        }
        ids.into_iter()
            .filter(|id| cli.instances.contains(id))
            .collect()
    };

    let rounds = driver.run(&targets, cli.max_pages)?;
    loadmore_info!("finished after {} round(s)", rounds);

    let view = driver.view();
    for instance in &view.instances {
        println!("{}", snapshot::summary_line(instance));
    }

    if let Some(dir) = cli.output.as_deref() {
        let written = snapshot::write_snapshots(dir, &view)?;
        println!("wrote {} snapshot(s) to {}", written.len(), dir.display());
    }

    Ok(())
}

fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let destination = match &cli.log_file {
        Some(path) => LogDestination::Both(path.clone()),
        None => LogDestination::Terminal,
    };
    loadmore_logging::initialize(destination, level);
}
