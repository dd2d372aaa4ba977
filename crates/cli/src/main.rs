//! Command line driver: recommend an action order, train weights, estimate an opponent hand.

mod config;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use config::CliConfig;
use kingdoms_core::{
    Catalog, DeckComposition, Hero, HeroTemplate, Player, RequiredScope, RngState, Scope,
    ScopePolicy,
};
use kingdoms_data::{
    find_hero, load_builtin_catalog, load_builtin_hero_templates, load_catalog_dir,
    load_hero_templates, load_weights, save_weights, LoadStatus, HEROES_FILE, WEIGHTS_FILE,
};
use kingdoms_search::{find_best_sequence_with, write_json, write_text, SearchReport};
use kingdoms_train::{
    generate_pattern_samples, generate_synthetic_samples, train, InfluencePattern,
    TrainingSample,
};
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_SYNTHETIC_SAMPLES: usize = 100;

#[derive(Parser, Debug)]
#[command(name = "kingdoms")]
#[command(about = "Order a hand of actions using learned influence weights")]
struct Cli {
    /// Directory holding actions.json and heroes.json; the builtin data is used when absent
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Weight snapshot to read and write
    #[arg(long, global = true, default_value = WEIGHTS_FILE)]
    weights: PathBuf,

    /// TOML settings file with optional [search] and [train] tables
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Seed for weight initialization and sample generation
    #[arg(long, global = true, default_value_t = 0xC0FFEE)]
    seed: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find the best-scoring order for a hand
    Recommend(RecommendArgs),
    /// Fit the influence weights to labelled samples
    Train(TrainArgs),
    /// Estimate what the opponent is holding from the cards already seen
    Estimate(EstimateArgs),
}

#[derive(Args, Debug)]
struct RecommendArgs {
    /// Comma separated action names in hand
    #[arg(long, value_delimiter = ',')]
    hand: Vec<String>,

    #[arg(long, default_value = "白板1")]
    hero: String,

    /// Current hp; defaults to the hero's max hp
    #[arg(long)]
    hp: Option<u32>,

    #[arg(long, default_value = "白板2")]
    opponent_hero: String,

    #[arg(long)]
    opponent_hp: Option<u32>,

    /// Let scoped actions also be played without a scope
    #[arg(long)]
    allow_unscoped: bool,

    /// Never play two scopes of the same card
    #[arg(long)]
    one_choice_per_card: bool,

    #[arg(long)]
    max_candidates: Option<u64>,

    #[arg(long)]
    time_limit_ms: Option<u64>,

    /// Write the report as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Write the report as text
    #[arg(long)]
    text: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct TrainArgs {
    /// JSON array of recorded samples; synthetic samples are generated when absent
    #[arg(long)]
    samples: Option<PathBuf>,

    /// Number of synthetic samples to generate
    #[arg(long)]
    synthetic: Option<usize>,

    /// Label synthetic samples by this pattern, written SOURCE[@SCOPE]>TARGET
    #[arg(long)]
    pattern: Option<String>,

    #[arg(long)]
    epochs: Option<usize>,

    #[arg(long)]
    learning_rate: Option<f64>,

    #[arg(long)]
    batch_size: Option<usize>,

    #[arg(long)]
    checkpoint_every: Option<usize>,

    /// Train without writing any snapshot
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args, Debug)]
struct EstimateArgs {
    /// Comma separated card names already seen (own hand, discard pile)
    #[arg(long, value_delimiter = ',')]
    known: Vec<String>,

    /// Number of cards the opponent holds
    #[arg(long, default_value_t = 4)]
    hand_size: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref())?;
    match &cli.command {
        Command::Recommend(args) => recommend(&cli, &config, args),
        Command::Train(args) => run_training(&cli, &config, args),
        Command::Estimate(args) => estimate(args),
    }
}

fn load_catalog(cli: &Cli) -> Result<Catalog> {
    match &cli.data_dir {
        Some(dir) => load_catalog_dir(dir),
        None => load_builtin_catalog(),
    }
}

fn load_heroes(cli: &Cli) -> Result<Vec<HeroTemplate>> {
    match &cli.data_dir {
        Some(dir) => load_hero_templates(&dir.join(HEROES_FILE)),
        None => load_builtin_hero_templates(),
    }
}

fn hero(templates: &[HeroTemplate], name: &str, hp: Option<u32>) -> Result<Hero> {
    let Some(template) = find_hero(templates.to_vec(), name) else {
        bail!("unknown hero {name}");
    };
    let current = hp.unwrap_or(template.max_hp);
    if current > template.max_hp {
        tracing::warn!(hero = name, hp = current, max_hp = template.max_hp, "hp above max");
    }
    Ok(Hero::from_template(&template, current))
}

fn recommend(cli: &Cli, config: &CliConfig, args: &RecommendArgs) -> Result<()> {
    let catalog = load_catalog(cli)?;
    let heroes = load_heroes(cli)?;
    let mut rng = RngState::from_seed(cli.seed);
    let loaded = load_weights(&catalog, &cli.weights, &mut rng);
    if let LoadStatus::Failed(reason) = &loaded.status {
        tracing::warn!(reason = %reason, "recommending with fresh weights");
    }

    let me = Player::new("me", hero(&heroes, &args.hero, args.hp)?)
        .with_hand(&catalog, &args.hand)
        .context("build hand")?;
    let opponent = Player::new(
        "opponent",
        hero(&heroes, &args.opponent_hero, args.opponent_hp)?,
    );

    let mut search = config.search.clone();
    if args.allow_unscoped {
        search.scope_policy = ScopePolicy::AllowUnscoped;
    }
    if args.one_choice_per_card {
        search.one_choice_per_card = true;
    }
    if args.max_candidates.is_some() {
        search.max_candidates = args.max_candidates;
    }
    if args.time_limit_ms.is_some() {
        search.time_limit_ms = args.time_limit_ms;
    }

    let outcome = find_best_sequence_with(&catalog, &loaded.model, &me, &opponent, &search)?;
    let report = SearchReport::new(&catalog, &loaded.model, &me, &opponent, &outcome);
    println!("{}", report.to_text_report());
    if let Some(path) = &args.json {
        write_json(path, &report)?;
    }
    if let Some(path) = &args.text {
        write_text(path, &report)?;
    }
    Ok(())
}

fn parse_pattern(raw: &str) -> Result<InfluencePattern> {
    let Some((source, target)) = raw.split_once('>') else {
        bail!("pattern {raw} must look like SOURCE[@SCOPE]>TARGET");
    };
    let (source, scope) = match source.split_once('@') {
        Some((name, scope)) => {
            let scope = scope
                .trim()
                .parse::<Scope>()
                .with_context(|| format!("pattern scope {scope}"))?;
            (name, Some(scope))
        }
        None => (source, None),
    };
    Ok(InfluencePattern::new(
        source.trim(),
        RequiredScope::from(scope),
        target.trim(),
    ))
}

fn read_samples(path: &Path) -> Result<Vec<TrainingSample>> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))
}

fn run_training(cli: &Cli, config: &CliConfig, args: &TrainArgs) -> Result<()> {
    let catalog = load_catalog(cli)?;
    let mut rng = RngState::from_seed(cli.seed);
    let mut model = load_weights(&catalog, &cli.weights, &mut rng).model;

    let mut train_config = config.train.clone();
    if let Some(epochs) = args.epochs {
        train_config.epochs = epochs;
    }
    if let Some(lr) = args.learning_rate {
        train_config.learning_rate = lr;
    }
    if let Some(batch_size) = args.batch_size {
        train_config.batch_size = batch_size;
    }
    if let Some(every) = args.checkpoint_every {
        train_config.checkpoint_every = every;
    }

    let samples = match &args.samples {
        Some(path) => read_samples(path)?,
        None => {
            let count = args
                .synthetic
                .or(config.synthetic_samples)
                .unwrap_or(DEFAULT_SYNTHETIC_SAMPLES);
            match &args.pattern {
                Some(raw) => {
                    let pattern = parse_pattern(raw)?;
                    generate_pattern_samples(&catalog, &pattern, count, &mut rng)
                }
                None => generate_synthetic_samples(&catalog, count, &mut rng),
            }
        }
    };

    let checkpoint = (!args.dry_run).then_some(cli.weights.as_path());
    let report = train(&catalog, &mut model, &samples, &train_config, checkpoint)?;
    println!(
        "trained/训练: epochs/轮数={} samples/样本={} skipped/跳过={} final_loss/最终损失={:.6}",
        report.epochs.len(),
        report.valid_samples,
        report.skipped_samples,
        report.final_loss().unwrap_or_default()
    );
    if checkpoint.is_some() && report.snapshot_failures > 0 {
        // retry once so a persistent failure reaches the caller
        save_weights(&model, &cli.weights)?;
    }
    Ok(())
}

fn estimate(args: &EstimateArgs) -> Result<()> {
    let deck = DeckComposition::default();
    let estimate = deck.estimate_opponent_hand(&args.known, args.hand_size);
    if estimate.is_empty() {
        println!("no estimate/无法估计: deck exhausted or empty opponent hand");
        return Ok(());
    }
    let mut rows: Vec<_> = estimate.into_iter().collect();
    rows.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    for (name, share) in rows {
        let expected = share * args.hand_size as f64;
        println!("{name}: {:>5.1}% expected/期望={expected:.2}", share * 100.0);
    }
    Ok(())
}
