use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use pokedex_core::{
    ALL_CATEGORIES, Comparison, ComparisonSlot, Config, DetailSlot, EvolutionChain, ListController,
    ListSource, PokeApiClient, Pokemon, SortOrder, TypeChart, TypeDetails, calculate_battle_readiness_score,
    capitalize, evolution_stages, sources, spawn_cleanup_task,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Highest National Dex number served by the API.
const MAX_DEX_NUMBER: u32 = 1025;
const CACHE_CLEANUP_PERIOD: Duration = Duration::from_secs(300);

#[derive(Parser, Debug)]
#[command(name = "pokedex", version, about = "Browse the PokéAPI and predict battles")]
struct Cli {
    /// TOML config file; the bundled defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Predict the winner between two Pokémon.
    Compare { first: String, second: String },
    /// Pit a Pokémon against a random opponent.
    Random { name: String },
    /// Battle readiness score of one Pokémon.
    Score { name: String },
    /// Browse a resource list.
    List(ListArgs),
    /// Item categories usable with `list items --category`.
    Categories,
    /// Damage relations of a type.
    Type { name: String },
    /// Evolution stages of a Pokémon's family.
    Evolution { name: String },
}

#[derive(clap::Args, Debug)]
struct ListArgs {
    kind: ListKind,
    #[arg(long)]
    search: Option<String>,
    #[arg(long, default_value_t = 1)]
    page: usize,
    /// Item category (items only).
    #[arg(long)]
    category: Option<String>,
    /// name-asc, name-desc, cost-asc or cost-desc.
    #[arg(long, default_value = "name-asc")]
    sort: SortOrder,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ListKind {
    Pokemon,
    Items,
    Abilities,
}

#[derive(Serialize)]
struct BattleReport<'a> {
    first: &'a str,
    first_score: u8,
    second: &'a str,
    second_score: u8,
    winner: Option<&'a str>,
    draw: bool,
    explanation: &'a str,
}

#[derive(Serialize)]
struct PageReport {
    page: usize,
    total_pages: usize,
    entries: Vec<String>,
}

fn init_tracing(json_logs: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        // The library logs retries and dropped entries; reqwest stays quiet below warn.
        format!("pokedex_core=info,{}=info,warn", env!("CARGO_CRATE_NAME")).into()
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json_logs).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::load(path)?,
        None => Config::bundled()?,
    };
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let config = load_config(cli.config.as_ref()).context("Failed to load configuration")?;
    let client = Arc::new(PokeApiClient::from_config(&config).context("Failed to build HTTP client")?);
    tracing::debug!("Using API at {}", client.base_url());
    let cleanup = spawn_cleanup_task(client.cache().clone(), CACHE_CLEANUP_PERIOD);

    let result = run(&cli, &config, &client).await;

    cleanup.abort();
    tracing::debug!(
        "Cache held {} responses, hit rate {:.0}%",
        client.cache().size(),
        client.cache().hit_rate() * 100.0
    );
    result
}

async fn run(cli: &Cli, config: &Config, client: &Arc<PokeApiClient>) -> anyhow::Result<()> {
    match &cli.command {
        Command::Compare { first, second } => compare(client, first, second, cli.json).await,
        Command::Random { name } => {
            let opponent = rand::random_range(1..=MAX_DEX_NUMBER).to_string();
            tracing::info!("Random opponent: #{}", opponent);
            compare(client, name, &opponent, cli.json).await
        }
        Command::Score { name } => score(client, name, cli.json).await,
        Command::List(args) => list(client, config, args, cli.json).await,
        Command::Categories => {
            let categories = sources::item_list(client.clone(), &config.list)
                .source()
                .categories()
                .await?;
            let names: Vec<String> = categories.into_iter().map(|c| c.name).collect();
            emit(cli.json, &names, || names.join("\n"))
        }
        Command::Type { name } => type_details(client, name, cli.json).await,
        Command::Evolution { name } => evolution(client, name, cli.json).await,
    }
}

fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce() -> String) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", text());
    }
    Ok(())
}

async fn compare(client: &PokeApiClient, first: &str, second: &str, json: bool) -> anyhow::Result<()> {
    let mut comparison = Comparison::new();
    let first_ticket = comparison.begin(ComparisonSlot::First);
    let second_ticket = comparison.begin(ComparisonSlot::Second);
    let (a, b) = tokio::join!(client.pokemon(first), client.pokemon(second));
    comparison.finish(ComparisonSlot::First, first_ticket, a);
    comparison.finish(ComparisonSlot::Second, second_ticket, b);

    if let Some(error) = comparison.error() {
        bail!("{}", error);
    }
    let Some(prediction) = comparison.prediction() else {
        bail!("Both Pokémon must be loaded before comparing");
    };
    let (Some(p1), Some(p2)) = (
        comparison.slot(ComparisonSlot::First).selected(),
        comparison.slot(ComparisonSlot::Second).selected(),
    ) else {
        bail!("Both Pokémon must be loaded before comparing");
    };

    let report = BattleReport {
        first: &p1.name,
        first_score: calculate_battle_readiness_score(Some(p1)),
        second: &p2.name,
        second_score: calculate_battle_readiness_score(Some(p2)),
        winner: prediction.winner.map(|p| p.name.as_str()),
        draw: prediction.draw,
        explanation: &prediction.explanation,
    };
    emit(json, &report, || {
        format!(
            "{} (readiness {}) vs {} (readiness {})\n{}",
            capitalize(report.first),
            report.first_score,
            capitalize(report.second),
            report.second_score,
            report.explanation
        )
    })
}

async fn score(client: &PokeApiClient, name: &str, json: bool) -> anyhow::Result<()> {
    let mut slot: DetailSlot<Pokemon> = DetailSlot::new();
    slot.load_pokemon(client, name).await;
    if let Some(error) = slot.error() {
        bail!("{}", error);
    }
    let Some(pokemon) = slot.selected() else {
        bail!("Pokémon '{}' could not be loaded", name);
    };

    let score = calculate_battle_readiness_score(Some(pokemon));
    emit(json, &serde_json::json!({"name": pokemon.name, "score": score}), || {
        let mut text = format!(
            "{} [{}] readiness {}/100",
            capitalize(&pokemon.name),
            pokemon.type_names().join("/"),
            score
        );
        if let Some(flavor) = &pokemon.flavor_text {
            text.push('\n');
            text.push_str(flavor);
        }
        text
    })
}

async fn browse<S: ListSource>(
    list: &mut ListController<S>,
    args: &ListArgs,
    row: impl Fn(&S::Entry) -> String,
    json: bool,
) -> anyhow::Result<()> {
    match args.category.as_deref() {
        Some(category) if category != ALL_CATEGORIES => list.set_category(category).await,
        _ => list.load().await,
    }
    if let Some(term) = &args.search {
        list.set_search_term(term).await;
    }
    list.set_sort_order(args.sort);
    if args.page != 1 && !list.go_to_page(args.page).await {
        bail!("Page {} is out of range (1-{})", args.page, list.total_pages());
    }
    if let Some(error) = list.error() {
        bail!("{}", error);
    }

    let report = PageReport {
        page: list.current_page(),
        total_pages: list.total_pages(),
        entries: list.page_entries().into_iter().map(row).collect(),
    };
    emit(json, &report, || {
        format!(
            "Page {} of {}\n{}",
            report.page,
            report.total_pages,
            report.entries.join("\n")
        )
    })
}

async fn list(client: &Arc<PokeApiClient>, config: &Config, args: &ListArgs, json: bool) -> anyhow::Result<()> {
    match args.kind {
        ListKind::Pokemon => {
            let mut list = sources::pokemon_list(client.clone(), &config.list);
            browse(&mut list, args, |p| p.name.clone(), json).await
        }
        ListKind::Abilities => {
            let mut list = sources::ability_list(client.clone(), &config.list);
            browse(&mut list, args, |a| a.name.clone(), json).await
        }
        ListKind::Items => {
            let mut list = sources::item_list(client.clone(), &config.list);
            browse(&mut list, args, |i| format!("{:<24} {:>6}", i.name, i.cost), json).await
        }
    }
}

async fn type_details(client: &PokeApiClient, name: &str, json: bool) -> anyhow::Result<()> {
    let mut slot: DetailSlot<TypeDetails> = DetailSlot::new();
    slot.load_type(client, name).await;
    if let Some(error) = slot.error() {
        bail!("{}", error);
    }
    let Some(details) = slot.selected() else {
        bail!("No type selected");
    };

    let chart = TypeChart::standard();
    let matchups = chart.matchups_against(&[details.name.as_str()]);
    let relations = &details.damage_relations;
    let names = |list: &[pokedex_core::NamedApiResource]| {
        list.iter().map(|r| r.name.as_str()).collect::<Vec<_>>().join(", ")
    };
    emit(json, details, || {
        format!(
            "{}\n  double damage to: {}\n  half damage to: {}\n  no damage to: {}\n  weak to: {}\n  resists: {}\n  immune to: {}\n  {} Pokémon",
            capitalize(&details.name),
            names(&relations.double_damage_to),
            names(&relations.half_damage_to),
            names(&relations.no_damage_to),
            matchups.double.join(", "),
            matchups.half.join(", "),
            matchups.immune.join(", "),
            details.pokemon.len()
        )
    })
}

async fn evolution(client: &PokeApiClient, name: &str, json: bool) -> anyhow::Result<()> {
    let mut slot: DetailSlot<EvolutionChain> = DetailSlot::new();
    slot.load_evolution_chain(client, name).await;
    if let Some(error) = slot.error() {
        bail!("{}", error);
    }
    let Some(chain) = slot.selected() else {
        bail!("No evolution chain for '{}'", name);
    };

    let stages = evolution_stages(chain);
    emit(json, &stages, || {
        if stages.is_empty() {
            return format!("{} does not evolve.", capitalize(&chain.chain.species.name));
        }
        stages
            .iter()
            .flat_map(|stage| {
                stage.to.iter().map(|target| {
                    format!(
                        "{} -> {} ({})",
                        capitalize(&stage.from.name),
                        capitalize(&target.name),
                        target.condition
                    )
                })
            })
            .collect::<Vec<_>>()
            .join("\n")
    })
}
