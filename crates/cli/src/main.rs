#![forbid(unsafe_code)]

mod demo;

use dt_core::ids::{AssetId, LeagueId, ManagerId, TransactionId};
use dt_core::model::TransactionType;
use dt_core::network::{DEFAULT_NETWORK_DEPTH, NetworkFilters};
use dt_core::summary::build_roster_acquisition_summaries;
use dt_core::{
    build_asset_trade_tree, build_complete_transaction_lineage, build_graph,
    build_player_network, build_transaction_chain, resolve_season_chain,
};
use dt_storage::SqliteStore;
use serde_json::{Value, json};
use std::path::PathBuf;

fn usage() -> &'static str {
    "dynastytrace — trace asset lineage through a dynasty league's history\n\n\
USAGE:\n\
  dynastytrace <COMMAND> [--storage-dir DIR] [--pretty]\n\n\
COMMANDS:\n\
  chain       --league ID --asset ID\n\
              full transaction chain for an asset, derived branches included\n\
  lineage     --league ID --transaction ID --manager ID\n\
              origin, forward path and tenure timeline for every asset a\n\
              manager moved in one transaction\n\
  tree        --league ID --asset ID --transaction ID\n\
              what an asset eventually became, trade by trade\n\
  network     --league ID --asset ID [--depth N] [--types CSV] [--no-picks]\n\
              bounded ego-network around an asset (default depth 2)\n\
  roster      --league ID --manager ID\n\
              acquisition summary for every asset the manager holds\n\
  graph-stats --league ID\n\
              node/edge/chain cardinalities for the stitched season graph\n\
  seed-demo   write a two-season demo dynasty into the store\n\n\
NOTES:\n\
  - `--league` names any season of the dynasty; earlier seasons are resolved\n\
    through previous-league pointers automatically.\n\
  - `--storage-dir` defaults to `.dynastytrace` in the working directory.\n\
  - Results are JSON on stdout; diagnostics go to stderr.\n"
}

#[derive(Debug)]
enum Command {
    Chain {
        league: LeagueId,
        asset: AssetId,
    },
    Lineage {
        league: LeagueId,
        transaction: TransactionId,
        manager: ManagerId,
    },
    Tree {
        league: LeagueId,
        asset: AssetId,
        transaction: TransactionId,
    },
    Network {
        league: LeagueId,
        asset: AssetId,
        depth: usize,
        filters: NetworkFilters,
    },
    Roster {
        league: LeagueId,
        manager: ManagerId,
    },
    GraphStats {
        league: LeagueId,
    },
    SeedDemo,
}

#[derive(Debug)]
struct CliConfig {
    storage_dir: PathBuf,
    pretty: bool,
    command: Command,
}

fn parse_args() -> Result<CliConfig, String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    if args.is_empty() || args.iter().any(|a| a == "-h" || a == "--help") {
        print!("{}", usage());
        std::process::exit(if args.is_empty() { 2 } else { 0 });
    }

    let subcommand = args[0].as_str();
    let mut storage_dir = PathBuf::from(".dynastytrace");
    let mut pretty = false;
    let mut league: Option<String> = None;
    let mut asset: Option<String> = None;
    let mut transaction: Option<String> = None;
    let mut manager: Option<String> = None;
    let mut depth: usize = DEFAULT_NETWORK_DEPTH;
    let mut types: Option<String> = None;
    let mut include_draft_picks = true;

    let mut i = 1usize;
    while i < args.len() {
        let a = args[i].as_str();
        match a {
            "--storage-dir" => {
                i += 1;
                let v = args.get(i).ok_or("--storage-dir requires DIR")?;
                storage_dir = PathBuf::from(v);
            }
            "--pretty" => pretty = true,
            "--league" => {
                i += 1;
                league = Some(args.get(i).ok_or("--league requires ID")?.to_string());
            }
            "--asset" => {
                i += 1;
                asset = Some(args.get(i).ok_or("--asset requires ID")?.to_string());
            }
            "--transaction" => {
                i += 1;
                transaction = Some(args.get(i).ok_or("--transaction requires ID")?.to_string());
            }
            "--manager" => {
                i += 1;
                manager = Some(args.get(i).ok_or("--manager requires ID")?.to_string());
            }
            "--depth" => {
                i += 1;
                let v = args.get(i).ok_or("--depth requires N")?;
                depth = v
                    .parse::<usize>()
                    .map_err(|_| "--depth must be an integer")?;
            }
            "--types" => {
                i += 1;
                types = Some(args.get(i).ok_or("--types requires CSV")?.to_string());
            }
            "--no-picks" => include_draft_picks = false,
            other => return Err(format!("Unknown arg: {other}\n\n{}", usage())),
        }
        i += 1;
    }

    let league_id = |raw: &Option<String>| -> Result<LeagueId, String> {
        let raw = raw.as_deref().ok_or("--league ID is required")?;
        LeagueId::try_new(raw).map_err(|e| format!("--league: {}", e.message()))
    };
    let asset_id = |raw: &Option<String>| -> Result<AssetId, String> {
        let raw = raw.as_deref().ok_or("--asset ID is required")?;
        AssetId::try_new(raw).map_err(|e| format!("--asset: {}", e.message()))
    };
    let transaction_id = |raw: &Option<String>| -> Result<TransactionId, String> {
        let raw = raw.as_deref().ok_or("--transaction ID is required")?;
        TransactionId::try_new(raw).map_err(|e| format!("--transaction: {}", e.message()))
    };
    let manager_id = |raw: &Option<String>| -> Result<ManagerId, String> {
        let raw = raw.as_deref().ok_or("--manager ID is required")?;
        ManagerId::try_new(raw).map_err(|e| format!("--manager: {}", e.message()))
    };

    let command = match subcommand {
        "chain" => Command::Chain {
            league: league_id(&league)?,
            asset: asset_id(&asset)?,
        },
        "lineage" => Command::Lineage {
            league: league_id(&league)?,
            transaction: transaction_id(&transaction)?,
            manager: manager_id(&manager)?,
        },
        "tree" => Command::Tree {
            league: league_id(&league)?,
            asset: asset_id(&asset)?,
            transaction: transaction_id(&transaction)?,
        },
        "network" => Command::Network {
            league: league_id(&league)?,
            asset: asset_id(&asset)?,
            depth,
            filters: parse_filters(types.as_deref(), include_draft_picks)?,
        },
        "roster" => Command::Roster {
            league: league_id(&league)?,
            manager: manager_id(&manager)?,
        },
        "graph-stats" => Command::GraphStats {
            league: league_id(&league)?,
        },
        "seed-demo" => Command::SeedDemo,
        other => return Err(format!("Unknown command: {other}\n\n{}", usage())),
    };

    Ok(CliConfig {
        storage_dir,
        pretty,
        command,
    })
}

fn parse_filters(types: Option<&str>, include_draft_picks: bool) -> Result<NetworkFilters, String> {
    let mut transaction_types = Vec::new();
    if let Some(csv) = types {
        for raw in csv.split(',') {
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            let tx_type = TransactionType::parse(raw).ok_or_else(|| {
                format!("--types: unknown transaction type {raw:?} (expected trade|draft|waiver|free_agent|commissioner)")
            })?;
            transaction_types.push(tx_type);
        }
    }
    Ok(NetworkFilters {
        transaction_types,
        include_draft_picks,
    })
}

fn run(cfg: &CliConfig) -> Result<Value, Box<dyn std::error::Error>> {
    tracing::debug!(dir = %cfg.storage_dir.display(), "opening store");
    let mut store = SqliteStore::open(&cfg.storage_dir)?;
    let out = match &cfg.command {
        Command::Chain { league, asset } => {
            serde_json::to_value(build_transaction_chain(&store, league, asset)?)?
        }
        Command::Lineage {
            league,
            transaction,
            manager,
        } => serde_json::to_value(build_complete_transaction_lineage(
            &store,
            league,
            transaction,
            manager,
        )?)?,
        Command::Tree {
            league,
            asset,
            transaction,
        } => serde_json::to_value(build_asset_trade_tree(&store, league, asset, transaction)?)?,
        Command::Network {
            league,
            asset,
            depth,
            filters,
        } => serde_json::to_value(build_player_network(&store, league, asset, *depth, filters)?)?,
        Command::Roster { league, manager } => {
            serde_json::to_value(build_roster_acquisition_summaries(&store, league, manager)?)?
        }
        Command::GraphStats { league } => {
            let seasons = resolve_season_chain(&store, league)?;
            let graph = build_graph(&store, &seasons, None)?;
            json!({
                "seasons": graph.seasons(),
                "node_count": graph.node_count(),
                "edge_count": graph.edge_count(),
                "chain_count": graph.chain_count(),
                "latest_timestamp": graph.latest_timestamp().map(|ts| ts.to_string()),
            })
        }
        Command::SeedDemo => {
            let counts = demo::seed_demo(&mut store)?;
            json!({
                "seeded": true,
                "leagues": counts.leagues,
                "managers": counts.managers,
                "assets": counts.assets,
                "transactions": counts.transactions,
            })
        }
    };
    Ok(out)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cfg = match parse_args() {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    match run(&cfg) {
        Ok(value) => {
            let rendered = if cfg.pretty {
                serde_json::to_string_pretty(&value)
            } else {
                serde_json::to_string(&value)
            };
            match rendered {
                Ok(text) => println!("{text}"),
                Err(err) => {
                    eprintln!("failed to render result: {err}");
                    std::process::exit(1);
                }
            }
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
