use clap::{Parser, ValueEnum};
use log::{LevelFilter, error, info};
use ordered_tree_set::{RedBlackSet, TreeOps, UnbalancedSet};
use rand::SeedableRng;
use rand::seq::SliceRandom;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use std::time::Instant;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TreeKind {
    RedBlack,
    Unbalanced,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum InsertOrder {
    Ascending,
    Shuffled,
}

#[derive(Parser)]
#[command(name = "tree-benchmark")]
#[command(about = "A tree performance testing tool")]
struct Args {
    #[arg(long, default_value = "1000000")]
    size: usize,

    #[arg(long, value_enum, default_value_t = TreeKind::RedBlack)]
    tree: TreeKind,

    #[arg(long, value_enum, default_value_t = InsertOrder::Shuffled)]
    order: InsertOrder,

    #[arg(long, default_value = "42")]
    seed: u64,

    /// Check the tree structure after all inserts
    #[arg(long)]
    validate: bool,

    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
}

fn initialize_logging(level: LevelFilter) {
    if let Err(err) = TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ) {
        eprintln!("Could not set up logging: {err}");
    }
}

fn main() {
    let args = Args::parse();
    initialize_logging(args.log_level);

    let mut tree: Box<dyn TreeOps<usize>> = match args.tree {
        TreeKind::RedBlack => Box::new(RedBlackSet::new()),
        TreeKind::Unbalanced => Box::new(UnbalancedSet::new()),
    };

    let mut keys: Vec<usize> = (0..args.size).collect();
    if let InsertOrder::Shuffled = args.order {
        let mut rng = rand::rngs::StdRng::seed_from_u64(args.seed);
        keys.shuffle(&mut rng);
    }

    info!(
        "Running with {:?} tree, {:?} order and {} node count",
        args.tree, args.order, args.size
    );

    let start = Instant::now();
    for (i, &key) in keys.iter().enumerate() {
        assert_eq!(tree.len(), i);
        tree.insert(key);
        assert!(tree.contains(&key));
    }
    let inserted = Instant::now();

    if args.validate {
        match tree.validate() {
            Ok(()) => info!("Tree structure is valid"),
            Err(err) => error!("Tree structure is invalid: {err}"),
        }
    }

    let checked_start = Instant::now();
    for key in keys.iter() {
        assert!(tree.contains(key));
    }
    let checked_contains = Instant::now();
    for key in keys.iter() {
        assert!(tree.remove(key));
    }
    let end = Instant::now();

    info!(
        "Inserts took {} seconds",
        inserted.saturating_duration_since(start).as_secs_f32()
    );
    info!(
        "Checking contains took {} seconds",
        checked_contains
            .saturating_duration_since(checked_start)
            .as_secs_f32()
    );
    info!(
        "Removals took {} seconds",
        end.saturating_duration_since(checked_contains)
            .as_secs_f32()
    );
    info!(
        "Total {} seconds",
        end.saturating_duration_since(start).as_secs_f32()
    );
}
