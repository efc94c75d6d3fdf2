use anyhow::{bail, Context};
use simctl::{
    cli::{self, PlacementArg},
    input::{parse_command, parse_partitions, parse_total},
    logger, report, workload,
    utils::*,
    Command, Event, MemorySession,
};

/// Partitioned memory allocation, one request at a time.
///
/// Reads an allocation script (`alloc <id> <size> [policy]`, `free <id>`,
/// `use <policy>`, `show`, `stats`, `reset`; one per line, `#` starts a
/// comment) and replays it against a fresh region.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Size of a single free region, in KB
    #[arg(short, long, conflicts_with = "partitions", required_unless_present = "partitions")]
    total:      Option<String>,

    /// Comma separated partition sizes, in KB
    #[arg(short, long)]
    partitions: Option<String>,

    /// Default placement policy
    #[arg(short, long, value_enum, default_value_t = PlacementArg::FirstFit)]
    fit:        PlacementArg,

    /// Script to replay (stdin if absent)
    #[arg(short, long, value_parser = clap::value_parser!(PathBuf), conflicts_with = "random")]
    script:     Option<PathBuf>,

    /// Generate a random script of this many requests instead
    #[arg(short, long)]
    random:     Option<usize>,

    /// Largest request size in a random script, in KB
    #[arg(long, default_value_t = 64)]
    max_size:   Units,

    /// Seed for the random script
    #[arg(long)]
    seed:       Option<u64>,

    /// Also replay the script under every placement policy
    #[arg(short, long)]
    compare:    bool,

    /// Print the final state as JSON
    #[arg(short, long)]
    json:       bool,

    /// Raise log verbosity (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose:    u8,
}

#[derive(Serialize)]
struct FinalState<'a> {
    blocks:     &'a [MemoryBlock],
    stats:      AllocStats,
    timeline:   &'a [f64],
    log:        &'a [Event],
}

fn read_script(path: Option<&PathBuf>) -> anyhow::Result<Vec<Command>> {
    let reader: Box<dyn BufRead> = match path {
        Some(p) => {
            let f = File::open(p).with_context(|| format!("cannot open {}", p.display()))?;
            Box::new(BufReader::new(f))
        },
        None    => Box::new(BufReader::new(io::stdin())),
    };
    let mut res = vec![];
    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        if let Some(cmd) = parse_command(&line).with_context(|| format!("line {}", n + 1))? {
            res.push(cmd);
        }
    }

    Ok(res)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init(cli::verbosity(args.verbose)).map_err(|e| anyhow::anyhow!("{}", e))?;

    let layout = match (&args.total, &args.partitions) {
        (Some(t), _)        => RegionLayout::Uniform(parse_total(t)?),
        (None, Some(p))     => RegionLayout::Partitioned(parse_partitions(p)?),
        (None, None)        => bail!("either --total or --partitions is needed"),
    };
    let script = match args.random {
        Some(ops)   => {
            let mut rng = workload::rng(args.seed);
            workload::alloc_script(&mut rng, ops, args.max_size)
                .iter()
                .map(Command::from)
                .collect()
        },
        None        => read_script(args.script.as_ref())?,
    };

    let mut session = MemorySession::new();
    session.select(args.fit.into());
    session.configure(layout.clone())?;
    for cmd in &script {
        match session.execute(cmd) {
            Ok(Some(out))   => if !args.json { println!("{}", out.message) },
            Ok(None)        => if !args.json {
                if let (Command::Show, Some(region)) = (cmd, session.region()) {
                    println!("{}", report::block_table(region.blocks()));
                }
                if let (Command::Stats, Some(stats)) = (cmd, session.stats()) {
                    println!("{}", report::alloc_summary(&stats));
                }
            },
            // Rejections are part of the simulation, keep going.
            Err(e)          => if !args.json { println!("{}", e) },
        }
    }

    let region = session.region().context("region vanished")?;
    if args.json {
        let state = FinalState {
            blocks:     region.blocks(),
            stats:      region.stats(),
            timeline:   session.timeline(),
            log:        session.log().entries(),
        };
        println!("{}", report::to_json(&state)?);
    } else {
        println!("\n{}", report::block_table(region.blocks()));
        println!("\n{}", report::alloc_summary(&region.stats()));
        println!("\nUtilization: {}", report::timeline(session.timeline()));
        println!("\n{}", report::event_log(session.log()));
    }

    if args.compare {
        let requests: Vec<Request> = script.iter()
            .filter_map(Command::to_request)
            .collect();
        let summaries = compare::compare_placement(&layout, &requests)?;
        if args.json {
            println!("{}", report::to_json(&summaries)?);
        } else {
            println!("\n{}", report::placement_table(&summaries));
        }
    }

    Ok(())
}
