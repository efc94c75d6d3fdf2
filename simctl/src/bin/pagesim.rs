use simctl::{
    cli::{self, ReplacementArg},
    input::{check_frames, parse_references},
    logger, report, workload,
    utils::*,
    CtlError, Event, PagingSession,
};

/// Demand paging over a small frame table, one reference at a time.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Number of frames (1 to 10)
    #[arg(short, long, default_value_t = 3)]
    frames:     usize,

    /// Reference string, page numbers separated by spaces or commas
    #[arg(short, long, conflicts_with = "random", required_unless_present = "random")]
    refs:       Option<String>,

    /// Generate a random reference string of this length instead
    #[arg(long)]
    random:     Option<usize>,

    /// Distinct pages in a random reference string
    #[arg(long, default_value_t = 8)]
    pages:      usize,

    /// Chance that a random reference repeats a recent one
    #[arg(long, default_value_t = 0.5)]
    locality:   f64,

    /// Seed for the random reference string
    #[arg(long)]
    seed:       Option<u64>,

    /// Replacement policy
    #[arg(short, long, value_enum, default_value_t = ReplacementArg::Fifo)]
    algo:       ReplacementArg,

    /// Serve only this many references
    #[arg(short, long)]
    steps:      Option<usize>,

    /// Print the justification of every step
    #[arg(long)]
    explain:    bool,

    /// Also run every policy on the same references
    #[arg(short, long)]
    compare:    bool,

    /// Fault curve for 1 up to this many frames
    #[arg(long)]
    curve:      Option<usize>,

    /// Print results as JSON
    #[arg(short, long)]
    json:       bool,

    /// Raise log verbosity (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose:    u8,
}

#[derive(Serialize)]
struct FinalState<'a> {
    references: &'a [PageNum],
    history:    &'a [StepRecord],
    stats:      Option<PagingStats>,
    log:        &'a [Event],
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init(cli::verbosity(args.verbose)).map_err(|e| anyhow::anyhow!("{}", e))?;

    let refs = match (&args.refs, args.random) {
        (Some(raw), _)      => parse_references(raw)?,
        (None, Some(len))   => {
            let mut rng = workload::rng(args.seed);
            workload::reference_string(&mut rng, len, args.pages, args.locality)
        },
        (None, None)        => anyhow::bail!("either --refs or --random is needed"),
    };

    let mut session = PagingSession::new(args.frames, refs.clone(), args.algo.into())?;
    match args.steps {
        Some(n) => {
            for _ in 0..n {
                match session.step() {
                    Ok(_)                       => {},
                    Err(CtlError::Exhausted)    => break,
                    Err(e)                      => return Err(e.into()),
                }
            }
        },
        None    => {
            session.run_all()?;
        },
    }

    if args.json {
        let state = FinalState {
            references: &refs,
            history:    session.history(),
            stats:      session.stats(),
            log:        session.log().entries(),
        };
        println!("{}", report::to_json(&state)?);
    } else {
        println!("{}", report::paging_grid(session.history(), args.frames));
        if args.explain {
            println!("\n{}", report::step_reasons(session.history()));
        }
        if let Some(stats) = session.stats() {
            println!("\n{}", report::paging_summary(&stats));
        }
        println!("\n{}", report::event_log(session.log()));
    }

    if args.compare {
        let summaries = compare::compare_replacement(args.frames, &refs)?;
        if args.json {
            println!("{}", report::to_json(&summaries)?);
        } else {
            println!("\n{}", report::replacement_table(&summaries));
        }
    }

    if let Some(max) = args.curve {
        let max = check_frames(max)?;
        let curve = compare::fault_curve(args.algo.into(), &refs, 1..=max)?;
        let anomalies = compare::belady_anomalies(&curve);
        if args.json {
            println!("{}", report::to_json(&curve)?);
        } else {
            println!("\n{}", report::curve_table(&curve, &anomalies));
        }
    }

    Ok(())
}
