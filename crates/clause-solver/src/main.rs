//! `clause-solve`: command-line front end for the clause-structure solver

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use clause_solver::{CandidateGraph, SectionInput, Solver, SolverConfig, SolverSolution};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn threshold_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("config")
            .long("config")
            .value_parser(value_parser!(PathBuf))
            .help("TOML file with solver thresholds"),
    )
    .arg(
        Arg::new("abstain-margin")
            .long("abstain-margin")
            .value_parser(value_parser!(f64))
            .help("Override abstain_margin_threshold"),
    )
    .arg(
        Arg::new("review-margin")
            .long("review-margin")
            .value_parser(value_parser!(f64))
            .help("Override review_margin_threshold"),
    )
    .arg(
        Arg::new("section-abstain-ratio")
            .long("section-abstain-ratio")
            .value_parser(value_parser!(f64))
            .help("Override section_abstain_ratio_threshold"),
    )
    .arg(
        Arg::new("parser-version")
            .long("parser-version")
            .help("Override parser_version tag"),
    )
}

fn format_arg() -> Arg {
    Arg::new("format")
        .long("format")
        .value_parser(["json", "outline"])
        .default_value("json")
        .help("Output format")
}

fn cli() -> Command {
    Command::new("clause-solve")
        .version(clause_solver::VERSION)
        .about("Solve clause-structure candidate graphs")
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::Count)
                .help("Increase log verbosity (-v info, -vv debug)"),
        )
        .subcommand_required(true)
        .subcommand(
            threshold_args(
                Command::new("solve")
                    .about("Solve one section graph")
                    .arg(
                        Arg::new("graph")
                            .long("graph")
                            .required(true)
                            .value_parser(value_parser!(PathBuf))
                            .help("Candidate graph JSON file"),
                    )
                    .arg(
                        Arg::new("section-key")
                            .long("section-key")
                            .required(true)
                            .help("Section key used for the run id"),
                    )
                    .arg(
                        Arg::new("strict")
                            .long("strict")
                            .action(ArgAction::SetTrue)
                            .help("Reject malformed graphs instead of degrading"),
                    ),
            )
            .arg(format_arg()),
        )
        .subcommand(
            threshold_args(
                Command::new("batch")
                    .about("Solve a JSON array of {section_key, graph} in parallel")
                    .arg(
                        Arg::new("input")
                            .long("input")
                            .required(true)
                            .value_parser(value_parser!(PathBuf))
                            .help("Batch JSON file"),
                    ),
            )
            .arg(format_arg()),
        )
        .subcommand(threshold_args(
            Command::new("config").about("Print the effective configuration as TOML"),
        ))
}

fn init_tracing(verbosity: u8) {
    let default = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &ArgMatches) -> Result<SolverConfig> {
    let mut config = match args.get_one::<PathBuf>("config") {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            SolverConfig::from_toml_str(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => SolverConfig::default(),
    };

    if let Some(&v) = args.get_one::<f64>("abstain-margin") {
        config = config.with_abstain_margin_threshold(v);
    }
    if let Some(&v) = args.get_one::<f64>("review-margin") {
        config = config.with_review_margin_threshold(v);
    }
    if let Some(&v) = args.get_one::<f64>("section-abstain-ratio") {
        config = config.with_section_abstain_ratio_threshold(v);
    }
    if let Some(v) = args.get_one::<String>("parser-version") {
        config = config.with_parser_version(v.clone());
    }

    config.validate()?;
    Ok(config)
}

fn print_solutions(solutions: &[SolverSolution], format: &str, single: bool) -> Result<()> {
    match format {
        "outline" => {
            for solution in solutions {
                print!("{}", solution.outline());
            }
        }
        "json" if single => match solutions.first() {
            Some(solution) => println!("{}", serde_json::to_string_pretty(solution)?),
            None => bail!("no solution produced"),
        },
        "json" => println!("{}", serde_json::to_string_pretty(solutions)?),
        other => bail!("unknown format: {other}"),
    }
    Ok(())
}

fn run(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("solve", args)) => {
            let solver = Solver::new(load_config(args)?)?;
            let Some(path) = args.get_one::<PathBuf>("graph") else {
                bail!("--graph is required");
            };
            let Some(section_key) = args.get_one::<String>("section-key") else {
                bail!("--section-key is required");
            };

            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading graph {}", path.display()))?;
            let graph = if args.get_flag("strict") {
                CandidateGraph::from_json_strict(&json)
            } else {
                CandidateGraph::from_json(&json)
            }
            .with_context(|| format!("loading graph {}", path.display()))?;

            let solution = solver.solve(&graph, section_key);
            let format = args.get_one::<String>("format").map_or("json", String::as_str);
            print_solutions(std::slice::from_ref(&solution), format, true)
        }
        Some(("batch", args)) => {
            let solver = Solver::new(load_config(args)?)?;
            let Some(path) = args.get_one::<PathBuf>("input") else {
                bail!("--input is required");
            };

            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading batch {}", path.display()))?;
            let sections = SectionInput::batch_from_json(&json)?;
            tracing::info!(sections = sections.len(), "solving batch");

            let solutions = solver.solve_batch(&sections);
            let format = args.get_one::<String>("format").map_or("json", String::as_str);
            print_solutions(&solutions, format, false)
        }
        Some(("config", args)) => {
            let config = load_config(args)?;
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
        _ => bail!("unknown command"),
    }
}

fn main() {
    let matches = cli().get_matches();
    init_tracing(matches.get_count("verbose"));

    if let Err(e) = run(&matches) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
