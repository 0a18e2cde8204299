use anyhow::Result;
use callsheet::cli::{CliArgs, print_help};
use callsheet::config::Config;
use callsheet::context::StandardContext;
use callsheet::controller::{RunPaths, ScheduleController};
use callsheet::prompt::TerminalPrompt;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};
use std::env;

fn main() -> Result<()> {
    let args = match CliArgs::parse(env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Run 'callsheet --help' for usage.");
            std::process::exit(2);
        }
    };

    if args.help {
        print_help("callsheet");
        return Ok(());
    }

    let log_config = ConfigBuilder::new()
        .set_time_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .build();
    TermLogger::init(
        args.verbosity.level_filter(),
        log_config,
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )?;

    let Some(source) = args.source.clone() else {
        eprintln!("Error: no schedule file given.");
        eprintln!("Run 'callsheet --help' for usage.");
        std::process::exit(2);
    };

    let ctx = StandardContext::new(args.root.clone());
    let config = Config::load_or_init(&ctx)?;
    let controller = ScheduleController::new(&ctx, config);

    let paths = RunPaths {
        source,
        cast: args.cast,
        mappings: args.groups,
        output: args.output,
    };
    let mut prompt = TerminalPrompt::stdio();

    let outcome = match controller.run(&paths, &mut prompt, args.dry_run) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Error processing the schedule: {:#}", e);
            std::process::exit(1);
        }
    };

    if args.dry_run {
        println!("{}", serde_json::to_string_pretty(&outcome.schedule)?);
    }

    let stats = outcome.stats;
    log::info!(
        "{} date(s), {} block(s); {} unrecognized name(s), {} asked, {} remembered",
        outcome.schedule.date_count(),
        outcome.schedule.block_count(),
        stats.conflicts,
        stats.prompts,
        stats.cache_hits
    );
    if outcome.roster_changed {
        log::info!(
            "Roster updated: {} new role(s), {} new group(s)",
            stats.roles_created,
            stats.groups_created
        );
    }
    Ok(())
}
