use clap::Parser;

mod args;
mod cmd;
mod commands;
mod exit_codes;
mod logging;
mod output;
mod utils;

pub use args::*;
use commands::Command;

#[derive(Debug, Parser)]
#[command(name = "steadfast", version, about = "Resilient browser task executor")]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to create tokio runtime: {e}");
            std::process::exit(exit_codes::RUNTIME_ERROR);
        }
    };

    let exit_code = rt.block_on(run_command(cli.command));
    std::process::exit(exit_code);
}

async fn run_command(command: Command) -> i32 {
    match command {
        Command::Validate { paths, output } => cmd::validate::validate_cmd(&paths, output).await,
        Command::Rank {
            page,
            text,
            tag,
            role,
            website,
            task_type,
            limit,
            learned,
            output,
            store,
        } => {
            let req = cmd::rank::RankRequest {
                page,
                text,
                tag,
                role,
                website,
                task_type,
                limit,
                learned,
            };
            cmd::rank::rank_cmd(req, output, store).await
        }
        Command::Classify {
            message,
            action,
            selector,
            url,
            output,
        } => cmd::classify::classify_cmd(&message, action, selector, url, output).await,
        Command::Run {
            paths,
            events,
            no_persist,
            output,
            store,
            webdriver,
            engine,
            concurrency,
            retry,
        } => {
            let opts = cmd::run::RunOptions {
                events,
                persist: !no_persist,
                store,
                webdriver,
                engine,
                concurrency,
                retry,
            };
            cmd::run::run_cmd(&paths, opts, output).await
        }
        Command::Metrics {
            website,
            unreliable,
            output,
            store,
        } => cmd::metrics::metrics_cmd(website.as_deref(), unreliable, output, store).await,
        Command::Learn {
            website,
            task_type,
            hint,
            all_patterns,
            output,
            store,
        } => {
            cmd::learn::learn_cmd(&website, &task_type, hint.as_deref(), all_patterns, output, store)
                .await
        }
        Command::Migrate { output, store } => cmd::migrate::migrate_cmd(store, output).await,
    }
}
