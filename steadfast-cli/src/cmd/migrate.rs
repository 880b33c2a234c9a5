use serde::Serialize;
use steadfast_store::run_migrations;

use crate::cmd::config::{connect_store, require_database_url};
use crate::exit_codes;
use crate::output::{print_error, print_result, OutputFormat};
use crate::{OutputArgs, StoreArgs};

#[derive(Serialize)]
struct MigrateResult {
    success: bool,
    message: String,
}

pub async fn migrate_cmd(store: StoreArgs, output: OutputArgs) -> i32 {
    let Some(url) = require_database_url(store.store.clone(), &output) else {
        return exit_codes::RUNTIME_ERROR;
    };
    let Some(pg) = connect_store(&url, &store, &output).await else {
        return exit_codes::RUNTIME_ERROR;
    };

    match run_migrations(pg.pool()).await {
        Ok(()) => {
            let result = MigrateResult {
                success: true,
                message: "migrations applied".to_string(),
            };
            if output.format == OutputFormat::Text && !output.quiet {
                println!("ok: migrations applied");
            } else {
                print_result(output.format, output.quiet, &result);
            }
            exit_codes::SUCCESS
        }
        Err(e) => {
            print_error(output.format, output.quiet, &format!("migration failed: {e}"));
            exit_codes::RUNTIME_ERROR
        }
    }
}
