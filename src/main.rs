//main.rs
//Author: Jonathan Scanzi
//Date: 09 July 2019

// =========== Libraries =============
extern crate serde;
#[macro_use]
extern crate lazy_static;

// ========== General Data ===========
#[macro_use]
mod logger;
#[macro_use]
mod utils;
mod error;
mod paths;
mod shell_tools;

// ========= Configuration ===========
mod config_file;
mod validation;
mod machines;
// ========= Cloud Specific ==========
mod cloud_functions;
mod pipelines;
// ============ Records ==============
mod audit;

use std::env;
use std::process;
use error::ProvisionError;
use pipelines::{BatchReport, ProvisionPipeline};
use pipelines::azure_cli::AzureCliPipeline;
use pipelines::gcp_cli::GcpCliPipeline;
use shell_tools::ShellRunner;
use utils::global_config::SETTINGS;

fn main() {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(|a| a.to_lowercase()).as_deref() {
        None | Some("all") => {
            provision_azure();
            provision_gcp();
        }
        Some("azure") | Some("az") => { provision_azure(); }
        Some("gcp") | Some("gcloud") => { provision_gcp(); }
        Some(other) => {
            println!("Unknown provider '{}'. Usage: {} [all|azure|gcp]", other, args[0]);
            process::exit(0);
        }
    }
}

fn provision_azure() {
    let runner = ShellRunner::new(&SETTINGS.shell);
    let pipeline = AzureCliPipeline::new(&runner, &SETTINGS.azure, &SETTINGS.audit_log);
    handle_outcome(pipeline.run());
}

fn provision_gcp() {
    let runner = ShellRunner::new(&SETTINGS.shell);
    let pipeline = GcpCliPipeline::new(&runner, &SETTINGS.gcp, &SETTINGS.audit_log);
    handle_outcome(pipeline.run());
}

/// A failed batch only stops its own provider. Fatal errors stop the whole process, with exit code 0.
fn handle_outcome(outcome: Result<BatchReport, ProvisionError>) {
    match outcome {
        Ok(report) => {
            let failed = report.created.iter().filter(|c| c.exit_code != Some(0)).count();
            println_with_time!("{} - {} vm(s) requested ({} with a failing create command), config archived as {}",
                report.provider, report.created.len(), failed, report.archive.display());
            for w in &report.warnings {
                println_with_time!("{} - {} warning: {}", report.provider, w.kind, w.message);
            }
        }
        Err(e) if e.is_fatal() => {
            println_with_time!("{}", e);
            process::exit(0);
        }
        Err(e) => {
            println_with_time!("{} error: {}", e.kind(), e);
            println_with_time!("exiting this provider now, no vm of the remaining sections was created");
        }
    }
}
