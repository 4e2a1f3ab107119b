use std::path::PathBuf;

use clap::Args;

use grassflow::cleanup::{self, CleanupReport, OutputPaths};
use grassflow::log_status;
use grassflow::shell::normalize_args;

use super::CmdResult;

#[derive(Args)]
pub struct CleanArgs {
    /// Location directory the outputs belong to
    pub location: PathBuf,

    /// Output paths (one whitespace-joined argument or several)
    #[arg(num_args = 0.., allow_hyphen_values = true)]
    pub outputs: Vec<String>,
}

pub fn run(args: CleanArgs) -> CmdResult<CleanupReport> {
    let outputs: OutputPaths = normalize_args(&args.outputs).into_iter().collect();

    log_status!(
        "clean",
        "Reconciling {} output(s) in {}",
        outputs.len(),
        args.location.display()
    );

    let report = cleanup::reconcile(&args.location, &outputs)?;

    if report.changed_anything() {
        log_status!(
            "clean",
            "Removed {} dir(s), {} raster fragment(s), {} vector(s), {} table(s)",
            report.removed_dirs.len(),
            report.removed_raster_fragments.len(),
            report.removed_vectors.len(),
            report.dropped_tables.len()
        );
    }

    Ok((report, 0))
}
