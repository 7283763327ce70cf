mod analysis;
mod logging;
mod report;
mod scenario;
mod settings;

use analysis::run_analysis;
use report::render_summary;
use scenario::{build_pile_group, load_records, PileGroupLayout};
use settings::Settings;
use std::error::Error;
use tracing::info;

fn main() -> Result<(), Box<dyn Error>> {
    logging::init()?;

    // Input path comes from the first argument, the conflict policy from
    // FEMORA_CONFLICT_POLICY.
    let settings = Settings::from_env()?;

    let records = match &settings.input {
        Some(path) => {
            info!(path = %path.display(), "loading embedding records");
            load_records(path)?
        }
        None => {
            info!("no input given, analysing the built-in pile group");
            build_pile_group(&PileGroupLayout::default())
        }
    };

    let summary = run_analysis(&records, settings.registry)?;
    println!("{}", render_summary(&summary));

    Ok(())
}
