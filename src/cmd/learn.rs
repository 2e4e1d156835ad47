use crate::reports;
use clap::{ArgMatches, Args};
use keyadapt::{JsonStore, KaResult, LayoutLearner, LearnerConfig};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct LearnArgs {
    #[command(flatten)]
    pub learner: LearnerConfig,

    /// JSON file with learner settings; flags given on the command line win.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn run(data_dir: &Path, args: LearnArgs, matches: Option<&ArgMatches>) -> KaResult<()> {
    let config = match (&args.config, matches) {
        (Some(path), Some(sub)) => {
            info!("⚖️  Loading learner config from: {}", path.display());
            let mut file_config = LearnerConfig::load_from_file(path)?;
            file_config.merge_from_cli(&args.learner, sub);
            file_config
        }
        (Some(path), None) => LearnerConfig::load_from_file(path)?,
        (None, _) => args.learner.clone(),
    };
    config.validate()?;

    let store = JsonStore::open(data_dir)?;
    let mut learner = LayoutLearner::builder().store(store).config(config).build();
    let report = learner.learn();

    reports::print_learn_report(&report);
    Ok(())
}
