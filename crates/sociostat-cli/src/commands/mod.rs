mod fetch;
mod stats;

use std::time::Instant;

use serde_json::Value;
use sociostat_core::{
    Envelope, EnvelopeError, EnvelopeMeta, PlatformId, StatsAggregator, StatsAggregatorBuilder,
};

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::metadata::RequestId;

pub struct CommandResult {
    pub data: Value,
    pub platforms: Vec<PlatformId>,
    pub warnings: Vec<String>,
    pub errors: Vec<EnvelopeError>,
    pub cache_hit: bool,
}

impl CommandResult {
    pub fn ok(data: Value, platforms: Vec<PlatformId>) -> Self {
        Self {
            data,
            platforms,
            warnings: Vec::new(),
            errors: Vec::new(),
            cache_hit: false,
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_error(mut self, error: EnvelopeError) -> Self {
        self.errors.push(error);
        self
    }

    pub fn with_cache_hit(mut self, cache_hit: bool) -> Self {
        self.cache_hit = cache_hit;
        self
    }
}

pub async fn run(cli: &Cli) -> Result<Envelope<Value>, CliError> {
    let started = Instant::now();
    let aggregator = build_aggregator(cli);

    let command_result = match &cli.command {
        Command::Fetch(args) => fetch::run(args, &aggregator).await?,
        Command::Stats(args) => stats::run(args, &aggregator).await?,
    };

    let mut meta = EnvelopeMeta::new(
        RequestId::new_v4().to_string(),
        command_result.platforms.clone(),
        elapsed_ms(started),
        command_result.cache_hit,
    )?;
    for warning in command_result.warnings {
        meta.push_warning(warning);
    }

    Envelope::with_errors(meta, command_result.data, command_result.errors).map_err(Into::into)
}

fn build_aggregator(cli: &Cli) -> StatsAggregator {
    if cli.mock {
        StatsAggregatorBuilder::new()
            .with_mock_mode()
            .with_timeout_ms(cli.timeout_ms)
            .build()
    } else {
        StatsAggregatorBuilder::new()
            .with_real_clients()
            .with_timeout_ms(cli.timeout_ms)
            .build()
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis().min(u128::from(u64::MAX)) as u64
}
