use serde::Serialize;

use sociostat_core::{
    EnvelopeError, Handle, PlatformIdentity, PlatformStats, StatsAggregator,
};

use crate::cli::FetchArgs;
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct FetchResponseData {
    stats: Option<PlatformStats>,
}

pub async fn run(args: &FetchArgs, aggregator: &StatsAggregator) -> Result<CommandResult, CliError> {
    let platform = args.platform.into_platform_id();
    let handle = Handle::parse(&args.handle)?;
    let identity = PlatformIdentity::new(platform, handle);

    let cache_hit = aggregator.is_cached(&identity).await;

    match aggregator.fetch_one(&identity).await {
        Ok(stats) => {
            let data = serde_json::to_value(FetchResponseData { stats: Some(stats) })?;
            Ok(CommandResult::ok(data, vec![platform]).with_cache_hit(cache_hit))
        }
        Err(error) => {
            let data = serde_json::to_value(FetchResponseData { stats: None })?;
            Ok(CommandResult::ok(data, vec![platform])
                .with_error(EnvelopeError::from_fetch(platform, &error)))
        }
    }
}
