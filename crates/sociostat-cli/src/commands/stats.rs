use serde_json::{Map, Value};

use sociostat_core::{combine, Handle, PlatformId, PlatformIdentity, StatsAggregator};

use crate::cli::StatsArgs;
use crate::error::CliError;

use super::CommandResult;

pub async fn run(args: &StatsArgs, aggregator: &StatsAggregator) -> Result<CommandResult, CliError> {
    let mut identities = Vec::new();
    if let Some(handle) = &args.tiktok {
        identities.push(PlatformIdentity::new(
            PlatformId::Tiktok,
            Handle::parse(handle)?,
        ));
    }
    if let Some(handle) = &args.twitter {
        identities.push(PlatformIdentity::new(
            PlatformId::Twitter,
            Handle::parse(handle)?,
        ));
    }
    if let Some(handle) = &args.twitch {
        identities.push(PlatformIdentity::new(
            PlatformId::Twitch,
            Handle::parse(handle)?,
        ));
    }

    if identities.is_empty() {
        return Err(CliError::Command(String::from(
            "provide at least one of --tiktok, --twitter, --twitch",
        )));
    }

    let platforms: Vec<PlatformId> = identities.iter().map(PlatformIdentity::platform).collect();
    let results = aggregator.fetch_many(&identities).await;

    let records: Vec<_> = results.values().flatten().cloned().collect();
    let combined = combine(&records);

    let mut platform_data = Map::new();
    for platform in &platforms {
        let record = results.get(platform).cloned().flatten();
        platform_data.insert(platform.as_str().to_owned(), serde_json::to_value(record)?);
    }

    let mut result = CommandResult::ok(
        Value::Object(Map::from_iter([
            (String::from("platforms"), Value::Object(platform_data)),
            (String::from("combined"), serde_json::to_value(combined)?),
        ])),
        platforms.clone(),
    );

    for platform in &platforms {
        if results.get(platform).map(Option::is_none).unwrap_or(true) {
            result = result.with_warning(format!("no data for platform '{platform}'"));
        }
    }

    Ok(result)
}
