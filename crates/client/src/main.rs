use anyhow::{Context, Result};
use duel_client::{ClientConfig, print_log, setup_logging};
use duel_core::Side;
use duel_runtime::{
    EventBus, FixedSelector, Match, MatchBuilder, RandomMoveProvider, RandomSelector, Topic,
};

fn with_selector(builder: MatchBuilder, config: &ClientConfig, side: Side) -> MatchBuilder {
    match (&config.characters[side], config.seed) {
        (Some(name), _) => builder.selector(side, FixedSelector::new(name.as_str())),
        (None, Some(seed)) => {
            builder.selector(side, RandomSelector::new(seed.wrapping_add(side.index() as u64)))
        }
        (None, None) => builder.selector(side, RandomSelector::from_entropy()),
    }
}

fn provider(config: &ClientConfig, side: Side) -> RandomMoveProvider {
    match config.seed {
        Some(seed) => RandomMoveProvider::new(seed.wrapping_add(10 + side.index() as u64)),
        None => RandomMoveProvider::from_entropy(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = ClientConfig::from_env();
    let _guard = setup_logging(config.log_dir.as_deref())?;

    let match_config = config.match_config();
    let bus = EventBus::with_capacity(match_config.event_buffer_size);
    let printer = tokio::spawn(print_log(
        bus.subscribe(Topic::Log),
        config.players.clone(),
        config.show_private,
        std::io::stdout(),
    ));

    let mut builder = Match::builder().config(match_config).event_bus(bus);
    for side in Side::BOTH {
        builder = with_selector(builder, &config, side).provider(side, provider(&config, side));
    }
    let report = builder.run().await.context("match failed")?;

    printer.await.context("battle log printer panicked")??;

    tracing::info!(result = ?report.result, turns = report.turns, "match finished");
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
