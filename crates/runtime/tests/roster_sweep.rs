use std::time::Duration;

use duel_content::Roster;
use duel_core::{CharacterSource, Side};
use duel_runtime::{
    FixedSelector, Match, MatchConfig, MatchResult, RandomMoveProvider, RandomSelector,
};

fn config(seed: u64) -> MatchConfig {
    MatchConfig {
        turn_duration: Duration::from_secs(1),
        seed: Some(seed),
        ..MatchConfig::default()
    }
}

#[tokio::test]
async fn every_pairing_reaches_a_result() {
    let names = Roster::standard().names();
    for (i, challenger) in names.iter().enumerate() {
        for (j, challenged) in names.iter().enumerate() {
            let seed = (i * names.len() + j) as u64;
            let report = Match::builder()
                .config(config(seed))
                .selector(Side::Challenger, FixedSelector::new(challenger.as_str()))
                .selector(Side::Challenged, FixedSelector::new(challenged.as_str()))
                .provider(Side::Challenger, RandomMoveProvider::new(seed))
                .provider(Side::Challenged, RandomMoveProvider::new(seed + 100))
                .run()
                .await
                .unwrap_or_else(|err| panic!("{challenger} vs {challenged}: {err}"));

            assert_ne!(report.result, MatchResult::Incomplete, "{challenger} vs {challenged}");
            assert!(report.turns >= 1 && report.turns <= 50);
            assert!(report.final_stats.is_some());
        }
    }
}

#[tokio::test]
async fn seeded_matches_replay_identically() {
    let play = || async {
        Match::builder()
            .config(config(42))
            .selector(Side::Challenger, RandomSelector::new(1))
            .selector(Side::Challenged, RandomSelector::new(2))
            .provider(Side::Challenger, RandomMoveProvider::new(3))
            .provider(Side::Challenged, RandomMoveProvider::new(4))
            .run()
            .await
            .unwrap()
    };
    let first = play().await;
    let second = play().await;
    assert_eq!(first, second);
    assert!(first.choices[Side::Challenger].as_ref().is_some_and(|c| c.random));
}
