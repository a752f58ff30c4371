// End-to-end alignment scoring with file-based configuration

use std::io::Write;

use partysim::alignment::{aggregate_and_score, Decision, PartyStanceTable};
use partysim::config::load_config_from;
use partysim::news::{NewsItem, UserDecision};

fn news(id: &str, category: &str) -> NewsItem {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "title": format!("Story {}", id),
        "category": category,
    }))
    .unwrap()
}

#[test]
fn test_config_points_at_custom_party_table() {
    let dir = tempfile::tempdir().unwrap();

    let parties_path = dir.path().join("parties.toml");
    let mut parties = std::fs::File::create(&parties_path).unwrap();
    write!(
        parties,
        r##"
[[parties]]
id = "green"
name = "Green"
color = "#00AA00"
stances = {{ Environment = "support", Transport = "support" }}

[[parties]]
id = "grey"
name = "Grey"
color = "#888888"
stances = {{ Environment = "oppose" }}
"##
    )
    .unwrap();

    let config_path = dir.path().join("config.toml");
    std::fs::write(
        &config_path,
        format!("parties_path = {:?}\n", parties_path.to_string_lossy()),
    )
    .unwrap();

    let config = load_config_from(Some(&config_path), |_| None).unwrap();
    let table = PartyStanceTable::load_or_builtin(config.parties_path.as_deref()).unwrap();
    assert_eq!(table.len(), 2);

    let items = vec![news("1", "Environment"), news("2", "Transport")];
    let decisions = vec![
        UserDecision { news_id: "1".into(), decision: Decision::Oppose, timestamp: 1 },
        UserDecision { news_id: "2".into(), decision: Decision::Support, timestamp: 2 },
        // Changed mind on the environment story
        UserDecision { news_id: "1".into(), decision: Decision::Support, timestamp: 3 },
    ];

    let results = aggregate_and_score(&decisions, &items, &table);
    let scores: Vec<(&str, u8)> = results.iter().map(|r| (r.party.id.as_str(), r.score)).collect();
    // grey: environment support vs oppose = 0, transport unlisted = 0.5
    assert_eq!(scores, vec![("green", 100), ("grey", 25)]);
}

#[test]
fn test_environment_overrides_parties_path() {
    let config = load_config_from(None, |key| match key {
        "PARTYSIM_PARTIES" => Some("/srv/partysim/parties.json".to_string()),
        _ => None,
    })
    .unwrap();
    assert_eq!(
        config.parties_path.as_deref(),
        Some(std::path::Path::new("/srv/partysim/parties.json"))
    );
}

#[test]
fn test_no_configured_table_uses_builtin() {
    let table = PartyStanceTable::load_or_builtin(None).unwrap();
    assert_eq!(&table, PartyStanceTable::builtin());
}

#[test]
fn test_decisions_on_unknown_news_are_ignored() {
    let decisions = vec![UserDecision {
        news_id: "missing".into(),
        decision: Decision::Support,
        timestamp: 1,
    }];
    let results = aggregate_and_score(&decisions, &[], PartyStanceTable::builtin());
    assert!(results.iter().all(|r| r.score == 50));
}
