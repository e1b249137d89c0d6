mod helpers;

use scriptorium_backend::catalog::Catalog;
use scriptorium_backend::settings::Settings;

use helpers::{counting_catalog, fixture_catalog, fixture_dir, write_file};

fn short_token_catalog(dir: &tempfile::TempDir) -> Catalog {
    let mut settings = Settings::default();
    settings.bridge.min_token_len = 3;
    counting_catalog(dir, settings).0
}

#[test]
fn test_god_topic_links_to_exodus_20_2() {
    let dir = fixture_dir();
    let catalog = short_token_catalog(&dir);

    let related = catalog.bridge_for("god").unwrap();
    let numbers: Vec<u32> = related.iter().map(|r| r.commandment.number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);

    let first = &related[0];
    assert_eq!(first.commandment.display_reference(), "Exodus 20:2");
    // verse 3, name in text 3, keyword 2, name in category 2
    assert_eq!(first.score, 10);

    let topics = catalog.topics_for_commandment(1).unwrap();
    assert_eq!(topics.len(), 1);
    assert_eq!(topics[0].slug, "god");
    assert_eq!(topics[0].name, "God");
    assert_eq!(topics[0].score, 10);

    // honoring parents shares the chapter only
    assert!(catalog.topics_for_commandment(4).unwrap().is_empty());
}

#[test]
fn test_short_names_do_not_match_with_default_policy() {
    let dir = fixture_dir();
    let catalog = fixture_catalog(&dir);

    assert!(catalog.bridge_for("god").unwrap().is_empty());

    let sabbath: Vec<u32> = catalog.bridge_for("sabbath")
        .unwrap()
        .iter()
        .map(|r| r.commandment.number)
        .collect();
    assert_eq!(sabbath, vec![6, 7, 8]);

    let stats = catalog.bridge_stats().unwrap();
    assert_eq!(stats.bridged_topics, 1);
    assert_eq!(stats.distinct_targets, 3);
    assert_eq!(stats.average_targets_per_topic, 3);
}

#[test]
fn test_forward_and_reverse_agree() {
    let dir = fixture_dir();
    let catalog = short_token_catalog(&dir);
    let bridge = catalog.bridge().unwrap();
    let threshold = catalog.settings().bridge.threshold;
    let min_fan_out = catalog.settings().bridge.min_fan_out;

    assert!(bridge.forward.get("honesty").is_none());

    for (slug, edges) in &bridge.forward {
        assert!(edges.len() >= min_fan_out);
        for edge in edges {
            assert!(edge.score >= threshold);
            let back = bridge.topics_for(&edge.target);
            assert!(back.iter().any(|t| &t.slug == slug && t.score == edge.score));
        }
    }

    for (number, topics) in &bridge.reverse {
        for t in topics {
            assert!(bridge.targets_for(&t.slug).iter().any(|e| &e.target == number));
        }
    }
}

#[test]
fn test_raised_threshold_drops_topics() {
    let dir = fixture_dir();
    write_file(&dir.path().join("settings.json"), r#"{"bridge": {"threshold": 11}}"#);
    let catalog = fixture_catalog(&dir);

    // sabbath pairs score 10 or 12, leaving fewer than three edges
    assert!(catalog.bridge_for("sabbath").unwrap().is_empty());
    assert_eq!(catalog.bridge_stats().unwrap().bridged_topics, 0);
}
