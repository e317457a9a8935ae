//! Integration tests for linking and registry persistence.
//!
//! Exercises the full path: parse collaborator output, link into a registry,
//! save, reload and keep linking.

use cairn_core::{
    compact_context, parse_annotated_dataset, parse_extraction_output, EntityRegistry,
    EntityType, FuzzyMatcher, LinkOutcome, Linker, Mention, MentionRecord, RegistryStore,
};

/// Mentions scoring at or above the threshold resolve to the existing entity.
#[test]
fn test_close_mentions_link_to_existing_entity() {
    let mut registry = EntityRegistry::new();
    let mut linker = Linker::default();
    let matcher = FuzzyMatcher::default();

    let seed = linker
        .link(&mut registry, &Mention::new("robot arm", EntityType::Component), "s1")
        .unwrap();

    for variant in ["Robot Arm", "robot-arm", "ROBOT_ARM", "robot arms", "(robot arm)"] {
        let normalized = cairn_core::normalize(variant, EntityType::Component);
        let score = FuzzyMatcher::similarity(&normalized, "robot arm");
        assert!(score >= matcher.threshold(), "{variant} scored {score}");

        let resolution = linker
            .link(&mut registry, &Mention::new(variant, EntityType::Component), "s2")
            .unwrap();
        assert_eq!(resolution.entity_id, seed.entity_id, "{variant} did not link");
        assert_eq!(resolution.outcome, LinkOutcome::Linked);
    }

    assert_eq!(registry.len(), 1);
    assert_eq!(registry.get(seed.entity_id).unwrap().count(), 6);
}

/// Mentions with no candidate above threshold get fresh ids.
#[test]
fn test_distinct_mentions_get_fresh_ids() {
    let mut registry = EntityRegistry::new();
    let mut linker = Linker::default();

    let names = ["base plate", "servo motor", "gripper assembly", "teach pendant", "cable tray"];
    let mut seen = Vec::new();
    for name in names {
        let resolution = linker
            .link(&mut registry, &Mention::new(name, EntityType::Component), "s1")
            .unwrap();
        assert!(resolution.is_new());
        assert!(!seen.contains(&resolution.entity_id));
        seen.push(resolution.entity_id);
    }

    assert!(seen.windows(2).all(|w| w[0] < w[1]));
}

/// Registry state and id allocation survive a save/load cycle.
#[test]
fn test_save_load_round_trip_never_reuses_ids() {
    let dir = tempfile::tempdir().unwrap();
    let store = RegistryStore::new(dir.path().join("registry.json"));

    let mut registry = EntityRegistry::new();
    let mut linker = Linker::default();
    linker.link_batch(
        &mut registry,
        vec![
            MentionRecord::new("control box", "COMPONENT"),
            MentionRecord::new("Control Box", "COMPONENT"),
            MentionRecord::new("connect", "ACTION"),
        ],
        "sent_0001",
    );
    store.save(&registry, *linker.stats()).unwrap();

    let (mut reloaded, stats) = store.load().unwrap();
    assert_eq!(stats.total_extractions, 3);
    assert_eq!(stats.linked_entities, 1);
    assert_eq!(reloaded.len(), 2);
    assert_eq!(reloaded.next_id(), 3);

    let control_box = reloaded.get(1).unwrap();
    assert_eq!(control_box.aliases, vec!["control box", "Control Box"]);
    assert_eq!(control_box.count(), 2);
    assert_eq!(control_box.first_seen_source, "sent_0001");

    let mut linker = Linker::default();
    let report = linker.link_batch(
        &mut reloaded,
        vec![
            MentionRecord::new("CONTROL BOX", "component"),
            MentionRecord::new("teach pendant", "COMPONENT"),
        ],
        "sent_0002",
    );
    assert_eq!(report.entity_for(0), Some(1));
    assert_eq!(report.entity_for(1), Some(3));
}

/// Annotated samples flow through ingest and linking batch by batch.
#[test]
fn test_annotated_dataset_pipeline() {
    let content = r#"[
        {"text": "Connect the control box to the robot arm.", "entities": [[0, 7, "ACTION"], [12, 23, "COMPONENT"], [31, 40, "COMPONENT"]]},
        {"text": "The Control Box must be grounded.", "entities": [[4, 15, "COMPONENT"], [24, 32, "ACTION"]]},
        {"text": "Install the teach pendant.", "entities": [[0, 7, "ACTION"], [12, 25, "COMPONENT"], [12, 25, "GADGET"]]}
    ]"#;

    let mut registry = EntityRegistry::new();
    let mut linker = Linker::default();
    let reports: Vec<_> = parse_annotated_dataset(content)
        .unwrap()
        .into_iter()
        .map(|batch| linker.link_batch(&mut registry, batch.mentions, &batch.source))
        .collect();

    assert_eq!(reports[1].linked_count, 1);
    assert_eq!(reports[1].resolutions[0].canonical, "control box");
    assert_eq!(reports[2].rejections.len(), 1);
    assert_eq!(reports[2].rejections[0].label, "GADGET");

    // connect, control box, robot arm, grounded, install, teach pendant
    assert_eq!(registry.len(), 6);

    let context = compact_context(&registry, 1);
    assert!(context.starts_with("control box (COMPONENT) [seen 2x]"));
}

/// LLM responses with fences feed straight into the linker.
#[test]
fn test_llm_output_pipeline() {
    let response = "```json\n{\"entities\": [\n  {\"text\": \"torque wrench\", \"type\": \"TOOL\"},\n  {\"text\": \"5 Nm\", \"type\": \"PARAMETER\"},\n  {\"text\": \"\", \"type\": \"TOOL\"}\n]}\n```";

    let records = parse_extraction_output(response).unwrap();
    let mut registry = EntityRegistry::new();
    let mut linker = Linker::default();
    let report = linker.link_batch(&mut registry, records, "llm_0001");

    assert_eq!(report.new_count, 2);
    assert_eq!(report.rejections.len(), 1);
    assert_eq!(registry.of_type(EntityType::Parameter).next().unwrap().canonical_text, "5 nm");
}
