use prompt_enhancer::tracker::{compute_stats, CostLog, LogRecord, TrackerError};
use std::fs;
use tempfile::TempDir;

fn record(original: &str, confidence: u8, techniques: &[&str], cost: f64) -> LogRecord {
    LogRecord {
        timestamp: format!("2025-01-0{}T10:00:00.000Z", confidence.clamp(1, 9)),
        original: original.to_string(),
        confidence,
        techniques: techniques.iter().map(|t| t.to_string()).collect(),
        input_tokens: 100,
        output_tokens: 50,
        cost,
    }
}

#[test]
fn test_load_returns_appended_records_in_order() {
    let dir = TempDir::new().unwrap();
    let log = CostLog::new(dir.path().join("nested").join("log.jsonl"));

    let records = vec![
        record("first", 8, &["a", "b"], 0.000003),
        record("second", 6, &["a"], 0.000010),
        record("third", 9, &["b", "c"], 0.000002),
    ];
    for r in &records {
        log.try_append(r).unwrap();
    }

    assert_eq!(log.load_all().unwrap(), records);

    let content = fs::read_to_string(log.path()).unwrap();
    assert_eq!(content.lines().count(), 3);
    assert!(content.ends_with('\n'));
    assert!(content.contains("\"inputTokens\":100"));
}

#[test]
fn test_stats_over_loaded_records() {
    let dir = TempDir::new().unwrap();
    let log = CostLog::new(dir.path().join("log.jsonl"));
    log.append(&record("first", 8, &["a", "b"], 0.000003));
    log.append(&record("second", 6, &["a"], 0.000010));
    log.append(&record("third", 9, &["b", "c"], 0.000002));

    let stats = compute_stats(&log.load_all().unwrap());
    assert_eq!(stats.total_enhancements, 3);
    assert_eq!(stats.total_cost.to_string(), "0.000015");
    assert_eq!(stats.average_cost.to_string(), "0.000005");
    assert_eq!(stats.total_input_tokens, 300);
    assert_eq!(stats.total_output_tokens, 150);
    assert!((stats.average_confidence - 23.0 / 3.0).abs() < 1e-9);
    assert_eq!(
        stats.last_enhancement.as_deref(),
        Some("2025-01-09T10:00:00.000Z")
    );

    let top: Vec<(&str, u64)> = stats
        .top_techniques
        .iter()
        .map(|t| (t.technique.as_str(), t.count as u64))
        .collect();
    assert_eq!(top, vec![("a", 2), ("b", 2), ("c", 1)]);
}

#[test]
fn test_clear_then_stats_are_zero() {
    let dir = TempDir::new().unwrap();
    let log = CostLog::new(dir.path().join("log.jsonl"));
    log.append(&record("first", 8, &["a"], 0.5));

    log.clear().unwrap();

    let records = log.load_all().unwrap();
    assert!(records.is_empty());
    let stats = compute_stats(&records);
    assert!(stats.is_empty());
    assert_eq!(stats.total_cost.to_string(), "0.000000");
    assert_eq!(stats.average_cost.to_string(), "0.000000");
    assert!(stats.last_enhancement.is_none());
    assert!(stats.top_techniques.is_empty());
}

#[test]
fn test_missing_file_is_empty_and_clear_is_noop() {
    let dir = TempDir::new().unwrap();
    let log = CostLog::new(dir.path().join("absent.jsonl"));

    assert!(log.load_all().unwrap().is_empty());
    log.clear().unwrap();
    assert!(!log.path().exists());
}

#[test]
fn test_corrupt_line_is_reported_with_line_number() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("log.jsonl");
    let good = serde_json::to_string(&record("ok", 7, &[], 0.1)).unwrap();
    fs::write(&path, format!("{}\n\n{{not json\n", good)).unwrap();

    match CostLog::new(&path).load_all() {
        Err(TrackerError::Corrupt { line, .. }) => assert_eq!(line, 3),
        other => panic!("expected corrupt log, got {:?}", other),
    }
}

#[test]
fn test_record_without_optional_fields_loads_with_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("log.jsonl");
    fs::write(
        &path,
        "{\"timestamp\":\"2025-01-01T00:00:00.000Z\",\"original\":\"make it\"}\n",
    )
    .unwrap();

    let records = CostLog::new(&path).load_all().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].confidence, 0);
    assert!(records[0].techniques.is_empty());
    assert_eq!(records[0].cost, 0.0);
}
