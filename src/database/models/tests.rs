use super::*;
use chrono::TimeZone;

fn sample_entry() -> JournalEntry {
    JournalEntry {
        id: "3f8a9c21-5e7b-4d12-9a34-0b6c8d1e2f45".to_string(),
        content: "today was good".to_string(),
        mood: "happy".to_string(),
        tags: vec!["gratitude".to_string()],
        created_at: Utc.with_ymd_and_hms(2024, 3, 15, 8, 30, 0).single().expect("valid date"),
    }
}

#[test]
fn embedding_text_prefixes_mood() {
    let entry = sample_entry();
    assert_eq!(entry.embedding_text(), "happy: today was good");
}

#[test]
fn short_id_truncates() {
    let entry = sample_entry();
    assert_eq!(entry.short_id(), "3f8a9c21");
}

#[test]
fn short_id_handles_short_ids() {
    let entry = JournalEntry {
        id: "a".to_string(),
        ..sample_entry()
    };
    assert_eq!(entry.short_id(), "a");
}

#[test]
fn deserializes_from_postgrest_row() {
    let row = r#"{
        "id": "a",
        "content": "today was good",
        "mood": "happy",
        "tags": ["one", "two"],
        "created_at": "2024-03-15T08:30:00+00:00"
    }"#;

    let entry: JournalEntry = serde_json::from_str(row).expect("row should deserialize");

    assert_eq!(entry.id, "a");
    assert_eq!(entry.mood, "happy");
    assert_eq!(entry.tags, vec!["one".to_string(), "two".to_string()]);
}

#[test]
fn null_tags_default_to_empty() {
    let row = r#"{
        "id": "a",
        "content": "c",
        "mood": "m",
        "created_at": "2024-03-15T08:30:00Z"
    }"#;

    let entry: JournalEntry = serde_json::from_str(row).expect("row should deserialize");
    assert!(entry.tags.is_empty());
}

#[test]
fn explicit_null_tags_default_to_empty() {
    let row = r#"{
        "id": "a",
        "content": "c",
        "mood": "m",
        "tags": null,
        "created_at": "2024-03-15T08:30:00Z"
    }"#;

    let entry: JournalEntry = serde_json::from_str(row).expect("row should deserialize");
    assert!(entry.tags.is_empty());
}

#[test]
fn missing_required_field_is_rejected() {
    let row = r#"{ "id": "a", "mood": "m", "created_at": "2024-03-15T08:30:00Z" }"#;
    assert!(serde_json::from_str::<JournalEntry>(row).is_err());
}
