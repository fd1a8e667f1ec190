use geovoice::capture::{RecognizerError, TranscriptEvent};

#[test]
fn transcript_serialization_uses_final_on_the_wire() {
    let event = TranscriptEvent {
        text: "navigate to Mumbai via Pune".to_string(),
        is_final: true,
        cycle: 4,
        sequence: 17,
        timestamp: "2026-08-06T10:15:00Z".to_string(),
    };

    let json = serde_json::to_string(&event).unwrap();
    assert!(json.contains("\"final\":true"));
    assert!(json.contains("\"cycle\":4"));
    assert!(json.contains("\"sequence\":17"));

    let deserialized: TranscriptEvent = serde_json::from_str(&json).unwrap();
    assert_eq!(deserialized.text, "navigate to Mumbai via Pune");
    assert!(deserialized.is_final);
    assert_eq!(deserialized.cycle, 4);
}

#[test]
fn transcript_deserialization_tolerates_missing_timestamp() {
    let json = r#"{
        "text": "zoom in",
        "final": false,
        "cycle": 2,
        "sequence": 9
    }"#;

    let event: TranscriptEvent = serde_json::from_str(json).unwrap();
    assert!(!event.is_final);
    assert!(event.timestamp.is_empty());
}

#[test]
fn recognizer_error_roundtrip() {
    let json = r#"{ "message": "no-speech" }"#;
    let report: RecognizerError = serde_json::from_str(json).unwrap();
    assert_eq!(report.message, "no-speech");
}
