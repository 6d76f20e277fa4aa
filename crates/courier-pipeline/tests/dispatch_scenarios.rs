//! End-to-end dispatch scenarios.
//!
//! Each test builds a batch of JSON envelope files, runs it through a
//! `DispatchService` and checks which files come back skipped.

use chrono::{DateTime, Duration, Months, TimeZone, Utc};
use courier_pipeline::{
    Certificate, ChannelSender, Cryptographer, DispatchService, Document, Ed25519Cryptographer,
    File, FileDispatchApi, FixedClock, JsonRecognizer, PipelineConfig, RecognitionError,
    Recognizer, Sender, SignedContent, SignedEnvelope, SigningError, TransmissionError,
};
use proptest::prelude::*;
use std::sync::{Arc, Mutex};

// =============================================================================
// Helpers
// =============================================================================

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
}

fn envelope_file(name: &str, version: &str, created_at: DateTime<Utc>) -> File {
    let body = serde_json::json!({
        "format_version": version,
        "created_at": created_at.to_rfc3339(),
        "content": format!("body of {name}"),
    });
    File::new(name, body.to_string())
}

fn certificate() -> Certificate {
    Certificate::new("dispatch@example.org", vec![0x5A; 32])
}

/// Sender that records payloads and refuses those whose content mentions
/// one of `refuse`.
#[derive(Clone, Default)]
struct ScriptedSender {
    sent: Arc<Mutex<Vec<Vec<u8>>>>,
    refuse: Vec<String>,
}

impl ScriptedSender {
    fn refusing(names: &[&str]) -> Self {
        Self {
            refuse: names.iter().map(|n| format!("body of {n}")).collect(),
            ..Self::default()
        }
    }

    fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl Sender for ScriptedSender {
    fn try_send(&self, content: SignedContent) -> Result<(), TransmissionError> {
        let envelope = SignedEnvelope::decode(&content).map_err(|e| TransmissionError::Rejected {
            reason: e.to_string(),
        })?;
        let body = String::from_utf8_lossy(&envelope.payload).to_string();
        if self.refuse.contains(&body) {
            return Err(TransmissionError::Rejected { reason: body });
        }
        self.sent.lock().unwrap().push(content.into_bytes());
        Ok(())
    }
}

/// Recognizer that counts calls and never recognizes anything.
#[derive(Clone, Default)]
struct BlindRecognizer {
    calls: Arc<Mutex<usize>>,
}

impl Recognizer for BlindRecognizer {
    fn try_recognize(&self, file: &File) -> Result<Document, RecognitionError> {
        *self.calls.lock().unwrap() += 1;
        Err(RecognitionError::Unrecognized(file.name().to_string()))
    }
}

/// Cryptographer that counts calls and delegates to Ed25519.
#[derive(Clone, Default)]
struct CountingCryptographer {
    calls: Arc<Mutex<usize>>,
}

impl Cryptographer for CountingCryptographer {
    fn sign(
        &self,
        content: &[u8],
        certificate: &Certificate,
    ) -> Result<SignedContent, SigningError> {
        *self.calls.lock().unwrap() += 1;
        Ed25519Cryptographer.sign(content, certificate)
    }
}

fn service_with<S: Sender>(
    sender: S,
) -> DispatchService<JsonRecognizer, Ed25519Cryptographer, S, FixedClock> {
    service_at(sender, now())
}

fn service_at<S: Sender>(
    sender: S,
    at: DateTime<Utc>,
) -> DispatchService<JsonRecognizer, Ed25519Cryptographer, S, FixedClock> {
    DispatchService::with_clock(JsonRecognizer, Ed25519Cryptographer, sender, FixedClock::at(at))
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn scenario_a_current_v4_document_is_sent() {
    let sender = ScriptedSender::default();
    let service = service_with(sender.clone());

    let result = service.send_files(&[envelope_file("a.json", "4.0", now())], &certificate());

    assert!(result.skipped_files.is_empty());
    assert_eq!(sender.sent_count(), 1);
}

#[test]
fn scenario_b_html_format_is_skipped() {
    let sender = ScriptedSender::default();
    let service = service_with(sender.clone());

    let file = envelope_file("page.json", "<html>", now());
    let result = service.send_files(std::slice::from_ref(&file), &certificate());

    assert_eq!(result.skipped_files, vec![file]);
    assert_eq!(sender.sent_count(), 0);
}

#[test]
fn scenario_c_exactly_one_month_old_is_skipped() {
    let service = service_with(ScriptedSender::default());

    let created = now() - Months::new(1);
    let files = [envelope_file("old.json", "4.0", created)];
    let result = service.send_files(&files, &certificate());

    assert_eq!(result.skipped_names(), vec!["old.json"]);
}

#[test]
fn scenario_d_twenty_seven_days_old_is_sent() {
    let service = service_with(ScriptedSender::default());

    let created = now() - Duration::days(27);
    let files = [envelope_file("recent.json", "4.0", created)];
    let result = service.send_files(&files, &certificate());

    assert!(result.all_sent());
}

#[test]
fn scenario_e_only_bad_format_skipped() {
    let service = service_with(ScriptedSender::default());

    let files = vec![
        envelope_file("first.json", "2.7", now()),
        envelope_file("second.json", "3.1", now()),
    ];
    let result = service.send_files(&files, &certificate());

    assert_eq!(result.skipped_files, vec![files[0].clone()]);
}

#[test]
fn scenario_f_only_failed_send_skipped() {
    let sender = ScriptedSender::refusing(&["second.json"]);
    let service = service_with(sender.clone());

    let files = vec![
        envelope_file("first.json", "4.0", now()),
        envelope_file("second.json", "4.0", now()),
    ];
    let result = service.send_files(&files, &certificate());

    assert_eq!(result.skipped_files, vec![files[1].clone()]);
    assert_eq!(sender.sent_count(), 1);
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn unrecognized_files_never_reach_signing_or_sending() {
    let recognizer = BlindRecognizer::default();
    let cryptographer = CountingCryptographer::default();
    let sender = ScriptedSender::default();
    let service = DispatchService::with_clock(
        recognizer.clone(),
        cryptographer.clone(),
        sender.clone(),
        FixedClock::at(now()),
    );

    let files: Vec<File> = (0..5)
        .map(|i| envelope_file(&format!("{i}.json"), "4.0", now()))
        .collect();
    let result = service.send_files(&files, &certificate());

    assert_eq!(result.skipped_files, files);
    assert_eq!(*recognizer.calls.lock().unwrap(), 5);
    assert_eq!(*cryptographer.calls.lock().unwrap(), 0);
    assert_eq!(sender.sent_count(), 0);
}

#[test]
fn unparseable_content_is_skipped_with_the_rest_sent() {
    let service = service_with(ScriptedSender::default());

    let files = vec![
        File::new("binary.bin", vec![0xde, 0xad, 0xbe, 0xef]),
        envelope_file("good.json", "4.0", now()),
        File::new("notes.txt", "just some notes"),
    ];
    let result = service.send_files(&files, &certificate());

    assert_eq!(result.skipped_names(), vec!["binary.bin", "notes.txt"]);
}

#[test]
fn invalid_certificate_skips_every_file() {
    let sender = ScriptedSender::default();
    let service = service_with(sender.clone());

    let files = vec![
        envelope_file("a.json", "4.0", now()),
        envelope_file("b.json", "3.1", now()),
    ];
    let result = service.send_files(&files, &Certificate::new("broken", vec![1, 2, 3]));

    assert_eq!(result.skipped_files, files);
    assert_eq!(sender.sent_count(), 0);
}

#[test]
fn parallel_batch_preserves_input_order() {
    let sender = ScriptedSender::refusing(&["f3.json", "f17.json"]);
    let service = service_with(sender.clone())
        .with_config(&PipelineConfig::parallel(4))
        .unwrap();

    let files: Vec<File> = (0..50)
        .map(|i| {
            let version = if i % 10 == 0 { "1.0" } else { "4.0" };
            envelope_file(&format!("f{i}.json"), version, now())
        })
        .collect();
    let result = service.send_files(&files, &certificate());

    assert_eq!(
        result.skipped_names(),
        vec!["f0.json", "f3.json", "f10.json", "f17.json", "f20.json", "f30.json", "f40.json"]
    );
    assert_eq!(sender.sent_count(), 43);
}

#[test]
fn signed_payloads_verify_on_the_receiving_side() {
    let (sender, mut rx) = ChannelSender::channel();
    let service = service_with(sender);

    let result = service.send_files(
        &[
            envelope_file("one.json", "4.0", now()),
            envelope_file("two.json", "3.1", now() - Duration::days(3)),
        ],
        &certificate(),
    );
    assert!(result.all_sent());

    let mut bodies = Vec::new();
    while let Ok(signed) = rx.try_recv() {
        let envelope = SignedEnvelope::decode(&signed).unwrap();
        envelope.verify().unwrap();
        assert_eq!(envelope.subject, "dispatch@example.org");
        bodies.push(String::from_utf8(envelope.payload).unwrap());
    }
    assert_eq!(bodies, vec!["body of one.json", "body of two.json"]);
}

#[test]
fn closed_channel_skips_every_file() {
    let (sender, rx) = ChannelSender::channel();
    drop(rx);
    let service = service_with(sender);

    let files = vec![envelope_file("a.json", "4.0", now())];
    let result = service.send_files(&files, &certificate());

    assert_eq!(result.skipped_files, files);
}

// =============================================================================
// Generated batches
// =============================================================================

/// One generated file: format version, age in days, refused by the sender.
fn file_plan() -> impl Strategy<Value = (&'static str, i64, bool)> {
    (
        prop_oneof![Just("4.0"), Just("3.1"), Just("9.9"), Just(" 4.0")],
        0i64..60,
        any::<bool>(),
    )
}

/// Instants between 2000 and 2099, weighted towards the last days of a month.
fn instant() -> impl Strategy<Value = DateTime<Utc>> {
    (
        2000i32..2100,
        1u32..=12,
        prop_oneof![1u32..=31, 28u32..=31],
        0u32..24,
        0u32..60,
        0u32..60,
    )
        .prop_filter_map("valid calendar date", |(y, mo, d, h, mi, s)| {
            Utc.with_ymd_and_hms(y, mo, d, h, mi, s).single()
        })
}

proptest! {
    #[test]
    fn batch_outcome_matches_individual_outcomes(
        plans in prop::collection::vec(file_plan(), 0..16)
    ) {
        let files: Vec<File> = plans
            .iter()
            .enumerate()
            .map(|(i, (version, age, _))| {
                envelope_file(&format!("f{i}.json"), version, now() - Duration::days(*age))
            })
            .collect();
        let refused: Vec<String> = plans
            .iter()
            .enumerate()
            .filter(|(_, (_, _, refuse))| *refuse)
            .map(|(i, _)| format!("f{i}.json"))
            .collect();
        let refused: Vec<&str> = refused.iter().map(String::as_str).collect();

        let service = service_with(ScriptedSender::refusing(&refused));
        let batch = service.send_files(&files, &certificate());

        let individually: Vec<File> = files
            .iter()
            .filter(|file| {
                !service
                    .send_files(std::slice::from_ref(*file), &certificate())
                    .all_sent()
            })
            .cloned()
            .collect();

        prop_assert_eq!(batch.skipped_files, individually);
    }

    #[test]
    fn unaccepted_versions_are_always_skipped(
        version in "[ -~]{0,6}",
        age_days in 0i64..400,
    ) {
        prop_assume!(version != "4.0" && version != "3.1");

        let sender = ScriptedSender::default();
        let service = service_with(sender.clone());
        let files = [envelope_file("doc.json", &version, now() - Duration::days(age_days))];

        let result = service.send_files(&files, &certificate());

        prop_assert_eq!(result.skipped_names(), vec!["doc.json"]);
        prop_assert_eq!(sender.sent_count(), 0);
    }

    #[test]
    fn document_exactly_one_month_old_is_skipped(at in instant()) {
        let service = service_at(ScriptedSender::default(), at);
        let files = [envelope_file("edge.json", "4.0", at - Months::new(1))];

        let result = service.send_files(&files, &certificate());

        prop_assert_eq!(result.skipped_names(), vec!["edge.json"]);
    }

    #[test]
    fn freshness_follows_strict_calendar_month_boundary(
        at in instant(),
        offset_secs in -3_456_000i64..3_456_000,
    ) {
        let created = at - Months::new(1) + Duration::seconds(offset_secs);
        let expires = created + Months::new(1);

        let service = service_at(ScriptedSender::default(), at);
        let result = service.send_files(&[envelope_file("doc.json", "4.0", created)], &certificate());

        prop_assert_eq!(result.all_sent(), expires > at);
    }
}
