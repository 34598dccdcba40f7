//! Integration tests for the async engine.
//!
//! Every adapter is scripted and the tokio clock is paused, so timeouts
//! elapse instantly and ordering is deterministic.

#![allow(clippy::unwrap_used, clippy::panic)]

mod common;

use common::*;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::time::Instant;
use verisift::adapters::{SourceInput, Upload};
use verisift::engine::EvidenceGatherer;
use verisift_core::{
    CatalogEntry, ClassifierLabel, DocumentCatalog, EvidenceStatus, FallbackLabel, FinalLabel,
    Provenance, VerdictSource, Verified, VerisiftError,
};

// =============================================================================
// EVIDENCE GATHERER
// =============================================================================

mod gatherer {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn results_follow_configured_order_not_completion_order() {
        let gatherer = EvidenceGatherer::new(
            vec![
                ScriptedProvider::new("slow", Script::After(Duration::from_millis(300), posts("slow", 1))),
                ScriptedProvider::new("fast", Script::After(Duration::from_millis(10), posts("fast", 1))),
                ScriptedProvider::new("medium", Script::After(Duration::from_millis(100), posts("medium", 1))),
            ],
            Duration::from_secs(1),
        );

        let results = gatherer.gather(LONG_CLAIM).await;
        let names: Vec<&str> = results.iter().map(|r| r.source_name.as_str()).collect();
        assert_eq!(names, vec!["slow", "fast", "medium"]);
        assert!(results.iter().all(|r| r.is_success()));
    }

    #[tokio::test(start_paused = true)]
    async fn providers_run_concurrently() {
        let gatherer = EvidenceGatherer::new(
            (0..4)
                .map(|i| {
                    ScriptedProvider::new(
                        &format!("p{i}"),
                        Script::After(Duration::from_millis(500), posts("p", 1)),
                    )
                })
                .collect(),
            Duration::from_secs(1),
        );

        let start = Instant::now();
        let results = gatherer.gather(LONG_CLAIM).await;
        assert_eq!(results.len(), 4);
        assert!(start.elapsed() < Duration::from_millis(1_000));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_is_contained_to_its_provider() {
        let gatherer = EvidenceGatherer::new(
            vec![
                ScriptedProvider::new("X (Twitter)", Script::Return(posts("X (Twitter)", 2))),
                ScriptedProvider::new("Stuck", Script::Hang),
                ScriptedProvider::new("Reddit", Script::Return(posts("Reddit", 3))),
            ],
            Duration::from_millis(750),
        );

        let results = gatherer.gather(LONG_CLAIM).await;

        assert_eq!(results[0].status, EvidenceStatus::Success);
        assert_eq!(results[0].items.len(), 2);

        assert_eq!(results[1].status, EvidenceStatus::Error);
        assert_eq!(results[1].source_name, "Stuck");
        assert!(results[1].items.is_empty());
        assert_eq!(
            results[1].error_message.as_deref(),
            Some("Stuck timed out after 750ms")
        );

        assert_eq!(results[2].items.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_provider_becomes_error_result() {
        let gatherer = EvidenceGatherer::new(
            vec![
                ScriptedProvider::new("Broken", Script::Panic),
                ScriptedProvider::new("Reddit", Script::Return(posts("Reddit", 1))),
            ],
            Duration::from_secs(1),
        );

        let results = gatherer.gather(LONG_CLAIM).await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].source_name, "Broken");
        assert!(!results[0].is_success());
        assert!(results[1].is_success());
    }

    #[tokio::test(start_paused = true)]
    async fn provider_error_is_passed_through() {
        let gatherer = EvidenceGatherer::new(
            vec![ScriptedProvider::new(
                "X (Twitter)",
                Script::Fail("bearer token is not configured".to_string()),
            )],
            Duration::from_secs(1),
        );

        let results = gatherer.gather(LONG_CLAIM).await;
        assert_eq!(
            results[0].error_message.as_deref(),
            Some("bearer token is not configured")
        );
    }

    #[tokio::test]
    async fn no_providers_no_results() {
        let gatherer = EvidenceGatherer::new(Vec::new(), Duration::from_secs(1));
        assert!(gatherer.gather(LONG_CLAIM).await.is_empty());
        assert!(gatherer.provider_names().is_empty());
    }
}

// =============================================================================
// VERDICT ORCHESTRATOR
// =============================================================================

mod orchestrator {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn confident_classifier_skips_fallback() {
        let classifier =
            ScriptedClassifier::new(Script::Return(classifier_verdict(ClassifierLabel::Fake, 90)));
        let assessor =
            ScriptedAssessor::new(Script::Return(fallback_verdict(FallbackLabel::Real, 99)));
        let orchestrator =
            orchestrator(classifier.clone(), assessor.clone(), quiet_providers());

        let response = orchestrator.analyze(LONG_CLAIM).await;

        assert_eq!(response.analysis().verdict(), FinalLabel::Fake);
        assert_eq!(response.analysis().source(), VerdictSource::ClassifierModel);
        assert_eq!(response.analysis().confidence().value(), 90);
        assert!(response.analysis().key_indicators().is_empty());
        assert_eq!(assessor.calls.load(Ordering::SeqCst), 0);
        assert_eq!(response.related_sources().len(), 2);
        assert_eq!(response.extracted_text(), LONG_CLAIM);
    }

    #[tokio::test(start_paused = true)]
    async fn short_text_goes_to_fallback() {
        let classifier =
            ScriptedClassifier::new(Script::Return(classifier_verdict(ClassifierLabel::Fake, 99)));
        let assessor =
            ScriptedAssessor::new(Script::Return(fallback_verdict(FallbackLabel::Real, 70)));
        let orchestrator =
            orchestrator(classifier.clone(), assessor.clone(), quiet_providers());

        let response = orchestrator.analyze(SHORT_CLAIM).await;
        let analysis = response.analysis();

        assert_eq!(analysis.verdict(), FinalLabel::Real);
        assert_eq!(analysis.source(), VerdictSource::FallbackModel);
        assert_eq!(analysis.key_indicators(), ["no official source"]);
        assert_eq!(analysis.highlighted(), ["shocking"]);
        assert_eq!(assessor.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_fallback_leaves_classifier_in_charge() {
        let classifier = ScriptedClassifier::new(Script::Return(classifier_verdict(
            ClassifierLabel::Uncertain,
            40,
        )));
        let assessor = ScriptedAssessor::new(Script::Return(fallback_verdict(
            FallbackLabel::Unknown,
            0,
        )));
        let orchestrator = orchestrator(classifier, assessor, quiet_providers());

        let response = orchestrator.analyze(LONG_CLAIM).await;
        assert_eq!(response.analysis().verdict(), FinalLabel::Uncertain);
        assert_eq!(response.analysis().source(), VerdictSource::ClassifierModel);
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_classifier_times_out_and_fallback_decides() {
        let classifier = ScriptedClassifier::new(Script::Hang);
        let assessor =
            ScriptedAssessor::new(Script::Return(fallback_verdict(FallbackLabel::Fake, 85)));
        let orchestrator = orchestrator(classifier, assessor.clone(), quiet_providers());

        let response = orchestrator.analyze(LONG_CLAIM).await;
        assert_eq!(response.analysis().verdict(), FinalLabel::Fake);
        assert_eq!(response.analysis().source(), VerdictSource::FallbackModel);
        assert_eq!(assessor.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_classifier_is_contained() {
        let classifier = ScriptedClassifier::new(Script::Panic);
        let assessor =
            ScriptedAssessor::new(Script::Return(fallback_verdict(FallbackLabel::Real, 75)));
        let orchestrator = orchestrator(classifier, assessor, quiet_providers());

        let response = orchestrator.analyze(LONG_CLAIM).await;
        assert_eq!(response.analysis().source(), VerdictSource::FallbackModel);
        assert_eq!(response.related_sources().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_usable_is_error_but_evidence_survives() {
        let classifier = ScriptedClassifier::new(Script::Fail("model not loaded".to_string()));
        let assessor = ScriptedAssessor::new(Script::Fail("quota exceeded".to_string()));
        let orchestrator = orchestrator(classifier, assessor, quiet_providers());

        let response = orchestrator.analyze(LONG_CLAIM).await;
        let analysis = response.analysis();

        assert_eq!(analysis.verdict(), FinalLabel::Error);
        assert_eq!(analysis.confidence().value(), 0);
        assert_eq!(analysis.source(), VerdictSource::Error);
        assert!(response.related_sources().iter().all(|r| r.is_success()));
    }

    #[tokio::test(start_paused = true)]
    async fn request_deadline_bounds_the_verdict_path() {
        let mut t = timeouts();
        t.fallback = Duration::from_secs(30);
        t.request = Duration::from_secs(3);

        let classifier = ScriptedClassifier::new(Script::Return(classifier_verdict(
            ClassifierLabel::Uncertain,
            10,
        )));
        let assessor = ScriptedAssessor::new(Script::Hang);
        let orchestrator = verisift::engine::Orchestrator::new(
            classifier,
            assessor,
            EvidenceGatherer::new(quiet_providers(), t.provider),
            t,
        );

        let start = Instant::now();
        let response = orchestrator.analyze(LONG_CLAIM).await;

        assert!(start.elapsed() < Duration::from_secs(4));
        assert_eq!(response.analysis().verdict(), FinalLabel::Error);
        assert!(response.analysis().explanation().contains("3000ms"));
        assert_eq!(response.related_sources().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_fallback_does_not_starve_evidence() {
        let classifier = ScriptedClassifier::new(Script::Return(classifier_verdict(
            ClassifierLabel::Uncertain,
            10,
        )));
        let assessor = ScriptedAssessor::new(Script::After(
            Duration::from_millis(1_500),
            fallback_verdict(FallbackLabel::Fake, 80),
        ));
        let providers = vec![ScriptedProvider::new(
            "Reddit",
            Script::After(Duration::from_millis(900), posts("Reddit", 2)),
        )];
        let orchestrator = orchestrator(classifier, assessor, providers);

        let start = Instant::now();
        let response = orchestrator.analyze(LONG_CLAIM).await;

        // Both ran side by side: total is the slower one, not the sum.
        assert!(start.elapsed() < Duration::from_millis(2_000));
        assert!(response.related_sources()[0].is_success());
        assert_eq!(response.analysis().source(), VerdictSource::FallbackModel);
    }

    #[tokio::test]
    async fn blank_text_is_rejected() {
        let orchestrator = orchestrator(
            ScriptedClassifier::new(Script::Hang),
            ScriptedAssessor::new(Script::Hang),
            Vec::new(),
        );
        let result = orchestrator.analyze_text("  \n ").await;
        assert!(matches!(result, Err(VerisiftError::EmptyText)));
    }

    #[tokio::test(start_paused = true)]
    async fn analyze_url_uses_extracted_paragraphs() {
        let article = "Officials confirmed no free laptop scheme exists.".to_string();
        let orchestrator = orchestrator(
            ScriptedClassifier::new(Script::Return(classifier_verdict(ClassifierLabel::Real, 95))),
            ScriptedAssessor::new(Script::Fail("disabled".to_string())),
            Vec::new(),
        )
        .with_article_source(Arc::new(FixedTextSource(Some(article.clone()))));

        let response = orchestrator
            .analyze_url("https://news.example.org/laptops")
            .await
            .unwrap();
        assert_eq!(response.extracted_text(), article);
    }

    #[tokio::test]
    async fn analyze_url_rejects_bad_input() {
        let orchestrator = orchestrator(
            ScriptedClassifier::new(Script::Hang),
            ScriptedAssessor::new(Script::Hang),
            Vec::new(),
        )
        .with_article_source(Arc::new(FixedTextSource(None)));

        assert!(matches!(
            orchestrator.analyze_url("ftp://example.org/file").await,
            Err(VerisiftError::InvalidUrl(_))
        ));
        assert!(matches!(
            orchestrator.analyze_url("https://example.org/empty").await,
            Err(VerisiftError::NoExtractableText)
        ));
    }
}

// =============================================================================
// TEXT SOURCES
// =============================================================================

mod sources {
    use super::*;
    use verisift_core::primitives::MAX_UPLOAD_BYTES;

    fn confident_orchestrator() -> verisift::engine::Orchestrator {
        orchestrator(
            ScriptedClassifier::new(Script::Return(classifier_verdict(ClassifierLabel::Fake, 92))),
            ScriptedAssessor::new(Script::Fail("disabled".to_string())),
            Vec::new(),
        )
    }

    fn png(bytes: &[u8]) -> SourceInput {
        SourceInput::Upload(Upload::new(bytes.to_vec()).with_content_type("image/png"))
    }

    #[tokio::test(start_paused = true)]
    async fn image_upload_is_transcribed_then_analysed() {
        let ocr = ScriptedTextSource::new(Script::Return(Some(LONG_CLAIM.to_string())));
        let article = ScriptedTextSource::new(Script::Return(Some("article".to_string())));
        let orchestrator = confident_orchestrator()
            .with_article_source(article.clone())
            .with_text_source(Provenance::Image, ocr.clone());

        let response = orchestrator
            .analyze_source(Provenance::Image, png(b"png"))
            .await
            .unwrap();

        assert_eq!(response.extracted_text(), LONG_CLAIM);
        assert_eq!(response.analysis().verdict(), FinalLabel::Fake);
        assert_eq!(ocr.seen(), vec!["upload image/png 3"]);
        assert!(article.seen().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn url_goes_to_the_article_source_trimmed() {
        let article = ScriptedTextSource::new(Script::Return(Some(LONG_CLAIM.to_string())));
        let orchestrator = confident_orchestrator().with_article_source(article.clone());

        orchestrator
            .analyze_url("  https://news.example.org/laptops \n")
            .await
            .unwrap();
        assert_eq!(article.seen(), vec!["url https://news.example.org/laptops"]);
    }

    #[tokio::test]
    async fn missing_source_is_reported_per_input_kind() {
        let ocr = ScriptedTextSource::new(Script::Return(Some(LONG_CLAIM.to_string())));
        let orchestrator =
            confident_orchestrator().with_text_source(Provenance::Image, ocr.clone());

        assert!(matches!(
            orchestrator
                .analyze_source(Provenance::Voice, png(b"audio"))
                .await,
            Err(VerisiftError::NoTextSource(Provenance::Voice))
        ));
        assert!(matches!(
            orchestrator.analyze_url("https://news.example.org/a").await,
            Err(VerisiftError::NoTextSource(Provenance::Url))
        ));
        assert!(ocr.seen().is_empty());
    }

    #[tokio::test]
    async fn empty_or_oversized_upload_never_reaches_the_source() {
        let ocr = ScriptedTextSource::new(Script::Return(Some(LONG_CLAIM.to_string())));
        let orchestrator =
            confident_orchestrator().with_text_source(Provenance::Image, ocr.clone());

        assert!(matches!(
            orchestrator.analyze_source(Provenance::Image, png(b"")).await,
            Err(VerisiftError::InvalidUpload(_))
        ));

        let huge = SourceInput::Upload(Upload::new(vec![0u8; MAX_UPLOAD_BYTES + 1]));
        let err = orchestrator
            .analyze_source(Provenance::Image, huge)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("byte limit"));
        assert!(ocr.seen().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_transcription_is_cut_at_its_timeout() {
        let speech = ScriptedTextSource::new(Script::Hang);
        let orchestrator = confident_orchestrator().with_text_source(Provenance::Voice, speech);

        let started = Instant::now();
        let result = orchestrator
            .analyze_source(Provenance::Voice, png(b"audio"))
            .await;

        assert!(matches!(result, Err(VerisiftError::NoExtractableText)));
        let elapsed = started.elapsed();
        assert!(elapsed >= timeouts().transcription);
        assert!(elapsed < timeouts().transcription + Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn unreadable_or_panicking_source_has_no_text() {
        for script in [Script::Return(None), Script::Panic, Script::Fail("ocr down".to_string())] {
            let orchestrator = confident_orchestrator()
                .with_text_source(Provenance::Image, ScriptedTextSource::new(script));
            assert!(matches!(
                orchestrator.analyze_source(Provenance::Image, png(b"png")).await,
                Err(VerisiftError::NoExtractableText)
            ));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn later_source_replaces_earlier_for_same_kind() {
        let first = ScriptedTextSource::new(Script::Return(Some("first".to_string())));
        let second = ScriptedTextSource::new(Script::Return(Some(LONG_CLAIM.to_string())));
        let orchestrator = confident_orchestrator()
            .with_text_source(Provenance::Voice, first.clone())
            .with_article_source(Arc::new(FixedTextSource(None)))
            .with_text_source(Provenance::Voice, second.clone());

        assert_eq!(
            orchestrator.text_source_kinds(),
            vec![Provenance::Url, Provenance::Voice]
        );

        let response = orchestrator
            .analyze_source(Provenance::Voice, png(b"audio"))
            .await
            .unwrap();
        assert_eq!(response.extracted_text(), LONG_CLAIM);
        assert!(first.seen().is_empty());
    }
}

// =============================================================================
// DOCUMENT VERIFIER
// =============================================================================

mod verifier {
    use super::*;

    const GUIDE: &str = "https://pib.gov.in/FactCheck/guide_english.pdf";
    const QUERY: &str = "Is the free laptop scheme real";

    fn catalog(entries: Vec<CatalogEntry>) -> DocumentCatalog {
        DocumentCatalog::new(entries, vec!["https://pib.gov.in/factcheck.aspx".to_string()])
    }

    fn guide_entry() -> CatalogEntry {
        CatalogEntry::new(
            "PIB Fact Check on Fake News Schemes",
            GUIDE,
            &["scheme", "free", "laptop"],
        )
    }

    #[tokio::test(start_paused = true)]
    async fn first_matching_page_is_cited() {
        let fetcher = Arc::new(MapFetcher::new().with_document(
            GUIDE,
            &[
                "Introduction to the fact-check guide.",
                "Messages about a free laptop scheme are fake. Do not share them.",
                "Another free laptop scheme rumour is listed here.",
            ],
        ));
        let verifier = verifier(catalog(vec![guide_entry()]), Arc::clone(&fetcher));

        let result = verifier.verify(QUERY).await.unwrap();
        let citation = result.citation().expect("found");

        assert_eq!(citation.page, 2);
        assert_eq!(citation.source, "PIB Fact Check on Fake News Schemes");
        assert_eq!(
            citation.excerpt,
            "Messages about a free laptop scheme are fake."
        );
        assert_eq!(result.verified(), Verified::Unknown);
        assert!(result.summary().contains("page 2"));
        assert!(result.suggested_sources().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn web_pages_are_never_fetched() {
        let fetcher = Arc::new(MapFetcher::new().with_document(
            GUIDE,
            &["The free laptop scheme is fake."],
        ));
        let web_page = CatalogEntry::new(
            "Scheme portal",
            "https://www.india.gov.in/my-government/schemes",
            &["scheme"],
        );
        let verifier = verifier(catalog(vec![web_page, guide_entry()]), Arc::clone(&fetcher));

        let result = verifier.verify(QUERY).await.unwrap();
        assert!(result.citation().is_some());
        assert_eq!(fetcher.fetched(), vec![GUIDE.to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_document_advances_to_next_candidate() {
        let backup = "https://example.gov/backup.pdf";
        let fetcher = Arc::new(
            MapFetcher::new().with_document(backup, &["This free laptop scheme is a scam."]),
        );
        let verifier = verifier(
            catalog(vec![
                guide_entry(),
                CatalogEntry::new("Backup", backup, &["laptop"]),
            ]),
            Arc::clone(&fetcher),
        );

        let result = verifier.verify(QUERY).await.unwrap();
        assert_eq!(result.citation().expect("found").source, "Backup");
        assert_eq!(fetcher.fetched().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_fetch_times_out_and_advances() {
        let backup = "https://example.gov/backup.pdf";
        let fetcher = Arc::new(
            MapFetcher::new()
                .with_hanging(GUIDE)
                .with_document(backup, &["This free laptop scheme is a scam."]),
        );
        let verifier = verifier(
            catalog(vec![
                guide_entry(),
                CatalogEntry::new("Backup", backup, &["laptop"]),
            ]),
            fetcher,
        );

        let result = verifier.verify(QUERY).await.unwrap();
        assert_eq!(result.citation().expect("found").source, "Backup");
    }

    #[tokio::test(start_paused = true)]
    async fn earlier_document_wins_over_better_later_match() {
        let later = "https://example.gov/later.pdf";
        let fetcher = Arc::new(
            MapFetcher::new()
                .with_document(GUIDE, &["A free laptop was mentioned."])
                .with_document(later, &["The free laptop scheme is real and free."]),
        );
        let verifier = verifier(
            catalog(vec![
                guide_entry(),
                CatalogEntry::new("Later", later, &["laptop"]),
            ]),
            fetcher,
        );

        let result = verifier.verify(QUERY).await.unwrap();
        assert_eq!(
            result.citation().expect("found").source,
            "PIB Fact Check on Fake News Schemes"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_search_suggests_sources() {
        let fetcher = Arc::new(MapFetcher::new().with_document(
            GUIDE,
            &["Only one keyword here: laptop."],
        ));
        let verifier = verifier(catalog(vec![guide_entry()]), fetcher);

        let result = verifier.verify(QUERY).await.unwrap();
        assert!(result.citation().is_none());
        assert_eq!(result.verified(), Verified::Unknown);
        assert_eq!(result.suggested_sources(), ["https://pib.gov.in/factcheck.aspx"]);
    }

    #[tokio::test]
    async fn no_candidate_documents_is_exhausted_without_fetching() {
        let fetcher = Arc::new(MapFetcher::new());
        let verifier = verifier(catalog(vec![guide_entry()]), Arc::clone(&fetcher));

        let result = verifier.verify("Is the monsoon early this year").await.unwrap();
        assert!(result.citation().is_none());
        assert!(fetcher.fetched().is_empty());
    }

    #[tokio::test]
    async fn short_query_fails_fast() {
        let fetcher = Arc::new(MapFetcher::new());
        let verifier = verifier(catalog(vec![guide_entry()]), Arc::clone(&fetcher));

        let result = verifier.verify("laptop").await;
        assert!(matches!(result, Err(VerisiftError::QueryTooShort { .. })));
        assert!(fetcher.fetched().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn verification_is_idempotent() {
        let fetcher = Arc::new(MapFetcher::new().with_document(
            GUIDE,
            &["The free laptop scheme is fake."],
        ));
        let verifier = verifier(catalog(vec![guide_entry()]), fetcher);

        let first = verifier.verify(QUERY).await.unwrap();
        let second = verifier.verify(QUERY).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(verifier.catalog().entries().len(), 1);
    }
}
