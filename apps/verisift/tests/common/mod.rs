//! Scripted adapters shared by the integration tests.

#![allow(dead_code, clippy::panic)]

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use verisift::Timeouts;
use verisift::adapters::{
    AdapterError, Classifier, DocumentFetcher, EvidenceProvider, FallbackAssessor, SourceInput,
    TextSource,
};
use verisift::engine::{DocumentVerifier, EvidenceGatherer, Orchestrator};
use verisift_core::{
    ClassifierLabel, ClassifierVerdict, Confidence, DocumentCatalog, EvidenceItem,
    EvidenceResult, FallbackLabel, FallbackVerdict,
};

pub const LONG_CLAIM: &str = "The central government has announced that every student in the \
    country will receive a free laptop under a new scheme launched this week, according to \
    messages circulating widely on social media platforms.";

pub const SHORT_CLAIM: &str = "Free laptops for every student announced";

pub fn timeouts() -> Timeouts {
    Timeouts {
        classifier: Duration::from_millis(1_000),
        fallback: Duration::from_millis(2_000),
        provider: Duration::from_millis(1_000),
        document: Duration::from_millis(1_000),
        request: Duration::from_millis(5_000),
        transcription: Duration::from_millis(3_000),
    }
}

// =============================================================================
// BEHAVIOUR
// =============================================================================

/// What a scripted adapter does when called.
#[derive(Clone)]
pub enum Script<T> {
    Return(T),
    Fail(String),
    After(Duration, T),
    Hang,
    Panic,
}

impl<T: Clone> Script<T> {
    async fn play(&self) -> Result<T, AdapterError> {
        match self {
            Self::Return(v) => Ok(v.clone()),
            Self::Fail(reason) => Err(AdapterError::Unavailable(reason.clone())),
            Self::After(delay, v) => {
                tokio::time::sleep(*delay).await;
                Ok(v.clone())
            }
            Self::Hang => std::future::pending().await,
            Self::Panic => panic!("scripted adapter panic"),
        }
    }
}

// =============================================================================
// CLASSIFIER / FALLBACK
// =============================================================================

pub fn classifier_verdict(label: ClassifierLabel, confidence: u8) -> ClassifierVerdict {
    ClassifierVerdict::new(
        label,
        Confidence::new(confidence),
        "This verdict is based on a machine learning analysis of the text's content and structure.",
        vec!["shocking".to_string()],
    )
}

pub fn fallback_verdict(label: FallbackLabel, confidence: u8) -> FallbackVerdict {
    FallbackVerdict::new(
        label,
        Confidence::new(confidence),
        "Checked against official announcements.",
        vec!["no official source".to_string()],
    )
}

pub struct ScriptedClassifier {
    script: Script<ClassifierVerdict>,
    pub calls: AtomicUsize,
}

impl ScriptedClassifier {
    pub fn new(script: Script<ClassifierVerdict>) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl Classifier for ScriptedClassifier {
    async fn classify(&self, _text: &str) -> Result<ClassifierVerdict, AdapterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script.play().await
    }
}

pub struct ScriptedAssessor {
    script: Script<FallbackVerdict>,
    pub calls: AtomicUsize,
}

impl ScriptedAssessor {
    pub fn new(script: Script<FallbackVerdict>) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl FallbackAssessor for ScriptedAssessor {
    async fn assess(&self, _text: &str) -> Result<FallbackVerdict, AdapterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script.play().await
    }
}

// =============================================================================
// EVIDENCE
// =============================================================================

pub struct ScriptedProvider {
    name: String,
    script: Script<Vec<EvidenceItem>>,
}

impl ScriptedProvider {
    pub fn new(name: &str, script: Script<Vec<EvidenceItem>>) -> Arc<dyn EvidenceProvider> {
        Arc::new(Self {
            name: name.to_string(),
            script,
        })
    }
}

pub fn posts(source: &str, count: usize) -> Vec<EvidenceItem> {
    (0..count)
        .map(|i| EvidenceItem {
            source: source.to_string(),
            text: format!("{source} post {i} about the laptop scheme"),
            engagement_score: i as i64,
            user: format!("user_{i}"),
            url: None,
        })
        .collect()
}

#[async_trait]
impl EvidenceProvider for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(&self, _query: &str) -> EvidenceResult {
        match self.script.play().await {
            Ok(items) => EvidenceResult::success(&self.name, items),
            Err(e) => EvidenceResult::error(&self.name, e.to_string()),
        }
    }
}

// =============================================================================
// DOCUMENTS / TEXT
// =============================================================================

/// Serves page maps by locator; unknown locators yield an empty map.
#[derive(Default)]
pub struct MapFetcher {
    documents: BTreeMap<String, BTreeMap<u32, String>>,
    hanging: Vec<String>,
    pub fetched: Mutex<Vec<String>>,
}

impl MapFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, locator: &str, pages: &[&str]) -> Self {
        let pages = (1u32..)
            .zip(pages.iter().map(|p| (*p).to_string()))
            .collect();
        self.documents.insert(locator.to_string(), pages);
        self
    }

    pub fn with_hanging(mut self, locator: &str) -> Self {
        self.hanging.push(locator.to_string());
        self
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched
            .lock()
            .map(|f| f.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl DocumentFetcher for MapFetcher {
    async fn fetch(&self, locator: &str) -> BTreeMap<u32, String> {
        if let Ok(mut fetched) = self.fetched.lock() {
            fetched.push(locator.to_string());
        }
        if self.hanging.iter().any(|h| h == locator) {
            std::future::pending::<()>().await;
        }
        self.documents.get(locator).cloned().unwrap_or_default()
    }
}

pub struct FixedTextSource(pub Option<String>);

#[async_trait]
impl TextSource for FixedTextSource {
    async fn extract(&self, _input: &SourceInput) -> Option<String> {
        self.0.clone()
    }
}

/// Plays a script and records a short description of every input it saw:
/// `url <locator>` or `upload <content type> <byte count>`.
pub struct ScriptedTextSource {
    script: Script<Option<String>>,
    pub seen: Mutex<Vec<String>>,
}

impl ScriptedTextSource {
    pub fn new(script: Script<Option<String>>) -> Arc<Self> {
        Arc::new(Self {
            script,
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl TextSource for ScriptedTextSource {
    async fn extract(&self, input: &SourceInput) -> Option<String> {
        let described = match input {
            SourceInput::Url(url) => format!("url {url}"),
            SourceInput::Upload(upload) => format!(
                "upload {} {}",
                upload.content_type.as_deref().unwrap_or("-"),
                upload.bytes.len()
            ),
        };
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(described);
        }
        self.script.play().await.ok().flatten()
    }
}

// =============================================================================
// BUILDERS
// =============================================================================

pub fn orchestrator(
    classifier: Arc<dyn Classifier>,
    assessor: Arc<dyn FallbackAssessor>,
    providers: Vec<Arc<dyn EvidenceProvider>>,
) -> Orchestrator {
    let t = timeouts();
    Orchestrator::new(
        classifier,
        assessor,
        EvidenceGatherer::new(providers, t.provider),
        t,
    )
}

pub fn quiet_providers() -> Vec<Arc<dyn EvidenceProvider>> {
    vec![
        ScriptedProvider::new("X (Twitter)", Script::Return(posts("X (Twitter)", 2))),
        ScriptedProvider::new("Reddit", Script::Return(posts("Reddit", 1))),
    ]
}

pub fn verifier(catalog: DocumentCatalog, fetcher: Arc<MapFetcher>) -> DocumentVerifier {
    DocumentVerifier::new(Arc::new(catalog), fetcher, timeouts().document)
}
