//! # CLI Command Implementations

use super::AnalyzeInput;
use crate::adapters::{SourceInput, Upload};
use crate::api;
use crate::config::Settings;
use crate::engine::Engine;
use std::path::{Path, PathBuf};
use verisift_core::{
    EvidenceResult, FinalAnalysisResponse, Provenance, VerificationResult, VerisiftError,
    primitives::{MAX_TEXT_LENGTH, MAX_UPLOAD_BYTES},
};

/// Render `value` as pretty JSON on stdout.
fn print_json<T: serde::Serialize>(value: &T) -> Result<(), VerisiftError> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|e| VerisiftError::SerializationError(e.to_string()))?;
    println!("{}", rendered);
    Ok(())
}

/// Canonicalise `path`, check it is a regular file and return its size.
fn regular_file(path: &Path) -> Result<(PathBuf, u64), VerisiftError> {
    let canonical = path.canonicalize().map_err(|e| {
        VerisiftError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    let metadata = std::fs::metadata(&canonical)
        .map_err(|e| VerisiftError::IoError(format!("Cannot read file metadata: {}", e)))?;
    if !metadata.is_file() {
        return Err(VerisiftError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }
    Ok((canonical, metadata.len()))
}

/// A regular file no larger than the analysable text limit.
fn validate_input_file(path: &Path) -> Result<PathBuf, VerisiftError> {
    let (canonical, len) = regular_file(path)?;
    if len > MAX_TEXT_LENGTH as u64 {
        return Err(VerisiftError::TextTooLong {
            len: len as usize,
            max: MAX_TEXT_LENGTH,
        });
    }
    Ok(canonical)
}

/// Read an image or audio file as an upload, typed by its extension.
async fn read_upload_file(path: &Path) -> Result<Upload, VerisiftError> {
    let (canonical, len) = regular_file(path)?;
    if len > MAX_UPLOAD_BYTES as u64 {
        return Err(VerisiftError::InvalidUpload(format!(
            "file of {len} bytes exceeds {MAX_UPLOAD_BYTES} byte limit"
        )));
    }
    let bytes = tokio::fs::read(&canonical)
        .await
        .map_err(|e| VerisiftError::IoError(format!("Read file: {}", e)))?;

    let mut upload = Upload::new(bytes).with_content_type(content_type_for(&canonical));
    if let Some(name) = canonical.file_name().and_then(|n| n.to_str()) {
        upload = upload.with_file_name(name);
    }
    Ok(upload)
}

fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "wav" => "audio/wav",
        "mp3" => "audio/mpeg",
        "ogg" | "oga" => "audio/ogg",
        "m4a" => "audio/mp4",
        "flac" => "audio/flac",
        "webm" => "audio/webm",
        _ => "application/octet-stream",
    }
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

pub async fn cmd_server(settings: &Settings, host: &str, port: u16) -> Result<(), VerisiftError> {
    let engine = Engine::from_settings(settings)?;
    let mut providers = engine.orchestrator().gatherer().provider_names().join(", ");
    if providers.is_empty() {
        providers.push_str("none");
    }

    println!("Verisift Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:      {}", host);
    println!("  Port:      {}", port);
    println!("  Providers: {}", providers);
    println!("  Documents: {}", engine.verifier().catalog().entries().len());
    println!("  Inputs:    {}", input_kinds(&engine));
    println!();
    println!("Endpoints:");
    println!("  POST /api/v1/analysis         - Analyse text");
    println!("  POST /api/v1/analyze-url      - Analyse an article URL");
    println!("  POST /api/v1/verify-claim-pdf - Cite official documents");
    println!("  GET  /api/v1/catalog          - List official documents");
    println!("  GET  /health                  - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let addr = format!("{}:{}", host, port);
    api::run_server(&addr, engine).await
}

/// `raw` plus every input kind with a text producer.
fn input_kinds(engine: &Engine) -> String {
    std::iter::once(Provenance::Raw)
        .chain(engine.orchestrator().text_source_kinds())
        .map(|kind| kind.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

// =============================================================================
// ANALYZE COMMAND
// =============================================================================

pub async fn cmd_analyze(
    settings: &Settings,
    json_mode: bool,
    input: AnalyzeInput,
) -> Result<(), VerisiftError> {
    let engine = Engine::from_settings(settings)?;
    let orchestrator = engine.orchestrator();

    let response = if let Some(text) = input.text {
        orchestrator.analyze_text(&text).await?
    } else if let Some(file) = input.file {
        let path = validate_input_file(&file)?;
        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| VerisiftError::IoError(format!("Read file: {}", e)))?;
        orchestrator.analyze_text(&text).await?
    } else if let Some(url) = input.url {
        orchestrator.analyze_url(&url).await?
    } else if let Some(image) = input.image {
        let upload = read_upload_file(&image).await?;
        orchestrator
            .analyze_source(Provenance::Image, SourceInput::Upload(upload))
            .await?
    } else if let Some(voice) = input.voice {
        let upload = read_upload_file(&voice).await?;
        orchestrator
            .analyze_source(Provenance::Voice, SourceInput::Upload(upload))
            .await?
    } else {
        return Err(VerisiftError::EmptyText);
    };

    if json_mode {
        return print_json(&response);
    }
    print_analysis(&response);
    Ok(())
}

fn print_analysis(response: &FinalAnalysisResponse) {
    let analysis = response.analysis();

    println!("Verisift Analysis");
    println!("=================");
    println!("Verdict:     {:?}", analysis.verdict());
    println!("Confidence:  {}", analysis.confidence());
    println!("Decided by:  {:?}", analysis.source());
    println!();
    println!("{}", analysis.explanation());

    if !analysis.highlighted().is_empty() {
        println!();
        println!("Suspicious terms: {}", analysis.highlighted().join(", "));
    }
    if !analysis.key_indicators().is_empty() {
        println!();
        println!("Key indicators:");
        for indicator in analysis.key_indicators() {
            println!("  - {}", indicator);
        }
    }

    println!();
    println!("Related sources:");
    for source in response.related_sources() {
        print_evidence(source);
    }
}

fn print_evidence(result: &EvidenceResult) {
    if !result.is_success() {
        println!(
            "  {} - error: {}",
            result.source_name,
            result.error_message.as_deref().unwrap_or("unknown")
        );
        return;
    }

    println!("  {} - {} item(s)", result.source_name, result.items.len());
    for item in &result.items {
        let first_line = item.text.lines().next().unwrap_or_default();
        println!("    [{}] {}", item.engagement_score, first_line);
    }
}

// =============================================================================
// VERIFY COMMAND
// =============================================================================

pub async fn cmd_verify(
    settings: &Settings,
    json_mode: bool,
    query: &str,
) -> Result<(), VerisiftError> {
    let engine = Engine::from_settings(settings)?;
    let result = engine.verifier().verify(query).await?;

    if json_mode {
        return print_json(&result);
    }
    print_verification(&result);
    Ok(())
}

fn print_verification(result: &VerificationResult) {
    print!("{}", render_verification(result));
}

fn render_verification(result: &VerificationResult) -> String {
    let mut out = String::new();
    out.push_str("Verisift Verification\n");
    out.push_str("=====================\n");
    out.push_str(&format!("Query:    {}\n", result.query()));
    out.push_str(&format!("Verified: {}\n", result.verified()));
    out.push_str(&format!("\n{}\n", result.summary()));

    if let Some(citation) = result.citation() {
        out.push_str(&format!("\nSource:  {}\n", citation.source));
        out.push_str(&format!("Page:    {}\n", citation.page));
        out.push_str(&format!("Excerpt: {}\n", citation.excerpt));
    }

    if !result.suggested_sources().is_empty() {
        out.push_str("\nSuggested sources:\n");
        for source in result.suggested_sources() {
            out.push_str(&format!("  - {}\n", source));
        }
    }
    out
}

// =============================================================================
// CATALOG COMMAND
// =============================================================================

pub fn cmd_catalog(settings: &Settings, json_mode: bool) -> Result<(), VerisiftError> {
    let catalog = settings.document_catalog();

    if json_mode {
        return print_json(&api::CatalogResponse::from(&catalog));
    }

    println!("Verisift Document Catalog");
    println!("=========================");
    for entry in catalog.entries() {
        let kind = if entry.is_parseable_document() {
            "document"
        } else {
            "web page"
        };
        println!();
        println!("{} ({})", entry.title, kind);
        println!("  {}", entry.locator);
        println!("  tags: {}", entry.keywords.join(", "));
    }

    println!();
    println!("Suggested sources:");
    for source in catalog.suggested_sources() {
        println!("  - {}", source);
    }
    Ok(())
}
