//! Handlers over the local paper list and the local paper batch

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;
use medicast_common::{
    archive::{self, SummaryArchive},
    errors::Result,
    fulltext,
    models::{PaperFullText, Summary},
    papers as paper_source,
    transcript::{self, TranscriptEntry, LOCAL_PAPER_SUMMARY_INSTRUCTION},
    Outcome,
};

#[derive(Serialize)]
pub struct LocalPaperText {
    pub paper_title: String,
    pub paper_doi: String,
    pub full_text: PaperFullText,
}

#[derive(Serialize)]
pub struct LocalBatchResponse {
    pub files_processed: Vec<String>,
    pub podcast_transcript: Outcome<Summary>,
}

/// Full text of the first paper in the pre-fetched listing
pub async fn local_paper_text(State(state): State<AppState>) -> Json<Outcome<LocalPaperText>> {
    Json(load_local_paper_text(&state).await.into())
}

async fn load_local_paper_text(state: &AppState) -> Result<LocalPaperText> {
    let listing = paper_source::load_paper_list(&state.config.sources.paper_list_path).await?;
    let paper = listing.get(0)?;

    let full_text = fulltext::fetch_full_text(state.extractor.as_ref(), paper).await?;

    Ok(LocalPaperText {
        paper_title: paper.display_title().to_string(),
        paper_doi: full_text.doi.clone(),
        full_text,
    })
}

/// Summarize the local batch, assemble a transcript and persist the summaries
pub async fn summarize_local_papers(State(state): State<AppState>) -> Json<Outcome<LocalBatchResponse>> {
    Json(run_local_batch(&state).await.into())
}

async fn run_local_batch(state: &AppState) -> Result<LocalBatchResponse> {
    let sources = &state.config.sources;
    let mut papers = Vec::with_capacity(sources.local_paper_files.len());
    let mut summaries = Vec::with_capacity(sources.local_paper_files.len());

    for file_name in &sources.local_paper_files {
        let paper = archive::read_local_paper(&sources.papers_dir, file_name).await?;
        let summary = state
            .summarizer
            .summarize(&paper.content, LOCAL_PAPER_SUMMARY_INSTRUCTION)
            .await;

        papers.push(paper);
        summaries.push(summary);
    }

    let entries: Vec<TranscriptEntry<'_>> = papers
        .iter()
        .zip(&summaries)
        .enumerate()
        .map(|(i, (paper, summary))| TranscriptEntry {
            title: paper.title(i),
            authors: paper.authors(),
            summary: Some(summary),
        })
        .collect();

    let podcast_transcript = transcript::assemble(&state.summarizer, &entries).await;

    let summary_archive = SummaryArchive::new(&sources.summaries_dir);
    for (paper, summary) in papers.iter().zip(&summaries) {
        summary_archive.store(&paper.paper_file, summary).await?;
    }

    tracing::info!(
        files = papers.len(),
        dir = %sources.summaries_dir.display(),
        "Local batch summarized"
    );

    Ok(LocalBatchResponse {
        files_processed: sources.local_paper_files.clone(),
        podcast_transcript,
    })
}
