//! Podcast transcript assembly
//!
//! Per-paper summaries are folded, in order, into one prompt asking for a
//! single-host script. Entries whose summary failed keep their slot with a
//! fixed placeholder.

use crate::llm::Summarizer;
use crate::models::Summary;
use crate::outcome::Outcome;

/// Text used for an entry without a usable summary
pub const MISSING_SUMMARY: &str = "No summary available";

/// Host named in every script
pub const HOST_NAME: &str = "Dr. Varanasi";

const SHOW_FORMAT: &str = "The podcast should have:
1. A warm welcome and introduction
2. Discussion of each paper with smooth transitions between topics
3. A brief conclusion with takeaways

The podcast is aimed at medical professionals who want to stay updated on recent research.";

/// Instruction for a single paper's summary on the analysis endpoint
pub const PHYSICIAN_SUMMARY_INSTRUCTION: &str = "Summarize this medical research paper and \
it should be max 250 words and the intended audience is physicians and they will be \
listening to this summary on a podcast.";

/// Instruction for per-paper summaries feeding a remote transcript
pub const PAPER_SUMMARY_INSTRUCTION: &str = "Create a concise, engaging summary of this medical \
research paper. Target length is 200-250 words. Focus on key findings, clinical implications, \
and what makes this research noteworthy.";

/// Instruction for per-paper summaries of the local batch
pub const LOCAL_PAPER_SUMMARY_INSTRUCTION: &str = "Create a concise, engaging summary of this \
medical research paper. Target length is 150-200 words. Focus on key findings, clinical \
implications, and what makes this research noteworthy. Structure it for a podcast audience \
of medical professionals.";

/// One paper's slot in the transcript prompt
#[derive(Debug, Clone)]
pub struct TranscriptEntry<'a> {
    pub title: String,
    pub authors: Option<String>,
    pub summary: Option<&'a Outcome<Summary>>,
}

impl TranscriptEntry<'_> {
    fn summary_text(&self) -> &str {
        match self.summary {
            Some(Outcome::Success(summary)) => &summary.analysis,
            _ => MISSING_SUMMARY,
        }
    }
}

fn preamble() -> String {
    format!(
        "Create an engaging podcast transcript that discusses the following medical research papers.\n\
        {}\n\
        Include only one host named {} who has a conversational style.\n\n\
        Here are the papers to discuss:\n",
        SHOW_FORMAT, HOST_NAME
    )
}

/// Build the transcript prompt. Pure and order-preserving.
pub fn build_podcast_prompt(entries: &[TranscriptEntry<'_>]) -> String {
    let mut prompt = preamble();

    for (i, entry) in entries.iter().enumerate() {
        prompt.push_str(&format!("\nPAPER {}: {}\n", i + 1, entry.title));
        if let Some(authors) = &entry.authors {
            prompt.push_str(&format!("AUTHORS: {}\n", authors));
        }
        prompt.push_str(&format!("SUMMARY: {}\n\n", entry.summary_text()));
    }

    prompt
}

/// Prompt for an episode built from a specialty and target length alone
pub fn build_specialty_prompt(specialty: &str, duration_minutes: &str) -> String {
    format!(
        "Create an engaging {}-minute podcast transcript about recent developments in {}.\n\
        {}\n\
        Include only one host named {} who has a conversational style.\n",
        duration_minutes, specialty, SHOW_FORMAT, HOST_NAME
    )
}

/// Assemble the final transcript with one summarization call
pub async fn assemble(summarizer: &Summarizer, entries: &[TranscriptEntry<'_>]) -> Outcome<Summary> {
    let prompt = build_podcast_prompt(entries);
    let transcript = summarizer.summarize(&prompt, "").await;

    tracing::info!(
        papers = entries.len(),
        success = transcript.is_success(),
        "Podcast transcript assembled"
    );

    transcript
}
