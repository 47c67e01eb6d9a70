use crate::traits::RankingService;
use crate::{Analysis, MatchError, ResultSet};
use serde_json::json;
use std::path::Path;
use tracing::info;

pub const DEFAULT_EXPORT_FILE_NAME: &str = "resume_match_results.txt";

/// Renders analysis text. Both the on-screen summary and the export use this.
pub fn render_analysis(analysis: &Analysis) -> String {
    match analysis {
        Analysis::Entries(entries) => entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                format!("{}. {}:\n{}\n", index + 1, entry.file_name, entry.analysis)
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Analysis::Legacy(pairs) => pairs
            .iter()
            .map(|(name, summary)| format!("{name}:\n{summary}\n"))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Text blob offered for download.
///
/// Prefers analysis for the candidates currently shown, then the whole
/// analysis, then a JSON dump of the visible results.
pub fn export_text(result_set: &ResultSet) -> String {
    if let Some(analysis) = result_set.analysis() {
        let visible = analysis.retain_names(|name| result_set.is_visible(name));
        if !visible.is_empty() {
            return render_analysis(&visible);
        }
        if !analysis.is_empty() {
            return render_analysis(analysis);
        }
    }

    let dump = json!({
        "visible_ranked": result_set.visible(),
        "analysis": result_set.analysis(),
    });
    serde_json::to_string_pretty(&dump).unwrap_or_default()
}

/// Numbered listing of the visible candidates with score and resume link.
pub fn render_candidates<S>(result_set: &ResultSet, service: &S) -> String
where
    S: RankingService + ?Sized,
{
    let mut lines = Vec::new();
    for (index, candidate) in result_set.visible().iter().enumerate() {
        let score = candidate
            .similarity_score
            .map(|score| format!("{score:.3}"))
            .unwrap_or_else(|| "N/A".to_string());
        lines.push(format!("{}. {}", index + 1, candidate.file_name));
        lines.push(format!("   Similarity Score: {score}"));
        lines.push(format!("   {}", service.resume_url(&candidate.file_name)));
    }
    lines.join("\n")
}

pub async fn write_export(path: &Path, text: &str) -> Result<(), MatchError> {
    tokio::fs::write(path, text).await?;
    info!(path = %path.display(), bytes = text.len(), "results exported");
    Ok(())
}
