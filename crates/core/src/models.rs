use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const MIN_TOP_N: usize = 1;
pub const MAX_TOP_N: usize = 20;
pub const DEFAULT_TOP_N: usize = 5;

pub fn clamp_top_n(value: usize) -> usize {
    value.clamp(MIN_TOP_N, MAX_TOP_N)
}

/// User input held by the console between submissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub description: String,
    pub include_analysis: bool,
    pub top_n: usize,
}

impl Query {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = clamp_top_n(top_n);
        self
    }

    pub fn with_analysis(mut self, include_analysis: bool) -> Self {
        self.include_analysis = include_analysis;
        self
    }

    pub fn is_blank(&self) -> bool {
        self.description.trim().is_empty()
    }
}

impl Default for Query {
    fn default() -> Self {
        Self {
            description: String::new(),
            include_analysis: true,
            top_n: DEFAULT_TOP_N,
        }
    }
}

/// Body of `POST /match`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchRequest {
    pub description: String,
    pub include_analysis: bool,
    pub num_candidates: usize,
}

impl From<&Query> for MatchRequest {
    fn from(query: &Query) -> Self {
        Self {
            description: query.description.clone(),
            include_analysis: query.include_analysis,
            num_candidates: query.top_n,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedCandidate {
    pub file_name: String,
    /// Absent or null when the service could not score the resume.
    #[serde(default)]
    pub similarity_score: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalysisEntry {
    pub file_name: String,
    pub analysis: String,
}

/// Per-candidate analysis, normalized once when the response is parsed.
///
/// The service currently answers with a list of entries; older deployments
/// answered with a `{name: summary}` object, kept here in key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WireAnalysis", into = "WireAnalysis")]
pub enum Analysis {
    Entries(Vec<AnalysisEntry>),
    Legacy(Vec<(String, String)>),
}

impl Analysis {
    pub fn is_empty(&self) -> bool {
        match self {
            Analysis::Entries(entries) => entries.is_empty(),
            Analysis::Legacy(pairs) => pairs.is_empty(),
        }
    }

    /// Keeps only the items whose file name satisfies `keep`.
    pub fn retain_names<F>(&self, keep: F) -> Analysis
    where
        F: Fn(&str) -> bool,
    {
        match self {
            Analysis::Entries(entries) => Analysis::Entries(
                entries
                    .iter()
                    .filter(|entry| keep(entry.file_name.as_str()))
                    .cloned()
                    .collect(),
            ),
            Analysis::Legacy(pairs) => Analysis::Legacy(
                pairs
                    .iter()
                    .filter(|(name, _)| keep(name.as_str()))
                    .cloned()
                    .collect(),
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum WireAnalysis {
    Entries(Vec<AnalysisEntry>),
    Legacy(Map<String, Value>),
}

impl From<WireAnalysis> for Analysis {
    fn from(value: WireAnalysis) -> Self {
        match value {
            WireAnalysis::Entries(entries) => Analysis::Entries(entries),
            WireAnalysis::Legacy(map) => Analysis::Legacy(
                map.into_iter()
                    .map(|(name, summary)| {
                        let summary = match summary {
                            Value::String(text) => text,
                            other => other.to_string(),
                        };
                        (name, summary)
                    })
                    .collect(),
            ),
        }
    }
}

impl From<Analysis> for WireAnalysis {
    fn from(value: Analysis) -> Self {
        match value {
            Analysis::Entries(entries) => WireAnalysis::Entries(entries),
            Analysis::Legacy(pairs) => WireAnalysis::Legacy(
                pairs
                    .into_iter()
                    .map(|(name, summary)| (name, Value::String(summary)))
                    .collect(),
            ),
        }
    }
}

/// Successful body of `POST /match`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchResponse {
    pub ranked_candidates: Vec<RankedCandidate>,
    #[serde(default)]
    pub analysis: Option<Analysis>,
}

/// Error body returned with a non-2xx status.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
}

/// Ranked candidates plus the window currently shown to the user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultSet {
    all_ranked: Vec<RankedCandidate>,
    visible_count: usize,
    analysis: Option<Analysis>,
    received_at: DateTime<Utc>,
}

impl ResultSet {
    pub fn new(response: MatchResponse, top_n: usize) -> Self {
        Self {
            all_ranked: response.ranked_candidates,
            visible_count: clamp_top_n(top_n),
            analysis: response.analysis,
            received_at: Utc::now(),
        }
    }

    pub fn all_ranked(&self) -> &[RankedCandidate] {
        &self.all_ranked
    }

    /// Always a prefix of [`ResultSet::all_ranked`].
    pub fn visible(&self) -> &[RankedCandidate] {
        let end = self.visible_count.min(self.all_ranked.len());
        &self.all_ranked[..end]
    }

    pub fn visible_count(&self) -> usize {
        self.visible_count
    }

    pub fn set_visible_count(&mut self, count: usize) {
        self.visible_count = clamp_top_n(count);
    }

    pub fn analysis(&self) -> Option<&Analysis> {
        self.analysis.as_ref()
    }

    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    pub fn is_visible(&self, file_name: &str) -> bool {
        self.visible()
            .iter()
            .any(|candidate| candidate.file_name == file_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    InFlight,
    Succeeded,
    Failed(String),
}
