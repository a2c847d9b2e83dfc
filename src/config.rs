use std::path::PathBuf;
use std::time::Duration;

use crate::extract;
use crate::models::SearchQuery;

pub const SEARCH_URL: &str =
    "https://www.linkedin.com/jobs-guest/jobs/api/seeMoreJobPostings/search";
pub const DETAIL_URL: &str = "https://www.linkedin.com/jobs-guest/jobs/api/jobPosting";

/// The guest search endpoint's `f_E` filter codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperienceLevel {
    Internship,
    Entry,
    Associate,
    MidSenior,
}

impl ExperienceLevel {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Internship => "1",
            Self::Entry => "2",
            Self::Associate => "3",
            Self::MidSenior => "4",
        }
    }
}

/// Joins level codes into the comma-separated form the endpoint expects.
pub fn experience_filter(levels: &[ExperienceLevel]) -> String {
    levels
        .iter()
        .map(|level| level.code())
        .collect::<Vec<_>>()
        .join(",")
}

#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub queries: Vec<SearchQuery>,
    /// Search result pages fetched per query.
    pub pages_per_query: usize,
    /// Listings per search page; sets the pagination offset step.
    pub page_size: usize,
    pub experience_levels: Vec<ExperienceLevel>,
    /// Description characters kept in the spreadsheet preview column.
    pub preview_len: usize,
    /// Print a progress line every this many detail fetches.
    pub progress_interval: usize,
    pub search_page_delay: Duration,
    pub detail_delay: Duration,
    pub request_timeout: Duration,
    /// OAuth app keys (client id/secret).
    pub keys_file: PathBuf,
    /// Stored access/refresh token pair; rewritten in place after a refresh.
    pub token_file: PathBuf,
    pub search_url: String,
    pub detail_url: String,
    pub skill_vocabulary: Vec<String>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        let queries = [
            ("software developer", "Bangalore, Karnataka"),
            ("software developer", "Hyderabad, Telangana"),
            ("AI automation engineer", "Bangalore, Karnataka"),
            ("AI automation engineer", "Hyderabad, Telangana"),
            ("machine learning engineer", "Bangalore, Karnataka"),
            ("machine learning engineer", "Hyderabad, Telangana"),
        ]
        .into_iter()
        .map(|(keyword, location)| SearchQuery::new(keyword, location))
        .collect();

        let config_dir = std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_default()
            .join(".config/gdrive-mcp");

        Self {
            queries,
            pages_per_query: 3,
            page_size: 25,
            experience_levels: vec![ExperienceLevel::Entry, ExperienceLevel::Associate],
            preview_len: 500,
            progress_interval: 10,
            search_page_delay: Duration::from_millis(800),
            detail_delay: Duration::from_millis(1500),
            request_timeout: Duration::from_secs(15),
            keys_file: config_dir.join("gcp-oauth.keys.json"),
            token_file: config_dir.join(".gdrive-server-credentials.json"),
            search_url: SEARCH_URL.to_string(),
            detail_url: DETAIL_URL.to_string(),
            skill_vocabulary: extract::DEFAULT_SKILL_VOCABULARY
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_joins_level_codes() {
        let levels = [ExperienceLevel::Entry, ExperienceLevel::Associate];
        assert_eq!(experience_filter(&levels), "2,3");
        assert_eq!(experience_filter(&[ExperienceLevel::MidSenior]), "4");
        assert_eq!(experience_filter(&[]), "");
    }
}
