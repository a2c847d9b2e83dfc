//! Detail fetcher: one GET per unique listing id, parsed with fixed
//! selector chains. Failures skip the listing and never abort the run.

use chrono::Local;
use reqwest::blocking::Client;
use scraper::{Html, Selector};

use crate::config::ScrapeConfig;
use crate::error::DetailError;
use crate::models::ListingDetail;

const TITLE_SELECTORS: &[&str] = &[".top-card-layout__title", "h1.topcard__title", "h1"];
const COMPANY_SELECTORS: &[&str] = &[
    ".topcard__org-name-link",
    ".topcard__flavor--metadata a",
    ".topcard__flavor:not(.topcard__flavor--bullet)",
];
const LOCATION_SELECTORS: &[&str] = &[
    ".topcard__flavor--bullet",
    ".job-details-jobs-unified-top-card__primary-description-container span",
];
const SALARY_SELECTORS: &[&str] = &[".salary.compensation__salary", ".compensation__salary"];
const DESCRIPTION_SELECTORS: &[&str] = &[
    ".show-more-less-html__markup",
    ".description__text",
    "#job-details",
];

// The guest pages sometimes link through auth redirects instead of the
// canonical listing URL; those are useless as an apply link.
const SKIP_DOMAINS: &[&str] = &[
    "linkedin.com/login",
    "linkedin.com/uas",
    "linkedin.com/signup",
    "linkedin.com/authwall",
];

const APPLY_LINK_SELECTOR: &str = "a.base-card__full-link, \
     a[data-tracking-control-name='public_jobs_topcard-title'], \
     .top-card-layout__title a, \
     h2.top-card-layout__title a";

pub struct DetailClient<'a> {
    http: &'a Client,
    config: &'a ScrapeConfig,
}

impl<'a> DetailClient<'a> {
    pub fn new(http: &'a Client, config: &'a ScrapeConfig) -> Self {
        Self { http, config }
    }

    /// Fetches every id in order. Returns the successfully parsed details
    /// and the number of failed/skipped listings.
    pub fn fetch_all(&self, ids: &[String]) -> (Vec<ListingDetail>, usize) {
        let mut details = Vec::with_capacity(ids.len());
        let mut failed = 0;

        // An interval of 0 disables progress lines.
        let interval = self.config.progress_interval;

        for (i, id) in ids.iter().enumerate() {
            let n = i + 1;
            if interval > 0 && n % interval == 0 {
                println!("  Progress: {}/{} listings fetched...", n, ids.len());
            }

            match self.fetch_one(id) {
                Ok(detail) => details.push(detail),
                Err(e) => {
                    failed += 1;
                    eprintln!("    Skipped {}: {}", id, e);
                }
            }

            if n < ids.len() {
                std::thread::sleep(self.config.detail_delay);
            }
        }

        println!("  Fetched: {} listings  |  Failed/skipped: {}", details.len(), failed);
        (details, failed)
    }

    fn fetch_one(&self, id: &str) -> Result<ListingDetail, DetailError> {
        let url = format!("{}/{}", self.config.detail_url, id);
        let response = self.http.get(&url).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(DetailError::Status(status));
        }

        parse_detail(id, &response.text()?)
    }
}

/// Parses one detail page. Company and title are mandatory; everything
/// else degrades to empty.
pub fn parse_detail(id: &str, html: &str) -> Result<ListingDetail, DetailError> {
    let document = Html::parse_document(html);

    let title = select_text(&document, TITLE_SELECTORS)
        .ok_or(DetailError::MissingField("title"))?;
    let company = select_text(&document, COMPANY_SELECTORS)
        .ok_or(DetailError::MissingField("company"))?;
    let location = select_text(&document, LOCATION_SELECTORS).unwrap_or_default();
    let salary = select_text(&document, SALARY_SELECTORS);
    let description = select_text(&document, DESCRIPTION_SELECTORS).unwrap_or_default();
    let apply_url = extract_apply_url(&document, id);

    Ok(ListingDetail {
        id: id.to_string(),
        company,
        title,
        location,
        salary,
        apply_url,
        description,
        scraped_at: Local::now(),
    })
}

/// Tries each selector in order, returns the first non-empty text with
/// whitespace collapsed.
fn select_text(document: &Html, selectors: &[&str]) -> Option<String> {
    for raw in selectors {
        let selector = Selector::parse(raw).unwrap();
        if let Some(element) = document.select(&selector).next() {
            let text = collapse_whitespace(element.text());
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

fn collapse_whitespace<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Canonical listing URL from the topcard title link, query string
/// stripped. Falls back to a URL constructed from the id when the link is
/// missing or points at an auth redirect.
fn extract_apply_url(document: &Html, id: &str) -> String {
    let selector = Selector::parse(APPLY_LINK_SELECTOR).unwrap();

    if let Some(link) = document.select(&selector).next() {
        if let Some(href) = link.value().attr("href") {
            let href = href.split('?').next().unwrap_or(href);
            if !href.is_empty() && !SKIP_DOMAINS.iter().any(|skip| href.contains(skip)) {
                return href.to_string();
            }
        }
    }

    format!("https://www.linkedin.com/jobs/view/{id}")
}
