//! Listing search: pages through the guest search endpoint and collects
//! unique listing ids across all queries.

use std::collections::HashSet;

use reqwest::blocking::Client;
use scraper::{Html, Selector};

use crate::config::{experience_filter, ScrapeConfig};
use crate::error::SearchPageError;
use crate::models::{QueryStats, SearchQuery};

/// Running identifier set shared across every query and page.
/// Membership is set-like; `into_order` returns first-seen order.
#[derive(Debug, Default)]
pub struct SeenIds {
    seen: HashSet<String>,
    order: Vec<String>,
}

impl SeenIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the id was new.
    pub fn insert(&mut self, id: String) -> bool {
        if self.seen.insert(id.clone()) {
            self.order.push(id);
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn into_order(self) -> Vec<String> {
        self.order
    }
}

/// Folds one page of ids into the running set and the query's stats.
/// Returns how many of them were new.
fn record_page(ids: Vec<String>, seen: &mut SeenIds, stats: &mut QueryStats) -> usize {
    stats.found += ids.len();
    let mut new_on_page = 0;
    for id in ids {
        if seen.insert(id) {
            new_on_page += 1;
        } else {
            stats.duplicates += 1;
        }
    }
    stats.new += new_on_page;
    new_on_page
}

/// Extracts listing ids from a search page. Cards carry
/// `data-entity-urn="urn:li:jobPosting:<id>"`; older markup used a plain
/// `data-job-id` attribute, kept as a fallback. Markup matching neither
/// yields no ids.
pub fn parse_listing_ids(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    let urn_selector = Selector::parse("[data-entity-urn]").unwrap();
    let ids: Vec<String> = document
        .select(&urn_selector)
        .filter_map(|card| {
            let urn = card.value().attr("data-entity-urn")?;
            let (_, id) = urn.rsplit_once("jobPosting:")?;
            let id = id.trim();
            (!id.is_empty()).then(|| id.to_string())
        })
        .collect();

    if !ids.is_empty() {
        return ids;
    }

    let legacy_selector = Selector::parse("[data-job-id]").unwrap();
    document
        .select(&legacy_selector)
        .filter_map(|card| {
            let id = card.value().attr("data-job-id")?.trim();
            (!id.is_empty()).then(|| id.to_string())
        })
        .collect()
}

pub struct SearchClient<'a> {
    http: &'a Client,
    config: &'a ScrapeConfig,
}

impl<'a> SearchClient<'a> {
    pub fn new(http: &'a Client, config: &'a ScrapeConfig) -> Self {
        Self { http, config }
    }

    /// Runs every configured query and returns the unique ids in
    /// first-seen order, plus per-query counts.
    pub fn collect_ids(&self) -> (Vec<String>, Vec<QueryStats>) {
        let mut seen = SeenIds::new();
        let mut all_stats = Vec::with_capacity(self.config.queries.len());

        for query in &self.config.queries {
            println!("  Searching: {}", query.label());
            let stats = self.run_query(query, &mut seen);
            println!(
                "    Found {} listing ids ({} new, {} duplicates)",
                stats.found, stats.new, stats.duplicates
            );
            all_stats.push(stats);
        }

        (seen.into_order(), all_stats)
    }

    fn run_query(&self, query: &SearchQuery, seen: &mut SeenIds) -> QueryStats {
        let mut stats = QueryStats::for_query(query);

        for page in 0..self.config.pages_per_query {
            let ids = match self.fetch_page(query, page) {
                Ok(html) => parse_listing_ids(&html),
                Err(e) => {
                    // No retry: a failed page counts as zero results.
                    eprintln!("    Page {}: {} — treated as empty", page + 1, e);
                    Vec::new()
                }
            };

            // A page with nothing new means we've walked off the end of
            // useful results for this query.
            if record_page(ids, seen, &mut stats) == 0 {
                break;
            }

            if page + 1 < self.config.pages_per_query {
                std::thread::sleep(self.config.search_page_delay);
            }
        }

        stats
    }

    fn fetch_page(&self, query: &SearchQuery, page: usize) -> Result<String, SearchPageError> {
        let filter = experience_filter(&self.config.experience_levels);
        let start = (page * self.config.page_size).to_string();
        let response = self
            .http
            .get(&self.config.search_url)
            .query(&[
                ("keywords", query.keyword.as_str()),
                ("location", query.location.as_str()),
                ("f_E", filter.as_str()),
                ("start", start.as_str()),
            ])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchPageError::Status(status));
        }
        Ok(response.text()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ids_from_entity_urns() {
        let html = r#"
            <ul>
              <li><div data-entity-urn="urn:li:jobPosting:111">a</div></li>
              <li><div data-entity-urn="urn:li:jobPosting:222">b</div></li>
            </ul>
        "#;
        assert_eq!(parse_listing_ids(html), vec!["111", "222"]);
    }

    #[test]
    fn falls_back_to_legacy_job_id_attribute() {
        let html = r#"<div data-job-id="333"></div><div data-job-id="444"></div>"#;
        assert_eq!(parse_listing_ids(html), vec!["333", "444"]);
    }

    #[test]
    fn unexpected_markup_yields_no_ids() {
        assert!(parse_listing_ids("<html><body><p>rate limited</p></body></html>").is_empty());
        assert!(parse_listing_ids("").is_empty());
    }

    #[test]
    fn malformed_urns_are_skipped() {
        let html = r#"
            <div data-entity-urn="urn:li:company:999"></div>
            <div data-entity-urn="urn:li:jobPosting:555"></div>
            <div data-entity-urn="urn:li:jobPosting:"></div>
        "#;
        assert_eq!(parse_listing_ids(html), vec!["555"]);
    }

    #[test]
    fn overlapping_pages_dedupe_in_first_seen_order() {
        // Two queries, one page each: {A, B, C} then {B, C, D}.
        let mut seen = SeenIds::new();

        let q1 = SearchQuery::new("software developer", "Bangalore, Karnataka");
        let mut s1 = QueryStats::for_query(&q1);
        let new1 = record_page(
            vec!["A".into(), "B".into(), "C".into()],
            &mut seen,
            &mut s1,
        );
        assert_eq!(new1, 3);
        assert_eq!((s1.found, s1.new, s1.duplicates), (3, 3, 0));

        let q2 = SearchQuery::new("software developer", "Hyderabad, Telangana");
        let mut s2 = QueryStats::for_query(&q2);
        let new2 = record_page(
            vec!["B".into(), "C".into(), "D".into()],
            &mut seen,
            &mut s2,
        );
        assert_eq!(new2, 1);
        assert_eq!((s2.found, s2.new, s2.duplicates), (3, 1, 2));

        assert_eq!(seen.into_order(), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn reinserting_an_id_is_counted_once() {
        let mut seen = SeenIds::new();
        assert!(seen.insert("X".into()));
        assert!(!seen.insert("X".into()));
        assert_eq!(seen.len(), 1);
        assert_eq!(seen.into_order(), vec!["X"]);
    }

    #[test]
    fn empty_page_reports_zero_new() {
        let mut seen = SeenIds::new();
        let query = SearchQuery::new("x", "y");
        let mut stats = QueryStats::for_query(&query);
        assert_eq!(record_page(Vec::new(), &mut seen, &mut stats), 0);
        assert_eq!((stats.found, stats.new, stats.duplicates), (0, 0, 0));
    }
}
