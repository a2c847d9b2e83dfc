//! The run is a single forward chain:
//! Auth → Search → Dedupe → FetchDetails → Extract → Write.
//!
//! Auth and write errors abort the run; search and detail errors are
//! absorbed at the item boundary and only show up in the summary.

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};

use crate::auth::{self, Authorizer};
use crate::config::ScrapeConfig;
use crate::detail::DetailClient;
use crate::extract;
use crate::models::{OutputRow, QueryStats};
use crate::search::SearchClient;
use crate::sheets::SheetsClient;
use crate::Result;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug)]
pub struct RunSummary {
    pub unique_ids: usize,
    pub duplicates: usize,
    pub rows_written: usize,
    pub failed: usize,
    pub sheet_url: Option<String>,
}

pub struct ScrapePipeline {
    config: ScrapeConfig,
}

impl ScrapePipeline {
    pub fn new(config: ScrapeConfig) -> Self {
        Self { config }
    }

    pub fn authorize(self) -> Result<AuthorizedPipeline> {
        println!("\n[1/4] Loading OAuth credentials...");
        let http = build_http_client(&self.config)?;
        let auth = auth::load_credentials(&http, &self.config)?;
        println!("  Credentials ready.");

        Ok(AuthorizedPipeline {
            config: self.config,
            http,
            auth,
        })
    }
}

pub struct AuthorizedPipeline {
    config: ScrapeConfig,
    http: Client,
    auth: Authorizer,
}

impl AuthorizedPipeline {
    #[must_use = "search results feed fetch_details()"]
    pub fn search(self) -> SearchedPipeline {
        println!("\n[2/4] Searching job listings...");
        let (ids, stats) = SearchClient::new(&self.http, &self.config).collect_ids();
        println!("\n  Total unique listing ids: {}", ids.len());

        SearchedPipeline {
            config: self.config,
            http: self.http,
            auth: self.auth,
            ids,
            stats,
        }
    }
}

pub struct SearchedPipeline {
    config: ScrapeConfig,
    http: Client,
    auth: Authorizer,
    ids: Vec<String>,
    stats: Vec<QueryStats>,
}

impl SearchedPipeline {
    #[must_use = "fetched rows feed write()"]
    pub fn fetch_details(self) -> PipelineWithRows {
        println!("\n[3/4] Fetching listing details...");
        let (details, failed) = DetailClient::new(&self.http, &self.config).fetch_all(&self.ids);

        let rows = details
            .into_iter()
            .map(|detail| {
                let derived =
                    extract::derive_fields(&detail.description, &self.config.skill_vocabulary);
                OutputRow { detail, derived }
            })
            .collect();

        PipelineWithRows {
            config: self.config,
            http: self.http,
            auth: self.auth,
            unique_ids: self.ids.len(),
            duplicates: self.stats.iter().map(|s| s.duplicates).sum(),
            rows,
            failed,
        }
    }
}

#[must_use = "pipeline must end with write() to produce the spreadsheet"]
pub struct PipelineWithRows {
    config: ScrapeConfig,
    http: Client,
    auth: Authorizer,
    unique_ids: usize,
    duplicates: usize,
    rows: Vec<OutputRow>,
    failed: usize,
}

impl PipelineWithRows {
    pub fn write(self) -> Result<RunSummary> {
        if self.rows.is_empty() {
            println!("\nNo listings fetched. The source may be rate-limiting; try again later.");
            return Ok(RunSummary {
                unique_ids: self.unique_ids,
                duplicates: self.duplicates,
                rows_written: 0,
                failed: self.failed,
                sheet_url: None,
            });
        }

        println!("\n[4/4] Writing {} rows to the spreadsheet...", self.rows.len());
        let sheets = SheetsClient::new(&self.http, &self.auth);
        let url = match sheets.write_rows(&self.rows, self.config.preview_len) {
            Ok(url) => url,
            Err(e) => {
                // Nothing is lost silently: say exactly what was dropped.
                eprintln!(
                    "❌ Write failed; {} scraped rows were not written.",
                    self.rows.len()
                );
                return Err(e.into());
            }
        };
        println!("✅ Spreadsheet created: {}", url);

        Ok(RunSummary {
            unique_ids: self.unique_ids,
            duplicates: self.duplicates,
            rows_written: self.rows.len(),
            failed: self.failed,
            sheet_url: Some(url),
        })
    }
}

fn build_http_client(config: &ScrapeConfig) -> reqwest::Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

    Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .timeout(config.request_timeout)
        .build()
}
