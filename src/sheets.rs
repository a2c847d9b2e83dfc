//! Sheet writer: creates one spreadsheet and writes every row in a single
//! bulk call. Create/write rejection is fatal; formatting failure is not.

use chrono::Local;
use reqwest::blocking::{Client, Response};
use serde_json::{json, Value};

use crate::auth::Authorizer;
use crate::error::WriteError;
use crate::models::OutputRow;

const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const SHEET_TAB: &str = "Jobs";

/// Header row plus one row of cells per listing.
pub fn build_values(rows: &[OutputRow], preview_len: usize) -> Vec<Vec<String>> {
    let mut values = Vec::with_capacity(rows.len() + 1);
    values.push(OutputRow::HEADERS.iter().map(|h| h.to_string()).collect());
    values.extend(rows.iter().map(|row| row.to_cells(preview_len)));
    values
}

pub struct SheetsClient<'a> {
    http: &'a Client,
    auth: &'a Authorizer,
    base_url: String,
}

impl<'a> SheetsClient<'a> {
    pub fn new(http: &'a Client, auth: &'a Authorizer) -> Self {
        Self {
            http,
            auth,
            base_url: SHEETS_API.to_string(),
        }
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    /// Creates the spreadsheet, writes all rows at once, then applies
    /// best-effort formatting. Returns the spreadsheet URL.
    pub fn write_rows(&self, rows: &[OutputRow], preview_len: usize) -> Result<String, WriteError> {
        let title = format!("Job Listings — {}", Local::now().format("%Y-%m-%d"));
        let (spreadsheet_id, url) = self.create_spreadsheet(&title)?;

        self.update_values(&spreadsheet_id, build_values(rows, preview_len))?;

        // The data is already on the sheet at this point.
        if let Err(e) = self.format_sheet(&spreadsheet_id) {
            eprintln!("  Header formatting failed (data intact): {}", e);
        }

        Ok(url)
    }

    fn create_spreadsheet(&self, title: &str) -> Result<(String, String), WriteError> {
        let body = json!({
            "properties": { "title": title },
            "sheets": [{ "properties": { "title": SHEET_TAB, "sheetId": 0 } }],
        });

        let response = self
            .http
            .post(&self.base_url)
            .bearer_auth(self.auth.access_token())
            .json(&body)
            .send()?;
        let created: Value = Self::checked(response)?.json()?;

        let id = created["spreadsheetId"]
            .as_str()
            .ok_or(WriteError::MalformedResponse("spreadsheetId missing"))?;
        let url = format!("https://docs.google.com/spreadsheets/d/{id}");
        Ok((id.to_string(), url))
    }

    fn update_values(&self, spreadsheet_id: &str, values: Vec<Vec<String>>) -> Result<(), WriteError> {
        let url = format!("{}/{}/values/{}!A1", self.base_url, spreadsheet_id, SHEET_TAB);
        let response = self
            .http
            .put(&url)
            // USER_ENTERED so the =HYPERLINK() formulas evaluate.
            .query(&[("valueInputOption", "USER_ENTERED")])
            .bearer_auth(self.auth.access_token())
            .json(&json!({ "values": values }))
            .send()?;
        Self::checked(response)?;
        Ok(())
    }

    /// Bold white-on-blue header, frozen first row, auto-resized columns.
    fn format_sheet(&self, spreadsheet_id: &str) -> Result<(), WriteError> {
        let body = json!({
            "requests": [
                {
                    "repeatCell": {
                        "range": { "sheetId": 0, "startRowIndex": 0, "endRowIndex": 1 },
                        "cell": {
                            "userEnteredFormat": {
                                "textFormat": {
                                    "bold": true,
                                    "foregroundColor": { "red": 1, "green": 1, "blue": 1 }
                                },
                                "backgroundColor": { "red": 0.23, "green": 0.47, "blue": 0.85 }
                            }
                        },
                        "fields": "userEnteredFormat(textFormat,backgroundColor)"
                    }
                },
                {
                    "updateSheetProperties": {
                        "properties": {
                            "sheetId": 0,
                            "gridProperties": { "frozenRowCount": 1 }
                        },
                        "fields": "gridProperties.frozenRowCount"
                    }
                },
                {
                    "autoResizeDimensions": {
                        "dimensions": {
                            "sheetId": 0,
                            "dimension": "COLUMNS",
                            "startIndex": 0,
                            "endIndex": OutputRow::HEADERS.len()
                        }
                    }
                }
            ]
        });

        let url = format!("{}/{}:batchUpdate", self.base_url, spreadsheet_id);
        let response = self
            .http
            .post(&url)
            .bearer_auth(self.auth.access_token())
            .json(&body)
            .send()?;
        Self::checked(response)?;
        Ok(())
    }

    fn checked(response: Response) -> Result<Response, WriteError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(WriteError::Rejected {
                status,
                body: response.text().unwrap_or_default(),
            })
        }
    }
}
