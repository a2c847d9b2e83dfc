use chrono::{DateTime, Local};

#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub keyword: String,
    pub location: String,
}

impl SearchQuery {
    pub fn new(keyword: &str, location: &str) -> Self {
        Self {
            keyword: keyword.to_string(),
            location: location.to_string(),
        }
    }

    pub fn label(&self) -> String {
        format!("{} / {}", self.keyword, self.location)
    }
}

/// Per-query counts reported after the search stage.
#[derive(Debug, Clone)]
pub struct QueryStats {
    pub keyword: String,
    pub location: String,
    pub found: usize,
    pub new: usize,
    pub duplicates: usize,
}

impl QueryStats {
    pub fn for_query(query: &SearchQuery) -> Self {
        Self {
            keyword: query.keyword.clone(),
            location: query.location.clone(),
            found: 0,
            new: 0,
            duplicates: 0,
        }
    }
}

/// One successfully fetched posting. Immutable after creation; postings
/// whose detail fetch fails never become a `ListingDetail`.
#[derive(Debug, Clone)]
pub struct ListingDetail {
    pub id: String,
    pub company: String,
    pub title: String,
    pub location: String,
    pub salary: Option<String>,
    /// Canonical listing URL, used for the Apply Link column.
    pub apply_url: String,
    /// Description text with markup stripped and whitespace collapsed.
    pub description: String,
    pub scraped_at: DateTime<Local>,
}

/// Fields derived from the description text alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivedFields {
    pub experience: Option<String>,
    /// At most ten skills, in vocabulary order, no duplicates.
    pub skills: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct OutputRow {
    pub detail: ListingDetail,
    pub derived: DerivedFields,
}

impl OutputRow {
    pub const HEADERS: [&'static str; 9] = [
        "Company",
        "Job Title",
        "Location",
        "Salary",
        "Experience Required",
        "Key Skills",
        "Apply Link",
        "Job Description (preview)",
        "Date Scraped",
    ];

    pub fn to_cells(&self, preview_len: usize) -> Vec<String> {
        let apply_formula = if self.detail.apply_url.is_empty() {
            String::new()
        } else {
            format!(r#"=HYPERLINK("{}","View & Apply")"#, self.detail.apply_url)
        };

        vec![
            self.detail.company.clone(),
            self.detail.title.clone(),
            self.detail.location.clone(),
            self.detail.salary.clone().unwrap_or_default(),
            self.derived.experience.clone().unwrap_or_default(),
            self.derived.skills.join(", "),
            apply_formula,
            self.detail.description.chars().take(preview_len).collect(),
            self.detail.scraped_at.format("%Y-%m-%d %H:%M").to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_detail() -> ListingDetail {
        ListingDetail {
            id: "12345".to_string(),
            company: "Acme Corp".to_string(),
            title: "Backend Engineer".to_string(),
            location: "Bangalore, Karnataka".to_string(),
            salary: None,
            apply_url: "https://example.com/jobs/view/12345".to_string(),
            description: "Build services".to_string(),
            scraped_at: Local::now(),
        }
    }

    #[test]
    fn cells_follow_column_order() {
        let row = OutputRow {
            detail: sample_detail(),
            derived: DerivedFields {
                experience: Some("1-2 years".to_string()),
                skills: vec!["Python".to_string(), "SQL".to_string()],
            },
        };

        let cells = row.to_cells(500);
        assert_eq!(cells.len(), OutputRow::HEADERS.len());
        assert_eq!(cells[0], "Acme Corp");
        assert_eq!(cells[1], "Backend Engineer");
        assert_eq!(cells[3], ""); // no salary
        assert_eq!(cells[4], "1-2 years");
        assert_eq!(cells[5], "Python, SQL");
        assert_eq!(
            cells[6],
            r#"=HYPERLINK("https://example.com/jobs/view/12345","View & Apply")"#
        );
    }

    #[test]
    fn preview_truncates_on_char_boundaries() {
        let mut detail = sample_detail();
        detail.description = "é".repeat(600);
        let row = OutputRow {
            detail,
            derived: DerivedFields::default(),
        };

        let cells = row.to_cells(500);
        assert_eq!(cells[7].chars().count(), 500);
    }

    #[test]
    fn empty_apply_url_yields_empty_formula() {
        let mut detail = sample_detail();
        detail.apply_url = String::new();
        let row = OutputRow {
            detail,
            derived: DerivedFields::default(),
        };
        assert_eq!(row.to_cells(500)[6], "");
    }
}
