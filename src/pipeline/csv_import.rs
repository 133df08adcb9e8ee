// src/pipeline/csv_import.rs
//
// Comma-delimited import with a mandatory header row. "Company Name" is
// required; "Website URL" and "LinkedIn URL" are recognized by exact header
// match. Quoted fields are out of contract.

#[derive(Debug, Clone)]
pub struct CsvRow {
    /// 1-based line number in the input, for error reporting.
    pub line: usize,
    pub company_name: Option<String>,
    pub website_url: Option<String>,
    pub linkedin_url: Option<String>,
}

pub const COMPANY_NAME_HEADER: &str = "Company Name";
pub const WEBSITE_URL_HEADER: &str = "Website URL";
pub const LINKEDIN_URL_HEADER: &str = "LinkedIn URL";

/// Parses CSV content into rows. Blank lines are skipped; rows with an empty
/// company cell are kept (with `company_name: None`) so the batch can report
/// them as per-row errors. Returns `Err` only for a missing/invalid header.
pub fn parse_csv(data: &str) -> Result<Vec<CsvRow>, String> {
    let mut lines = data.lines().enumerate();

    let header = loop {
        match lines.next() {
            Some((index, line)) if !line.trim().is_empty() => break (index, line),
            Some(_) => continue,
            None => return Err("CSV is empty".to_string()),
        }
    };

    let columns: Vec<String> = header.1.split(',').map(|c| c.trim().to_string()).collect();
    let name_idx = columns
        .iter()
        .position(|c| c == COMPANY_NAME_HEADER)
        .ok_or_else(|| format!("CSV missing required column: {}", COMPANY_NAME_HEADER))?;
    let website_idx = columns.iter().position(|c| c == WEBSITE_URL_HEADER);
    let linkedin_idx = columns.iter().position(|c| c == LINKEDIN_URL_HEADER);

    let mut rows = Vec::new();
    for (index, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        let values: Vec<&str> = line.split(',').map(str::trim).collect();
        let cell = |idx: Option<usize>| -> Option<String> {
            idx.and_then(|i| values.get(i))
                .filter(|v| !v.is_empty())
                .map(|v| v.to_string())
        };

        rows.push(CsvRow {
            line: index + 1,
            company_name: cell(Some(name_idx)),
            website_url: cell(website_idx),
            linkedin_url: cell(linkedin_idx),
        });
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_recognized_columns() {
        let rows = parse_csv(
            "Company Name,Website URL,LinkedIn URL\n\
             Acme Inc,https://acme.com,https://linkedin.com/company/acme\n",
        )
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].company_name.as_deref(), Some("Acme Inc"));
        assert_eq!(rows[0].website_url.as_deref(), Some("https://acme.com"));
        assert_eq!(
            rows[0].linkedin_url.as_deref(),
            Some("https://linkedin.com/company/acme")
        );
        assert_eq!(rows[0].line, 2);
    }

    #[test]
    fn optional_columns_may_be_absent() {
        let rows = parse_csv("Company Name\nAcme Inc\n").unwrap();
        assert_eq!(rows[0].company_name.as_deref(), Some("Acme Inc"));
        assert!(rows[0].website_url.is_none());
        assert!(rows[0].linkedin_url.is_none());
    }

    #[test]
    fn missing_required_header_is_an_error() {
        let err = parse_csv("Name,Website\nAcme,https://acme.com\n").unwrap_err();
        assert!(err.contains("Company Name"));
    }

    #[test]
    fn blank_lines_are_skipped_but_empty_names_are_kept() {
        let rows = parse_csv(
            "Company Name,Website URL\n\
             \n\
             ,https://nameless.example\n\
             Acme Inc,\n",
        )
        .unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].company_name.is_none());
        assert_eq!(rows[1].company_name.as_deref(), Some("Acme Inc"));
        assert!(rows[1].website_url.is_none());
    }
}
