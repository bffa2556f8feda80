//! Filing ingestion with a persisted pagination cursor.

use tracing::{debug, info, warn};

use crate::data::FilingFeed;
use crate::domain::{FilingVariant, NewFiling};
use crate::error::AppError;
use crate::store::{CursorStore, Store};

/// How far the cursor moves after a successful fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorAdvance {
    /// Always advance by the requested page size, even after a short page.
    ///
    /// A short or empty page therefore skips the rest of that offset region on
    /// later runs.
    #[default]
    FixedLimit,
    /// Advance by the number of rows the page actually returned.
    Received,
}

impl CursorAdvance {
    pub fn next_offset(self, offset: i64, limit: i64, received: usize) -> i64 {
        match self {
            CursorAdvance::FixedLimit => offset + limit,
            CursorAdvance::Received => offset + received as i64,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FilingIngestOptions {
    pub limit: i64,
    pub variant: FilingVariant,
    pub advance: CursorAdvance,
}

impl Default for FilingIngestOptions {
    fn default() -> Self {
        Self {
            limit: 25,
            variant: FilingVariant::ConvertibleDebt,
            advance: CursorAdvance::FixedLimit,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilingIngestSummary {
    pub offset: i64,
    pub next_offset: i64,
    pub fetched: usize,
    /// Dropped by the variant's description rule.
    pub excluded: usize,
    pub inserted: usize,
    /// Already stored under the same source URL.
    pub duplicates: usize,
    /// Skipped because the company id could not be resolved.
    pub unresolved: usize,
}

/// Fetch one page at the stored cursor, store it, then advance the cursor.
///
/// Companies are inserted if their CIK is new; filings are inserted if their
/// source URL is new and silently dropped otherwise. The cursor is written only
/// after the page is stored, so a storage failure leaves it in place and the
/// next run fetches the same page again.
pub fn ingest_filings<F, C>(
    feed: &F,
    store: &Store,
    cursor: &C,
    options: &FilingIngestOptions,
) -> Result<FilingIngestSummary, AppError>
where
    F: FilingFeed + ?Sized,
    C: CursorStore + ?Sized,
{
    let offset = cursor.read()?;
    info!(offset, limit = options.limit, variant = options.variant.display_name(), "fetching filings");

    let page = feed.search(options.variant.query(), offset, options.limit)?;

    let mut summary = FilingIngestSummary {
        offset,
        fetched: page.len(),
        ..FilingIngestSummary::default()
    };

    for filing in &page {
        if !options.variant.accepts(&filing.form_description) {
            debug!(url = %filing.detail_url, "excluded by description");
            summary.excluded += 1;
            continue;
        }

        store.insert_company_if_absent(filing)?;
        let Some(company_id) = store.company_id(&filing.external_company_id)? else {
            warn!(
                cik = %filing.external_company_id,
                url = %filing.detail_url,
                "company could not be resolved; skipping filing"
            );
            summary.unresolved += 1;
            continue;
        };

        let inserted = store.insert_filing_if_absent(&NewFiling {
            company_id,
            filing_date: filing.filed_at,
            filing_type: filing.form_type.clone(),
            source_url: filing.detail_url.clone(),
            is_convertible: options.variant.is_convertible(),
        })?;
        if inserted {
            summary.inserted += 1;
        } else {
            summary.duplicates += 1;
        }
    }

    summary.next_offset = options.advance.next_offset(offset, options.limit, page.len());
    cursor.write(summary.next_offset)?;

    info!(
        fetched = summary.fetched,
        inserted = summary.inserted,
        duplicates = summary.duplicates,
        excluded = summary.excluded,
        next_offset = summary.next_offset,
        "stored filings"
    );
    Ok(summary)
}
