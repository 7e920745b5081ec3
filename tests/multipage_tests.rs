mod common;

use common::fixtures::{plain_pdf, LETTER, TEN_LINES};
use common::pdf_assertions::{get_page_dimensions, links_on_page, page_strings};
use common::{init_logger, run_pipeline, TestResult};
use tocsmith::{EntrySource, InsertionPolicy, RawTocEntry, TocPipelineBuilder};

fn numbered(count: i64) -> EntrySource {
    EntrySource::Explicit((1..=count).map(|i| RawTocEntry::new(1, format!("Section {}", i), i)).collect())
}

#[test]
fn test_fifty_entries_fill_five_toc_pages() -> TestResult {
    init_logger();
    let pipeline = TocPipelineBuilder::new().build()?;
    let pdf = run_pipeline(&pipeline, &mut plain_pdf(50, TEN_LINES), numbered(50))?;

    assert_pdf_page_count!(pdf, 55);
    assert_eq!(pdf.report.toc_pages, 5);
    for page in 1..=5 {
        assert_eq!(links_on_page(&pdf.doc, page).len(), 10, "TOC page {}", page);
    }
    assert_eq!(page_strings(&pdf.doc, 6), vec!["Page 1"]);
    assert_eq!(page_strings(&pdf.doc, 55), vec!["Page 50"]);
    Ok(())
}

#[test]
fn test_continuation_pages_get_their_own_heading() -> TestResult {
    let pipeline = TocPipelineBuilder::new().build()?;
    let pdf = run_pipeline(&pipeline, &mut plain_pdf(50, TEN_LINES), numbered(50))?;

    assert_eq!(page_strings(&pdf.doc, 1)[0], "Hyperlinked Table of Contents");
    for page in 2..=5 {
        assert_eq!(page_strings(&pdf.doc, page)[0], "Hyperlinked Table of Contents (cont.)");
    }
    Ok(())
}

#[test]
fn test_every_link_accounts_for_all_toc_pages() -> TestResult {
    let pipeline = TocPipelineBuilder::new().build()?;
    let pdf = run_pipeline(&pipeline, &mut plain_pdf(50, TEN_LINES), numbered(50))?;

    let targets: Vec<u32> = (1..=5)
        .flat_map(|page| links_on_page(&pdf.doc, page))
        .filter_map(|link| link.target_page)
        .collect();
    let expected: Vec<u32> = (6..=55).collect();
    assert_eq!(targets, expected);
    Ok(())
}

#[test]
fn test_inserted_pages_match_the_first_page_size() -> TestResult {
    let pipeline = TocPipelineBuilder::new().build()?;
    let pdf = run_pipeline(&pipeline, &mut plain_pdf(12, TEN_LINES), numbered(12))?;

    assert_eq!(get_page_dimensions(&pdf.doc, 1), Some((612.0, 314.0)));
    assert_eq!(get_page_dimensions(&pdf.doc, 2), Some((612.0, 314.0)));
    Ok(())
}

#[test]
fn test_overflow_pages_can_go_at_the_end() -> TestResult {
    let pipeline = TocPipelineBuilder::new().with_policy(InsertionPolicy::InsertOneAppendOverflow).build()?;
    let pdf = run_pipeline(&pipeline, &mut plain_pdf(30, TEN_LINES), numbered(25))?;

    assert_pdf_page_count!(pdf, 33);
    assert_eq!(page_strings(&pdf.doc, 2), vec!["Page 1"]);
    assert_eq!(page_strings(&pdf.doc, 31), vec!["Page 30"]);
    assert_eq!(page_strings(&pdf.doc, 32)[0], "Hyperlinked Table of Contents (cont.)");

    assert_eq!(links_on_page(&pdf.doc, 1).len(), 10);
    assert_eq!(links_on_page(&pdf.doc, 32).len(), 10);
    assert_eq!(links_on_page(&pdf.doc, 33).len(), 5);
    // Only one page precedes the content, so "Section 12" is on page 13.
    assert_eq!(links_on_page(&pdf.doc, 32)[1].target_page, Some(13));
    Ok(())
}

#[test]
fn test_out_of_range_pages_are_clamped() -> TestResult {
    let pipeline = TocPipelineBuilder::new().build()?;
    let pdf = run_pipeline(
        &pipeline,
        &mut plain_pdf(10, LETTER),
        EntrySource::Explicit(vec![RawTocEntry::new(1, "Zero", 0), RawTocEntry::new(1, "Huge", 9999)]),
    )?;

    let targets: Vec<Option<u32>> = links_on_page(&pdf.doc, 1).iter().map(|l| l.target_page).collect();
    assert_eq!(targets, vec![Some(2), Some(11)]);
    assert_eq!(&page_strings(&pdf.doc, 1)[1..], ["Zero", "1", "Huge", "10"]);
    Ok(())
}
