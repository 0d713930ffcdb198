#![forbid(unsafe_code)]

use pwin::prelude::*;

#[test]
fn errors_convert_and_display() {
    let page = PageNumber::FIRST;
    let err: Error = FetchError::status(page, 500).into();
    assert_eq!(err.to_string(), "Failed to fetch photos: 500");
    assert!(std::error::Error::source(&err).is_some());

    let err: Error = PageNumber::new(0).unwrap_err().into();
    assert_eq!(err.to_string(), "invariant violated: page numbers start at 1");
}

#[test]
fn question_mark_lifts_invariant_violations() {
    fn third() -> Result<PageNumber> {
        Ok(PageNumber::new(3)?)
    }
    assert_eq!(third().unwrap().get(), 3);
}

#[cfg(feature = "sources")]
#[test]
fn synthetic_session_through_the_facade() {
    let source = pwin::SyntheticSource::new().with_total_pages(1);
    let loader = PaginatedLoader::new(source, 6).with_executor(InlineExecutor);
    let config = WindowConfig::default().with_viewport(300.0, 1000.0);
    let mut window = WindowCoordinator::with_loader(loader, config);
    window.mount();
    window.poll();
    // One page of six, four per row at this width, rows 300 tall.
    assert_eq!(window.snapshot().total_extent, 600.0);
    assert_eq!(window.loader().end_of_collection(), Some(PageNumber::new(2).unwrap()));
}
