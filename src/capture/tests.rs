use super::fake::FakeSource;
use super::{parse_xid, CaptureError, FrameSize, ResolvedWindow, WindowLink};

#[test]
fn xid_parses_base_ten() {
    assert_eq!(parse_xid("12345"), Ok(12345));
    assert_eq!(parse_xid(" 77 "), Ok(77));
    assert_eq!(
        parse_xid("0x1a"),
        Err(CaptureError::InvalidId("0x1a".to_string()))
    );
    assert!(parse_xid("").is_err());
}

#[test]
fn link_starts_without_window() {
    let link = WindowLink::default();
    assert_eq!(link, WindowLink::NoWindow);
    assert!(link.ready().is_none());
}

#[test]
fn announcement_then_resolution_reaches_ready() {
    let mut source = FakeSource::default();
    let mut link = WindowLink::default();
    link.announce("4242").unwrap();
    assert!(link.is_pending());
    link.resolve(&mut source).unwrap();
    assert_eq!(
        link.ready(),
        Some(&ResolvedWindow {
            xid: 4242,
            parent: None
        })
    );
    assert_eq!(source.resolved, vec![4242]);
}

#[test]
fn invalid_announcement_leaves_link_unchanged() {
    let mut source = FakeSource::default();
    let mut link = WindowLink::default();
    link.announce("9").unwrap();
    link.resolve(&mut source).unwrap();
    let before = link.clone();
    assert!(link.announce("not-a-number").is_err());
    assert_eq!(link, before);
}

#[test]
fn double_announcement_re_resolves() {
    let mut source = FakeSource::default();
    let mut link = WindowLink::default();
    for _ in 0..2 {
        link.announce("12345").unwrap();
        link.resolve(&mut source).unwrap();
        assert!(link.ready().is_some());
    }
    assert_eq!(source.resolved, vec![12345, 12345]);
}

#[test]
fn failed_resolution_stays_pending_and_counts_attempts() {
    let mut source = FakeSource::default();
    source
        .resolve_results
        .push_back(Err(CaptureError::Connection("no display".to_string())));
    let mut link = WindowLink::default();
    link.announce("5").unwrap();
    assert!(link.resolve(&mut source).is_err());
    assert_eq!(link, WindowLink::Pending { xid: 5, attempts: 1 });
    link.resolve(&mut source).unwrap();
    assert!(link.ready().is_some());
}

#[test]
fn resolve_is_a_no_op_without_announcement() {
    let mut source = FakeSource::default();
    let mut link = WindowLink::default();
    link.resolve(&mut source).unwrap();
    assert!(source.resolved.is_empty());
}

#[test]
fn not_ready_is_distinguished() {
    assert!(CaptureError::NotReady.is_not_ready());
    assert!(!CaptureError::Protocol("x".to_string()).is_not_ready());
    assert_eq!(FrameSize { width: 4, height: 3 }.pixel_count(), 12);
}
