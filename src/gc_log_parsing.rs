use nom::{digit, space, IResult};
use std::str::FromStr;

/// Physical location of a flash block: channel, logical unit, plane,
/// block-within-plane. This is the deduplication key for event logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address {
    pub ch: u32,
    pub lun: u32,
    pub pl: u32,
    pub blk: u32,
}

/// One observation of a block's page counts at one sample point.
/// The same (addr, sample) pair may occur more than once; log order
/// within a sample is the input order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventRecord {
    pub sample: u64,
    pub addr: Address,
    pub vpc: u32,
    pub ipc: u32,
}

/// One segment entry from an f2fs SIT dump. `mtime` is absent in the
/// older dump dialect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentSummary {
    pub segno: u64,
    pub vblocks: u32,
    pub seg_type: u32,
    pub mtime: Option<u64>,
}

/// One row of the GC stress metrics CSV.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricsRow {
    pub round: u64,
    pub disk_percent: u32,
    pub dirty_segs: u64,
    pub free_segs: u64,
    pub gc_events: u64,
    pub physical_mb: u64,
}

// sample,ch,lun,pl,blk,vpc,ipc
// 12,0,1,0,483,96,160
named!(parse_event_record_impl<&str, EventRecord>, do_parse!(
    sample: map_res!(digit, FromStr::from_str) >>
    char!(',') >>
    ch: map_res!(digit, FromStr::from_str) >>
    char!(',') >>
    lun: map_res!(digit, FromStr::from_str) >>
    char!(',') >>
    pl: map_res!(digit, FromStr::from_str) >>
    char!(',') >>
    blk: map_res!(digit, FromStr::from_str) >>
    char!(',') >>
    vpc: map_res!(digit, FromStr::from_str) >>
    char!(',') >>
    ipc: map_res!(digit, FromStr::from_str) >>
    ( EventRecord { sample, addr: Address { ch, lun, pl, blk }, vpc, ipc } )
));

// segno: 47466 vblocks: 0 seg_type:0 mtime:0 sit_pack:1
named!(parse_sit_line<&str, SegmentSummary>, do_parse!(
    take_until_and_consume_s!("segno:") >>
    opt!(space) >>
    segno: map_res!(digit, FromStr::from_str) >>
    take_until_and_consume_s!("vblocks:") >>
    opt!(space) >>
    vblocks: map_res!(digit, FromStr::from_str) >>
    take_until_and_consume_s!("seg_type:") >>
    opt!(space) >>
    seg_type: map_res!(digit, FromStr::from_str) >>
    take_until_and_consume_s!("mtime:") >>
    opt!(space) >>
    mtime: map_res!(digit, FromStr::from_str) >>
    ( SegmentSummary { segno, vblocks, seg_type, mtime: Some(mtime) } )
));

// Segment no.: 100  Valid: 512  type: 1
named!(parse_sit_line_old<&str, SegmentSummary>, do_parse!(
    take_until_and_consume_s!("Segment no.:") >>
    opt!(space) >>
    segno: map_res!(digit, FromStr::from_str) >>
    take_until_and_consume_s!("Valid:") >>
    opt!(space) >>
    vblocks: map_res!(digit, FromStr::from_str) >>
    take_until_and_consume_s!("type:") >>
    opt!(space) >>
    seg_type: map_res!(digit, FromStr::from_str) >>
    ( SegmentSummary { segno, vblocks, seg_type, mtime: None } )
));

// take_until yields Incomplete rather than an error when the marker is
// missing, and alt! gives up on Incomplete, so both dialects must be
// wrapped in complete!.
named!(parse_segment_summary_impl<&str, SegmentSummary>, alt!(
    complete!(parse_sit_line) | complete!(parse_sit_line_old)
));

// A segment count column sometimes carries the pre-GC value in
// parentheses, e.g. "8060(8060)". Only the leading number counts.
named!(parenthesized_count<&str, u64>, do_parse!(
    count: map_res!(digit, FromStr::from_str) >>
    opt!(do_parse!(
        char!('(') >>
        digit >>
        char!(')') >>
        ( () )
    )) >>
    ( count )
));

// Round,Disk_Percent,Dirty_Segs,Free_Segs,GC_Events,Physical_MB
// 3,45,8060(8060),12102,517,4821
named!(parse_metrics_row_impl<&str, MetricsRow>, do_parse!(
    round: map_res!(digit, FromStr::from_str) >>
    char!(',') >>
    disk_percent: map_res!(digit, FromStr::from_str) >>
    char!(',') >>
    dirty_segs: parenthesized_count >>
    char!(',') >>
    free_segs: parenthesized_count >>
    char!(',') >>
    gc_events: map_res!(digit, FromStr::from_str) >>
    char!(',') >>
    physical_mb: map_res!(digit, FromStr::from_str) >>
    ( MetricsRow { round, disk_percent, dirty_segs, free_segs, gc_events, physical_mb } )
));

pub fn parse_event_record(line: &str) -> Option<EventRecord> {
    match parse_event_record_impl(line) {
        IResult::Done(_, val) => Some(val),
        _ => None,
    }
}

pub fn parse_segment_summary(line: &str) -> Option<SegmentSummary> {
    match parse_segment_summary_impl(line) {
        IResult::Done(_, val) => Some(val),
        _ => None,
    }
}

pub fn parse_metrics_row(line: &str) -> Option<MetricsRow> {
    match parse_metrics_row_impl(line) {
        IResult::Done(_, val) => Some(val),
        _ => None,
    }
}

#[test]
fn test_parse_event_record() {
    assert_eq!(
        parse_event_record("12,0,1,0,483,96,160"),
        Some(EventRecord {
            sample: 12,
            addr: Address {
                ch: 0,
                lun: 1,
                pl: 0,
                blk: 483,
            },
            vpc: 96,
            ipc: 160,
        })
    );
    // header line is not a record
    assert_eq!(parse_event_record("sample,ch,lun,pl,blk,vpc,ipc"), None);
    // truncated row is not a record
    assert_eq!(parse_event_record("12,0,1,0,483"), None);
}

#[test]
fn test_parse_segment_summary() {
    assert_eq!(
        parse_segment_summary("segno: 47466 vblocks: 0 seg_type:0 mtime:0 sit_pack:1"),
        Some(SegmentSummary {
            segno: 47466,
            vblocks: 0,
            seg_type: 0,
            mtime: Some(0),
        })
    );
    assert_eq!(
        parse_segment_summary("segno: 100 vblocks: 512 seg_type:1 mtime:100 sit_pack:1"),
        Some(SegmentSummary {
            segno: 100,
            vblocks: 512,
            seg_type: 1,
            mtime: Some(100),
        })
    );
    assert_eq!(
        parse_segment_summary("Segment no.: 100  Valid: 512  type: 1"),
        Some(SegmentSummary {
            segno: 100,
            vblocks: 512,
            seg_type: 1,
            mtime: None,
        })
    );
    assert_eq!(parse_segment_summary("checkpoint: valid nids 230"), None);
}

#[test]
fn test_parse_metrics_row() {
    assert_eq!(
        parse_metrics_row("3,45,8060(8060),12102,517,4821"),
        Some(MetricsRow {
            round: 3,
            disk_percent: 45,
            dirty_segs: 8060,
            free_segs: 12102,
            gc_events: 517,
            physical_mb: 4821,
        })
    );
    assert_eq!(
        parse_metrics_row("3,45,8060,12102(9001),517,4821"),
        Some(MetricsRow {
            round: 3,
            disk_percent: 45,
            dirty_segs: 8060,
            free_segs: 12102,
            gc_events: 517,
            physical_mb: 4821,
        })
    );
    // summary rows don't parse as data rows
    assert_eq!(parse_metrics_row("Final,100,8060,12102,517,4821"), None);
    assert_eq!(parse_metrics_row("HANG,100,8060,12102,517,4821"), None);
}
