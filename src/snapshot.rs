use gc_log_parsing::{Address, EventRecord};
use std::collections::HashMap;

/// Reduces one sample's worth of event records to the latest state per
/// block: for every address that occurs, only the last record in log
/// order survives. Addresses that never occur are absent from the output,
/// not synthesized as zero. The output is sorted by address so that
/// reducing the same input twice yields the same sequence.
pub fn latest_per_address(records: &[EventRecord]) -> Vec<EventRecord> {
    let mut latest: HashMap<Address, EventRecord> = HashMap::new();
    for record in records {
        latest.insert(record.addr, *record);
    }
    let mut reduced: Vec<EventRecord> = latest.into_iter().map(|(_, r)| r).collect();
    reduced.sort_by_key(|r| r.addr);
    reduced
}

#[cfg(test)]
fn record(blk: u32, vpc: u32, ipc: u32) -> EventRecord {
    EventRecord {
        sample: 0,
        addr: Address {
            ch: 0,
            lun: 0,
            pl: 0,
            blk,
        },
        vpc,
        ipc,
    }
}

#[test]
fn test_empty_input() {
    assert!(latest_per_address(&[]).is_empty());
}

#[test]
fn test_last_duplicate_wins() {
    // k = 1
    assert_eq!(latest_per_address(&[record(7, 3, 1)]), [record(7, 3, 1)]);
    // k = 2: the (10,0) observation is superseded by (5,5)
    assert_eq!(
        latest_per_address(&[record(7, 0, 10), record(7, 5, 5)]),
        [record(7, 5, 5)]
    );
    // k = 4
    assert_eq!(
        latest_per_address(&[
            record(7, 9, 0),
            record(7, 8, 1),
            record(7, 7, 2),
            record(7, 6, 3),
        ]),
        [record(7, 6, 3)]
    );
}

#[test]
fn test_distinct_addresses_all_survive() {
    let reduced = latest_per_address(&[
        record(3, 1, 1),
        record(1, 2, 2),
        record(2, 3, 3),
        record(1, 4, 4),
    ]);
    assert_eq!(reduced, [record(1, 4, 4), record(2, 3, 3), record(3, 1, 1)]);
}

#[test]
fn test_deterministic() {
    let records = [
        record(5, 1, 1),
        record(9, 2, 2),
        record(5, 3, 3),
        record(2, 4, 4),
    ];
    assert_eq!(latest_per_address(&records), latest_per_address(&records));
}
