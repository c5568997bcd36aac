//! A disturbance transfer that the slave aborts mid-flight must not produce a sealed record.

use iec103_master::{AbortCode, AsduHeader, Dui, DisturbanceAssembler, FunctionType, Ifi, Progress};

const CA: u8 = 1;
const COT: u8 = 31;

fn header(type_identification: u8) -> AsduHeader {
    AsduHeader::new(
        Dui::new(type_identification, 1, true, COT, CA),
        Ifi::new(FunctionType::Distance, 0),
    )
}

#[test]
fn channel_abort_discards_the_in_progress_record() {
    let mut assembler = DisturbanceAssembler::new();

    let mut request = Vec::new();
    request.extend_from_slice(&3u16.to_le_bytes());
    request.push(0);
    request.extend_from_slice(&[0u8; 7]);
    assembler.feed(&header(23), &request).unwrap();

    let mut transfer = Vec::new();
    transfer.push(0); // skipped
    transfer.push(0); // TOV
    transfer.extend_from_slice(&3u16.to_le_bytes());
    transfer.extend_from_slice(&3u16.to_le_bytes());
    transfer.push(1);
    transfer.extend_from_slice(&5u16.to_le_bytes());
    transfer.extend_from_slice(&1000u16.to_le_bytes());
    transfer.extend_from_slice(&[0u8; 7]);
    assembler.feed(&header(26), &transfer).unwrap();

    // ASDU 31, TOO=37: channel transfer aborted.
    let end = vec![37u8, 0, 3, 0, 0];
    let (progress, order) = assembler.feed(&header(31), &end).unwrap();

    assert_eq!(progress, Progress::Aborted(AbortCode::ChannelAborted));
    assert_eq!(order.unwrap().order, 67);
    assert!(assembler.current().is_none());
}
