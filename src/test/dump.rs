use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::dump::{FileSink, MemorySink, PacketSink};
use crate::net::{HopRecord, HostId, NormalPacket, SwitchId, TriggerRecord};
use crate::sim::SimTime;

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_nanos();
    std::env::temp_dir().join(format!(
        "syndb-sim-{prefix}-{}-{nanos}",
        std::process::id()
    ))
}

fn packet(
    id: u64,
    src: usize,
    dst: usize,
    hops: &[(usize, u64)],
    end: Option<u64>,
) -> NormalPacket {
    let mut pkt = NormalPacket::new(id, HostId(src), HostId(dst), 101, SimTime::ZERO);
    pkt.trace = hops
        .iter()
        .map(|&(s, t)| HopRecord {
            switch: SwitchId(s),
            rx_time: SimTime(t),
        })
        .collect();
    pkt.end_time = end.map(SimTime);
    pkt
}

#[test]
fn file_sink_writes_sorted_per_switch_files() {
    let dir = unique_temp_dir("dump-files");
    let mut sink = FileSink::new(&dir, "run1_", 3);

    // 后送达的包在 s1 的入口时刻反而更早
    sink.dump_packet(packet(1, 0, 1, &[(0, 300), (1, 900)], Some(1500)));
    sink.dump_packet(packet(0, 1, 0, &[(1, 200), (0, 1200)], Some(1800)));
    // 运行结束时仍在途的包也要出现在已经过的交换机文件里
    sink.dump_packet(packet(2, 0, 1, &[(0, 400)], None));

    let mut record = TriggerRecord::new(0, SwitchId(2), SimTime(1000));
    record.arrivals.insert(SwitchId(1), SimTime(2048));
    record.arrivals.insert(SwitchId(0), SimTime(3096));
    sink.dump_trigger(record);

    assert_eq!(sink.dir(), dir.as_path());
    sink.finish().unwrap();

    let read = |name: &str| fs::read_to_string(dir.join(name)).expect(name);
    assert_eq!(read("run1_switch_0.txt"), "300\t1\n400\t2\n1200\t0\n");
    assert_eq!(read("run1_switch_1.txt"), "200\t0\n900\t1\n");
    assert_eq!(read("run1_switch_2.txt"), "");
    assert_eq!(read("run1_sourceDestination.txt"), "0\t1\t0\n1\t0\t1\n2\t0\t1\n");
    assert_eq!(read("run1_trigger.txt"), "0\t1000\t2\n0\t3096\n1\t2048\n");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn file_sink_without_records_writes_empty_files() {
    let dir = unique_temp_dir("dump-empty");
    FileSink::new(&dir, "", 2).finish().unwrap();

    for name in ["switch_0.txt", "switch_1.txt", "sourceDestination.txt", "trigger.txt"] {
        let raw = fs::read_to_string(dir.join(name)).expect(name);
        assert!(raw.is_empty(), "{name} should be empty");
    }
    assert!(!dir.join("switch_2.txt").exists());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn memory_sink_splits_delivered_and_flushed() {
    let mut sink = MemorySink::default();
    sink.dump_packet(packet(0, 0, 1, &[(0, 81)], Some(200)));
    sink.dump_packet(packet(1, 0, 1, &[(0, 162)], None));

    assert_eq!(sink.delivered().map(|p| p.id).collect::<Vec<_>>(), vec![0]);
    assert_eq!(sink.flushed().map(|p| p.id).collect::<Vec<_>>(), vec![1]);
}
