#[cfg(test)]
mod pipeline_tests {
    use std::fs;
    use std::path::Path;

    use rplog::analysis::{
        self, duty_cycle::DUTY_CYCLE_LOG, store::{RECV_TABLE, SENT_TABLE}, Dialect, EventStore,
        ExtractionWarning,
    };
    use rplog::error::AnalysisError;

    const COOJA_LOG: &str = "\
00:00.512000 ID:1 App: I am sink 01:00
00:00.730000 ID:2 App: I am normal node 02:00
00:00.901000 ID:3 App: I am normal node 03:00
00:00.950000 ID:4 App: I am normal node 04:00
00:30.000000 ID:2 App: Send seqn 0 to 01:00
00:30.004000 ID:1 App: Recv from 02:00 seqn 0 hops 1
00:30.100000 ID:3 App: Send seqn 0 to 01:00
00:30.112000 ID:1 App: Recv from 03:00 seqn 0 hops 2
00:30.112500 ID:1 App: Recv from 03:00 seqn 0 hops 2
uc_recv: Forwarding packet from hdr 03:00 -> 01:00
01:00.000000 ID:2 App: Send seqn 1 to 01:00
01:00.100000 ID:3 App: Send seqn 1 to 01:00
01:00.110000 ID:1 App: Recv from 03:00 seqn 1 hops 2
01:30.000000 ID:2 App: Send seqn 2 to 01:00
01:30.002000 ID:1 App: Recv from 02:00 seqn 2 hops 1
01:30.000000 ID:1 App: Send seqn 2 to 01:00
";

    const ENERGY_LOG: &str = "\
Sky_1 ON 1000 us 10.50 %
Sky_2 ON 300 us 1.25 %
Sky_3 ON 350 us 1.75 %
";

    fn write_log(dir: &Path, text: &str) -> std::path::PathBuf {
        let path = dir.join("loglistener.log");
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_parse_then_analyze_directory() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = write_log(dir.path(), COOJA_LOG);

        let parsed = analysis::parse_log_file(&log_path, Dialect::Simulation).unwrap();
        assert_eq!(parsed.nodes.len(), 4);
        assert_eq!(parsed.events.sent.len(), 6);
        assert_eq!(parsed.events.received.len(), 5);
        assert_eq!(parsed.warnings(), vec![ExtractionWarning::NoDataSent { node: 4 }]);

        parsed.events.write_tables(dir.path()).unwrap();
        assert!(dir.path().join(SENT_TABLE).is_file());
        assert!(dir.path().join(RECV_TABLE).is_file());
        fs::write(dir.path().join(DUTY_CYCLE_LOG), ENERGY_LOG).unwrap();

        let report = analysis::analyze_dir(dir.path(), Dialect::Simulation).unwrap();

        // seqn 2 is the highest and excluded; node 1's self-send is gone with it
        let summary: Vec<_> = report
            .nodes
            .iter()
            .map(|n| (n.node, n.sent_count, n.lost_count, n.pdr_pct))
            .collect();
        assert_eq!(summary, vec![(2, 2, 1, Some(50.0)), (3, 2, 0, Some(100.0))]);
        assert_eq!(report.network.overall_sent, 4);
        assert_eq!(report.network.overall_lost, 1);
        assert_eq!(report.network.overall_pdr_pct, Some(75.0));

        // 4 ms, 12 ms (first duplicate), 10 ms
        let latency = report.network.latency_ms.unwrap();
        assert_eq!(latency.count, 3);
        assert!((latency.mean - 26.0 / 3.0).abs() < 1e-6);
        assert!((latency.min - 4.0).abs() < 1e-6);
        assert!((latency.max - 12.0).abs() < 1e-6);

        let dc = report.duty_cycle.unwrap();
        assert_eq!(dc.records.len(), 3);
        let dc_summary = dc.summary.unwrap();
        assert!((dc_summary.mean - 4.5).abs() < 1e-9);
        assert!((dc_summary.min - 1.25).abs() < 1e-9);
        assert!((dc_summary.max - 10.5).abs() < 1e-9);
    }

    #[test]
    fn test_tables_and_memory_agree() {
        let dir = tempfile::tempdir().unwrap();
        let parsed = analysis::parse_log(COOJA_LOG, Dialect::Simulation).unwrap();
        parsed.events.write_tables(dir.path()).unwrap();

        let from_disk = EventStore::read_tables(dir.path()).unwrap();
        assert_eq!(
            analysis::analyze_store(&from_disk, Dialect::Simulation),
            analysis::analyze_store(&parsed.events, Dialect::Simulation)
        );
    }

    #[test]
    fn test_testbed_run_has_no_latency_or_duty_cycle() {
        let log = "\
[2024-05-01 10:00:00,000100] INFO:firefly.1: 1.firefly < b'App: I am sink 01:00'
[2024-05-01 10:00:00,000200] INFO:firefly.2: 2.firefly < b'App: I am normal node 02:00'
[2024-05-01 10:00:10,000000] INFO:firefly.2: 2.firefly < b'App: Send seqn 0 to 01:00'
[2024-05-01 10:00:10,020000] INFO:firefly.1: 1.firefly < b'App: Recv from 02:00 seqn 0 hops 1'
[2024-05-01 10:00:40,000000] INFO:firefly.2: 2.firefly < b'App: Send seqn 1 to 01:00'
";
        let dir = tempfile::tempdir().unwrap();
        let parsed = analysis::parse_log_file(&write_log(dir.path(), log), Dialect::Testbed).unwrap();
        parsed.events.write_tables(dir.path()).unwrap();

        let report = analysis::analyze_dir(dir.path(), Dialect::Testbed).unwrap();
        assert!(report.testbed);
        assert_eq!(report.network.overall_pdr_pct, Some(100.0));
        assert_eq!(report.network.latency_ms, None);
        assert_eq!(report.duty_cycle, None);
    }

    #[test]
    fn test_unresolved_address_propagates() {
        let log = "\
00:00.100000 ID:1 App: I am sink 01:00
00:01.000000 ID:2 App: Send seqn 0 to 01:00
00:01.004000 ID:1 App: Recv from 02:00 seqn 0 hops 1
";
        let err = analysis::parse_log(log, Dialect::Simulation).unwrap_err();
        assert!(matches!(err, AnalysisError::UnresolvedAddress { address: 0x0200, line: 3 }));
    }

    #[test]
    fn test_timeline_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = String::from(
            "00:00.000000 ID:1 App: I am sink 01:00\n00:00.200000 ID:2 App: I am normal node 02:00\n",
        );
        for seqn in 0..12u32 {
            let minute = seqn / 2;
            let second = (seqn % 2) * 30;
            log.push_str(&format!("{minute:02}:{second:02}.000000 ID:2 App: Send seqn {seqn} to 01:00\n"));
            if seqn % 3 != 0 {
                log.push_str(&format!(
                    "{minute:02}:{second:02}.050000 ID:1 App: Recv from 02:00 seqn {seqn} hops 1\n"
                ));
            }
        }

        let samples = analysis::run_timeline(&log, Dialect::Simulation, &[2, 4], Some(dir.path()));
        assert_eq!(samples.len(), 2);
        // up to 2:00 seqn 0..=4 logged, 0..=3 counted, 0 and 3 lost
        assert_eq!((samples[0].sent, samples[0].lost), (4, 2));
        assert_eq!(samples[0].pdr, 50.0);
        assert!(dir.path().join("log_2min.log").is_file());
        assert!(dir.path().join("log_4min.log").is_file());

        analysis::write_timeline(&samples, dir.path()).unwrap();
        let csv = fs::read_to_string(dir.path().join("pdr_timeline.csv")).unwrap();
        assert!(csv.starts_with("minutes,pdr,lost,sent\n2,50.0,2,4\n"));
    }
}
