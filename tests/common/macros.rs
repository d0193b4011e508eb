/// Asserts that every trajectory of a log has non-decreasing timestamps.
#[macro_export]
macro_rules! assert_time_ordered {
    ($log:expr) => {
        for traj in &$log.trajectories {
            assert!(
                traj.frames
                    .windows(2)
                    .all(|w| w[0].timestamp <= w[1].timestamp),
                "Trajectory {} has out-of-order frames",
                traj.id
            );
        }
    };
}

/// Asserts the number of log files written under a recorder's root directory.
#[macro_export]
macro_rules! assert_log_count {
    ($dir:expr, $expected:expr) => {
        let files = $crate::common::log_files($dir);
        assert_eq!(
            files.len(),
            $expected,
            "Expected {} log files in {}, found {:?}",
            $expected,
            $dir,
            files
        );
    };
}
