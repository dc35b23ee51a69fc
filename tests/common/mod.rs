//! Shared `/proc/net` shaped fixtures for integration tests

use std::fs;
use std::path::Path;

use defender_agent::AgentConfig;
use tempfile::TempDir;

pub const NET_DEV: &str = "Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
    lo:  900000   9000    0    0    0     0          0         0   900000    9000    0    0    0     0       0          0
  eth0: 2000 20 0 0 0 0 0 0 1000 10 0 0 0 0 0 0
 wlan0: 500 5 0 0 0 0 0 0 250 2 0 0 0 0 0 0
";

pub const TCP: &str = "  sl  local_address rem_address   st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode
   0: 00000000:0016 00000000:0000 0A 00000000:00000000 00:00000000 00000000     0        0 100 1
   1: 0100007F:170C 00000000:0000 0A 00000000:00000000 00:00000000 00000000     0        0 101 1
   2: 0F02000A:0016 0202000A:E828 01 00000000:00000000 00:00000000 00000000     0        0 102 1
   3: 0F02000A:0016 0202000A:E828 01 00000000:00000000 00:00000000 00000000     0        0 102 1
   4: 0F02000A:0016 6BA44E0A:076C 01 00000000:00000000 00:00000000 00000000     0        0 103 1
   5: 0F02000A:9C40 0202000A:01BB 06 00000000:00000000 00:00000000 00000000     0        0 104 1
";

pub const UDP: &str = "  sl  local_address rem_address   st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode ref pointer drops
  10: 00000000:0044 00000000:0000 07 00000000:00000000 00:00000000 00000000     0        0 200 2 0000000000000000 0
  11: 0100007F:0035 00000000:0000 07 00000000:00000000 00:00000000 00000000     0        0 201 2 0000000000000000 0
";

/// Writes the three tables into a fresh directory and points a config at them
pub fn fixture_config() -> (TempDir, AgentConfig) {
    let dir = tempfile::tempdir().expect("Failed to create fixture directory");
    write_table(dir.path(), "dev", NET_DEV);
    write_table(dir.path(), "tcp", TCP);
    write_table(dir.path(), "udp", UDP);

    let mut config = AgentConfig::default();
    config.sources.net_dev = dir.path().join("dev");
    config.sources.tcp = dir.path().join("tcp");
    config.sources.udp = dir.path().join("udp");
    (dir, config)
}

pub fn write_table(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).expect("Failed to write fixture table");
}

/// A TCP table with `count` distinct established connections
pub fn many_established(count: u16) -> String {
    let mut table = TCP.lines().next().unwrap_or_default().to_string();
    table.push('\n');
    for i in 0..count {
        table.push_str(&format!(
            "{:4}: 0F02000A:0016 0202000A:{:04X} 01 00000000:00000000 00:00000000 00000000     0        0 {} 1\n",
            i,
            1024 + i,
            300 + u32::from(i)
        ));
    }
    table
}
