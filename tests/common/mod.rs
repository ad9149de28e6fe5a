// Shared test helpers
#![allow(dead_code)]

use nmtscope::models::{CategorySample, Report};
use std::path::{Path, PathBuf};

pub const FIXTURE_NAME: &str = "nmt_53732_1764484822.txt";

pub fn fixture_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(FIXTURE_NAME)
}

pub fn fixture_text() -> String {
    std::fs::read_to_string(fixture_path()).unwrap()
}

pub fn sample(name: &str, reserved: u64, committed: u64) -> CategorySample {
    CategorySample {
        name: name.into(),
        reserved,
        committed,
    }
}

/// Report with the given (name, committed KB) samples; reserved = 2 * committed.
pub fn report(created: i64, committed: &[(&str, u64)]) -> Report {
    Report {
        pid: 4242,
        created,
        nmt_entries: committed
            .iter()
            .map(|(name, kb)| sample(name, kb * 2, *kb))
            .collect(),
    }
}

/// Writes an NMT summary file named like the collector would.
pub fn write_summary(dir: &Path, pid: u32, created: i64, committed: &[(&str, u64)]) -> PathBuf {
    let mut text = String::from("Native Memory Tracking:\n\n");
    for (name, kb) in committed {
        if *name == "Total" {
            text.push_str(&format!(
                "Total: reserved={}KB, committed={}KB\n",
                kb * 2,
                kb
            ));
        } else {
            text.push_str(&format!(
                "-  {} (reserved={}KB, committed={}KB)\n",
                name,
                kb * 2,
                kb
            ));
        }
    }
    let path = dir.join(nmtscope::report_repo::report_file_name(pid, created));
    std::fs::write(&path, text).unwrap();
    path
}
