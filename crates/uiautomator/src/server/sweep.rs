//! Locating leftover server processes from device `ps` output.

/// Process name the instrumentation runner shows up as on the device.
pub const SERVER_PROCESS_NAME: &str = "uiautomator";

/// Extract the pids of processes named `name` from `ps` output.
///
/// The PID column is located from the header line. Output without a header
/// or without a `PID` column yields nothing.
pub fn parse_pids(output: &str, name: &str) -> Vec<u32> {
    let mut lines = non_blank(output);

    let Some(pid_column) = lines.next().and_then(find_pid_column) else {
        return Vec::new();
    };

    lines
        .filter_map(|line| {
            let cols: Vec<&str> = line.split_whitespace().collect();
            let process = cols.last()?;
            if *process != name {
                return None;
            }
            cols.get(pid_column)?.parse().ok()
        })
        .collect()
}

/// Whether `output` starts with a `ps` header carrying a `PID` column.
pub fn has_pid_column(output: &str) -> bool {
    non_blank(output).next().and_then(find_pid_column).is_some()
}

fn non_blank(output: &str) -> impl Iterator<Item = &str> {
    output.lines().filter(|line| !line.trim().is_empty())
}

fn find_pid_column(header: &str) -> Option<usize> {
    header.split_whitespace().position(|col| col == "PID")
}
