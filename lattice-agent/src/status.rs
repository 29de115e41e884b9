//! Agent liveness reporting.

use std::time::Instant;

use lattice_core::idl::StatusAgentReply;

pub fn status_reply(started: Instant) -> StatusAgentReply {
    StatusAgentReply {
        status: "running".to_string(),
        uptime: format_uptime(started.elapsed().as_secs()),
        pid: std::process::id(),
    }
}

fn format_uptime(mut secs: u64) -> String {
    let hours = secs / 3600;
    secs %= 3600;
    let minutes = secs / 60;
    secs %= 60;
    if hours > 0 {
        format!("{}h{}m{}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m{}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(42), "42s");
        assert_eq!(format_uptime(62), "1m2s");
        assert_eq!(format_uptime(3723), "1h2m3s");
    }
}
