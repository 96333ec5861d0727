//! Log dialects and their line grammars.
//!
//! A capture comes either from the simulator (`12:03.456789 ID:4 App: ...`) or from the
//! testbed log server (`[2024-05-01 10:11:12,345] INFO:firefly.4: 4.firefly < b'App: ...'`).
//! The dialect is chosen once and every parser asks it for the matching [`Grammar`].

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::types::SimTime;

/// Source of a capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Physical testbed, wall-clock timestamps from the log server
    Testbed,
    /// Cooja simulator output
    #[default]
    Simulation,
}

impl Dialect {
    pub fn from_testbed_flag(testbed: bool) -> Self {
        if testbed {
            Dialect::Testbed
        } else {
            Dialect::Simulation
        }
    }

    pub fn is_testbed(self) -> bool {
        self == Dialect::Testbed
    }

    pub fn grammar(self) -> &'static Grammar {
        match self {
            Dialect::Testbed => &TESTBED,
            Dialect::Simulation => &SIMULATION,
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dialect::Testbed => write!(f, "testbed"),
            Dialect::Simulation => write!(f, "cooja"),
        }
    }
}

/// Compiled patterns for one dialect
pub struct Grammar {
    /// Match: "App: I am normal node 1a:2b" / "App: I am sink 1a:2b"
    pub identity: Regex,
    /// Match: "App: Recv from 1a:2b seqn 7 hops 3"
    pub receive: Regex,
    /// Match: "App: Send seqn 7 to 1a:2b"
    pub send: Regex,
    /// Time-of-day in the line, used for windowed truncation
    pub clock: Regex,
}

const SIMULATION_PREFIX: &str = r"^(?P<time>[\w:.]+)\s+ID:(?P<self_id>\d+)\s+";
const TESTBED_PREFIX: &str =
    r"^\[[0-9\-]+ (?P<time>[0-9,:]+)\] INFO:\w+\.(?P<self_id>\d+): \d+\.\w+ < b'";

const IDENTITY_BODY: &str =
    r"App: I am (?:normal node|sink) (?P<addr_hi>[0-9a-fA-F]{1,2}):(?P<addr_lo>[0-9a-fA-F]{1,2})";
const RECEIVE_BODY: &str = r"App: Recv from (?P<addr_hi>[0-9a-fA-F]{1,2}):(?P<addr_lo>[0-9a-fA-F]{1,2}) seqn (?P<seqn>\d+) hops (?P<hops>\d+)";
const SEND_BODY: &str =
    r"App: Send seqn (?P<seqn>\d+) to (?P<addr_hi>[0-9a-fA-F]{1,2}):(?P<addr_lo>[0-9a-fA-F]{1,2})";

impl Grammar {
    fn build(prefix: &str, suffix: &str, clock: &str) -> Self {
        let line = |body: &str, what: &str| {
            Regex::new(&format!("{prefix}{body}{suffix}"))
                .unwrap_or_else(|e| panic!("Invalid {what} regex: {e}"))
        };
        Self {
            identity: line(IDENTITY_BODY, "identity"),
            receive: line(RECEIVE_BODY, "receive"),
            send: line(SEND_BODY, "send"),
            clock: Regex::new(clock).expect("Invalid clock regex"),
        }
    }
}

static SIMULATION: LazyLock<Grammar> =
    LazyLock::new(|| Grammar::build(SIMULATION_PREFIX, "", r"^(?P<time>[0-9:.]+)"));

static TESTBED: LazyLock<Grammar> =
    LazyLock::new(|| Grammar::build(TESTBED_PREFIX, "'", r"\[[0-9\-]+ (?P<time>[0-9:,]+)\]"));

/// Convert a captured event timestamp to microseconds.
///
/// Colon-separated values are `[H:]M:S.f` (a `,` decimal separator is accepted) and get
/// rescaled; anything else must already be a number of microseconds.
pub fn timestamp_to_micros(raw: &str) -> Option<SimTime> {
    if !raw.contains(':') {
        return raw.parse().ok().filter(|us: &f64| us.is_finite());
    }

    let mut fields = raw.rsplit(':');
    let seconds: f64 = fields.next()?.replace(',', ".").parse().ok()?;
    let minutes: f64 = fields.next()?.parse().ok()?;
    let hours: f64 = match fields.next() {
        Some(h) => h.parse().ok()?,
        None => 0.0,
    };
    if fields.next().is_some() {
        return None;
    }

    Some(1e6 * (hours * 3600.0 + minutes * 60.0 + seconds))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulation_identity_regex() {
        let line = "00:01.234000 ID:5 App: I am normal node 1a:2b";
        let caps = Dialect::Simulation.grammar().identity.captures(line).unwrap();
        assert_eq!(&caps["time"], "00:01.234000");
        assert_eq!(&caps["self_id"], "5");
        assert_eq!(&caps["addr_hi"], "1a");
        assert_eq!(&caps["addr_lo"], "2b");

        let sink = "00:01.234000 ID:1 App: I am sink 01:00";
        assert!(Dialect::Simulation.grammar().identity.is_match(sink));
    }

    #[test]
    fn test_testbed_receive_regex() {
        let line = "[2024-05-01 10:11:12,345678] INFO:firefly.1: 1.firefly < b'App: Recv from 0c:04 seqn 17 hops 3'";
        let caps = Dialect::Testbed.grammar().receive.captures(line).unwrap();
        assert_eq!(&caps["time"], "10:11:12,345678");
        assert_eq!(&caps["self_id"], "1");
        assert_eq!(&caps["addr_hi"], "0c");
        assert_eq!(&caps["seqn"], "17");
        assert_eq!(&caps["hops"], "3");
    }

    #[test]
    fn test_dialects_do_not_cross_match() {
        let sim = "00:05.000000 ID:2 App: Send seqn 3 to 01:00";
        assert!(Dialect::Simulation.grammar().send.is_match(sim));
        assert!(!Dialect::Testbed.grammar().send.is_match(sim));
    }

    #[test]
    fn test_line_shapes_are_exclusive() {
        let g = Dialect::Simulation.grammar();
        let send = "00:05.000000 ID:2 App: Send seqn 3 to 01:00";
        assert!(!g.identity.is_match(send));
        assert!(!g.receive.is_match(send));
    }

    #[test]
    fn test_timestamp_to_micros() {
        assert_eq!(timestamp_to_micros("01:02.5"), Some(62_500_000.0));
        assert_eq!(timestamp_to_micros("1:00:00.0"), Some(3_600_000_000.0));
        assert_eq!(timestamp_to_micros("10:11:12,5"), Some(1e6 * (36_000.0 + 660.0 + 12.5)));
        assert_eq!(timestamp_to_micros("123456"), Some(123_456.0));
        assert_eq!(timestamp_to_micros("abc"), None);
        assert_eq!(timestamp_to_micros("1:2:3:4"), None);
    }

    #[test]
    fn test_dialect_from_flag() {
        assert_eq!(Dialect::from_testbed_flag(true), Dialect::Testbed);
        assert_eq!(Dialect::from_testbed_flag(false), Dialect::Simulation);
        assert_eq!(Dialect::default(), Dialect::Simulation);
    }
}
