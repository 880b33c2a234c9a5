use std::fmt;
use std::str::FromStr;

/// How an element action is sequenced against the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Act immediately.
    #[default]
    Direct,
    /// Wait for the element to appear, then act.
    WaitThenAct,
    /// Pause briefly so late scripts settle, then act.
    SettleThenAct,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [
        Strategy::Direct,
        Strategy::WaitThenAct,
        Strategy::SettleThenAct,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Direct => "direct",
            Strategy::WaitThenAct => "wait-then-act",
            Strategy::SettleThenAct => "settle-then-act",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| format!("unknown strategy {s:?} (expected direct, wait-then-act or settle-then-act)"))
    }
}
