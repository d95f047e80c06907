/// Log tags identify the subsystem a line comes from
///
/// Each tag maps to a `--debug-<key>` flag that enables its debug output.

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LogTag {
    System,
    Config,
    Telegram,
    Commands,
    Api,
    Tracker,
    Poller,
    Pins,
    Test,
    Other(String),
}

impl LogTag {
    /// Key used by `--debug-<key>` flags
    pub fn to_debug_key(&self) -> String {
        match self {
            LogTag::System => "system".to_string(),
            LogTag::Config => "config".to_string(),
            LogTag::Telegram => "telegram".to_string(),
            LogTag::Commands => "commands".to_string(),
            LogTag::Api => "api".to_string(),
            LogTag::Tracker => "tracker".to_string(),
            LogTag::Poller => "poller".to_string(),
            LogTag::Pins => "pins".to_string(),
            LogTag::Test => "test".to_string(),
            LogTag::Other(s) => s.to_lowercase(),
        }
    }

    /// Uppercase label printed in the console prefix
    pub fn to_plain_string(&self) -> String {
        match self {
            LogTag::Other(s) => s.to_uppercase(),
            other => other.to_debug_key().to_uppercase(),
        }
    }
}

impl std::fmt::Display for LogTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_plain_string())
    }
}
