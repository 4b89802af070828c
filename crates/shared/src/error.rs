use thiserror::Error;

#[derive(Debug, Error)]
pub enum TeleopError {
    #[error("input device unavailable: {0}")]
    InputUnavailable(#[source] std::io::Error),
    #[error("terminal has {rows} rows; at least {required} are needed")]
    TerminalTooSmall { rows: u16, required: u16 },
    #[error("invalid setting `{key}`: {reason}")]
    InvalidSetting { key: &'static str, reason: String },
}

impl TeleopError {
    pub fn invalid_setting(key: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidSetting {
            key,
            reason: reason.into(),
        }
    }
}
