use crate::intake::RejectionReason;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// User-facing toast raised by the analysis session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Rejected(RejectionReason),
    NoImage,
    Retrying,
    Simulated,
    Completed { detected: usize },
    ApiUnavailable,
}

impl Notice {
    pub fn level(&self) -> NoticeLevel {
        match self {
            Notice::Rejected(_) => NoticeLevel::Error,
            Notice::NoImage | Notice::Simulated | Notice::ApiUnavailable => NoticeLevel::Warning,
            Notice::Retrying => NoticeLevel::Info,
            Notice::Completed { .. } => NoticeLevel::Success,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Notice::Rejected(_) => "Upload rejected",
            Notice::NoImage => "No image",
            Notice::Retrying => "Retrying analysis",
            Notice::Simulated => "Simulated results",
            Notice::Completed { .. } => "Analysis complete",
            Notice::ApiUnavailable => "Classifier unavailable",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Notice::Rejected(reason) => reason.to_string(),
            Notice::NoImage => "Please upload an X-ray image first.".to_string(),
            Notice::Retrying => "The classifier returned no results, trying once more...".to_string(),
            Notice::Simulated => {
                "The classifier could not be reached. Showing simulated results for demonstration only."
                    .to_string()
            }
            Notice::Completed { detected: 0 } => "No conditions detected.".to_string(),
            Notice::Completed { detected: 1 } => "1 condition detected.".to_string(),
            Notice::Completed { detected } => format!("{} conditions detected.", detected),
            Notice::ApiUnavailable => {
                "The classification service did not respond to its health check.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_message_counts_conditions() {
        assert_eq!(Notice::Completed { detected: 0 }.message(), "No conditions detected.");
        assert_eq!(Notice::Completed { detected: 1 }.message(), "1 condition detected.");
        assert_eq!(Notice::Completed { detected: 3 }.message(), "3 conditions detected.");
    }

    #[test]
    fn rejection_uses_reason_text() {
        let notice = Notice::Rejected(RejectionReason::NotAnImage);
        assert_eq!(notice.level(), NoticeLevel::Error);
        assert!(notice.message().starts_with("Please upload an image file"));
    }
}
