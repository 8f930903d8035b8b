/// Summary of a check batch, one of three wordings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateSummary {
    NoneUpdated,
    OneUpdated,
    ManyUpdated(usize),
}

impl UpdateSummary {
    pub fn from_count(updated: usize) -> Self {
        match updated {
            0 => UpdateSummary::NoneUpdated,
            1 => UpdateSummary::OneUpdated,
            n => UpdateSummary::ManyUpdated(n),
        }
    }

    pub fn message(&self) -> String {
        match self {
            UpdateSummary::NoneUpdated => "No feed has been updated".to_string(),
            UpdateSummary::OneUpdated => "One feed has been updated".to_string(),
            UpdateSummary::ManyUpdated(n) => format!("{} feeds have been updated", n),
        }
    }
}
