use serde::{Deserialize, Serialize};

// Outcome reported by the external payment collaborator. The coordinator
// records it on the order header but never interprets it.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus{
    Pending,
    Completed,
    Failed
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed"
        }
    }
}
