use serde::{Deserialize, Serialize};

// Fulfillment states. Transitions only ever move forward; cancellation is
// terminal and only possible before the food is ready.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus{
    Pending,
    Processing,
    Ready,
    Completed,
    Cancelled
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Ready => "ready",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled"
        }
    }

    pub fn parse(s: &str) -> Option<OrderStatus> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "processing" => Some(OrderStatus::Processing),
            "ready" => Some(OrderStatus::Ready),
            "completed" => Some(OrderStatus::Completed),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None
        }
    }

    // Statuses a given target status may legally be reached from
    pub fn allowed_predecessors(&self) -> &'static [OrderStatus] {
        match self {
            OrderStatus::Pending => &[],
            OrderStatus::Processing => &[OrderStatus::Pending],
            OrderStatus::Ready => &[OrderStatus::Pending, OrderStatus::Processing],
            OrderStatus::Completed => &[OrderStatus::Ready],
            OrderStatus::Cancelled => &[OrderStatus::Pending, OrderStatus::Processing]
        }
    }

    pub fn can_advance_to(&self, target: OrderStatus) -> bool {
        target.allowed_predecessors().contains(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_transitions_are_allowed() {
        assert!(OrderStatus::Pending.can_advance_to(OrderStatus::Processing));
        assert!(OrderStatus::Processing.can_advance_to(OrderStatus::Ready));
        assert!(OrderStatus::Ready.can_advance_to(OrderStatus::Completed));
    }

    #[test]
    fn backward_transitions_are_rejected() {
        assert!(!OrderStatus::Ready.can_advance_to(OrderStatus::Processing));
        assert!(!OrderStatus::Completed.can_advance_to(OrderStatus::Pending));
        assert!(!OrderStatus::Processing.can_advance_to(OrderStatus::Pending));
    }

    #[test]
    fn cancellation_only_before_ready() {
        assert!(OrderStatus::Pending.can_advance_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Processing.can_advance_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Ready.can_advance_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Completed.can_advance_to(OrderStatus::Cancelled));
    }

    #[test]
    fn terminal_statuses_go_nowhere() {
        for target in [
            OrderStatus::Pending,
            OrderStatus::Processing,
            OrderStatus::Ready,
            OrderStatus::Completed,
            OrderStatus::Cancelled
        ] {
            assert!(!OrderStatus::Cancelled.can_advance_to(target));
            assert!(!OrderStatus::Completed.can_advance_to(target));
        }
    }

    #[test]
    fn parse_round_trips() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Processing,
            OrderStatus::Ready,
            OrderStatus::Completed,
            OrderStatus::Cancelled
        ] {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::parse("shipped"), None);
    }
}
