//! Correlation id generation.

use stylewire_core::protocol::CorrelationId;

/// Source of fresh, globally unique correlation ids.
pub trait IdGenerator: Send {
    fn next_id(&mut self) -> CorrelationId;
}

/// Random UUID v4 ids.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&mut self) -> CorrelationId {
        CorrelationId::new(uuid::Uuid::new_v4().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn uuid_ids_are_distinct() {
        let mut ids = UuidGenerator;
        let generated: HashSet<CorrelationId> = (0..100).map(|_| ids.next_id()).collect();
        assert_eq!(generated.len(), 100);
    }
}
