use std::fmt::{Display, Formatter};

/// Identifier of one endpoint call, backed by ULID so ids sort by time.
///
/// Sent back in the `x-invocation-id` header of error responses and logged
/// with every call outcome.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct InvocationId(pub ulid::Ulid);

impl InvocationId {
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }
}

impl Default for InvocationId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for InvocationId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_ulids() {
        let first = InvocationId::new();
        let second = InvocationId::new();
        assert_ne!(first, second);
        assert_eq!(first.to_string().len(), 26);
        assert_eq!(ulid::Ulid::from_string(&first.to_string()).unwrap(), first.0);
    }
}
