use std::fmt::{Debug, Display, Formatter, Result as FmtResult};

/// A cache key derived from an operation name and its arguments.
///
/// Detail views use `api:{entity}:detail:{id}`, which is also what
/// invalidation removes. Every other view uses `api:{entity}:{operation}`
/// followed by `:{name}={value:?}` for each argument, in call order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    const PREFIX: &'static str = "api";

    /// Key of the detail view of a single entity
    pub fn detail(entity: &str, id: impl Display) -> Self {
        Self(format!("{}:{entity}:detail:{id}", Self::PREFIX))
    }

    /// Key of any other view; append arguments with [`CacheKey::arg`]
    pub fn operation(entity: &str, operation: &str) -> Self {
        Self(format!("{}:{entity}:{operation}", Self::PREFIX))
    }

    /// Appends an argument. `Debug` formatting keeps strings quoted so values
    /// containing `:` or `=` cannot collide with the separators.
    pub fn arg(mut self, name: &str, value: impl Debug) -> Self {
        self.0.push_str(&format!(":{name}={value:?}"));
        self
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod test {
    use crate::cache::key::CacheKey;

    #[test]
    fn test_detail_key_format() {
        assert_eq!(
            CacheKey::detail("equipment", 42).as_str(),
            "api:equipment:detail:42"
        );
    }

    #[test]
    fn test_operation_key_is_deterministic() {
        let build = || {
            CacheKey::operation("equipment", "list")
                .arg("lab_id", Some(1))
                .arg("keyword", Some("scope"))
                .arg("page", 1u64)
        };
        assert_eq!(build(), build());
        assert_eq!(
            build().as_str(),
            "api:equipment:list:lab_id=Some(1):keyword=Some(\"scope\"):page=1"
        );
    }

    #[test]
    fn test_operation_key_distinguishes_arguments() {
        let a = CacheKey::operation("equipment", "list").arg("keyword", "a:page=2");
        let b = CacheKey::operation("equipment", "list")
            .arg("keyword", "a")
            .arg("page", 2);
        assert_ne!(a, b);
    }
}
