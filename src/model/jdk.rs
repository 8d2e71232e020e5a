//! Platform class tables.
//!
//! Platform classes never become entities. The tables below decide which
//! JSON Schema shape each of them maps to; anything not listed is opaque.

const JDK_PREFIXES: &[&str] = &["java.", "javax.", "jakarta.", "jdk.", "sun.", "com.sun."];

pub(crate) const STRING_CLASSES: &[&str] = &[
    "java.lang.String",
    "java.lang.Character",
    "java.lang.CharSequence",
];

pub(crate) const BOOLEAN_CLASSES: &[&str] = &[
    "java.lang.Boolean",
    "java.util.concurrent.atomic.AtomicBoolean",
];

pub(crate) const INT32_CLASSES: &[&str] = &[
    "java.lang.Byte",
    "java.lang.Short",
    "java.lang.Integer",
    "java.util.OptionalInt",
    "java.util.concurrent.atomic.AtomicInteger",
];

pub(crate) const INT64_CLASSES: &[&str] = &[
    "java.lang.Long",
    "java.math.BigInteger",
    "java.util.OptionalLong",
    "java.util.concurrent.atomic.AtomicLong",
];

pub(crate) const FLOAT_CLASSES: &[&str] = &["java.lang.Float"];

pub(crate) const DOUBLE_CLASSES: &[&str] = &[
    "java.lang.Double",
    "java.lang.Number",
    "java.math.BigDecimal",
    "java.util.OptionalDouble",
];

pub(crate) const DATE_TIME_CLASSES: &[&str] = &[
    "java.util.Date",
    "java.sql.Timestamp",
    "java.time.Instant",
    "java.time.LocalDateTime",
    "java.time.OffsetDateTime",
    "java.time.ZonedDateTime",
];

pub(crate) const DATE_CLASSES: &[&str] = &["java.time.LocalDate", "java.sql.Date"];

pub(crate) const TIME_CLASSES: &[&str] = &["java.time.LocalTime", "java.time.OffsetTime"];

pub(crate) const ITERABLE_CLASSES: &[&str] = &[
    "java.lang.Iterable",
    "java.util.Collection",
    "java.util.List",
    "java.util.ArrayList",
    "java.util.LinkedList",
    "java.util.Set",
    "java.util.HashSet",
    "java.util.LinkedHashSet",
    "java.util.SortedSet",
    "java.util.TreeSet",
    "java.util.Queue",
    "java.util.Deque",
    "java.util.ArrayDeque",
    "java.util.stream.Stream",
];

pub(crate) const MAP_CLASSES: &[&str] = &[
    "java.util.Map",
    "java.util.HashMap",
    "java.util.LinkedHashMap",
    "java.util.SortedMap",
    "java.util.TreeMap",
    "java.util.EnumMap",
    "java.util.concurrent.ConcurrentMap",
    "java.util.concurrent.ConcurrentHashMap",
];

pub(crate) const OPTIONAL_CLASS: &str = "java.util.Optional";

/// `OptionalInt` and friends carry a primitive but are always nullable.
pub(crate) const OPTIONAL_PRIMITIVE_CLASSES: &[&str] = &[
    "java.util.OptionalInt",
    "java.util.OptionalLong",
    "java.util.OptionalDouble",
];

pub fn is_jdk_class(name: &str) -> bool {
    JDK_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}

pub(crate) fn contains(table: &[&str], name: &str) -> bool {
    table.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jdk_prefixes() {
        assert!(is_jdk_class("java.util.List"));
        assert!(is_jdk_class("jakarta.annotation.Nonnull"));
        assert!(!is_jdk_class("com.example.Foo"));
        assert!(!is_jdk_class("javaish.Foo"));
    }
}
