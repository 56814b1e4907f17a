//! Names of the language's always-imported core package. Identifiers that
//! resolve here never need an import declaration.

const CORE_PACKAGE_TYPES: &[&str] = &[
    "AbstractMethodError",
    "Appendable",
    "ArithmeticException",
    "ArrayIndexOutOfBoundsException",
    "ArrayStoreException",
    "AssertionError",
    "AutoCloseable",
    "Boolean",
    "Byte",
    "CharSequence",
    "Character",
    "Class",
    "ClassCastException",
    "ClassLoader",
    "ClassNotFoundException",
    "CloneNotSupportedException",
    "Cloneable",
    "Comparable",
    "Deprecated",
    "Double",
    "Enum",
    "Error",
    "Exception",
    "Float",
    "FunctionalInterface",
    "IllegalAccessException",
    "IllegalArgumentException",
    "IllegalStateException",
    "IndexOutOfBoundsException",
    "Integer",
    "InterruptedException",
    "Iterable",
    "Long",
    "Math",
    "NegativeArraySizeException",
    "NoSuchFieldException",
    "NoSuchMethodException",
    "NullPointerException",
    "Number",
    "NumberFormatException",
    "Object",
    "Override",
    "Package",
    "Process",
    "ProcessBuilder",
    "Readable",
    "Runnable",
    "Runtime",
    "RuntimeException",
    "SafeVarargs",
    "SecurityException",
    "Short",
    "StackOverflowError",
    "StackTraceElement",
    "StrictMath",
    "String",
    "StringBuffer",
    "StringBuilder",
    "StringIndexOutOfBoundsException",
    "SuppressWarnings",
    "System",
    "Thread",
    "ThreadLocal",
    "Throwable",
    "UnsupportedOperationException",
    "Void",
];

pub(super) fn is_core_type(name: &str) -> bool {
    CORE_PACKAGE_TYPES.binary_search(&name).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted_for_binary_search() {
        let mut sorted = CORE_PACKAGE_TYPES.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, CORE_PACKAGE_TYPES);
    }

    #[test]
    fn recognises_common_core_types() {
        assert!(is_core_type("String"));
        assert!(is_core_type("Override"));
        assert!(is_core_type("Math"));
        assert!(!is_core_type("ImmutableList"));
        assert!(!is_core_type("string"), "lookup is case-sensitive");
    }
}
