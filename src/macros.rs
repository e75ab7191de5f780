// src/macros.rs
#[macro_export]
macro_rules! s {
    // String shorthand!
    () => {
        ::std::string::String::new()
    };
    ($expr:expr) => {
        ::std::string::String::from($expr)
    };
}

#[macro_export]
macro_rules! join {
    // String-type concatenation shorthand!
    ($first:expr $(, $rest:expr)+ $(,)?) => {{
        let mut s = ::std::string::String::from($first);
        $(
            s.push_str($rest);
        )+
        s
    }};
}

/// `broken!(BossName)` → `ExtractionError::BrokenReport { field: ReportField::BossName }`
#[macro_export]
macro_rules! broken {
    ($field:ident) => {
        $crate::error::ExtractionError::BrokenReport {
            field: $crate::error::ReportField::$field,
        }
    };
}

/// `malformed!(Bio)` → `ExtractionError::MalformedPage { field: ProfileField::Bio }`
#[macro_export]
macro_rules! malformed {
    ($field:ident) => {
        $crate::error::ExtractionError::MalformedPage {
            field: $crate::error::ProfileField::$field,
        }
    };
}
