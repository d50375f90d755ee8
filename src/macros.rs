//! Macros shared across layers

/// Builds `validator::ValidationErrors` out of a field -> [code => message] map.
///
/// `validation_errors!({"slug": ["slug" => "Slug already exists"]})`
#[macro_export]
macro_rules! validation_errors {
    ({$($field:tt: [$($code:tt => $message:tt),*]),*}) => {{
        let mut errors = ::validator::ValidationErrors::new();
        $($(
            errors.add($field, ::validator::ValidationError {
                code: ::std::borrow::Cow::from($code),
                message: Some(::std::borrow::Cow::from($message)),
                params: ::std::collections::HashMap::new(),
            });
        )*)*
        errors
    }};
}
