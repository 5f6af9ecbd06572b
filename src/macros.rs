/// Builds `FieldErrors` from a literal map of field -> [code => message].
///
/// `validation_errors!({"slug": ["slug" => "Business with this name already exists"]})`
#[macro_export]
macro_rules! validation_errors {
    ({$($field:tt: [$($code:tt => $message:expr),*]),*}) => {{
        let mut errors = $crate::models::FieldErrors::new();
        $($(
            errors.add($field, $code, $message);
        )*)*
        errors
    }};
}
