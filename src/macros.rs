// src/macros.rs

/// `s!()` is an empty String, `s!(x)` is `String::from(x)`.
#[macro_export]
macro_rules! s {
    () => {
        ::std::string::String::new()
    };
    ($expr:expr) => {
        ::std::string::String::from($expr)
    };
}

/// Concatenate pieces into a fresh String. Every piece after the first may be
/// anything that is `AsRef<str>` (literals, `String`, `&String`).
#[macro_export]
macro_rules! join {
    ($first:expr $(, $rest:expr)+ $(,)?) => {{
        let mut joined = ::std::string::String::from($first);
        $(
            joined.push_str(::std::convert::AsRef::<str>::as_ref(&$rest));
        )+
        joined
    }};
}
