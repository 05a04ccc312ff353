/// Writes every value through `f`, putting `separator` between the values that produced output.
pub fn separated_by<T, F>(
    out: &mut String,
    values: impl IntoIterator<Item = T>,
    mut f: F,
    separator: &str,
) where
    F: FnMut(&mut String, T),
{
    let mut len = out.len();
    for v in values {
        if out.len() > len {
            out.push_str(separator);
        }
        len = out.len();
        f(out, v);
    }
}

/// Largest char boundary of `value` not past `max`.
pub fn truncate_index(value: &str, max: usize) -> usize {
    if value.len() <= max {
        return value.len();
    }
    let mut index = max;
    while !value.is_char_boundary(index) {
        index -= 1;
    }
    index
}

#[macro_export]
macro_rules! truncate_long {
    ($query:expr) => {
        format_args!(
            "{}{}",
            &$query[..$crate::truncate_index(&$query, 497)].trim_end(),
            if $query.len() > 497 { "..." } else { "" },
        )
    };
}
