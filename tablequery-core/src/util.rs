use std::borrow::Cow;

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

pub fn consume_while<'s>(input: &mut &'s str, predicate: impl FnMut(&char) -> bool) -> &'s str {
    let len = input
        .chars()
        .take_while(predicate)
        .map(char::len_utf8)
        .sum::<usize>();
    if len == 0 {
        return "";
    }
    let result = &input[..len];
    *input = &input[len..];
    result
}

/// Shortens long text (queries, literals) before it lands in a message.
pub fn truncate_long(value: &str) -> Cow<'_, str> {
    match value.char_indices().nth(497) {
        Some((end, _)) => Cow::Owned(format!("{}...", value[..end].trim_end())),
        None => Cow::Borrowed(value.trim_end()),
    }
}
