/// Replaces each `{KEY}` in `template` with the value registered for `KEY` in `values`.
///
/// Braces that do not enclose a registered key are copied verbatim, which leaves SPARQL group
/// patterns intact. Substituted values are never scanned again, so caller-supplied text that
/// looks like a placeholder is emitted as-is.
pub(crate) fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut filled = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open_index) = rest.find('{') {
        filled.push_str(&rest[..open_index]);
        let after_open = &rest[open_index+1..];

        let substitution = after_open.find('}')
            .and_then(|close_index| {
                let key = &after_open[..close_index];
                values.iter()
                    .find(|(k, _)| *k == key)
                    .map(|(_, v)| (*v, close_index))
            });
        match substitution {
            Some((value, close_index)) => {
                filled.push_str(value);
                rest = &after_open[close_index+1..];
            },
            None => {
                filled.push('{');
                rest = after_open;
            },
        }
    }
    filled.push_str(rest);

    filled
}
