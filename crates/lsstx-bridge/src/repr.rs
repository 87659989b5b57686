//! Representation formatting for wrapped objects.

use crate::class::ReprStyle;
use crate::error::AdapterResult;
use crate::value::Value;
use crate::wrapper::WrappedObject;

const ELLIPSIS: &str = "...";
const ARGS_SUMMARY_LEN: usize = 60;

/// Render an object according to its class's [`ReprStyle`], truncated to
/// `max_len` characters.
pub(crate) fn render(obj: &WrappedObject, max_len: usize) -> AdapterResult<String> {
    let name = obj.class_name();
    let text = match obj.class().repr_style() {
        ReprStyle::Coordinates(props) => {
            let values = bound_values(obj, props)?;
            let parts: Vec<String> = values.iter().map(|(_, v)| format_value(v)).collect();
            format!("{}({})", name, parts.join(", "))
        }
        ReprStyle::Fields(props) => {
            let values = bound_values(obj, props)?;
            let parts: Vec<String> = values
                .iter()
                .map(|(prop, v)| format!("{}={}", prop, format_value(v)))
                .collect();
            format!("{}({})", name, parts.join(", "))
        }
        ReprStyle::Summary { width, height } => {
            let w = obj.get(width)?;
            let h = obj.get(height)?;
            format!("{}({}, {}x{})", name, obj.dtype(), w, h)
        }
        ReprStyle::Custom(format) => format(obj)?,
        ReprStyle::Opaque => format!("{}({})", name, obj.dtype()),
    };
    Ok(truncate(&text, max_len))
}

/// Values of the listed properties that are bound on the object's class
fn bound_values<'p>(obj: &WrappedObject, props: &[&'p str]) -> AdapterResult<Vec<(&'p str, Value)>> {
    props
        .iter()
        .filter(|prop| obj.class().property(prop).is_some())
        .map(|prop| Ok((*prop, obj.get(prop)?)))
        .collect()
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Str(s) => format!("{:?}", s.as_str()),
        other => other.to_string(),
    }
}

/// Shorten `text` to at most `max_len` characters, marking the cut
pub fn truncate(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let keep = max_len.saturating_sub(ELLIPSIS.len());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Short, bounded description of an argument list for error messages
pub fn summarize_args(args: &[Value]) -> String {
    let parts: Vec<String> = args.iter().map(format_value).collect();
    truncate(&parts.join(", "), ARGS_SUMMARY_LEN)
}
