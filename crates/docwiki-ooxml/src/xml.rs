//! Small helpers shared by the WordprocessingML parsers

use quick_xml::events::BytesStart;

/// Get attribute by qualified name, falling back to its local name
/// (documents are not required to use the `w:`/`r:` prefixes)
pub(crate) fn get_attr_with_ns(e: &BytesStart, name: &[u8]) -> Option<String> {
    let local = match name.iter().position(|&b| b == b':') {
        Some(i) => &name[i + 1..],
        None => name,
    };
    e.attributes()
        .filter_map(|a| a.ok())
        .find(|a| a.key.as_ref() == name || a.key.local_name().as_ref() == local)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// Value of a `w:val` toggle (`<w:b/>`, `<w:b w:val="0"/>`)
pub(crate) fn toggle(e: &BytesStart) -> bool {
    !matches!(
        get_attr_with_ns(e, b"w:val").as_deref(),
        Some("0") | Some("false") | Some("off")
    )
}
