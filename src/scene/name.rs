//! Name-prefix classification helpers. Rooms, portals, bounds and
//! ignored nodes are all identified purely by how the designer named
//! them.

pub fn name_starts_with(name: &str, prefix: &str) -> bool {
    name.starts_with(prefix)
}

/// Substring after `prefix`, cut at the first `*`. Hosts that disallow
/// duplicate node names let designers append `*<n>` to disambiguate, so
/// `portal_kitchen*2` still targets the room `kitchen`.
pub fn find_name_after<'a>(name: &'a str, prefix: &str) -> &'a str {
    let rest = &name[prefix.len()..];

    match rest.find('*') {
        Some(pos) => &rest[..pos],
        None => rest,
    }
}
