//! Extract pieces of generated Ninja text.

/// Lines of the `rule name` block, excluding the header line and the
/// trailing blank line.
#[must_use]
pub fn rule_block<'a>(ninja: &'a str, name: &str) -> Option<Vec<&'a str>> {
    let header = format!("rule {name}");
    let mut lines = ninja.lines().skip_while(|line| *line != header);
    lines.next()?;
    Some(lines.take_while(|line| line.starts_with("  ")).collect())
}

/// Value of the `command` key of rule `name`.
#[must_use]
pub fn command_line<'a>(ninja: &'a str, name: &str) -> Option<&'a str> {
    rule_block(ninja, name)?
        .into_iter()
        .find_map(|line| line.strip_prefix("  command = "))
}

/// Value of the indented `key` override on the edge whose header starts with
/// `build_prefix`, for example `"build install:"`.
#[must_use]
pub fn override_line<'a>(ninja: &'a str, build_prefix: &str, key: &str) -> Option<&'a str> {
    let needle = format!("  {key} = ");
    ninja
        .lines()
        .skip_while(|line| !line.starts_with(build_prefix))
        .skip(1)
        .take_while(|line| line.starts_with("  "))
        .find_map(|line| line.strip_prefix(needle.as_str()))
}
