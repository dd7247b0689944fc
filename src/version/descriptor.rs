//! Line-oriented scanning of `go.mod` style descriptors
//!
//! Only a single directive is of interest: a keyword followed by a dotted
//! numeric version, e.g. `go 1.21` or `go 1.22.3`.

/// Directive declaring the minimum Go version of a module.
pub const GO_DIRECTIVE: &str = "go";

/// Find the first `<keyword> <dotted-version>` line in `content`.
///
/// Trailing `//` comments are ignored. Lines whose version is not purely
/// dotted digits (two or three components) are skipped.
pub fn find_directive_version(content: &str, keyword: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let line = line.split("//").next().unwrap_or_default();
        let mut tokens = line.split_whitespace();

        if tokens.next()? != keyword {
            return None;
        }
        let version = tokens.next()?;
        if tokens.next().is_some() || !is_dotted_version(version) {
            return None;
        }
        Some(version.to_string())
    })
}

/// Find the minimum Go version declared by a `go.mod` document.
pub fn find_go_version(content: &str) -> Option<String> {
    find_directive_version(content, GO_DIRECTIVE)
}

fn is_dotted_version(version: &str) -> bool {
    let parts: Vec<&str> = version.split('.').collect();
    (2..=3).contains(&parts.len())
        && parts
            .iter()
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()))
}
