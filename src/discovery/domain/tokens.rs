//! Text normalization shared by indexing and querying.

/// Splits text into lowercase alphanumeric tokens.
///
/// # Examples
///
/// ```
/// use agentmesh::discovery::domain::tokenize;
///
/// assert_eq!(tokenize("Echo-Agent v2!"), vec!["echo", "agent", "v2"]);
/// assert!(tokenize(" --- ").is_empty());
/// ```
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|ch: char| !ch.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}
