/// Infers the shared base path of a set of sibling URLs
///
/// Sorting puts the two most divergent URLs at the ends of the list, so their
/// common prefix is the common prefix of the whole set. Comparison is by
/// character, so a multi-byte character is never split.
///
/// # Returns
///
/// * `""` for an empty set
/// * the sole URL, unchanged, for a single-element set
/// * the longest common character prefix otherwise (possibly `""`)
///
/// # Examples
///
/// ```
/// use catalog_harvest::url::common_base_path;
///
/// let urls = vec![
///     "https://example.com/components/marketing/heroes".to_string(),
///     "https://example.com/components/marketing/footers".to_string(),
/// ];
/// assert_eq!(common_base_path(&urls), "https://example.com/components/marketing/");
/// ```
pub fn common_base_path(urls: &[String]) -> String {
    match urls {
        [] => String::new(),
        [only] => only.clone(),
        _ => {
            let mut sorted: Vec<&str> = urls.iter().map(String::as_str).collect();
            sorted.sort_unstable();

            let first = sorted[0];
            let last = sorted[sorted.len() - 1];

            first
                .chars()
                .zip(last.chars())
                .take_while(|(a, b)| a == b)
                .map(|(a, _)| a)
                .collect()
        }
    }
}
