// src/utils/html.rs

/// Cleans admin-authored text for insertion as HTML on the public pages.
///
/// Bare `<`, `>` and `&` come back as entities. Harmless formatting tags
/// (`<b>`, `<p>`, `<a>`) are kept; scripts, iframes and event-handler
/// attributes are stripped.
/// `<script>` elements are removed together with their content.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
