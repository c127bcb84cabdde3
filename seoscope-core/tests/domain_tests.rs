// Tests for domain normalization

use seoscope_core::domain::normalize;

#[test]
fn test_full_url_is_reduced_to_host() {
    assert_eq!(normalize("https://www.Example.com/path?x=1"), "example.com");
}

#[test]
fn test_bare_host_is_lowercased() {
    assert_eq!(normalize("EXAMPLE.com"), "example.com");
}

#[test]
fn test_http_scheme_and_port() {
    assert_eq!(normalize("http://example.com:8080/index.html"), "example.com");
}

#[test]
fn test_leading_www_only() {
    assert_eq!(normalize("WWW.example.com"), "example.com");
    assert_eq!(normalize("wwwexample.com"), "wwwexample.com");
    assert_eq!(normalize("sub.www.example.com"), "sub.www.example.com");
}

#[test]
fn test_subdomains_are_kept() {
    assert_eq!(normalize("blog.example.co.uk/post/1"), "blog.example.co.uk");
}

#[test]
fn test_surrounding_whitespace() {
    assert_eq!(normalize("  example.com  "), "example.com");
}

#[test]
fn test_query_and_fragment_without_path() {
    assert_eq!(normalize("example.com?ref=home#top"), "example.com");
}

#[test]
fn test_already_canonical_is_stable() {
    let once = normalize("https://www.example.com/");
    assert_eq!(normalize(&once), once);
}

#[test]
fn test_malformed_input_never_panics() {
    let inputs = [
        "",
        "   ",
        "https://",
        "http:///path",
        "://",
        "not a url!!!",
        "exa mple.com/path",
        "[::1",
        "%%%",
        "https://www./",
        "ftp://files.example.com/pub",
    ];

    for input in inputs {
        let _ = normalize(input);
    }
}

#[test]
fn test_empty_input_normalizes_to_empty() {
    assert_eq!(normalize(""), "");
    assert_eq!(normalize("https://"), "");
}

#[test]
fn test_unparsable_input_uses_string_fallback() {
    assert_eq!(normalize("HTTPS://WWW.Bad Host.com/x"), "bad host.com");
}
