//! Output filename derivation from a page URL.
//!
//! `https://news.ycombinator.com/item?id=1` becomes `ycombinato_item.mp3`:
//! the second-to-last host label plus at most two path segments, each
//! reduced to alphanumerics and cut to ten characters.

use url::Url;

const MAX_PART_CHARS: usize = 10;
const MAX_PATH_PARTS: usize = 2;

/// Derive a filesystem-safe `.mp3` filename from `url`.
pub fn derive_filename(url: &Url) -> String {
    let brand = url
        .host_str()
        .and_then(|host| host.rsplit('.').nth(1))
        .unwrap_or("");

    let parts: Vec<String> = std::iter::once(clean_and_shorten(brand))
        .chain(
            url.path()
                .split('/')
                .filter(|segment| !segment.is_empty())
                .take(MAX_PATH_PARTS)
                .map(clean_and_shorten),
        )
        .collect();

    format!("{}.mp3", parts.join("_"))
}

/// Keep letters and digits only, at most `MAX_PART_CHARS` of them.
fn clean_and_shorten(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric())
        .take(MAX_PART_CHARS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn derive(url: &str) -> String {
        derive_filename(&Url::parse(url).unwrap())
    }

    fn is_well_formed(name: &str) -> bool {
        let Some(stem) = name.strip_suffix(".mp3") else {
            return false;
        };
        let parts: Vec<&str> = stem.split('_').collect();
        (1..=3).contains(&parts.len())
            && parts
                .iter()
                .all(|p| p.chars().count() <= MAX_PART_CHARS && p.chars().all(char::is_alphanumeric))
    }

    #[test]
    fn hacker_news_item() {
        assert_eq!(
            derive("https://news.ycombinator.com/item?id=39865810"),
            "ycombinato_item.mp3"
        );
    }

    #[test]
    fn takes_first_two_path_segments() {
        assert_eq!(
            derive("https://www.example.com/blog/2024/03/post-title"),
            "example_blog_2024.mp3"
        );
    }

    #[test]
    fn truncates_and_strips_segments() {
        assert_eq!(
            derive("https://www.theverge.com/the-long-article-slug-here/x.y.z"),
            "theverge_thelongart_xyz.mp3"
        );
    }

    #[test]
    fn long_brand_is_truncated() {
        assert_eq!(
            derive("https://extraordinarilylongdomain.org/"),
            "extraordin.mp3"
        );
    }

    #[test]
    fn single_label_host_has_empty_brand() {
        assert_eq!(derive("http://localhost:8080/docs/intro"), "_docs_intro.mp3");
    }

    #[test]
    fn port_does_not_leak_into_brand() {
        assert_eq!(derive("http://example.com:8080/"), "example.mp3");
    }

    #[test]
    fn empty_segments_are_skipped() {
        assert_eq!(derive("https://example.com//a///b/c"), "example_a_b.mp3");
    }

    #[test]
    fn same_url_same_filename() {
        let url = "https://news.bbc.co.uk/sport/football/12345";
        assert_eq!(derive(url), derive(url));
    }

    #[test]
    fn output_has_no_url_separators() {
        for url in [
            "https://news.ycombinator.com/item?id=39865810",
            "https://a.b.c.d.example.com/x:y/z.w/q",
            "http://127.0.0.1/path/to/page.html",
            "https://example.com/%E2%9C%93/caf%C3%A9",
        ] {
            let name = derive(url);
            let stem = name.strip_suffix(".mp3").unwrap();
            assert!(!stem.contains(['/', '.', ':']), "{url} -> {name}");
            assert!(is_well_formed(&name), "{url} -> {name}");
        }
    }
}
