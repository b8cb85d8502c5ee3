// src/store/naming.rs
// =============================================================================
// Picks the output filename for a crawl.
//
// The name comes from the registrable domain of the start URL with its public
// suffix removed, so every subdomain of one site lands in the same file:
//
//   https://www.example.com/      -> example_scraped_content.json
//   https://news.bbc.co.uk/world  -> bbc_scraped_content.json
//   https://alice.github.io/      -> alice_scraped_content.json
//   http://127.0.0.1:8080/        -> 127_0_0_1_scraped_content.json
//
// Suffixes come from the public suffix list (the `psl` crate), which also
// knows private suffixes like github.io where each subdomain is its own site.
// =============================================================================

use std::path::PathBuf;
use url::{Host, Url};

const FILE_SUFFIX: &str = "_scraped_content.json";

// Returns the site label used in the filename, if the URL has a host
pub fn site_label(url: &Url) -> Option<String> {
    let label = match url.host()? {
        Host::Domain(domain) => domain_label(domain)?,
        Host::Ipv4(ip) => ip.to_string().replace('.', "_"),
        Host::Ipv6(ip) => ip.to_string().replace(':', "_"),
    };
    Some(label)
}

// Default output path for a crawl starting at `url`
pub fn default_store_path(url: &Url) -> PathBuf {
    let label = site_label(url).unwrap_or_else(|| "site".to_string());
    PathBuf::from(format!("{}{}", label, FILE_SUFFIX))
}

fn domain_label(domain: &str) -> Option<String> {
    let domain = domain.trim_end_matches('.').to_ascii_lowercase();
    if domain.is_empty() {
        return None;
    }

    match psl::domain(domain.as_bytes()) {
        Some(registrable) => {
            let label = registrable
                .as_bytes()
                .strip_suffix(registrable.suffix().as_bytes())?
                .strip_suffix(b".")?;
            Some(String::from_utf8_lossy(label).into_owned())
        }
        // The host is itself a suffix (localhost, an intranet name)
        None => Some(domain.replace('.', "_")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(raw: &str) -> Option<String> {
        site_label(&Url::parse(raw).unwrap())
    }

    #[test]
    fn test_common_domains() {
        assert_eq!(label("https://example.com/"), Some("example".to_string()));
        assert_eq!(label("https://www.example.com/a/b"), Some("example".to_string()));
        assert_eq!(label("https://docs.rust-lang.org/"), Some("rust-lang".to_string()));
    }

    #[test]
    fn test_two_label_suffix() {
        assert_eq!(label("https://news.bbc.co.uk/world"), Some("bbc".to_string()));
        assert_eq!(label("https://bbc.co.uk/"), Some("bbc".to_string()));
    }

    #[test]
    fn test_country_second_level_suffixes() {
        assert_eq!(label("https://www.example.co.kr/"), Some("example".to_string()));
        assert_eq!(label("https://shop.example.com.sg/"), Some("example".to_string()));
        assert_eq!(label("https://www.other.co.kr/"), Some("other".to_string()));
    }

    #[test]
    fn test_private_suffix_keeps_sites_apart() {
        assert_eq!(label("https://alice.github.io/"), Some("alice".to_string()));
        assert_eq!(label("https://bob.github.io/blog"), Some("bob".to_string()));
    }

    #[test]
    fn test_ip_and_single_label_hosts() {
        assert_eq!(label("http://127.0.0.1:8080/"), Some("127_0_0_1".to_string()));
        assert_eq!(label("http://localhost:3000/"), Some("localhost".to_string()));
    }

    #[test]
    fn test_default_store_path() {
        let url = Url::parse("https://www.example.com/").unwrap();
        assert_eq!(
            default_store_path(&url),
            PathBuf::from("example_scraped_content.json")
        );
    }
}
