use crate::config::{NavigationEntry, SiteSettings};
use crate::presentation::views::{
    BrandView, FooterView, LayoutChrome, NavigationLinkView, NavigationView, PageMetaView,
};

/// Site-wide layout chrome derived from the `site` settings.
#[derive(Clone)]
pub struct ChromeService {
    chrome: LayoutChrome,
    public_site_url: String,
}

impl ChromeService {
    pub fn new(site: &SiteSettings) -> Self {
        let public_site_url = normalize_public_site_url(&site.public_site_url);
        let chrome = LayoutChrome {
            brand: BrandView {
                title: site.brand_title.clone(),
                href: "/".to_string(),
            },
            navigation: NavigationView {
                entries: site.navigation.iter().map(map_navigation_entry).collect(),
            },
            footer: FooterView {
                copy: site.footer_copy.clone(),
            },
            meta: PageMetaView {
                title: site.brand_title.clone(),
                description: site.tagline.clone(),
                canonical: public_site_url.clone(),
            },
        };

        Self {
            chrome,
            public_site_url,
        }
    }

    pub fn load(&self) -> LayoutChrome {
        self.chrome.clone()
    }

    /// Chrome whose canonical link points at `path` on the public site.
    pub fn load_for(&self, path: &str) -> LayoutChrome {
        self.load().with_canonical(self.canonical_url(path))
    }

    pub fn canonical_url(&self, path: &str) -> String {
        let trimmed = path.trim_start_matches('/');
        if trimmed.is_empty() {
            self.public_site_url.clone()
        } else {
            format!("{}{trimmed}", self.public_site_url)
        }
    }
}

fn normalize_public_site_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    format!("{trimmed}/")
}

fn map_navigation_entry(entry: &NavigationEntry) -> NavigationLinkView {
    let href = entry.href.trim().to_string();
    let external = href.starts_with("http://") || href.starts_with("https://");

    let mut link = NavigationLinkView {
        label: entry.label.trim().to_string(),
        href,
        target: None,
        rel: None,
    };

    if external {
        link.target = Some("_blank".to_string());
        link.rel = Some("noopener noreferrer".to_string());
    }

    link
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteSettings {
        SiteSettings {
            brand_title: "Powerworks".to_string(),
            tagline: "Energy infrastructure".to_string(),
            public_site_url: "https://powerworks.example.com".to_string(),
            footer_copy: "Footer".to_string(),
            navigation: vec![
                NavigationEntry {
                    label: "Projects".to_string(),
                    href: "/projects".to_string(),
                },
                NavigationEntry {
                    label: "LinkedIn".to_string(),
                    href: "https://www.linkedin.com/company/example".to_string(),
                },
            ],
        }
    }

    #[test]
    fn canonical_urls_join_cleanly() {
        let chrome = ChromeService::new(&site());
        assert_eq!(chrome.canonical_url("/"), "https://powerworks.example.com/");
        assert_eq!(
            chrome.canonical_url("/projects/alpha"),
            "https://powerworks.example.com/projects/alpha"
        );
        assert_eq!(
            chrome.load_for("/projects").meta.canonical,
            "https://powerworks.example.com/projects"
        );
    }

    #[test]
    fn external_navigation_opens_in_new_tab() {
        let chrome = ChromeService::new(&site()).load();
        let entries = &chrome.navigation.entries;
        assert_eq!(entries[0].target, None);
        assert_eq!(entries[1].target.as_deref(), Some("_blank"));
        assert_eq!(entries[1].rel.as_deref(), Some("noopener noreferrer"));
    }
}
