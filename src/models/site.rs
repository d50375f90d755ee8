//! Sitemap and web app manifest of the public site
use chrono::NaiveDateTime;
use failure::Error as FailureError;
use failure::Fail;
use treexml::{Document, Element, ElementBuilder, XmlVersion};

use config::{Icon, Site};
use models::{Category, RepairService};

pub const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

pub trait ToXMLElement {
    fn to_xml(self) -> Element;
}

pub trait ToXMLDocument {
    fn to_xml_document(self) -> Document;
}

/// `base` and `path` joined with exactly one slash
pub fn absolute_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_right_matches('/'), path.trim_left_matches('/'))
}

#[derive(Debug, Clone, PartialEq)]
pub struct SitemapUrl {
    pub loc: String,
    pub lastmod: Option<NaiveDateTime>,
}

impl ToXMLElement for SitemapUrl {
    fn to_xml(self) -> Element {
        let mut url = ElementBuilder::new("url").element();
        url.children.push(ElementBuilder::new("loc").text(self.loc).element());
        if let Some(lastmod) = self.lastmod {
            url.children
                .push(ElementBuilder::new("lastmod").text(lastmod.format("%Y-%m-%d").to_string()).element());
        }
        url
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sitemap {
    pub urls: Vec<SitemapUrl>,
}

impl Sitemap {
    /// Static pages first, then every active category and service
    pub fn new(site: &Site, categories: &[Category], services: &[RepairService]) -> Self {
        let pages = site.static_pages.iter().map(|page| SitemapUrl {
            loc: absolute_url(&site.base_url, page),
            lastmod: None,
        });
        let categories = categories.iter().filter(|category| category.is_active).map(|category| SitemapUrl {
            loc: absolute_url(&site.base_url, &format!("/categories/{}", category.slug)),
            lastmod: Some(category.updated_at),
        });
        let services = services.iter().filter(|service| service.is_active).map(|service| SitemapUrl {
            loc: absolute_url(&site.base_url, &format!("/services/{}", service.slug)),
            lastmod: Some(service.updated_at),
        });

        Self {
            urls: pages.chain(categories).chain(services).collect(),
        }
    }
}

impl Sitemap {
    /// Serialized `urlset` document
    pub fn render(self) -> Result<String, FailureError> {
        let mut data: Vec<u8> = vec![];
        self.to_xml_document()
            .write(&mut data)
            .map_err(|e| e.context("Can't create xml document for sitemap.").into())
            .and_then(|_| String::from_utf8(data).map_err(From::from))
    }
}

impl ToXMLElement for Sitemap {
    fn to_xml(self) -> Element {
        let mut urlset = ElementBuilder::new("urlset").attr("xmlns", SITEMAP_NAMESPACE).element();
        urlset.children = self.urls.into_iter().map(ToXMLElement::to_xml).collect();
        urlset
    }
}

impl ToXMLDocument for Sitemap {
    fn to_xml_document(self) -> Document {
        Document {
            encoding: "UTF-8".to_string(),
            root: Some(self.to_xml()),
            version: XmlVersion::Version10,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ManifestShortcut {
    pub name: String,
    pub url: String,
}

/// `manifest.webmanifest` content
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WebManifest {
    pub name: String,
    pub short_name: String,
    pub description: String,
    pub start_url: String,
    pub display: String,
    pub theme_color: String,
    pub background_color: String,
    pub lang: String,
    pub icons: Vec<Icon>,
    pub shortcuts: Vec<ManifestShortcut>,
}

impl WebManifest {
    pub fn new(site: &Site, categories: &[Category]) -> Self {
        let shortcuts = categories
            .iter()
            .filter(|category| category.is_active)
            .map(|category| ManifestShortcut {
                name: if site.lang == "en" {
                    category.name_en.clone()
                } else {
                    category.name_de.clone()
                },
                url: format!("/categories/{}", category.slug),
            }).collect();

        Self {
            name: site.name.clone(),
            short_name: site.short_name.clone(),
            description: site.description.clone(),
            start_url: "/".to_string(),
            display: "standalone".to_string(),
            theme_color: site.theme_color.clone(),
            background_color: site.background_color.clone(),
            lang: site.lang.clone(),
            icons: site.icons.clone(),
            shortcuts,
        }
    }
}

#[cfg(test)]
pub mod tests {
    use chrono::NaiveDate;

    use super::*;
    use models::category::tests::create_category;
    use models::repair_service::tests::create_repair_service;

    pub fn create_site() -> Site {
        Site {
            base_url: "https://repair.example.com/".to_string(),
            name: "Repair Example".to_string(),
            short_name: "Repair".to_string(),
            description: "Smartphone und Notebook Reparatur".to_string(),
            theme_color: "#0f172a".to_string(),
            background_color: "#ffffff".to_string(),
            lang: "de".to_string(),
            static_pages: vec!["/".to_string(), "/kontakt".to_string()],
            icons: vec![Icon {
                src: "/icons/192.png".to_string(),
                sizes: "192x192".to_string(),
                mime_type: "image/png".to_string(),
            }],
        }
    }

    #[test]
    fn test_absolute_url() {
        assert_eq!(absolute_url("https://a.de/", "/kontakt"), "https://a.de/kontakt");
        assert_eq!(absolute_url("https://a.de", "kontakt"), "https://a.de/kontakt");
    }

    #[test]
    fn test_sitemap_lists_active_records() {
        let mut hidden = create_category(2, "tablet", 2);
        hidden.is_active = false;
        let mut notebook = create_category(1, "notebook", 1);
        notebook.updated_at = NaiveDate::from_ymd(2024, 5, 17).and_hms(23, 59, 0);
        let services = vec![create_repair_service(7, 1, "ram-erweiterung", Some(59), Some(249))];

        let sitemap = Sitemap::new(&create_site(), &[notebook, hidden], &services);
        let locs = sitemap.urls.iter().map(|url| url.loc.as_str()).collect::<Vec<&str>>();
        assert_eq!(
            locs,
            vec![
                "https://repair.example.com/",
                "https://repair.example.com/kontakt",
                "https://repair.example.com/categories/notebook",
                "https://repair.example.com/services/ram-erweiterung",
            ]
        );

        let xml = sitemap.render().unwrap();
        assert!(xml.contains("urlset"));
        assert!(xml.contains(SITEMAP_NAMESPACE));
        assert!(xml.contains("2024-05-17"));
        assert!(!xml.contains("tablet"));
    }

    #[test]
    fn test_manifest_shortcuts() {
        let manifest = WebManifest::new(&create_site(), &[create_category(1, "notebook", 1)]);
        assert_eq!(manifest.shortcuts.len(), 1);
        assert_eq!(manifest.shortcuts[0].url, "/categories/notebook");
        assert_eq!(manifest.icons[0].sizes, "192x192");
        assert_eq!(manifest.start_url, "/");
    }
}
